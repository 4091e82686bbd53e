// kpathsea-core/src/lookup.rs

//! File lookups through kpsewhich.
//!
//! [`Kpathsea::find_file`] and [`Kpathsea::find_file_blocking`] differ only in
//! how they wait for the child. Both build arguments with [`build_args`] and
//! interpret the result with [`map_output`], so they cannot drift apart.

use crate::errors::LookupError;
use crate::format::FileFormat;
use crate::locate::{ExecutableBinding, ExecutableProbe, FsProbe};
use crate::runner::{CommandOutput, ProcessRunner, SystemRunner};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Builds the kpsewhich argument vector: the optional format flag first, the
/// file name last.
pub fn build_args(file_name: &str, format: FileFormat) -> Vec<String> {
    let mut args = Vec::with_capacity(2);
    if let Some(flag) = format.flag() {
        args.push(flag);
    }
    args.push(file_name.to_string());
    args
}

/// Maps a finished (or failed) kpsewhich run to a lookup result.
///
/// kpsewhich may exit 0 without printing anything when nothing matched, so
/// empty output on success is a miss, not a result.
pub fn map_output(
    file_name: &str,
    format: FileFormat,
    timeout: Option<Duration>,
    result: io::Result<CommandOutput>,
) -> Result<PathBuf, LookupError> {
    let output = match (result, timeout) {
        (Ok(output), _) => output,
        (Err(e), Some(limit)) if e.kind() == io::ErrorKind::TimedOut => {
            return Err(LookupError::TimedOut {
                file_name: file_name.to_string(),
                format,
                timeout: limit,
            });
        }
        (Err(e), _) => {
            return Err(LookupError::ExecutionFailure {
                file_name: file_name.to_string(),
                format,
                message: e.to_string(),
                status: None,
                source: Some(e),
            });
        }
    };

    if !output.success() {
        let stderr = output.stderr.trim();
        let message = if stderr.is_empty() {
            format!("kpsewhich exited with status {}", output.status)
        } else {
            stderr.to_string()
        };
        return Err(LookupError::ExecutionFailure {
            file_name: file_name.to_string(),
            format,
            message,
            status: Some(output.status),
            source: None,
        });
    }

    let found = output.stdout.trim_ascii();
    if found.is_empty() {
        return Err(LookupError::NotFound {
            file_name: file_name.to_string(),
            format,
        });
    }
    Ok(path_from_bytes(found))
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// A handle on one kpsewhich executable.
///
/// The binding is resolved once in the constructor and never changes. Lookups
/// share no state, so a `Kpathsea` can be used from many tasks at once.
#[derive(Clone)]
pub struct Kpathsea {
    binding: ExecutableBinding,
    runner: Arc<dyn ProcessRunner>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Kpathsea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kpathsea")
            .field("binding", &self.binding)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for Kpathsea {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Kpathsea {
    /// Creates a new instance. `tex_path` is an optional directory holding the
    /// TeX binaries; without it `kpsewhich` is taken from `PATH`.
    pub fn new(tex_path: Option<&Path>) -> Self {
        Self::with_parts(tex_path, &FsProbe, Arc::new(SystemRunner))
    }

    /// Creates an instance with an explicit existence probe and process runner.
    pub fn with_parts(
        tex_path: Option<&Path>,
        probe: &dyn ExecutableProbe,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let binding = ExecutableBinding::locate(tex_path, probe);
        info!(program = %binding.program().display(), "kpsewhich binding resolved");
        Self {
            binding,
            runner,
            timeout: None,
        }
    }

    /// Kills lookups that run longer than `timeout`. Lookups wait indefinitely
    /// unless this is set.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn binding(&self) -> &ExecutableBinding {
        &self.binding
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Finds a file, returning its absolute path.
    ///
    /// # Arguments
    ///
    /// * `file_name`: The file to find, e.g. `"cmr10"` or `"article.cls"`.
    /// * `format`: Restricts the search; [`FileFormat::All`] searches everything.
    ///
    /// # Errors
    ///
    /// See [`LookupError`]. An empty `file_name` fails before any process is spawned.
    pub async fn find_file(
        &self,
        file_name: &str,
        format: FileFormat,
    ) -> Result<PathBuf, LookupError> {
        let args = self.prepare(file_name, format)?;
        let result = self
            .runner
            .run(self.binding.program(), &args, self.timeout)
            .await;
        self.finish(file_name, format, result)
    }

    /// Blocking counterpart of [`Kpathsea::find_file`]; waits on the calling thread.
    pub fn find_file_blocking(
        &self,
        file_name: &str,
        format: FileFormat,
    ) -> Result<PathBuf, LookupError> {
        let args = self.prepare(file_name, format)?;
        let result = self
            .runner
            .run_blocking(self.binding.program(), &args, self.timeout);
        self.finish(file_name, format, result)
    }

    fn prepare(&self, file_name: &str, format: FileFormat) -> Result<Vec<String>, LookupError> {
        if file_name.is_empty() {
            return Err(LookupError::InvalidArgument { format });
        }
        let args = build_args(file_name, format);
        debug!(
            "Looking up '{}' (format '{}'): {} {}",
            file_name,
            format,
            self.binding.program().display(),
            args.join(" ")
        );
        Ok(args)
    }

    fn finish(
        &self,
        file_name: &str,
        format: FileFormat,
        result: io::Result<CommandOutput>,
    ) -> Result<PathBuf, LookupError> {
        let mapped = map_output(file_name, format, self.timeout, result);
        match &mapped {
            Ok(path) => debug!(file = file_name, path = %path.display(), "Lookup succeeded"),
            Err(e) => debug!(file = file_name, error = %e, "Lookup failed"),
        }
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(stdout: &str) -> io::Result<CommandOutput> {
        Ok(CommandOutput {
            status: 0,
            stdout: stdout.as_bytes().to_vec(),
            stderr: String::new(),
        })
    }

    #[test]
    fn test_build_args_all_has_no_flag() {
        assert_eq!(build_args("article.cls", FileFormat::All), vec!["article.cls"]);
    }

    #[test]
    fn test_build_args_flag_first_file_last() {
        for format in FileFormat::VARIANTS {
            let args = build_args("cmr10", format);
            assert_eq!(args.last().map(String::as_str), Some("cmr10"));
            if format == FileFormat::All {
                assert_eq!(args.len(), 1);
            } else {
                assert_eq!(args.len(), 2);
                assert_eq!(args[0], format!("--format={}", format.as_str()));
            }
        }
    }

    #[test]
    fn test_build_args_keeps_spaces_in_one_argument() {
        assert_eq!(
            build_args("lmroman10-regular", FileFormat::OpenType),
            vec!["--format=opentype fonts", "lmroman10-regular"]
        );
    }

    #[test]
    fn test_map_output_trims_path() {
        let path = map_output(
            "cmr10",
            FileFormat::Tfm,
            None,
            ok("/usr/share/texmf/fonts/tfm/cmr10.tfm\n"),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/usr/share/texmf/fonts/tfm/cmr10.tfm"));
    }

    #[test]
    fn test_map_output_whitespace_only_is_not_found() {
        let err = map_output("nonexistentfile.sty", FileFormat::All, None, ok("  \n")).unwrap_err();
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("nonexistentfile.sty") && msg.contains("'all'"), "{}", msg);
    }

    #[test]
    fn test_map_output_prefers_stderr() {
        let err = map_output(
            "cmr10",
            FileFormat::Tfm,
            None,
            Ok(CommandOutput {
                status: 1,
                stdout: b"ignored".to_vec(),
                stderr: "  kpathsea: file not found\n".to_string(),
            }),
        )
        .unwrap_err();
        match err {
            LookupError::ExecutionFailure { message, status, .. } => {
                assert_eq!(message, "kpathsea: file not found");
                assert_eq!(status, Some(1));
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_map_output_empty_stderr_falls_back_to_status() {
        let err = map_output(
            "cmr10",
            FileFormat::Tfm,
            None,
            Ok(CommandOutput {
                status: 2,
                stdout: Vec::new(),
                stderr: "\n".to_string(),
            }),
        )
        .unwrap_err();
        assert!(err.to_string().ends_with("kpsewhich exited with status 2"), "{}", err);
    }

    #[test]
    fn test_map_output_spawn_error() {
        let err = map_output(
            "cmr10",
            FileFormat::All,
            None,
            Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory")),
        )
        .unwrap_err();
        match &err {
            LookupError::ExecutionFailure { status, source, .. } => {
                assert_eq!(*status, None);
                assert!(source.is_some());
            }
            other => panic!("Unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("No such file or directory"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_map_output_timed_out_io_error_without_timeout_is_execution_failure() {
        let err = map_output(
            "cmr10",
            FileFormat::Tfm,
            None,
            Err(io::Error::new(io::ErrorKind::TimedOut, "connection timed out")),
        )
        .unwrap_err();
        assert!(
            matches!(err, LookupError::ExecutionFailure { status: None, .. }),
            "{:?}",
            err
        );
        assert!(err.to_string().contains("connection timed out"), "{}", err);
        assert!(!err.to_string().contains("0ns"));
    }

    #[cfg(unix)]
    #[test]
    fn test_map_output_keeps_non_utf8_path_bytes() {
        use std::os::unix::ffi::OsStrExt;
        let path = map_output(
            "cafe",
            FileFormat::Tfm,
            None,
            Ok(CommandOutput {
                status: 0,
                stdout: b"/tmp/caf\xe9.tfm\n".to_vec(),
                stderr: String::new(),
            }),
        )
        .unwrap();
        assert_eq!(path.as_os_str().as_bytes(), b"/tmp/caf\xe9.tfm");
    }

    #[test]
    fn test_map_output_timeout() {
        let limit = Duration::from_secs(3);
        let err = map_output(
            "cmr10",
            FileFormat::Tfm,
            Some(limit),
            Err(io::Error::new(io::ErrorKind::TimedOut, "slow")),
        )
        .unwrap_err();
        assert!(matches!(err, LookupError::TimedOut { timeout, .. } if timeout == limit));
    }
}
