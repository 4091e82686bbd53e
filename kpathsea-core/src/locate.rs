// kpathsea-core/src/locate.rs

//! Resolves which `kpsewhich` executable a [`crate::Kpathsea`] instance invokes.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bare executable name, resolved through `PATH` when the process is spawned.
pub const KPSEWHICH: &str = "kpsewhich";

/// Platform-specific file name of the executable (`kpsewhich.exe` on Windows).
pub fn executable_file_name() -> String {
    format!("{}{}", KPSEWHICH, std::env::consts::EXE_SUFFIX)
}

/// Existence check used when a directory hint is given.
///
/// Injected so that "found" and "not found" can be simulated without touching
/// the real filesystem or `PATH`.
pub trait ExecutableProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Checks the real filesystem. Existence only; executability is not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl ExecutableProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// The executable a lookup will spawn. Fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableBinding {
    /// Found inside the directory hint.
    Located(PathBuf),
    /// The bare name `kpsewhich`, left to the environment's `PATH` search.
    Bare,
}

impl ExecutableBinding {
    /// Resolves the binding once. Never fails: a hint that does not contain the
    /// executable produces a warning and falls back to [`ExecutableBinding::Bare`].
    pub fn locate(tex_path: Option<&Path>, probe: &dyn ExecutableProbe) -> Self {
        let Some(dir) = tex_path else {
            debug!("No TeX binary directory given; using '{}' from PATH", KPSEWHICH);
            return ExecutableBinding::Bare;
        };

        let candidate = dir.join(executable_file_name());
        if probe.exists(&candidate) {
            debug!(path = %candidate.display(), "Located kpsewhich");
            ExecutableBinding::Located(candidate)
        } else {
            warn!(
                path = %candidate.display(),
                "'{}' not found at {}. Falling back to system PATH.",
                KPSEWHICH,
                candidate.display()
            );
            ExecutableBinding::Bare
        }
    }

    /// The program handed to the process runner.
    pub fn program(&self) -> &Path {
        match self {
            ExecutableBinding::Located(path) => path,
            ExecutableBinding::Bare => Path::new(KPSEWHICH),
        }
    }

    pub fn is_bare(&self) -> bool {
        matches!(self, ExecutableBinding::Bare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    struct FixedProbe(bool);

    impl ExecutableProbe for FixedProbe {
        fn exists(&self, _path: &Path) -> bool {
            self.0
        }
    }

    #[test]
    fn test_no_hint_binds_bare_name() {
        let binding = ExecutableBinding::locate(None, &FixedProbe(true));
        assert_eq!(binding, ExecutableBinding::Bare);
        assert_eq!(binding.program(), Path::new("kpsewhich"));
    }

    #[test]
    fn test_hint_with_executable_binds_joined_path() {
        let dir = Path::new("/opt/texlive/bin");
        let binding = ExecutableBinding::locate(Some(dir), &FixedProbe(true));
        assert_eq!(
            binding,
            ExecutableBinding::Located(dir.join(executable_file_name()))
        );
        assert!(!binding.is_bare());
    }

    #[test]
    fn test_hint_without_executable_falls_back() {
        let hint = Path::new("/opt/texlive/bin");
        let binding = ExecutableBinding::locate(Some(hint), &FixedProbe(false));
        assert!(binding.is_bare());
    }

    #[test]
    fn test_fs_probe_checks_existence_only() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join(executable_file_name());
        // Not executable, only present.
        File::create(&exe).unwrap();
        let binding = ExecutableBinding::locate(Some(dir.path()), &FsProbe);
        assert_eq!(binding, ExecutableBinding::Located(exe));

        let empty = tempdir().unwrap();
        assert!(ExecutableBinding::locate(Some(empty.path()), &FsProbe).is_bare());
    }

    #[test]
    fn test_executable_file_name_suffix() {
        #[cfg(windows)]
        assert_eq!(executable_file_name(), "kpsewhich.exe");
        #[cfg(not(windows))]
        assert_eq!(executable_file_name(), "kpsewhich");
    }
}
