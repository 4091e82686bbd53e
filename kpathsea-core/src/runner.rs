// kpathsea-core/src/runner.rs

//! The process boundary.
//!
//! Everything that actually spawns `kpsewhich` goes through [`ProcessRunner`],
//! so lookups can be exercised against a test double instead of a real TeX
//! installation. [`SystemRunner`] is the implementation used in production.
//!
//! Arguments are always passed as a vector; no shell is involved.

use async_trait::async_trait;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Represents the structured output of an executed external command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// The exit status code of the command, or -1 if it was terminated by a signal.
    pub status: i32,
    /// The captured standard output, unconverted. On Unix a path printed by
    /// kpsewhich need not be valid UTF-8.
    pub stdout: Vec<u8>,
    /// The captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Checks if the command executed successfully (status code 0).
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Runs a program with an argument vector and captures its output.
///
/// Both methods must reap the child before returning, on every path. A
/// `timeout` of `None` waits for the process indefinitely; when a timeout
/// elapses the child is killed and an [`io::ErrorKind::TimedOut`] error is
/// returned.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs the program on the calling thread.
    fn run_blocking(
        &self,
        program: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> io::Result<CommandOutput>;

    /// Runs the program without blocking the async runtime.
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> io::Result<CommandOutput>;
}

/// Spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    fn run_blocking(
        &self,
        program: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> io::Result<CommandOutput> {
        debug!(program = %program.display(), args = ?args, "Spawning (blocking)");

        let mut command = std::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match timeout {
            None => command.output(),
            Some(limit) => command
                .spawn()
                .and_then(|child| wait_with_deadline(child, program, limit)),
        }
        .inspect_err(|e| log_failure(program, e))?;

        let output = CommandOutput::from(output);
        debug!(status = output.status, "kpsewhich exited");
        Ok(output)
    }

    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> io::Result<CommandOutput> {
        debug!(program = %program.display(), args = ?args, "Spawning");

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the output future (timeout, cancelled task) kills the child.
            .kill_on_drop(true);

        let output = match timeout {
            None => command.output().await,
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(result) => result,
                Err(_) => Err(timed_out(program, limit)),
            },
        }
        .inspect_err(|e| log_failure(program, e))?;

        let output = CommandOutput::from(output);
        debug!(status = output.status, "kpsewhich exited");
        Ok(output)
    }
}

fn log_failure(program: &Path, e: &io::Error) {
    warn!(program = %program.display(), error = %e, "kpsewhich process failed");
}

fn timed_out(program: &Path, limit: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{} did not exit within {:?}", program.display(), limit),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipe {
    Stdout,
    Stderr,
}

type Drained = (Pipe, io::Result<Vec<u8>>);

fn drain<R: Read + Send + 'static>(mut pipe: R, which: Pipe, tx: mpsc::Sender<Drained>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = pipe.read_to_end(&mut buf).map(|_| buf);
        // The receiver is gone once the deadline has passed.
        let _ = tx.send((which, result));
    });
}

/// Polls the child until it exits or `limit` elapses, then waits for both
/// pipes to close within the same deadline. Output is drained on reader
/// threads so a chatty child cannot fill the pipe and stall, and a background
/// grandchild holding the pipes open cannot stretch the wait past `limit`.
fn wait_with_deadline(
    mut child: std::process::Child,
    program: &Path,
    limit: Duration,
) -> io::Result<Output> {
    let deadline = Instant::now() + limit;
    let (tx, rx) = mpsc::channel();
    let mut pending = 0;
    if let Some(pipe) = child.stdout.take() {
        drain(pipe, Pipe::Stdout, tx.clone());
        pending += 1;
    }
    if let Some(pipe) = child.stderr.take() {
        drain(pipe, Pipe::Stderr, tx.clone());
        pending += 1;
    }
    drop(tx);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                // Reap after kill; the reader threads finish once the pipes close.
                let _ = child.kill();
                let _ = child.wait();
                return Err(timed_out(program, limit));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }
    };

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    while pending > 0 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Pipe::Stdout, result)) => stdout = result?,
            Ok((Pipe::Stderr, result)) => stderr = result?,
            Err(mpsc::RecvTimeoutError::Timeout) => return Err(timed_out(program, limit)),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(io::Error::other("output reader thread panicked"));
            }
        }
        pending -= 1;
    }

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}
