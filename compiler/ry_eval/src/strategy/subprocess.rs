use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crossbeam::channel::tick;

use super::{CancelToken, ExecutionStrategy};
use crate::artifact::{self, ArtifactError};
use crate::errors::ExecError;
use crate::program::Program;

/// How often a running child is checked on.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Tells `exec` to read the program's source text from stdin.
pub const SOURCE_STDIN_FLAG: &str = "--source-stdin";

/// Runs a program in a child process.
///
/// The program is written to a temporary artifact and handed to
/// `<executable> exec <artifact> --source-stdin`, with the original source
/// text piped on stdin for fault rendering. The child inherits stdout and
/// stderr and reports its own faults; only its exit status comes back.
#[derive(Clone, Debug)]
pub struct SubprocessStrategy {
    executable: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl SubprocessStrategy {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        SubprocessStrategy {
            executable: executable.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Use the running executable as the child.
    pub fn current_exe() -> Result<Self, ExecError> {
        std::env::current_exe()
            .map(Self::new)
            .map_err(|source| ExecError::Spawn {
                program: "current executable".to_string(),
                source,
            })
    }

    /// Extra arguments after `exec <artifact> --source-stdin`.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn_error(&self, source: std::io::Error) -> ExecError {
        ExecError::Spawn {
            program: self.executable.display().to_string(),
            source,
        }
    }

    /// Wait for the child, killing it on cancellation or timeout.
    fn supervise(&self, child: &mut Child, cancel: &CancelToken) -> Result<ExitStatus, ExecError> {
        let started = Instant::now();
        let ticker = tick(POLL_INTERVAL);
        loop {
            if let Some(status) = child.try_wait().map_err(|e| self.spawn_error(e))? {
                return Ok(status);
            }
            let stop = if cancel.is_cancelled() {
                Some(ExecError::Cancelled)
            } else {
                self.timeout
                    .filter(|limit| started.elapsed() > *limit)
                    .map(ExecError::TimedOut)
            };
            if let Some(stop) = stop {
                tracing::debug!(pid = child.id(), reason = %stop, "killing child");
                // The child may exit on its own in the meantime.
                let _ = child.kill();
                let _ = child.wait();
                return Err(stop);
            }
            // The ticker never disconnects while we hold it.
            let _ = ticker.recv();
        }
    }
}

impl ExecutionStrategy for SubprocessStrategy {
    fn name(&self) -> &'static str {
        "subprocess"
    }

    fn execute(&self, program: &Program, cancel: &CancelToken) -> Result<(), ExecError> {
        let mut file = tempfile::Builder::new()
            .prefix("ryton-")
            .suffix(".rybc")
            .tempfile()
            .map_err(|source| ArtifactError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        let path = file.path().to_path_buf();
        artifact::write_to(file.as_file_mut(), &path, program)?;

        let mut child = Command::new(&self.executable)
            .arg("exec")
            .arg(&path)
            .arg(SOURCE_STDIN_FLAG)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        tracing::debug!(pid = child.id(), artifact = %path.display(), "child started");

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits early closes the pipe; its status says why.
            if let Err(e) = stdin.write_all(program.source.text.as_bytes()) {
                tracing::debug!(error = %e, "source pipe closed early");
            }
        }

        let status = self.supervise(&mut child, cancel)?;
        // `file` lives until here so the child can read the artifact.
        drop(file);
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(ExecError::ChildFailed(code)),
            None => Err(ExecError::ChildKilled),
        }
    }
}
