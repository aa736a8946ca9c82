use crate::argv::build_argv;
use crate::error::DispatchError;
use crate::models::{Invocation, ResultCode};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::time::Duration;

pub const DEFAULT_PROGRAM: &str = "/usr/bin/smirc";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What happens to a child that outlives the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutAction {
    /// Kill the child and reap it before returning.
    #[default]
    Kill,
    /// Return immediately and leave the child running.
    Leave,
}

/// Runs the external `smirc` program for one [`Invocation`] at a time.
///
/// The program path, timeout and poll interval are plain configuration so a
/// stub executable can stand in for the real tool.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    program: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
    on_timeout: TimeoutAction,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Dispatcher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            on_timeout: TimeoutAction::default(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Intervals below 1 ms are raised to 1 ms.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }

    #[must_use]
    pub fn with_timeout_action(mut self, action: TimeoutAction) -> Self {
        self.on_timeout = action;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout_action(&self) -> TimeoutAction {
        self.on_timeout
    }

    pub fn argv(&self, invocation: &Invocation) -> Vec<OsString> {
        build_argv(&self.program, invocation)
    }

    /// Number of sleeps the poll loop may take before giving up.
    fn poll_budget(&self) -> u128 {
        self.timeout
            .as_millis()
            .div_ceil(self.poll_interval.as_millis())
    }

    /// Command with the argument vector applied and an empty environment.
    pub(crate) fn command(&self, invocation: &Invocation) -> Command {
        let argv = self.argv(invocation);
        let mut command = Command::new(&self.program);
        command.args(argv.iter().skip(1)).env_clear();
        command
    }

    pub(crate) fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    pub(crate) fn spawn_failed(&self, source: std::io::Error) -> DispatchError {
        tracing::warn!(program = %self.program.display(), "Failed to launch: {source}");
        DispatchError::ChildExec {
            program: self.program_name(),
            source,
        }
    }

    pub(crate) fn wait_failed(&self, source: std::io::Error) -> DispatchError {
        tracing::warn!(program = %self.program.display(), "Failed to check child status: {source}");
        DispatchError::Wait {
            program: self.program_name(),
            source,
        }
    }

    pub(crate) fn timed_out(&self) -> DispatchError {
        tracing::warn!(
            program = %self.program.display(),
            action = ?self.on_timeout,
            "Timed out after {:?}",
            self.timeout
        );
        DispatchError::TimedOut {
            program: self.program_name(),
            timeout: self.timeout,
        }
    }

    pub(crate) fn classify(&self, status: ExitStatus) -> Result<(), DispatchError> {
        if status.success() {
            tracing::debug!(program = %self.program.display(), "Message dispatched");
            return Ok(());
        }
        tracing::warn!(program = %self.program.display(), "Exited unsuccessfully: {status}");
        Err(DispatchError::ExecFailed {
            program: self.program_name(),
            status,
        })
    }

    /// Sends the message and blocks until the child exits or the timeout
    /// elapses.
    pub fn run(&self, invocation: &Invocation) -> Result<(), DispatchError> {
        if !invocation.has_message() {
            return Err(DispatchError::NoMessage);
        }

        let mut child = self
            .command(invocation)
            .spawn()
            .map_err(|e| self.spawn_failed(e))?;
        tracing::debug!(program = %self.program.display(), pid = child.id(), "Spawned");

        let mut remaining = self.poll_budget();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return self.classify(status),
                Ok(None) => {
                    if remaining == 0 {
                        self.abandon(&mut child);
                        return Err(self.timed_out());
                    }
                    remaining -= 1;
                    std::thread::sleep(self.poll_interval);
                }
                Err(e) => {
                    self.abandon(&mut child);
                    return Err(self.wait_failed(e));
                }
            }
        }
    }

    /// Like [`Dispatcher::run`] but reports only the result code.
    pub fn dispatch(&self, invocation: &Invocation) -> ResultCode {
        match self.run(invocation) {
            Ok(()) => ResultCode::Success,
            Err(e) => e.code(),
        }
    }

    /// Applies the timeout action to a child the dispatcher stops waiting on.
    pub(crate) fn abandon(&self, child: &mut Child) {
        match self.on_timeout {
            TimeoutAction::Kill => {
                // SIGKILL on Unix.
                let _ = child.kill();
                let _ = child.wait();
            }
            TimeoutAction::Leave => {
                tracing::debug!(pid = child.id(), "Leaving child running");
            }
        }
    }
}

/// Posts `message` through the default `/usr/bin/smirc` with the default
/// ten second budget.
pub fn dispatch(
    config: Option<&str>,
    private: bool,
    public: bool,
    to: Option<&str>,
    bot: bool,
    message: Option<&str>,
) -> ResultCode {
    let invocation = Invocation {
        config: config.map(str::to_string),
        private,
        public,
        bot,
        to: to.map(str::to_string),
        message: message.unwrap_or_default().to_string(),
    };
    Dispatcher::default().dispatch(&invocation)
}
