//! Non-blocking dispatch for callers already running on a tokio runtime.

use crate::dispatcher::{Dispatcher, TimeoutAction};
use crate::error::DispatchError;
use crate::models::{Invocation, ResultCode};
use tokio::process::{Child, Command};
use tokio::time::timeout;

impl Dispatcher {
    /// Async counterpart of [`Dispatcher::run`]. Waits on the child without
    /// polling, bounded by the same timeout.
    pub async fn run_async(&self, invocation: &Invocation) -> Result<(), DispatchError> {
        if !invocation.has_message() {
            return Err(DispatchError::NoMessage);
        }

        let mut child = Command::from(self.command(invocation))
            .spawn()
            .map_err(|e| self.spawn_failed(e))?;
        tracing::debug!(program = %self.program().display(), pid = ?child.id(), "Spawned");

        match timeout(self.timeout(), child.wait()).await {
            Ok(Ok(status)) => self.classify(status),
            Ok(Err(e)) => {
                self.abandon_async(&mut child).await;
                Err(self.wait_failed(e))
            }
            Err(_) => {
                self.abandon_async(&mut child).await;
                Err(self.timed_out())
            }
        }
    }

    /// Kills and reaps the child under [`TimeoutAction::Kill`]; otherwise
    /// leaves it running.
    async fn abandon_async(&self, child: &mut Child) {
        match self.timeout_action() {
            TimeoutAction::Kill => {
                let _ = child.kill().await;
            }
            TimeoutAction::Leave => {
                tracing::debug!(pid = ?child.id(), "Leaving child running");
            }
        }
    }

    pub async fn dispatch_async(&self, invocation: &Invocation) -> ResultCode {
        match self.run_async(invocation).await {
            Ok(()) => ResultCode::Success,
            Err(e) => e.code(),
        }
    }
}
