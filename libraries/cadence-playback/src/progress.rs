//! Progress scheduler
//!
//! Repeating, cancellable timer driving periodic status pushes. Each run owns
//! a cancellation token derived from the player's lifetime token; a firing
//! checks that token instead of holding a back-reference, so cancelling the
//! parent (on release) ends every run even if a firing is already queued.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Outcome of one firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Fire again after the given delay
    Reschedule(Duration),

    /// Terminate this run
    Stop,
}

impl Tick {
    /// Reschedule after `interval_millis`, or stop if the interval disables updates
    pub fn after_millis(interval_millis: i64) -> Self {
        if interval_millis > 0 {
            Tick::Reschedule(Duration::from_millis(interval_millis as u64))
        } else {
            Tick::Stop
        }
    }
}

struct Run {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Repeating timer with at most one active run
pub struct ProgressScheduler {
    runtime: Handle,
    lifetime: CancellationToken,
    run: Option<Run>,
}

impl ProgressScheduler {
    /// Create a scheduler whose runs end when `lifetime` is cancelled
    pub fn new(runtime: Handle, lifetime: CancellationToken) -> Self {
        Self {
            runtime,
            lifetime,
            run: None,
        }
    }

    /// Start a new run, replacing any active one
    ///
    /// `tick` fires immediately, then after every delay it returns, until it
    /// returns [`Tick::Stop`] or the run is cancelled. The token passed to
    /// `tick` is the run's own token.
    pub fn start<F>(&mut self, mut tick: F)
    where
        F: FnMut(&CancellationToken) -> Tick + Send + 'static,
    {
        self.stop();
        if self.lifetime.is_cancelled() {
            tracing::debug!("Progress scheduler not started: owner released");
            return;
        }

        let token = self.lifetime.child_token();
        let run_token = token.clone();
        let handle = self.runtime.spawn(async move {
            loop {
                if run_token.is_cancelled() {
                    break;
                }
                match tick(&run_token) {
                    Tick::Stop => {
                        tracing::debug!("Progress updates stopped");
                        break;
                    }
                    Tick::Reschedule(delay) => {
                        tokio::select! {
                            () = run_token.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        });

        self.run = Some(Run { token, handle });
    }

    /// Cancel the active run, if any
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.token.cancel();
            run.handle.abort();
        }
    }

    /// Mark the run owning `token` as ended
    ///
    /// Called by a firing that is about to return [`Tick::Stop`], so that a
    /// start issued right after sees no active run. A newer run is left alone.
    pub fn finish(&mut self, token: &CancellationToken) {
        token.cancel();
        if self.run.as_ref().is_some_and(|run| run.token.is_cancelled()) {
            self.run = None;
        }
    }

    /// Whether a run is active
    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| !run.token.is_cancelled() && !run.handle.is_finished())
    }
}

impl Drop for ProgressScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
