//! Fixed-interval tracking of one scraping job.
//!
//! The poll loop is strictly sequential: a follow-up query is only scheduled
//! after the previous response (or error) has been handled, so exactly one
//! timer is outstanding per job. Transport errors are transient - the job is
//! still running server-side, so the loop logs and retries at the same
//! interval instead of abandoning tracking.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use aluna_backend::{AssistantBackend, JobStatusReport};

/// Lifecycle phase of one tracked job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobPhase {
    /// Accepted by the backend; tracking not yet begun.
    Submitted,
    /// Status queries are being issued at the fixed interval.
    Polling,
    /// Terminal: the job finished successfully.
    Complete { status: String },
    /// Terminal: the job ended without completing.
    Failed { status: String },
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Complete { .. } | JobPhase::Failed { .. })
    }
}

/// Starts poll loops for scraping jobs.
pub struct JobPoller<B> {
    backend: Arc<B>,
    interval: Duration,
}

impl<B: AssistantBackend + 'static> JobPoller<B> {
    pub fn new(backend: Arc<B>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    /// Begin tracking the job for `key`.
    ///
    /// The first status query is issued immediately. `on_terminal` fires
    /// exactly once, with the terminal status report, unless tracking is
    /// stopped first. Dropping the returned handle stops tracking.
    pub fn start<F>(&self, key: &str, on_terminal: F) -> JobHandle
    where
        F: FnOnce(JobStatusReport) + Send + 'static,
    {
        let (phase_tx, phase_rx) = watch::channel(JobPhase::Submitted);
        let stop = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.backend),
            key.to_string(),
            self.interval,
            phase_tx,
            stop.clone(),
            on_terminal,
        ));
        JobHandle {
            phase: phase_rx,
            stop,
            task,
        }
    }
}

/// Handle to one tracked job.
///
/// Stands in for the job's poll timer: stopping (or dropping) the handle
/// cancels the pending follow-up query.
pub struct JobHandle {
    phase: watch::Receiver<JobPhase>,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// The job's current phase.
    pub fn phase(&self) -> JobPhase {
        self.phase.borrow().clone()
    }

    /// Subscribe to phase changes.
    pub fn subscribe_phase(&self) -> watch::Receiver<JobPhase> {
        self.phase.clone()
    }

    /// Stop tracking. Callable at any time; idempotent. The job itself keeps
    /// running server-side.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Whether the poll loop has exited (terminal status or stop).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the poll loop to exit.
    pub async fn join(&mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        // Navigating away from the job stops tracking.
        self.stop.cancel();
    }
}

async fn poll_loop<B, F>(
    backend: Arc<B>,
    key: String,
    interval: Duration,
    phase: watch::Sender<JobPhase>,
    stop: CancellationToken,
    on_terminal: F,
) where
    B: AssistantBackend,
    F: FnOnce(JobStatusReport) + Send,
{
    let _ = phase.send(JobPhase::Polling);

    loop {
        let result = tokio::select! {
            _ = stop.cancelled() => {
                tracing::debug!(job = %key, "Job tracking stopped");
                return;
            }
            result = backend.get_job_status(&key) => result,
        };

        match result {
            Ok(report) if report.in_progress() => {
                tracing::debug!(job = %key, "Job still in progress");
            }
            Ok(report) => {
                let terminal = if report.is_failure() {
                    JobPhase::Failed {
                        status: report.status.clone(),
                    }
                } else {
                    JobPhase::Complete {
                        status: report.status.clone(),
                    }
                };
                tracing::info!(job = %key, status = %report.status, "Job reached terminal status");
                let _ = phase.send(terminal);
                on_terminal(report);
                return;
            }
            Err(e) => {
                // The job is still running server-side; a client-side blip
                // must not abandon tracking.
                tracing::warn!(job = %key, error = %e, "Status query failed; will retry");
            }
        }

        tokio::select! {
            _ = stop.cancelled() => {
                tracing::debug!(job = %key, "Job tracking stopped");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
