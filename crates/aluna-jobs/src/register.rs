//! Company registration: submit the scrape form, then track the job.

use std::sync::Arc;
use std::time::Duration;

use aluna_backend::{AssistantBackend, BackendError, JobAccepted, JobStatusReport, ScrapeForm};
use aluna_core::company_key;

use crate::poller::{JobHandle, JobPoller};

/// Submit a registration form and start tracking the resulting job.
///
/// A rejected form (`Validation` error) propagates to the caller before any
/// tracking starts. On acceptance the poller follows the job for the
/// normalized company key; `on_terminal` carries the terminal status for the
/// "proceed to chat?" hand-off.
pub async fn register_company<B, F>(
    backend: Arc<B>,
    form: ScrapeForm,
    poll_interval: Duration,
    on_terminal: F,
) -> Result<(JobAccepted, JobHandle), BackendError>
where
    B: AssistantBackend + 'static,
    F: FnOnce(JobStatusReport) + Send + 'static,
{
    let key = company_key(&form.company_name);
    let accepted = backend.submit_scrape_job(form).await?;
    tracing::info!(job = %key, "Scrape job accepted; tracking status");

    let handle = JobPoller::new(backend, poll_interval).start(&key, on_terminal);
    Ok((accepted, handle))
}

// =============================================================================
// Tests
// =============================================================================
