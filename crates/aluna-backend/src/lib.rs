//! Backend boundary for the Aluna client.
//!
//! Defines the `AssistantBackend` contract the orchestration core is written
//! against, an HTTP implementation over the real backend, and a scriptable
//! mock for tests. The wire formats are owned by the backend; this crate
//! only speaks them.

pub mod error;
pub mod http;
pub mod types;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use aluna_core::{company_key, CompanyInfo};

pub use error::BackendError;
pub use http::HttpBackend;
pub use types::{
    Answer, AskRequest, JobAccepted, JobStatusReport, ScrapeForm, JOB_IN_PROGRESS,
};

/// The assistant backend as the client core sees it.
///
/// Implementations are shared across tasks; the exchange controller races
/// `ask_question` against a cancellation token and drops the future when the
/// turn is cancelled, so implementations must tolerate being abandoned
/// mid-flight.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Ask the company-scoped assistant one question.
    async fn ask_question(&self, request: AskRequest) -> Result<Answer, BackendError>;

    /// Fetch the metadata snapshot for one registered company.
    async fn get_company(&self, key: &str) -> Result<CompanyInfo, BackendError>;

    /// List all registered companies.
    async fn list_companies(&self) -> Result<Vec<CompanyInfo>, BackendError>;

    /// Remove a registered company.
    async fn delete_company(&self, key: &str) -> Result<(), BackendError>;

    /// Submit the registration form, starting a scraping job server-side.
    async fn submit_scrape_job(&self, form: ScrapeForm) -> Result<JobAccepted, BackendError>;

    /// Query the current status of a company's scraping job.
    async fn get_job_status(&self, key: &str) -> Result<JobStatusReport, BackendError>;
}

/// Scriptable backend for tests.
///
/// Answers and job statuses are consumed front-to-back from scripted queues;
/// when a queue runs dry the mock falls back to a deterministic echo answer
/// and a `"Completed"` status so loops always terminate. Query counters let
/// tests assert how often each endpoint was hit.
pub struct MockBackend {
    answers: Mutex<VecDeque<Result<Answer, BackendError>>>,
    statuses: Mutex<VecDeque<Result<JobStatusReport, BackendError>>>,
    companies: Mutex<Vec<CompanyInfo>>,
    latency: Option<Duration>,
    stall_asks: bool,
    ask_count: AtomicUsize,
    status_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            companies: Mutex::new(Vec::new()),
            latency: None,
            stall_asks: false,
            ask_count: AtomicUsize::new(0),
            status_count: AtomicUsize::new(0),
        }
    }

    /// A backend whose `ask_question` never resolves; used to exercise
    /// cancellation paths.
    pub fn stalled() -> Self {
        Self {
            stall_asks: true,
            ..Self::new()
        }
    }

    /// Script the next answer.
    pub fn with_answer(self, answer: &str) -> Self {
        self.answers
            .lock()
            .expect("answers mutex poisoned")
            .push_back(Ok(Answer {
                answer: answer.to_string(),
            }));
        self
    }

    /// Script the next ask to fail.
    pub fn with_ask_error(self, err: BackendError) -> Self {
        self.answers
            .lock()
            .expect("answers mutex poisoned")
            .push_back(Err(err));
        self
    }

    /// Script a sequence of job statuses, consumed one per query.
    pub fn with_statuses(self, statuses: &[&str]) -> Self {
        {
            let mut queue = self.statuses.lock().expect("statuses mutex poisoned");
            for status in statuses {
                queue.push_back(Ok(JobStatusReport::new(*status)));
            }
        }
        self
    }

    /// Script the next status query to fail with a transport error.
    pub fn with_status_error(self, message: &str) -> Self {
        self.statuses
            .lock()
            .expect("statuses mutex poisoned")
            .push_back(Err(BackendError::Network(message.to_string())));
        self
    }

    /// Pre-register a company.
    pub fn with_company(self, info: CompanyInfo) -> Self {
        self.companies
            .lock()
            .expect("companies mutex poisoned")
            .push(info);
        self
    }

    /// Delay every ask by the given latency.
    pub fn with_latency(self, latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..self
        }
    }

    /// How many times `ask_question` was called.
    pub fn ask_count(&self) -> usize {
        self.ask_count.load(Ordering::SeqCst)
    }

    /// How many times `get_job_status` was called.
    pub fn status_queries(&self) -> usize {
        self.status_count.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn ask_question(&self, request: AskRequest) -> Result<Answer, BackendError> {
        self.ask_count.fetch_add(1, Ordering::SeqCst);
        if self.stall_asks {
            std::future::pending::<()>().await;
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let scripted = self
            .answers
            .lock()
            .expect("answers mutex poisoned")
            .pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(Answer {
                answer: format!("Answer to: {}", request.question),
            }),
        }
    }

    async fn get_company(&self, key: &str) -> Result<CompanyInfo, BackendError> {
        self.companies
            .lock()
            .expect("companies mutex poisoned")
            .iter()
            .find(|c| c.key() == key)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(key.to_string()))
    }

    async fn list_companies(&self) -> Result<Vec<CompanyInfo>, BackendError> {
        Ok(self
            .companies
            .lock()
            .expect("companies mutex poisoned")
            .clone())
    }

    async fn delete_company(&self, key: &str) -> Result<(), BackendError> {
        let mut companies = self.companies.lock().expect("companies mutex poisoned");
        let before = companies.len();
        companies.retain(|c| c.key() != key);
        if companies.len() == before {
            return Err(BackendError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn submit_scrape_job(&self, form: ScrapeForm) -> Result<JobAccepted, BackendError> {
        if form.company_name.trim().is_empty() {
            return Err(BackendError::Validation(
                "company_name is required".to_string(),
            ));
        }
        if form.company_url.trim().is_empty() {
            return Err(BackendError::Validation(
                "company_url is required".to_string(),
            ));
        }
        let duplicate = self
            .companies
            .lock()
            .expect("companies mutex poisoned")
            .iter()
            .any(|c| company_key(&c.company_name) == company_key(&form.company_name));
        if duplicate {
            return Err(BackendError::Validation(format!(
                "company already exists: {}",
                form.company_name
            )));
        }
        self.companies
            .lock()
            .expect("companies mutex poisoned")
            .push(CompanyInfo {
                company_name: form.company_name.clone(),
                company_url: form.company_url.clone(),
                persona: form.persona.clone(),
                customer_name: form.customer_name.clone(),
                logo_id: None,
            });
        Ok(JobAccepted {
            message: "Scraping session started".to_string(),
        })
    }

    async fn get_job_status(&self, _key: &str) -> Result<JobStatusReport, BackendError> {
        self.status_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .statuses
            .lock()
            .expect("statuses mutex poisoned")
            .pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(JobStatusReport::new("Completed")),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
