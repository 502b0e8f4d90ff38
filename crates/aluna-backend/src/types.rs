//! Wire types exchanged with the assistant backend.
//!
//! Field names mirror the backend's JSON surface; the formats themselves are
//! owned by the backend.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The status string a still-running scraping job reports.
pub const JOB_IN_PROGRESS: &str = "In Progress";

/// One question for the company-scoped assistant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub company: String,
    #[serde(default)]
    pub persona: String,
}

/// The assistant's answer to one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
}

/// Everything the registration form collects for one company.
///
/// File fields carry local paths; their contents are uploaded as multipart
/// parts. Validating the files themselves is the backend's concern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrapeForm {
    pub company_name: String,
    pub company_url: String,
    pub additional_websites: Vec<String>,
    pub persona: String,
    pub customer_name: String,
    pub timeout_seconds: u64,
    pub logo: Option<PathBuf>,
    pub attachments: Vec<PathBuf>,
}

/// Acknowledgement that a scraping job was accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAccepted {
    #[serde(default)]
    pub message: String,
}

/// One point-in-time answer to a job-status query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub status: String,
}

impl JobStatusReport {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    /// Whether the job is still running (the non-terminal sentinel).
    pub fn in_progress(&self) -> bool {
        self.status == JOB_IN_PROGRESS
    }

    /// Whether a terminal status describes a failed job. Anything that is
    /// neither the sentinel nor a failure counts as successful completion.
    pub fn is_failure(&self) -> bool {
        let status = self.status.to_lowercase();
        status.contains("fail") || status == "timed out"
    }
}

// =============================================================================
// Tests
// =============================================================================
