use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who authored a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The operator typing or speaking into the client.
    User,
    /// The company-scoped AI assistant.
    Assistant,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

// =============================================================================
// Messages
// =============================================================================

/// One entry in a conversation transcript.
///
/// A message is immutable once committed. A pending message is a transient
/// placeholder ("assistant is typing") that is either replaced by the real
/// answer or removed on cancel/error; it never survives a settled turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub pending: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A committed message from the operator.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            pending: false,
            created_at: Utc::now(),
        }
    }

    /// A committed answer from the assistant.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Assistant,
            pending: false,
            created_at: Utc::now(),
        }
    }

    /// A pending assistant placeholder awaiting the real answer.
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::new_v4(),
            text: String::new(),
            sender: Sender::Assistant,
            pending: true,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Company metadata
// =============================================================================

/// Read-mostly metadata describing a registered company.
///
/// Fetched once when a conversation session opens and held as an immutable
/// snapshot for the session's lifetime; a stale snapshot is acceptable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub company_name: String,
    #[serde(default)]
    pub company_url: String,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub customer_name: String,
    /// Identifier of the stored logo asset, if one was uploaded.
    #[serde(default)]
    pub logo_id: Option<String>,
}

impl CompanyInfo {
    /// The normalized key this company is addressed by.
    pub fn key(&self) -> String {
        company_key(&self.company_name)
    }
}

/// Normalize a company name into the key used for chat and job-status
/// lookups: lowercase, every whitespace run collapsed to one underscore.
pub fn company_key(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

// =============================================================================
// Tests
// =============================================================================
