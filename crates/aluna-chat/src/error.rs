//! Error types for the conversational core.

use aluna_core::AlunaError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The submitted prompt was empty after trimming. No state changed.
    #[error("prompt cannot be empty")]
    EmptyPrompt,
    /// A turn is already in flight; the submission was rejected unchanged.
    #[error("a turn is already in flight")]
    TurnInFlight,
    /// Speech recognition is not available in this environment.
    #[error("voice input is unavailable")]
    VoiceUnavailable,
    /// The adapter is already capturing an utterance.
    #[error("voice capture is already active")]
    AlreadyListening,
    /// An internal transcript invariant was broken. This indicates a
    /// controller bug and must never be silently ignored.
    #[error("transcript contract violated: {0}")]
    ContractViolation(String),
}

impl From<ChatError> for AlunaError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::VoiceUnavailable | ChatError::AlreadyListening => {
                AlunaError::Voice(err.to_string())
            }
            other => AlunaError::Chat(other.to_string()),
        }
    }
}
