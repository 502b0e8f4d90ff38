//! Voice input adapter for the conversational core.
//!
//! Wraps a speech-to-text capability into a single "utterance committed"
//! event. Listening is mutually exclusive with an in-flight turn, and a
//! finalized utterance is delivered at most once per listening session;
//! duplicate finalization events from the capability are suppressed.

use crate::error::ChatError;

/// Capture state of the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceState {
    /// Not capturing. Ready to start.
    Idle,
    /// Actively capturing an utterance.
    Listening,
}

/// State machine between the speech capability and the exchange controller.
#[derive(Debug)]
pub struct VoiceAdapter {
    state: VoiceState,
    supported: bool,
    delivered: bool,
}

impl VoiceAdapter {
    /// Create an adapter. Unavailability is reported once, here; later start
    /// attempts fail without retrying the capability probe.
    pub fn new(supported: bool) -> Self {
        if !supported {
            tracing::warn!("Speech recognition is unavailable; voice input disabled");
        }
        Self {
            state: VoiceState::Idle,
            supported,
            delivered: false,
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn available(&self) -> bool {
        self.supported
    }

    /// Begin a listening session. Refused while a turn is being processed;
    /// the adapter stays `Idle` in that case.
    pub fn start_listening(&mut self, processing: bool) -> Result<(), ChatError> {
        if !self.supported {
            return Err(ChatError::VoiceUnavailable);
        }
        if processing {
            return Err(ChatError::TurnInFlight);
        }
        if self.state == VoiceState::Listening {
            return Err(ChatError::AlreadyListening);
        }
        self.state = VoiceState::Listening;
        self.delivered = false;
        tracing::debug!("Voice capture started");
        Ok(())
    }

    /// Explicitly end the listening session without an utterance. Idempotent.
    pub fn stop_listening(&mut self) {
        if self.state == VoiceState::Listening {
            tracing::debug!("Voice capture stopped");
        }
        self.state = VoiceState::Idle;
    }

    /// Deliver a finalized utterance from the capability.
    ///
    /// Returns the utterance to submit exactly once per listening session;
    /// duplicate finalization events and empty transcripts yield `None`.
    pub fn finalize_utterance(&mut self, transcript: &str) -> Option<String> {
        if self.state != VoiceState::Listening || self.delivered {
            return None;
        }
        let utterance = transcript.trim();
        if utterance.is_empty() {
            return None;
        }
        self.delivered = true;
        self.state = VoiceState::Idle;
        Some(utterance.to_string())
    }

    /// Clear capture state. Used when a typed submission supersedes the
    /// current voice session.
    pub fn reset(&mut self) {
        self.state = VoiceState::Idle;
        self.delivered = false;
    }
}

// =============================================================================
// Tests
// =============================================================================
