//! Per-conversation wiring of the controller and the voice adapter.
//!
//! A session fetches the company snapshot once when it opens, then routes
//! typed submissions, cancellations, and finalized voice utterances into the
//! exchange controller. The transcript is never touched directly from here.

use std::sync::Arc;

use uuid::Uuid;

use aluna_backend::{AssistantBackend, BackendError};
use aluna_core::{CompanyInfo, Message};

use crate::error::ChatError;
use crate::exchange::{ChatEvent, ExchangeConfig, ExchangeController};
use crate::transcript::TranscriptEvent;
use crate::voice::{VoiceAdapter, VoiceState};

/// One conversation with one company.
pub struct ChatSession<B> {
    controller: ExchangeController<B>,
    voice: VoiceAdapter,
}

impl<B: AssistantBackend + 'static> ChatSession<B> {
    /// Open a session for the given company key.
    ///
    /// The company snapshot is fetched once and held for the session's
    /// lifetime; a stale snapshot is acceptable.
    pub async fn open(
        backend: Arc<B>,
        key: &str,
        config: ExchangeConfig,
        voice_supported: bool,
    ) -> Result<Self, BackendError> {
        let company = backend.get_company(key).await?;
        tracing::info!(company = %company.company_name, "Chat session opened");
        Ok(Self {
            controller: ExchangeController::new(backend, company, config),
            voice: VoiceAdapter::new(voice_supported),
        })
    }

    /// Submit a typed prompt. An accepted submission supersedes any voice
    /// session in progress.
    pub fn submit(&mut self, text: &str) -> Result<Uuid, ChatError> {
        let result = self.controller.submit(text);
        if result.is_ok() {
            self.voice.reset();
        }
        result
    }

    /// Cancel the in-flight turn, if any.
    pub fn cancel(&self) {
        self.controller.cancel();
    }

    /// Begin a voice listening session. Refused while a turn is processing.
    pub fn start_listening(&mut self) -> Result<(), ChatError> {
        self.voice.start_listening(self.controller.is_processing())
    }

    /// End the voice listening session without submitting.
    pub fn stop_listening(&mut self) {
        self.voice.stop_listening();
    }

    /// Deliver a finalized utterance from the speech capability.
    ///
    /// Forwards the utterance to `submit` exactly once per listening
    /// session; duplicates are dropped and return `None`.
    pub fn voice_final(&mut self, transcript: &str) -> Option<Result<Uuid, ChatError>> {
        let utterance = self.voice.finalize_utterance(transcript)?;
        Some(self.controller.submit(&utterance))
    }

    pub fn is_processing(&self) -> bool {
        self.controller.is_processing()
    }

    pub fn voice_state(&self) -> VoiceState {
        self.voice.state()
    }

    pub fn company(&self) -> &CompanyInfo {
        self.controller.company()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.controller.messages()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ChatEvent> {
        self.controller.subscribe()
    }

    pub fn subscribe_transcript(&self) -> tokio::sync::broadcast::Receiver<TranscriptEvent> {
        self.controller.subscribe_transcript()
    }
}

// =============================================================================
// Tests
// =============================================================================
