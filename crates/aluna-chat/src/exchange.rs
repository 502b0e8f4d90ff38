//! Exchange controller: one request/response turn at a time.
//!
//! Orchestrates a turn's lifecycle: optimistic append of the user's message,
//! a delayed pending placeholder, the backend request raced against the
//! turn's cancellation token, and commit/rollback on settlement.
//!
//! Every deferred task (the placeholder timer and the request settlement)
//! re-checks turn identity under the state lock before mutating anything, so
//! a cancelled turn's late result can never corrupt the transcript, and a
//! placeholder can never appear for a turn that already settled.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use aluna_backend::{AskRequest, AssistantBackend};
use aluna_core::{CompanyInfo, Message};

use crate::error::ChatError;
use crate::transcript::{TranscriptEvent, TranscriptStore};

/// Tuning for one exchange controller.
#[derive(Clone, Debug)]
pub struct ExchangeConfig {
    /// How long a turn may run before the pending placeholder is inserted.
    /// Turns that settle sooner never show a placeholder.
    pub placeholder_delay: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            placeholder_delay: Duration::from_millis(300),
        }
    }
}

/// Turn lifecycle notifications for the surrounding UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEvent {
    TurnStarted { turn: Uuid },
    /// The turn settled successfully; input focus may return to the entry
    /// point.
    TurnCompleted { turn: Uuid },
    TurnCancelled { turn: Uuid },
    /// The turn failed; `message` is the user-visible notification. The
    /// transcript keeps the user's message and nothing else from this turn.
    TurnFailed { turn: Uuid, message: String },
}

/// Read-only view of the turn currently in flight.
#[derive(Clone, Debug)]
pub struct TurnSnapshot {
    pub id: Uuid,
    pub prompt: String,
    pub started_at: DateTime<Utc>,
}

/// One in-flight exchange, including its cancellation identity.
struct Turn {
    id: Uuid,
    prompt: String,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
    placeholder_inserted: bool,
}

struct Inner {
    transcript: TranscriptStore,
    turn: Option<Turn>,
}

impl Inner {
    /// Insert the pending placeholder if the given turn is still in flight.
    fn insert_placeholder(&mut self, turn_id: Uuid) -> bool {
        let turn = match self.turn.as_mut() {
            Some(turn) if turn.id == turn_id => turn,
            _ => return false,
        };
        turn.placeholder_inserted = true;
        self.transcript.append(Message::placeholder());
        true
    }
}

/// Coordinates turns against one transcript.
///
/// The company snapshot and tuning are explicit construction-time
/// configuration. Spawned work requires a running tokio runtime.
pub struct ExchangeController<B> {
    backend: Arc<B>,
    company: CompanyInfo,
    config: ExchangeConfig,
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<ChatEvent>,
}

impl<B: AssistantBackend + 'static> ExchangeController<B> {
    pub fn new(backend: Arc<B>, company: CompanyInfo, config: ExchangeConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            backend,
            company,
            config,
            inner: Arc::new(Mutex::new(Inner {
                transcript: TranscriptStore::new(),
                turn: None,
            })),
            events,
        }
    }

    /// Submit one prompt, starting a turn.
    ///
    /// Rejected with no state change if the trimmed prompt is empty or a
    /// turn is already in flight (the UI disables input while processing,
    /// but the controller does not rely on that).
    pub fn submit(&self, text: &str) -> Result<Uuid, ChatError> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let (turn_id, cancel) = {
            let mut inner = self.inner.lock().expect("exchange state poisoned");
            if inner.turn.is_some() {
                return Err(ChatError::TurnInFlight);
            }
            inner.transcript.append(Message::user(prompt));
            let turn = Turn {
                id: Uuid::new_v4(),
                prompt: prompt.to_string(),
                cancel: CancellationToken::new(),
                started_at: Utc::now(),
                placeholder_inserted: false,
            };
            let pair = (turn.id, turn.cancel.clone());
            inner.turn = Some(turn);
            pair
        };

        tracing::debug!(turn = %turn_id, "Turn started");
        let _ = self.events.send(ChatEvent::TurnStarted { turn: turn_id });

        self.spawn_placeholder(turn_id, cancel.clone());
        self.spawn_request(turn_id, prompt.to_string(), cancel);
        Ok(turn_id)
    }

    /// Cancel the in-flight turn, if any. Idempotent.
    ///
    /// The pending placeholder is removed; the user's message stays. A
    /// settlement arriving after this point is discarded by turn-identity
    /// check.
    pub fn cancel(&self) {
        let cancelled = {
            let mut inner = self.inner.lock().expect("exchange state poisoned");
            match inner.turn.take() {
                None => None,
                Some(turn) => {
                    turn.cancel.cancel();
                    if turn.placeholder_inserted {
                        if let Err(e) = inner.transcript.drop_last() {
                            tracing::error!(error = %e, "Rollback failed on cancel");
                        }
                    }
                    Some(turn.id)
                }
            }
        };

        if let Some(turn_id) = cancelled {
            tracing::debug!(turn = %turn_id, "Turn cancelled");
            let _ = self.events.send(ChatEvent::TurnCancelled { turn: turn_id });
        }
    }

    /// Whether a turn is currently in flight.
    pub fn is_processing(&self) -> bool {
        self.inner
            .lock()
            .expect("exchange state poisoned")
            .turn
            .is_some()
    }

    /// Snapshot of the current transcript.
    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .lock()
            .expect("exchange state poisoned")
            .transcript
            .messages()
            .to_vec()
    }

    /// Number of pending placeholders currently in the transcript.
    pub fn pending_count(&self) -> usize {
        self.inner
            .lock()
            .expect("exchange state poisoned")
            .transcript
            .pending_count()
    }

    /// The turn currently in flight, if any.
    pub fn current_turn(&self) -> Option<TurnSnapshot> {
        self.inner
            .lock()
            .expect("exchange state poisoned")
            .turn
            .as_ref()
            .map(|turn| TurnSnapshot {
                id: turn.id,
                prompt: turn.prompt.clone(),
                started_at: turn.started_at,
            })
    }

    /// The company snapshot this controller was built with.
    pub fn company(&self) -> &CompanyInfo {
        &self.company
    }

    /// Subscribe to turn lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Subscribe to transcript mutation events.
    pub fn subscribe_transcript(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.inner
            .lock()
            .expect("exchange state poisoned")
            .transcript
            .subscribe()
    }

    fn spawn_placeholder(&self, turn_id: Uuid, cancel: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        let delay = self.config.placeholder_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let mut inner = inner.lock().expect("exchange state poisoned");
                    if inner.insert_placeholder(turn_id) {
                        tracing::debug!(turn = %turn_id, "Placeholder inserted");
                    }
                }
            }
        });
    }

    fn spawn_request(&self, turn_id: Uuid, prompt: String, cancel: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let request = AskRequest {
            question: prompt,
            company: self.company.key(),
            persona: self.company.persona.clone(),
        };

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    // cancel() already rolled the transcript back; the wire
                    // request is abandoned here and may finish server-side.
                    tracing::debug!(turn = %turn_id, "Request abandoned after cancellation");
                    return;
                }
                result = backend.ask_question(request) => result,
            };

            let mut inner = inner.lock().expect("exchange state poisoned");
            if inner.turn.as_ref().map(|turn| turn.id) != Some(turn_id) {
                tracing::debug!(turn = %turn_id, "Discarding stale settlement");
                return;
            }
            let turn = inner.turn.take().expect("active turn present");

            match result {
                Ok(answer) => {
                    let message = Message::assistant(answer.answer);
                    if turn.placeholder_inserted {
                        if let Err(e) = inner.transcript.replace_last(message) {
                            tracing::error!(error = %e, "Commit failed");
                        }
                    } else {
                        inner.transcript.append(message);
                    }
                    drop(inner);
                    tracing::debug!(turn = %turn_id, "Turn completed");
                    let _ = events.send(ChatEvent::TurnCompleted { turn: turn_id });
                }
                Err(e) => {
                    if turn.placeholder_inserted {
                        if let Err(v) = inner.transcript.drop_last() {
                            tracing::error!(error = %v, "Rollback failed on error");
                        }
                    }
                    drop(inner);
                    tracing::warn!(turn = %turn_id, error = %e, "Turn failed");
                    let _ = events.send(ChatEvent::TurnFailed {
                        turn: turn_id,
                        message: e.to_string(),
                    });
                }
            }
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
