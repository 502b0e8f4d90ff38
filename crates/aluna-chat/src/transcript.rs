//! Ordered message log for one conversation.
//!
//! The transcript is owned exclusively by the exchange controller; nothing
//! else mutates it. Mutations notify subscribers through a broadcast channel
//! so the surrounding UI can re-render.
//!
//! Invariant: at most one message is pending at any time, and if one is, it
//! is the last entry. `replace_last` and `drop_last` exist solely to settle
//! or roll back that trailing placeholder; calling them in any other
//! situation is a controller bug surfaced as `ContractViolation`.

use tokio::sync::broadcast;

use aluna_core::Message;

use crate::error::ChatError;

/// Notification of one transcript mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// A message was appended at `index`.
    Appended { index: usize },
    /// The pending placeholder at `index` was replaced by a committed message.
    Replaced { index: usize },
    /// The pending placeholder at `index` was removed.
    Dropped { index: usize },
}

/// Append-only message log with pending-placeholder settlement.
pub struct TranscriptStore {
    messages: Vec<Message>,
    events: broadcast::Sender<TranscriptEvent>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            messages: Vec::new(),
            events,
        }
    }

    /// Subscribe to mutation notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.events.subscribe()
    }

    /// Append a message, returning its position. Never fails.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(message);
        let index = self.messages.len() - 1;
        let _ = self.events.send(TranscriptEvent::Appended { index });
        index
    }

    /// Replace the trailing pending placeholder with a committed message.
    pub fn replace_last(&mut self, message: Message) -> Result<(), ChatError> {
        match self.messages.last() {
            None => Err(ChatError::ContractViolation(
                "replace_last on empty transcript".to_string(),
            )),
            Some(last) if !last.pending => Err(ChatError::ContractViolation(
                "replace_last on a committed message".to_string(),
            )),
            Some(_) => {
                let index = self.messages.len() - 1;
                self.messages[index] = message;
                let _ = self.events.send(TranscriptEvent::Replaced { index });
                Ok(())
            }
        }
    }

    /// Remove the trailing pending placeholder.
    pub fn drop_last(&mut self) -> Result<(), ChatError> {
        match self.messages.last() {
            None => Err(ChatError::ContractViolation(
                "drop_last on empty transcript".to_string(),
            )),
            Some(last) if !last.pending => Err(ChatError::ContractViolation(
                "drop_last on a committed message".to_string(),
            )),
            Some(_) => {
                self.messages.pop();
                let index = self.messages.len();
                let _ = self.events.send(TranscriptEvent::Dropped { index });
                Ok(())
            }
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of pending placeholders currently held (0 or 1 by invariant).
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
