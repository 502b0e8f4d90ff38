//! Conversational core for the Aluna client.
//!
//! Provides the transcript store, the voice input adapter, the exchange
//! controller that runs one turn at a time against the assistant backend,
//! and the per-conversation session wiring.

pub mod error;
pub mod exchange;
pub mod session;
pub mod transcript;
pub mod voice;

pub use error::ChatError;
pub use exchange::{ChatEvent, ExchangeConfig, ExchangeController, TurnSnapshot};
pub use session::ChatSession;
pub use transcript::{TranscriptEvent, TranscriptStore};
pub use voice::{VoiceAdapter, VoiceState};
