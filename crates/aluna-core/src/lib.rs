//! Core crate for the Aluna client - shared types, errors, configuration.
//!
//! Everything here is UI-agnostic: the domain vocabulary of a conversation
//! (messages, senders, company snapshots), the top-level error type, and the
//! TOML configuration the composition root loads at startup.

pub mod config;
pub mod error;
pub mod types;

pub use config::AlunaConfig;
pub use error::{AlunaError, Result};
pub use types::{company_key, CompanyInfo, Message, Sender};
