//! CLI argument definitions for the Aluna client.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aluna — register a company and chat with its AI assistant.
#[derive(Parser, Debug)]
#[command(name = "aluna", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the assistant backend.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a company and track its scraping job to completion.
    Register {
        /// Company name.
        #[arg(long)]
        name: String,
        /// Company website to scrape.
        #[arg(long)]
        url: String,
        /// Assistant persona.
        #[arg(long, default_value = "Happy Helper")]
        persona: String,
        /// Customer name shown in the conversation.
        #[arg(long)]
        customer: Option<String>,
        /// Additional website to scrape (repeatable).
        #[arg(long = "website")]
        websites: Vec<String>,
        /// Company logo image.
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Document attachment (repeatable).
        #[arg(long = "attachment")]
        attachments: Vec<PathBuf>,
        /// Per-page scrape timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout_seconds: u64,
    },
    /// Chat with a registered company's assistant.
    Chat {
        /// Company key, e.g. `msbc_group`.
        key: String,
    },
    /// List registered companies.
    Companies,
    /// Remove a registered company.
    Remove {
        /// Company key to remove.
        key: String,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ALUNA_CONFIG env var > ~/.aluna/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ALUNA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".aluna").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".aluna").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_command() {
        let args = CliArgs::try_parse_from(["aluna", "chat", "msbc_group"]).unwrap();
        match args.command {
            Command::Chat { key } => assert_eq!(key, "msbc_group"),
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_parse_register_with_repeated_websites() {
        let args = CliArgs::try_parse_from([
            "aluna",
            "register",
            "--name",
            "MSBC Group",
            "--url",
            "https://msbcgroup.com",
            "--website",
            "https://a.example",
            "--website",
            "https://b.example",
        ])
        .unwrap();
        match args.command {
            Command::Register {
                name,
                websites,
                persona,
                timeout_seconds,
                ..
            } => {
                assert_eq!(name, "MSBC Group");
                assert_eq!(websites.len(), 2);
                assert_eq!(persona, "Happy Helper");
                assert_eq!(timeout_seconds, 30);
            }
            _ => panic!("expected register command"),
        }
    }

    #[test]
    fn test_register_requires_name_and_url() {
        assert!(CliArgs::try_parse_from(["aluna", "register", "--name", "X"]).is_err());
    }

    #[test]
    fn test_host_override() {
        let args =
            CliArgs::try_parse_from(["aluna", "--host", "http://10.0.0.2:8000", "companies"])
                .unwrap();
        assert_eq!(args.host.as_deref(), Some("http://10.0.0.2:8000"));
    }
}
