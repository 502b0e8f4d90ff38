//! Aluna client binary - composition root.
//!
//! Ties the crates together into a terminal front-end:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the HTTP backend client
//! 4. Dispatch: register a company (and track its scraping job), chat with a
//!    registered company, or list/remove companies
//!
//! The terminal has no speech capability, so the voice adapter reports
//! unavailability and the chat runs on typed input alone.

mod cli;

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncBufReadExt;

use aluna_backend::{AssistantBackend, HttpBackend, ScrapeForm};
use aluna_chat::{ChatEvent, ChatSession, ExchangeConfig, TranscriptEvent};
use aluna_core::{company_key, AlunaConfig};
use aluna_jobs::register_company;

use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let config = AlunaConfig::load_or_default(&config_file);

    // Tracing. Priority: RUST_LOG env > --log-level flag > config file.
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    tracing::info!("Starting Aluna v{}", env!("CARGO_PKG_VERSION"));

    let host = args
        .host
        .clone()
        .unwrap_or_else(|| config.backend.host.clone());
    let backend = Arc::new(HttpBackend::new(&host, config.backend.request_timeout())?);

    match args.command {
        Command::Register {
            name,
            url,
            persona,
            customer,
            websites,
            logo,
            attachments,
            timeout_seconds,
        } => {
            let form = ScrapeForm {
                company_name: name,
                company_url: url,
                additional_websites: websites,
                persona,
                customer_name: customer.unwrap_or_default(),
                timeout_seconds,
                logo,
                attachments,
            };
            run_register(backend, form, &config).await?;
        }
        Command::Chat { key } => run_chat(backend, &key, &config).await?,
        Command::Companies => {
            let companies = backend.list_companies().await?;
            if companies.is_empty() {
                println!("No companies registered yet.");
            }
            for company in companies {
                println!(
                    "{:<24} {} ({})",
                    company.key(),
                    company.company_name,
                    company.persona
                );
            }
        }
        Command::Remove { key } => {
            backend.delete_company(&key).await?;
            println!("Removed {key}.");
        }
    }

    Ok(())
}

/// Submit the registration form, follow the scraping job to its terminal
/// status, then offer the hand-off into the chat.
async fn run_register(
    backend: Arc<HttpBackend>,
    form: ScrapeForm,
    config: &AlunaConfig,
) -> Result<(), Box<dyn Error>> {
    let key = company_key(&form.company_name);
    let (terminal_tx, terminal_rx) = tokio::sync::oneshot::channel();

    let (accepted, _handle) = register_company(
        Arc::clone(&backend),
        form,
        config.jobs.poll_interval(),
        move |report| {
            let _ = terminal_tx.send(report);
        },
    )
    .await?;

    if accepted.message.is_empty() {
        println!("Form saved, starting scraping session");
    } else {
        println!("{}", accepted.message);
    }
    println!("Tracking scraping job for {key} (Ctrl-C abandons tracking)...");

    let report = terminal_rx.await?;
    if report.is_failure() {
        eprintln!("Scraping session ended: {}", report.status);
        return Ok(());
    }

    println!("Scraping session completed. Proceed to chatbot? [y/N]");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    if let Ok(Some(line)) = lines.next_line().await {
        if matches!(line.trim().to_lowercase().as_str(), "y" | "yes") {
            run_chat(backend, &key, config).await?;
        }
    }
    Ok(())
}

/// Line-oriented chat loop. Plain lines are submitted as prompts; `/cancel`
/// interrupts the in-flight turn and `/quit` leaves the session.
async fn run_chat(
    backend: Arc<HttpBackend>,
    key: &str,
    config: &AlunaConfig,
) -> Result<(), Box<dyn Error>> {
    let exchange_config = ExchangeConfig {
        placeholder_delay: config.chat.placeholder_delay(),
    };
    let mut session = ChatSession::open(backend, key, exchange_config, false).await?;
    let mut events = session.subscribe();
    let mut transcript_events = session.subscribe_transcript();

    let company = session.company().clone();
    println!(
        "Chatting with {} ({}). /cancel interrupts, /quit exits.",
        company.company_name,
        if company.persona.is_empty() {
            "default persona"
        } else {
            company.persona.as_str()
        }
    );

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {}
                    "/quit" => break,
                    "/cancel" => session.cancel(),
                    text => {
                        if let Err(e) = session.submit(text) {
                            eprintln!("! {e}");
                        }
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(ChatEvent::TurnCompleted { .. }) => {
                        if let Some(last) = session.messages().last() {
                            println!("{}: {}", company.company_name, last.text);
                        }
                    }
                    Ok(ChatEvent::TurnFailed { message, .. }) => {
                        eprintln!("! {message}");
                    }
                    Ok(ChatEvent::TurnCancelled { .. }) => println!("(cancelled)"),
                    Ok(ChatEvent::TurnStarted { .. }) => {}
                    Err(_) => {}
                }
            }
            event = transcript_events.recv() => {
                if let Ok(TranscriptEvent::Appended { .. }) = event {
                    // Show the typing indicator when the placeholder lands.
                    if session.messages().last().is_some_and(|m| m.pending) {
                        println!("...");
                    }
                }
            }
        }
    }

    Ok(())
}
