//! # chamber
//!
//! Drive a single chat client under test by hand: launch it, then send it
//! the same control calls an orchestrator would.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chamber_client::{ClientHandle, ControlResponse, ReqwestTransport, wait_until_ready};
use chamber_settings::ChamberSettings;
use clap::{Parser, Subcommand};
use tracing::info;

/// Control-plane client for chat implementations under test.
#[derive(Parser, Debug)]
#[command(name = "chamber", about = "Drive a chat client under test")]
struct Cli {
    /// Port the client's control server listens on.
    #[arg(long, short)]
    port: u16,

    /// Participant identifier used in control messages.
    #[arg(long = "id", default_value = "chamber")]
    identifier: String,

    /// Log level (overrides settings; `RUST_LOG` overrides both).
    #[arg(long)]
    log_level: Option<String>,

    /// Settings file (defaults to `~/.chamber/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the client process and leave it running.
    Launch {
        /// Executable implementing the client.
        executable: PathBuf,
        /// Arguments passed to the executable after `--` (usually including the port).
        #[arg(last = true)]
        args: Vec<String>,
        /// Wait until the control port accepts connections.
        #[arg(long)]
        wait: bool,
    },
    /// POST /joined with the participants already present.
    Joined {
        /// Identifiers of clients already in the simulation.
        participants: Vec<String>,
    },
    /// POST /prompt asking the client to send a message.
    Prompt {
        /// Recipient identifier.
        to: String,
        /// Message content.
        message: String,
    },
    /// POST /received telling the client a message arrived.
    Received {
        /// Sender identifier.
        from: String,
        /// Message content.
        message: String,
        /// Receipt timestamp (defaults to now, RFC 3339).
        #[arg(long)]
        when: Option<String>,
    },
    /// POST /disconnect asking the client to exit.
    Disconnect,
}

fn load_settings(path: Option<&PathBuf>) -> Result<ChamberSettings> {
    match path {
        Some(path) => chamber_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => chamber_settings::load_settings().context("Failed to load settings"),
    }
}

fn print_response(response: &ControlResponse) {
    println!("{}", response.status);
    if !response.body.is_empty() {
        println!("{}", response.text());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;

    let _ = chamber_client::logging::init_subscriber(&settings.logging, cli.log_level.as_deref());

    let transport = Arc::new(
        ReqwestTransport::new(&settings.transport).context("Failed to build control transport")?,
    );

    match cli.command {
        Command::Launch {
            executable,
            args,
            wait,
        } => {
            let mut handle =
                ClientHandle::with_transport(&executable, &cli.identifier, cli.port, transport);
            handle
                .start(&args)
                .with_context(|| format!("Failed to launch {}", executable.display()))?;
            info!(identifier = %cli.identifier, pid = ?handle.pid(), "client launched");

            if wait {
                let waited = wait_until_ready(cli.port, &settings.readiness).await?;
                let waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
                info!(port = cli.port, waited_ms, "client ready");
            }
            if let Some(pid) = handle.pid() {
                println!("{pid}");
            }
        }
        Command::Joined { participants } => {
            let mut handle = control_handle(&cli.identifier, cli.port, transport);
            print_response(&handle.notify_joined(participants).await?);
        }
        Command::Prompt { to, message } => {
            let handle = control_handle(&cli.identifier, cli.port, transport);
            print_response(&handle.prompt_send(to, message).await?);
        }
        Command::Received {
            from,
            message,
            when,
        } => {
            let handle = control_handle(&cli.identifier, cli.port, transport);
            let when = when.unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
            print_response(&handle.notify_received(from, message, when).await?);
        }
        Command::Disconnect => {
            let mut handle = control_handle(&cli.identifier, cli.port, transport);
            print_response(&handle.disconnect().await?);
        }
    }

    Ok(())
}

/// A handle for control calls only; its process was launched elsewhere.
fn control_handle(identifier: &str, port: u16, transport: Arc<ReqwestTransport>) -> ClientHandle {
    ClientHandle::with_transport(PathBuf::new(), identifier, port, transport)
}
