//! plugchat CLI
//!
//! Terminal client for plugchat backends.
//!
//! # Commands
//!
//! - `chat` - Interactive session: poll for messages, send from stdin
//! - `send` - Send a single message and exit
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// plugchat command-line client.
#[derive(Parser)]
#[command(name = "plugchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the message backend
    #[arg(global = true, short, long)]
    url: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: poll for messages, send from stdin
    Chat {
        /// Display name to chat under
        #[arg(short, long)]
        nickname: Option<String>,

        /// Poll interval in seconds
        #[arg(short, long, default_value = "10")]
        interval: u64,
    },

    /// Send a single message and exit
    Send {
        /// Display name to send under
        #[arg(short, long)]
        nickname: Option<String>,

        /// Message text
        message: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Chat { nickname, interval } => {
            let url = cli.url.ok_or("Backend URL required for chat")?;
            commands::chat::run(&url, nickname, Duration::from_secs(interval)).await?;
        }
        Commands::Send { nickname, message } => {
            let url = cli.url.ok_or("Backend URL required for send")?;
            commands::send::run(&url, nickname, &message).await?;
        }
        Commands::Version => {
            println!("plugchat {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
