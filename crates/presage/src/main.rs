//! presage - a conversational pre-sales assistant

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;

use commands::{chat_command, ingest_command, init_command, login_command, status_command};

/// presage - pre-sales engineering assistant for your terminal
#[derive(Parser)]
#[command(name = "presage")]
#[command(about = "Conversational pre-sales assistant with retrieval tools")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config and data directories
    Init,
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of starting the interactive loop
        #[arg(short, long)]
        message: Option<String>,
        /// Conversation name
        #[arg(short, long, default_value = "default")]
        conversation: String,
    },
    /// Ingest a document into the vector index
    Ingest {
        /// Local file to ingest
        #[arg(short, long)]
        file: Option<String>,
        /// Document URL to download and ingest
        #[arg(short, long)]
        url: Option<String>,
        /// Target collection
        #[arg(short, long)]
        collection: String,
    },
    /// Save a knowledge-portal access token
    Login,
    /// Show configuration and index status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt::init();
    }

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("Init failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Chat {
            message,
            conversation,
        } => {
            if let Err(e) = chat_command(message, conversation).await {
                error!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Ingest {
            file,
            url,
            collection,
        } => {
            if let Err(e) = ingest_command(file, url, collection).await {
                error!("Ingest failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Login => {
            if let Err(e) = login_command().await {
                error!("Login failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = status_command().await {
                error!("Status failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
