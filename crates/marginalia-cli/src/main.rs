use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "marginalia")]
#[command(about = "Marginalia CLI - sentence addresses, thread ids, navigation and vault", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split text into sentences the way the reader does
    Split {
        /// Message content; read from stdin when omitted
        text: Option<String>,
    },
    /// Encode or decode sentence addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Tell whether a thread id is in the legacy or current format
    Classify { thread_id: String },
    /// Parse an address-bar query into a navigation state
    Nav { query: String },
    /// Inspect the vault file
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum AddressAction {
    /// Build an address from its parts
    Encode {
        timestamp: String,
        message_index: usize,
        sentence_index: usize,
    },
    /// Split an address into its parts
    Decode { id: String },
}

#[derive(Subcommand)]
enum VaultAction {
    /// List vault items
    List {
        /// Only items that reference this thread
        #[arg(long)]
        thread: Option<String>,
    },
    /// Delete a vault item
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Split { text } => commands::text::split(text)?,
        Commands::Address { action } => match action {
            AddressAction::Encode {
                timestamp,
                message_index,
                sentence_index,
            } => commands::text::encode_address(&timestamp, message_index, sentence_index),
            AddressAction::Decode { id } => commands::text::decode_address(&id)?,
        },
        Commands::Classify { thread_id } => commands::text::classify(&thread_id),
        Commands::Nav { query } => commands::nav::parse(&query)?,
        Commands::Vault { action } => match action {
            VaultAction::List { thread } => commands::vault::list(thread.as_deref()).await?,
            VaultAction::Delete { id } => commands::vault::delete(&id).await?,
        },
        Commands::Config => commands::config::show()?,
    }

    Ok(())
}
