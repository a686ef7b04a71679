//! Oxpecker CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write a default config file
//! - `chat`    — Interactive chat or single-question mode
//! - `ingest`  — Chunk and embed documents against the backend

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "oxpecker",
    about = "Oxpecker — retrieval-augmented project chat",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Chat with the assistant
    Chat {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        question: Option<String>,

        /// Documents to ingest into the vector store before chatting
        #[arg(short, long = "source")]
        sources: Vec<std::path::PathBuf>,

        /// Project id to attach to the session
        #[arg(short, long)]
        project_id: Option<i64>,

        /// File whose contents are served as project data
        #[arg(long)]
        project_file: Option<std::path::PathBuf>,
    },

    /// Chunk and embed documents, reporting ingestion stats
    Ingest {
        /// Document files to ingest
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            question,
            sources,
            project_id,
            project_file,
        } => commands::chat::run(question, sources, project_id, project_file).await?,
        Commands::Ingest { files } => commands::ingest::run(files).await?,
    }

    Ok(())
}
