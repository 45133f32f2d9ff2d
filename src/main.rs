//! # pdfqa CLI
//!
//! ```bash
//! pdfqa serve                 # start the HTTP API
//! pdfqa chat paper.pdf        # index one PDF and chat in the terminal
//! ```
//!
//! Settings come from an optional TOML file (`--config pdfqa.toml`);
//! defaults cover everything but the API key, which is read from
//! `openai_key.txt` or `OPENAI_API_KEY`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use pdfqa::completion::OpenAiCompletion;
use pdfqa::config::{load_config, resolve_api_key, Config};
use pdfqa::embedding::OpenAiEmbedder;
use pdfqa::pipeline::QaEngine;
use pdfqa::repl;
use pdfqa::server::run_server;

/// Retrieval-augmented question answering over PDF documents.
#[derive(Parser)]
#[command(
    name = "pdfqa",
    about = "Ask questions about a PDF, answered from its own text with citations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    ///
    /// Endpoints: POST /upload-document, POST /chat, GET /documents,
    /// GET /health. Requires an API key at start-up.
    Serve,

    /// Index a PDF and answer questions interactively.
    Chat {
        /// Path to the PDF to index.
        pdf: PathBuf,
    },
}

fn build_engine(config: Config, api_key: String) -> Result<QaEngine> {
    let embedder = OpenAiEmbedder::new(&config.openai, api_key.clone())?;
    let completion = OpenAiCompletion::new(&config.openai, api_key)?;
    Ok(QaEngine::new(config, Box::new(embedder), Box::new(completion)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            let api_key = resolve_api_key(&config).ok_or_else(|| {
                anyhow::anyhow!(
                    "API key not found: put it in {} or set OPENAI_API_KEY",
                    config.openai.key_file
                )
            })?;
            let engine = Arc::new(build_engine(config.clone(), api_key)?);
            run_server(&config, engine).await
        }
        Commands::Chat { pdf } => {
            let api_key = match resolve_api_key(&config) {
                Some(key) => key,
                None => repl::prompt_api_key()?,
            };
            let engine = Arc::new(build_engine(config, api_key)?);
            repl::run_chat(engine, &pdf).await
        }
    }
}
