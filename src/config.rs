//! TOML configuration and credential loading.
//!
//! All settings have defaults matching the original pipeline constants
//! (chunk size 800 chars, overlap 200, top-5 retrieval, 512 output tokens),
//! so a config file is optional. Validation happens once at load time; the
//! rest of the crate can assume a well-formed [`Config`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub openai: OpenAiConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk length in characters.
    pub size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: 800,
            overlap: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest chunks fed to the model per question.
    pub top_k: usize,
    /// Conversation turns (messages) included in each prompt.
    pub history_window: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            history_window: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub embed_model: String,
    pub chat_model: String,
    /// Line-oriented key file; first non-blank, non-comment line wins.
    pub key_file: String,
    pub timeout_secs: u64,
    pub max_output_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            embed_model: "text-embedding-ada-002".to_string(),
            chat_model: "gpt-4".to_string(),
            key_file: "openai_key.txt".to_string(),
            timeout_secs: 60,
            max_output_tokens: 512,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Upper bound on concurrently held documents. Uploads beyond this are
    /// rejected; nothing is evicted.
    pub max_documents: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            max_documents: 64,
        }
    }
}

/// Load configuration from a TOML file, or defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file: {}", p.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.size == 0 {
        anyhow::bail!("chunking.size must be > 0");
    }
    if config.chunking.overlap >= config.chunking.size {
        anyhow::bail!(
            "chunking.overlap ({}) must be smaller than chunking.size ({})",
            config.chunking.overlap,
            config.chunking.size
        );
    }
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.server.max_documents < 1 {
        anyhow::bail!("server.max_documents must be >= 1");
    }
    if config.openai.embed_model.is_empty() || config.openai.chat_model.is_empty() {
        anyhow::bail!("openai.embed_model and openai.chat_model must be set");
    }
    Ok(())
}

/// Read the API key from a line-oriented key file: the first line that is
/// neither blank nor a `#` comment. Returns `None` when the file is missing
/// or holds no usable line.
pub fn read_key_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// Resolve the API key: key file first, then `OPENAI_API_KEY`.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    read_key_file(Path::new(&config.openai.key_file))
        .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
}
