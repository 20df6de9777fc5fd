//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (falling back to built-in defaults when the file is absent), then applies
//! `NANODIAG_LOG_LEVEL` and `LLM_API_KEY` env overrides. The API key is never
//! sourced from TOML.

use std::{env, fs, path::Path};

use serde::Deserialize;

use crate::error::AppError;

const CONFIG_PATH: &str = "config/default.toml";

// ── Resolved config ───────────────────────────────────────────────────────────

/// OpenAI / OpenAI-compatible generation provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds — the generation call is the only
    /// unbounded-latency step in the pipeline and the only one with a timeout.
    pub timeout_seconds: u64,
}

/// Generation service configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`). Maps to `default`
    /// in `[llm]` TOML — named `default` there to signal that other provider
    /// sections can coexist without being loaded.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Embedding service configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Which embedder is active (`"hashing"`, `"http"`).
    pub provider: String,
    /// Base URL of the HTTP embedding endpoint (Ollama-style `/api/embed`).
    pub endpoint: String,
    /// Embedding model name for the HTTP provider.
    pub model: String,
    /// Output vector dimensionality.
    pub dimensions: usize,
}

/// Retrieval tuning.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Number of passages returned by the vector retriever.
    pub top_k: usize,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    /// API key from `LLM_API_KEY` env var — `None` for keyless local models.
    pub llm_api_key: Option<String>,
}

// ── Raw TOML shapes ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    log_level: Option<String>,
    retrieval: Option<RawRetrieval>,
    llm: Option<RawLlm>,
    embedding: Option<RawEmbedding>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRetrieval {
    top_k: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLlm {
    default: Option<String>,
    openai: Option<RawOpenAi>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOpenAi {
    api_base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEmbedding {
    provider: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load configuration from `config/default.toml` plus env overrides.
pub fn load() -> Result<Config, AppError> {
    let raw = if Path::new(CONFIG_PATH).exists() {
        let text = fs::read_to_string(CONFIG_PATH)
            .map_err(|e| AppError::Config(format!("cannot read {CONFIG_PATH}: {e}")))?;
        parse(&text)?
    } else {
        RawConfig::default()
    };
    Ok(resolve(raw))
}

fn parse(text: &str) -> Result<RawConfig, AppError> {
    toml::from_str(text).map_err(|e| AppError::Config(format!("cannot parse {CONFIG_PATH}: {e}")))
}

fn resolve(raw: RawConfig) -> Config {
    let llm = raw.llm.unwrap_or_default();
    let openai = llm.openai.unwrap_or_default();
    let embedding = raw.embedding.unwrap_or_default();
    let retrieval = raw.retrieval.unwrap_or_default();

    let log_level = env::var("NANODIAG_LOG_LEVEL")
        .ok()
        .or(raw.log_level)
        .unwrap_or_else(|| "info".to_string());

    Config {
        log_level,
        retrieval: RetrievalConfig {
            top_k: retrieval.top_k.unwrap_or(5),
        },
        llm: LlmConfig {
            provider: llm.default.unwrap_or_else(|| "dummy".to_string()),
            openai: OpenAiConfig {
                api_base_url: openai
                    .api_base_url
                    .unwrap_or_else(|| "http://localhost:11434/v1/chat/completions".to_string()),
                model: openai.model.unwrap_or_else(|| "gemma2:9b".to_string()),
                temperature: openai.temperature.unwrap_or(0.3),
                timeout_seconds: openai.timeout_seconds.unwrap_or(180),
            },
        },
        embedding: EmbeddingConfig {
            provider: embedding.provider.unwrap_or_else(|| "hashing".to_string()),
            endpoint: embedding
                .endpoint
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            model: embedding
                .model
                .unwrap_or_else(|| "nomic-embed-text".to_string()),
            dimensions: embedding.dimensions.unwrap_or(384),
        },
        llm_api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_resolves_to_defaults() {
        let raw = parse("").expect("empty TOML is valid");
        let cfg = resolve(raw);
        assert_eq!(cfg.retrieval.top_k, 5);
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.embedding.provider, "hashing");
        assert_eq!(cfg.embedding.dimensions, 384);
    }

    #[test]
    fn toml_values_override_defaults() {
        let text = r#"
            log_level = "debug"

            [retrieval]
            top_k = 3

            [llm]
            default = "openai"

            [llm.openai]
            model = "llama3.1:8b"
            timeout_seconds = 60

            [embedding]
            provider = "http"
            dimensions = 768
        "#;
        let cfg = resolve(parse(text).expect("parse"));
        assert_eq!(cfg.retrieval.top_k, 3);
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.openai.model, "llama3.1:8b");
        assert_eq!(cfg.llm.openai.timeout_seconds, 60);
        assert_eq!(cfg.embedding.provider, "http");
        assert_eq!(cfg.embedding.dimensions, 768);
    }

    #[test]
    fn unknown_provider_name_is_kept_verbatim() {
        // Validation happens at pipeline construction, not at config load.
        let cfg = resolve(parse("[llm]\ndefault = \"quantum\"").expect("parse"));
        assert_eq!(cfg.llm.provider, "quantum");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(parse("log_level = [").is_err());
    }
}
