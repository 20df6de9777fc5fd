//! Embedding provider abstraction.
//!
//! `Embedder` is an enum over concrete implementations — enum dispatch keeps
//! callers free of trait-object machinery, and adding a backend is a new
//! variant plus a new `embed` arm.
//!
//! Two backends:
//! - [`HashingEmbedder`] — offline, deterministic feature-hashing vectors.
//!   No model quality, but stable across processes, which is exactly what
//!   similarity ranking and the write-once cache contract need in tests and
//!   air-gapped deployments.
//! - [`HttpEmbedder`] — Ollama-style `/api/embed` endpoint over reqwest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("unknown embedding provider: {0}")]
    UnknownProvider(String),
    #[error("embedding request failed: {0}")]
    Request(String),
}

// ── Provider enum ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Embedder {
    Hashing(HashingEmbedder),
    Http(HttpEmbedder),
}

impl Embedder {
    /// Embed `text` into a fixed-length vector. Deterministic for identical
    /// input — both backends guarantee this (the HTTP contract requires it
    /// of the model server).
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        match self {
            Embedder::Hashing(e) => Ok(e.embed(text)),
            Embedder::Http(e) => e.embed(text).await,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            Embedder::Hashing(e) => e.dimensions(),
            Embedder::Http(e) => e.dimensions(),
        }
    }
}

// ── Hashing embedder ──────────────────────────────────────────────────────────

/// Deterministic bag-of-words feature hashing into a fixed-dimension space.
///
/// Each lowercase alphanumeric token is hashed with SHA-256; the digest picks
/// a bucket and a sign, and the accumulated vector is L2-normalised so dot
/// products are cosine similarities. Identical text always yields an equal
/// vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let bucket = u64::from_be_bytes(digest[..8].try_into().expect("digest >= 8 bytes"));
            let index = (bucket % self.dims as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

// ── HTTP embedder ─────────────────────────────────────────────────────────────

/// Adapter for an Ollama-compatible `/api/embed` endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dims: usize,
}

impl HttpEmbedder {
    /// `endpoint` is the server base URL (e.g. `http://localhost:11434`).
    pub fn new(endpoint: String, model: String, dims: usize) -> Self {
        Self { client: reqwest::Client::new(), endpoint, model, dims }
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embed", self.endpoint.trim_end_matches('/'));
        let payload = EmbedRequest { model: self.model.clone(), input: vec![text.to_string()] };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Request(format!("failed to parse response body: {e}")))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::Request("empty embeddings in response".into()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}
