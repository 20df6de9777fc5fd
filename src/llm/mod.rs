//! Generation service abstraction.
//!
//! `GenerationProvider` is an enum over concrete provider implementations.
//! Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency;
//! adding a backend = new module + new variant + new `complete` arm.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! The generation call is the pipeline's only unbounded-latency step, so the
//! HTTP provider carries a per-request timeout; callers convert failures into
//! a degraded answer rather than propagating them.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available generation backends.
#[derive(Debug, Clone)]
pub enum GenerationProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl GenerationProvider {
    /// Send `system` + `user` to the provider and return its text reply.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        match self {
            GenerationProvider::Dummy(p) => p.complete(system, user).await,
            GenerationProvider::OpenAiCompatible(p) => p.complete(system, user).await,
        }
    }
}
