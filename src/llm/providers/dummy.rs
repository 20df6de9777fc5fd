//! Dummy generation provider — echoes the user turn prefixed with `[echo]`.
//! Used for testing the full pipeline round-trip without a model server.

use crate::llm::ProviderError;

#[derive(Debug, Clone, Default)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, _system: &str, user: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {user}"))
    }
}
