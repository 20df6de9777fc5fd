//! In-memory knowledge base: typed graph entities, manual passages, and the
//! per-passage embedding cache.
//!
//! The store is read-only after construction; both retrievers borrow it. The
//! embedding cache is the only mutable state and is write-once per passage —
//! a passage's vector is computed at most once per process lifetime, and
//! concurrent racers converge on the first inserted value.

pub mod entities;
pub mod seed;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AppError;

pub use entities::{ComponentEntity, DtcEntity, Entity, EntityKind, SymptomEntity};

// ── Passages ──────────────────────────────────────────────────────────────────

/// A fixed excerpt of service-manual text with source locator metadata.
///
/// `dtc` and `component` are optional tags used by the vector retriever's
/// soft filter; untagged passages are never excluded by a tag constraint.
#[derive(Debug, Clone)]
pub struct Passage {
    pub id: String,
    pub text: String,
    pub dtc: Option<String>,
    pub component: Option<String>,
    pub page: u32,
    pub section: String,
}

// ── Embedding cache ───────────────────────────────────────────────────────────

/// Append-only map of passage id → embedding vector.
///
/// Owned by the [`KnowledgeBase`] and injected into the vector retriever, so
/// tests can pre-populate or replace it instead of sharing hidden global
/// state. No invalidation: passage text is static for the process lifetime.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    inner: RwLock<HashMap<String, Arc<Vec<f32>>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached vector for `id`, if one was already computed.
    pub async fn get(&self, id: &str) -> Option<Arc<Vec<f32>>> {
        self.inner.read().await.get(id).cloned()
    }

    /// Store `vector` under `id` unless a racer got there first; returns the
    /// vector that won. Embeddings are deterministic, so a lost race only
    /// means redundant computation, never a wrong value.
    pub async fn insert_if_absent(&self, id: &str, vector: Vec<f32>) -> Arc<Vec<f32>> {
        let mut guard = self.inner.write().await;
        guard
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(vector))
            .clone()
    }

    /// Number of cached vectors (diagnostics and tests).
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

// ── Knowledge base ────────────────────────────────────────────────────────────

/// The static entity graph plus the passage corpus.
#[derive(Debug)]
pub struct KnowledgeBase {
    entities: HashMap<String, Entity>,
    passages: Vec<Passage>,
    embeddings: EmbeddingCache,
}

impl KnowledgeBase {
    /// Build a store from loader-supplied entities and passages.
    ///
    /// Duplicate entity keys or passage ids are rejected — the store is
    /// addressed by key, and a silent overwrite would drop graph content.
    pub fn new(entity_list: Vec<Entity>, passages: Vec<Passage>) -> Result<Self, AppError> {
        let mut entities = HashMap::with_capacity(entity_list.len());
        for entity in entity_list {
            let key = entity.key().to_string();
            if entities.insert(key.clone(), entity).is_some() {
                return Err(AppError::KnowledgeBase(format!("duplicate entity key: {key}")));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for p in &passages {
            if !seen.insert(p.id.as_str()) {
                return Err(AppError::KnowledgeBase(format!("duplicate passage id: {}", p.id)));
            }
        }

        Ok(Self { entities, passages, embeddings: EmbeddingCache::new() })
    }

    /// Look up an entity by its canonical key.
    pub fn entity(&self, key: &str) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// The injected embedding cache shared by all requests.
    pub fn embeddings(&self) -> &EmbeddingCache {
        &self.embeddings
    }
}
