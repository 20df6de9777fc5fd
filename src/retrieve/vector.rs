//! Vector retrieval: embed the query, score passages by cosine similarity
//! against their cached embeddings, and return the top-K.
//!
//! Tag filtering is soft: a passage only drops out when it carries a tag
//! that contradicts the extracted entities. Untagged passages always
//! survive, so thin extraction never empties the candidate set.

use serde::Serialize;

use crate::embedding::Embedder;
use crate::error::AppError;
use crate::extract::ExtractedQuery;
use crate::kb::{KnowledgeBase, Passage};

/// Default number of passages returned.
pub const DEFAULT_TOP_K: usize = 5;

/// A passage ranked for one request.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedPassage {
    pub text: String,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
    pub page: u32,
    pub section: String,
}

/// Cosine similarity; 0.0 when either vector has zero norm.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn passes_filter(passage: &Passage, extracted: &ExtractedQuery) -> bool {
    if !extracted.dtc_codes.is_empty()
        && let Some(tag) = &passage.dtc
        && !extracted.dtc_codes.contains(tag)
    {
        return false;
    }
    if !extracted.components.is_empty()
        && let Some(tag) = &passage.component
        && !extracted.components.contains(tag)
    {
        return false;
    }
    true
}

/// Rank passages against `query`, returning at most `top_k` results in
/// non-increasing score order.
///
/// Passage embeddings are computed on first access and cached in the
/// knowledge base for the process lifetime; an embedding failure aborts the
/// request rather than degrading the ranking with a fabricated vector.
pub async fn retrieve_passages(
    kb: &KnowledgeBase,
    embedder: &Embedder,
    query: &str,
    extracted: &ExtractedQuery,
    top_k: usize,
) -> Result<Vec<RetrievedPassage>, AppError> {
    let query_embedding = embedder
        .embed(query)
        .await
        .map_err(|e| AppError::Embedding(format!("query embedding failed: {e}")))?;

    let mut results = Vec::new();
    for passage in kb.passages().iter().filter(|p| passes_filter(p, extracted)) {
        let embedding = match kb.embeddings().get(&passage.id).await {
            Some(cached) => cached,
            None => {
                let computed = embedder.embed(&passage.text).await.map_err(|e| {
                    AppError::Embedding(format!("passage {} embedding failed: {e}", passage.id))
                })?;
                kb.embeddings().insert_if_absent(&passage.id, computed).await
            }
        };

        results.push(RetrievedPassage {
            text: passage.text.clone(),
            score: cosine(&query_embedding, &embedding),
            page: passage.page,
            section: passage.section.clone(),
        });
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);
    Ok(results)
}
