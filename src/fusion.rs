//! Fusion scoring: a diagnostic blend of KG presence and vector similarity.
//!
//! The record is observability-only — it never gates or reorders retrieval
//! output. The KG side is a flat presence bump (reciprocal-rank style,
//! `0.4 / (K + 1)` with K = 60), not a graded relevance score; the vector
//! side is the mean similarity of the retrieved passages.

use serde::Serialize;

use crate::retrieve::{RetrievedPassage, Triple};

pub const KG_WEIGHT: f32 = 0.4;
pub const VECTOR_WEIGHT: f32 = 0.6;
const RRF_K: f32 = 60.0;

/// Per-request fusion diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FusionRecord {
    pub kg_weight: f32,
    pub vector_weight: f32,
    pub kg_score: f32,
    pub vector_score: f32,
    pub combined_score: f32,
}

/// Combine KG-derived and vector-derived evidence into one signal.
pub fn fuse(triples: &[Triple], passages: &[RetrievedPassage]) -> FusionRecord {
    let kg_score = if triples.is_empty() { 0.0 } else { KG_WEIGHT / (RRF_K + 1.0) };

    let vector_score = if passages.is_empty() {
        0.0
    } else {
        passages.iter().map(|p| p.score).sum::<f32>() / passages.len() as f32
    };

    FusionRecord {
        kg_weight: KG_WEIGHT,
        vector_weight: VECTOR_WEIGHT,
        kg_score,
        vector_score,
        combined_score: KG_WEIGHT * kg_score + VECTOR_WEIGHT * vector_score,
    }
}
