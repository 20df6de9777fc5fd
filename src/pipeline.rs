//! The diagnostic answer pipeline.
//!
//! One request = one pass through extraction, graph + vector retrieval,
//! fusion, prompt composition, generation, and visual-aid attachment. The
//! knowledge base is read-only; the only cross-request state is the
//! embedding cache inside it and the caller-held session topic.
//!
//! Failure policy: a generation failure degrades into an apologetic HTML
//! fragment (the caller always gets an answer); an embedding failure aborts
//! the request — a fabricated zero vector would silently corrupt the
//! similarity ranking.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::embedding::{EmbedError, Embedder, HashingEmbedder, HttpEmbedder};
use crate::error::AppError;
use crate::extract::{self, ExtractedQuery, Intent};
use crate::fusion::{self, FusionRecord};
use crate::kb::{Entity, KnowledgeBase};
use crate::llm::providers::dummy::DummyProvider;
use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::llm::{GenerationProvider, ProviderError};
use crate::prompt;
use crate::retrieve::{graph, vector, RetrievedPassage, Triple};
use crate::visual;

/// Fixed advisory for clearly non-automotive queries.
const OUT_OF_SCOPE_HTML: &str = "<h3>\u{26a0}\u{fe0f} Out of Scope</h3>\n\
    <p>That's not automotive diagnostics. Try: DTCs, components, symptoms.</p>";

// ── Result types ──────────────────────────────────────────────────────────────

/// Per-request observability record: which sources fed the answer.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDigest {
    /// Manual pages cited by the retrieved passages, ascending and unique.
    pub pages_used: Vec<u32>,
    pub dtc_codes: Vec<String>,
    pub components: Vec<String>,
    pub intent: Intent,
}

/// Everything `answer` returns for one query.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer_html: String,
    pub triples: Vec<Triple>,
    pub passages: Vec<RetrievedPassage>,
    pub fusion: FusionRecord,
    pub digest: QueryDigest,
    /// Topic to carry into the next request of this session, if any.
    pub new_session_context: Option<String>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Hybrid retrieval pipeline bound to one knowledge base and one pair of
/// provider capabilities.
#[derive(Debug, Clone)]
pub struct Pipeline {
    kb: Arc<KnowledgeBase>,
    embedder: Embedder,
    llm: GenerationProvider,
    top_k: usize,
}

impl Pipeline {
    pub fn new(
        kb: Arc<KnowledgeBase>,
        embedder: Embedder,
        llm: GenerationProvider,
        top_k: usize,
    ) -> Self {
        Self { kb, embedder, llm, top_k }
    }

    /// Build a pipeline over `kb` with providers selected by `config`.
    pub fn from_config(kb: Arc<KnowledgeBase>, config: &Config) -> Result<Self, AppError> {
        let embedder = match config.embedding.provider.as_str() {
            "hashing" => Embedder::Hashing(HashingEmbedder::new(config.embedding.dimensions)),
            "http" => Embedder::Http(HttpEmbedder::new(
                config.embedding.endpoint.clone(),
                config.embedding.model.clone(),
                config.embedding.dimensions,
            )),
            other => {
                let e = EmbedError::UnknownProvider(other.to_string());
                return Err(AppError::Config(e.to_string()));
            }
        };

        let llm = match config.llm.provider.as_str() {
            "dummy" => GenerationProvider::Dummy(DummyProvider),
            "openai" => GenerationProvider::OpenAiCompatible(
                OpenAiCompatibleProvider::new(
                    config.llm.openai.api_base_url.clone(),
                    config.llm.openai.model.clone(),
                    config.llm.openai.temperature,
                    config.llm.openai.timeout_seconds,
                    config.llm_api_key.clone(),
                )
                .map_err(|e| AppError::Config(e.to_string()))?,
            ),
            other => {
                let e = ProviderError::UnknownProvider(other.to_string());
                return Err(AppError::Config(e.to_string()));
            }
        };

        Ok(Self::new(kb, embedder, llm, config.retrieval.top_k))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Answer one query.
    ///
    /// `session` is the topic established by an earlier request of the same
    /// session (last DTC discussed); it fills in the DTC set when the query
    /// itself names none, so "how do I fix it?" keeps working after
    /// "P0117 is showing". The returned `new_session_context` is what the
    /// caller should carry forward (last-writer-wins).
    pub async fn answer(&self, query: &str, session: Option<&str>) -> Result<Answer, AppError> {
        if extract::out_of_scope(query) {
            info!(query_len = query.len(), "query rejected as out of scope");
            return Ok(Answer {
                answer_html: OUT_OF_SCOPE_HTML.to_string(),
                triples: Vec::new(),
                passages: Vec::new(),
                fusion: fusion::fuse(&[], &[]),
                digest: QueryDigest {
                    pages_used: Vec::new(),
                    dtc_codes: Vec::new(),
                    components: Vec::new(),
                    intent: Intent::General,
                },
                new_session_context: session.map(str::to_string),
            });
        }

        let mut extracted = extract::extract(query);

        // Topic establishment looks only at what this query actually said.
        let new_topic = self.establish_topic(&extracted);
        let new_session_context =
            new_topic.clone().or_else(|| session.map(str::to_string));

        // Carry the session topic into retrieval when the query names no DTC.
        if extracted.dtc_codes.is_empty()
            && let Some(topic) = session
            && self.kb.contains(topic)
        {
            extracted.dtc_codes.push(topic.to_string());
        }

        // Graph and vector retrieval are independent of each other; both
        // complete before fusion and prompt composition.
        let (triples, passages) = tokio::join!(
            async { graph::retrieve_triples(&self.kb, &extracted) },
            vector::retrieve_passages(&self.kb, &self.embedder, query, &extracted, self.top_k),
        );
        let passages = passages?;

        let fused = fusion::fuse(&triples, &passages);
        info!(
            intent = %extracted.intent,
            triples = triples.len(),
            passages = passages.len(),
            combined_score = fused.combined_score,
            "retrieval complete"
        );

        let system_prompt = prompt::compose(&triples, &passages, extracted.intent);

        let answer_html = match self.llm.complete(&system_prompt, query).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "generation service failed; returning degraded answer");
                format!(
                    "<p>\u{26a0}\u{fe0f} Error generating response: {e}</p>\
                     <p>Please check that the model service is running and try again.</p>"
                )
            }
        };

        let answer_html = visual::attach(answer_html, &extracted, query);

        let pages_used: Vec<u32> =
            passages.iter().map(|p| p.page).collect::<BTreeSet<_>>().into_iter().collect();

        Ok(Answer {
            answer_html,
            digest: QueryDigest {
                pages_used,
                dtc_codes: extracted.dtc_codes.clone(),
                components: extracted.components.clone(),
                intent: extracted.intent,
            },
            triples,
            passages,
            fusion: fused,
            new_session_context,
        })
    }

    /// The topic this query establishes: an explicitly named DTC, or the
    /// first DTC indicated by a recognised symptom ("fan runs continuously"
    /// establishes P0117 without naming it).
    fn establish_topic(&self, extracted: &ExtractedQuery) -> Option<String> {
        if let Some(code) = extracted.dtc_codes.iter().find(|c| self.kb.contains(c)) {
            return Some(code.clone());
        }
        for name in &extracted.symptoms {
            if let Some(Entity::Symptom(symptom)) = self.kb.entity(name)
                && let Some(code) = symptom.indicates.first()
            {
                return Some(code.clone());
            }
        }
        None
    }
}
