//! System-prompt composition for the generation service.
//!
//! Prompts are assembled from a stack of text layers joined by blank lines:
//! persona, retrieved context (graph triples + manual passages), common HTML
//! formatting rules, one intent-specific section template, and the closing
//! guard rails. The intent template is the only variable layer — it decides
//! which response sections the model is allowed to produce.

use crate::extract::Intent;
use crate::retrieve::{RetrievedPassage, Triple};

/// Triples rendered into the context block.
const TRIPLE_RENDER_CAP: usize = 5;
/// Passages rendered into the context block.
const PASSAGE_RENDER_CAP: usize = 3;

const NO_TRIPLES_MARKER: &str = "No specific graph relationships found.";
const NO_PASSAGES_MARKER: &str = "No relevant manual sections found.";

const PERSONA: &str = "You are an expert TATA Nano diagnostic technician assistant.\n\
    \n\
    You MUST answer using ONLY the information in the context below.\n\
    If the context does not contain the answer, say you don't know and suggest checking the service manual.";

const FORMATTING_RULES: &str = "CRITICAL FORMATTING INSTRUCTIONS:\n\
    1. Structure your answer with clear HTML tags:\n\
    \x20  - <h3> for main headings\n\
    \x20  - <h4> for subheadings\n\
    \x20  - <strong> for emphasis\n\
    \x20  - <ul><li>...</li></ul> for bullet lists\n\
    \x20  - <ol><li>...</li></ol> for numbered steps\n\
    \x20  - <p> for normal paragraphs";

const EXPLANATION_SECTIONS: &str = "2. For explanation/detail queries, include ONLY:\n\
    \x20  - <h3>\u{1f4cb} [DTC/Topic]: [Short description]</h3>\n\
    \x20  - <h4>\u{1f50d} What This Means</h4>\n\
    \x20  - <h4>\u{26a0}\u{fe0f} Symptoms You Might Notice</h4>\n\
    \x20  - <h4>\u{1f50d} Most Likely Causes</h4>\n\
    \x20  STRICTLY EXCLUDE: repair steps or procedures, location details,\n\
    \x20  component specifications (voltage, resistance, pin numbers), and\n\
    \x20  installation or removal instructions, even if present in the context.\n\
    \x20  Keep the response focused ONLY on understanding the problem.";

const REPAIR_SECTIONS: &str = "2. For repair/fix queries, include:\n\
    \x20  - <h3>\u{1f4cb} [DTC/Component]: [Short description]</h3>\n\
    \x20  - <h4>\u{1f50d} What This Means</h4>\n\
    \x20  - <h4>\u{1f527} Repair Procedure</h4> (use <ol><li>...</li></ol> for steps)\n\
    \x20  - <h4>\u{1f4cd} Component Location</h4>\n\
    \x20  - <h4>\u{26a0}\u{fe0f} Important Notes</h4>";

const IMAGE_SECTIONS: &str = "2. For location/image queries, include:\n\
    \x20  - <h3>\u{1f4cb} [Component]: [Short description]</h3>\n\
    \x20  - <h4>\u{1f4cd} Component Location</h4> (detailed physical location)\n\
    \x20  - <h4>\u{1f50c} Connection Details</h4> (pin numbers, wire colours, connector type)\n\
    \x20  - <h4>\u{1f527} Quick Visual Checks</h4> (what to look for visually)\n\
    \x20  Describe location and checks clearly so a mechanic can find the part physically.";

const GENERAL_SECTIONS: &str = "2. For general queries, choose appropriate sections depending on \
    context (explanation, checks, or repair), but keep the structure clear with <h3>, <h4>, \
    <ul>, <ol>, and <p>.";

const GUARD_RAILS: &str = "3. Always cite page numbers when you reference specific data (e.g. 'See Page 165').\n\
    4. End with: <p><em>Source: TATA Nano EMS Service Manual v5.0</em></p>\n\
    5. Use simple, clear language suitable for mechanics with basic technical knowledge.\n\
    6. Do NOT invent voltages, resistances, RPM values, or pin numbers beyond the provided context.";

// ── Prompt stack ──────────────────────────────────────────────────────────────

/// Ordered prompt fragments joined by blank lines at build time.
struct PromptStack {
    parts: Vec<String>,
}

impl PromptStack {
    fn new() -> Self {
        Self { parts: Vec::new() }
    }

    fn layer(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
        self
    }

    fn build(self) -> String {
        self.parts.join("\n\n")
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn render_triples(triples: &[Triple]) -> String {
    if triples.is_empty() {
        return NO_TRIPLES_MARKER.to_string();
    }
    triples
        .iter()
        .take(TRIPLE_RENDER_CAP)
        .map(|t| format!("- {} --[{}]--> {}", t.subject, t.relation, t.object))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_passages(passages: &[RetrievedPassage]) -> String {
    if passages.is_empty() {
        return NO_PASSAGES_MARKER.to_string();
    }
    passages
        .iter()
        .take(PASSAGE_RENDER_CAP)
        .map(|p| format!("[Page {}, {}]\n{}", p.page, p.section, p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn sections_for(intent: Intent) -> &'static str {
    match intent {
        Intent::Explanation => EXPLANATION_SECTIONS,
        Intent::Repair => REPAIR_SECTIONS,
        Intent::ImageRequest => IMAGE_SECTIONS,
        Intent::General => GENERAL_SECTIONS,
    }
}

/// Build the full system prompt for one request.
pub fn compose(triples: &[Triple], passages: &[RetrievedPassage], intent: Intent) -> String {
    PromptStack::new()
        .layer(PERSONA)
        .layer(format!("KNOWLEDGE GRAPH RELATIONSHIPS:\n{}", render_triples(triples)))
        .layer(format!("RELEVANT MANUAL SECTIONS:\n{}", render_passages(passages)))
        .layer(FORMATTING_RULES)
        .layer(sections_for(intent))
        .layer(GUARD_RAILS)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::graph::Relation;

    fn triple(n: usize) -> Triple {
        Triple {
            subject: format!("S{n}"),
            relation: Relation::Affects,
            object: format!("O{n}"),
        }
    }

    fn passage(page: u32) -> RetrievedPassage {
        RetrievedPassage {
            text: format!("manual text {page}"),
            score: 0.5,
            page,
            section: "Section".into(),
        }
    }

    #[test]
    fn explanation_prompt_excludes_repair_and_location_sections() {
        let prompt = compose(&[], &[], Intent::Explanation);
        assert!(prompt.contains("STRICTLY EXCLUDE"));
        assert!(!prompt.contains("Repair Procedure"));
        assert!(!prompt.contains("Connection Details"));
    }

    #[test]
    fn repair_prompt_requests_ordered_steps_and_location() {
        let prompt = compose(&[], &[], Intent::Repair);
        assert!(prompt.contains("Repair Procedure"));
        assert!(prompt.contains("Component Location"));
        assert!(prompt.contains("Important Notes"));
    }

    #[test]
    fn image_prompt_requests_physical_detail() {
        let prompt = compose(&[], &[], Intent::ImageRequest);
        assert!(prompt.contains("Connection Details"));
        assert!(prompt.contains("Quick Visual Checks"));
    }

    #[test]
    fn empty_evidence_uses_markers() {
        let prompt = compose(&[], &[], Intent::General);
        assert!(prompt.contains(NO_TRIPLES_MARKER));
        assert!(prompt.contains(NO_PASSAGES_MARKER));
    }

    #[test]
    fn triples_render_capped_at_five() {
        let triples: Vec<Triple> = (0..8).map(triple).collect();
        let prompt = compose(&triples, &[], Intent::General);
        assert!(prompt.contains("- S4 --[AFFECTS]--> O4"));
        assert!(!prompt.contains("S5"), "only the first five triples are rendered");
    }

    #[test]
    fn passages_render_capped_at_three_with_locators() {
        let passages: Vec<RetrievedPassage> = [165, 166, 45, 52].iter().map(|p| passage(*p)).collect();
        let prompt = compose(&[], &passages, Intent::General);
        assert!(prompt.contains("[Page 165, Section]"));
        assert!(prompt.contains("[Page 45, Section]"));
        assert!(!prompt.contains("[Page 52, Section]"), "only the first three passages render");
    }

    #[test]
    fn every_intent_carries_the_numeric_guard_rail() {
        for intent in [Intent::Explanation, Intent::Repair, Intent::ImageRequest, Intent::General] {
            let prompt = compose(&[], &[], intent);
            assert!(prompt.contains("Do NOT invent voltages"));
            assert!(prompt.contains("Source: TATA Nano EMS Service Manual v5.0"));
        }
    }
}
