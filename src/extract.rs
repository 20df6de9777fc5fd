//! Entity and intent extraction from free-text queries.
//!
//! Pure functions over static keyword tables — no network or model calls.
//! Intent classification is an ordered rule table evaluated in fixed
//! priority: detail keywords always win over image keywords, so
//! "show us details of P0117" is an explanation, not an image request.

// ── Intent ────────────────────────────────────────────────────────────────────

/// Classified purpose of a query; conditions retrieval filtering and
/// prompt shaping downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Explanation,
    Repair,
    ImageRequest,
    General,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::Explanation => "explanation",
            Intent::Repair => "repair",
            Intent::ImageRequest => "image_request",
            Intent::General => "general",
        };
        write!(f, "{s}")
    }
}

// ── Keyword tables ────────────────────────────────────────────────────────────

const DETAIL_KEYWORDS: &[&str] = &[
    "details", "detail", "description", "describe", "what is", "what does", "tell me", "explain",
    "mean", "meaning",
];

const REPAIR_KEYWORDS: &[&str] =
    &["repair", "fix", "steps", "procedure", "how to", "how do i fix"];

const IMAGE_KEYWORDS: &[&str] =
    &["show", "display", "picture", "image", "photo", "diagram", "where is", "location of"];

/// Intent rules in priority order; the first matching row wins.
const INTENT_RULES: &[(&[&str], Intent)] = &[
    (DETAIL_KEYWORDS, Intent::Explanation),
    (REPAIR_KEYWORDS, Intent::Repair),
    (IMAGE_KEYWORDS, Intent::ImageRequest),
];

/// Whitelisted DTC codes, lowercase for matching.
const DTC_CODES: &[&str] = &["p0117", "p0118", "p0300", "p0691"];

/// keyword → canonical component name (many-to-one, ordered).
const COMPONENT_MAP: &[(&str, &str)] = &[
    ("coolant sensor", "Coolant Sensor"),
    ("temperature sensor", "Coolant Sensor"),
    ("ect sensor", "Coolant Sensor"),
    ("radiator fan", "Radiator Fan"),
    ("fan", "Radiator Fan"),
    ("window motor", "Window Motor"),
    ("window", "Window Motor"),
    ("thermostat", "Thermostat"),
    ("ecu", "ECU"),
];

/// Vague part references resolve to the coolant sensor, but only when the
/// query also names a DTC ("show me the faulty part for P0117").
const PART_ALIASES: &[(&str, &str)] = &[("faulty part", "Coolant Sensor"), ("part", "Coolant Sensor")];

/// keyword → canonical symptom name.
const SYMPTOM_MAP: &[(&str, &str)] = &[
    ("continuous fan", "Continuous Fan"),
    ("always on", "Continuous Fan"),
    ("always running", "Continuous Fan"),
    ("won't turn off", "Continuous Fan"),
    ("fan running", "Continuous Fan"),
    ("fan runs", "Continuous Fan"),
    ("sluggish", "Sluggish Performance"),
    ("slow", "Sluggish Performance"),
    ("cold start", "Cold Start Problem"),
    ("won't start", "Cold Start Problem"),
];

/// Non-automotive keyword lists: programming and CAD queries are out of scope.
const OFF_TOPIC_KEYWORDS: &[&str] = &[
    "program", ".c", "python", "java", "adding", "write program", "dwg", "autocad", "diameter",
    "cad", "2d",
];

/// Filler words removed before topic detection and scope checks.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "in", "on", "at", "to", "for", "of", "with",
    "from",
];

// ── Extracted query ───────────────────────────────────────────────────────────

/// Everything the pipeline needs to know about one query, derived once per
/// request and never persisted.
#[derive(Debug, Clone)]
pub struct ExtractedQuery {
    /// Matched DTC codes, upper-cased, first-match order.
    pub dtc_codes: Vec<String>,
    /// Canonical component names, set semantics, first-match order.
    pub components: Vec<String>,
    /// Canonical symptom names, set semantics, first-match order.
    pub symptoms: Vec<String>,
    pub wants_visual_aid: bool,
    pub intent: Intent,
}

// ── Extraction ────────────────────────────────────────────────────────────────

/// Lowercase, strip stop-words, and squeeze whitespace. Feeds the scope
/// check and session-topic detection; entity matching uses the raw
/// lowercased text so multi-word keywords like "where is" survive.
pub fn normalize(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `true` when the query is clearly non-automotive (programming or CAD).
pub fn out_of_scope(query: &str) -> bool {
    let q = normalize(query);
    OFF_TOPIC_KEYWORDS.iter().any(|kw| q.contains(kw))
}

/// First intent rule whose keyword list matches, else `General`.
pub fn classify_intent(query_lower: &str) -> Intent {
    for (keywords, intent) in INTENT_RULES {
        if keywords.iter().any(|kw| query_lower.contains(kw)) {
            return *intent;
        }
    }
    Intent::General
}

/// Map a raw query to its recognised entities and intent.
pub fn extract(query: &str) -> ExtractedQuery {
    let q = query.to_lowercase();

    let intent = classify_intent(&q);

    let mut dtc_codes = Vec::new();
    for code in DTC_CODES {
        if q.contains(code) {
            dtc_codes.push(code.to_uppercase());
        }
    }

    let mut components = Vec::new();
    for (keyword, canonical) in COMPONENT_MAP {
        if q.contains(keyword) && !components.iter().any(|c| c == canonical) {
            components.push(canonical.to_string());
        }
    }
    if !dtc_codes.is_empty() {
        for (keyword, canonical) in PART_ALIASES {
            if q.contains(keyword) && !components.iter().any(|c| c == canonical) {
                components.push(canonical.to_string());
            }
        }
    }

    let mut symptoms = Vec::new();
    for (keyword, canonical) in SYMPTOM_MAP {
        if q.contains(keyword) && !symptoms.iter().any(|s| s == canonical) {
            symptoms.push(canonical.to_string());
        }
    }

    ExtractedQuery {
        dtc_codes,
        components,
        symptoms,
        wants_visual_aid: intent == Intent::ImageRequest,
        intent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_keyword_wins_over_image_keyword() {
        // "show" alone would be an image request; "details" overrides it.
        let e = extract("Show us details of P0117");
        assert_eq!(e.intent, Intent::Explanation);
        assert!(!e.wants_visual_aid);
    }

    #[test]
    fn repair_keyword_wins_over_image_keyword() {
        let e = extract("Show me how to fix the coolant sensor");
        assert_eq!(e.intent, Intent::Repair);
    }

    #[test]
    fn image_keyword_sets_visual_flag() {
        let e = extract("Show me picture of coolant sensor");
        assert_eq!(e.intent, Intent::ImageRequest);
        assert!(e.wants_visual_aid);
        assert_eq!(e.components, vec!["Coolant Sensor"]);
    }

    #[test]
    fn plain_query_is_general() {
        let e = extract("Fan runs continuously");
        assert_eq!(e.intent, Intent::General);
        assert_eq!(e.symptoms, vec!["Continuous Fan"]);
    }

    #[test]
    fn dtc_codes_are_uppercased() {
        let e = extract("p0117 and P0118 are showing");
        assert_eq!(e.dtc_codes, vec!["P0117", "P0118"]);
    }

    #[test]
    fn many_keywords_one_canonical_name() {
        // Both "radiator fan" and "fan" match; the canonical name appears once.
        let e = extract("the radiator fan is a fan");
        assert_eq!(e.components, vec!["Radiator Fan"]);
    }

    #[test]
    fn part_alias_requires_a_dtc() {
        let without = extract("show me the faulty part");
        assert!(without.components.is_empty());

        let with = extract("show me the faulty part for P0117");
        assert_eq!(with.components, vec!["Coolant Sensor"]);
    }

    #[test]
    fn out_of_scope_detects_programming_and_cad() {
        assert!(out_of_scope("write program to sort a list in python"));
        assert!(out_of_scope("open the dwg in autocad"));
        assert!(!out_of_scope("why is my radiator fan always running"));
    }

    #[test]
    fn normalize_strips_stop_words() {
        assert_eq!(normalize("The fan is ON at the moment"), "fan moment");
    }

    #[test]
    fn symptom_set_semantics() {
        let e = extract("fan runs and fan running and always on");
        assert_eq!(e.symptoms, vec!["Continuous Fan"]);
    }
}
