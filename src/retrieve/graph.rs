//! Knowledge-graph retrieval: walk entity relations for the extracted
//! entities and emit a bounded, de-duplicated list of triples.
//!
//! Intent gates what leaves the graph: repair steps never leak into
//! explanation or general answers, and component locations are only emitted
//! for image and repair queries.

use std::collections::HashSet;

use serde::Serialize;

use crate::extract::{ExtractedQuery, Intent};
use crate::kb::{Entity, KnowledgeBase};

/// Upper bound on triples returned per request.
pub const TRIPLE_CAP: usize = 10;

/// Repair steps included when the intent allows them.
const REPAIR_STEP_CAP: usize = 3;

// ── Types ─────────────────────────────────────────────────────────────────────

/// Typed relation between a graph subject and an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    FaultCause,
    BlinkCode,
    Symptom,
    Affects,
    RepairStep,
    Location,
    Voltage,
    Resistance,
    Fuse,
    RelatedTo,
    Indicates,
    CausedBy,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Relation::FaultCause => "FAULT_CAUSE",
            Relation::BlinkCode => "BLINK_CODE",
            Relation::Symptom => "SYMPTOM",
            Relation::Affects => "AFFECTS",
            Relation::RepairStep => "REPAIR_STEP",
            Relation::Location => "LOCATION",
            Relation::Voltage => "VOLTAGE",
            Relation::Resistance => "RESISTANCE",
            Relation::Fuse => "FUSE",
            Relation::RelatedTo => "RELATED_TO",
            Relation::Indicates => "INDICATES",
            Relation::CausedBy => "CAUSED_BY",
        };
        write!(f, "{s}")
    }
}

/// A single (subject, relation, object) fact drawn from the graph.
/// The object is either another entity's key or a literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triple {
    pub subject: String,
    pub relation: Relation,
    pub object: String,
}

impl Triple {
    fn new(subject: &str, relation: Relation, object: &str) -> Self {
        Self { subject: subject.to_string(), relation, object: object.to_string() }
    }
}

// ── Retrieval ─────────────────────────────────────────────────────────────────

/// Collect triples for the extracted entities, deduplicate over the full
/// tuple, and truncate to [`TRIPLE_CAP`].
///
/// Emission order is by category (DTCs, then components, then symptoms),
/// which decides which triples survive the cap; callers must not rely on
/// any finer ordering.
pub fn retrieve_triples(kb: &KnowledgeBase, extracted: &ExtractedQuery) -> Vec<Triple> {
    let mut triples: Vec<Triple> = Vec::new();
    let mut seen: HashSet<Triple> = HashSet::new();
    let mut push = |t: Triple, out: &mut Vec<Triple>| {
        if seen.insert(t.clone()) {
            out.push(t);
        }
    };

    let repair_detail = matches!(extracted.intent, Intent::Repair | Intent::ImageRequest);

    for code in &extracted.dtc_codes {
        let Some(Entity::Dtc(dtc)) = kb.entity(code) else { continue };
        push(Triple::new(code, Relation::FaultCause, &dtc.fault_cause), &mut triples);
        push(Triple::new(code, Relation::BlinkCode, &dtc.blink_code), &mut triples);
        for symptom in &dtc.symptoms {
            push(Triple::new(code, Relation::Symptom, symptom), &mut triples);
        }
        for affected in &dtc.affects {
            push(Triple::new(code, Relation::Affects, affected), &mut triples);
        }
        if repair_detail {
            for step in dtc.repair_steps.iter().take(REPAIR_STEP_CAP) {
                push(Triple::new(code, Relation::RepairStep, step), &mut triples);
            }
        }
    }

    for name in &extracted.components {
        let Some(Entity::Component(comp)) = kb.entity(name) else { continue };
        if repair_detail {
            if let Some(location) = &comp.location {
                push(Triple::new(name, Relation::Location, location), &mut triples);
            }
        }
        if let Some(voltage) = &comp.voltage {
            push(Triple::new(name, Relation::Voltage, voltage), &mut triples);
        }
        if let Some(resistance) = &comp.resistance {
            push(Triple::new(name, Relation::Resistance, resistance), &mut triples);
        }
        for dtc in &comp.related_dtcs {
            push(Triple::new(name, Relation::RelatedTo, dtc), &mut triples);
        }
        for fuse in &comp.fuses {
            push(Triple::new(name, Relation::Fuse, fuse), &mut triples);
        }
    }

    for name in &extracted.symptoms {
        let Some(Entity::Symptom(symptom)) = kb.entity(name) else { continue };
        for dtc in &symptom.indicates {
            push(Triple::new(name, Relation::Indicates, dtc), &mut triples);
        }
        for cause in &symptom.caused_by {
            push(Triple::new(name, Relation::CausedBy, cause), &mut triples);
        }
    }

    triples.truncate(TRIPLE_CAP);
    triples
}
