//! Typed knowledge-graph entities.
//!
//! Each entity kind carries its own fixed field set instead of a free-form
//! attribute map, so retrieval logic never probes for optional keys. Fields
//! that reference other entities by name (`symptoms`, `affects`, `indicates`,
//! `caused_by`, `related_dtcs`) may also hold plain literals — a target that
//! does not resolve to a store key is rendered as-is (e.g. "Fuel Consumption").

use serde::Serialize;

/// Semantic category of a knowledge-graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Dtc,
    Component,
    Symptom,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Dtc => "dtc",
            EntityKind::Component => "component",
            EntityKind::Symptom => "symptom",
        };
        write!(f, "{s}")
    }
}

/// A diagnostic trouble code node, e.g. `P0117`.
#[derive(Debug, Clone)]
pub struct DtcEntity {
    /// Upper-case code string, also the store key.
    pub code: String,
    pub fault_cause: String,
    /// Dashboard blink code shown by the cluster.
    pub blink_code: String,
    /// Symptom names observed when this code is active.
    pub symptoms: Vec<String>,
    /// Components or behaviours affected by the fault.
    pub affects: Vec<String>,
    /// ECU connector pins involved in the circuit.
    pub ecu_pins: Vec<String>,
    /// Ordered workshop repair procedure.
    pub repair_steps: Vec<String>,
}

/// A physical component node, e.g. `Coolant Sensor`.
#[derive(Debug, Clone, Default)]
pub struct ComponentEntity {
    /// Canonical name, also the store key.
    pub name: String,
    pub sensor_type: Option<String>,
    pub location: Option<String>,
    pub voltage: Option<String>,
    pub resistance: Option<String>,
    pub connects_to: Vec<String>,
    pub related_dtcs: Vec<String>,
    /// Named fuse ratings (e.g. "WW RH 30A").
    pub fuses: Vec<String>,
    pub controlled_by: Option<String>,
    pub on_temp: Option<String>,
    pub off_temp: Option<String>,
    pub rotation: Option<String>,
    pub rpm: Option<String>,
}

/// An observable symptom node, e.g. `Continuous Fan`.
#[derive(Debug, Clone)]
pub struct SymptomEntity {
    /// Canonical name, also the store key.
    pub name: String,
    pub description: String,
    /// DTC codes this symptom points at.
    pub indicates: Vec<String>,
    /// DTC codes known to cause this symptom.
    pub caused_by: Vec<String>,
}

/// A knowledge-graph node, tagged by kind.
#[derive(Debug, Clone)]
pub enum Entity {
    Dtc(DtcEntity),
    Component(ComponentEntity),
    Symptom(SymptomEntity),
}

impl Entity {
    /// The store key this entity is addressed by.
    pub fn key(&self) -> &str {
        match self {
            Entity::Dtc(d) => &d.code,
            Entity::Component(c) => &c.name,
            Entity::Symptom(s) => &s.name,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Dtc(_) => EntityKind::Dtc,
            Entity::Component(_) => EntityKind::Component,
            Entity::Symptom(_) => EntityKind::Symptom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_matches_variant_field() {
        let e = Entity::Symptom(SymptomEntity {
            name: "Continuous Fan".into(),
            description: String::new(),
            indicates: vec![],
            caused_by: vec![],
        });
        assert_eq!(e.key(), "Continuous Fan");
        assert_eq!(e.kind(), EntityKind::Symptom);
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(EntityKind::Dtc.to_string(), "dtc");
        assert_eq!(EntityKind::Component.to_string(), "component");
    }
}
