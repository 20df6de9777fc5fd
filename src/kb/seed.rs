//! Built-in knowledge base content.
//!
//! A compact demo corpus covering the P0117 coolant-circuit fault family:
//! one DTC, three components, three symptoms, and eight manual excerpts.
//! The on-disk format of a full corpus belongs to a loader collaborator;
//! this module only provides the in-memory shapes.

use super::entities::{ComponentEntity, DtcEntity, Entity, SymptomEntity};
use super::{KnowledgeBase, Passage};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn entities() -> Vec<Entity> {
    vec![
        Entity::Dtc(DtcEntity {
            code: "P0117".into(),
            fault_cause: "Short Circuit to Ground".into(),
            blink_code: "19".into(),
            symptoms: strings(&["Continuous Fan", "Sluggish Performance", "Cold Start Problem"]),
            // "Fuel Consumption" is a literal, not a store key.
            affects: strings(&["Radiator Fan", "Coolant Sensor", "Fuel Consumption"]),
            ecu_pins: strings(&["30", "44"]),
            repair_steps: strings(&[
                "Check coolant level between MIN-MAX marks",
                "Inspect connector pins for corrosion or damage",
                "Test continuity Pin 44\u{2194}1, Pin 30\u{2194}2",
                "Verify no short to ground on Pin 44",
                "Measure voltage 3.3V \u{b1} 0.2V",
                "Test resistance 1.954-2.160 K Ohm at 25\u{b0}C",
            ]),
        }),
        Entity::Component(ComponentEntity {
            name: "Coolant Sensor".into(),
            sensor_type: Some("NTC Thermistor".into()),
            location: Some("Thermostat Housing".into()),
            voltage: Some("3.3V".into()),
            resistance: Some("1.954-2.160 K Ohm at 25\u{b0}C".into()),
            connects_to: strings(&["ECU Pin 44", "ECU Pin 30"]),
            related_dtcs: strings(&["P0117", "P0118"]),
            ..ComponentEntity::default()
        }),
        Entity::Component(ComponentEntity {
            name: "Radiator Fan".into(),
            controlled_by: Some("ECU".into()),
            on_temp: Some("95-98\u{b0}C".into()),
            off_temp: Some("92-95\u{b0}C".into()),
            rotation: Some("Anticlockwise".into()),
            rpm: Some("2200-2300".into()),
            related_dtcs: strings(&["P0117", "P0118", "P0691"]),
            ..ComponentEntity::default()
        }),
        Entity::Component(ComponentEntity {
            name: "Window Motor".into(),
            fuses: strings(&["WW RH 30A", "WW LH 30A", "WW MOTOR 10A"]),
            ..ComponentEntity::default()
        }),
        Entity::Symptom(SymptomEntity {
            name: "Continuous Fan".into(),
            description: "Fan runs continuously in limp-home mode".into(),
            indicates: strings(&["P0117", "P0118"]),
            caused_by: vec![],
        }),
        Entity::Symptom(SymptomEntity {
            name: "Sluggish Performance".into(),
            description: "Increased engine load due to continuous fan".into(),
            indicates: vec![],
            caused_by: strings(&["P0117"]),
        }),
        Entity::Symptom(SymptomEntity {
            name: "Cold Start Problem".into(),
            description: "Engine struggles to start when cold".into(),
            indicates: vec![],
            caused_by: strings(&["P0117"]),
        }),
    ]
}

struct RawPassage {
    id: &'static str,
    text: &'static str,
    dtc: Option<&'static str>,
    component: Option<&'static str>,
    page: u32,
    section: &'static str,
}

const RAW_PASSAGES: &[RawPassage] = &[
    RawPassage {
        id: "chunk_1",
        text: "DTC P0117 indicates Engine Coolant Temperature Circuit Low. This fault occurs \
               when the ECU detects a short circuit to ground in the ECT sensor circuit, \
               interpreting it as an extremely high temperature reading above 137.3\u{b0}C.",
        dtc: Some("P0117"),
        component: Some("Coolant Sensor"),
        page: 165,
        section: "Fault Description",
    },
    RawPassage {
        id: "chunk_2",
        text: "When P0117 is active, the radiator fan runs continuously as a protective \
               limp-home mode to prevent overheating. This causes increased fuel consumption \
               and sluggish vehicle performance due to increased engine load.",
        dtc: Some("P0117"),
        component: Some("Radiator Fan"),
        page: 166,
        section: "Impact on Vehicle",
    },
    RawPassage {
        id: "chunk_3",
        text: "The coolant temperature sensor is an NTC (Negative Temperature Coefficient) \
               thermistor located in the thermostat housing. Supply voltage is 3.3V \u{b1} 0.2V. \
               Normal resistance at 25\u{b0}C is 1.954 to 2.160 K Ohm. It connects to ECU Pin 44 \
               (signal) and Pin 30 (ground).",
        dtc: None,
        component: Some("Coolant Sensor"),
        page: 45,
        section: "Component Specifications",
    },
    RawPassage {
        id: "chunk_4",
        text: "P0117 Repair Procedure: Step 1 - Check coolant level between MIN and MAX marks. \
               Step 2 - Inspect connector pins for back-out, corrosion, or damage. Step 3 - Test \
               continuity from sensor to ECU (Pin 44\u{2194}Pin 1, Pin 30\u{2194}Pin 2). Step 4 - \
               Verify no short to ground on Pin 44. Step 5 - Measure 3.3V \u{b1} 0.2V at sensor. \
               Step 6 - Test sensor resistance at room temperature.",
        dtc: Some("P0117"),
        component: None,
        page: 167,
        section: "Repair Procedure",
    },
    RawPassage {
        id: "chunk_5",
        text: "The radiator fan is controlled by the ECU and turns ON at coolant temperature \
               95-98\u{b0}C and OFF at 92-95\u{b0}C. Fan rotation direction is anticlockwise when \
               viewed from front. Normal operating RPM is 2200-2300. The fan fuse rating is 30A.",
        dtc: None,
        component: Some("Radiator Fan"),
        page: 52,
        section: "Radiator Fan Specifications",
    },
    RawPassage {
        id: "chunk_6",
        text: "Window motor fuses: WW RH (Window Winding Right Hand) is 30A, WW LH (Window \
               Winding Left Hand) is 30A, and WW MOTOR (Window Motor Control) is 10A. Located \
               in main fuse box.",
        dtc: None,
        component: Some("Window Motor"),
        page: 28,
        section: "Fuse Specifications",
    },
    RawPassage {
        id: "chunk_7",
        text: "Cold start problems with P0117 occur because the ECU incorrectly believes the \
               engine is hot due to the sensor fault. This affects the fuel mixture calculations \
               and can prevent proper engine starting when the engine is actually cold.",
        dtc: Some("P0117"),
        component: None,
        page: 166,
        section: "Cold Start Issues",
    },
    RawPassage {
        id: "chunk_8",
        text: "Most common cause of P0117 is a faulty coolant temperature sensor. Second most \
               common is wiring harness damage causing short to ground. Check sensor connector \
               first before replacing sensor. If wiring is damaged, repair or replace harness.",
        dtc: Some("P0117"),
        component: None,
        page: 168,
        section: "Common Causes",
    },
];

fn passages() -> Vec<Passage> {
    RAW_PASSAGES
        .iter()
        .map(|r| Passage {
            id: r.id.to_string(),
            text: r.text.to_string(),
            dtc: r.dtc.map(str::to_string),
            component: r.component.map(str::to_string),
            page: r.page,
            section: r.section.to_string(),
        })
        .collect()
}

/// The built-in demo knowledge base.
pub fn builtin() -> KnowledgeBase {
    // Seed content is statically known to have unique keys.
    KnowledgeBase::new(entities(), passages()).expect("builtin knowledge base is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_loads_expected_counts() {
        let kb = builtin();
        assert_eq!(kb.entity_count(), 7);
        assert_eq!(kb.passages().len(), 8);
    }

    #[test]
    fn dtc_symptom_references_resolve_or_are_literals() {
        let kb = builtin();
        let Some(Entity::Dtc(dtc)) = kb.entity("P0117") else {
            panic!("P0117 should be a DTC entity");
        };
        // Every listed symptom resolves to a store key.
        for s in &dtc.symptoms {
            assert!(kb.contains(s), "symptom '{s}' should resolve");
        }
        // "Fuel Consumption" stays a literal — present in affects, absent from the store.
        assert!(dtc.affects.iter().any(|a| a == "Fuel Consumption"));
        assert!(!kb.contains("Fuel Consumption"));
    }

    #[test]
    fn window_motor_has_three_fuse_ratings() {
        let kb = builtin();
        let Some(Entity::Component(c)) = kb.entity("Window Motor") else {
            panic!("Window Motor should be a component entity");
        };
        assert_eq!(c.fuses.len(), 3);
    }
}
