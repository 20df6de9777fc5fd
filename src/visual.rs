//! Visual-aid attachment: splice fixed component image bundles into a
//! generated answer.
//!
//! Explanation answers are text-only — the intent overrides the visual-aid
//! flag unconditionally. For the remaining intents, the first matching
//! bundle rule wins: the coolant-sensor bundle (sensor + ECU pin diagrams)
//! takes precedence over the fuse-box bundle.

use crate::extract::{ExtractedQuery, Intent};

/// Inserted images land immediately before this marker when the answer ends
/// with the standard citation line.
const CITATION_MARK: &str = "<p><em>Source: TATA Nano";

const IMAGES_HEADER: &str = "\n\n<h4>\u{1f4f7} Component Images & Location</h4>\n";

pub const COOLANT_SENSOR_IMG: &str = "<div class=\"component-image\">\n<img src=\"data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='400' height='300' viewBox='0 0 400 300'%3E%3Crect fill='%23f0f0f0' width='400' height='300'/%3E%3Ctext x='200' y='100' font-family='Arial' font-size='20' fill='%23667eea' text-anchor='middle' font-weight='bold'%3ECoolant Temperature Sensor%3C/text%3E%3Ccircle cx='200' cy='180' r='50' fill='%23667eea' opacity='0.3'/%3E%3Cline x1='200' y1='130' x2='200' y2='230' stroke='%23667eea' stroke-width='3'/%3E%3Cline x1='150' y1='180' x2='250' y2='180' stroke='%23667eea' stroke-width='3'/%3E%3Ctext x='200' y='260' font-family='Arial' font-size='14' fill='%23666' text-anchor='middle'%3ELocation: Thermostat Housing%3C/text%3E%3Ctext x='80' y='180' font-family='Arial' font-size='12' fill='%23666'%3EPin 1 (ECU 44)%3C/text%3E%3Ctext x='260' y='180' font-family='Arial' font-size='12' fill='%23666'%3EPin 2 (ECU 30)%3C/text%3E%3C/svg%3E\">\n<div class=\"image-caption\">\u{1f4cd} Coolant Temperature Sensor - Thermostat Housing</div>\n</div>";

pub const ECU_PINS_IMG: &str = "<div class=\"component-image\">\n<img src=\"data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='400' height='250' viewBox='0 0 400 250'%3E%3Crect fill='%23f0f0f0' width='400' height='250'/%3E%3Ctext x='200' y='30' font-family='Arial' font-size='18' fill='%23667eea' text-anchor='middle' font-weight='bold'%3EECU Pin Configuration%3C/text%3E%3Crect x='80' y='60' width='240' height='120' fill='%23667eea' opacity='0.2' rx='10'/%3E%3Ccircle cx='140' cy='100' r='18' fill='%23667eea'/%3E%3Ctext x='140' y='107' font-family='Arial' font-size='14' fill='white' text-anchor='middle' font-weight='bold'%3E30%3C/text%3E%3Ctext x='140' y='135' font-family='Arial' font-size='11' fill='%23666' text-anchor='middle'%3ESensor Ground%3C/text%3E%3Ccircle cx='260' cy='100' r='18' fill='%23764ba2'/%3E%3Ctext x='260' y='107' font-family='Arial' font-size='14' fill='white' text-anchor='middle' font-weight='bold'%3E44%3C/text%3E%3Ctext x='260' y='135' font-family='Arial' font-size='11' fill='%23666' text-anchor='middle'%3ESensor Input%3C/text%3E%3Ctext x='200' y='165' font-family='Arial' font-size='12' fill='%23666' text-anchor='middle'%3EConnector: Black | 3.3V%3C/text%3E%3C/svg%3E\">\n<div class=\"image-caption\">\u{1f50c} ECU Pins 30 &amp; 44</div>\n</div>";

pub const FUSE_BOX_IMG: &str = "<div class=\"component-image\">\n<img src=\"data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='400' height='280' viewBox='0 0 400 280'%3E%3Crect fill='%23f0f0f0' width='400' height='280'/%3E%3Ctext x='200' y='30' font-family='Arial' font-size='20' fill='%23667eea' text-anchor='middle' font-weight='bold'%3EFuse Box Layout%3C/text%3E%3Crect x='50' y='60' width='100' height='60' fill='%23667eea' opacity='0.7'/%3E%3Ctext x='100' y='85' font-family='Arial' font-size='14' fill='white' text-anchor='middle' font-weight='bold'%3EWW RH%3C/text%3E%3Ctext x='100' y='105' font-family='Arial' font-size='16' fill='white' text-anchor='middle' font-weight='bold'%3E30A%3C/text%3E%3Crect x='160' y='60' width='100' height='60' fill='%23667eea' opacity='0.7'/%3E%3Ctext x='210' y='85' font-family='Arial' font-size='14' fill='white' text-anchor='middle' font-weight='bold'%3EWW LH%3C/text%3E%3Ctext x='210' y='105' font-family='Arial' font-size='16' fill='white' text-anchor='middle' font-weight='bold'%3E30A%3C/text%3E%3Crect x='270' y='60' width='80' height='60' fill='%23764ba2' opacity='0.7'/%3E%3Ctext x='310' y='85' font-family='Arial' font-size='12' fill='white' text-anchor='middle' font-weight='bold'%3EWW MOTOR%3C/text%3E%3Ctext x='310' y='105' font-family='Arial' font-size='16' fill='white' text-anchor='middle' font-weight='bold'%3E10A%3C/text%3E%3Ctext x='50' y='160' font-family='Arial' font-size='12' fill='%23666'%3E\u{2022} WW RH: Right Window (30A)%3C/text%3E%3Ctext x='50' y='180' font-family='Arial' font-size='12' fill='%23666'%3E\u{2022} WW LH: Left Window (30A)%3C/text%3E%3Ctext x='50' y='200' font-family='Arial' font-size='12' fill='%23666'%3E\u{2022} WW MOTOR: Control (10A)%3C/text%3E%3C/svg%3E\">\n<div class=\"image-caption\">\u{26a1} Window Fuse Locations</div>\n</div>";

fn matches_coolant(extracted: &ExtractedQuery, query_lower: &str) -> bool {
    extracted.dtc_codes.iter().any(|c| c == "P0117" || c == "P0118")
        || extracted.components.iter().any(|c| c == "Coolant Sensor")
        || query_lower.contains("coolant")
        || query_lower.contains("temperature sensor")
        || query_lower.contains("ect")
        || (query_lower.contains("part") && !extracted.dtc_codes.is_empty())
}

fn matches_fuse_box(extracted: &ExtractedQuery, query_lower: &str) -> bool {
    extracted.components.iter().any(|c| c == "Window Motor")
        || query_lower.contains("window")
        || query_lower.contains("fuse")
}

/// Select the image bundle for this request, if any.
fn select_bundle(extracted: &ExtractedQuery, query_lower: &str) -> Option<Vec<&'static str>> {
    if matches_coolant(extracted, query_lower) {
        return Some(vec![COOLANT_SENSOR_IMG, ECU_PINS_IMG]);
    }
    if matches_fuse_box(extracted, query_lower) {
        return Some(vec![FUSE_BOX_IMG]);
    }
    None
}

/// Splice the matching image bundle into `answer` when the request asked for
/// visual aids. Explanation answers never receive images.
pub fn attach(answer: String, extracted: &ExtractedQuery, query: &str) -> String {
    if extracted.intent == Intent::Explanation || !extracted.wants_visual_aid {
        return answer;
    }

    let query_lower = query.to_lowercase();
    let Some(bundle) = select_bundle(extracted, &query_lower) else {
        return answer;
    };

    let mut block = String::from(IMAGES_HEADER);
    for img in bundle {
        block.push_str(img);
        block.push('\n');
    }

    match answer.find(CITATION_MARK) {
        // Insert the block just ahead of the trailing source citation.
        Some(pos) => {
            let mut out = String::with_capacity(answer.len() + block.len());
            out.push_str(&answer[..pos]);
            out.push_str(&block);
            out.push('\n');
            out.push_str(&answer[pos..]);
            out
        }
        None => answer + &block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    #[test]
    fn explanation_never_gets_images() {
        // Force the flag on to prove the intent override wins.
        let mut extracted = extract("P0117 details");
        extracted.wants_visual_aid = true;
        let out = attach("<p>answer</p>".into(), &extracted, "P0117 details");
        assert_eq!(out, "<p>answer</p>");
    }

    #[test]
    fn no_flag_means_no_images() {
        let extracted = extract("how to fix P0117");
        let out = attach("<p>answer</p>".into(), &extracted, "how to fix P0117");
        assert_eq!(out, "<p>answer</p>");
    }

    #[test]
    fn coolant_query_attaches_sensor_and_ecu_images() {
        let query = "Show me picture of coolant sensor";
        let out = attach("<p>answer</p>".into(), &extract(query), query);
        assert!(out.contains(COOLANT_SENSOR_IMG));
        assert!(out.contains(ECU_PINS_IMG));
        assert!(!out.contains(FUSE_BOX_IMG), "bundles are mutually exclusive");
    }

    #[test]
    fn window_query_attaches_fuse_box_image() {
        let query = "show me the window fuse diagram";
        let out = attach("<p>answer</p>".into(), &extract(query), query);
        assert!(out.contains(FUSE_BOX_IMG));
        assert!(!out.contains(COOLANT_SENSOR_IMG));
    }

    #[test]
    fn coolant_rule_wins_when_both_match() {
        let query = "show picture of the coolant sensor fuse";
        let out = attach("<p>answer</p>".into(), &extract(query), query);
        assert!(out.contains(COOLANT_SENSOR_IMG));
        assert!(!out.contains(FUSE_BOX_IMG));
    }

    #[test]
    fn images_splice_before_citation_line() {
        let query = "show me picture of coolant sensor";
        let answer = "<p>body</p><p><em>Source: TATA Nano EMS Service Manual v5.0</em></p>";
        let out = attach(answer.into(), &extract(query), query);
        let images_at = out.find(COOLANT_SENSOR_IMG).expect("images attached");
        let citation_at = out.find(CITATION_MARK).expect("citation kept");
        assert!(images_at < citation_at, "images must precede the citation");
        assert!(out.ends_with("</em></p>"));
    }

    #[test]
    fn images_append_without_citation_line() {
        let query = "show me picture of coolant sensor";
        let out = attach("<p>body</p>".into(), &extract(query), query);
        assert!(out.starts_with("<p>body</p>"));
        assert!(out.contains(COOLANT_SENSOR_IMG));
    }

    #[test]
    fn unmatched_visual_request_is_left_unchanged() {
        let query = "show me the thermostat";
        let out = attach("<p>answer</p>".into(), &extract(query), query);
        assert_eq!(out, "<p>answer</p>");
    }
}
