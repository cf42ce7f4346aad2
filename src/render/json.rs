//! JSON rendering of a merged preference set

use crate::domain::MergedPreferences;
use serde_json::{Map, Value};

/// Render as a pretty JSON object keyed by preference name.
///
/// Keys come out sorted because `MergedPreferences` iterates in key order.
pub fn render_json(merged: &MergedPreferences) -> serde_json::Result<String> {
    let mut map = Map::new();
    for entry in merged.iter() {
        let mut fields = Map::new();
        fields.insert("value".into(), serde_json::to_value(&entry.value)?);
        fields.insert("kind".into(), serde_json::to_value(entry.kind)?);
        fields.insert("override_user".into(), Value::Bool(entry.override_user()));
        map.insert(entry.key.clone(), Value::Object(fields));
    }
    let mut out = serde_json::to_string_pretty(&Value::Object(map))?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OverlaySet;
    use crate::merge::merge;
    use crate::parse::parse_overlay;
    use serde_json::json;

    #[test]
    fn renders_typed_values_and_flags() {
        let overlay = parse_overlay(
            "x",
            "user_pref(\"pdfjs.enableScripting\", false);\npref(\"network.cookie.cookieBehavior\", 2);\npref(\"toolkit.telemetry.server\", \"\");\n",
        )
        .expect("parse");
        let merged = merge(&[overlay]);
        let parsed: Value = serde_json::from_str(&render_json(&merged).expect("render")).expect("valid json");

        assert_eq!(parsed["pdfjs.enableScripting"]["value"], json!(false));
        assert_eq!(parsed["pdfjs.enableScripting"]["kind"], json!("user"));
        assert_eq!(parsed["pdfjs.enableScripting"]["override_user"], json!(true));
        assert_eq!(parsed["network.cookie.cookieBehavior"]["value"], json!(2));
        assert_eq!(parsed["network.cookie.cookieBehavior"]["override_user"], json!(false));
        assert_eq!(parsed["toolkit.telemetry.server"]["value"], json!(""));
    }

    #[test]
    fn empty_merge_is_empty_object() {
        let merged = merge(&[OverlaySet::new("empty")]);
        assert_eq!(render_json(&merged).expect("render"), "{}\n");
    }

    #[test]
    fn escaped_strings_survive_as_json() {
        let overlay = parse_overlay("x", "pref(\"ui.label\", \"tab\\there \\\"q\\\" \\x01\");\n")
            .expect("parse");
        let rendered = render_json(&merge(&[overlay])).expect("render");
        let parsed: Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(parsed["ui.label"]["value"], json!("tab\there \"q\" \u{1}"));
        assert!(rendered.ends_with("}\n"));
    }
}
