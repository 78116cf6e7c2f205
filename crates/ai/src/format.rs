//! Render an AI reply object as display text.
//!
//! Output is HTML-ish: `<br>` line breaks, `<strong>` section titles, `•`
//! bullets and numbered lists. Text coming from the model is escaped.

use serde_json::{Map, Value};

const LINE: &str = "<br>";
const SECTION_BREAK: &str = "<br><br>";

/// Keys rendered as bullet lists, with their section titles.
const BULLET_SECTIONS: &[(&str, &str)] = &[
    ("insights", "Key Insights"),
    ("critical_risks", "Critical Risks"),
    ("data_gaps", "Data Gaps"),
];

/// Keys rendered as numbered lists, with their section titles.
const NUMBERED_SECTIONS: &[(&str, &str)] = &[
    ("recommendations", "Recommendations"),
    ("immediate_actions", "Immediate Actions"),
];

/// Turn a normalized reply (see [`AiEngine::run`](crate::AiEngine::run))
/// into display text.
pub fn format_for_display(value: &Value) -> String {
    let Some(obj) = value.as_object() else {
        return text_block(&scalar_text(value));
    };

    if obj.get("error").and_then(Value::as_bool) == Some(true) {
        return obj
            .get("response")
            .and_then(Value::as_str)
            .map(text_block)
            .unwrap_or_default();
    }

    let mut sections: Vec<String> = Vec::new();

    if let Some(headline) = headline(obj) {
        sections.push(headline);
    }
    if let Some(response) = obj.get("response").and_then(Value::as_str) {
        sections.push(text_block(response));
    }

    for (key, title) in BULLET_SECTIONS {
        if let Some(items) = non_empty_list(obj, key) {
            let lines: Vec<String> = items
                .iter()
                .map(|item| format!("\u{2022} {}", escape(&scalar_text(item))))
                .collect();
            sections.push(format!("<strong>{title}</strong>{LINE}{}", lines.join(LINE)));
        }
    }

    for (key, title) in NUMBERED_SECTIONS {
        if let Some(items) = non_empty_list(obj, key) {
            let lines: Vec<String> = items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, escape(&scalar_text(item))))
                .collect();
            sections.push(format!("<strong>{title}</strong>{LINE}{}", lines.join(LINE)));
        }
    }

    if let Some(capabilities) = non_empty_list(obj, "capabilities") {
        let lines: Vec<String> = capabilities
            .iter()
            .map(|item| format!("\u{2022} {}", escape(&scalar_text(item))))
            .collect();
        sections.push(lines.join(LINE));
    }

    sections.join(SECTION_BREAK)
}

/// `summary` (string) or `health_summary` (object with status/assessment).
fn headline(obj: &Map<String, Value>) -> Option<String> {
    if let Some(summary) = obj.get("summary").and_then(Value::as_str) {
        return Some(format!("<strong>Summary</strong>{LINE}{}", text_block(summary)));
    }

    let health = obj.get("health_summary")?;
    match health {
        Value::Object(h) => {
            let status = h.get("status").and_then(Value::as_str);
            let assessment = h.get("overall_assessment").and_then(Value::as_str);
            let mut out = String::new();
            if let Some(status) = status {
                out.push_str(&format!("<strong>Status: {}</strong>", escape(status)));
            }
            if let Some(assessment) = assessment {
                if !out.is_empty() {
                    out.push_str(LINE);
                }
                out.push_str(&text_block(assessment));
            }
            (!out.is_empty()).then_some(out)
        }
        Value::String(s) => Some(format!("<strong>Summary</strong>{LINE}{}", text_block(s))),
        _ => None,
    }
}

fn non_empty_list<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Escape and convert newlines.
fn text_block(text: &str) -> String {
    escape(text.trim()).replace('\n', LINE)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
