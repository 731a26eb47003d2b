use serde_json::{Map, Value};

use crate::models::{AnalysisRecord, RiskLevel, SentimentSegment};

/// Coerce an arbitrary decoded model response into a complete `AnalysisRecord`.
///
/// This is total: any JSON value yields a fully populated record. For a
/// non-object input its text becomes the summary. For an object, recognized
/// keys override the defaults and every other key is dropped.
pub fn normalize(raw: &Value) -> AnalysisRecord {
    let Value::Object(fields) = raw else {
        return AnalysisRecord {
            summary: coerce_string(raw),
            ..Default::default()
        };
    };

    let field = |key: &str| fields.get(key).unwrap_or(&Value::Null);

    AnalysisRecord {
        language: coerce_string(field("language")),
        summary: coerce_string(field("summary")),
        customer_sentiment: coerce_string(field("customer_sentiment")),
        primary_intent: coerce_string(field("primary_intent")),
        key_entities: coerce_sequence(field("key_entities")),
        compliance_violations: coerce_sequence(field("compliance_violations")),
        agent_score: coerce_int(field("agent_score")),
        foul_language_detected: coerce_bool(field("foul_language_detected")),
        foul_language_examples: coerce_string_sequence(field("foul_language_examples")),
        threat_detected: coerce_bool(field("threat_detected")),
        threat_examples: coerce_string_sequence(field("threat_examples")),
        compliance_risk_level: field("compliance_risk_level")
            .as_str()
            .and_then(RiskLevel::parse)
            .unwrap_or_default(),
        call_outcome: coerce_string(field("call_outcome")),
        sentiment_timeline: coerce_sequence(field("sentiment_timeline"))
            .iter()
            .map(coerce_segment)
            .collect(),
        explainability: coerce_string_sequence(field("explainability")),
        error: match field("error") {
            Value::Null => None,
            other => Some(coerce_string(other)),
        },
    }
}

/// Strings pass through, null is empty, anything else becomes its JSON text
fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Truthiness, except that the usual spelled-out negatives count as false.
///
/// Unlike plain truthiness, the strings "false", "no", "0", "none" and "null"
/// (trimmed, any case) coerce to `false`.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            !matches!(s.as_str(), "" | "false" | "no" | "0" | "none" | "null")
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Best-effort integer conversion; anything unconvertible is 0
fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().and_then(truncate_float))
            .unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_float))
                .unwrap_or(0)
        }
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}

fn truncate_float(f: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds
    f.is_finite().then(|| f.trunc() as i64)
}

/// Arrays pass through, null is empty, a lone scalar or object is wrapped
fn coerce_sequence(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn coerce_string_sequence(value: &Value) -> Vec<String> {
    coerce_sequence(value).iter().map(coerce_string).collect()
}

fn coerce_segment(item: &Value) -> SentimentSegment {
    match item {
        Value::Object(fields) => SentimentSegment {
            segment: coerce_string(lookup(fields, "segment")),
            customer_sentiment: match lookup(fields, "customer_sentiment") {
                Value::Null => coerce_string(lookup(fields, "sentiment")),
                sentiment => coerce_string(sentiment),
            },
        },
        other => SentimentSegment {
            segment: coerce_string(other),
            customer_sentiment: String::new(),
        },
    }
}

fn lookup<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a Value {
    fields.get(key).unwrap_or(&Value::Null)
}
