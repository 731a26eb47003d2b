use serde_json::Value;
use tracing::debug;

/// Decode the model's text as JSON, recovering an object embedded in prose.
///
/// The whole text is tried first, then each top-level `{...}` span from left
/// to right. Objects nested inside a span are never tried on their own, so a
/// malformed or truncated reply fails instead of yielding one of its parts.
pub fn parse_model_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    for candidate in top_level_objects(text) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            debug!("Recovered JSON object of {} bytes from prose", candidate.len());
            return Some(value);
        }
    }

    None
}

/// Balanced `{...}` spans that are not nested inside another span, in order.
///
/// Single pass over the text. Braces inside string literals are ignored,
/// including escaped quotes; quotes in the prose between spans are not
/// tracked. An unclosed span swallows the rest of the text.
pub fn top_level_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = offset;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    spans
}
