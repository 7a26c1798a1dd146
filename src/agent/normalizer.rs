use serde_json::Value;

use crate::agent::error::AgentError;
use crate::agent::output_types::{AgentResult, FieldKind, Payload, Schema};

/// Coerces raw model output into a schema-checked payload.
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    /// Parse JSON output, tolerating a surrounding markdown code fence.
    pub fn normalize(raw: &str, schema: &Schema) -> AgentResult {
        let body = strip_code_fence(raw);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AgentError::Parse(format!("invalid JSON: {}", e)))?;

        let Value::Object(payload) = value else {
            return Err(AgentError::Parse("expected a JSON object".to_string()));
        };

        schema.validate(&payload)?;
        Ok(payload)
    }

    /// Wrap free-text output (e.g. generated HTML) into the schema's single text field.
    pub fn normalize_text(raw: &str, schema: &Schema) -> AgentResult {
        let [(field, FieldKind::Text)] = schema.fields else {
            return Err(AgentError::Parse(
                "schema does not describe a single text field".to_string(),
            ));
        };

        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Err(AgentError::Parse("model returned empty output".to_string()));
        }

        let mut payload = Payload::new();
        payload.insert(field.to_string(), Value::String(body.to_string()));
        Ok(payload)
    }
}

/// Remove a ```` ```lang ```` ... ```` ``` ```` wrapper if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // The info string ("json", "html", ...) runs to the end of the opening line.
    let rest = match rest.find('\n') {
        Some(idx) if is_info_string(&rest[..idx]) => &rest[idx + 1..],
        _ => rest.strip_prefix("json").unwrap_or(rest),
    };

    // Anything after the closing fence is commentary.
    match rest.rfind("```") {
        Some(idx) => rest[..idx].trim(),
        None => rest.trim(),
    }
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
