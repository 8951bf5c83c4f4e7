use crate::error::{OrchestratorError, Result};
use pagesmith_protocol::RawEditInstruction;
use serde_json::Value;

/// Edit instructions from a collaborator reply: one object, an array, or an object
/// with an `instructions` array. Code fences and surrounding prose are tolerated.
pub fn parse_instructions(reply: &str) -> Result<Vec<RawEditInstruction>> {
    let json = extract_json(reply)
        .ok_or_else(|| OrchestratorError::MalformedInstructions("no JSON found".to_string()))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|err| OrchestratorError::MalformedInstructions(err.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("instructions") {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(OrchestratorError::MalformedInstructions(format!(
                "expected an object or array, got {other}"
            )))
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|err| OrchestratorError::MalformedInstructions(err.to_string()))
        })
        .collect()
}

/// Body of a fenced block when present, else the text itself.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_open = &trimmed[open + 3..];
    let body_start = after_open.find('\n').map_or(0, |nl| nl + 1);
    let body = &after_open[body_start..];
    match body.rfind("```") {
        Some(close) => body[..close].trim_matches('\n'),
        None => body.trim_matches('\n'),
    }
}

fn extract_json(reply: &str) -> Option<&str> {
    let text = strip_code_fence(reply);
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
