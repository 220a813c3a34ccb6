//! Recover JSON from raw model output

use crate::error::ExtractorError;
use serde_json::Value;
use tracing::warn;

/// Extract a JSON value from a model response.
///
/// The whole text is tried first. Failing that, the span from the first `{`
/// to the last `}` is tried, which covers prose before or after the object
/// and markdown code fences.
pub fn extract_json(response: &str) -> Result<Value, ExtractorError> {
    if let Ok(value) = serde_json::from_str(response) {
        return Ok(value);
    }

    let span = object_span(response)
        .ok_or_else(|| ExtractorError::Parse("LLM response did not contain JSON".to_string()))?;

    serde_json::from_str(span)
        .map_err(|e| ExtractorError::Parse(format!("Invalid JSON in LLM response: {}", e)))
}

/// Widest `{ ... }` span in the text, if any
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a response, falling back to exactly one repair round trip.
///
/// `repair` receives the offending text and returns the model's repaired
/// output. It is called at most once; if its output still cannot be parsed
/// the error is returned to the caller.
pub fn parse_with_repair<F>(response: &str, repair: F) -> Result<Value, ExtractorError>
where
    F: FnOnce(&str) -> Result<String, ExtractorError>,
{
    match extract_json(response) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("{}; requesting JSON repair", e);
            let repaired = repair(response)?;
            extract_json(&repaired)
        }
    }
}
