//! Normalization of free-text narrative replies
//!
//! Collaborators are asked for a JSON object but may answer with markdown
//! fences, partial objects or plain prose. Every non-empty reply is turned
//! into a [`Narrative`]; an empty reply is reported as `None` so the caller
//! can fall back to the template. Structured replies get the same defaults
//! for blank fields.

use serde_json::Value;

use super::Narrative;

pub const MISSING_SUITABILITY: &str = "Review recommended";
pub const PROSE_SUITABILITY: &str = "Analysis available in summary";

/// Remove a surrounding ```` ``` ```` or ```` ```json ```` fence if present
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Turn raw reply text into a narrative, or `None` if there is nothing to use
pub fn normalize_text_reply(text: &str) -> Option<Narrative> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(fields)) => {
            let summary = fields
                .get("summary")
                .and_then(Value::as_str)
                .filter(|summary| !summary.trim().is_empty())
                .unwrap_or(cleaned)
                .to_string();

            let insights = fields
                .get("insights")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let suitability = fields
                .get("suitability")
                .and_then(Value::as_str)
                .unwrap_or(MISSING_SUITABILITY)
                .to_string();

            normalize_structured_reply(Narrative {
                summary,
                insights,
                suitability,
            })
        }
        _ => Some(Narrative {
            summary: cleaned.to_string(),
            insights: Vec::new(),
            suitability: PROSE_SUITABILITY.to_string(),
        }),
    }
}

/// Apply reply defaults to an already structured narrative.
///
/// A blank summary makes the reply unusable. Blank insights are dropped and a
/// blank suitability becomes [`MISSING_SUITABILITY`]; surrounding whitespace
/// is trimmed everywhere.
pub fn normalize_structured_reply(narrative: Narrative) -> Option<Narrative> {
    if narrative.is_blank() {
        return None;
    }

    let insights = narrative
        .insights
        .iter()
        .map(|insight| insight.trim())
        .filter(|insight| !insight.is_empty())
        .map(str::to_string)
        .collect();

    let suitability = match narrative.suitability.trim() {
        "" => MISSING_SUITABILITY,
        suitability => suitability,
    };

    Some(Narrative {
        summary: narrative.summary.trim().to_string(),
        insights,
        suitability: suitability.to_string(),
    })
}
