use serde_json::Value;

use crate::error::ExtractionError;

pub const MAX_SUGGESTIONS: usize = 3;
pub const MAX_EXPLORE_PLACES: usize = 6;

/// Turns a raw model reply into the JSON array it was asked to produce.
pub trait ReplyExtractor: Send + Sync {
    fn extract(&self, raw: &str) -> Result<Vec<Value>, ExtractionError>;
}

/// Best-effort extraction: parse the whole reply, else the greedy span from
/// the first `[` to the last `]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketScan;

impl ReplyExtractor for BracketScan {
    fn extract(&self, raw: &str) -> Result<Vec<Value>, ExtractionError> {
        extract_json_array(raw)
    }
}

pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, ExtractionError> {
    let trimmed = raw.trim();
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(items);
    }

    let span = match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => {
            return Err(ExtractionError::NoArray {
                raw: raw.to_string(),
            })
        }
    };

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(ExtractionError::NotASequence {
            raw: raw.to_string(),
        }),
        Err(source) => Err(ExtractionError::Malformed {
            raw: raw.to_string(),
            source,
        }),
    }
}
