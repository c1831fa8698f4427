//! Per-endpoint policies for turning extracted JSON elements into records.
//!
//! Recommendations are strict: one bad element rejects the whole reply.
//! Exploration is lenient: bad elements are skipped and reported back.

use serde_json::Value;

use crate::enrich::{enrich_place, enrich_suggestion};
use crate::error::{ExtractionError, RecordError};
use crate::extract::{MAX_EXPLORE_PLACES, MAX_SUGGESTIONS};
use crate::models::{Place, Suggestion};

pub fn suggestions_strict(
    raw: &str,
    items: Vec<Value>,
) -> Result<Vec<Suggestion>, ExtractionError> {
    items
        .iter()
        .take(MAX_SUGGESTIONS)
        .enumerate()
        .map(|(index, item)| {
            let mut suggestion =
                Suggestion::from_value(item).map_err(|reason| ExtractionError::InvalidRecord {
                    raw: raw.to_string(),
                    index,
                    reason,
                })?;
            enrich_suggestion(&mut suggestion);
            Ok(suggestion)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct LenientPlaces {
    pub places: Vec<Place>,
    pub skipped: Vec<(usize, RecordError)>,
}

pub fn places_lenient(items: Vec<Value>, city: &str) -> LenientPlaces {
    let mut outcome = LenientPlaces::default();
    for (index, item) in items.iter().enumerate() {
        if outcome.places.len() == MAX_EXPLORE_PLACES {
            break;
        }
        match Place::from_value(item) {
            Ok(mut place) => {
                enrich_place(&mut place, city);
                outcome.places.push(place);
            }
            Err(reason) => outcome.skipped.push((index, reason)),
        }
    }
    outcome
}
