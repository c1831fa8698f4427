use once_cell::sync::Lazy;
use regex::Regex;
use url::form_urlencoded;

use crate::models::{Place, PlaceResult, Suggestion};

const MAPS_BASE: &str = "https://www.google.com/maps";

static LABEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:[-*•][ \t]*)?(theme|venue[ \t]*query)[ \t]*:[ \t]*(.*?)[ \t]*$")
        .expect("label pattern is valid")
});

pub fn coordinates_url(lat: f64, lng: f64) -> String {
    format!("{MAPS_BASE}/@{lat},{lng},12z")
}

/// Search deep-link with the query form-encoded (spaces become `+`).
pub fn search_url(query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("{MAPS_BASE}/search/?api=1&query={encoded}")
}

pub fn place_url(name: &str, place_id: &str) -> String {
    let place_id: String = form_urlencoded::byte_serialize(place_id.as_bytes()).collect();
    format!("{}&query_place_id={place_id}", search_url(name))
}

pub fn enrich_suggestion(suggestion: &mut Suggestion) {
    suggestion.maps_url = match suggestion.coordinates() {
        Some((lat, lng)) => coordinates_url(lat, lng),
        None => search_url(&suggestion.name),
    };
}

pub fn enrich_place(place: &mut Place, city: &str) {
    place.maps_url = search_url(&format!("{} {}", place.name, city));
}

pub fn enrich_place_result(place: &mut PlaceResult) {
    place.maps_url = place_url(&place.name, &place.place_id);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLabels {
    pub theme: Option<String>,
    pub venue_query: Option<String>,
}

impl ChatLabels {
    /// Both labels, or nothing: a venue lookup needs the pair.
    pub fn venue_lookup(&self) -> Option<(&str, &str)> {
        Some((self.theme.as_deref()?, self.venue_query.as_deref()?))
    }
}

/// Pulls the `Theme:` / `VenueQuery:` lines out of a chat reply and returns
/// the remaining text alongside them. The first non-empty value per label wins.
pub fn split_chat_labels(text: &str) -> (String, ChatLabels) {
    let mut labels = ChatLabels::default();
    for captures in LABEL_LINE.captures_iter(text) {
        let value = captures[2].trim();
        if value.is_empty() {
            continue;
        }
        let slot = if captures[1].eq_ignore_ascii_case("theme") {
            &mut labels.theme
        } else {
            &mut labels.venue_query
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    let body = LABEL_LINE.replace_all(text, "");
    let mut lines = body.lines().map(str::trim_end).collect::<Vec<_>>();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    (lines.join("\n").trim().to_string(), labels)
}
