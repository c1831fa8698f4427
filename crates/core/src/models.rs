use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    pub maps_url: String,
}

impl Suggestion {
    /// Coordinates must come as an on-globe numeric pair or not at all.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let name = required_name(object)?;
        let lat = optional_number(object, "lat")?;
        let lng = optional_number(object, "lng")?;
        let (lat, lng) = match (lat, lng) {
            (None, None) => (None, None),
            (Some(lat), Some(lng))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
            {
                (Some(lat), Some(lng))
            }
            _ => return Err(RecordError::InvalidCoordinates),
        };

        Ok(Self {
            name,
            lat,
            lng,
            description: optional_text(object, "description")?,
            estimated_cost: optional_number(object, "estimated_cost")?,
            maps_url: String::new(),
        })
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cafe,
    Restaurant,
    Sight,
}

impl Category {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cafe" | "café" | "coffee" | "coffee shop" => Some(Self::Cafe),
            "restaurant" | "bar" | "food" => Some(Self::Restaurant),
            "sight" | "attraction" | "landmark" | "museum" => Some(Self::Sight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub category: Category,
    pub short_desc: String,
    pub maps_url: String,
}

impl Place {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let name = required_name(object)?;
        let category = object
            .get("category")
            .and_then(Value::as_str)
            .and_then(Category::parse)
            .ok_or(RecordError::UnknownCategory)?;

        Ok(Self {
            name,
            category,
            short_desc: optional_text(object, "short_desc")?,
            maps_url: String::new(),
        })
    }
}

/// A ranked hit from the places search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub name: String,
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub maps_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<PlaceResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacesResponse<T> {
    pub places: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

fn required_name(object: &Map<String, Value>) -> Result<String, RecordError> {
    object
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(RecordError::MissingName)
}

/// Absent and `null` read as empty; any other non-string is rejected.
fn optional_text(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<String, RecordError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        Some(_) => Err(RecordError::InvalidField(key)),
    }
}

fn optional_number(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<f64>, RecordError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(RecordError::InvalidField(key)),
    }
}
