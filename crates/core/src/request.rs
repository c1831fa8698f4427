use serde::Deserialize;
use serde_json::Value;

use crate::error::InputError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendRequest {
    pub budget: u32,
    pub travelers: u32,
    pub keywords: String,
}

impl RecommendRequest {
    /// Parses the body whatever its content type; `budget` is required and
    /// `travelers` defaults to one.
    pub fn from_body(body: &[u8]) -> Result<Self, InputError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| InputError::MalformedBody)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, InputError> {
        let object = value.as_object().ok_or(InputError::MalformedBody)?;

        let budget = object
            .get("budget")
            .and_then(parse_count)
            .ok_or(InputError::InvalidNumber { field: "budget" })?;
        let travelers = match object.get("travelers") {
            None | Some(Value::Null) => 1,
            Some(value) => parse_count(value)
                .filter(|travelers| *travelers >= 1)
                .ok_or(InputError::InvalidNumber { field: "travelers" })?,
        };
        let keywords = match object.get("keywords") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.trim().to_string(),
            Some(_) => return Err(InputError::MalformedBody),
        };

        Ok(Self {
            budget,
            travelers,
            keywords,
        })
    }
}

/// Raw `/explore` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExploreQuery {
    pub city: Option<String>,
    pub keywords: Option<String>,
    pub budget: Option<String>,
    pub travelers: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreRequest {
    pub city: String,
    pub keywords: String,
    pub budget: Option<u32>,
    pub travelers: u32,
}

impl TryFrom<ExploreQuery> for ExploreRequest {
    type Error = InputError;

    fn try_from(query: ExploreQuery) -> Result<Self, Self::Error> {
        let city = non_blank(query.city).ok_or(InputError::MissingCity)?;
        let budget = match non_blank(query.budget) {
            Some(text) => Some(
                parse_count_str(&text).ok_or(InputError::InvalidNumber { field: "budget" })?,
            ),
            None => None,
        };
        let travelers = match non_blank(query.travelers) {
            Some(text) => parse_count_str(&text)
                .filter(|travelers| *travelers >= 1)
                .ok_or(InputError::InvalidNumber { field: "travelers" })?,
            None => 1,
        };

        Ok(Self {
            city,
            keywords: non_blank(query.keywords).unwrap_or_default(),
            budget,
            travelers,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn from_body(body: &[u8]) -> Result<String, InputError> {
        let request: ChatRequest =
            serde_json::from_slice(body).map_err(|_| InputError::EmptyMessage)?;
        non_blank(request.message).ok_or(InputError::EmptyMessage)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite() && *float >= 0.0)
                    .map(|float| float.trunc() as u64)
            })
            .and_then(|count| u32::try_from(count).ok()),
        Value::String(text) => parse_count_str(text),
        _ => None,
    }
}

fn parse_count_str(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}
