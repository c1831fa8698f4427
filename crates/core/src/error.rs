use thiserror::Error;

/// Rejected request input. Raised before any outbound call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid number for `{field}`")]
    InvalidNumber { field: &'static str },
    #[error("no city provided")]
    MissingCity,
    #[error("empty chat message")]
    EmptyMessage,
    #[error("request body is not a JSON object")]
    MalformedBody,
    #[error("query string could not be decoded")]
    MalformedQuery,
}

/// Failure talking to the language model or the places API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} payload malformed: {message}")]
    MalformedPayload {
        service: &'static str,
        message: String,
    },
    #[error("{service} credential `{variable}` is not configured")]
    MissingCredential {
        service: &'static str,
        variable: &'static str,
    },
    #[error("{service} api status {status}: {message}")]
    Api {
        service: &'static str,
        status: String,
        message: String,
    },
}

/// The model reply did not contain usable structured output.
///
/// Every variant keeps the untouched reply so failures can be logged and
/// reproduced.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no JSON array found in model reply")]
    NoArray { raw: String },
    #[error("embedded JSON array failed to parse: {source}")]
    Malformed {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("embedded JSON is not an array")]
    NotASequence { raw: String },
    #[error("record {index} rejected: {reason}")]
    InvalidRecord {
        raw: String,
        index: usize,
        reason: RecordError,
    },
}

impl ExtractionError {
    pub fn raw(&self) -> &str {
        match self {
            Self::NoArray { raw }
            | Self::Malformed { raw, .. }
            | Self::NotASequence { raw }
            | Self::InvalidRecord { raw, .. } => raw,
        }
    }
}

/// Why a single extracted element could not become a typed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("element is not an object")]
    NotAnObject,
    #[error("missing or empty `name`")]
    MissingName,
    #[error("unrecognised category")]
    UnknownCategory,
    #[error("`lat` and `lng` must both be present and on the globe")]
    InvalidCoordinates,
    #[error("`{0}` has the wrong type")]
    InvalidField(&'static str),
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
