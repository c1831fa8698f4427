pub mod enrich;
pub mod error;
pub mod extract;
pub mod models;
pub mod prompts;
pub mod records;
pub mod request;

pub use enrich::{split_chat_labels, ChatLabels};
pub use error::{ExtractionError, InputError, PlannerError, RecordError, UpstreamError};
pub use extract::{BracketScan, ReplyExtractor, MAX_EXPLORE_PLACES, MAX_SUGGESTIONS};
pub use models::*;
pub use request::{ChatRequest, ExploreQuery, ExploreRequest, RecommendRequest};
