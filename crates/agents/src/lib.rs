pub mod config;
pub mod gemini;
pub mod places;
pub mod planner;

use std::sync::Arc;

use anyhow::Result;
use wander_observability::AppMetrics;

pub use config::{ClientConfig, ModelConfig, PlacesConfig};
pub use gemini::{GeminiClient, LanguageModel};
pub use places::{GooglePlacesClient, PlacesLookup};
pub use planner::TravelPlanner;

pub type LivePlanner = TravelPlanner<GeminiClient, GooglePlacesClient>;

/// Wires the real HTTP clients into a planner.
pub fn build_planner(config: &ClientConfig, metrics: Arc<AppMetrics>) -> Result<LivePlanner> {
    let model = GeminiClient::new(&config.model)?;
    let places = GooglePlacesClient::new(&config.places)?;
    Ok(TravelPlanner::new(model, places, metrics))
}
