use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

/// Credentials and endpoints for both outbound clients, read once at start-up.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub model: ModelConfig,
    pub places: PlacesConfig,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let gemini_key = non_empty_var("GEMINI_KEY").context("GEMINI_KEY must be set")?;

        Ok(Self {
            model: ModelConfig {
                api_key: gemini_key,
                model: non_empty_var("GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url: non_empty_var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                timeout: seconds_var("WANDER_MODEL_TIMEOUT_SECONDS", 30),
            },
            places: PlacesConfig {
                api_key: non_empty_var("PLACES_KEY"),
                base_url: non_empty_var("PLACES_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PLACES_BASE_URL.to_string()),
                timeout: seconds_var("WANDER_PLACES_TIMEOUT_SECONDS", 15),
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn seconds_var(name: &str, default: u64) -> Duration {
    Duration::from_secs(
        env::var(name)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| *seconds > 0)
            .unwrap_or(default),
    )
}
