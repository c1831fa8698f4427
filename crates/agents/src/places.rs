use std::future::Future;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use wander_core::{PlaceResult, UpstreamError};

use crate::config::PlacesConfig;
use crate::gemini::{transport_error, truncate};

const SERVICE: &str = "places";
const MAX_ERROR_BODY: usize = 512;

/// Free-text place search returning results in the provider's ranking order.
pub trait PlacesLookup: Send + Sync {
    fn search(&self, query: &str)
        -> impl Future<Output = Result<Vec<PlaceResult>, UpstreamError>> + Send;
}

#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(config: &PlacesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build places HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl PlacesLookup for GooglePlacesClient {
    async fn search(&self, query: &str) -> Result<Vec<PlaceResult>, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential {
                service: SERVICE,
                variable: "PLACES_KEY",
            })?;

        let response = self
            .client
            .get(format!("{}/textsearch/json", self.base_url))
            .query(&[("query", query), ("key", api_key)])
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: truncate(&payload, MAX_ERROR_BODY),
            });
        }

        let results = parse_text_search(&payload)?;
        debug!(query = %query, results = results.len(), "places search completed");
        Ok(results)
    }
}

#[derive(Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<TextSearchResult>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct TextSearchResult {
    name: Option<String>,
    place_id: Option<String>,
    formatted_address: Option<String>,
}

fn parse_text_search(payload: &str) -> Result<Vec<PlaceResult>, UpstreamError> {
    let parsed: TextSearchResponse =
        serde_json::from_str(payload).map_err(|err| UpstreamError::MalformedPayload {
            service: SERVICE,
            message: err.to_string(),
        })?;

    match parsed.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        _ => {
            return Err(UpstreamError::Api {
                service: SERVICE,
                status: parsed.status,
                message: parsed.error_message.unwrap_or_default(),
            })
        }
    }

    Ok(parsed
        .results
        .into_iter()
        .filter_map(|result| {
            let name = result.name?.trim().to_string();
            let place_id = result.place_id?;
            (!name.is_empty()).then(|| PlaceResult {
                name,
                place_id,
                formatted_address: result.formatted_address,
                maps_url: String::new(),
            })
        })
        .collect())
}
