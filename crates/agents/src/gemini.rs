use std::future::Future;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wander_core::UpstreamError;

use crate::config::ModelConfig;

const SERVICE: &str = "gemini";
const MAX_ERROR_BODY: usize = 512;

/// Text in, text out. One call per request; no retries.
pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str)
        -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build Gemini HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
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

        debug!(model = %self.model, bytes = payload.len(), "gemini reply received");
        parse_generate_response(&payload)
    }
}

pub(crate) fn transport_error(service: &'static str, err: reqwest::Error) -> UpstreamError {
    // The request URL carries the API key.
    UpstreamError::Transport {
        service,
        message: err.without_url().to_string(),
    }
}

pub(crate) fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn parse_generate_response(payload: &str) -> Result<String, UpstreamError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(payload).map_err(|err| UpstreamError::MalformedPayload {
            service: SERVICE,
            message: err.to_string(),
        })?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| UpstreamError::MalformedPayload {
            service: SERVICE,
            message: "candidates[0].content.parts[0].text missing".to_string(),
        })
}
