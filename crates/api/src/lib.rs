mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Json, Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use wander_agents::{build_planner, ClientConfig, LanguageModel, PlacesLookup, TravelPlanner};
use wander_core::{
    ChatRequest, ErrorBody, ExploreQuery, ExploreRequest, InputError, PlacesResponse,
    PlannerError, RecommendRequest, SuggestionsResponse,
};
use wander_observability::AppMetrics;

pub use config::ServerConfig;

const MAX_BODY_BYTES: usize = 64 * 1024;
const AI_RESPONSE_ERROR: &str = "AI response error";
const PLACES_LOOKUP_ERROR: &str = "Places lookup error";
const CHAT_UPSTREAM_ERROR: &str = "Error connecting to Gemini.";
const INVALID_NUMBERS: &str = "Invalid budget or travelers number";
const BODY_TOO_LARGE: &str = "Request body too large";
const EMPTY_CHAT: &str = "Please enter a message.";
const CHAT_TOO_LONG: &str = "Message is too long.";

pub struct ApiState<L, P> {
    pub planner: Arc<TravelPlanner<L, P>>,
    pub metrics: Arc<AppMetrics>,
}

impl<L, P> ApiState<L, P>
where
    L: LanguageModel,
    P: PlacesLookup,
{
    pub fn new(planner: TravelPlanner<L, P>) -> Self {
        let metrics = planner.metrics().clone();
        Self {
            planner: Arc::new(planner),
            metrics,
        }
    }
}

impl<L, P> Clone for ApiState<L, P> {
    fn clone(&self) -> Self {
        Self {
            planner: Arc::clone(&self.planner),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: wander_observability::MetricsSnapshot,
}

#[derive(Debug, Serialize)]
struct ChatErrorBody {
    reply: &'static str,
}

pub fn build_app(server: &ServerConfig, clients: &ClientConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let planner =
        build_planner(clients, metrics).context("failed to initialize outbound clients")?;
    Ok(build_router(ApiState::new(planner), server))
}

pub fn build_router<L, P>(state: ApiState<L, P>, server: &ServerConfig) -> Router
where
    L: LanguageModel + 'static,
    P: PlacesLookup + 'static,
{
    let static_files = ServeDir::new(&server.public_dir)
        .fallback(ServeFile::new(server.public_dir.join("index.html")));

    Router::new()
        .route("/health", get(health::<L, P>))
        .route("/recommend", post(recommend::<L, P>))
        .route("/explore", get(explore::<L, P>))
        .route("/explore/places", get(explore_places::<L, P>))
        .route("/select", post(select))
        .route("/chat", post(chat::<L, P>))
        .fallback_service(static_files)
        .layer(build_cors_layer(&server.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health<L, P>(State(state): State<ApiState<L, P>>) -> impl IntoResponse
where
    L: LanguageModel,
    P: PlacesLookup,
{
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn recommend<L, P>(
    State(state): State<ApiState<L, P>>,
    body: Result<Bytes, BytesRejection>,
) -> Response
where
    L: LanguageModel,
    P: PlacesLookup,
{
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejecting recommend body");
            let message = body_rejection_message(&rejection, BODY_TOO_LARGE, INVALID_NUMBERS);
            return (rejection.status(), Json(ErrorBody::new(message))).into_response();
        }
    };

    let request = match RecommendRequest::from_body(&body) {
        Ok(request) => request,
        Err(err) => return input_error(err),
    };

    match state.planner.recommend(&request).await {
        Ok(suggestions) => {
            (StatusCode::OK, Json(SuggestionsResponse { suggestions })).into_response()
        }
        Err(err) => planner_error(err, AI_RESPONSE_ERROR),
    }
}

async fn explore<L, P>(
    State(state): State<ApiState<L, P>>,
    query: Result<Query<ExploreQuery>, QueryRejection>,
) -> Response
where
    L: LanguageModel,
    P: PlacesLookup,
{
    let request = match explore_request(query) {
        Ok(request) => request,
        Err(err) => return input_error(err),
    };

    match state.planner.explore(&request).await {
        Ok(places) => (StatusCode::OK, Json(PlacesResponse { places })).into_response(),
        Err(err) => planner_error(err, AI_RESPONSE_ERROR),
    }
}

async fn explore_places<L, P>(
    State(state): State<ApiState<L, P>>,
    query: Result<Query<ExploreQuery>, QueryRejection>,
) -> Response
where
    L: LanguageModel,
    P: PlacesLookup,
{
    let request = match explore_request(query) {
        Ok(request) => request,
        Err(err) => return input_error(err),
    };

    match state.planner.explore_places(&request).await {
        Ok(places) => (StatusCode::OK, Json(PlacesResponse { places })).into_response(),
        Err(err) => planner_error(err, PLACES_LOOKUP_ERROR),
    }
}

/// Selections are not persisted.
async fn select() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn chat<L, P>(
    State(state): State<ApiState<L, P>>,
    body: Result<Bytes, BytesRejection>,
) -> Response
where
    L: LanguageModel,
    P: PlacesLookup,
{
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejecting chat body");
            let reply = body_rejection_message(&rejection, CHAT_TOO_LONG, EMPTY_CHAT);
            return (rejection.status(), Json(ChatErrorBody { reply })).into_response();
        }
    };

    let message = match ChatRequest::from_body(&body) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "rejecting chat request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ChatErrorBody { reply: EMPTY_CHAT }),
            )
                .into_response();
        }
    };

    match state.planner.chat(&message).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => {
            error!(error = %err, "chat failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatErrorBody {
                    reply: CHAT_UPSTREAM_ERROR,
                }),
            )
                .into_response()
        }
    }
}

fn explore_request(
    query: Result<Query<ExploreQuery>, QueryRejection>,
) -> Result<ExploreRequest, InputError> {
    let Query(query) = query.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejecting explore query");
        InputError::MalformedQuery
    })?;
    ExploreRequest::try_from(query)
}

/// Oversized bodies keep their 413; anything else reads as bad input.
fn body_rejection_message(
    rejection: &BytesRejection,
    too_large: &'static str,
    otherwise: &'static str,
) -> &'static str {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large
    } else {
        otherwise
    }
}

fn input_error(err: InputError) -> Response {
    warn!(error = %err, "rejecting request input");
    let message = match err {
        InputError::MissingCity => "No city provided",
        InputError::EmptyMessage => EMPTY_CHAT,
        InputError::MalformedQuery => "Invalid query string",
        InputError::InvalidNumber { .. } | InputError::MalformedBody => INVALID_NUMBERS,
    };
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
}

/// The planner has already logged upstream and extraction failures in detail.
fn planner_error(err: PlannerError, upstream_message: &'static str) -> Response {
    match err {
        PlannerError::Input(err) => input_error(err),
        PlannerError::Upstream(_) | PlannerError::Extraction(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody::new(upstream_message)),
        )
            .into_response(),
    }
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
