use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wander_agents::{LanguageModel, PlacesLookup, TravelPlanner};
use wander_api::{build_router, ApiState, ServerConfig};
use wander_core::{PlaceResult, UpstreamError};
use wander_observability::AppMetrics;

#[derive(Clone)]
struct ScriptedModel {
    reply: Result<String, u16>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedModel {
    fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl LanguageModel for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(UpstreamError::Status {
                service: "gemini",
                status: *status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

#[derive(Clone)]
struct ScriptedPlaces {
    results: Option<Vec<PlaceResult>>,
    queries: Arc<std::sync::Mutex<Vec<String>>>,
}

impl ScriptedPlaces {
    fn returning(names: &[&str]) -> Self {
        Self {
            results: Some(
                names
                    .iter()
                    .enumerate()
                    .map(|(index, name)| PlaceResult {
                        name: name.to_string(),
                        place_id: format!("place-{index}"),
                        formatted_address: Some(format!("{index} Main Street")),
                        maps_url: String::new(),
                    })
                    .collect(),
            ),
            queries: Arc::default(),
        }
    }

    fn unavailable() -> Self {
        Self {
            results: None,
            queries: Arc::default(),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl PlacesLookup for ScriptedPlaces {
    async fn search(&self, query: &str) -> Result<Vec<PlaceResult>, UpstreamError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results.clone().ok_or_else(|| UpstreamError::Api {
            service: "places",
            status: "REQUEST_DENIED".to_string(),
            message: "scripted failure".to_string(),
        })
    }
}

fn public_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../public")
}

fn app(model: ScriptedModel, places: ScriptedPlaces) -> Router {
    let planner = TravelPlanner::new(model, places, AppMetrics::shared());
    let server = ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        public_dir: public_dir(),
        allowed_origins: Vec::new(),
    };
    build_router(ApiState::new(planner), &server)
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let parsed = serde_json::from_slice(&body).expect("response body should be JSON");
    (status, parsed)
}

#[tokio::test]
async fn health_reports_metrics() {
    let app = app(ScriptedModel::replying("[]"), ScriptedPlaces::returning(&[]));

    let (status, body) = send_json(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["metrics"]["requests_total"], 0);
}

#[tokio::test]
async fn recommend_returns_enriched_suggestion() {
    let reply = json!([{
        "name": "Lisbon, Portugal",
        "lat": 38.7,
        "lng": -9.1,
        "description": "Sunny",
        "estimated_cost": 450
    }]);
    let model = ScriptedModel::replying(format!("Here you go:\n{reply}"));
    let app = app(model.clone(), ScriptedPlaces::returning(&[]));

    let (status, body) = send_json(
        app,
        post_json(
            "/recommend",
            json!({"budget": 500, "travelers": 2, "keywords": "beach"}).to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["name"], "Lisbon, Portugal");
    assert_eq!(suggestions[0]["description"], "Sunny");
    assert_eq!(suggestions[0]["estimated_cost"], 450.0);
    assert!(suggestions[0]["maps_url"]
        .as_str()
        .unwrap()
        .contains("38.7,-9.1"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn recommend_reply_without_brackets_is_bad_gateway() {
    let app = app(
        ScriptedModel::replying("Sorry, I can't help with that."),
        ScriptedPlaces::returning(&[]),
    );

    let (status, body) = send_json(
        app,
        post_json("/recommend", json!({"budget": 500}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "AI response error"}));
}

#[tokio::test]
async fn recommend_rejects_partially_valid_reply() {
    let app = app(
        ScriptedModel::replying(r#"[{"name":"Rome","lat":41.9,"lng":12.5},{"lat":1,"lng":2}]"#),
        ScriptedPlaces::returning(&[]),
    );

    let (status, body) = send_json(
        app,
        post_json("/recommend", json!({"budget": 900}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "AI response error"}));
}

#[tokio::test]
async fn recommend_rejects_record_with_unusable_model_fields() {
    let app = app(
        ScriptedModel::replying(
            r#"[{"name":"Oslo","lat":59.9,"description":"Fjords","estimated_cost":"450"}]"#,
        ),
        ScriptedPlaces::returning(&[]),
    );

    let (status, body) = send_json(
        app,
        post_json("/recommend", json!({"budget": 800}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "AI response error"}));
}

#[tokio::test]
async fn oversized_bodies_get_json_errors() {
    let model = ScriptedModel::replying("[]");
    let padding = "x".repeat(100 * 1024);

    let (status, body) = send_json(
        app(model.clone(), ScriptedPlaces::returning(&[])),
        post_json(
            "/recommend",
            json!({"budget": 500, "keywords": &padding}).to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"error": "Request body too large"}));

    let (status, body) = send_json(
        app(model.clone(), ScriptedPlaces::returning(&[])),
        post_json("/chat", json!({"message": &padding}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"reply": "Message is too long."}));

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn recommend_caps_at_three_and_links_names_without_coordinates() {
    let app = app(
        ScriptedModel::replying(
            r#"[{"name":"Porto"},{"name":"Seville"},{"name":"Nice"},{"name":"Split"}]"#,
        ),
        ScriptedPlaces::returning(&[]),
    );

    let (status, body) = send_json(
        app,
        post_json("/recommend", json!({"budget": "1200", "travelers": "3"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 3);
    assert_eq!(
        suggestions[1]["maps_url"],
        "https://www.google.com/maps/search/?api=1&query=Seville"
    );
}

#[tokio::test]
async fn recommend_invalid_input_makes_no_model_call() {
    let model = ScriptedModel::replying("[]");

    for body in [
        json!({"budget": "lots"}).to_string(),
        json!({"travelers": 2}).to_string(),
        json!({"budget": 100, "travelers": 0}).to_string(),
        "not json".to_string(),
    ] {
        let app = app(model.clone(), ScriptedPlaces::returning(&[]));
        let (status, parsed) = send_json(app, post_json("/recommend", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parsed, json!({"error": "Invalid budget or travelers number"}));
    }

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn recommend_model_failure_is_bad_gateway() {
    let app = app(ScriptedModel::failing(503), ScriptedPlaces::returning(&[]));

    let (status, body) = send_json(
        app,
        post_json("/recommend", json!({"budget": 500}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "AI response error");
}

#[tokio::test]
async fn explore_never_returns_more_than_six_places() {
    let places = (0..9)
        .map(|index| {
            let category = ["cafe", "restaurant", "sight"][index % 3];
            json!({
                "name": format!("Spot {index}"),
                "category": category,
                "short_desc": "Lovely"
            })
        })
        .collect::<Vec<_>>();
    let reply = format!("```json\n{}\n```", Value::Array(places));
    let app = app(ScriptedModel::replying(reply), ScriptedPlaces::returning(&[]));

    let (status, body) =
        send_json(app, get("/explore?city=Lisbon&keywords=food&budget=300")).await;

    assert_eq!(status, StatusCode::OK);
    let places = body["places"].as_array().unwrap();
    assert_eq!(places.len(), 6);
    assert_eq!(places[0]["category"], "cafe");
    assert!(places[0]["maps_url"]
        .as_str()
        .unwrap()
        .ends_with("query=Spot+0+Lisbon"));
}

#[tokio::test]
async fn explore_skips_unusable_records() {
    let reply = json!([
        {"name": "Time Out Market", "category": "Restaurant", "short_desc": "Food hall"},
        "Belem Tower",
        {"name": "Fado show", "category": "nightlife"}
    ]);
    let app = app(
        ScriptedModel::replying(reply.to_string()),
        ScriptedPlaces::returning(&[]),
    );

    let (status, body) = send_json(app, get("/explore?city=Lisbon")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["places"],
        json!([{
            "name": "Time Out Market",
            "category": "restaurant",
            "short_desc": "Food hall",
            "maps_url": "https://www.google.com/maps/search/?api=1&query=Time+Out+Market+Lisbon"
        }])
    );
}

#[tokio::test]
async fn explore_validates_query_before_calling_model() {
    let model = ScriptedModel::replying("[]");

    let (status, body) = send_json(
        app(model.clone(), ScriptedPlaces::returning(&[])),
        get("/explore?keywords=food"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No city provided"}));

    let (status, body) = send_json(
        app(model.clone(), ScriptedPlaces::returning(&[])),
        get("/explore?city=Rome&travelers=many"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid budget or travelers number"}));

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn undecodable_explore_query_gets_json_error() {
    let model = ScriptedModel::replying("[]");

    for uri in ["/explore?city=Rome&city=Paris", "/explore/places?city=Rome&city=Paris"] {
        let app = app(model.clone(), ScriptedPlaces::returning(&[]));
        let (status, body) = send_json(app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({"error": "Invalid query string"}), "{uri}");
    }

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn explore_without_array_is_bad_gateway() {
    let app = app(
        ScriptedModel::replying("Lisbon is lovely in spring."),
        ScriptedPlaces::returning(&[]),
    );

    let (status, body) = send_json(app, get("/explore?city=Lisbon")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "AI response error"}));
}

#[tokio::test]
async fn explore_places_variant_uses_places_api() {
    let names = ["A", "B", "C", "D", "E", "F", "G"];
    let places = ScriptedPlaces::returning(&names);
    let model = ScriptedModel::replying("[]");
    let app = app(model.clone(), places.clone());

    let (status, body) =
        send_json(app, get("/explore/places?city=Berlin&keywords=techno")).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["places"].as_array().unwrap();
    assert_eq!(results.len(), 6);
    assert_eq!(results[0]["place_id"], "place-0");
    assert_eq!(
        results[0]["maps_url"],
        "https://www.google.com/maps/search/?api=1&query=A&query_place_id=place-0"
    );
    assert_eq!(places.queries(), vec!["techno in Berlin".to_string()]);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn explore_places_variant_propagates_lookup_failure() {
    let app = app(ScriptedModel::replying("[]"), ScriptedPlaces::unavailable());

    let (status, body) = send_json(app, get("/explore/places?city=Berlin")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Places lookup error"}));
}

#[tokio::test]
async fn select_is_a_no_op_for_any_body() {
    let oversized = "x".repeat(100 * 1024);
    for body in ["{\"name\":\"Lisbon\"}", "{not json", "", oversized.as_str()] {
        let app = app(ScriptedModel::replying("[]"), ScriptedPlaces::returning(&[]));
        let (status, bytes) = send(app, post_json("/select", body.to_string())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn chat_attaches_venue_and_hides_labels() {
    let places = ScriptedPlaces::returning(&["Sala Equis", "Backup"]);
    let app = app(
        ScriptedModel::replying(
            "How about a retro cinema night?\nTheme: Retro Cinema\nVenueQuery: cinema bar Madrid",
        ),
        places.clone(),
    );

    let (status, body) = send_json(
        app,
        post_json(
            "/chat",
            json!({"message": "Birthday party in Madrid for 12"}).to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "How about a retro cinema night?");
    assert_eq!(body["venue"]["name"], "Sala Equis");
    assert_eq!(body["venue"]["formatted_address"], "0 Main Street");
    assert!(body.get("theme").is_none());
    assert!(body.get("venue_query").is_none());
    assert_eq!(places.queries(), vec!["cinema bar Madrid".to_string()]);
}

#[tokio::test]
async fn chat_degrades_when_venue_lookup_fails() {
    let app = app(
        ScriptedModel::replying("Try a picnic!\nTheme: Picnic\nVenueQuery: park Lisbon"),
        ScriptedPlaces::unavailable(),
    );

    let (status, body) = send_json(
        app,
        post_json("/chat", json!({"message": "Ideas for a picnic?"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "Try a picnic!"}));
}

#[tokio::test]
async fn chat_without_both_labels_skips_lookup() {
    let places = ScriptedPlaces::returning(&["Unused"]);
    let app = app(
        ScriptedModel::replying("Pack a raincoat for Bergen.\nTheme: Rainy days"),
        places.clone(),
    );

    let (status, body) = send_json(
        app,
        post_json("/chat", json!({"message": "Bergen tips"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "Pack a raincoat for Bergen."}));
    assert!(places.queries().is_empty());
}

#[tokio::test]
async fn chat_rejects_empty_message() {
    let model = ScriptedModel::replying("unused");
    let app = app(model.clone(), ScriptedPlaces::returning(&[]));

    let (status, body) =
        send_json(app, post_json("/chat", json!({"message": "   "}).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"reply": "Please enter a message."}));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chat_model_failure_is_internal_error() {
    let app = app(ScriptedModel::failing(500), ScriptedPlaces::returning(&[]));

    let (status, body) = send_json(
        app,
        post_json("/chat", json!({"message": "hello"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"reply": "Error connecting to Gemini."}));
}

#[tokio::test]
async fn unknown_paths_fall_back_to_index() {
    let index = std::fs::read(public_dir().join("index.html")).unwrap();

    for uri in ["/", "/trips/lisbon"] {
        let app = app(ScriptedModel::replying("[]"), ScriptedPlaces::returning(&[]));
        let (status, body) = send(app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, index, "{uri}");
    }

    let app = app(ScriptedModel::replying("[]"), ScriptedPlaces::returning(&[]));
    let (status, body) = send(app, get("/main.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("/chat"));
}
