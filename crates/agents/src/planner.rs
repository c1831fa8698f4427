use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, warn};
use wander_core::enrich::enrich_place_result;
use wander_core::prompts::{chat_prompt, explore_prompt, places_query, recommend_prompt};
use wander_core::records::{places_lenient, suggestions_strict};
use wander_core::{
    split_chat_labels, BracketScan, ChatReply, ExploreRequest, ExtractionError, Place, PlaceResult,
    PlannerError, RecommendRequest, ReplyExtractor, Suggestion, UpstreamError, MAX_EXPLORE_PLACES,
};
use wander_observability::AppMetrics;

use crate::gemini::LanguageModel;
use crate::places::PlacesLookup;

/// Runs each use case as `call-model -> extract -> enrich`.
///
/// Inputs arrive already validated; every failure leaves as a
/// [`PlannerError`] after being logged with its prompt or raw reply.
pub struct TravelPlanner<L, P, E = BracketScan> {
    model: L,
    places: P,
    extractor: E,
    metrics: Arc<AppMetrics>,
}

impl<L, P> TravelPlanner<L, P, BracketScan>
where
    L: LanguageModel,
    P: PlacesLookup,
{
    pub fn new(model: L, places: P, metrics: Arc<AppMetrics>) -> Self {
        Self {
            model,
            places,
            extractor: BracketScan,
            metrics,
        }
    }
}

impl<L, P, E> TravelPlanner<L, P, E>
where
    L: LanguageModel,
    P: PlacesLookup,
    E: ReplyExtractor,
{
    pub fn with_extractor<X: ReplyExtractor>(self, extractor: X) -> TravelPlanner<L, P, X> {
        TravelPlanner {
            model: self.model,
            places: self.places,
            extractor,
            metrics: self.metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    #[instrument(
        skip(self, request),
        fields(budget = request.budget, travelers = request.travelers)
    )]
    pub async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<Vec<Suggestion>, PlannerError> {
        self.timed(async {
            let prompt = recommend_prompt(request);
            let raw = self.call_model(&prompt).await?;
            let items = self.extract(&raw)?;
            let suggestions =
                suggestions_strict(&raw, items).map_err(|err| self.extraction_failed(err))?;
            info!(count = suggestions.len(), "destinations recommended");
            Ok::<_, PlannerError>(suggestions)
        })
        .await
    }

    #[instrument(skip(self, request), fields(city = %request.city))]
    pub async fn explore(&self, request: &ExploreRequest) -> Result<Vec<Place>, PlannerError> {
        self.timed(async {
            let prompt = explore_prompt(request);
            let raw = self.call_model(&prompt).await?;
            let items = self.extract(&raw)?;
            let outcome = places_lenient(items, &request.city);
            for &(index, reason) in &outcome.skipped {
                warn!(index, %reason, "skipping explore record");
            }
            info!(count = outcome.places.len(), "city places suggested");
            Ok::<_, PlannerError>(outcome.places)
        })
        .await
    }

    /// Places-only exploration: lookup failures are not softened here.
    #[instrument(skip(self, request), fields(city = %request.city))]
    pub async fn explore_places(
        &self,
        request: &ExploreRequest,
    ) -> Result<Vec<PlaceResult>, PlannerError> {
        self.timed(async {
            let query = places_query(&request.city, &request.keywords);
            let mut results = self.places.search(&query).await.map_err(|err| {
                self.metrics.inc_upstream_failure();
                error!(error = %err, query = %query, "places lookup failed");
                PlannerError::from(err)
            })?;
            results.truncate(MAX_EXPLORE_PLACES);
            results.iter_mut().for_each(enrich_place_result);
            Ok::<_, PlannerError>(results)
        })
        .await
    }

    #[instrument(skip(self, message))]
    pub async fn chat(&self, message: &str) -> Result<ChatReply, PlannerError> {
        self.timed(async {
            let prompt = chat_prompt(message);
            let raw = self.call_model(&prompt).await?;
            let (reply, labels) = split_chat_labels(raw.trim());
            let venue = match labels.venue_lookup() {
                Some((theme, query)) => self.lookup_venue(theme, query).await,
                None => None,
            };
            Ok::<_, PlannerError>(ChatReply { reply, venue })
        })
        .await
    }

    async fn timed<T>(&self, work: impl Future<Output = T>) -> T {
        let started = Instant::now();
        self.metrics.inc_request();
        let outcome = work.await;
        self.metrics.observe_latency(started.elapsed());
        outcome
    }

    async fn call_model(&self, prompt: &str) -> Result<String, UpstreamError> {
        self.model.generate(prompt).await.map_err(|err| {
            self.metrics.inc_upstream_failure();
            error!(error = %err, prompt = %prompt, "language model call failed");
            err
        })
    }

    fn extract(&self, raw: &str) -> Result<Vec<serde_json::Value>, ExtractionError> {
        self.extractor
            .extract(raw)
            .map_err(|err| self.extraction_failed(err))
    }

    fn extraction_failed(&self, err: ExtractionError) -> ExtractionError {
        self.metrics.inc_extraction_failure();
        error!(error = %err, raw = %err.raw(), "model reply extraction failed");
        err
    }

    /// Degrades to no venue: the chat reply is still worth returning.
    async fn lookup_venue(&self, theme: &str, query: &str) -> Option<PlaceResult> {
        self.metrics.inc_venue_lookup();
        match self.places.search(query).await {
            Ok(results) => {
                let mut venue = results.into_iter().next()?;
                enrich_place_result(&mut venue);
                info!(theme, query, venue = %venue.name, "venue found for chat");
                Some(venue)
            }
            Err(err) => {
                warn!(error = %err, theme, query, "venue lookup failed, omitting venue");
                None
            }
        }
    }
}
