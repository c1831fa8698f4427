use crate::extract::{MAX_EXPLORE_PLACES, MAX_SUGGESTIONS};
use crate::request::{ExploreRequest, RecommendRequest};

pub fn recommend_prompt(request: &RecommendRequest) -> String {
    let keywords = if request.keywords.is_empty() {
        "none"
    } else {
        request.keywords.as_str()
    };

    format!(
        "You are an expert travel concierge. All prices are in GBP.\n\
         The user has £{budget} total for {travelers} traveller(s).\n\
         Must-haves / keywords: {keywords}.\n\n\
         Reply ONLY with a valid JSON array, no markdown, no commentary:\n\
         [{{\"name\":\"City, Country\",\"lat\":..,\"lng\":..,\"description\":\"..\",\"estimated_cost\":..}},...]\n\
         Return {count} destinations inside budget.",
        budget = request.budget,
        travelers = request.travelers,
        count = MAX_SUGGESTIONS,
    )
}

pub fn explore_prompt(request: &ExploreRequest) -> String {
    let budget = request
        .budget
        .map(|budget| format!("£{budget}"))
        .unwrap_or_else(|| "any budget".to_string());
    let keywords = if request.keywords.is_empty() {
        "general interests"
    } else {
        request.keywords.as_str()
    };

    format!(
        "You are a local insider in {city}.\n\
         There are {travelers} traveller(s) with a total budget of {budget}.\n\
         They are particularly interested in: {keywords}.\n\n\
         Suggest exactly {count} places worth checking out (cafés, restaurants, or sights).\n\n\
         Return ONLY valid JSON with this exact shape, no markdown or commentary:\n\
         [\n  {{ \"name\": \"<place name>\",\n     \"category\": \"cafe | restaurant | sight\",\n     \"short_desc\": \"<one-sentence pitch>\" }},\n  ...\n]",
        city = request.city,
        travelers = request.travelers,
        count = MAX_EXPLORE_PLACES,
    )
}

pub fn chat_prompt(message: &str) -> String {
    format!(
        "You are WanderWise, a friendly and knowledgeable travel and party-planning assistant.\n\n\
         Your role is to:\n\
         - Offer insightful and relevant travel or outing advice.\n\
         - Answer questions clearly and helpfully.\n\
         - Be conversational, warm, and professional.\n\
         - Respond only in English.\n\n\
         If the user is planning a party, celebration or group outing, finish your reply with two extra lines:\n\
         Theme: <a short theme for the event>\n\
         VenueQuery: <a search query for a suitable venue, including the city>\n\n\
         User message:\n\"{message}\"\n\n\
         Now craft a helpful and polite reply:"
    )
}

/// Free-text query for the places-only explore variant.
pub fn places_query(city: &str, keywords: &str) -> String {
    if keywords.trim().is_empty() {
        format!("things to do in {}", city.trim())
    } else {
        format!("{} in {}", keywords.trim(), city.trim())
    }
}
