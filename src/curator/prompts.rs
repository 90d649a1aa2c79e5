//! Prompt text for each curator task.

use super::types::CuratorRequest;

const EXPERT_PERSONA: &str = "You are an expert in European sculpture and land art. \
Give a factual, thorough and inspiring answer. Use web search for current facts.";

/// Rendered prompt for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: Option<&'static str>,
    pub user: String,
}

pub fn render(request: &CuratorRequest) -> Prompt {
    match request {
        CuratorRequest::Geocode { query } => Prompt {
            system: None,
            user: format!(
                "Translate the following search term into geographic coordinates.\n\
                 SEARCH TERM: \"{query}\"\n\
                 OUTPUT: return only a JSON object: {{\"lat\": 0.0, \"lng\": 0.0, \"name\": \"Town/Place\"}}"
            ),
        },
        CuratorRequest::SearchParks {
            lat,
            lng,
            location_name,
            radius_km,
        } => Prompt {
            system: None,
            user: format!(
                "Find real, existing sculpture parks or open-air museums within {radius_km:.0} km of \
                 {location_name} ({lat}, {lng}). Only include places that actually exist.\n\
                 OUTPUT JSON: {{\"curatorIntro\": \"One sentence\", \"parks\": [{{\"name\": \"Name\", \
                 \"location\": \"Place\", \"desc\": \"Short description\", \"lat\": 0.0, \"lng\": 0.0, \
                 \"isSolitary\": false, \"isInteractive\": false, \"url\": \"website\"}}]}}"
            ),
        },
        CuratorRequest::ExpertAdvice { question } => Prompt {
            system: Some(EXPERT_PERSONA),
            user: question.clone(),
        },
        CuratorRequest::DeepDive {
            artwork_name,
            location,
        } => Prompt {
            system: None,
            user: format!(
                "Describe in detail the art movement, the specific artists and the historical \
                 context of {artwork_name} in {location}."
            ),
        },
    }
}
