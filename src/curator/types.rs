//! Wire contract and result types shared by curator operations.

use serde::{Deserialize, Serialize};

use crate::catalog::LocationRecord;
use crate::geo::{Coordinate, CoordinateError};

/// Display name used when the origin comes from a device fix.
pub const CURRENT_LOCATION_NAME: &str = "your current location";

/// Kind of curator task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    Geocode,
    SearchParks,
    ExpertAdvice,
    DeepDive,
}

impl Task {
    /// Whether the reply is expected to be JSON.
    pub fn expects_json(&self) -> bool {
        matches!(self, Task::Geocode | Task::SearchParks)
    }

    /// Whether the backend should ground the answer in live web search.
    pub fn grounded(&self) -> bool {
        matches!(self, Task::SearchParks | Task::ExpertAdvice)
    }

    /// Sampling temperature for this task.
    pub fn temperature(&self) -> f32 {
        match self {
            Task::Geocode | Task::SearchParks => 0.0,
            Task::ExpertAdvice => 0.2,
            Task::DeepDive => 0.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Geocode => "geocode",
            Task::SearchParks => "search-parks",
            Task::ExpertAdvice => "expert-advice",
            Task::DeepDive => "deep-dive",
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One outbound curator request: `{ "task": ..., ...payload }` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "kebab-case")]
pub enum CuratorRequest {
    Geocode {
        query: String,
    },
    SearchParks {
        lat: f64,
        lng: f64,
        #[serde(rename = "locationName")]
        location_name: String,
        #[serde(rename = "radiusKm")]
        radius_km: f64,
    },
    ExpertAdvice {
        question: String,
    },
    DeepDive {
        #[serde(rename = "artworkName")]
        artwork_name: String,
        location: String,
    },
}

impl CuratorRequest {
    pub fn task(&self) -> Task {
        match self {
            CuratorRequest::Geocode { .. } => Task::Geocode,
            CuratorRequest::SearchParks { .. } => Task::SearchParks,
            CuratorRequest::ExpertAdvice { .. } => Task::ExpertAdvice,
            CuratorRequest::DeepDive { .. } => Task::DeepDive,
        }
    }
}

/// A web page the backend grounded its answer on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// Raw text reply from a backend, before any parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl BackendReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// What a search is centered on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationQuery {
    /// Free-text place name
    Text(String),
    /// Device fix, used without a geocode call
    Gps(Coordinate),
}

impl LocationQuery {
    pub fn text(query: impl Into<String>) -> Self {
        LocationQuery::Text(query.into())
    }

    /// Validated device fix.
    pub fn gps(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        Coordinate::new(lat, lng).map(LocationQuery::Gps)
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Text(text) => write!(f, "\"{}\"", text),
            LocationQuery::Gps(coordinate) => write!(f, "gps({})", coordinate),
        }
    }
}

/// Result of resolving a query to a search origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub display_name: String,
}

/// Validated candidates from one search-parks call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryBatch {
    /// Optional introduction written by the curator
    pub curator_note: Option<String>,
    /// Records that passed validation, in reply order
    pub candidates: Vec<LocationRecord>,
    /// Number of entries dropped during validation
    pub dropped: usize,
}

/// Answer to a free-form question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpertAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}
