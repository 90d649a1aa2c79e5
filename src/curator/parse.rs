//! Parse-and-validate boundary for curator replies.
//!
//! Nothing untyped leaves this module: replies are reduced to the outermost
//! JSON value they contain, numeric fields are coerced and range-checked,
//! and every candidate either becomes a [`LocationRecord`] or is dropped
//! with a [`ValidationDropped`] reason.

use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use super::error::CuratorError;
use super::types::{Citation, DiscoveryBatch, ResolvedLocation};
use crate::catalog::{LocationRecord, Source, Tag};
use crate::geo::Coordinate;

/// Why a single candidate was excluded. Logged, never surfaced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationDropped {
    #[error("entry is not an object")]
    NotAnObject,

    #[error("missing or empty name")]
    MissingName,

    #[error("'{field}' is missing or not a finite number")]
    NotANumber { field: &'static str },

    #[error("coordinate out of range: {0}")]
    OutOfRange(String),
}

/// Cut the outermost JSON object or array out of free text and parse it.
///
/// Models like to wrap JSON in prose or code fences; everything before the
/// first `{`/`[` and after the last matching `}`/`]` is ignored.
pub fn extract_json(text: &str) -> Result<Value, CuratorError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CuratorError::Malformed("empty reply".to_string()));
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() || value.is_array() {
            return Ok(value);
        }
    }

    let start = trimmed
        .find(['{', '['])
        .ok_or_else(|| CuratorError::Malformed("no JSON value in reply".to_string()))?;
    let close = if trimmed[start..].starts_with('{') { '}' } else { ']' };
    let end = trimmed
        .rfind(close)
        .filter(|end| *end > start)
        .ok_or_else(|| CuratorError::Malformed("unterminated JSON value in reply".to_string()))?;

    Ok(serde_json::from_str(&trimmed[start..=end])?)
}

/// Read a number that may arrive as a JSON number or a numeric string.
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn read_coordinate(obj: &Map<String, Value>) -> Result<Coordinate, ValidationDropped> {
    let lat = coerce_f64(obj.get("lat").or_else(|| obj.get("latitude")))
        .ok_or(ValidationDropped::NotANumber { field: "lat" })?;
    let lng = coerce_f64(
        obj.get("lng")
            .or_else(|| obj.get("lon"))
            .or_else(|| obj.get("longitude")),
    )
    .ok_or(ValidationDropped::NotANumber { field: "lng" })?;
    Coordinate::new(lat, lng).map_err(|e| ValidationDropped::OutOfRange(e.to_string()))
}

/// Only absolute http(s) links count; placeholders like `#` become `None`.
fn parse_website(value: Option<&Value>) -> Option<Url> {
    let raw = value?.as_str()?.trim();
    let url = Url::parse(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Fresh id for a curator record. Not stable across searches.
pub fn discovered_id() -> String {
    format!("ai-{}", Uuid::new_v4().simple())
}

/// Validate one search-parks entry.
pub fn parse_candidate(value: &Value) -> Result<LocationRecord, ValidationDropped> {
    let obj = value.as_object().ok_or(ValidationDropped::NotAnObject)?;
    let name = non_empty_str(obj, &["name"]).ok_or(ValidationDropped::MissingName)?;
    let coordinate = read_coordinate(obj)?;

    let place = non_empty_str(obj, &["location", "place"]).unwrap_or_default();
    let description = non_empty_str(obj, &["desc", "description"]).unwrap_or_default();

    let mut tags = Vec::new();
    if coerce_bool(obj.get("isSolitary")) {
        tags.push(Tag::SolitaryMonument);
    }
    if coerce_bool(obj.get("isInteractive")) {
        tags.push(Tag::Interactive);
    }
    if coerce_bool(obj.get("isLandArt")) {
        tags.push(Tag::LandArt);
    }

    Ok(LocationRecord::new(
        discovered_id(),
        name,
        place,
        description,
        coordinate,
        Source::AiDiscovered,
    )
    .with_tags(tags)
    .with_website(parse_website(obj.get("url").or_else(|| obj.get("website")))))
}

/// Validate a search-parks reply.
///
/// Accepts `{curatorIntro?, parks: [...]}` or a bare array of parks.
/// Invalid entries are dropped and counted.
pub fn parse_discovery(value: &Value) -> DiscoveryBatch {
    let (note, entries) = match value {
        Value::Array(entries) => (None, entries.as_slice()),
        Value::Object(obj) => (
            non_empty_str(obj, &["curatorIntro", "intro"]).map(str::to_string),
            obj.get("parks")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        ),
        _ => (None, &[][..]),
    };

    let mut batch = DiscoveryBatch {
        curator_note: note,
        ..Default::default()
    };

    for (index, entry) in entries.iter().enumerate() {
        match parse_candidate(entry) {
            Ok(record) => batch.candidates.push(record),
            Err(reason) => {
                tracing::debug!("Dropping curator candidate #{}: {}", index, reason);
                batch.dropped += 1;
            }
        }
    }

    batch
}

/// Validate a geocode reply for `query`.
///
/// `(0, 0)` is what the model returns when it could not place the query,
/// so it is treated as no match.
pub fn parse_geocode(value: &Value, query: &str) -> Result<ResolvedLocation, CuratorError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CuratorError::NoMatch(query.to_string()))?;
    let coordinate = read_coordinate(obj).map_err(|e| {
        tracing::debug!("Unusable geocode for '{}': {}", query, e);
        CuratorError::NoMatch(query.to_string())
    })?;

    if coordinate.lat == 0.0 && coordinate.lng == 0.0 {
        return Err(CuratorError::NoMatch(query.to_string()));
    }

    let display_name = non_empty_str(obj, &["name", "displayName"])
        .unwrap_or(query.trim())
        .to_string();

    Ok(ResolvedLocation {
        coordinate,
        display_name,
    })
}

/// Read citations from either `[{title, uri}]` or grounding chunks
/// (`[{web: {title, uri}}]`), deduplicated by URI in first-seen order.
pub fn parse_citations(value: Option<&Value>) -> Vec<Citation> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let candidates = entries.iter().filter_map(|entry| {
        let source = entry.get("web").unwrap_or(entry);
        let uri = source.get("uri").and_then(Value::as_str)?.trim();
        let title = source
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(uri);
        Some(Citation {
            title: title.to_string(),
            uri: uri.to_string(),
        })
    });

    dedupe_citations(candidates)
}

/// Drop empty and repeated URIs, keeping the first occurrence.
pub fn dedupe_citations(citations: impl IntoIterator<Item = Citation>) -> Vec<Citation> {
    let mut seen = HashSet::new();
    citations
        .into_iter()
        .filter(|c| !c.uri.is_empty() && seen.insert(c.uri.clone()))
        .collect()
}
