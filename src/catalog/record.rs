//! The canonical discoverable entity and its classification flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

use crate::geo::Coordinate;

/// Where a location record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Pre-vetted reference catalog entry
    Catalog,
    /// Proposed by the curator for a single search
    AiDiscovered,
}

impl Source {
    /// Short label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Catalog => "catalog",
            Source::AiDiscovered => "curator",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Advisory classification flags. Never used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    /// A single monumental work rather than a park
    SolitaryMonument,
    /// Visitors can touch, climb or play with the works
    Interactive,
    /// Landscape-scale earthworks
    LandArt,
}

impl Tag {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tag::SolitaryMonument => "solitary monument",
            Tag::Interactive => "interactive",
            Tag::LandArt => "land-art",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A sculpture park, open-air museum or monumental work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Unique within one result set; curator ids change every search
    pub id: String,
    /// Display name
    pub name: String,
    /// Human-readable area (town, island, district)
    pub place: String,
    /// Country or wider region, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// One-paragraph description
    pub description: String,
    /// Position; never changed after construction
    coordinate: Coordinate,
    /// Origin of the record
    pub source: Source,
    /// Classification flags
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<Tag>,
    /// Official website; `None` when there is no usable link
    #[serde(default)]
    pub website: Option<Url>,
}

impl LocationRecord {
    /// Create a record with no tags, region or website.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        place: impl Into<String>,
        description: impl Into<String>,
        coordinate: Coordinate,
        source: Source,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            place: place.into(),
            region: None,
            description: description.into(),
            coordinate,
            source,
            tags: BTreeSet::new(),
            website: None,
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_website(mut self, website: Option<Url>) -> Self {
        self.website = website;
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn is_catalog(&self) -> bool {
        self.source == Source::Catalog
    }

    /// Case-folded name used for textual duplicate detection.
    pub fn folded_name(&self) -> String {
        self.name.trim().to_lowercase()
    }
}
