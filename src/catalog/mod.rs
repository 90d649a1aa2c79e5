//! Reference catalog of pre-vetted locations.
//!
//! The catalog is loaded once at startup, either from the dataset compiled
//! into the binary or from a TOML file with the same shape. It is read-only
//! afterwards: searches copy records out of it and never write back.

pub mod record;

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::geo::Coordinate;

pub use record::{LocationRecord, Source, Tag};

/// Dataset shipped with the application.
const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.toml");

/// Errors while loading a catalog dataset.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Entry '{id}' has an invalid coordinate: {reason}")]
    InvalidCoordinate { id: String, reason: String },

    #[error("Entry '{0}' has an empty name")]
    EmptyName(String),

    #[error("Duplicate catalog id '{0}'")]
    DuplicateId(String),
}

/// On-disk shape of the dataset.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "location")]
    locations: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    place: String,
    region: Option<String>,
    description: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    tags: Vec<Tag>,
    website: Option<String>,
}

impl CatalogEntry {
    fn into_record(self) -> Result<LocationRecord, CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName(self.id));
        }
        let coordinate =
            Coordinate::new(self.lat, self.lng).map_err(|e| CatalogError::InvalidCoordinate {
                id: self.id.clone(),
                reason: e.to_string(),
            })?;
        let website = self.website.as_deref().and_then(|w| Url::parse(w).ok());

        let mut record = LocationRecord::new(
            self.id,
            self.name,
            self.place,
            self.description,
            coordinate,
            Source::Catalog,
        )
        .with_tags(self.tags)
        .with_website(website);
        if let Some(region) = self.region {
            record = record.with_region(region);
        }
        Ok(record)
    }
}

/// Immutable, cheaply cloneable list of catalog records.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Arc<[LocationRecord]>,
}

impl Catalog {
    /// Load the dataset compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUNDLED_CATALOG)
    }

    /// Load a dataset from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML dataset (`[[location]]` tables).
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let records = file
            .locations
            .into_iter()
            .map(CatalogEntry::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_records(records)
    }

    /// Build a catalog from already-constructed records.
    ///
    /// Every record is stamped as [`Source::Catalog`].
    pub fn from_records(records: Vec<LocationRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(CatalogError::DuplicateId(record.id.clone()));
            }
        }

        let records: Vec<LocationRecord> = records
            .into_iter()
            .map(|mut r| {
                r.source = Source::Catalog;
                r
            })
            .collect();

        tracing::debug!("Catalog loaded with {} locations", records.len());
        Ok(Self {
            records: records.into(),
        })
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LocationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records shown before any search has been made.
    pub fn spotlight(&self, count: usize) -> Vec<LocationRecord> {
        self.records.iter().take(count).cloned().collect()
    }
}
