//! Territory references and the registry they are resolved against.
//!
//! A project perimeter is written `"<type>:<code>"`. The registry that knows
//! which territories exist is an injected collaborator: an in-memory
//! [`TerritoryIndex`] (optionally loaded from the `superficies.json` index
//! produced by the contour download job) or a database-backed registry.
//!
//! The index names each entry after the contour layer it came from
//! (`communes:75056`, `departements:75`, `epci:200054781`, `regions:11`).
//! Layer names are mapped to territory types on load.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Perimeter types
// ---------------------------------------------------------------------------

/// Territory levels a project perimeter may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerritoryType {
    Epci,
    Departement,
    Commune,
}

impl TerritoryType {
    pub const ALL: &'static [TerritoryType] = &[Self::Epci, Self::Departement, Self::Commune];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epci => "epci",
            Self::Departement => "departement",
            Self::Commune => "commune",
        }
    }

    /// Territory type stored in a contour layer, by layer name.
    pub fn from_layer(layer: &str) -> Option<Self> {
        match layer {
            "communes" | "commune" => Some(Self::Commune),
            "departements" | "departement" => Some(Self::Departement),
            "epci" => Some(Self::Epci),
            _ => None,
        }
    }
}

impl fmt::Display for TerritoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerritoryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epci" => Ok(Self::Epci),
            "departement" => Ok(Self::Departement),
            "commune" => Ok(Self::Commune),
            _ => Err(()),
        }
    }
}

/// A parsed `type:code` perimeter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Perimetre {
    pub territory_type: TerritoryType,
    pub code: String,
}

impl Perimetre {
    pub fn new(territory_type: TerritoryType, code: impl Into<String>) -> Self {
        Self {
            territory_type,
            code: code.into(),
        }
    }

    /// Registry key, identical to the wire form.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Perimetre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.territory_type, self.code)
    }
}

// ---------------------------------------------------------------------------
// Registry trait
// ---------------------------------------------------------------------------

/// Failure reported by a territory registry.
#[derive(Debug, thiserror::Error)]
pub enum TerritoryError {
    /// The territory does not exist.
    #[error("Territory not found: {0}")]
    NotFound(String),

    /// The registry could not answer (database down, index missing, ...).
    #[error("Territory registry unavailable: {0}")]
    Unavailable(String),
}

/// Resolves perimeters against the set of known territories.
#[async_trait]
pub trait TerritoryRegistry: Send + Sync {
    /// Succeed if the territory exists, [`TerritoryError::NotFound`] otherwise.
    async fn ensure_exists(&self, perimetre: &Perimetre) -> Result<(), TerritoryError>;

    /// Resolve a batch of perimeters; `true` at each position that exists.
    ///
    /// Registries backed by a remote store should answer the whole batch in
    /// one round trip. The default fans out to [`ensure_exists`](Self::ensure_exists).
    async fn exists_many(&self, perimetres: &[Perimetre]) -> Result<Vec<bool>, TerritoryError> {
        join_all(perimetres.iter().map(|p| self.ensure_exists(p)))
            .await
            .into_iter()
            .map(|result| match result {
                Ok(()) => Ok(true),
                Err(TerritoryError::NotFound(_)) => Ok(false),
                Err(err) => Err(err),
            })
            .collect()
    }

    /// Check that the registry can serve lookups.
    async fn health_check(&self) -> Result<(), TerritoryError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory index
// ---------------------------------------------------------------------------

/// Error loading a territory index file.
#[derive(Debug, thiserror::Error)]
pub enum TerritoryIndexError {
    #[error("Failed to read territory index: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed territory index: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One entry of `superficies.json`.
#[derive(Debug, Deserialize)]
struct IndexEntry {
    territory: String,
    #[serde(default)]
    area: Option<f64>,
}

/// Registry key for a `superficies.json` entry.
///
/// `communes:75056` becomes `commune:75056`. Layers a perimeter cannot
/// reference (`regions:11`) are kept as written.
pub fn index_key(territory: &str) -> String {
    match territory.split_once(':') {
        Some((layer, code)) => match TerritoryType::from_layer(layer) {
            Some(territory_type) => Perimetre::new(territory_type, code).key(),
            None => territory.to_string(),
        },
        None => territory.to_string(),
    }
}

/// In-memory territory registry keyed by `type:code`.
///
/// Entries for levels a perimeter cannot reference (e.g. `regions:`) are kept
/// as-is; they are simply never looked up.
#[derive(Debug, Clone, Default)]
pub struct TerritoryIndex {
    /// Territory key -> surface area in km² when known.
    entries: HashMap<String, Option<f64>>,
}

impl TerritoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `type:code` keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: keys.into_iter().map(|k| (k.into(), None)).collect(),
        }
    }

    /// Parse a `superficies.json` document: `[{"territory": "communes:75056", "area": 105.4}]`.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, TerritoryIndexError> {
        let entries: Vec<IndexEntry> = serde_json::from_reader(reader)?;
        Ok(Self {
            entries: entries
                .into_iter()
                .map(|e| (index_key(&e.territory), e.area))
                .collect(),
        })
    }

    /// Load a `superficies.json` file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerritoryIndexError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    pub fn insert(&mut self, key: impl Into<String>, area: Option<f64>) {
        self.entries.insert(key.into(), area);
    }

    pub fn contains(&self, perimetre: &Perimetre) -> bool {
        self.entries.contains_key(&perimetre.key())
    }

    /// Surface area in km², when the index recorded one.
    pub fn area(&self, perimetre: &Perimetre) -> Option<f64> {
        self.entries.get(&perimetre.key()).copied().flatten()
    }

    /// Every entry a perimeter can reference, with its area when known.
    pub fn perimetres(&self) -> impl Iterator<Item = (Perimetre, Option<f64>)> + '_ {
        self.entries.iter().filter_map(|(key, area)| {
            let (prefix, code) = key.split_once(':')?;
            let territory_type = prefix.parse::<TerritoryType>().ok()?;
            Some((Perimetre::new(territory_type, code), *area))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TerritoryRegistry for TerritoryIndex {
    async fn ensure_exists(&self, perimetre: &Perimetre) -> Result<(), TerritoryError> {
        if self.contains(perimetre) {
            Ok(())
        } else {
            Err(TerritoryError::NotFound(perimetre.key()))
        }
    }

    async fn exists_many(&self, perimetres: &[Perimetre]) -> Result<Vec<bool>, TerritoryError> {
        Ok(perimetres.iter().map(|p| self.contains(p)).collect())
    }

    async fn health_check(&self) -> Result<(), TerritoryError> {
        if self.is_empty() {
            return Err(TerritoryError::Unavailable(
                "territory index is empty".to_string(),
            ));
        }
        Ok(())
    }
}
