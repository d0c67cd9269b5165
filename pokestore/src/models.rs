use crate::errors::{Result, StorageError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

static POKEDEX_NUMBER_IN_RESOURCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/pokemon/(\d+)/").expect("static pattern is valid"));

/// Lightweight result of a "general" lookup: a name plus the resource locator
/// the record lives at.
///
/// Equality looks at the serialized fields only.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PokemonSummary {
    pub name: String,
    pub resource: String,
    /// Set when the producer already knows the number, e.g. a catalog row.
    #[serde(skip)]
    known_number: Option<i64>,
}

impl PartialEq for PokemonSummary {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.resource == other.resource
    }
}

impl Eq for PokemonSummary {}

impl PokemonSummary {
    pub fn new(name: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource: resource.into(),
            known_number: None,
        }
    }

    /// Builds the summary for `id` under the given API base URL.
    pub fn from_base(name: impl Into<String>, api_url: &str, id: i64) -> Self {
        Self {
            known_number: Some(id),
            ..Self::new(name, format!("{api_url}{id}/"))
        }
    }

    /// The pokedex number of this summary.
    ///
    /// Summaries built with [`PokemonSummary::from_base`] carry it directly.
    /// Otherwise it is read from a locator of the `/pokemon/<id>/` shape; any
    /// other locator breaks the contract with the remote source and is
    /// reported as [`StorageError::MalformedResource`].
    pub fn pokedex_number(&self) -> Result<i64> {
        if let Some(number) = self.known_number {
            return Ok(number);
        }
        POKEDEX_NUMBER_IN_RESOURCE
            .captures(&self.resource)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .ok_or_else(|| StorageError::MalformedResource(self.resource.clone()))
    }
}

/// Full record returned by a "specific" lookup and stored in the catalog.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonRecord {
    pub name: String,
    #[serde(rename = "pokedex_number", alias = "id")]
    pub id: i64,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub sprites: Map<String, JsonValue>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl PokemonRecord {
    /// Applies a partial update in place. Empty or missing fields leave the
    /// current value untouched; the pokedex number never changes.
    pub fn apply(&mut self, patch: &UpdateRequest) -> &mut Self {
        if let Some(name) = patch.name.as_ref().filter(|name| !name.is_empty()) {
            self.name = name.clone();
        }
        if let Some(abilities) = patch.abilities.as_ref().filter(|a| !a.is_empty()) {
            self.abilities = abilities.clone();
        }
        if let Some(sprites) = patch.sprites.as_ref().filter(|s| !s.is_empty()) {
            self.sprites = sprites.clone();
        }
        if let Some(types) = patch.types.as_ref().filter(|t| !t.is_empty()) {
            self.types = types.clone();
        }
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abilities: Option<Vec<String>>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub sprites: Option<Map<String, JsonValue>>,
}

impl UpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty)
            && self.abilities.as_ref().is_none_or(Vec::is_empty)
            && self.types.as_ref().is_none_or(Vec::is_empty)
            && self.sprites.as_ref().is_none_or(Map::is_empty)
    }
}
