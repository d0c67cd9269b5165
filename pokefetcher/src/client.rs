//! PokeAPI module
//!
//! Asynchronous access to the `pokemon` resource of PokeAPI v2: single
//! pokemon by name or pokedex number, and the first page of the listing.

use crate::error::{PokeApiError, Result};
use crate::models::{ApiListing, ApiPokemon, NamedResource};
use pokestore::config::{StorageConfig, DEFAULT_API_URL};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;

/// Page size of the listing endpoint. Nothing beyond the first page is read.
pub const LISTING_LIMIT: usize = 100;

/// Client for interacting with PokeAPI
#[derive(Clone, Debug)]
pub struct PokeApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl PokeApiClient {
    /// Create a new PokeApiClient against the public API
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client for another PokeAPI-compatible base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http_client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Build a client from the storage config, honouring its request timeout
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}{name_or_id}`, with the segment percent-encoded so a query can
    /// never escape the `pokemon` collection.
    fn pokemon_url(&self, name_or_id: &str) -> Result<Url> {
        if name_or_id.is_empty() {
            return Err(PokeApiError::InvalidParameters(
                "pokemon name or id must not be empty".to_string(),
            ));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| PokeApiError::InvalidParameters(format!("bad base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| PokeApiError::InvalidParameters(format!("base url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(name_or_id);
        Ok(url)
    }

    /// GET a JSON document. A 404 reads as `None`, any other non-success
    /// status is an error.
    async fn make_request<T>(&self, url: Url, params: &[(&str, &str)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.http_client.get(url).query(params).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PokeApiError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Fetch one pokemon by name or pokedex number
    pub async fn get_pokemon(&self, name_or_id: &str) -> Result<Option<ApiPokemon>> {
        let url = self.pokemon_url(name_or_id)?;
        self.make_request(url, &[]).await
    }

    /// Fetch one pokemon from an absolute resource URL, as found in the listing
    pub async fn get_pokemon_at(&self, resource: &str) -> Result<Option<ApiPokemon>> {
        let url = Url::parse(resource)
            .map_err(|err| PokeApiError::InvalidParameters(format!("bad resource url '{resource}': {err}")))?;
        self.make_request(url, &[]).await
    }

    /// First page of the pokemon listing, at most [`LISTING_LIMIT`] entries
    pub async fn list_pokemon(&self) -> Result<Vec<NamedResource>> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| PokeApiError::InvalidParameters(format!("bad base url: {err}")))?;
        let limit = LISTING_LIMIT.to_string();
        let listing: Option<ApiListing> = self.make_request(url, &[("limit", limit.as_str())]).await?;

        let mut results = listing.map(|l| l.results).unwrap_or_default();
        results.truncate(LISTING_LIMIT);
        Ok(results)
    }

    /// Every pokemon of the first listing page with full details. Details are
    /// fetched concurrently; entries whose detail request fails are skipped.
    pub async fn list_pokemon_details(&self) -> Result<Vec<ApiPokemon>> {
        let listing = self.list_pokemon().await?;

        let mut tasks = JoinSet::new();
        for item in listing {
            let client = self.clone();
            tasks.spawn(async move {
                let outcome = client.get_pokemon_at(&item.url).await;
                (item, outcome)
            });
        }

        let mut details = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Some(pokemon)))) => details.push(pokemon),
                Ok((item, Ok(None))) => {
                    log::warn!("pokemon '{}' listed but not found at {}", item.name, item.url);
                }
                Ok((item, Err(err))) => {
                    log::warn!("skipping pokemon '{}': {}", item.name, err);
                }
                Err(err) => log::warn!("detail task failed: {}", err),
            }
        }
        details.sort_by_key(|pokemon| pokemon.id);
        Ok(details)
    }
}
