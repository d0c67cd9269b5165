pub mod catalog;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod reconcile;
pub mod service;

use crate::catalog::Catalog;
use crate::config::StorageConfig;
use crate::errors::Result;
use crate::fetch::PokemonSource;
use crate::models::{PokemonRecord, PokemonSummary, UpdateRequest};
use crate::reconcile::Reconciler;
use crate::service::PokemonService;
use std::sync::Arc;

/// The main entry point for the `pokestore` library.
///
/// `PokeStore` wires the local SQLite [`Catalog`] and a remote
/// [`PokemonSource`] together and exposes the three public operations:
/// - `lookup_summaries`: fuzzy "general" lookup (name + resource locator).
/// - `lookup_records`: detailed "specific" lookup.
/// - `update`: partial update persisted to the local catalog.
///
/// # Example
///
/// ```rust,no_run
/// use pokestore::{PokeStore, config::StorageConfig, fetch::PokemonSource};
/// use std::sync::Arc;
///
/// # async fn demo(remote: Arc<dyn PokemonSource>) -> pokestore::errors::Result<()> {
/// let store = PokeStore::new(StorageConfig::new("pokemon.db"), remote)?;
/// let hits = store.lookup_summaries(Some("pika")).await?;
/// # Ok(())
/// # }
/// ```
pub struct PokeStore {
    pub config: StorageConfig,
    pub catalog: Arc<Catalog>,
    pub reconciler: Arc<Reconciler>,
    pub service: Arc<PokemonService>,
}

impl PokeStore {
    /// Opens the catalog, creates its table if needed and wires the pipelines.
    pub fn new(config: StorageConfig, remote: Arc<dyn PokemonSource>) -> Result<Self> {
        let catalog = Arc::new(Catalog::new(&config)?);
        catalog.initialize_schema()?;

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&catalog) as Arc<dyn PokemonSource>,
            remote,
        ));
        let service = Arc::new(PokemonService::new(
            Arc::clone(&reconciler),
            Arc::clone(&catalog) as Arc<dyn fetch::PokemonSink>,
        ));

        Ok(Self {
            config,
            catalog,
            reconciler,
            service,
        })
    }

    pub async fn lookup_summaries(&self, query: Option<&str>) -> Result<Vec<PokemonSummary>> {
        self.reconciler.lookup_summaries(query).await
    }

    pub async fn lookup_records(&self, query: Option<&str>) -> Result<Vec<PokemonRecord>> {
        self.reconciler.lookup_records(query).await
    }

    pub async fn update(&self, pokedex_number: i64, patch: &UpdateRequest) -> Result<PokemonRecord> {
        self.service.update(pokedex_number, patch).await
    }
}
