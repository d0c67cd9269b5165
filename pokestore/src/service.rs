use crate::errors::{Result, StorageError};
use crate::fetch::PokemonSink;
use crate::models::{PokemonRecord, UpdateRequest};
use crate::reconcile::Reconciler;
use std::sync::Arc;

pub const NOT_FOUND_MESSAGE: &str = "Pokemon not found";

/// Write path: fetch the current record, apply the patch, persist it locally.
pub struct PokemonService {
    reconciler: Arc<Reconciler>,
    sink: Arc<dyn PokemonSink>,
}

impl PokemonService {
    pub fn new(reconciler: Arc<Reconciler>, sink: Arc<dyn PokemonSink>) -> Self {
        Self { reconciler, sink }
    }

    /// Updates the record stored under `pokedex_number`.
    ///
    /// Fails with [`StorageError::NotFound`] when neither the catalog nor the
    /// remote source knows the number; nothing is written in that case.
    pub async fn update(&self, pokedex_number: i64, patch: &UpdateRequest) -> Result<PokemonRecord> {
        let mut record = self
            .reconciler
            .fetch_one(pokedex_number)
            .await?
            .ok_or_else(|| StorageError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

        record.apply(patch);
        self.sink.upsert(&record).await?;
        log::debug!("pokemon {} persisted as '{}'", record.id, record.name);
        Ok(record)
    }
}
