use crate::errors::Result;
use crate::models::{PokemonRecord, PokemonSummary};
use async_trait::async_trait;

/// A place pokemon can be read from: the local catalog or a remote API.
///
/// Queries handed to a source are already normalized (trimmed, lower-cased).
/// A source reports "nothing matched" as `Ok(None)` / an empty list; errors
/// are reserved for failures of the source itself.
#[async_trait]
pub trait PokemonSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Single summary whose name contains `query` or whose pokedex number equals it.
    async fn find_summary(&self, query: &str) -> Result<Option<PokemonSummary>>;

    async fn list_summaries(&self) -> Result<Vec<PokemonSummary>>;

    /// Single full record whose name contains `query` or whose pokedex number equals it.
    async fn find_record(&self, query: &str) -> Result<Option<PokemonRecord>>;

    async fn list_records(&self) -> Result<Vec<PokemonRecord>>;

    /// Exact lookup by pokedex number.
    async fn get_by_id(&self, id: i64) -> Result<Option<PokemonRecord>>;
}

/// Write side of the local store.
#[async_trait]
pub trait PokemonSink: Send + Sync {
    /// Inserts the record or replaces the one stored under the same pokedex number.
    async fn upsert(&self, record: &PokemonRecord) -> Result<()>;
}
