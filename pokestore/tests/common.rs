use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use pokestore::{
    config::StorageConfig,
    errors::{Result, StorageError},
    fetch::PokemonSource,
    models::{PokemonRecord, PokemonSummary},
    PokeStore,
};
use serde_json::json;
use tempfile::TempDir;

pub const API_URL: &str = "https://pokeapi.co/api/v2/pokemon/";

/// In-memory stand-in for PokeAPI that counts how often it is asked.
#[derive(Default)]
pub struct MockRemote {
    pub records: Vec<PokemonRecord>,
    pub extra_summaries: Vec<PokemonSummary>,
    pub unavailable: bool,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockRemote {
    pub fn with_records(records: Vec<PokemonRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(StorageError::RemoteUnavailable("HTTP 503".to_string()));
        }
        Ok(())
    }

    fn matching(&self, query: &str) -> Option<&PokemonRecord> {
        self.records
            .iter()
            .find(|r| r.name == query || query.parse::<i64>().ok() == Some(r.id))
    }
}

#[async_trait]
impl PokemonSource for MockRemote {
    fn name(&self) -> &'static str {
        "mock_remote"
    }

    async fn find_summary(&self, query: &str) -> Result<Option<PokemonSummary>> {
        self.enter()?;
        Ok(self
            .matching(query)
            .map(|r| PokemonSummary::from_base(r.name.clone(), API_URL, r.id)))
    }

    async fn list_summaries(&self) -> Result<Vec<PokemonSummary>> {
        self.enter()?;
        let mut summaries: Vec<PokemonSummary> = self
            .records
            .iter()
            .map(|r| PokemonSummary::from_base(r.name.clone(), API_URL, r.id))
            .collect();
        summaries.extend(self.extra_summaries.iter().cloned());
        Ok(summaries)
    }

    async fn find_record(&self, query: &str) -> Result<Option<PokemonRecord>> {
        self.enter()?;
        Ok(self.matching(query).cloned())
    }

    async fn list_records(&self) -> Result<Vec<PokemonRecord>> {
        self.enter()?;
        Ok(self.records.clone())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<PokemonRecord>> {
        self.enter()?;
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }
}

#[allow(dead_code)]
pub struct TestContext {
    pub temp_dir: TempDir,
    pub remote: Arc<MockRemote>,
    pub store: PokeStore,
}

pub fn init_test_context(remote: MockRemote) -> anyhow::Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let config = StorageConfig::new(temp_dir.path().join("pokemon.db")).with_api_url(API_URL);
    let remote = Arc::new(remote);
    let store = PokeStore::new(config, Arc::clone(&remote) as Arc<dyn PokemonSource>)?;
    Ok(TestContext {
        temp_dir,
        remote,
        store,
    })
}

pub fn record(id: i64, name: &str) -> PokemonRecord {
    PokemonRecord {
        name: name.to_string(),
        id,
        abilities: vec!["static".to_string(), "lightning-rod".to_string()],
        sprites: json!({"front_default": format!("{name}.png")})
            .as_object()
            .cloned()
            .unwrap_or_default(),
        types: vec!["electric".to_string()],
    }
}
