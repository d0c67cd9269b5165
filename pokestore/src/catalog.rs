use crate::config::StorageConfig;
use crate::errors::{Result, StorageError};
use crate::fetch::{PokemonSink, PokemonSource};
use crate::models::{PokemonRecord, PokemonSummary};
use async_trait::async_trait;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task;

const RECORD_COLUMNS: &str = "name, pokedex_number, abilities, sprites, types";

/// Local SQLite cache of pokemon records.
///
/// List and map columns are stored as JSON text so names containing commas
/// survive a round trip. Name matching goes through `unicode_lower`, a
/// scalar function registered on the connection, so it is case-insensitive
/// beyond ASCII.
#[derive(Clone)]
pub struct Catalog {
    conn: Arc<Mutex<Connection>>,
    api_url: String,
}

impl Catalog {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        if let Some(parent) = config.catalog_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&config.catalog_path)?;
        conn.create_scalar_function(
            "unicode_lower",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            api_url: config.api_url.clone(),
        })
    }

    pub fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS pokemon (
                pokedex_number INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                abilities TEXT NOT NULL DEFAULT '[]',
                sprites TEXT NOT NULL DEFAULT '{}',
                types TEXT NOT NULL DEFAULT '[]'
            );",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Config("catalog connection lock poisoned".to_string()))
    }

    pub fn find_summary_matching(&self, query: &str) -> Result<Option<PokemonSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name, pokedex_number FROM pokemon
             WHERE unicode_lower(name) LIKE ?1 ESCAPE '\\' OR pokedex_number = ?2
             ORDER BY pokedex_number LIMIT 1",
        )?;
        let summary = stmt
            .query_row(params![like_pattern(query), query.parse::<i64>().ok()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .optional()?
            .map(|(name, id)| PokemonSummary::from_base(name, &self.api_url, id));
        Ok(summary)
    }

    pub fn all_summaries(&self) -> Result<Vec<PokemonSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name, pokedex_number FROM pokemon ORDER BY pokedex_number")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut summaries = Vec::new();
        for row in rows {
            let (name, id) = row?;
            summaries.push(PokemonSummary::from_base(name, &self.api_url, id));
        }
        Ok(summaries)
    }

    pub fn find_record_matching(&self, query: &str) -> Result<Option<PokemonRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM pokemon
             WHERE unicode_lower(name) LIKE ?1 ESCAPE '\\' OR pokedex_number = ?2
             ORDER BY pokedex_number LIMIT 1"
        ))?;
        let raw = stmt
            .query_row(params![like_pattern(query), query.parse::<i64>().ok()], RawRecord::from_row)
            .optional()?;
        raw.map(RawRecord::decode).transpose()
    }

    pub fn all_records(&self) -> Result<Vec<PokemonRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM pokemon ORDER BY pokedex_number"
        ))?;
        let rows = stmt.query_map([], RawRecord::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.decode()?);
        }
        Ok(records)
    }

    pub fn get_record(&self, pokedex_number: i64) -> Result<Option<PokemonRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM pokemon WHERE pokedex_number = ?1"
        ))?;
        let raw = stmt
            .query_row(params![pokedex_number], RawRecord::from_row)
            .optional()?;
        raw.map(RawRecord::decode).transpose()
    }

    pub fn upsert_record(&self, record: &PokemonRecord) -> Result<()> {
        let abilities = serde_json::to_string(&record.abilities)?;
        let sprites = serde_json::to_string(&record.sprites)?;
        let types = serde_json::to_string(&record.types)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO pokemon (name, pokedex_number, abilities, sprites, types)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(pokedex_number) DO UPDATE SET
                name = excluded.name,
                abilities = excluded.abilities,
                sprites = excluded.sprites,
                types = excluded.types",
            params![record.name, record.id, abilities, sprites, types],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM pokemon", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Row as stored, before the JSON columns are decoded.
struct RawRecord {
    name: String,
    pokedex_number: i64,
    abilities: String,
    sprites: String,
    types: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            pokedex_number: row.get(1)?,
            abilities: row.get(2)?,
            sprites: row.get(3)?,
            types: row.get(4)?,
        })
    }

    fn decode(self) -> Result<PokemonRecord> {
        Ok(PokemonRecord {
            name: self.name,
            id: self.pokedex_number,
            abilities: serde_json::from_str(&self.abilities)?,
            sprites: serde_json::from_str(&self.sprites)?,
            types: serde_json::from_str(&self.types)?,
        })
    }
}

/// `%query%` with LIKE wildcards in the query escaped.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Runs a catalog call on the blocking pool so SQLite I/O stays off the
/// async workers.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|err| StorageError::Other(anyhow::anyhow!("catalog task failed: {err}")))?
}

#[async_trait]
impl PokemonSource for Catalog {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn find_summary(&self, query: &str) -> Result<Option<PokemonSummary>> {
        let catalog = self.clone();
        let query = query.to_string();
        run_blocking(move || catalog.find_summary_matching(&query)).await
    }

    async fn list_summaries(&self) -> Result<Vec<PokemonSummary>> {
        let catalog = self.clone();
        run_blocking(move || catalog.all_summaries()).await
    }

    async fn find_record(&self, query: &str) -> Result<Option<PokemonRecord>> {
        let catalog = self.clone();
        let query = query.to_string();
        run_blocking(move || catalog.find_record_matching(&query)).await
    }

    async fn list_records(&self) -> Result<Vec<PokemonRecord>> {
        let catalog = self.clone();
        run_blocking(move || catalog.all_records()).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<PokemonRecord>> {
        let catalog = self.clone();
        run_blocking(move || catalog.get_record(id)).await
    }
}

#[async_trait]
impl PokemonSink for Catalog {
    async fn upsert(&self, record: &PokemonRecord) -> Result<()> {
        let catalog = self.clone();
        let record = record.clone();
        run_blocking(move || catalog.upsert_record(&record)).await
    }
}
