use crate::errors::Result;
use crate::fetch::PokemonSource;
use crate::models::{PokemonRecord, PokemonSummary};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trims and lower-cases a lookup query. Blank queries count as absent.
pub fn normalize_query(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

/// Combines the local catalog with the remote source.
///
/// With a query, the local store is consulted first and the remote source only
/// on a miss. Without one, both listings are merged by pokedex number and the
/// local entry replaces the remote one wholesale.
///
/// Remote failures never escape a read: they are logged and read as "no data".
/// Local failures and malformed remote resource locators do escape.
pub struct Reconciler {
    local: Arc<dyn PokemonSource>,
    remote: Arc<dyn PokemonSource>,
}

impl Reconciler {
    pub fn new(local: Arc<dyn PokemonSource>, remote: Arc<dyn PokemonSource>) -> Self {
        Self { local, remote }
    }

    pub async fn lookup_summaries(&self, query: Option<&str>) -> Result<Vec<PokemonSummary>> {
        if let Some(query) = normalize_query(query) {
            if let Some(summary) = self.local.find_summary(&query).await? {
                log::debug!("summary '{}' served from {}", query, self.local.name());
                return Ok(vec![summary]);
            }
            let remote = self.remote_or(self.remote.find_summary(&query).await, "find_summary", None);
            return Ok(remote.into_iter().collect());
        }

        let local = self.local.list_summaries().await?;
        let remote = self.remote_or(self.remote.list_summaries().await, "list_summaries", Vec::new());
        merge_summaries(local, remote)
    }

    pub async fn lookup_records(&self, query: Option<&str>) -> Result<Vec<PokemonRecord>> {
        if let Some(query) = normalize_query(query) {
            if let Some(record) = self.local.find_record(&query).await? {
                log::debug!("record '{}' served from {}", query, self.local.name());
                return Ok(vec![record]);
            }
            let remote = self.remote_or(self.remote.find_record(&query).await, "find_record", None);
            return Ok(remote.into_iter().collect());
        }

        let local = self.local.list_records().await?;
        let remote = self.remote_or(self.remote.list_records().await, "list_records", Vec::new());
        Ok(merge_records(local, remote))
    }

    /// Current state of one record for the write path: local first, then remote.
    pub async fn fetch_one(&self, pokedex_number: i64) -> Result<Option<PokemonRecord>> {
        if let Some(record) = self.local.get_by_id(pokedex_number).await? {
            return Ok(Some(record));
        }
        Ok(self.remote_or(self.remote.get_by_id(pokedex_number).await, "get_by_id", None))
    }

    fn remote_or<T>(&self, result: Result<T>, operation: &str, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                log::warn!(
                    "{} {} failed, treating as no data: {}",
                    self.remote.name(),
                    operation,
                    err
                );
                fallback
            }
        }
    }
}

/// Merges summaries by pokedex number. Local entries win. A summary whose
/// number is neither known nor readable from its locator aborts the merge.
pub fn merge_summaries(
    local: Vec<PokemonSummary>,
    remote: Vec<PokemonSummary>,
) -> Result<Vec<PokemonSummary>> {
    let mut combined = BTreeMap::new();
    for summary in remote {
        combined.insert(summary.pokedex_number()?, summary);
    }
    for summary in local {
        combined.insert(summary.pokedex_number()?, summary);
    }
    Ok(combined.into_values().collect())
}

/// Merges full records by pokedex number. Local entries win.
pub fn merge_records(local: Vec<PokemonRecord>, remote: Vec<PokemonRecord>) -> Vec<PokemonRecord> {
    let mut combined: BTreeMap<i64, PokemonRecord> =
        remote.into_iter().map(|record| (record.id, record)).collect();
    for record in local {
        combined.insert(record.id, record);
    }
    combined.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageError;

    const BASE: &str = "https://pokeapi.co/api/v2/pokemon/";

    fn record(id: i64, name: &str) -> PokemonRecord {
        PokemonRecord {
            name: name.to_string(),
            id,
            abilities: vec![],
            sprites: Default::default(),
            types: vec![],
        }
    }

    #[test]
    fn normalize_lowercases_and_drops_blank() {
        assert_eq!(normalize_query(Some("  PikaChu ")), Some("pikachu".to_string()));
        assert_eq!(normalize_query(Some("   ")), None);
        assert_eq!(normalize_query(None), None);
    }

    #[test]
    fn local_summary_replaces_remote_one() {
        let local = vec![PokemonSummary::from_base("pikachu", BASE, 25)];
        let remote = vec![
            PokemonSummary::from_base("pikachu-old", BASE, 25),
            PokemonSummary::from_base("bulbasaur", BASE, 1),
        ];

        let merged = merge_summaries(local, remote).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().any(|s| s.name == "pikachu"));
        assert!(merged.iter().any(|s| s.name == "bulbasaur"));
        assert!(!merged.iter().any(|s| s.name == "pikachu-old"));
    }

    #[test]
    fn malformed_remote_locator_aborts_merge() {
        let remote = vec![
            PokemonSummary::from_base("bulbasaur", BASE, 1),
            PokemonSummary::new("broken", "https://pokeapi.co/api/v2/pokemon/broken"),
        ];
        let err = merge_summaries(vec![], remote).unwrap_err();
        assert!(matches!(err, StorageError::MalformedResource(_)));
    }

    #[test]
    fn local_summaries_under_mirror_url_merge_by_known_number() {
        let local = vec![PokemonSummary::from_base("pikachu", "http://mirror.local/mons/", 25)];
        let remote = vec![
            PokemonSummary::from_base("pikachu-old", BASE, 25),
            PokemonSummary::new("bulbasaur", format!("{BASE}1/")),
        ];

        let merged = merge_summaries(local, remote).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "bulbasaur");
        assert_eq!(merged[1].resource, "http://mirror.local/mons/25/");
    }

    #[test]
    fn local_record_replaces_remote_one_wholesale() {
        let mut remote_pikachu = record(25, "pikachu-old");
        remote_pikachu.types = vec!["electric".to_string()];

        let merged = merge_records(
            vec![record(25, "pikachu")],
            vec![remote_pikachu, record(1, "bulbasaur")],
        );

        assert_eq!(merged.len(), 2);
        let pikachu = merged.iter().find(|r| r.id == 25).unwrap();
        assert_eq!(pikachu, &record(25, "pikachu"));
        assert!(merged.iter().any(|r| r.id == 1 && r.name == "bulbasaur"));
    }
}
