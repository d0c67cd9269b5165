use crate::errors::{Result, StorageError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://pokeapi.co/api/v2/pokemon/";
pub const DEFAULT_DB_PATH: &str = "pokemon.db";

#[derive(Deserialize, Debug, Clone)]
pub struct StorageConfig {
    pub catalog_path: PathBuf,
    pub api_url: String,
    #[serde(default)]
    pub request_timeout: Option<Duration>,
}

impl StorageConfig {
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
        }
    }

    /// Points the config at another PokeAPI-compatible base URL. The URL always
    /// ends with `/` so ids and names can be appended directly.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = normalize_api_url(api_url.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Reads `DB_PATH`, `POKEAPI_URL` and `POKEAPI_TIMEOUT_SECS`, after loading
    /// a `.env` file if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let api_url = std::env::var("POKEAPI_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout = match std::env::var("POKEAPI_TIMEOUT_SECS") {
            Ok(raw) => Some(parse_timeout_secs(&raw)?),
            Err(_) => None,
        };

        Ok(Self::new(db_path)
            .with_api_url(api_url)
            .with_request_timeout(timeout))
    }
}

pub fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| StorageError::Config(format!("invalid POKEAPI_TIMEOUT_SECS value '{raw}'")))
}

fn normalize_api_url(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{url}/")
    }
}
