use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use clap::{Args, Parser, Subcommand};
use pokefetcher::PokeApiClient;
use pokestore::{
    config::{StorageConfig, DEFAULT_API_URL, DEFAULT_DB_PATH},
    errors::StorageError,
    fetch::PokemonSource,
    models::{PokemonRecord, PokemonSummary, UpdateRequest},
    PokeStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Runs the command line interface of the pokedex facade.
pub async fn run_cli() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("No subcommand provided. Use --help to see available commands.");
        return Ok(());
    };

    let store = Arc::new(open_store(&cli.store)?);
    match command {
        Command::Serve(args) => run_server(args, store).await?,
        Command::General { query } => {
            let summaries = store.lookup_summaries(query.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Command::Specific { query } => {
            let records = store.lookup_records(query.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Update(args) => {
            let pokedex_number = args.pokedex_number;
            let patch = args.into_patch()?;
            let record = store.update(pokedex_number, &patch).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args)]
struct StoreArgs {
    /// SQLite file used as the local cache
    #[arg(long, env = "DB_PATH", default_value = DEFAULT_DB_PATH, global = true)]
    db_path: PathBuf,
    /// Base URL of the PokeAPI `pokemon` resource
    #[arg(long, env = "POKEAPI_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,
    /// Timeout for remote requests; the HTTP client default applies when unset
    #[arg(long, env = "POKEAPI_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Starts the HTTP service
    Serve(ServeArgs),
    /// Looks up pokemon summaries (name + resource); lists everything without a query
    General {
        /// Name fragment or pokedex number
        query: Option<String>,
    },
    /// Looks up full pokemon records; lists everything without a query
    Specific {
        /// Name fragment or pokedex number
        query: Option<String>,
    },
    /// Updates a pokemon and stores it in the local cache
    Update(UpdateArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Socket address to bind the HTTP service
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,
}

#[derive(Args)]
struct UpdateArgs {
    pokedex_number: i64,
    #[arg(long)]
    name: Option<String>,
    /// Replaces the ability list; repeat for several abilities
    #[arg(long = "ability")]
    abilities: Vec<String>,
    /// Replaces the type list; repeat for several types
    #[arg(long = "type")]
    types: Vec<String>,
    /// Replaces the sprite map, given as a JSON object
    #[arg(long)]
    sprites: Option<String>,
}

impl UpdateArgs {
    fn into_patch(self) -> anyhow::Result<UpdateRequest> {
        let sprites = self
            .sprites
            .map(|raw| serde_json::from_str::<Map<String, JsonValue>>(&raw))
            .transpose()
            .context("--sprites must be a JSON object")?;
        Ok(UpdateRequest {
            name: self.name,
            abilities: Some(self.abilities),
            types: Some(self.types),
            sprites,
        })
    }
}

fn open_store(args: &StoreArgs) -> anyhow::Result<PokeStore> {
    let config = StorageConfig::new(&args.db_path)
        .with_api_url(args.api_url.clone())
        .with_request_timeout(args.timeout_secs.map(Duration::from_secs));
    let remote = PokeApiClient::from_config(&config).context("failed to build PokeAPI client")?;
    let store = PokeStore::new(config, Arc::new(remote) as Arc<dyn PokemonSource>)
        .context("failed to open pokemon catalog")?;
    Ok(store)
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PokeStore>,
}

impl AppState {
    pub fn new(store: Arc<PokeStore>) -> Self {
        Self { store }
    }
}

/// Every failure leaves the service as a 400 carrying the error text and the
/// name of its kind.
#[derive(Debug)]
struct ApiError {
    message: String,
    kind: &'static str,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError {
            message: err.to_string(),
            kind: err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("request failed ({}): {}", self.kind, self.message);
        let status = self.status_code();
        let body = Json(json!({ "message": self.message, "ExceptionType": self.kind }));
        (status, body).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone, Deserialize)]
struct LookupQuery {
    #[serde(default)]
    data_to_search: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn run_server(args: ServeArgs, store: Arc<PokeStore>) -> anyhow::Result<()> {
    let addr: SocketAddr = args.bind.parse().context("failed to parse bind address")?;

    let router = build_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind pokedex listener")?;

    info!("Pokedex listening on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("pokedex server error")?;

    Ok(())
}

/// Builds the HTTP router of the pokedex service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pokemon/general", get(get_general))
        .route("/pokemon/specific", get(get_specific))
        .route("/pokemon/:pokedex_number", put(update_pokemon))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn get_general(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Vec<PokemonSummary>>> {
    let summaries = state
        .store
        .lookup_summaries(query.data_to_search.as_deref())
        .await?;
    Ok(Json(summaries))
}

async fn get_specific(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Vec<PokemonRecord>>> {
    let records = state
        .store
        .lookup_records(query.data_to_search.as_deref())
        .await?;
    Ok(Json(records))
}

async fn update_pokemon(
    State(state): State<AppState>,
    Path(pokedex_number): Path<i64>,
    Json(patch): Json<UpdateRequest>,
) -> ApiResult<StatusCode> {
    state.store.update(pokedex_number, &patch).await?;
    info!("pokemon {} updated", pokedex_number);
    Ok(StatusCode::NO_CONTENT)
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
