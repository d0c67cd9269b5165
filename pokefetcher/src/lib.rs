pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use crate::client::{PokeApiClient, LISTING_LIMIT};
pub use crate::error::PokeApiError;
