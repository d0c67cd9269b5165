//! Example usage of the PokeAPI client
//!
//! Fetches a single pokemon and the first listing page straight from PokeAPI,
//! bypassing the local catalog. `POKEAPI_URL` and `POKEAPI_TIMEOUT_SECS` are
//! honoured, from the environment or a `.env` file.

use pokefetcher::PokeApiClient;
use pokestore::config::StorageConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorageConfig::from_env()?;
    let client = PokeApiClient::from_config(&config)?;
    println!("Using {}", client.base_url());

    println!("=== PokeAPI Example ===\n");

    println!("1. Fetching pikachu...");
    match client.get_pokemon("pikachu").await {
        Ok(Some(pikachu)) => {
            println!("   #{} {}", pikachu.id, pikachu.name);
            let abilities: Vec<&str> = pikachu.abilities.iter().map(|a| a.ability.name.as_str()).collect();
            println!("   Abilities: {}", abilities.join(", "));
        }
        Ok(None) => println!("   Not found"),
        Err(e) => println!("   Error fetching pikachu: {}", e),
    }

    println!("\n2. Fetching the first listing page...");
    match client.list_pokemon().await {
        Ok(listing) => {
            println!("   Found {} pokemon", listing.len());
            for item in listing.iter().take(5) {
                println!("   {} -> {}", item.name, item.url);
            }
        }
        Err(e) => println!("   Error fetching listing: {}", e),
    }

    Ok(())
}
