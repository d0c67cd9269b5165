use async_trait::async_trait;
use pokestore::{
    errors::Result as StorageResult,
    fetch::PokemonSource,
    models::{PokemonRecord, PokemonSummary},
};

use crate::client::PokeApiClient;

#[async_trait]
impl PokemonSource for PokeApiClient {
    fn name(&self) -> &'static str {
        "pokeapi"
    }

    async fn find_summary(&self, query: &str) -> StorageResult<Option<PokemonSummary>> {
        let pokemon = self.get_pokemon(query).await?;
        Ok(pokemon.map(|p| PokemonSummary::from_base(p.name, self.base_url(), p.id)))
    }

    async fn list_summaries(&self) -> StorageResult<Vec<PokemonSummary>> {
        let listing = self.list_pokemon().await?;
        Ok(listing
            .into_iter()
            .map(|item| PokemonSummary::new(item.name, item.url))
            .collect())
    }

    async fn find_record(&self, query: &str) -> StorageResult<Option<PokemonRecord>> {
        Ok(self.get_pokemon(query).await?.map(PokemonRecord::from))
    }

    async fn list_records(&self) -> StorageResult<Vec<PokemonRecord>> {
        let details = self.list_pokemon_details().await?;
        Ok(details.into_iter().map(PokemonRecord::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<PokemonRecord>> {
        Ok(self
            .get_pokemon(&id.to_string())
            .await?
            .map(PokemonRecord::from))
    }
}
