//! Response shapes of the PokeAPI `pokemon` endpoints.

use pokestore::models::PokemonRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// `GET /pokemon/{name-or-id}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiPokemon {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub sprites: Map<String, JsonValue>,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// `{name, url}` pair used throughout PokeAPI, including listing results.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// `GET /pokemon?limit=N`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiListing {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<NamedResource>,
}

impl From<ApiPokemon> for PokemonRecord {
    fn from(api: ApiPokemon) -> Self {
        PokemonRecord {
            name: api.name,
            id: api.id,
            abilities: api.abilities.into_iter().map(|slot| slot.ability.name).collect(),
            sprites: api.sprites,
            types: api.types.into_iter().map(|slot| slot.kind.name).collect(),
        }
    }
}
