// pokemon.rs
// Upstream PokéAPI resources and the view models projected from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub types: Vec<PokemonType>,
    #[serde(default)]
    pub abilities: Vec<PokemonAbility>,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub moves: Vec<PokemonMove>,
    #[serde(default)]
    pub sprites: PokemonSprites,
    pub species: Option<NamedAPIResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NamedAPIResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonType {
    pub slot: u32,
    pub r#type: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonAbility {
    pub is_hidden: bool,
    pub slot: u32,
    pub ability: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonMove {
    pub r#move: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PokemonSprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub front_shiny: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<SpriteSet>,
    #[serde(default)]
    pub dream_world: Option<SpriteSet>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SpriteSet {
    pub front_default: Option<String>,
}

impl PokemonSprites {
    /// Official artwork when present and non-empty, else the default sprite.
    pub fn preferred_image(&self) -> Option<&str> {
        self.other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|art| art.front_default.as_deref())
            .filter(|url| !url.is_empty())
            .or_else(|| self.front_default.as_deref())
    }
}

/// Paginated index returned by `GET /pokemon?limit=N`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonListResponse {
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedAPIResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeciesDetail {
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    pub genera: Vec<Genus>,
    pub evolution_chain: ApiReference,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiReference {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedAPIResource,
    #[serde(default)]
    pub version: Option<NamedAPIResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Genus {
    pub genus: String,
    pub language: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EvolutionChain {
    pub id: u32,
    pub chain: ChainLink,
}

/// One stage of an evolution tree; `evolves_to` lists the next stages in order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChainLink {
    pub species: NamedAPIResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

/// Grid projection of a [`Pokemon`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PokemonCard {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub image: String,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    pub name: String,
    pub value: u32,
}

/// Full projection of a [`Pokemon`] plus text derived from its species and evolution chain.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PokemonDetail {
    #[serde(flatten)]
    pub card: PokemonCard,
    pub stats: Vec<StatEntry>,
    pub moves: Vec<String>,
    pub height: u32,
    pub weight: u32,
    pub description: String,
    pub category: String,
    pub evolution_chain: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePokemon {
    #[serde(flatten)]
    pub card: PokemonCard,
    pub added_at: DateTime<Utc>,
}
