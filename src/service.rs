//! Aggregation over cached PokéAPI resources.

use crate::cache::ResponseCache;
use crate::config::{Config, Locale};
use crate::derive;
use crate::error::FetchError;
use crate::fetcher::RemoteFetcher;
use crate::pokemon::{
    EvolutionChain, Pokemon, PokemonCard, PokemonDetail, PokemonListResponse, SpeciesDetail,
};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Composes list, entity, species and evolution lookups into view models.
///
/// Every lookup goes through a per-resource [`ResponseCache`], so a given
/// resource is requested at most once until [`PokemonService::clear_cache`].
/// Failed lookups stay cached until they are evicted.
pub struct PokemonService {
    fetcher: RemoteFetcher,
    api_url: String,
    locale: Locale,
    lists: ResponseCache<PokemonListResponse>,
    pokemon: ResponseCache<Pokemon>,
    species: ResponseCache<SpeciesDetail>,
    evolutions: ResponseCache<EvolutionChain>,
}

impl PokemonService {
    pub fn new(fetcher: RemoteFetcher, api_url: impl Into<String>, locale: Locale) -> Self {
        Self {
            fetcher,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            locale,
            lists: ResponseCache::new(),
            pokemon: ResponseCache::new(),
            species: ResponseCache::new(),
            evolutions: ResponseCache::new(),
        }
    }

    pub fn from_config(fetcher: RemoteFetcher, config: &Config) -> Self {
        Self::new(fetcher, &config.pokemon.api_url, config.pokemon.locale)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    async fn cached<T>(
        &self,
        cache: &ResponseCache<T>,
        key: String,
        url: String,
    ) -> Result<Arc<T>, FetchError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let fetcher = self.fetcher.clone();
        cache
            .get_or_fetch(&key, move || async move { fetcher.fetch::<T>(&url).await })
            .await
    }

    pub async fn list_pokemon(&self, limit: u32) -> Result<Arc<PokemonListResponse>, FetchError> {
        self.cached(
            &self.lists,
            format!("list-{limit}"),
            format!("{}/pokemon?limit={limit}", self.api_url),
        )
        .await
    }

    pub async fn get_pokemon(&self, id: u32) -> Result<Arc<Pokemon>, FetchError> {
        self.cached(
            &self.pokemon,
            format!("pokemon-{id}"),
            format!("{}/pokemon/{id}", self.api_url),
        )
        .await
    }

    /// Fetch all `ids` concurrently; results follow input order and the
    /// first failure fails the whole batch.
    pub async fn get_multiple_pokemon(&self, ids: &[u32]) -> Result<Vec<Arc<Pokemon>>, FetchError> {
        tracing::debug!("Fetching {} Pokémon", ids.len());
        try_join_all(ids.iter().map(|&id| self.get_pokemon(id))).await
    }

    pub fn to_card(&self, pokemon: &Pokemon) -> PokemonCard {
        derive::to_card(pokemon)
    }

    async fn get_species(&self, id: u32) -> Result<Arc<SpeciesDetail>, FetchError> {
        self.cached(
            &self.species,
            format!("species-{id}"),
            format!("{}/pokemon-species/{id}", self.api_url),
        )
        .await
    }

    async fn get_evolution_chain(&self, url: &str) -> Result<Arc<EvolutionChain>, FetchError> {
        self.cached(&self.evolutions, format!("evolution-{url}"), url.to_string())
            .await
    }

    /// Entity, then species, then evolution chain, then derived text. Any
    /// failure aborts the whole detail.
    pub async fn get_detail(&self, id: u32) -> Result<PokemonDetail, FetchError> {
        let result = async {
            let pokemon = self.get_pokemon(id).await?;
            let species = self.get_species(id).await?;
            let evolution = self.get_evolution_chain(&species.evolution_chain.url).await?;
            Ok(derive::to_detail(&pokemon, &species, &evolution, self.locale))
        }
        .await;

        match &result {
            Ok(detail) => tracing::debug!(
                "Built detail for {} (ID: {})",
                detail.card.display_name,
                id
            ),
            Err(e) => tracing::error!("Error getting Pokémon detail for ID {}: {}", id, e),
        }
        result
    }

    /// Drop the failed lookups behind a detail, keeping successful ones, and
    /// build it again.
    pub async fn retry_detail(&self, id: u32) -> Result<PokemonDetail, FetchError> {
        self.pokemon.invalidate_failed(&format!("pokemon-{id}"));
        self.species.invalidate_failed(&format!("species-{id}"));
        self.evolutions.evict_failed();
        self.get_detail(id).await
    }

    /// Drop every failed lookup across all resource kinds.
    pub fn evict_failures(&self) -> usize {
        self.lists.evict_failed()
            + self.pokemon.evict_failed()
            + self.species.evict_failed()
            + self.evolutions.evict_failed()
    }

    pub fn clear_cache(&self) {
        self.lists.clear();
        self.pokemon.clear();
        self.species.clear();
        self.evolutions.clear();
    }

    /// Number of cached entries across all resource kinds.
    pub fn cache_size(&self) -> usize {
        self.lists.size() + self.pokemon.size() + self.species.size() + self.evolutions.size()
    }
}
