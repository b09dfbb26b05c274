//! Randomized card grid with search and favorites-only filtering.

use crate::error::{Error, Result};
use crate::favorites::FavoritesStore;
use crate::pokemon::PokemonCard;
use crate::random;
use crate::service::PokemonService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryState {
    pub load: LoadState,
    pub cards: Vec<PokemonCard>,
}

/// What the UI asks to see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub favorites_only: bool,
}

/// Cards whose display name, any type or any ability contains `search`,
/// ignoring case. Only an empty term keeps everything; whitespace is matched
/// literally.
pub fn filter_cards(source: &[PokemonCard], search: &str) -> Vec<PokemonCard> {
    let term = search.to_lowercase();
    if term.is_empty() {
        return source.to_vec();
    }
    source
        .iter()
        .filter(|card| {
            card.display_name.to_lowercase().contains(&term)
                || card.types.iter().any(|t| t.to_lowercase().contains(&term))
                || card.abilities.iter().any(|a| a.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

pub struct Gallery {
    service: Arc<PokemonService>,
    favorites: Arc<FavoritesStore>,
    sample_count: u32,
    list_limit: u32,
    state: watch::Sender<GalleryState>,
}

impl Gallery {
    pub fn new(
        service: Arc<PokemonService>,
        favorites: Arc<FavoritesStore>,
        sample_count: u32,
        list_limit: u32,
    ) -> Self {
        let (state, _) = watch::channel(GalleryState {
            load: LoadState::Loading,
            cards: Vec::new(),
        });
        Self {
            service,
            favorites,
            sample_count,
            list_limit,
            state,
        }
    }

    pub fn state(&self) -> GalleryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GalleryState> {
        self.state.subscribe()
    }

    /// Load a fresh random sample of cards.
    ///
    /// Failures are cached by the service, so a reload after a failed load
    /// evicts the failed lookups first. Successful lookups are reused.
    pub async fn reload(&self) -> Result<()> {
        let previous_failed = matches!(self.state.borrow().load, LoadState::Failed { .. });
        if previous_failed {
            let evicted = self.service.evict_failures();
            tracing::info!("Previous load failed, evicted {} failed lookups before retrying", evicted);
        }
        self.state.send_modify(|state| state.load = LoadState::Loading);

        match self.load_cards().await {
            Ok(cards) => {
                tracing::info!("Loaded {} gallery cards", cards.len());
                self.state.send_replace(GalleryState {
                    load: LoadState::Ready,
                    cards,
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load gallery: {}", e);
                self.state.send_modify(|state| {
                    state.load = LoadState::Failed {
                        message: e.to_string(),
                    }
                });
                Err(e)
            }
        }
    }

    async fn load_cards(&self) -> Result<Vec<PokemonCard>> {
        let list = self.service.list_pokemon(self.list_limit).await?;
        let total = u32::try_from(list.results.len())
            .map_err(|_| Error::InvalidArgument("list index is too large".into()))?;
        let ids = random::pick_unique(self.sample_count, total, 1)?;
        let pokemon = self.service.get_multiple_pokemon(&ids).await?;
        Ok(pokemon.iter().map(|p| self.service.to_card(p)).collect())
    }

    pub fn visible_cards(&self, filter: &GalleryFilter) -> Vec<PokemonCard> {
        if filter.favorites_only {
            let favorites: Vec<PokemonCard> =
                self.favorites.favorites().into_iter().map(|f| f.card).collect();
            filter_cards(&favorites, &filter.search)
        } else {
            filter_cards(&self.state.borrow().cards, &filter.search)
        }
    }
}
