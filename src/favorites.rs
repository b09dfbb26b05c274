//! Persisted, observable favorites list.

use crate::pokemon::{FavoritePokemon, PokemonCard};
use crate::storage::KeyValueStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

pub const FAVORITES_KEY: &str = "pokemon-favorites";

/// Favorites in insertion order, unique by id.
///
/// Subscribers hold a [`watch::Receiver`] that always sees the latest list;
/// dropping the receiver is how a subscriber unregisters.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    favorites: watch::Sender<Vec<FavoritePokemon>>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let initial = Self::load(storage.as_ref());
        tracing::debug!("Loaded {} favorites", initial.len());
        let (favorites, _) = watch::channel(initial);
        Self { storage, favorites }
    }

    // Unavailable storage or a corrupt payload degrades to an empty list.
    fn load(storage: &dyn KeyValueStore) -> Vec<FavoritePokemon> {
        match storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt favorites payload: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Error loading favorites: {}", e);
                Vec::new()
            }
        }
    }

    fn persist(&self, favorites: &[FavoritePokemon]) {
        match serde_json::to_string(favorites) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(FAVORITES_KEY, &raw) {
                    tracing::error!("Error saving favorites: {}", e);
                }
            }
            Err(e) => tracing::error!("Error serializing favorites: {}", e),
        }
    }

    // Applies `change` under the channel's write lock; persists and notifies
    // only when it reports a modification.
    fn update(&self, change: impl FnOnce(&mut Vec<FavoritePokemon>) -> bool) {
        self.favorites.send_if_modified(|favorites| {
            if !change(favorites) {
                return false;
            }
            self.persist(favorites);
            true
        });
    }

    pub fn add(&self, card: PokemonCard) {
        self.update(|favorites| {
            if favorites.iter().any(|f| f.card.id == card.id) {
                return false;
            }
            tracing::debug!("Adding favorite: {} (ID: {})", card.name, card.id);
            favorites.push(FavoritePokemon {
                card,
                added_at: Utc::now(),
            });
            true
        });
    }

    pub fn remove(&self, id: u32) {
        self.update(|favorites| {
            let before = favorites.len();
            favorites.retain(|f| f.card.id != id);
            if favorites.len() != before {
                tracing::debug!("Removed favorite ID: {}", id);
            }
            favorites.len() != before
        });
    }

    pub fn toggle(&self, card: PokemonCard) {
        self.update(|favorites| {
            match favorites.iter().position(|f| f.card.id == card.id) {
                Some(index) => {
                    favorites.remove(index);
                }
                None => favorites.push(FavoritePokemon {
                    card,
                    added_at: Utc::now(),
                }),
            }
            true
        });
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.favorites.borrow().iter().any(|f| f.card.id == id)
    }

    pub fn favorites(&self) -> Vec<FavoritePokemon> {
        self.favorites.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.favorites.borrow().len()
    }

    pub fn clear(&self) {
        tracing::debug!("Clearing favorites");
        self.update(|favorites| {
            favorites.clear();
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<FavoritePokemon>> {
        self.favorites.subscribe()
    }
}
