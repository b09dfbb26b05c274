pub mod cache;
pub mod config;
pub mod derive;
pub mod error;
pub mod favorites;
pub mod fetcher;
pub mod gallery;
pub mod pokemon;
pub mod random;
pub mod server;
pub mod service;
pub mod storage;
pub mod theme;

pub use cache::*;
pub use config::*;
pub use error::{Error, FetchError, Result};
pub use favorites::FavoritesStore;
pub use fetcher::{HttpTransport, RemoteFetcher, Transport};
pub use gallery::{Gallery, GalleryFilter, GalleryState, LoadState};
pub use pokemon::*;
pub use server::{AppState, router};
pub use service::PokemonService;
pub use storage::{FileStore, KeyValueStore, MemoryStore, default_storage_path};
pub use theme::{Theme, ThemeStore};
