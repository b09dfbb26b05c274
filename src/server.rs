//! JSON-over-HTTP boundary for a gallery UI.

use crate::error::{Error, FetchError};
use crate::favorites::FavoritesStore;
use crate::gallery::{Gallery, GalleryFilter, LoadState};
use crate::pokemon::{FavoritePokemon, PokemonCard, PokemonDetail};
use crate::random;
use crate::service::PokemonService;
use crate::theme::{Theme, ThemeStore};
use axum::{
    Json, Router, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct AppState {
    pub service: Arc<PokemonService>,
    pub gallery: Arc<Gallery>,
    pub favorites: Arc<FavoritesStore>,
    pub theme: Arc<ThemeStore>,
    pub list_limit: u32,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Fetch(FetchError::NotFound) => StatusCode::NOT_FOUND,
            Error::Fetch(FetchError::Connectivity | FetchError::ServiceUnavailable) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GalleryView {
    pub load: LoadState,
    pub cards: Vec<PokemonCard>,
    pub favorites_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeView {
    pub theme: Theme,
    pub dark: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetTheme {
    pub dark: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResult {
    pub id: u32,
    pub favorite: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/random", get(get_random_pokemon_handler))
        .route("/pokemon/{id}", get(get_pokemon_handler))
        .route("/pokemon/{id}/retry", post(retry_pokemon_handler))
        .route("/gallery", get(get_gallery_handler))
        .route("/gallery/reload", post(reload_gallery_handler))
        .route("/favorites", get(list_favorites_handler).delete(clear_favorites_handler))
        .route("/favorites/toggle", post(toggle_favorite_handler))
        .route("/favorites/{id}", delete(remove_favorite_handler))
        .route("/theme", get(get_theme_handler).put(set_theme_handler))
        .route("/theme/toggle", post(toggle_theme_handler))
        .route("/cache", delete(clear_cache_handler))
        .with_state(state)
}

#[debug_handler]
async fn get_pokemon_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<PokemonDetail>, Error> {
    tracing::debug!("Detail requested for Pokémon ID: {}", id);
    let detail = app_state.service.get_detail(id).await?;
    Ok(Json(detail))
}

#[debug_handler]
async fn retry_pokemon_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<PokemonDetail>, Error> {
    tracing::debug!("Detail retry requested for Pokémon ID: {}", id);
    let detail = app_state.service.retry_detail(id).await?;
    Ok(Json(detail))
}

#[debug_handler]
async fn get_random_pokemon_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<PokemonDetail>, Error> {
    let list = app_state.service.list_pokemon(app_state.list_limit).await?;
    let total = u32::try_from(list.results.len())
        .map_err(|_| Error::InvalidArgument("list index is too large".into()))?;
    let id = random::pick_unique(1, total, 1)?
        .first()
        .copied()
        .ok_or_else(|| Error::InvalidArgument("no Pokémon available".into()))?;
    tracing::debug!("Random Pokémon ID: {}", id);
    let detail = app_state.service.get_detail(id).await?;
    Ok(Json(detail))
}

fn gallery_view(app_state: &AppState, filter: &GalleryFilter) -> GalleryView {
    GalleryView {
        load: app_state.gallery.state().load,
        cards: app_state.gallery.visible_cards(filter),
        favorites_count: app_state.favorites.count(),
    }
}

#[debug_handler]
async fn get_gallery_handler(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<GalleryFilter>,
) -> Json<GalleryView> {
    Json(gallery_view(&app_state, &filter))
}

#[debug_handler]
async fn reload_gallery_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<GalleryView>, Error> {
    app_state.gallery.reload().await?;
    Ok(Json(gallery_view(&app_state, &GalleryFilter::default())))
}

#[debug_handler]
async fn list_favorites_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<FavoritePokemon>> {
    Json(app_state.favorites.favorites())
}

#[debug_handler]
async fn toggle_favorite_handler(
    State(app_state): State<Arc<AppState>>,
    Json(card): Json<PokemonCard>,
) -> Json<ToggleResult> {
    let id = card.id;
    app_state.favorites.toggle(card);
    Json(ToggleResult {
        id,
        favorite: app_state.favorites.is_favorite(id),
    })
}

#[debug_handler]
async fn remove_favorite_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> StatusCode {
    app_state.favorites.remove(id);
    StatusCode::NO_CONTENT
}

#[debug_handler]
async fn clear_favorites_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.favorites.clear();
    StatusCode::NO_CONTENT
}

fn theme_view(theme: Theme) -> ThemeView {
    ThemeView {
        theme,
        dark: theme.is_dark(),
    }
}

#[debug_handler]
async fn get_theme_handler(State(app_state): State<Arc<AppState>>) -> Json<ThemeView> {
    Json(theme_view(app_state.theme.theme()))
}

#[debug_handler]
async fn set_theme_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SetTheme>,
) -> Json<ThemeView> {
    app_state.theme.set_dark_mode(request.dark);
    Json(theme_view(app_state.theme.theme()))
}

#[debug_handler]
async fn toggle_theme_handler(State(app_state): State<Arc<AppState>>) -> Json<ThemeView> {
    Json(theme_view(app_state.theme.toggle()))
}

#[debug_handler]
async fn clear_cache_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.service.clear_cache();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::fetcher::{HttpTransport, RemoteFetcher};
    use crate::pokemon::fixtures;
    use crate::storage::MemoryStore;
    use mockito::ServerGuard;

    struct TestApp {
        base: String,
        upstream: ServerGuard,
    }

    async fn spawn_app() -> TestApp {
        let upstream = mockito::Server::new_async().await;
        let fetcher = RemoteFetcher::new(Arc::new(HttpTransport::default()), 4);
        let service = Arc::new(PokemonService::new(fetcher, upstream.url(), Locale::Es));
        let storage = Arc::new(MemoryStore::default());
        let favorites = Arc::new(FavoritesStore::new(storage.clone()));
        let theme = Arc::new(ThemeStore::new(storage));
        let gallery = Arc::new(Gallery::new(service.clone(), favorites.clone(), 2, 10));
        let state = Arc::new(AppState {
            service,
            gallery,
            favorites,
            theme,
            list_limit: 10,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        TestApp { base, upstream }
    }

    #[tokio::test]
    async fn test_missing_pokemon_maps_to_404() {
        let mut app = spawn_app().await;
        let upstream = app
            .upstream
            .mock("GET", "/pokemon/9999")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let response = reqwest::get(format!("{}/pokemon/9999", app.base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["kind"], "not-found");
        assert_eq!(body["error"], "The requested resource was not found.");
        upstream.assert_async().await;
    }

    #[tokio::test]
    async fn test_retry_endpoint_refetches_failed_detail() {
        let mut app = spawn_app().await;
        let upstream = app
            .upstream
            .mock("GET", "/pokemon/9999")
            .with_status(404)
            .expect(2)
            .create_async()
            .await;
        let client = reqwest::Client::new();

        for _ in 0..2 {
            let response = client.get(format!("{}/pokemon/9999", app.base)).send().await.unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        }
        let response = client
            .post(format!("{}/pokemon/9999/retry", app.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        upstream.assert_async().await;
    }

    #[tokio::test]
    async fn test_detail_endpoint() {
        let mut app = spawn_app().await;
        let chain_url = format!("{}/evolution-chain/2/", app.upstream.url());
        app.upstream
            .mock("GET", "/pokemon/6")
            .with_body(fixtures::pokemon_json(6, "charizard"))
            .create_async()
            .await;
        app.upstream
            .mock("GET", "/pokemon-species/6")
            .with_body(
                serde_json::json!({
                    "flavor_text_entries": [{"flavor_text": "Escupe\nfuego.", "language": {"name": "es", "url": ""}}],
                    "genera": [{"genus": "Pokémon Llama", "language": {"name": "es", "url": ""}}],
                    "evolution_chain": {"url": chain_url}
                })
                .to_string(),
            )
            .create_async()
            .await;
        app.upstream
            .mock("GET", "/evolution-chain/2/")
            .with_body(r#"{"id": 2, "chain": {"species": {"name": "charizard", "url": ""}, "evolves_to": []}}"#)
            .create_async()
            .await;

        let detail: PokemonDetail = reqwest::get(format!("{}/pokemon/6", app.base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(detail.card.display_name, "Charizard");
        assert_eq!(detail.description, "Escupe fuego.");
        assert_eq!(detail.category, "Pokémon Llama");
        assert_eq!(detail.evolution_chain, vec!["Charizard"]);
    }

    #[tokio::test]
    async fn test_favorites_and_theme_endpoints() {
        let app = spawn_app().await;
        let client = reqwest::Client::new();

        let toggled: ToggleResult = client
            .post(format!("{}/favorites/toggle", app.base))
            .json(&fixtures::card(25, "pikachu"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(toggled.favorite);

        let favorites: Vec<FavoritePokemon> = client
            .get(format!("{}/favorites", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].card.display_name, "Pikachu");

        let view: GalleryView = client
            .get(format!("{}/gallery?favorites_only=true&search=pika", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.favorites_count, 1);

        let response = client
            .delete(format!("{}/favorites/25", app.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

        let theme: ThemeView = client
            .post(format!("{}/theme/toggle", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(theme.dark);
        assert_eq!(theme.theme, Theme::Dark);
    }
}
