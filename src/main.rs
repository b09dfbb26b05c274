use pokedex_gallery::{
    AppState, Config, FavoritesStore, FileStore, Gallery, HttpTransport, KeyValueStore, LogFormat,
    MemoryStore, PokemonService, RemoteFetcher, ThemeStore, default_storage_path, router,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // axum logs rejections from built-in extractors with the `axum::rejection`
        // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
        format!(
            "{}=debug,tower_http=debug,axum::rejection=trace",
            env!("CARGO_CRATE_NAME")
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

fn open_storage(config: &Config) -> Arc<dyn KeyValueStore> {
    let path = match &config.storage.path {
        Some(path) => Ok(path.clone()),
        None => default_storage_path(),
    };
    match path {
        Ok(path) => {
            tracing::info!("Using storage file {}", path.display());
            Arc::new(FileStore::open(path))
        }
        Err(e) => {
            tracing::warn!("{}; favorites and theme will not persist", e);
            Arc::new(MemoryStore::default())
        }
    }
}

#[tokio::main]
async fn main() {
    let source = Config::source_path();
    let config = match Config::load_from(source.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.logging.format);
    match &source {
        Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
        None => tracing::info!("Loaded embedded default configuration"),
    }

    let fetcher = RemoteFetcher::new(
        Arc::new(HttpTransport::new(reqwest::Client::new())),
        config.pokemon.max_attempts,
    );
    let service = Arc::new(PokemonService::from_config(fetcher, &config));
    let storage = open_storage(&config);
    let favorites = Arc::new(FavoritesStore::new(storage.clone()));
    let theme = Arc::new(ThemeStore::new(storage));
    let gallery = Arc::new(Gallery::new(
        service.clone(),
        favorites.clone(),
        config.gallery.sample_count,
        config.pokemon.list_limit,
    ));

    // Warm the grid; failures are recorded in the gallery state.
    let initial = gallery.clone();
    tokio::spawn(async move {
        if let Err(e) = initial.reload().await {
            tracing::debug!("Initial gallery load failed: {}", e);
        }
    });

    let app_state = Arc::new(AppState {
        service,
        gallery,
        favorites,
        theme,
        list_limit: config.pokemon.list_limit,
    });
    let app = router(app_state);

    let listener = match tokio::net::TcpListener::bind(&config.server.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", config.server.bind, e);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(addr) => tracing::info!("listening on {}", addr),
        Err(e) => tracing::warn!("listening on unknown address: {}", e),
    }

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
