//! Persisted dark/light theme flag.

use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

pub const THEME_KEY: &str = "pokemon-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    theme: watch::Sender<Theme>,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        // Anything other than a stored "dark" means light.
        let initial = match storage.get(THEME_KEY) {
            Ok(Some(stored)) if stored == Theme::Dark.as_str() => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(e) => {
                tracing::warn!("Error loading theme: {}", e);
                Theme::Light
            }
        };
        let (theme, _) = watch::channel(initial);
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn is_dark_mode(&self) -> bool {
        self.theme().is_dark()
    }

    pub fn toggle(&self) -> Theme {
        let next = self.theme().toggled();
        self.set(next);
        next
    }

    pub fn set_dark_mode(&self, dark: bool) {
        self.set(if dark { Theme::Dark } else { Theme::Light });
    }

    fn set(&self, theme: Theme) {
        self.theme.send_replace(theme);
        if let Err(e) = self.storage.set(THEME_KEY, theme.as_str()) {
            tracing::error!("Error saving theme: {}", e);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }
}
