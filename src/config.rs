use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file that replaces the embedded one.
pub const CONFIG_ENV: &str = "POKEDEX_CONFIG";

const DEFAULT_CONFIG: &str = include_str!("../config/config.toml");

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub pokemon: PokemonConfig,
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PokemonConfig {
    pub api_url: String,
    pub max_attempts: u32,
    pub list_limit: u32,
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GalleryConfig {
    pub sample_count: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Language used for derived descriptive text.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Language code as used by the upstream API.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    /// Word used to join a list of names.
    pub fn conjunction(&self) -> &'static str {
        match self {
            Locale::Es => "y",
            Locale::En => "and",
        }
    }
}

impl Config {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&text)
    }

    /// The override file named by `POKEDEX_CONFIG`, if set.
    pub fn source_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV).map(PathBuf::from)
    }

    /// Load `path`, or the embedded defaults when there is none.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::from_toml(DEFAULT_CONFIG),
        }
    }

    /// Load the file named by `POKEDEX_CONFIG`, or the embedded defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::source_path().as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pokemon.api_url.trim().is_empty() {
            return Err(Error::ConfigValidation("pokemon.api_url must not be empty".into()));
        }
        if self.pokemon.max_attempts == 0 {
            return Err(Error::ConfigValidation("pokemon.max_attempts must be at least 1".into()));
        }
        if self.gallery.sample_count >= self.pokemon.list_limit {
            return Err(Error::ConfigValidation(format!(
                "gallery.sample_count ({}) must be smaller than pokemon.list_limit ({})",
                self.gallery.sample_count, self.pokemon.list_limit
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pokemon: PokemonConfig {
                api_url: "https://pokeapi.co/api/v2".to_string(),
                max_attempts: 4,
                list_limit: 1000,
                locale: Locale::Es,
            },
            gallery: GalleryConfig { sample_count: 30 },
            storage: StorageConfig::default(),
            server: ServerConfig {
                bind: "0.0.0.0:3000".to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}
