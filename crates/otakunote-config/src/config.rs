use serde::{Deserialize, Serialize};
use std::path::Path;

use otakunote_models::MediaType;

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// GraphQL endpoint of the media catalog.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Page size for search results.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Include adult-flagged titles in search results.
    #[serde(default)]
    pub show_adult: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Media type assumed when a command does not specify one.
    #[serde(default = "default_media_type")]
    pub media_type: MediaType,
}

fn default_endpoint() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_per_page() -> u32 {
    15
}

fn default_media_type() -> MediaType {
    MediaType::Anime
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            per_page: default_per_page(),
            show_adult: false,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            media_type: default_media_type(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it is absent.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.endpoint.is_empty() {
            return Err(anyhow::anyhow!("catalog.endpoint cannot be empty"));
        }
        if self.catalog.per_page == 0 || self.catalog.per_page > 50 {
            return Err(anyhow::anyhow!("catalog.per_page must be between 1 and 50"));
        }
        Ok(())
    }
}
