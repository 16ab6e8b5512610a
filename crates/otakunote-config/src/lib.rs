pub mod config;
pub mod paths;

pub use config::{CatalogConfig, Config, DefaultsConfig};
pub use paths::{container_base_path, PathManager};
