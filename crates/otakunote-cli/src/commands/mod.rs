pub mod clear;
pub mod config;
pub mod list;
pub mod refresh;
pub mod search;
pub mod watch;

use otakunote_catalog::AniListClient;
use otakunote_config::{Config, PathManager};
use otakunote_store::WatchlistStore;

/// State assembled by the composition root and shared by command handlers.
pub struct App {
    pub config: Config,
    pub paths: PathManager,
    pub store: WatchlistStore,
    pub catalog: AniListClient,
}
