use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tracing::debug;

mod commands;
mod logging;
mod output;

use commands::App;
use otakunote_catalog::AniListClient;
use otakunote_config::{Config, PathManager};
use otakunote_models::{MediaSeason, MediaType, WatchStatus};
use otakunote_store::{FileStorage, WatchlistBus, WatchlistStore};

#[derive(Parser)]
#[command(name = "otakunote")]
#[command(about = "OtakuNote - track the anime and manga you watch and read")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to the rotating log file instead of stderr
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MediaTypeArg {
    Anime,
    Manga,
}

impl From<MediaTypeArg> for MediaType {
    fn from(value: MediaTypeArg) -> Self {
        match value {
            MediaTypeArg::Anime => MediaType::Anime,
            MediaTypeArg::Manga => MediaType::Manga,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Watching,
    Completed,
    #[value(name = "plan-to-watch")]
    PlanToWatch,
    Dropped,
}

impl From<StatusArg> for WatchStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Watching => WatchStatus::Watching,
            StatusArg::Completed => WatchStatus::Completed,
            StatusArg::PlanToWatch => WatchStatus::PlanToWatch,
            StatusArg::Dropped => WatchStatus::Dropped,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeasonArg {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl From<SeasonArg> for MediaSeason {
    fn from(value: SeasonArg) -> Self {
        match value {
            SeasonArg::Winter => MediaSeason::Winter,
            SeasonArg::Spring => MediaSeason::Spring,
            SeasonArg::Summer => MediaSeason::Summer,
            SeasonArg::Fall => MediaSeason::Fall,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a title to the watchlist
    #[command(long_about = "Add a title to the watchlist by catalog id. New entries start as plan-to-watch with zero watched episodes. Catalog metadata is fetched and cached on the entry unless --no-fetch is given; adding an id that is already tracked only refreshes its cached metadata.")]
    Add {
        /// Catalog id of the title
        id: String,

        /// Media type of the title (defaults to the configured default when metadata cannot tell us)
        #[arg(long, value_enum)]
        media_type: Option<MediaTypeArg>,

        /// Skip the catalog lookup and store the entry without metadata
        #[arg(long, action = ArgAction::SetTrue)]
        no_fetch: bool,
    },
    /// Remove a title from the watchlist
    Remove {
        /// Catalog id of the title
        id: String,
    },
    /// Change the tracking status of a title
    #[command(long_about = "Set the tracking status of a watchlist entry. Any transition is allowed; there is no enforced order between statuses.")]
    Status {
        /// Catalog id of the title
        id: String,

        /// New status
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Record how many episodes of a title you have watched
    Progress {
        /// Catalog id of the title
        id: String,

        /// Watched episode count
        episodes: u32,
    },
    /// List watchlist entries
    List {
        /// Only entries with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Only entries of this media type
        #[arg(long, value_enum)]
        media_type: Option<MediaTypeArg>,
    },
    /// Search the catalog
    Search {
        /// Text to search for
        query: Option<String>,

        /// Restrict results to one media type
        #[arg(long, value_enum)]
        media_type: Option<MediaTypeArg>,

        /// Restrict results to an airing season (combine with --year)
        #[arg(long, value_enum)]
        season: Option<SeasonArg>,

        /// Season year
        #[arg(long)]
        year: Option<i32>,

        /// Restrict results to a genre (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Result page
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show details for a title, including its watchlist state
    Show {
        /// Catalog id of the title
        id: String,
    },
    /// Re-fetch cached catalog metadata for watchlist entries
    Refresh {
        /// Only fetch metadata for entries that have none cached
        #[arg(long, action = ArgAction::SetTrue)]
        missing_only: bool,
    },
    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Remove every entry from the watchlist
    Clear {
        /// Confirm the wipe
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the active configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("failed to prepare data directories: {}", e))?;

    let log_file = cli.log_to_file.then(|| paths.log_file());
    logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let config = Config::load_or_default(&paths.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("failed to load config: {}", e))?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("invalid config: {}", e))?;

    let bus = Arc::new(WatchlistBus::new());
    // The bus is the ambient signal consumers hook into without going
    // through the store; the CLI itself just traces what goes by.
    let _membership_log = bus.subscribe(|id, added| {
        debug!(id, added, "watchlist membership changed");
    });
    let _update_log = bus.subscribe_updates(|update| {
        debug!(?update, "watchlist entry updated");
    });

    let storage = FileStorage::new(paths.watchlist_dir())
        .map_err(|e| color_eyre::eyre::eyre!("failed to open watchlist storage: {}", e))?;
    let store = WatchlistStore::new(Box::new(storage), bus.clone());
    let catalog = AniListClient::new(config.catalog.endpoint.clone());

    let mut app = App {
        config,
        paths,
        store,
        catalog,
    };

    match cli.command {
        Commands::Add {
            id,
            media_type,
            no_fetch,
        } => commands::watch::run_add(&mut app, &id, media_type.map(Into::into), no_fetch, &output).await,
        Commands::Remove { id } => commands::watch::run_remove(&mut app, &id, &output),
        Commands::Status { id, status } => {
            commands::watch::run_status(&mut app, &id, status.into(), &output)
        }
        Commands::Progress { id, episodes } => {
            commands::watch::run_progress(&mut app, &id, episodes, &output)
        }
        Commands::List { status, media_type } => commands::list::run_list(
            &app,
            status.map(Into::into),
            media_type.map(Into::into),
            &output,
        ),
        Commands::Search {
            query,
            media_type,
            season,
            year,
            genres,
            page,
        } => {
            commands::search::run_search(
                &app,
                query,
                media_type.map(Into::into),
                season.map(Into::into),
                year,
                genres,
                page,
                &output,
            )
            .await
        }
        Commands::Show { id } => commands::watch::run_show(&app, &id, &output).await,
        Commands::Refresh { missing_only } => {
            commands::refresh::run_refresh(&mut app, missing_only, &output).await
        }
        Commands::Config { cmd } => {
            commands::config::run_config(cmd.unwrap_or(ConfigCommands::Show), &app, &output)
        }
        Commands::Clear { yes } => commands::clear::run_clear(&mut app, yes, &output),
    }
}
