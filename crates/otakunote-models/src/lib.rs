pub mod entry;
pub mod media;
pub mod metadata;
pub mod search;
pub mod status;

pub use entry::WatchlistEntry;
pub use media::MediaType;
pub use metadata::{CoverImage, FuzzyDate, MediaMetadata, MediaTitle, NextAiringEpisode};
pub use search::{MediaSeason, SearchFilters};
pub use status::WatchStatus;
