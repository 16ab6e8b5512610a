use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::media::MediaType;
use crate::metadata::MediaMetadata;
use crate::status::WatchStatus;

/// One tracked title. The serialized form is the persisted wire format:
/// a camelCase JSON object inside the watchlist array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: String,
    pub media_type: MediaType,
    /// Creation time as epoch millis; set once, never mutated.
    pub added_at: i64,
    pub status: WatchStatus,
    #[serde(default)]
    pub watched_episodes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_metadata: Option<MediaMetadata>,
}

impl WatchlistEntry {
    pub fn new(
        id: impl Into<String>,
        media_type: MediaType,
        cached_metadata: Option<MediaMetadata>,
    ) -> Self {
        Self {
            id: id.into(),
            media_type,
            added_at: Utc::now().timestamp_millis(),
            status: WatchStatus::default(),
            watched_episodes: 0,
            cached_metadata,
        }
    }

    /// Display title, falling back to the bare id when no metadata is cached.
    pub fn display_title(&self) -> &str {
        self.cached_metadata
            .as_ref()
            .map(|m| m.title.preferred())
            .unwrap_or(self.id.as_str())
    }
}
