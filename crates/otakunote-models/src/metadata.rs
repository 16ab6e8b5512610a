use serde::{Deserialize, Serialize};

use crate::media::MediaType;

/// Localized titles as returned by the catalog. Either variant may be
/// missing; `preferred` picks the best one for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaTitle {
    pub english: Option<String>,
    pub romaji: Option<String>,
}

impl MediaTitle {
    pub fn preferred(&self) -> &str {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .unwrap_or("(untitled)")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
}

/// Partial calendar date; the catalog omits components it does not know.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NextAiringEpisode {
    /// Airing time as epoch seconds.
    pub airing_at: i64,
    /// Seconds until the episode airs, relative to when it was fetched.
    pub time_until_airing: i64,
    pub episode: u32,
}

/// Catalog snapshot cached on a watchlist entry so the UI can render a card
/// without refetching. Replaced wholesale when fresher data arrives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub is_adult: bool,
    #[serde(default)]
    pub title: MediaTitle,
    #[serde(default)]
    pub cover_image: CoverImage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub start_date: FuzzyDate,
    /// Airing status string from the catalog (RELEASING, FINISHED, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_airing_episode: Option<NextAiringEpisode>,
}

impl MediaMetadata {
    pub fn new(id: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            id: id.into(),
            media_type,
            is_adult: false,
            title: MediaTitle::default(),
            cover_image: CoverImage::default(),
            banner_image: None,
            start_date: FuzzyDate::default(),
            status: None,
            episodes: None,
            genres: Vec::new(),
            average_score: None,
            description: None,
            next_airing_episode: None,
        }
    }

    /// True if the catalog reports an upcoming episode for this title.
    pub fn is_airing(&self) -> bool {
        self.next_airing_episode.is_some()
    }
}
