use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::media::MediaType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl MediaSeason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSeason::Winter => "WINTER",
            MediaSeason::Spring => "SPRING",
            MediaSeason::Summer => "SUMMER",
            MediaSeason::Fall => "FALL",
        }
    }
}

impl fmt::Display for MediaSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaSeason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "winter" => Ok(MediaSeason::Winter),
            "spring" => Ok(MediaSeason::Spring),
            "summer" => Ok(MediaSeason::Summer),
            "fall" | "autumn" => Ok(MediaSeason::Fall),
            other => Err(format!("unknown season: {}", other)),
        }
    }
}

/// Filter parameters for a catalog search, mirroring the upstream query
/// variables. Unset fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub media_type: Option<MediaType>,
    pub season: Option<MediaSeason>,
    pub season_year: Option<i32>,
    pub genres: Vec<String>,
    pub is_adult: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SearchFilters {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_season_names() {
        assert_eq!("winter".parse::<MediaSeason>().unwrap(), MediaSeason::Winter);
        assert_eq!("SUMMER".parse::<MediaSeason>().unwrap(), MediaSeason::Summer);
        // "autumn" is accepted as an alias for the API's FALL.
        assert_eq!("autumn".parse::<MediaSeason>().unwrap(), MediaSeason::Fall);
        assert!("monsoon".parse::<MediaSeason>().is_err());
    }
}
