use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog media classification. Serialized in the upstream API's
/// uppercase convention ("ANIME" / "MANGA").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Anime,
    Manga,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Anime => "ANIME",
            MediaType::Manga => "MANGA",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anime" => Ok(MediaType::Anime),
            "manga" => Ok(MediaType::Manga),
            other => Err(format!("unknown media type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("anime".parse::<MediaType>().unwrap(), MediaType::Anime);
        assert_eq!("MANGA".parse::<MediaType>().unwrap(), MediaType::Manga);
        assert!("movie".parse::<MediaType>().is_err());
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&MediaType::Anime).unwrap(), "\"ANIME\"");
    }
}
