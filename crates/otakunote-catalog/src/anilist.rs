use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use otakunote_models::{
    CoverImage, FuzzyDate, MediaMetadata, MediaTitle, MediaType, NextAiringEpisode, SearchFilters,
};

use crate::error::CatalogError;
use crate::traits::Catalog;

pub const DEFAULT_ENDPOINT: &str = "https://graphql.anilist.co";

/// AniList caps Page results at 50 per request.
const PAGE_MAX: usize = 50;

/// Card-level fields, matching what the original app requested for its
/// carousels and watchlist grid.
const SEARCH_QUERY: &str = r#"
query SearchMedia(
  $page: Int = 1
  $perPage: Int = 15
  $type: MediaType
  $search: String
  $id_in: [Int]
  $season: MediaSeason
  $seasonYear: Int
  $genres: [String]
  $isAdult: Boolean
  $sort: [MediaSort] = [POPULARITY_DESC]
) {
  Page(page: $page, perPage: $perPage) {
    media(
      type: $type
      search: $search
      id_in: $id_in
      season: $season
      seasonYear: $seasonYear
      genre_in: $genres
      isAdult: $isAdult
      sort: $sort
    ) {
      id
      type
      isAdult
      title { english romaji }
      bannerImage
      coverImage { extraLarge large }
      startDate { year month day }
      status
      episodes
      genres
      averageScore
      nextAiringEpisode { airingAt timeUntilAiring episode }
    }
  }
}
"#;

/// Single-title lookup with the extra detail fields (description).
const DETAILS_QUERY: &str = r#"
query MediaDetails($id: Int) {
  Media(id: $id) {
    id
    type
    isAdult
    title { english romaji }
    bannerImage
    coverImage { extraLarge large }
    startDate { year month day }
    status
    description
    episodes
    genres
    averageScore
    nextAiringEpisode { airingAt timeUntilAiring episode }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Option<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    media: Option<Vec<Option<RawMedia>>>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<RawMedia>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMedia {
    id: i64,
    #[serde(rename = "type")]
    media_type: Option<MediaType>,
    is_adult: Option<bool>,
    title: Option<MediaTitle>,
    banner_image: Option<String>,
    cover_image: Option<CoverImage>,
    start_date: Option<FuzzyDate>,
    status: Option<String>,
    episodes: Option<u32>,
    genres: Option<Vec<Option<String>>>,
    average_score: Option<u32>,
    description: Option<String>,
    next_airing_episode: Option<NextAiringEpisode>,
}

fn map_media(raw: RawMedia) -> MediaMetadata {
    MediaMetadata {
        id: raw.id.to_string(),
        media_type: raw.media_type.unwrap_or(MediaType::Anime),
        is_adult: raw.is_adult.unwrap_or(false),
        title: raw.title.unwrap_or_default(),
        cover_image: raw.cover_image.unwrap_or_default(),
        banner_image: raw.banner_image,
        start_date: raw.start_date.unwrap_or_default(),
        status: raw.status,
        episodes: raw.episodes,
        genres: raw
            .genres
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect(),
        average_score: raw.average_score,
        description: raw.description,
        next_airing_episode: raw.next_airing_episode,
    }
}

/// Splits the requested ids into page-sized batches of numeric ids.
/// Catalog ids are numeric; anything else cannot resolve and is treated
/// as a miss, consistent with partial-result semantics.
fn id_batches(ids: &[String]) -> Vec<Vec<i64>> {
    let numeric: Vec<i64> = ids
        .iter()
        .filter_map(|id| match id.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!("skipping non-numeric catalog id {:?}", id);
                None
            }
        })
        .collect();
    numeric.chunks(PAGE_MAX).map(|c| c.to_vec()).collect()
}

fn search_variables(filters: &SearchFilters) -> Value {
    let mut variables = serde_json::Map::new();
    if let Some(page) = filters.page {
        variables.insert("page".to_string(), json!(page));
    }
    if let Some(per_page) = filters.per_page {
        variables.insert("perPage".to_string(), json!(per_page));
    }
    if let Some(query) = &filters.query {
        variables.insert("search".to_string(), json!(query));
    }
    if let Some(media_type) = filters.media_type {
        variables.insert("type".to_string(), json!(media_type.as_str()));
    }
    if let Some(season) = filters.season {
        variables.insert("season".to_string(), json!(season.as_str()));
    }
    if let Some(year) = filters.season_year {
        variables.insert("seasonYear".to_string(), json!(year));
    }
    if !filters.genres.is_empty() {
        variables.insert("genres".to_string(), json!(filters.genres));
    }
    if let Some(is_adult) = filters.is_adult {
        variables.insert("isAdult".to_string(), json!(is_adult));
    }
    Value::Object(variables)
}

/// Client for the AniList GraphQL endpoint.
pub struct AniListClient {
    http: Client,
    endpoint: String,
}

impl AniListClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn request<T>(&self, query: &str, variables: Value) -> Result<T, CatalogError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let body = json!({ "query": query, "variables": variables });
        debug!("catalog request to {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: GraphQlResponse<T> = response.json().await?;
        if let Some(errors) = parsed.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(CatalogError::Api(messages.join("; ")));
        }
        parsed
            .data
            .ok_or_else(|| CatalogError::InvalidResponse("response carried no data".to_string()))
    }

    async fn page_query(&self, variables: Value) -> Result<Vec<MediaMetadata>, CatalogError> {
        let data: PageData = self.request(SEARCH_QUERY, variables).await?;
        let media = data.page.and_then(|p| p.media).unwrap_or_default();
        Ok(media.into_iter().flatten().map(map_media).collect())
    }
}

impl Default for AniListClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl Catalog for AniListClient {
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<MediaMetadata>, CatalogError> {
        let mut results = Vec::new();
        for batch in id_batches(ids) {
            let variables = json!({
                "id_in": batch,
                "perPage": batch.len(),
            });
            results.extend(self.page_query(variables).await?);
        }
        Ok(results)
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<MediaMetadata>, CatalogError> {
        self.page_query(search_variables(filters)).await
    }

    async fn details(&self, id: &str) -> Result<Option<MediaMetadata>, CatalogError> {
        let Ok(numeric) = id.parse::<i64>() else {
            return Ok(None);
        };
        let data: MediaData = self.request(DETAILS_QUERY, json!({ "id": numeric })).await?;
        Ok(data.media.map(map_media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otakunote_models::MediaSeason;

    #[test]
    fn maps_full_page_payload() {
        let payload = r#"{
            "data": {
                "Page": {
                    "media": [
                        {
                            "id": 21,
                            "type": "ANIME",
                            "isAdult": false,
                            "title": { "english": "One Piece", "romaji": "One Piece" },
                            "bannerImage": "https://img/banner.jpg",
                            "coverImage": { "extraLarge": "https://img/xl.jpg", "large": "https://img/l.jpg" },
                            "startDate": { "year": 1999, "month": 10, "day": 20 },
                            "status": "RELEASING",
                            "episodes": null,
                            "genres": ["Action", "Adventure"],
                            "averageScore": 88,
                            "nextAiringEpisode": { "airingAt": 1735000000, "timeUntilAiring": 3600, "episode": 1122 }
                        },
                        null
                    ]
                }
            }
        }"#;
        let response: GraphQlResponse<PageData> = serde_json::from_str(payload).unwrap();
        assert!(response.errors.is_none());

        let media = response.data.unwrap().page.unwrap().media.unwrap();
        let mapped: Vec<MediaMetadata> = media.into_iter().flatten().map(map_media).collect();

        // Null slots from the API are dropped, not errors.
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].id, "21");
        assert_eq!(mapped[0].media_type, MediaType::Anime);
        assert_eq!(mapped[0].genres, vec!["Action", "Adventure"]);
        assert!(mapped[0].is_airing());
    }

    #[test]
    fn maps_sparse_media_record() {
        let raw: RawMedia = serde_json::from_str(r#"{ "id": 7 }"#).unwrap();
        let mapped = map_media(raw);
        assert_eq!(mapped.id, "7");
        assert_eq!(mapped.media_type, MediaType::Anime);
        assert_eq!(mapped.title.preferred(), "(untitled)");
        assert!(mapped.genres.is_empty());
    }

    #[test]
    fn surfaces_graphql_errors() {
        let payload = r#"{ "data": null, "errors": [{ "message": "rate limited" }] }"#;
        let response: GraphQlResponse<PageData> = serde_json::from_str(payload).unwrap();
        let messages: Vec<String> = response
            .errors
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["rate limited"]);
    }

    #[test]
    fn batches_ids_at_the_page_cap() {
        let ids: Vec<String> = (1..=120).map(|n| n.to_string()).collect();
        let batches = id_batches(&ids);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 50);
        assert_eq!(batches[1].len(), 50);
        assert_eq!(batches[2].len(), 20);
        assert_eq!(batches[0][0], 1);
        assert_eq!(batches[2][19], 120);
    }

    #[test]
    fn non_numeric_ids_are_treated_as_misses() {
        let ids = vec!["12".to_string(), "slug".to_string()];
        assert_eq!(id_batches(&ids), vec![vec![12]]);

        let none = vec!["slug".to_string()];
        assert!(id_batches(&none).is_empty());
    }

    #[test]
    fn search_variables_omit_unset_filters() {
        let filters = SearchFilters::with_query("frieren");
        let variables = search_variables(&filters);
        assert_eq!(variables["search"], "frieren");
        assert!(variables.get("season").is_none());
        assert!(variables.get("genres").is_none());
        assert!(variables.get("isAdult").is_none());
    }

    #[test]
    fn search_variables_carry_all_filters() {
        let filters = SearchFilters {
            query: Some("mushoku".to_string()),
            media_type: Some(MediaType::Anime),
            season: Some(MediaSeason::Fall),
            season_year: Some(2024),
            genres: vec!["Fantasy".to_string()],
            is_adult: Some(false),
            page: Some(2),
            per_page: Some(25),
        };
        let variables = search_variables(&filters);
        assert_eq!(variables["type"], "ANIME");
        assert_eq!(variables["season"], "FALL");
        assert_eq!(variables["seasonYear"], 2024);
        assert_eq!(variables["genres"][0], "Fantasy");
        assert_eq!(variables["isAdult"], false);
        assert_eq!(variables["page"], 2);
        assert_eq!(variables["perPage"], 25);
    }
}
