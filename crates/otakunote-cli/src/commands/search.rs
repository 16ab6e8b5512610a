use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use otakunote_catalog::Catalog;
use otakunote_models::{MediaSeason, MediaType, SearchFilters};

use crate::commands::App;
use crate::output::{Output, OutputFormat};

pub async fn run_search(
    app: &App,
    query: Option<String>,
    media_type: Option<MediaType>,
    season: Option<MediaSeason>,
    year: Option<i32>,
    genres: Vec<String>,
    page: Option<u32>,
    output: &Output,
) -> Result<()> {
    let filters = SearchFilters {
        query,
        media_type,
        season,
        season_year: year,
        genres,
        // Hide adult titles unless the config opts in.
        is_adult: (!app.config.catalog.show_adult).then_some(false),
        page,
        per_page: Some(app.config.catalog.per_page),
    };

    let results = match app.catalog.search(&filters).await {
        Ok(results) => results,
        Err(e) => {
            output.error(format!("Catalog search failed: {}", e));
            return Ok(());
        }
    };

    if output.format() != OutputFormat::Human {
        output.json(&serde_json::json!({ "results": results }));
        return Ok(());
    }

    if results.is_empty() {
        output.info("No titles matched.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "Title", "Type", "Year", "Episodes", "Score", "Genres"]);

    for media in &results {
        let tracked = if app.store.is_in_watchlist(&media.id) {
            " *"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(format!("{}{}", media.id, tracked)),
            Cell::new(media.title.preferred()),
            Cell::new(media.media_type),
            Cell::new(
                media
                    .start_date
                    .year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                media
                    .episodes
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                media
                    .average_score
                    .map(|s| format!("{}%", s))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(media.genres.join(", ")),
        ]);
    }
    output.println(table.to_string());
    output.println("* already in your watchlist");
    Ok(())
}
