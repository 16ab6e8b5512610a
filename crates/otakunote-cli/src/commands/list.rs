use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use otakunote_models::{MediaType, WatchStatus, WatchlistEntry};

use crate::commands::App;
use crate::output::{Output, OutputFormat};

pub fn run_list(
    app: &App,
    status: Option<WatchStatus>,
    media_type: Option<MediaType>,
    output: &Output,
) -> Result<()> {
    let entries: Vec<&WatchlistEntry> = match (status, media_type) {
        (Some(status), None) => app.store.entries_with_status(status),
        (None, Some(media_type)) => app.store.entries_of_type(media_type),
        (Some(status), Some(media_type)) => app
            .store
            .entries_with_status(status)
            .into_iter()
            .filter(|e| e.media_type == media_type)
            .collect(),
        (None, None) => app.store.entries().iter().collect(),
    };

    if output.format() != OutputFormat::Human {
        output.json(&serde_json::json!({
            "entries": entries,
            "counts": app.store.counts(),
        }));
        return Ok(());
    }

    if entries.is_empty() {
        output.info("Watchlist is empty for this filter. Add titles with `otakunote add <id>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "Title", "Type", "Status", "Progress", "Score", "Airing"]);

    for entry in &entries {
        let meta = entry.cached_metadata.as_ref();
        let progress = match meta.and_then(|m| m.episodes) {
            Some(total) => format!("{}/{}", entry.watched_episodes, total),
            None => entry.watched_episodes.to_string(),
        };
        let score = meta
            .and_then(|m| m.average_score)
            .map(|s| format!("{}%", s))
            .unwrap_or_else(|| "-".to_string());
        let airing = meta
            .and_then(|m| m.next_airing_episode.as_ref())
            .map(|n| format!("ep {} soon", n.episode))
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(&entry.id),
            Cell::new(entry.display_title()),
            Cell::new(entry.media_type),
            Cell::new(entry.status),
            Cell::new(progress),
            Cell::new(score),
            Cell::new(airing),
        ]);
    }
    output.println(table.to_string());

    let counts = app.store.counts();
    output.println(format!(
        "watching {} · completed {} · plan to watch {} · dropped {}",
        counts.watching, counts.completed, counts.plan_to_watch, counts.dropped
    ));
    Ok(())
}
