use chrono::{TimeZone, Utc};
use color_eyre::Result;
use otakunote_catalog::Catalog;
use otakunote_models::{MediaMetadata, MediaType, WatchStatus};
use serde_json::json;

use crate::commands::App;
use crate::output::Output;

pub async fn run_add(
    app: &mut App,
    id: &str,
    media_type: Option<MediaType>,
    no_fetch: bool,
    output: &Output,
) -> Result<()> {
    if id.trim().is_empty() {
        output.error("id cannot be empty");
        return Ok(());
    }

    let metadata = if no_fetch {
        None
    } else {
        match app.catalog.details(id).await {
            Ok(Some(metadata)) => Some(metadata),
            Ok(None) => {
                output.warn(format!("Catalog does not know id {}; adding without metadata", id));
                None
            }
            Err(e) => {
                output.warn(format!("Could not fetch catalog metadata: {}", e));
                None
            }
        }
    };

    // The catalog knows the real type; fall back to the flag, then config.
    let media_type = metadata
        .as_ref()
        .map(|m| m.media_type)
        .or(media_type)
        .unwrap_or(app.config.defaults.media_type);

    let refreshed = metadata.is_some();
    let title = metadata
        .as_ref()
        .map(|m| m.title.preferred().to_string())
        .unwrap_or_else(|| id.to_string());

    if app.store.add(id, media_type, metadata) {
        output.success(format!("Added {} to the watchlist (plan to watch)", title));
    } else if refreshed {
        output.info(format!("{} is already tracked; refreshed its metadata", title));
    } else {
        output.info(format!("{} is already in the watchlist", title));
    }
    Ok(())
}

pub fn run_remove(app: &mut App, id: &str, output: &Output) -> Result<()> {
    let title = app
        .store
        .entries()
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.display_title().to_string());

    if app.store.remove(id) {
        output.success(format!(
            "Removed {} from the watchlist",
            title.unwrap_or_else(|| id.to_string())
        ));
    } else {
        output.info(format!("{} is not in the watchlist", id));
    }
    Ok(())
}

pub fn run_status(app: &mut App, id: &str, status: WatchStatus, output: &Output) -> Result<()> {
    if app.store.update_status(id, status) {
        output.success(format!("Marked {} as {}", id, status));
    } else {
        output.warn(format!("{} is not in the watchlist; add it first", id));
    }
    Ok(())
}

pub fn run_progress(app: &mut App, id: &str, episodes: u32, output: &Output) -> Result<()> {
    if app.store.update_watched_episodes(id, episodes) {
        let total = app
            .store
            .metadata(id)
            .and_then(|m| m.episodes)
            .map(|n| format!("/{}", n))
            .unwrap_or_default();
        output.success(format!("{}: {}{} episodes watched", id, episodes, total));
    } else {
        output.warn(format!("{} is not in the watchlist; add it first", id));
    }
    Ok(())
}

pub async fn run_show(app: &App, id: &str, output: &Output) -> Result<()> {
    // Prefer fresh catalog data, degrade to whatever snapshot we cached.
    let metadata = match app.catalog.details(id).await {
        Ok(Some(metadata)) => Some(metadata),
        Ok(None) => app.store.metadata(id).cloned(),
        Err(e) => {
            output.warn(format!("Catalog lookup failed ({}); using cached data", e));
            app.store.metadata(id).cloned()
        }
    };

    let Some(metadata) = metadata else {
        output.error(format!("No catalog data available for {}", id));
        return Ok(());
    };

    match output.format() {
        crate::output::OutputFormat::Human => print_details(app, id, &metadata, output),
        _ => {
            let mut value = serde_json::to_value(&metadata)?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("inWatchlist".to_string(), json!(app.store.is_in_watchlist(id)));
                if let Some(status) = app.store.status_of(id) {
                    obj.insert("watchStatus".to_string(), json!(status));
                    obj.insert(
                        "watchedEpisodes".to_string(),
                        json!(app.store.watched_episodes(id)),
                    );
                }
            }
            output.json(&value);
        }
    }
    Ok(())
}

fn print_details(app: &App, id: &str, metadata: &MediaMetadata, output: &Output) {
    output.println(format!("{} [{}]", metadata.title.preferred(), metadata.media_type));
    if let Some(romaji) = &metadata.title.romaji {
        if metadata.title.english.as_deref() != Some(romaji.as_str()) {
            output.println(format!("  romaji: {}", romaji));
        }
    }
    if let Some(year) = metadata.start_date.year {
        output.println(format!("  first aired: {}", year));
    }
    if let Some(status) = &metadata.status {
        output.println(format!("  airing status: {}", status));
    }
    if let Some(episodes) = metadata.episodes {
        output.println(format!("  episodes: {}", episodes));
    }
    if let Some(score) = metadata.average_score {
        output.println(format!("  average score: {}%", score));
    }
    if !metadata.genres.is_empty() {
        output.println(format!("  genres: {}", metadata.genres.join(", ")));
    }
    if let Some(next) = &metadata.next_airing_episode {
        let hours = next.time_until_airing / 3600;
        output.println(format!("  next episode: #{} in {}h", next.episode, hours));
    }
    if let Some(description) = &metadata.description {
        output.println(format!("\n  {}\n", strip_markup(description)));
    }

    if let Some(status) = app.store.status_of(id) {
        let watched = app.store.watched_episodes(id);
        let added_at = app
            .store
            .entries()
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.added_at)
            .unwrap_or(0);
        let added = Utc
            .timestamp_millis_opt(added_at)
            .single()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        output.println(format!(
            "  watchlist: {} · {} episodes watched · added {}",
            status, watched, added
        ));
    } else {
        output.println("  watchlist: not tracked".to_string());
    }
}

/// The catalog embeds light HTML in descriptions; flatten it for the terminal.
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
