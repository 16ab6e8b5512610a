use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use otakunote_catalog::Catalog;

use crate::commands::App;
use crate::output::Output;

/// Catalog page cap per batched id lookup.
const BATCH_SIZE: usize = 25;

pub async fn run_refresh(app: &mut App, missing_only: bool, output: &Output) -> Result<()> {
    let ids: Vec<String> = if missing_only {
        app.store.ids_missing_metadata()
    } else {
        app.store.entries().iter().map(|e| e.id.clone()).collect()
    };

    if ids.is_empty() {
        output.info("Nothing to refresh.");
        return Ok(());
    }

    let bar = ProgressBar::new(ids.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    bar.set_message("fetching catalog metadata");

    let mut updated = 0usize;
    let mut failed_batches = 0usize;
    for chunk in ids.chunks(BATCH_SIZE) {
        match app.catalog.fetch_by_ids(chunk).await {
            Ok(results) => {
                for metadata in results {
                    let id = metadata.id.clone();
                    if app.store.set_metadata(&id, metadata) {
                        updated += 1;
                    }
                }
            }
            Err(e) => {
                // Partial failure: keep going, the rest may still resolve.
                failed_batches += 1;
                tracing::warn!("metadata batch failed: {}", e);
            }
        }
        bar.inc(chunk.len() as u64);
    }
    bar.finish_and_clear();

    if failed_batches > 0 {
        output.warn(format!(
            "Refreshed metadata for {} of {} titles ({} batches failed)",
            updated,
            ids.len(),
            failed_batches
        ));
    } else {
        output.success(format!("Refreshed metadata for {} of {} titles", updated, ids.len()));
    }
    Ok(())
}
