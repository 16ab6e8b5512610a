use color_eyre::Result;

use crate::commands::App;
use crate::output::Output;

pub fn run_clear(app: &mut App, yes: bool, output: &Output) -> Result<()> {
    let count = app.store.len();
    if count == 0 {
        output.info("Watchlist is already empty.");
        return Ok(());
    }

    if !yes {
        output.warn(format!(
            "This removes all {} watchlist entries. Rerun with --yes to confirm.",
            count
        ));
        return Ok(());
    }

    app.store.clear();
    output.success(format!("Removed {} watchlist entries", count));
    Ok(())
}
