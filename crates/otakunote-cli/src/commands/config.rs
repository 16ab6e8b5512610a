use color_eyre::Result;
use otakunote_config::Config;

use crate::commands::App;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;

pub fn run_config(cmd: ConfigCommands, app: &App, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(app, output),
        ConfigCommands::Init { force } => run_init(app, force, output),
    }
}

fn run_show(app: &App, output: &Output) -> Result<()> {
    if output.format() != OutputFormat::Human {
        output.json(&serde_json::to_value(&app.config)?);
        return Ok(());
    }

    let path = app.paths.config_file();
    if path.exists() {
        output.println(format!("config file: {}", path.display()));
    } else {
        output.println(format!(
            "config file: {} (not present, using defaults)",
            path.display()
        ));
    }
    output.println(format!("catalog endpoint:  {}", app.config.catalog.endpoint));
    output.println(format!("results per page:  {}", app.config.catalog.per_page));
    output.println(format!("show adult titles: {}", app.config.catalog.show_adult));
    output.println(format!("default media type: {}", app.config.defaults.media_type));
    output.println(format!("watchlist storage: {}", app.paths.watchlist_dir().display()));
    Ok(())
}

fn run_init(app: &App, force: bool, output: &Output) -> Result<()> {
    let path = app.paths.config_file();
    if path.exists() && !force {
        output.warn(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        ));
        return Ok(());
    }
    Config::default()
        .save_to_file(&path)
        .map_err(|e| color_eyre::eyre::eyre!("failed to write config: {}", e))?;
    output.success(format!("Wrote default config to {}", path.display()));
    Ok(())
}
