use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romkeeper_lib::settings::{save_library_path, settings_text};
use romkeeper_lib::settings_path;

use crate::CliError;

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings_path().display());
    Ok(())
}

/// Show the settings file and its contents.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    log::info!(
        "{}",
        "romkeeper settings".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }
    crate::log_blank();

    match settings_text(&path) {
        Some(contents) => {
            for line in contents.lines() {
                log::info!("  {line}");
            }
        }
        None => log::warn!("Settings file could not be parsed"),
    }
    Ok(())
}

/// Save a default library root.
pub(crate) fn run_config_set_root(path: &Path) -> Result<(), CliError> {
    if !path.is_dir() {
        return Err(CliError::config(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    let path = path.canonicalize()?;
    save_library_path(Some(&path))?;
    log::info!(
        "Library root set to {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

/// Forget the saved library root.
pub(crate) fn run_config_clear_root() -> Result<(), CliError> {
    save_library_path(None)?;
    log::info!("Library root cleared");
    Ok(())
}
