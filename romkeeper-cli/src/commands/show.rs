use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romkeeper_dat::{FileRecord, GameRecord, ParentRef};

use super::Session;
use crate::CliError;

/// Print catalog records with their files. Empty `ids` shows everything.
pub(crate) fn run_show(session: &Session, ids: &[String]) -> Result<(), CliError> {
    let catalog = session.load_catalog()?;
    let registry = &catalog.registry;

    if ids.is_empty() {
        for game in registry.iter() {
            print_game(game);
        }
        return Ok(());
    }

    for id in ids {
        match registry.get(id) {
            Some(game) => print_game(game),
            None => log::warn!("No catalog record with id {id}"),
        }
    }
    Ok(())
}

fn print_game(game: &GameRecord) {
    log::info!(
        "[{}] {}",
        game.id.if_supports_color(Stdout, |t| t.cyan()),
        game.name.if_supports_color(Stdout, |t| t.bold()),
    );
    let regions: Vec<&str> = game.regions.iter().map(String::as_str).collect();
    log::info!("  License:   {}", game.license);
    log::info!("  Regions:   {}", regions.join(", "));
    log::info!("  Languages: {}", game.languages.join(", "));
    if let Some(status) = &game.dev_status {
        log::info!("  Status:    {status}");
    }
    if game.bios {
        log::info!("  BIOS");
    }
    if let ParentRef::Game(parent) = &game.parent {
        log::info!("  Clone of:  {parent}");
    }
    if !game.clones.is_empty() {
        log::info!("  Clones:    {}", game.clones.join(", "));
    }
    for file in &game.files {
        print_file(file);
    }
    crate::log_blank();
}

fn print_file(file: &FileRecord) {
    log::info!(
        "  {} {}",
        file.expected_name,
        romkeeper_core::util::format_bytes(file.size).if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("    sha1:     {}", file.sha1);
    log::info!("    format:   {}", file.format.values().join(" / "));
    if !file.regions.is_empty() {
        let regions: Vec<&str> = file.regions.iter().map(String::as_str).collect();
        log::info!("    regions:  {}", regions.join(", "));
    }
    if !file.sections.is_empty() {
        let sections: Vec<&str> = file.sections.iter().map(String::as_str).collect();
        log::info!("    sections: {}", sections.join(", "));
    }
    if let Some(quality) = &file.quality {
        log::info!("    quality:  {}", quality.values().join(" / "));
    }
    if let Some(location) = &file.location {
        log::info!(
            "    found in: {} ({})",
            location.package_path.display(),
            location.member_name,
        );
    }
}
