use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romkeeper_dat::CatalogSummary;

use super::Session;
use crate::CliError;

/// Print catalog-wide counts.
pub(crate) fn run_summary(session: &Session, json: bool) -> Result<(), CliError> {
    let catalog = session.load_catalog()?;
    let summary = CatalogSummary::from_catalog(&catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    log::info!(
        "{}",
        "Catalog summary".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Games:         {}", summary.total_games);
    log::info!("  Unique titles: {}", summary.unique_titles);
    if summary.orphan_clones > 0 {
        log::info!(
            "  Orphan clones: {}",
            summary.orphan_clones.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    crate::log_blank();

    log::info!("{}", "By region".if_supports_color(Stdout, |t| t.bold()));
    for (region, count) in &summary.games_per_region {
        log::info!("  {:>6}  {}", count, region.if_supports_color(Stdout, |t| t.cyan()));
    }
    crate::log_blank();

    log::info!("{}", "By language".if_supports_color(Stdout, |t| t.bold()));
    for (language, count) in &summary.games_per_language {
        log::info!("  {:>6}  {}", count, language);
    }

    Ok(())
}
