use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romkeeper_lib::{apply_patch_file, load_patch_list, run_patch_list};

use super::Session;
use crate::CliError;

/// Match the library, then export and patch every ROM in a patch list.
pub(crate) fn run_patch(session: &Session, list_path: &Path) -> Result<(), CliError> {
    let list = load_patch_list(list_path)?;
    log::info!(
        "{} patches to {}",
        list.jobs.len(),
        list.output.display().if_supports_color(Stdout, |t| t.cyan()),
    );

    let mut catalog = session.load_catalog()?;
    session.scan(&mut catalog, false)?;

    let report = run_patch_list(&list, &catalog.registry, &catalog.hash_index);

    crate::log_blank();
    log::info!(
        "{} {}",
        "Patched:".if_supports_color(Stdout, |t| t.bold()),
        report.patched.len().if_supports_color(Stdout, |t| t.green()),
    );
    if !report.not_found.is_empty() {
        log::info!(
            "  Not in catalog: {}",
            report.not_found.len().if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    if !report.not_bound.is_empty() {
        log::info!(
            "  Not in any package: {}",
            report.not_bound.len().if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    for failure in &report.failed {
        log::error!("{failure}");
    }
    Ok(())
}

/// Apply one IPS patch to a file in place.
pub(crate) fn run_apply_patch(patch: &Path, target: &Path) -> Result<(), CliError> {
    let stats = apply_patch_file(patch, target)?;
    log::info!(
        "{} {} with {}",
        "Patched".if_supports_color(Stdout, |t| t.bold()),
        target.display(),
        patch.display(),
    );
    log::info!(
        "  {} records, {} run-length records",
        stats.records,
        stats.rle_records,
    );
    if let Some(len) = stats.truncated_to {
        log::info!("  Truncated to {}", romkeeper_core::util::format_bytes(len));
    }
    Ok(())
}
