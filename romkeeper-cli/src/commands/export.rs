use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romkeeper_lib::{ExportPlan, ExportProgress, execute_export, plan_export, prepare_export_root};

use super::{Session, print_scan_report};
use crate::CliError;
use crate::cli_types::ExportSplitArgs;
use crate::spinner::progress_bar;

/// Match the library, then copy every matched file under `dir`.
pub(crate) fn run_export(
    session: &Session,
    dir: &Path,
    split: &ExportSplitArgs,
    dry_run: bool,
    yes: bool,
) -> Result<(), CliError> {
    let mut policy = session.settings.export;
    split.apply(&mut policy);

    if !dry_run && !yes && has_content(dir) {
        log::warn!(
            "This will delete everything in the export directory:\n  {}",
            dir.display(),
        );
        log::info!("Re-run with --yes to proceed, or --dry-run to preview.");
        return Err(CliError::Aborted);
    }

    let mut catalog = session.load_catalog()?;
    let scan = session.scan(&mut catalog, false)?;
    print_scan_report(&scan);
    crate::log_blank();

    let plan = plan_export(&catalog.registry, &policy);
    if plan.is_empty() {
        log::info!("Nothing to export: no package member matched the catalog.");
        return Ok(());
    }

    if dry_run {
        print_plan(&plan, dir);
        return Ok(());
    }

    prepare_export_root(dir)?;
    let pb = progress_bar(session.quiet, plan.len());
    let progress = |p: ExportProgress| match p {
        ExportProgress::Copying { target, index, .. } => {
            pb.set_position(index as u64);
            if let Some(name) = target.file_name() {
                pb.set_message(name.to_string_lossy().into_owned());
            }
        }
        ExportProgress::Done => pb.finish_and_clear(),
    };
    let summary = execute_export(&plan, dir, &progress);

    log::info!(
        "{} {} files to {}",
        "Exported".if_supports_color(Stdout, |t| t.bold()),
        summary.exported.if_supports_color(Stdout, |t| t.green()),
        dir.display(),
    );
    if summary.already_present > 0 {
        log::info!("  Already present: {}", summary.already_present);
    }
    for collision in &summary.collisions {
        log::warn!("Collision: {collision}");
    }
    for failure in &summary.failures {
        log::error!("{failure}");
    }

    Ok(())
}

fn has_content(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn print_plan(plan: &ExportPlan, dir: &Path) {
    log::info!(
        "{} {} files to {}",
        "Would export".if_supports_color(Stdout, |t| t.bold()),
        plan.len(),
        dir.display(),
    );
    for entry in &plan.entries {
        log::info!(
            "  {} {}",
            entry.relative_path().display(),
            format!("<- {}", entry.source.package_path.display())
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}
