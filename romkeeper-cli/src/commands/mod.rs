pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod list;
pub(crate) mod patch;
pub(crate) mod show;
pub(crate) mod summary;

use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romkeeper_dat::{LoadOptions, LoadedCatalog, MatchProgress, MemberOutcome};
use romkeeper_lib::{ScanReport, Settings, find_packages, load_settings, match_packages};

use crate::CliError;
use crate::cli_types::CatalogFilterArgs;
use crate::spinner::spinner;

/// Resolved library root plus the effective settings for one invocation.
pub(crate) struct Session {
    pub root: PathBuf,
    pub settings: Settings,
    pub quiet: bool,
}

impl Session {
    pub(crate) fn new(root: Option<PathBuf>, filters: &CatalogFilterArgs, quiet: bool) -> Self {
        let mut settings = load_settings();
        filters.apply(&mut settings.catalog);
        let root = romkeeper_lib::resolve_library_path(root, &settings);
        Self {
            root,
            settings,
            quiet,
        }
    }

    pub(crate) fn load_options(&self) -> &LoadOptions {
        &self.settings.catalog
    }

    /// Load the library's catalog behind a spinner.
    pub(crate) fn load_catalog(&self) -> Result<LoadedCatalog, CliError> {
        let pb = spinner(self.quiet, format!("Loading catalog from {}", self.root.display()));
        let result = romkeeper_dat::load_from_library(&self.root, self.load_options());
        pb.finish_and_clear();
        let catalog = result?;

        let report = &catalog.report;
        log::debug!(
            "Loaded {} games, {} hashes ({} orphan clones, {} nested parents, {} forced names)",
            catalog.registry.len(),
            catalog.hash_index.len(),
            report.orphan_clones,
            report.nested_clone_parents,
            report.forced_names,
        );
        if report.format_conflicts > 0 || report.quality_conflicts > 0 {
            log::warn!(
                "Catalog has {} format and {} quality conflicts",
                report.format_conflicts,
                report.quality_conflicts,
            );
        }
        Ok(catalog)
    }

    /// Match every package in the library, binding files in `catalog`.
    ///
    /// With `verbose_members`, each member is printed with its status marker.
    pub(crate) fn scan(
        &self,
        catalog: &mut LoadedCatalog,
        verbose_members: bool,
    ) -> Result<ScanReport, CliError> {
        let packages = find_packages(&self.root)?;
        log::debug!(
            "Found {} packages ({} ignored)",
            packages.packages.len(),
            packages.ignored.len()
        );

        let pb = spinner(self.quiet, "Testing packages");
        let progress = |p: MatchProgress| match p {
            MatchProgress::Package { package } => pb.set_message(package),
            MatchProgress::Member {
                package,
                member,
                outcome,
            } => {
                if verbose_members {
                    pb.suspend(|| print_member(&package, &member, &outcome));
                }
            }
        };
        let report = match_packages(
            &packages,
            &mut catalog.registry,
            &catalog.hash_index,
            &progress,
        );
        pb.finish_and_clear();
        Ok(report)
    }
}

/// One line per tested member: `[+]` matched, `[~]` misnamed, `[-]` unknown.
fn print_member(package: &str, member: &str, outcome: &MemberOutcome) {
    match outcome {
        MemberOutcome::Matched(m) if m.is_misnamed() => log::info!(
            "{} {}/{} should be {}",
            "[~]".if_supports_color(Stdout, |t| t.yellow()),
            package,
            member,
            m.expected_name.if_supports_color(Stdout, |t| t.cyan()),
        ),
        MemberOutcome::Matched(m) => log::info!(
            "{} {}/{} [{}]{}",
            "[+]".if_supports_color(Stdout, |t| t.green()),
            package,
            member,
            m.game_id,
            if m.newly_bound { "" } else { " (duplicate)" },
        ),
        MemberOutcome::Unknown { sha1 } => log::info!(
            "{} {}/{} {}",
            "[-]".if_supports_color(Stdout, |t| t.red()),
            package,
            member,
            sha1.if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
}

/// Print the totals of a library scan.
pub(crate) fn print_scan_report(report: &ScanReport) {
    let m = &report.matches;
    log::info!("{}", "Results".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Tested:     {}", m.tested);
    log::info!(
        "  Matched:    {}",
        m.matched.if_supports_color(Stdout, |t| t.green())
    );
    log::info!(
        "  Misnamed:   {}",
        m.misnamed.if_supports_color(Stdout, |t| t.yellow())
    );
    log::info!(
        "  Unknown:    {}",
        m.unknown.if_supports_color(Stdout, |t| t.red())
    );
    if m.duplicates > 0 {
        log::info!("  Duplicates: {}", m.duplicates);
    }
    if report.ignored_packages > 0 {
        log::info!("  Ignored packages: {}", report.ignored_packages);
    }
    for failure in &report.failed_packages {
        log::warn!("Failed package: {failure}");
    }
}
