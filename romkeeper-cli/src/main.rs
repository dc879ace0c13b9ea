//! romkeeper CLI
//!
//! Checks ROM packages against a curated catalog, exports matched files
//! into a sorted layout and applies IPS patches.

mod cli_types;
mod commands;
mod error;
mod logger;
mod spinner;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
use commands::Session;
pub(crate) use error::CliError;

/// Log an empty line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{e}");
        log::logger().flush();
        std::process::exit(1);
    }
    log::logger().flush();
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Settings are read only by commands that work on a library
    let session = || Session::new(cli.root.clone(), &cli.catalog, cli.quiet);

    match cli.command {
        Commands::Summary { json } => commands::summary::run_summary(&session(), json),
        Commands::List => commands::list::run_list(&session()),
        Commands::Show { ids } => commands::show::run_show(&session(), &ids),
        Commands::Test { json } => commands::test::run_test(&session(), json),
        Commands::Export {
            dir,
            split,
            dry_run,
            yes,
        } => commands::export::run_export(&session(), &dir, &split, dry_run, yes),
        Commands::Patch { list } => commands::patch::run_patch(&session(), &list),
        Commands::ApplyPatch { patch, target } => commands::patch::run_apply_patch(&patch, &target),
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::SetRoot { path } => commands::config::run_config_set_root(&path),
            ConfigAction::ClearRoot => commands::config::run_config_clear_root(),
        },
    }
}
