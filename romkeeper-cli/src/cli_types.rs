//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use romkeeper_dat::LoadOptions;
use romkeeper_lib::ExportPolicy;

#[derive(Parser)]
#[command(name = "romkeeper")]
#[command(about = "Check, export and patch ROM packages against a curated catalog", long_about = None)]
pub(crate) struct Cli {
    /// Library root holding `.db/` and the ROM packages (defaults to current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(flatten)]
    pub catalog: CatalogFilterArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filters applied while loading the catalog.
#[derive(Args, Clone, Default)]
pub(crate) struct CatalogFilterArgs {
    /// Skip games that are not licensed
    #[arg(long, global = true)]
    pub no_unlicensed: bool,

    /// Skip BIOS entries
    #[arg(long, global = true)]
    pub no_bios: bool,

    /// Include headerless ROM entries
    #[arg(long, global = true)]
    pub with_headerless: bool,

    /// Skip ROMs flagged as bad dumps
    #[arg(long, global = true)]
    pub no_bad_roms: bool,

    /// Strip this prefix from every game name
    #[arg(long, global = true)]
    pub skip_common_prefix: Option<String>,
}

impl CatalogFilterArgs {
    /// Flags switch options on; they never switch configured ones off.
    pub fn apply(&self, options: &mut LoadOptions) {
        options.exclude_unlicensed |= self.no_unlicensed;
        options.exclude_bios |= self.no_bios;
        options.include_headerless |= self.with_headerless;
        options.exclude_bad_dumps |= self.no_bad_roms;
        if let Some(prefix) = &self.skip_common_prefix {
            options.skip_common_prefix = Some(prefix.clone());
        }
    }
}

/// Directory layout of an export.
#[derive(Args, Clone, Default)]
pub(crate) struct ExportSplitArgs {
    /// Put BIOS files in their own directory
    #[arg(long)]
    pub split_bioses: bool,

    /// Split into Licensed/ and Unlicensed/
    #[arg(long)]
    pub split_by_license: bool,

    /// Split into Small/ and Large/ at 32 MiB
    #[arg(long, alias = "split-by-size-32mb")]
    pub split_by_size: bool,

    /// Split by main region (USA, Japan, Europe, rest of world)
    #[arg(long, alias = "split-by-main-reg")]
    pub split_by_main_region: bool,

    /// Split by first letter of the file name
    #[arg(long)]
    pub split_by_abc: bool,
}

impl ExportSplitArgs {
    pub fn apply(&self, policy: &mut ExportPolicy) {
        policy.split_bioses |= self.split_bioses;
        policy.split_by_license |= self.split_by_license;
        policy.split_by_size |= self.split_by_size;
        policy.split_by_main_region |= self.split_by_main_region;
        policy.split_by_abc |= self.split_by_abc;
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print catalog counts per region and language
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List unique titles with their clones
    List,

    /// Print every catalog record with its files
    Show {
        /// Only show these catalog ids
        ids: Vec<String>,
    },

    /// Test every package in the library against the catalog
    Test {
        /// Print the totals as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export matched ROMs to a directory
    Export {
        /// Destination directory (cleared first if not empty)
        dir: PathBuf,

        #[command(flatten)]
        split: ExportSplitArgs,

        /// Show the export plan without copying anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Do not ask before clearing a non-empty destination
        #[arg(short, long)]
        yes: bool,
    },

    /// Export and patch the ROMs listed in a patch-list file
    Patch {
        /// Patch-list XML file
        list: PathBuf,
    },

    /// Apply an IPS patch to a file in place
    ApplyPatch {
        /// IPS patch file
        patch: PathBuf,

        /// File to modify
        target: PathBuf,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the current settings
    Show,

    /// Print the settings file path
    Path,

    /// Save a default library root
    SetRoot {
        /// Library root directory
        path: PathBuf,
    },

    /// Forget the saved library root
    ClearRoot,
}
