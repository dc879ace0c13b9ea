pub mod error;
pub mod export;
pub mod patch;
pub mod patch_list;
pub mod scanner;
pub mod settings;

pub use error::{ExportError, PatchError};
pub use export::{
    ExportEntry, ExportPlan, ExportPolicy, ExportProgress, ExportSummary, execute_export, export,
    plan_export, prepare_export_root,
};
pub use patch::{IPS_MAGIC, PatchStats, PatchTarget, apply_patch, apply_patch_file};
pub use patch_list::{PatchList, PatchListReport, load_patch_list, run_patch_list};
pub use scanner::{PackageSet, ScanReport, find_packages, match_packages};
pub use settings::{Settings, load_settings, resolve_library_path, settings_path};
