use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use romkeeper_core::{License, main_region, rest_of_world_label};
use romkeeper_dat::hasher;
use romkeeper_dat::{GameRecord, MemberLocation, Registry};
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::error::ExportError;

/// Files larger than this go to the `Large` bucket when splitting by size.
pub const LARGE_FILE_THRESHOLD: u64 = 32 * 1024 * 1024;

pub const BIOS_DIR: &str = "BIOS";
pub const LARGE_DIR: &str = "Large";
pub const SMALL_DIR: &str = "Small";
/// Alphabetic bucket for names whose first alphanumeric character is a digit
pub const DIGITS_DIR: &str = "0-9";
/// Alphabetic bucket for names without any alphanumeric character
pub const OTHER_DIR: &str = "-";

/// Which directory rules shape the export layout.
///
/// Rules apply in a fixed order, each adding one path segment:
/// BIOS, license, size, main region, first letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPolicy {
    /// BIOS files go to `BIOS/` and skip every other rule
    pub split_bioses: bool,
    /// `Licensed/` or `Unlicensed/`
    pub split_by_license: bool,
    /// `Small/` or `Large/` around [`LARGE_FILE_THRESHOLD`]
    pub split_by_size: bool,
    /// `USA/`, `Japan/`, `Europe/` or the rest-of-world label
    pub split_by_main_region: bool,
    /// First letter of the filename, `0-9` or `-`
    pub split_by_abc: bool,
}

impl ExportPolicy {
    /// True if no rule is enabled and everything lands in the export root.
    pub fn is_flat(&self) -> bool {
        *self == Self::default()
    }
}

/// One file to copy out of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportEntry {
    /// Target directory relative to the export root
    pub target_dir: PathBuf,
    pub target_name: String,
    pub game_id: String,
    pub sha1: String,
    pub size: u64,
    pub source: MemberLocation,
}

impl ExportEntry {
    pub fn relative_path(&self) -> PathBuf {
        self.target_dir.join(&self.target_name)
    }
}

/// The full, ordered export plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportPlan {
    /// Label used for games outside every priority region
    pub rest_of_world: String,
    /// Sorted by target directory, then case-insensitively by filename
    pub entries: Vec<ExportEntry>,
}

impl ExportPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary of an export run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    /// Files copied
    pub exported: usize,
    /// Destinations that already held identical content
    pub already_present: usize,
    /// Destinations that already held different content
    pub collisions: Vec<String>,
    pub failures: Vec<String>,
}

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum ExportProgress {
    /// About to copy one planned file
    Copying {
        target: PathBuf,
        index: usize,
        total: usize,
    },
    /// Every planned file has been handled
    Done,
}

/// Compute where every matched file goes. Touches nothing on disk.
pub fn plan_export(registry: &Registry, policy: &ExportPolicy) -> ExportPlan {
    let rest_of_world = if policy.split_by_main_region {
        rest_of_world_label(
            registry
                .iter()
                .filter(|g| g.files.iter().any(|f| f.is_bound()))
                .flat_map(|g| g.regions.iter().map(String::as_str)),
        )
    } else {
        romkeeper_core::DEFAULT_REST_OF_WORLD.to_string()
    };

    let mut entries: Vec<ExportEntry> = registry
        .bound_files()
        .filter_map(|(game, file)| {
            let source = file.location.clone()?;
            Some(ExportEntry {
                target_dir: target_dir(game, file.size, &file.expected_name, policy, &rest_of_world),
                target_name: file.expected_name.clone(),
                game_id: game.id.clone(),
                sha1: file.sha1.clone(),
                size: file.size,
                source,
            })
        })
        .collect();

    entries.sort_by_cached_key(|e| {
        (
            e.target_dir.to_string_lossy().into_owned(),
            e.target_name.to_lowercase(),
        )
    });

    ExportPlan {
        rest_of_world,
        entries,
    }
}

/// Relative directory for one file under `policy`.
fn target_dir(
    game: &GameRecord,
    size: u64,
    file_name: &str,
    policy: &ExportPolicy,
    rest_of_world: &str,
) -> PathBuf {
    let mut dir = PathBuf::new();
    if policy.split_bioses && game.bios {
        dir.push(BIOS_DIR);
        return dir;
    }

    if policy.split_by_license {
        dir.push(license_dir(game.license));
    }

    if policy.split_by_size {
        if size > LARGE_FILE_THRESHOLD {
            if policy.split_by_main_region {
                dir.push(main_region(&game.regions, rest_of_world));
            } else {
                dir.push(LARGE_DIR);
            }
        } else {
            dir.push(SMALL_DIR);
        }
    } else if policy.split_by_main_region && game.license.is_licensed() {
        dir.push(main_region(&game.regions, rest_of_world));
    }

    if policy.split_by_abc {
        dir.push(abc_bucket(file_name));
    }
    dir
}

fn license_dir(license: License) -> &'static str {
    if license.is_licensed() {
        License::Licensed.name()
    } else {
        License::Unlicensed.name()
    }
}

/// Alphabetic bucket for a filename: the first alphanumeric character
/// decides.
pub fn abc_bucket(file_name: &str) -> String {
    for c in file_name.chars() {
        if c.is_alphabetic() {
            return c.to_uppercase().collect();
        }
        if c.is_numeric() {
            return DIGITS_DIR.to_string();
        }
    }
    OTHER_DIR.to_string()
}

/// Make sure `root` exists and is empty. Returns true if existing content
/// was removed.
pub fn prepare_export_root(root: &Path) -> io::Result<bool> {
    if root.is_dir() {
        if fs::read_dir(root)?.next().is_none() {
            return Ok(false);
        }
        log::warn!("Clearing export directory {}", root.display());
        fs::remove_dir_all(root)?;
        fs::create_dir_all(root)?;
        return Ok(true);
    }
    fs::create_dir_all(root)?;
    Ok(false)
}

/// Copy one zip member to `dest`, creating parent directories.
pub fn extract_member(location: &MemberLocation, dest: &Path) -> Result<u64, ExportError> {
    let file = BufReader::new(File::open(&location.package_path)?);
    let mut archive = ZipArchive::new(file)?;
    copy_from_archive(&mut archive, &location.member_name, dest)
}

fn copy_from_archive<R: io::Read + io::Seek>(
    archive: &mut ZipArchive<R>,
    member_name: &str,
    dest: &Path,
) -> Result<u64, ExportError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut member = archive.by_name(member_name)?;
    let mut out = File::create(dest)?;
    Ok(io::copy(&mut member, &mut out)?)
}

/// Copy every planned file under `root`, in plan order.
///
/// Existing destinations are never overwritten: identical content counts
/// as already present, anything else is reported as a collision.
pub fn execute_export(
    plan: &ExportPlan,
    root: &Path,
    progress: &dyn Fn(ExportProgress),
) -> ExportSummary {
    let mut summary = ExportSummary::default();
    // Consecutive entries often come from the same package
    let mut open: Option<(PathBuf, ZipArchive<BufReader<File>>)> = None;
    let total = plan.len();

    for (index, entry) in plan.entries.iter().enumerate() {
        let dest = root.join(entry.relative_path());
        progress(ExportProgress::Copying {
            target: dest.clone(),
            index,
            total,
        });

        if dest.exists() {
            match hasher::compute_file_sha1(&dest) {
                Ok(sha1) if sha1 == entry.sha1 => summary.already_present += 1,
                Ok(_) => {
                    log::warn!("Collision: {} exists with different content", dest.display());
                    summary
                        .collisions
                        .push(format!("{} exists with different content", dest.display()));
                }
                Err(e) => summary
                    .failures
                    .push(format!("Failed to read {}: {}", dest.display(), e)),
            }
            continue;
        }

        let package = &entry.source.package_path;
        if open.as_ref().is_none_or(|(p, _)| p != package) {
            let opened = File::open(package)
                .map_err(ExportError::from)
                .and_then(|f| Ok(ZipArchive::new(BufReader::new(f))?));
            match opened {
                Ok(archive) => open = Some((package.clone(), archive)),
                Err(e) => {
                    open = None;
                    summary
                        .failures
                        .push(format!("Failed to open {}: {}", package.display(), e));
                    continue;
                }
            }
        }
        let Some((_, archive)) = open.as_mut() else {
            continue;
        };

        match copy_from_archive(archive, &entry.source.member_name, &dest) {
            Ok(_) => {
                log::debug!("Export: {}", dest.display());
                summary.exported += 1;
            }
            Err(e) => summary.failures.push(format!(
                "Failed to export {}/{} -> {}: {}",
                package.display(),
                entry.source.member_name,
                dest.display(),
                e
            )),
        }
    }

    progress(ExportProgress::Done);
    summary
}

/// Clear `root`, plan, and copy every matched file.
pub fn export(
    registry: &Registry,
    root: &Path,
    policy: &ExportPolicy,
    progress: &dyn Fn(ExportProgress),
) -> Result<ExportSummary, ExportError> {
    prepare_export_root(root)?;
    let plan = plan_export(registry, policy);
    log::debug!(
        "Export plan: {} files, rest of world is '{}'",
        plan.len(),
        plan.rest_of_world
    );
    Ok(execute_export(&plan, root, progress))
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
