//! Package discovery for a library.
//!
//! Every `.zip` under the library root is a package, except those inside
//! the catalog directory. Packages marked `Private` are listed but never
//! tested.

use std::io;
use std::path::{Path, PathBuf};

use romkeeper_dat::{DB_DIR, HashIndex, MatchProgress, MatchReport, Registry, match_package};
use serde::Serialize;

/// Filename marker for packages that are skipped during testing.
pub const PRIVATE_MARKER: &str = "Private";

/// Packages found under a library root, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    pub packages: Vec<PathBuf>,
    /// `Private` packages, counted but never opened
    pub ignored: Vec<PathBuf>,
}

/// Totals for a whole library scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub matches: MatchReport,
    pub ignored_packages: usize,
    /// Packages that could not be opened or read
    pub failed_packages: Vec<String>,
}

/// Recursively collect packages under `root`, skipping the catalog directory.
pub fn find_packages(root: &Path) -> io::Result<PackageSet> {
    let mut zips = Vec::new();
    collect_zips(root, &mut zips)?;
    zips.sort();

    let (ignored, packages): (Vec<PathBuf>, Vec<PathBuf>) =
        zips.into_iter().partition(|p| is_private(p));
    Ok(PackageSet { packages, ignored })
}

fn collect_zips(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() == DB_DIR {
                continue;
            }
            collect_zips(&path, out)?;
        } else if path.is_file() && is_zip(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

fn is_private(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.contains(PRIVATE_MARKER))
        .unwrap_or(false)
}

/// Match every package in `set` against the catalog, in order.
///
/// A package that fails to open is recorded and the scan continues.
pub fn match_packages(
    set: &PackageSet,
    registry: &mut Registry,
    index: &HashIndex,
    progress: &dyn Fn(MatchProgress),
) -> ScanReport {
    let mut report = ScanReport {
        ignored_packages: set.ignored.len(),
        ..Default::default()
    };

    for package in &set.packages {
        match match_package(package, registry, index, progress) {
            Ok(r) => report.matches.absorb(&r),
            Err(e) => {
                log::error!("Failed to test {}: {}", package.display(), e);
                report
                    .failed_packages
                    .push(format!("{}: {}", package.display(), e));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_packages_skips_db_and_private() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join(DB_DIR)).unwrap();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join(DB_DIR).join("Sys (DB Export).zip"), b"").unwrap();
        fs::write(root.join("b.zip"), b"").unwrap();
        fs::write(root.join("sub").join("a.ZIP"), b"").unwrap();
        fs::write(root.join("Sys (Private).zip"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();

        let set = find_packages(root).unwrap();
        assert_eq!(set.packages, vec![root.join("b.zip"), root.join("sub").join("a.ZIP")]);
        assert_eq!(set.ignored, vec![root.join("Sys (Private).zip")]);
    }

    #[test]
    fn test_match_packages_continues_after_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let broken = tmp.path().join("broken.zip");
        fs::write(&broken, b"not a zip").unwrap();

        let set = PackageSet {
            packages: vec![broken, tmp.path().join("missing.zip")],
            ignored: vec![tmp.path().join("x (Private).zip")],
        };
        let mut registry = Registry::new();
        let report = match_packages(&set, &mut registry, &HashIndex::new(), &|_| {});
        assert_eq!(report.failed_packages.len(), 2);
        assert_eq!(report.ignored_packages, 1);
        assert_eq!(report.matches.tested, 0);
    }
}
