//! Locating the catalog inside a library.
//!
//! A library keeps its catalog under `<root>/.db/` as a zip whose name
//! contains `(DB Export)`. The zip holds exactly one XML document.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::catalog::{self, LoadOptions, LoadedCatalog};
use crate::error::CatalogError;

/// Directory under the library root holding the catalog export.
pub const DB_DIR: &str = ".db";

/// Marker in the filename of a catalog export archive.
pub const DB_EXPORT_MARKER: &str = "(DB Export)";

/// Upper bound on buffer preallocation for the catalog document.
const MAX_SIZE_HINT: u64 = 64 * 1024 * 1024;

/// Find the catalog export archive in `db_dir`.
///
/// When several exports are present the one sorting last by name wins,
/// which is the newest for date-stamped exports.
pub fn find_catalog_archive(db_dir: &Path) -> Result<PathBuf, CatalogError> {
    if !db_dir.is_dir() {
        return Err(CatalogError::not_found(format!(
            "{} is not a directory",
            db_dir.display()
        )));
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(db_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_catalog_export(p))
        .collect();
    candidates.sort();

    let Some(chosen) = candidates.pop() else {
        return Err(CatalogError::not_found(format!(
            "no '{DB_EXPORT_MARKER}' zip in {}",
            db_dir.display()
        )));
    };
    if !candidates.is_empty() {
        candidates.push(chosen.clone());
        log::warn!(
            "{} catalog exports in {}, using {}:\n{}",
            candidates.len(),
            db_dir.display(),
            chosen.display(),
            list_file_names(&candidates)
        );
    }
    Ok(chosen)
}

/// One indented filename per line.
fn list_file_names(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| {
            let name = p.file_name().unwrap_or(p.as_os_str());
            format!("  {}", name.to_string_lossy())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_catalog_export(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.contains(DB_EXPORT_MARKER)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// Read the single XML document out of a catalog export archive.
pub fn extract_catalog_xml<R: Read + Seek>(reader: R) -> Result<Vec<u8>, CatalogError> {
    let mut archive = ZipArchive::new(reader)?;
    let xml_members: Vec<String> = archive
        .file_names()
        .filter(|n| n.to_ascii_lowercase().ends_with(".xml"))
        .map(str::to_string)
        .collect();

    let name = match xml_members.as_slice() {
        [only] => only,
        [] => return Err(CatalogError::malformed("catalog archive holds no XML document")),
        many => {
            return Err(CatalogError::malformed(format!(
                "catalog archive holds {} XML documents",
                many.len()
            )));
        }
    };

    let mut member = archive.by_name(name)?;
    // Declared sizes are untrusted
    let hint = member.size().min(MAX_SIZE_HINT) as usize;
    let mut data = Vec::with_capacity(hint);
    member.read_to_end(&mut data)?;
    Ok(data)
}

/// Load the catalog of the library rooted at `root`.
pub fn load_from_library(root: &Path, options: &LoadOptions) -> Result<LoadedCatalog, CatalogError> {
    let archive_path = find_catalog_archive(&root.join(DB_DIR))?;
    log::info!("Loading catalog {}", archive_path.display());
    let file = BufReader::new(File::open(&archive_path)?);
    let xml = extract_catalog_xml(file)?;
    catalog::load(Cursor::new(xml), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_single_xml() {
        let bytes = zip_bytes(&[("readme.txt", b"hi"), ("catalog.xml", b"<games/>")]);
        let xml = extract_catalog_xml(Cursor::new(bytes)).unwrap();
        assert_eq!(xml, b"<games/>");
    }

    #[test]
    fn test_extract_requires_exactly_one_xml() {
        let none = zip_bytes(&[("readme.txt", b"hi")]);
        assert!(matches!(
            extract_catalog_xml(Cursor::new(none)),
            Err(CatalogError::Malformed(_))
        ));

        let two = zip_bytes(&[("a.xml", b"<a/>"), ("b.xml", b"<b/>")]);
        assert!(matches!(
            extract_catalog_xml(Cursor::new(two)),
            Err(CatalogError::Malformed(_))
        ));
    }

    #[test]
    fn test_find_catalog_archive_picks_last() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Sys (DB Export) (20200101).zip"), b"").unwrap();
        std::fs::write(tmp.path().join("Sys (DB Export) (20210101).zip"), b"").unwrap();
        std::fs::write(tmp.path().join("other.zip"), b"").unwrap();

        let found = find_catalog_archive(tmp.path()).unwrap();
        assert_eq!(
            found.file_name().unwrap().to_str().unwrap(),
            "Sys (DB Export) (20210101).zip"
        );
    }

    #[test]
    fn test_list_file_names_names_every_export() {
        let listed = list_file_names(&[
            PathBuf::from("/lib/.db/Sys (DB Export) (20200101).zip"),
            PathBuf::from("/lib/.db/Sys (DB Export) (20210101).zip"),
        ]);
        assert_eq!(
            listed,
            "  Sys (DB Export) (20200101).zip\n  Sys (DB Export) (20210101).zip"
        );
    }

    #[test]
    fn test_find_catalog_archive_missing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_catalog_archive(tmp.path()),
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            find_catalog_archive(&tmp.path().join("nope")),
            Err(CatalogError::NotFound(_))
        ));
    }
}
