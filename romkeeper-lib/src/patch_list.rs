//! Batch patching from a patch-list document.
//!
//! ```xml
//! <patches>
//!   <output>patched</output>
//!   <rom><sha1>…</sha1><patch>fixes/translation.ips</patch></rom>
//! </patches>
//! ```
//!
//! Each listed hash is looked up in the catalog, its bound package member is
//! copied to the output directory under a derived name, and the patch is
//! applied to the copy.

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use romkeeper_core::util::split_extension;
use romkeeper_dat::{HashIndex, Registry};
use serde::Serialize;

use crate::error::ExportError;
use crate::export::extract_member;
use crate::patch::apply_patch_file;

/// One `<rom>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchJob {
    /// Lowercase SHA-1 of the file to patch
    pub sha1: String,
    pub patch: PathBuf,
}

/// A parsed patch list with paths already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchList {
    pub output: PathBuf,
    pub jobs: Vec<PatchJob>,
}

/// Outcome of running a patch list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchListReport {
    /// Patched copies written
    pub patched: Vec<PathBuf>,
    /// Hashes not in the catalog
    pub not_found: Vec<String>,
    /// Hashes in the catalog whose file was never matched to a package
    pub not_bound: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Output,
    Sha1,
    Patch,
}

/// Parse a patch list. Relative paths are resolved against `base_dir`.
pub fn parse_patch_list<R: BufRead>(reader: R, base_dir: &Path) -> Result<PatchList, ExportError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut output: Option<String> = None;
    let mut jobs = Vec::new();
    let mut field: Option<Field> = None;
    let mut rom: Option<(Option<String>, Option<String>)> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"output" => field = Some(Field::Output),
                b"rom" => rom = Some((None, None)),
                b"sha1" => field = Some(Field::Sha1),
                b"patch" => field = Some(Field::Patch),
                _ => {}
            },
            Event::Text(ref e) => {
                let text = e.unescape()?.trim().to_string();
                match (field, rom.as_mut()) {
                    (Some(Field::Output), _) => output = Some(text),
                    (Some(Field::Sha1), Some(r)) => r.0 = Some(text),
                    (Some(Field::Patch), Some(r)) => r.1 = Some(text),
                    _ => {}
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"rom" => {
                    if let Some((sha1, patch)) = rom.take() {
                        let sha1 = sha1.ok_or_else(|| ExportError::patch_list("<rom> without <sha1>"))?;
                        let patch =
                            patch.ok_or_else(|| ExportError::patch_list("<rom> without <patch>"))?;
                        jobs.push(PatchJob {
                            sha1: sha1.to_lowercase(),
                            patch: resolve(base_dir, &patch),
                        });
                    }
                }
                _ => field = None,
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let output = output.ok_or_else(|| ExportError::patch_list("missing <output>"))?;
    Ok(PatchList {
        output: resolve(base_dir, &output),
        jobs,
    })
}

/// Read and parse a patch list file.
pub fn load_patch_list(path: &Path) -> Result<PatchList, ExportError> {
    let data = fs::read(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    parse_patch_list(data.as_slice(), base_dir)
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Name of a patched copy: `Stem (PatchStem).ext`.
pub fn patched_file_name(expected_name: &str, patch: &Path) -> String {
    let (stem, ext) = split_extension(expected_name);
    let patch_name = patch
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (patch_stem, _) = split_extension(&patch_name);
    format!("{stem} ({patch_stem}){ext}")
}

/// Run every job in `list`. A failing job never stops the others.
pub fn run_patch_list(list: &PatchList, registry: &Registry, index: &HashIndex) -> PatchListReport {
    let mut report = PatchListReport::default();

    for job in &list.jobs {
        let Some(game_id) = index.get(&job.sha1).and_then(|ids| ids.first()) else {
            log::warn!("Not found: {}", job.sha1);
            report.not_found.push(job.sha1.clone());
            continue;
        };
        let Some(file) = registry.get(game_id).and_then(|g| g.file(&job.sha1)) else {
            report.not_found.push(job.sha1.clone());
            continue;
        };
        let Some(location) = file.location.as_ref() else {
            log::warn!("Not in any package: {} ({})", file.expected_name, job.sha1);
            report.not_bound.push(job.sha1.clone());
            continue;
        };

        let dest = list
            .output
            .join(patched_file_name(&file.expected_name, &job.patch));
        log::info!("Patching: {}", dest.display());

        let result = extract_member(location, &dest)
            .and_then(|_| apply_patch_file(&job.patch, &dest).map_err(ExportError::from));
        match result {
            Ok(_) => report.patched.push(dest),
            Err(e) => {
                log::error!("Failed to patch {}: {}", dest.display(), e);
                report
                    .failed
                    .push(format!("{} with {}: {}", dest.display(), job.patch.display(), e));
            }
        }
    }

    report
}

#[cfg(test)]
#[path = "tests/patch_list_tests.rs"]
mod tests;
