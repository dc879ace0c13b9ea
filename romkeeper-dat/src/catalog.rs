use std::collections::{BTreeSet, HashMap};
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use romkeeper_core::{License, parse_region_list};

use crate::error::CatalogError;
use crate::registry::{FileRecord, GameRecord, HashIndex, MergedValue, ParentRef, Registry};

/// File format the catalog uses for header-stripped dumps.
pub const HEADERLESS_FORMAT: &str = "Headerless";

/// `rominfo` value marking a bad dump.
pub const BAD_DUMP: &str = "Bad";

/// Filters and name rewriting applied while loading a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Literal prefix removed from the front of every display name
    pub skip_common_prefix: Option<String>,
    /// Drop records that are not Licensed
    pub exclude_unlicensed: bool,
    /// Drop BIOS records
    pub exclude_bios: bool,
    /// Keep `Headerless` file entries (dropped by default)
    pub include_headerless: bool,
    /// Drop file entries flagged as bad dumps
    pub exclude_bad_dumps: bool,
}

/// Non-fatal findings collected while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Clone references to missing records, reset to root
    pub orphan_clones: usize,
    /// Clone records that themselves have clones
    pub nested_clone_parents: usize,
    /// Merges where listings disagreed on the file format
    pub format_conflicts: usize,
    /// Merges where listings disagreed on dump quality
    pub quality_conflicts: usize,
    /// File entries whose name was forced by the catalog
    pub forced_names: usize,
}

/// A fully loaded catalog.
#[derive(Debug, Clone, Default)]
pub struct LoadedCatalog {
    pub registry: Registry,
    pub hash_index: HashIndex,
    pub report: LoadReport,
}

impl LoadedCatalog {
    pub fn orphan_clones(&self) -> usize {
        self.report.orphan_clones
    }
}

// ---------------------------------------------------------------------------
// Raw document model
// ---------------------------------------------------------------------------

/// Attributes of one element, unescaped.
#[derive(Debug, Clone, Default)]
struct Attributes(HashMap<String, String>);

impl Attributes {
    fn read(e: &BytesStart<'_>) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            map.insert(key, value);
        }
        Ok(Self(map))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn require(&self, key: &str, element: &str, owner: &str) -> Result<&str, CatalogError> {
        self.get(key).ok_or_else(|| {
            CatalogError::malformed(format!("<{element}> in '{owner}' has no '{key}' attribute"))
        })
    }
}

/// A `<source>` or `<release>` grouping.
#[derive(Debug, Default)]
struct RawListing {
    details: Option<Attributes>,
    files: Vec<Attributes>,
}

#[derive(Debug, Default)]
struct RawGame {
    name: String,
    archives: Vec<Attributes>,
    sources: Vec<RawListing>,
    releases: Vec<RawListing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingKind {
    Source,
    Release,
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load a catalog document into a registry and hash index.
///
/// Games are ingested as soon as their element closes, so registry order is
/// document order. Clones are linked to their parents once the whole
/// document has been read.
pub fn load<R: BufRead>(reader: R, options: &LoadOptions) -> Result<LoadedCatalog, CatalogError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut catalog = LoadedCatalog::default();
    let mut saw_root = false;

    let mut current_game: Option<RawGame> = None;
    let mut current_listing: Option<(ListingKind, RawListing)> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                saw_root = true;
                match e.name().as_ref() {
                    b"game" => {
                        let attrs = Attributes::read(e)?;
                        let name = attrs.require("name", "game", "document")?.to_string();
                        current_game = Some(RawGame {
                            name,
                            ..Default::default()
                        });
                    }
                    b"source" if current_game.is_some() => {
                        current_listing = Some((ListingKind::Source, RawListing::default()));
                    }
                    b"release" if current_game.is_some() => {
                        current_listing = Some((ListingKind::Release, RawListing::default()));
                    }
                    other => collect_leaf(other, e, &mut current_game, &mut current_listing)?,
                }
            }
            Event::Empty(ref e) => {
                saw_root = true;
                collect_leaf(e.name().as_ref(), e, &mut current_game, &mut current_listing)?;
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"source" | b"release" => {
                    if let (Some(game), Some((kind, listing))) =
                        (current_game.as_mut(), current_listing.take())
                    {
                        match kind {
                            ListingKind::Source => game.sources.push(listing),
                            ListingKind::Release => game.releases.push(listing),
                        }
                    }
                }
                b"game" => {
                    if let Some(game) = current_game.take() {
                        ingest_game(game, options, &mut catalog)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(CatalogError::malformed("document has no elements"));
    }

    let links = catalog.registry.link_clones();
    catalog.report.orphan_clones = links.orphan_clones;
    catalog.report.nested_clone_parents = links.nested_clone_parents;

    log::debug!(
        "Loaded {} games, {} distinct hashes",
        catalog.registry.len(),
        catalog.hash_index.len()
    );
    Ok(catalog)
}

/// Record `<archive>`, `<details>` and `<file>` elements wherever they sit.
fn collect_leaf(
    tag: &[u8],
    e: &BytesStart<'_>,
    game: &mut Option<RawGame>,
    listing: &mut Option<(ListingKind, RawListing)>,
) -> Result<(), CatalogError> {
    match tag {
        b"archive" => {
            if let Some(game) = game.as_mut() {
                game.archives.push(Attributes::read(e)?);
            }
        }
        b"details" => {
            if let Some((_, listing)) = listing.as_mut() {
                listing.details = Some(Attributes::read(e)?);
            }
        }
        b"file" => {
            if let Some((_, listing)) = listing.as_mut() {
                listing.files.push(Attributes::read(e)?);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Turn one `<game>` element into registry records.
fn ingest_game(
    raw: RawGame,
    options: &LoadOptions,
    catalog: &mut LoadedCatalog,
) -> Result<(), CatalogError> {
    let name = match options.skip_common_prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => raw
            .name
            .strip_prefix(prefix)
            .unwrap_or(raw.name.as_str())
            .to_string(),
        _ => raw.name.clone(),
    };

    for archive in &raw.archives {
        let id = archive.require("number", "archive", &name)?.to_string();

        if !catalog.registry.contains(&id) {
            match build_game(&id, &name, archive, options)? {
                Some(game) => {
                    catalog.registry.insert(game);
                }
                None => continue,
            }
        }

        for listing in raw.sources.iter().chain(raw.releases.iter()) {
            for file in &listing.files {
                let Some(record) = build_file(&name, listing, file, options, &mut catalog.report)?
                else {
                    continue;
                };
                let sha1 = record.sha1.clone();
                let Some(game) = catalog.registry.get_mut(&id) else {
                    continue;
                };
                if let Some(outcome) = game.add_file(record) {
                    if outcome.format_conflict {
                        catalog.report.format_conflicts += 1;
                        log::warn!(
                            "Inconsistent file format in '[{}] {}': {}",
                            id,
                            name,
                            game.file(&sha1).map(|f| f.format.to_string()).unwrap_or_default()
                        );
                    }
                    if outcome.quality_conflict {
                        catalog.report.quality_conflicts += 1;
                        log::warn!(
                            "Inconsistent rominfo in '[{}] {}': {}",
                            id,
                            name,
                            game.file(&sha1)
                                .and_then(|f| f.quality.as_ref())
                                .map(|q| q.to_string())
                                .unwrap_or_default()
                        );
                    }
                }
                catalog.hash_index.insert(&sha1, &id);
            }
        }
    }
    Ok(())
}

/// Build a game record from its `<archive>` attributes, or `None` if the
/// options filter it out.
fn build_game(
    id: &str,
    name: &str,
    archive: &Attributes,
    options: &LoadOptions,
) -> Result<Option<GameRecord>, CatalogError> {
    let license = License::from_code(archive.get("licensed"))
        .map_err(|e| CatalogError::malformed(format!("[{id}] {name}: {e}")))?;
    if options.exclude_unlicensed && !license.is_licensed() {
        return Ok(None);
    }
    let bios = archive.get("bios") == Some("1");
    if bios && options.exclude_bios {
        return Ok(None);
    }

    let regions = parse_region_list(archive.require("region", "archive", name)?);
    let languages = archive
        .require("languages", "archive", name)?
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Some(GameRecord {
        id: id.to_string(),
        name: name.to_string(),
        archive_name: archive.get("name").map(str::to_string),
        license,
        regions,
        languages,
        dev_status: archive.get("devstatus").map(str::to_string),
        bios,
        version1: archive.get("version1").map(str::to_string),
        version2: archive.get("version2").map(str::to_string),
        parent: ParentRef::from_clone_attr(archive.get("clone")),
        clones: Vec::new(),
        files: Vec::new(),
    }))
}

/// Build a file record from a `<file>` entry and its listing's details, or
/// `None` if the options filter it out.
fn build_file(
    game_name: &str,
    listing: &RawListing,
    file: &Attributes,
    options: &LoadOptions,
    report: &mut LoadReport,
) -> Result<Option<FileRecord>, CatalogError> {
    let format = file.require("format", "file", game_name)?;
    let size_str = file.require("size", "file", game_name)?;
    let size: u64 = size_str.trim().parse().map_err(|_| {
        CatalogError::malformed(format!("Invalid file size in '{game_name}': {size_str}"))
    })?;

    if format == HEADERLESS_FORMAT && !options.include_headerless {
        return Ok(None);
    }

    let sha1 = file.require("sha1", "file", game_name)?.trim().to_lowercase();
    let details = listing
        .details
        .as_ref()
        .ok_or_else(|| CatalogError::missing_details(game_name))?;

    let rominfo = details.get("rominfo").filter(|r| !r.is_empty());
    if options.exclude_bad_dumps && rominfo == Some(BAD_DUMP) {
        return Ok(None);
    }

    let expected_name = match file.get("forcename").filter(|n| !n.is_empty()) {
        Some(forced) => {
            log::debug!("Forced file name: {forced}");
            report.forced_names += 1;
            forced.to_string()
        }
        None => expected_file_name(game_name, file.get("item"), file.get("extension")),
    };

    let sections: BTreeSet<String> = details
        .get("section")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .into_iter()
        .collect();

    Ok(Some(FileRecord {
        sha1,
        format: MergedValue::new(format),
        expected_name,
        size,
        regions: parse_region_list(details.get("region").unwrap_or_default()),
        sections,
        quality: rominfo.map(MergedValue::new),
        location: None,
    }))
}

/// Canonical filename: `Name (item).ext`, each part optional.
pub fn expected_file_name(game_name: &str, item: Option<&str>, extension: Option<&str>) -> String {
    let mut name = game_name.to_string();
    if let Some(item) = item {
        name = format!("{name} ({item})");
    }
    if let Some(ext) = extension {
        name = format!("{name}.{ext}");
    }
    name
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
