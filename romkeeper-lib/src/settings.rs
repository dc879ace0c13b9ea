//! Application settings (library path, catalog filters, export layout).
//!
//! The settings file is always `<config dir>/romkeeper/settings.toml`.
//! Every section and key is optional.

use std::io;
use std::path::{Path, PathBuf};

use romkeeper_dat::LoadOptions;
use serde::{Deserialize, Serialize};

use crate::export::ExportPolicy;

/// `[library]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    pub root: Option<PathBuf>,
}

/// The whole settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub catalog: LoadOptions,
    pub export: ExportPolicy,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Canonical path to the settings file: `~/.config/romkeeper/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("romkeeper").join("settings.toml")
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> io::Result<Settings> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => return Err(e),
    };
    Settings::from_toml(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Load the shared settings file, falling back to defaults if it cannot be
/// read.
pub fn load_settings() -> Settings {
    let path = settings_path();
    load_settings_from(&path).unwrap_or_else(|e| {
        log::warn!("Ignoring settings file {}: {}", path.display(), e);
        Settings::default()
    })
}

/// Resolve the library root path using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. `library.root` from the settings
/// 3. Current working directory
pub fn resolve_library_path(cli_override: Option<PathBuf>, settings: &Settings) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Some(p) = settings.library.root.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        return p.clone();
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Parse the settings file as a raw TOML table. Missing or unreadable
/// files give an empty table so unrelated keys can still be written.
fn read_table(path: &Path) -> toml::Table {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|contents| contents.parse::<toml::Table>().ok())
        .unwrap_or_default()
}

/// Replace `path` with `table`, going through a sibling temp file.
fn write_table(path: &Path, table: &toml::Table) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let text = toml::to_string_pretty(table).map_err(io::Error::other)?;
    let staged = path.with_extension("toml.tmp");
    std::fs::write(&staged, text)?;
    std::fs::rename(&staged, path)
}

/// Set or remove `library.root` in the settings file at `settings`,
/// leaving every other key as written.
pub fn save_library_path_to(settings: &Path, root: Option<&Path>) -> io::Result<()> {
    let mut table = read_table(settings);
    let library = match table
        .entry("library")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
    {
        toml::Value::Table(library) => library,
        _ => return Err(io::Error::other("`library` in settings is not a table")),
    };

    if let Some(root) = root {
        library.insert(
            "root".into(),
            toml::Value::String(root.to_string_lossy().into_owned()),
        );
    } else {
        library.remove("root");
    }
    write_table(settings, &table)
}

/// [`save_library_path_to`] on the shared settings file.
pub fn save_library_path(root: Option<&Path>) -> io::Result<()> {
    save_library_path_to(&settings_path(), root)
}

/// Normalized TOML text of the settings file at `path`, or `None` if it is
/// missing or not valid TOML.
pub fn settings_text(path: &Path) -> Option<String> {
    let table = std::fs::read_to_string(path).ok()?.parse::<toml::Table>().ok()?;
    toml::to_string_pretty(&table).ok()
}
