use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use romkeeper_core::License;
use serde::Serialize;

/// Parent reference of a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParentRef {
    /// The record is itself a root title.
    Root,
    /// The record is a clone of the game with this catalog id.
    Game(String),
}

impl ParentRef {
    /// Interpret the catalog's `clone` attribute.
    ///
    /// Absent, or the `P` marker, means the record is a root.
    pub fn from_clone_attr(clone: Option<&str>) -> Self {
        match clone.map(str::trim) {
            None => Self::Root,
            Some(c) if c.is_empty() || c.eq_ignore_ascii_case("p") => Self::Root,
            Some(c) => Self::Game(c.to_string()),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn game_id(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Game(id) => Some(id),
        }
    }
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "ROOT"),
            Self::Game(id) => write!(f, "{id}"),
        }
    }
}

/// A string attribute merged from several source listings.
///
/// Listings that agree keep a single value; disagreeing listings are all
/// retained and rendered joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MergedValue {
    Consistent(String),
    Conflicting(Vec<String>),
}

impl MergedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self::Consistent(value.into())
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Consistent(v) => vec![v.as_str()],
            Self::Conflicting(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Consistent(v) => v == value,
            Self::Conflicting(vs) => vs.iter().any(|v| v == value),
        }
    }

    pub fn is_conflicting(&self) -> bool {
        matches!(self, Self::Conflicting(_))
    }

    /// Fold another listing's value in. Returns true if it disagreed with
    /// every value seen so far.
    pub fn merge(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        match self {
            Self::Consistent(v) => {
                *self = Self::Conflicting(vec![std::mem::take(v), value.to_string()]);
            }
            Self::Conflicting(vs) => vs.push(value.to_string()),
        }
        true
    }
}

impl std::fmt::Display for MergedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consistent(v) => write!(f, "{v}"),
            Self::Conflicting(vs) => write!(f, "{}", vs.join("/")),
        }
    }
}

/// Where a matched file physically lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLocation {
    /// Path of the zip package holding the file
    pub package_path: PathBuf,
    /// Full member name inside the package
    pub member_name: String,
}

/// What happened when one listing was merged into an existing file record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub format_conflict: bool,
    pub quality_conflict: bool,
}

/// An expected file of a catalog game, keyed by SHA-1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// SHA-1 (lowercase hex)
    pub sha1: String,
    pub format: MergedValue,
    /// Canonical filename the file should carry
    pub expected_name: String,
    pub size: u64,
    pub regions: BTreeSet<String>,
    pub sections: BTreeSet<String>,
    /// Dump quality note from the catalog (e.g. "Bad")
    pub quality: Option<MergedValue>,
    /// Set once the file has been found in a package
    pub location: Option<MemberLocation>,
}

impl FileRecord {
    pub fn is_bound(&self) -> bool {
        self.location.is_some()
    }

    /// Record the file's physical location. The first binding wins; returns
    /// false if the record was already bound.
    pub fn bind(&mut self, location: MemberLocation) -> bool {
        if self.location.is_some() {
            return false;
        }
        self.location = Some(location);
        true
    }

    /// Merge another listing of the same hash into this record.
    pub fn merge(&mut self, other: FileRecord) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for format in other.format.values() {
            outcome.format_conflict |= self.format.merge(format);
        }
        self.regions.extend(other.regions);
        self.sections.extend(other.sections);
        if let Some(q) = other.quality {
            if let Some(existing) = self.quality.as_mut() {
                for value in q.values() {
                    outcome.quality_conflict |= existing.merge(value);
                }
            } else {
                self.quality = Some(q);
            }
        }
        outcome
    }
}

/// A canonical catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    /// Catalog id (the archive number)
    pub id: String,
    /// Display name of the title this record belongs to
    pub name: String,
    /// Archive-level name, if the catalog provides one
    pub archive_name: Option<String>,
    pub license: License,
    pub regions: BTreeSet<String>,
    pub languages: Vec<String>,
    pub dev_status: Option<String>,
    pub bios: bool,
    pub version1: Option<String>,
    pub version2: Option<String>,
    pub parent: ParentRef,
    /// Ids of clones, in the order they were linked
    pub clones: Vec<String>,
    /// Expected files, in catalog order; SHA-1 keys are unique
    pub files: Vec<FileRecord>,
}

impl GameRecord {
    pub fn file(&self, sha1: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.sha1 == sha1)
    }

    pub fn file_mut(&mut self, sha1: &str) -> Option<&mut FileRecord> {
        self.files.iter_mut().find(|f| f.sha1 == sha1)
    }

    /// Add a file listing, merging into an existing record with the same hash.
    /// Returns `None` when the hash was new.
    pub fn add_file(&mut self, file: FileRecord) -> Option<MergeOutcome> {
        match self.file_mut(&file.sha1) {
            Some(existing) => Some(existing.merge(file)),
            None => {
                self.files.push(file);
                None
            }
        }
    }
}

/// Counts from linking clones to their parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CloneLinkReport {
    /// Parent references that pointed nowhere and were reset to root
    pub orphan_clones: usize,
    /// Links made to a parent that is itself a clone
    pub nested_clone_parents: usize,
}

/// Arena of catalog records in document order, addressable by id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    games: Vec<GameRecord>,
    by_id: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns false (and leaves the registry untouched)
    /// if the id is already present.
    pub fn insert(&mut self, game: GameRecord) -> bool {
        if self.by_id.contains_key(&game.id) {
            return false;
        }
        self.by_id.insert(game.id.clone(), self.games.len());
        self.games.push(game);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.by_id.get(id).map(|&i| &self.games[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut GameRecord> {
        self.by_id.get(id).map(|&i| &mut self.games[i])
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameRecord> {
        self.games.iter_mut()
    }

    /// Root titles, in document order.
    pub fn roots(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.iter().filter(|g| g.parent.is_root())
    }

    /// Every file already bound to a package member, with its game.
    pub fn bound_files(&self) -> impl Iterator<Item = (&GameRecord, &FileRecord)> {
        self.games
            .iter()
            .flat_map(|g| g.files.iter().map(move |f| (g, f)))
            .filter(|(_, f)| f.is_bound())
    }

    /// Depth-first listing of every root and its clones as `(depth, id)`.
    pub fn clone_tree(&self) -> Vec<(usize, &str)> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        for root in self.roots() {
            let mut stack = vec![(0usize, root.id.as_str())];
            while let Some((depth, id)) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                out.push((depth, id));
                if let Some(game) = self.get(id) {
                    for clone in game.clones.iter().rev() {
                        stack.push((depth + 1, clone.as_str()));
                    }
                }
            }
        }
        out
    }

    /// Attach every clone to its parent's clone list.
    ///
    /// Walks records in document order. A parent id that does not exist is
    /// reset to [`ParentRef::Root`]; a parent that is itself a clone is
    /// linked anyway and reported.
    pub fn link_clones(&mut self) -> CloneLinkReport {
        let mut report = CloneLinkReport::default();
        for i in 0..self.games.len() {
            let Some(parent_id) = self.games[i].parent.game_id().map(str::to_string) else {
                continue;
            };
            let child_id = self.games[i].id.clone();
            match self.by_id.get(&parent_id).copied() {
                Some(p) => {
                    let parent = &mut self.games[p];
                    parent.clones.push(child_id);
                    if !parent.parent.is_root() {
                        log::warn!(
                            "Non-root game has clones: [{}] {}",
                            parent.id,
                            parent.name
                        );
                        report.nested_clone_parents += 1;
                    }
                }
                None => {
                    let child = &mut self.games[i];
                    log::warn!(
                        "Clone source {} not found for [{}] {}; treating it as a root",
                        parent_id,
                        child.id,
                        child.name
                    );
                    child.parent = ParentRef::Root;
                    report.orphan_clones += 1;
                }
            }
        }
        report
    }
}

/// Content hash → ids of every game listing a file with that hash,
/// in the order they were first seen.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    by_sha1: HashMap<String, Vec<String>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sha1: &str, game_id: &str) {
        let ids = self.by_sha1.entry(sha1.to_string()).or_default();
        if !ids.iter().any(|id| id == game_id) {
            ids.push(game_id.to_string());
        }
    }

    pub fn get(&self, sha1: &str) -> Option<&[String]> {
        self.by_sha1.get(sha1).map(Vec::as_slice)
    }

    pub fn contains(&self, sha1: &str) -> bool {
        self.by_sha1.contains_key(sha1)
    }

    pub fn len(&self) -> usize {
        self.by_sha1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sha1.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.by_sha1.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
