use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use serde::Serialize;
use zip::ZipArchive;

use crate::error::CatalogError;
use crate::hasher;
use crate::registry::{HashIndex, MemberLocation, Registry};
use crate::similarity::{self, CLOSE_MATCH_CUTOFF};

/// A package member resolved to a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberMatch {
    pub game_id: String,
    pub sha1: String,
    /// Member filename without any directory part
    pub actual_name: String,
    pub expected_name: String,
    /// The hash belonged to several games and filename similarity decided
    pub disambiguated: bool,
    /// False if the file record was already bound by an earlier member
    pub newly_bound: bool,
}

impl MemberMatch {
    pub fn is_misnamed(&self) -> bool {
        self.actual_name != self.expected_name
    }
}

/// Result of testing one package member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemberOutcome {
    Matched(MemberMatch),
    Unknown { sha1: String },
}

/// Counts for one or more tested packages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// Members hashed
    pub tested: usize,
    /// Members whose hash is in the catalog
    pub matched: usize,
    /// Members whose hash is not in the catalog
    pub unknown: usize,
    /// Matched members whose filename differs from the expected one
    pub misnamed: usize,
    /// Matched members whose file record was already bound
    pub duplicates: usize,
}

impl MatchReport {
    pub fn record(&mut self, outcome: &MemberOutcome) {
        self.tested += 1;
        match outcome {
            MemberOutcome::Unknown { .. } => self.unknown += 1,
            MemberOutcome::Matched(m) => {
                self.matched += 1;
                if m.is_misnamed() {
                    self.misnamed += 1;
                }
                if !m.newly_bound {
                    self.duplicates += 1;
                }
            }
        }
    }

    pub fn absorb(&mut self, other: &MatchReport) {
        self.tested += other.tested;
        self.matched += other.matched;
        self.unknown += other.unknown;
        self.misnamed += other.misnamed;
        self.duplicates += other.duplicates;
    }
}

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum MatchProgress {
    /// Opening a package
    Package { package: String },
    /// A member was hashed and resolved
    Member {
        package: String,
        member: String,
        outcome: MemberOutcome,
    },
}

/// Choose which of several games sharing a hash a member belongs to.
///
/// Candidates are keyed by expected filename in index order; a name shared
/// by several games belongs to the last of them. The name most similar to
/// `actual_name` wins if it clears [`CLOSE_MATCH_CUTOFF`], otherwise the
/// first name's game is used.
pub fn resolve_candidate<'a>(
    registry: &Registry,
    candidates: &'a [String],
    sha1: &str,
    actual_name: &str,
) -> Option<&'a str> {
    let first = candidates.first()?;
    if candidates.len() == 1 {
        return Some(first.as_str());
    }

    let mut names: Vec<(&str, &'a str)> = Vec::with_capacity(candidates.len());
    for id in candidates {
        let Some(file) = registry.get(id).and_then(|g| g.file(sha1)) else {
            continue;
        };
        let name = file.expected_name.as_str();
        match names.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = id.as_str(),
            None => names.push((name, id.as_str())),
        }
    }

    let fallback = names.first().map(|(_, id)| *id).unwrap_or(first.as_str());
    let chosen = similarity::best_match(
        actual_name,
        names.iter().map(|(n, _)| *n),
        CLOSE_MATCH_CUTOFF,
    )
    .map(|i| names[i].1)
    .unwrap_or(fallback);
    Some(chosen)
}

/// Resolve one member by hash and bind the chosen file record to it.
///
/// A file record that is already bound keeps its first location.
pub fn match_member(
    registry: &mut Registry,
    index: &HashIndex,
    package_path: &Path,
    member_name: &str,
    sha1: &str,
) -> MemberOutcome {
    let unknown = || MemberOutcome::Unknown {
        sha1: sha1.to_string(),
    };
    let Some(candidates) = index.get(sha1) else {
        return unknown();
    };

    let actual_name = member_file_name(member_name);
    let Some(game_id) = resolve_candidate(registry, candidates, sha1, actual_name) else {
        return unknown();
    };
    let Some(file) = registry.get_mut(game_id).and_then(|g| g.file_mut(sha1)) else {
        return unknown();
    };

    let newly_bound = file.bind(MemberLocation {
        package_path: package_path.to_path_buf(),
        member_name: member_name.to_string(),
    });

    MemberOutcome::Matched(MemberMatch {
        game_id: game_id.to_string(),
        sha1: sha1.to_string(),
        actual_name: actual_name.to_string(),
        expected_name: file.expected_name.clone(),
        disambiguated: candidates.len() > 1,
        newly_bound,
    })
}

/// Hash and resolve every file member of a zip package.
///
/// Members are streamed one at a time; directory entries are skipped.
pub fn match_archive<R: Read + Seek>(
    reader: R,
    package_path: &Path,
    registry: &mut Registry,
    index: &HashIndex,
    progress: &dyn Fn(MatchProgress),
) -> Result<MatchReport, CatalogError> {
    let mut archive = ZipArchive::new(reader)?;
    let package = package_path.display().to_string();
    let mut report = MatchReport::default();

    progress(MatchProgress::Package {
        package: package.clone(),
    });

    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        if member.is_dir() {
            continue;
        }
        let member_name = member.name().to_string();
        let sha1 = hasher::compute_sha1(&mut member)?;
        drop(member);

        let outcome = match_member(registry, index, package_path, &member_name, &sha1);
        match &outcome {
            MemberOutcome::Unknown { sha1 } => {
                log::debug!("Not in catalog: {package}/{member_name} ({sha1})");
            }
            MemberOutcome::Matched(m) if m.is_misnamed() => {
                log::debug!(
                    "Misnamed: {package}/{member_name} ({}), expected '{}'",
                    m.sha1,
                    m.expected_name
                );
            }
            MemberOutcome::Matched(m) => {
                log::debug!("Matched: {package}/{member_name} -> [{}]", m.game_id);
            }
        }
        report.record(&outcome);
        progress(MatchProgress::Member {
            package: package.clone(),
            member: member_name,
            outcome,
        });
    }

    Ok(report)
}

/// Open a zip package from disk and match its members.
pub fn match_package(
    package_path: &Path,
    registry: &mut Registry,
    index: &HashIndex,
    progress: &dyn Fn(MatchProgress),
) -> Result<MatchReport, CatalogError> {
    let file = BufReader::new(File::open(package_path)?);
    match_archive(file, package_path, registry, index, progress)
}

/// Final path component of a zip member name.
pub fn member_file_name(member_name: &str) -> &str {
    member_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(member_name)
}

#[cfg(test)]
#[path = "tests/matcher_tests.rs"]
mod tests;
