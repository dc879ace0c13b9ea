use serde::Serialize;

use crate::catalog::LoadedCatalog;
use crate::registry::Registry;

/// Label used for every non-Licensed game when counting by region.
pub const UNLICENSED_BUCKET: &str = "Unlicensed";

/// Catalog-wide counts for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total_games: usize,
    /// Games without a parent
    pub unique_titles: usize,
    /// Clone references corrected to root while loading
    pub orphan_clones: usize,
    /// Region key → game count, in first-seen order
    pub games_per_region: Vec<(String, usize)>,
    /// Language → game count, in first-seen order
    pub games_per_language: Vec<(String, usize)>,
}

impl CatalogSummary {
    pub fn from_catalog(catalog: &LoadedCatalog) -> Self {
        Self::from_registry(&catalog.registry, catalog.orphan_clones())
    }

    /// Licensed games are counted under their joined region list
    /// (`"Japan, USA"`), everything else under [`UNLICENSED_BUCKET`].
    pub fn from_registry(registry: &Registry, orphan_clones: usize) -> Self {
        let mut summary = Self {
            total_games: registry.len(),
            orphan_clones,
            ..Default::default()
        };
        for game in registry.iter() {
            if game.parent.is_root() {
                summary.unique_titles += 1;
            }
            let region = if game.license.is_licensed() {
                game.regions.iter().cloned().collect::<Vec<_>>().join(", ")
            } else {
                UNLICENSED_BUCKET.to_string()
            };
            bump(&mut summary.games_per_region, &region);
            for lang in &game.languages {
                bump(&mut summary.games_per_language, lang);
            }
        }
        summary
    }
}

fn bump(counts: &mut Vec<(String, usize)>, key: &str) {
    match counts.iter_mut().find(|(k, _)| k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key.to_string(), 1)),
    }
}
