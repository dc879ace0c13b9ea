use std::collections::BTreeSet;

/// Placeholder region the catalog uses when it does not know better.
/// It never survives normalization.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Region-free releases; bucketed together with the first priority region.
pub const WORLD_REGION: &str = "World";

/// Main regions, highest priority first.
pub const PRIORITY_REGIONS: [&str; 3] = ["USA", "Japan", "Europe"];

/// Label for games outside every priority region when no single other
/// region can be detected.
pub const DEFAULT_REST_OF_WORLD: &str = "ROTW";

/// Normalize a raw region list such as `"USA, Unknown, Japan"`.
///
/// Splits on commas, trims, drops empty entries and `Unknown`, and returns
/// a deduplicated, lexicographically sorted set.
pub fn parse_region_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty() && *r != UNKNOWN_REGION)
        .map(str::to_string)
        .collect()
}

/// Whether a region is one of [`PRIORITY_REGIONS`].
pub fn is_priority_region(region: &str) -> bool {
    PRIORITY_REGIONS.contains(&region)
}

/// Resolve the main region of a game for export bucketing.
///
/// `World` counts as the first priority region. Otherwise the first
/// priority region present wins, falling back to `rest_of_world`.
pub fn main_region<'a>(regions: &BTreeSet<String>, rest_of_world: &'a str) -> &'a str {
    if regions.contains(WORLD_REGION) {
        return PRIORITY_REGIONS[0];
    }
    PRIORITY_REGIONS
        .iter()
        .find(|r| regions.contains(**r))
        .copied()
        .unwrap_or(rest_of_world)
}

/// Pick the label for the rest-of-the-world bucket.
///
/// If exactly one distinct non-priority, non-`World` region is observed,
/// that region names the bucket; otherwise [`DEFAULT_REST_OF_WORLD`].
pub fn rest_of_world_label<'a, I>(observed: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let others: BTreeSet<&str> = observed
        .into_iter()
        .filter(|r| *r != WORLD_REGION && !is_priority_region(r))
        .collect();
    match others.len() {
        1 => others.into_iter().next().unwrap_or(DEFAULT_REST_OF_WORLD).to_string(),
        _ => DEFAULT_REST_OF_WORLD.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/region_tests.rs"]
mod tests;
