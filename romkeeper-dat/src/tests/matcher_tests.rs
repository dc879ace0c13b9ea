use super::*;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

use crate::catalog::{LoadOptions, LoadedCatalog, load};

fn sha1_of(data: &[u8]) -> String {
    hasher::compute_sha1(&mut Cursor::new(data)).unwrap()
}

/// Two games share one hash; a third has its own.
fn sample_catalog(shared: &str, solo: &str) -> LoadedCatalog {
    let xml = format!(
        r#"<datafile>
        <game name="Game">
            <archive number="10" region="USA" languages="En"/>
            <source><details region="USA"/>
                <file format="Raw" size="4" sha1="{shared}" item="USA" extension="bin"/>
            </source>
        </game>
        <game name="Game">
            <archive number="11" clone="10" region="Europe" languages="En"/>
            <source><details region="Europe"/>
                <file format="Raw" size="4" sha1="{shared}" item="Europe" extension="bin"/>
            </source>
        </game>
        <game name="Solo">
            <archive number="12" region="Japan" languages="Ja"/>
            <source><details region="Japan"/>
                <file format="Raw" size="4" sha1="{solo}" extension="bin"/>
            </source>
        </game>
    </datafile>"#
    );
    load(xml.as_bytes(), &LoadOptions::default()).unwrap()
}

fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .add_directory("nested/", SimpleFileOptions::default())
        .unwrap();
    for (name, data) in members {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// -- Disambiguation --

#[test]
fn test_disambiguates_by_filename() {
    let shared = sha1_of(b"SHARED");
    let mut catalog = sample_catalog(&shared, &sha1_of(b"SOLO"));

    let outcome = match_member(
        &mut catalog.registry,
        &catalog.hash_index,
        Path::new("pkg.zip"),
        "Game (Europe).bin",
        &shared,
    );
    let MemberOutcome::Matched(m) = outcome else {
        panic!("expected a match");
    };
    assert_eq!(m.game_id, "11");
    assert!(m.disambiguated);
    assert!(!m.is_misnamed());

    let europe = catalog.registry.get("11").unwrap().file(&shared).unwrap();
    assert_eq!(europe.location.as_ref().unwrap().member_name, "Game (Europe).bin");
    assert!(!catalog.registry.get("10").unwrap().file(&shared).unwrap().is_bound());
}

#[test]
fn test_resolve_candidate_usa_vs_europe() {
    let shared = sha1_of(b"SHARED");
    let catalog = sample_catalog(&shared, &sha1_of(b"SOLO"));
    let candidates = catalog.hash_index.get(&shared).unwrap();

    assert_eq!(
        resolve_candidate(&catalog.registry, candidates, &shared, "Game (USA).bin"),
        Some("10")
    );
    assert_eq!(
        resolve_candidate(&catalog.registry, candidates, &shared, "Game (Europe).bin"),
        Some("11")
    );
}

#[test]
fn test_no_close_name_falls_back_to_first_candidate() {
    let shared = sha1_of(b"SHARED");
    let catalog = sample_catalog(&shared, &sha1_of(b"SOLO"));
    let candidates = catalog.hash_index.get(&shared).unwrap();

    // Deterministic across repeated calls
    for _ in 0..3 {
        assert_eq!(
            resolve_candidate(&catalog.registry, candidates, &shared, "zz.rom"),
            Some("10")
        );
    }
}

/// Two games sharing one hash, with the given file items.
fn shared_pair(shared: &str, first_item: &str, second_item: &str) -> LoadedCatalog {
    let xml = format!(
        r#"<datafile>
        <game name="Game">
            <archive number="20" region="USA" languages="En"/>
            <source><details region="USA"/>
                <file format="Raw" size="4" sha1="{shared}" item="{first_item}" extension="bin"/>
            </source>
        </game>
        <game name="Game">
            <archive number="21" region="Europe" languages="En"/>
            <source><details region="Europe"/>
                <file format="Raw" size="4" sha1="{shared}" item="{second_item}" extension="bin"/>
            </source>
        </game>
    </datafile>"#
    );
    load(xml.as_bytes(), &LoadOptions::default()).unwrap()
}

#[test]
fn test_equal_scores_pick_greatest_expected_name() {
    let shared = sha1_of(b"SHARED");
    let catalog = shared_pair(&shared, "A", "B");
    let candidates = catalog.hash_index.get(&shared).unwrap();
    assert_eq!(
        resolve_candidate(&catalog.registry, candidates, &shared, "Game (C).bin"),
        Some("21")
    );

    let swapped = shared_pair(&shared, "B", "A");
    let candidates = swapped.hash_index.get(&shared).unwrap();
    assert_eq!(
        resolve_candidate(&swapped.registry, candidates, &shared, "Game (C).bin"),
        Some("20")
    );
}

#[test]
fn test_identical_expected_names_pick_last_game() {
    let shared = sha1_of(b"SHARED");
    let catalog = shared_pair(&shared, "Same", "Same");
    let candidates = catalog.hash_index.get(&shared).unwrap();
    assert_eq!(
        resolve_candidate(&catalog.registry, candidates, &shared, "Game (Same).bin"),
        Some("21")
    );
    // Below the cutoff the first name still maps to its last game
    assert_eq!(
        resolve_candidate(&catalog.registry, candidates, &shared, "zz.rom"),
        Some("21")
    );
}

#[test]
fn test_unknown_hash() {
    let mut catalog = sample_catalog(&sha1_of(b"SHARED"), &sha1_of(b"SOLO"));
    let outcome = match_member(
        &mut catalog.registry,
        &catalog.hash_index,
        Path::new("pkg.zip"),
        "whatever.bin",
        "0000",
    );
    assert_eq!(
        outcome,
        MemberOutcome::Unknown {
            sha1: "0000".to_string()
        }
    );
}

// -- Binding --

#[test]
fn test_second_binding_is_duplicate() {
    let solo = sha1_of(b"SOLO");
    let mut catalog = sample_catalog(&sha1_of(b"SHARED"), &solo);

    let first = match_member(
        &mut catalog.registry,
        &catalog.hash_index,
        Path::new("a.zip"),
        "Solo.bin",
        &solo,
    );
    let second = match_member(
        &mut catalog.registry,
        &catalog.hash_index,
        Path::new("b.zip"),
        "Solo.bin",
        &solo,
    );

    let (MemberOutcome::Matched(a), MemberOutcome::Matched(b)) = (first, second) else {
        panic!("expected two matches");
    };
    assert!(a.newly_bound);
    assert!(!b.newly_bound);

    let location = catalog
        .registry
        .get("12")
        .unwrap()
        .file(&solo)
        .unwrap()
        .location
        .clone()
        .unwrap();
    assert_eq!(location.package_path, Path::new("a.zip"));
}

// -- Archives --

#[test]
fn test_match_archive_counts() {
    let shared = sha1_of(b"SHARED");
    let solo = sha1_of(b"SOLO");
    let mut catalog = sample_catalog(&shared, &solo);

    let bytes = zip_bytes(&[
        ("Game (USA).bin", b"SHARED"),
        ("nested/solo-renamed.bin", b"SOLO"),
        ("junk.txt", b"not in catalog"),
    ]);

    let seen = std::cell::RefCell::new(Vec::new());
    let report = match_archive(
        Cursor::new(bytes),
        Path::new("pkg.zip"),
        &mut catalog.registry,
        &catalog.hash_index,
        &|p| {
            if let MatchProgress::Member { member, .. } = p {
                seen.borrow_mut().push(member);
            }
        },
    )
    .unwrap();

    assert_eq!(
        report,
        MatchReport {
            tested: 3,
            matched: 2,
            unknown: 1,
            misnamed: 1,
            duplicates: 0,
        }
    );
    // Directory entries are never offered
    assert_eq!(
        seen.into_inner(),
        vec!["Game (USA).bin", "nested/solo-renamed.bin", "junk.txt"]
    );

    let solo_file = catalog.registry.get("12").unwrap().file(&solo).unwrap();
    assert_eq!(
        solo_file.location.as_ref().unwrap().member_name,
        "nested/solo-renamed.bin"
    );
}

#[test]
fn test_match_archive_rejects_non_zip() {
    let mut catalog = sample_catalog("aa", "bb");
    let result = match_archive(
        Cursor::new(b"definitely not a zip".to_vec()),
        Path::new("bad.zip"),
        &mut catalog.registry,
        &catalog.hash_index,
        &|_| {},
    );
    assert!(matches!(result, Err(CatalogError::Zip(_))));
}

#[test]
fn test_report_absorb() {
    let mut total = MatchReport::default();
    let one = MatchReport {
        tested: 2,
        matched: 1,
        unknown: 1,
        misnamed: 0,
        duplicates: 0,
    };
    total.absorb(&one);
    total.absorb(&one);
    assert_eq!(total.tested, 4);
    assert_eq!(total.unknown, 2);
}

#[test]
fn test_member_file_name() {
    assert_eq!(member_file_name("a/b/c.bin"), "c.bin");
    assert_eq!(member_file_name("c.bin"), "c.bin");
    assert_eq!(member_file_name("dir\\c.bin"), "c.bin");
}
