use super::*;

fn game(id: &str, parent: ParentRef) -> GameRecord {
    GameRecord {
        id: id.to_string(),
        name: format!("Game {id}"),
        archive_name: None,
        license: License::Licensed,
        regions: BTreeSet::new(),
        languages: vec!["En".to_string()],
        dev_status: None,
        bios: false,
        version1: None,
        version2: None,
        parent,
        clones: Vec::new(),
        files: Vec::new(),
    }
}

fn file(sha1: &str, format: &str) -> FileRecord {
    FileRecord {
        sha1: sha1.to_string(),
        format: MergedValue::new(format),
        expected_name: format!("{sha1}.bin"),
        size: 16,
        regions: BTreeSet::new(),
        sections: BTreeSet::new(),
        quality: None,
        location: None,
    }
}

fn location(member: &str) -> MemberLocation {
    MemberLocation {
        package_path: PathBuf::from("pkg.zip"),
        member_name: member.to_string(),
    }
}

// -- ParentRef --

#[test]
fn test_parent_from_clone_attr() {
    assert_eq!(ParentRef::from_clone_attr(None), ParentRef::Root);
    assert_eq!(ParentRef::from_clone_attr(Some("P")), ParentRef::Root);
    assert_eq!(ParentRef::from_clone_attr(Some("p")), ParentRef::Root);
    assert_eq!(ParentRef::from_clone_attr(Some("")), ParentRef::Root);
    assert_eq!(
        ParentRef::from_clone_attr(Some("0042")),
        ParentRef::Game("0042".to_string())
    );
    assert_eq!(ParentRef::Root.to_string(), "ROOT");
}

// -- MergedValue --

#[test]
fn test_merged_value_conflict_renders_joined() {
    let mut v = MergedValue::new("Raw");
    assert!(!v.merge("Raw"));
    assert!(!v.is_conflicting());

    assert!(v.merge("Headered"));
    assert!(v.is_conflicting());
    assert_eq!(v.to_string(), "Raw/Headered");
}

#[test]
fn test_merged_value_idempotent() {
    let mut v = MergedValue::new("Raw");
    v.merge("Headered");
    let snapshot = v.clone();
    assert!(!v.merge("Headered"));
    assert!(!v.merge("Raw"));
    assert_eq!(v, snapshot);
}

#[test]
fn test_file_merge_same_listing_twice_is_noop() {
    let mut a = file("aa", "Raw");
    a.regions.insert("USA".to_string());
    let b = a.clone();

    let outcome = a.merge(b);
    assert_eq!(outcome, MergeOutcome::default());
    assert_eq!(a.format, MergedValue::new("Raw"));
    assert_eq!(a.regions.len(), 1);
}

#[test]
fn test_file_merge_unions_and_flags_conflicts() {
    let mut a = file("aa", "Raw");
    a.regions.insert("USA".to_string());
    a.quality = Some(MergedValue::new("Good"));

    let mut b = file("aa", "Headered");
    b.regions.insert("Japan".to_string());
    b.sections.insert("Alt".to_string());
    b.quality = Some(MergedValue::new("Bad"));

    let outcome = a.merge(b);
    assert!(outcome.format_conflict);
    assert!(outcome.quality_conflict);
    assert_eq!(a.format.to_string(), "Raw/Headered");
    assert_eq!(a.quality.as_ref().unwrap().to_string(), "Good/Bad");
    assert_eq!(
        a.regions.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Japan", "USA"]
    );
    assert!(a.sections.contains("Alt"));
}

#[test]
fn test_file_merge_adopts_quality_when_missing() {
    let mut a = file("aa", "Raw");
    let mut b = file("aa", "Raw");
    b.quality = Some(MergedValue::new("Bad"));

    let outcome = a.merge(b);
    assert!(!outcome.quality_conflict);
    assert_eq!(a.quality, Some(MergedValue::new("Bad")));
}

#[test]
fn test_bind_first_writer_wins() {
    let mut f = file("aa", "Raw");
    assert!(!f.is_bound());
    assert!(f.bind(location("first.bin")));
    assert!(!f.bind(location("second.bin")));
    assert_eq!(f.location.as_ref().unwrap().member_name, "first.bin");
}

// -- GameRecord --

#[test]
fn test_add_file_keys_by_hash() {
    let mut g = game("1", ParentRef::Root);
    assert!(g.add_file(file("aa", "Raw")).is_none());
    assert!(g.add_file(file("bb", "Raw")).is_none());
    assert!(g.add_file(file("aa", "Raw")).is_some());
    assert_eq!(g.files.len(), 2);
    assert_eq!(g.files[0].sha1, "aa");
}

// -- Registry --

#[test]
fn test_insert_rejects_duplicate_id() {
    let mut reg = Registry::new();
    assert!(reg.insert(game("1", ParentRef::Root)));
    assert!(!reg.insert(game("1", ParentRef::Root)));
    assert_eq!(reg.len(), 1);
}

#[test]
fn test_link_clones_and_orphans() {
    let mut reg = Registry::new();
    reg.insert(game("1", ParentRef::Root));
    reg.insert(game("2", ParentRef::Game("1".into())));
    reg.insert(game("3", ParentRef::Game("99".into())));
    reg.insert(game("4", ParentRef::Game("1".into())));

    let report = reg.link_clones();
    assert_eq!(report.orphan_clones, 1);
    assert_eq!(report.nested_clone_parents, 0);

    assert_eq!(reg.get("1").unwrap().clones, vec!["2", "4"]);
    assert_eq!(reg.get("3").unwrap().parent, ParentRef::Root);

    let roots: Vec<&str> = reg.roots().map(|g| g.id.as_str()).collect();
    assert_eq!(roots, vec!["1", "3"]);
}

#[test]
fn test_link_clones_reports_nested_parent() {
    let mut reg = Registry::new();
    reg.insert(game("1", ParentRef::Root));
    reg.insert(game("2", ParentRef::Game("1".into())));
    reg.insert(game("3", ParentRef::Game("2".into())));

    let report = reg.link_clones();
    assert_eq!(report.orphan_clones, 0);
    assert_eq!(report.nested_clone_parents, 1);
    assert_eq!(reg.get("2").unwrap().clones, vec!["3"]);
}

#[test]
fn test_clone_tree_depth_first() {
    let mut reg = Registry::new();
    reg.insert(game("1", ParentRef::Root));
    reg.insert(game("2", ParentRef::Game("1".into())));
    reg.insert(game("3", ParentRef::Game("2".into())));
    reg.insert(game("4", ParentRef::Game("1".into())));
    reg.insert(game("5", ParentRef::Root));
    reg.link_clones();

    assert_eq!(
        reg.clone_tree(),
        vec![(0, "1"), (1, "2"), (2, "3"), (1, "4"), (0, "5")]
    );
}

#[test]
fn test_bound_files() {
    let mut reg = Registry::new();
    let mut g = game("1", ParentRef::Root);
    g.add_file(file("aa", "Raw"));
    g.add_file(file("bb", "Raw"));
    reg.insert(g);

    assert_eq!(reg.bound_files().count(), 0);
    reg.get_mut("1")
        .unwrap()
        .file_mut("bb")
        .unwrap()
        .bind(location("x.bin"));

    let bound: Vec<&str> = reg.bound_files().map(|(_, f)| f.sha1.as_str()).collect();
    assert_eq!(bound, vec!["bb"]);
}

// -- HashIndex --

#[test]
fn test_hash_index_keeps_order_and_dedupes() {
    let mut index = HashIndex::new();
    index.insert("aa", "2");
    index.insert("aa", "1");
    index.insert("aa", "2");
    index.insert("bb", "1");

    assert_eq!(index.len(), 2);
    assert_eq!(index.get("aa").unwrap(), ["2", "1"]);
    assert!(index.contains("bb"));
    assert!(index.get("cc").is_none());
}
