use super::*;

fn patched(initial: &[u8], patch: &[u8]) -> Vec<u8> {
    let mut target = Cursor::new(initial.to_vec());
    apply_patch(patch, &mut target).unwrap();
    target.into_inner()
}

fn ips(body: &[u8]) -> Vec<u8> {
    let mut out = IPS_MAGIC.to_vec();
    out.extend_from_slice(body);
    out
}

#[test]
fn test_literal_record() {
    let patch = ips(&[0, 0, 0, 0, 2, 0xAA, 0xBB, b'E', b'O', b'F']);
    assert_eq!(patched(&[0, 0, 0, 0], &patch), vec![0xAA, 0xBB, 0, 0]);
}

#[test]
fn test_truncation_record() {
    let patch = ips(&[0, 0, 0, 0, 2, 0xAA, 0xBB, b'E', b'O', b'F', 0, 0, 2]);
    let mut target = Cursor::new(vec![0u8; 4]);
    let stats = apply_patch(&patch, &mut target).unwrap();
    assert_eq!(target.into_inner(), vec![0xAA, 0xBB]);
    assert_eq!(stats.truncated_to, Some(2));
    assert_eq!(stats.records, 1);
}

#[test]
fn test_rle_record() {
    // offset 1, size 0, count 3, byte 0x7F
    let patch = ips(&[0, 0, 1, 0, 0, 0, 3, 0x7F, b'E', b'O', b'F']);
    let mut target = Cursor::new(vec![0u8; 6]);
    let stats = apply_patch(&patch, &mut target).unwrap();
    assert_eq!(target.into_inner(), vec![0, 0x7F, 0x7F, 0x7F, 0, 0]);
    assert_eq!(stats.rle_records, 1);
    assert_eq!(stats.truncated_to, None);
}

#[test]
fn test_write_past_end_extends() {
    let patch = ips(&[0, 0, 4, 0, 1, 0x11, b'E', b'O', b'F']);
    assert_eq!(patched(&[1, 2], &patch), vec![1, 2, 0, 0, 0x11]);
}

#[test]
fn test_multiple_records_big_endian_offset() {
    let patch = ips(&[
        0x00, 0x01, 0x00, 0, 1, 0xCC, // offset 256
        0x00, 0x00, 0x02, 0, 1, 0xDD, // offset 2
        b'E', b'O', b'F',
    ]);
    let out = patched(&[0u8; 300], &patch);
    assert_eq!(out[256], 0xCC);
    assert_eq!(out[2], 0xDD);
    assert_eq!(out.len(), 300);
}

#[test]
fn test_header_only_patch_is_noop() {
    assert_eq!(patched(&[9, 9], IPS_MAGIC), vec![9, 9]);
    assert_eq!(patched(&[9, 9], &ips(b"EOF")), vec![9, 9]);
}

#[test]
fn test_bad_magic() {
    let mut target = Cursor::new(vec![0u8; 4]);
    let err = apply_patch(b"PTACH\0\0\0\0\x01\xAAEOF", &mut target).unwrap_err();
    assert!(matches!(err, PatchError::InvalidFormat(_)));
    assert_eq!(target.into_inner(), vec![0u8; 4]);

    let mut target = Cursor::new(Vec::new());
    assert!(apply_patch(b"PAT", &mut target).is_err());
}

#[test]
fn test_apply_patch_file_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("game.bin");
    let patch = tmp.path().join("fix.ips");
    std::fs::write(&target, [0u8; 4]).unwrap();
    std::fs::write(&patch, ips(&[0, 0, 0, 0, 2, 0xAA, 0xBB, b'E', b'O', b'F', 0, 0, 2])).unwrap();

    let stats = apply_patch_file(&patch, &target).unwrap();
    assert_eq!(stats.truncated_to, Some(2));
    assert_eq!(std::fs::read(&target).unwrap(), vec![0xAA, 0xBB]);
}
