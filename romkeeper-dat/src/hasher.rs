use std::io::Read;
use std::path::Path;

use sha1::Digest;

const CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// Compute the SHA-1 of a stream, reading it in 64KB chunks.
///
/// Returns lowercase hex, the form the catalog index is keyed by.
pub fn compute_sha1<R: Read + ?Sized>(reader: &mut R) -> std::io::Result<String> {
    let mut sha = sha1::Sha1::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sha.update(&buf[..n]);
    }

    Ok(format!("{:x}", sha.finalize()))
}

/// Compute the SHA-1 of a file on disk.
pub fn compute_file_sha1(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_sha1(&mut file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sha1_known_value() {
        let mut cursor = Cursor::new(b"abc".to_vec());
        assert_eq!(
            compute_sha1(&mut cursor).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_sha1_empty() {
        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(
            compute_sha1(&mut cursor).unwrap(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_sha1_spans_chunks() {
        // Larger than one chunk: streaming must equal a one-shot digest
        let data = vec![0x5Au8; CHUNK_SIZE * 2 + 17];
        let mut cursor = Cursor::new(data.clone());
        let streamed = compute_sha1(&mut cursor).unwrap();
        let direct = format!("{:x}", sha1::Sha1::digest(&data));
        assert_eq!(streamed, direct);
    }
}
