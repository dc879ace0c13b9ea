//! IPS patch application.
//!
//! An IPS patch is the magic `PATCH` followed by records of
//! `offset:u24 size:u16 payload`. A zero size marks a run-length record
//! `count:u16 byte:u8`. The record stream ends when the read position
//! reaches the end of the patch, or three bytes before it; in the latter
//! case those three bytes are a truncation length for the target.
//!
//! Short reads at the end of a damaged patch are zero-extended rather than
//! rejected.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::PatchError;

/// Magic bytes every IPS patch starts with.
pub const IPS_MAGIC: &[u8; 5] = b"PATCH";

/// A seekable, writable target that can also be truncated.
pub trait PatchTarget: Write + Seek {
    /// Set the target length, shrinking or zero-extending it.
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl PatchTarget for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl PatchTarget for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(io::Error::other)?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

/// What a patch did to its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatchStats {
    /// Literal records written
    pub records: usize,
    /// Run-length records written
    pub rle_records: usize,
    /// Final length, if the patch carried a truncation record
    pub truncated_to: Option<u64>,
}

/// Forward-only reader over the patch body.
struct PatchReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PatchReader<'a> {
    /// Take up to `n` bytes; fewer at the end of the patch.
    fn take(&mut self, n: usize) -> &'a [u8] {
        let end = self.pos.saturating_add(n).min(self.data.len());
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        bytes
    }

    /// Big-endian unsigned integer from up to `n` bytes.
    fn read_uint(&mut self, n: usize) -> u32 {
        self.take(n)
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
    }

    fn at_terminator(&self) -> bool {
        self.pos == self.data.len() || self.at_truncation()
    }

    fn at_truncation(&self) -> bool {
        self.data.len().checked_sub(3) == Some(self.pos)
    }
}

/// Apply an in-memory IPS patch to `target`.
pub fn apply_patch<T: PatchTarget + ?Sized>(
    patch: &[u8],
    target: &mut T,
) -> Result<PatchStats, PatchError> {
    if !patch.starts_with(IPS_MAGIC) {
        return Err(PatchError::invalid_format("missing PATCH header"));
    }

    let mut reader = PatchReader {
        data: patch,
        pos: IPS_MAGIC.len(),
    };
    let mut stats = PatchStats::default();

    let mut offset = reader.read_uint(3);
    while !reader.at_terminator() {
        let size = reader.read_uint(2) as usize;
        let payload = if size == 0 {
            let count = reader.read_uint(2) as usize;
            stats.rle_records += 1;
            reader.take(1).repeat(count)
        } else {
            stats.records += 1;
            reader.take(size).to_vec()
        };

        target.seek(SeekFrom::Start(u64::from(offset)))?;
        target.write_all(&payload)?;

        offset = reader.read_uint(3);
    }

    if reader.at_truncation() {
        let len = u64::from(reader.read_uint(3));
        target.truncate(len)?;
        stats.truncated_to = Some(len);
    }

    target.flush()?;
    Ok(stats)
}

/// Apply the IPS patch at `patch_path` to the file at `target_path` in place.
pub fn apply_patch_file(patch_path: &Path, target_path: &Path) -> Result<PatchStats, PatchError> {
    let patch = fs::read(patch_path)?;
    let mut target = OpenOptions::new()
        .read(true)
        .write(true)
        .open(target_path)?;
    let stats = apply_patch(&patch, &mut target)?;
    log::debug!(
        "Patched {} with {}: {} records, {} RLE records",
        target_path.display(),
        patch_path.display(),
        stats.records,
        stats.rle_records
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "tests/patch_tests.rs"]
mod tests;
