//! Content fingerprint - identifies a log run by its first bytes
//!
//! A log that is only ever appended to keeps its leading bytes. If they
//! change, the file was rewritten even when its length and (on platforms
//! without inode numbers) its identity look unchanged.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

pub const FINGERPRINT_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    first_bytes: Vec<u8>,
    max_size: usize,
}

impl Fingerprint {
    /// Read up to `max_size` bytes from the start of `file`
    pub fn read(file: &mut File, max_size: usize) -> io::Result<Self> {
        let first_bytes = read_head(file, max_size)?;
        Ok(Self {
            first_bytes,
            max_size,
        })
    }

    /// Record bytes consumed at `offset` while the fingerprint is still short
    pub fn observe(&mut self, offset: u64, bytes: &[u8]) {
        let len = self.first_bytes.len() as u64;
        let end = offset + bytes.len() as u64;
        if self.first_bytes.len() >= self.max_size || offset > len || end <= len {
            return;
        }

        let fresh = &bytes[(len - offset) as usize..];
        let room = self.max_size - self.first_bytes.len();
        self.first_bytes.extend_from_slice(&fresh[..fresh.len().min(room)]);
    }

    /// Whether `file` still starts with the recorded bytes.
    /// An empty fingerprint matches any file.
    pub fn is_prefix_of(&self, file: &mut File) -> io::Result<bool> {
        if self.first_bytes.is_empty() {
            return Ok(true);
        }
        Ok(read_head(file, self.first_bytes.len())? == self.first_bytes)
    }

    pub fn len(&self) -> usize {
        self.first_bytes.len()
    }
}

fn read_head(file: &mut File, size: usize) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::with_capacity(size);
    file.take(size as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
