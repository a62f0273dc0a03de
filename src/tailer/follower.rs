//! Incremental line reader over a growing file

use anyhow::{Context, Result};
use std::fs::{File, Metadata};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::fingerprint::{Fingerprint, FINGERPRINT_SIZE};

/// Result of a single read attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowRead {
    /// A complete line without its terminator
    Line(String),
    /// Nothing new, or only part of a line so far
    Pending,
}

/// Why the followed file no longer matches the open handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rotation {
    Truncated { len: u64, position: u64 },
    /// New file at the path, or leading bytes rewritten in place
    Replaced,
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rotation::Truncated { len, position } => {
                write!(f, "truncated to {} bytes (was reading at {})", len, position)
            }
            Rotation::Replaced => write!(f, "replaced by a new log"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn of(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

pub struct LogFollower {
    path: PathBuf,
    reader: BufReader<File>,
    /// Bytes consumed from the current file, including `pending`
    position: u64,
    /// Start of a line whose terminator has not been written yet
    pending: Vec<u8>,
    identity: Option<FileIdentity>,
    fingerprint: Fingerprint,
}

impl LogFollower {
    /// Open positioned at end-of-file so existing content is never read
    pub fn open_at_end(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref(), SeekFrom::End(0))
    }

    pub fn open_at_start(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref(), SeekFrom::Start(0))
    }

    fn open(path: &Path, from: SeekFrom) -> Result<Self> {
        let mut file = open_log(path)?;
        let identity = FileIdentity::of(&file.metadata()?);
        let fingerprint = Fingerprint::read(&mut file, FINGERPRINT_SIZE)
            .with_context(|| format!("failed to read log file {}", path.display()))?;
        let position = file
            .seek(from)
            .with_context(|| format!("failed to seek in log file {}", path.display()))?;

        debug!(
            path = %path.display(),
            position,
            fingerprint = fingerprint.len(),
            "Log file opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            position,
            pending: Vec::new(),
            identity,
            fingerprint,
        })
    }

    /// Try to read the next complete line. Never seeks backwards past
    /// consumed bytes: a failed read is rolled back to `position`.
    pub fn next_line(&mut self) -> Result<FollowRead> {
        let start = self.position;
        let before = self.pending.len();

        let read = match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(read) => read,
            Err(e) => {
                self.pending.truncate(before);
                self.reader
                    .seek(SeekFrom::Start(self.position))
                    .with_context(|| format!("failed to seek in log file {}", self.path.display()))?;
                return Err(e)
                    .with_context(|| format!("failed to read log file {}", self.path.display()));
            }
        };
        self.fingerprint.observe(start, &self.pending[before..]);
        self.position += read as u64;

        if self.pending.last() != Some(&b'\n') {
            return Ok(FollowRead::Pending);
        }

        // Game logs are not guaranteed to be valid UTF-8
        let line = String::from_utf8_lossy(&self.pending)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        self.pending.clear();
        Ok(FollowRead::Line(line))
    }

    /// Compare the file now at the path with the one being read
    pub fn check_rotation(&self) -> Result<Option<Rotation>> {
        let mut file = open_log(&self.path)?;
        self.rotation_of(&mut file)
    }

    fn rotation_of(&self, file: &mut File) -> Result<Option<Rotation>> {
        let metadata = file
            .metadata()
            .with_context(|| format!("failed to stat log file {}", self.path.display()))?;

        if let (Some(open), Some(on_disk)) = (self.identity, FileIdentity::of(&metadata)) {
            if open != on_disk {
                return Ok(Some(Rotation::Replaced));
            }
        }

        if metadata.len() < self.position {
            return Ok(Some(Rotation::Truncated {
                len: metadata.len(),
                position: self.position,
            }));
        }

        let same_content = self
            .fingerprint
            .is_prefix_of(file)
            .with_context(|| format!("failed to read log file {}", self.path.display()))?;
        if !same_content {
            return Ok(Some(Rotation::Replaced));
        }

        Ok(None)
    }

    /// Reopen the path after a failed read and continue at `position`.
    /// A rotated file is left alone for `check_rotation` to report.
    pub fn resume(&mut self) -> Result<()> {
        let mut file = open_log(&self.path)?;
        if let Some(rotation) = self.rotation_of(&mut file)? {
            debug!(path = %self.path.display(), %rotation, "Not resuming a rotated file");
            return Ok(());
        }

        file.seek(SeekFrom::Start(self.position))
            .with_context(|| format!("failed to seek in log file {}", self.path.display()))?;
        self.reader = BufReader::new(file);
        debug!(path = %self.path.display(), position = self.position, "Resumed log file");
        Ok(())
    }

    /// Follow the file now at the path from its first byte.
    /// Everything in a replacement belongs to the new run.
    pub fn reopen_at_start(&mut self) -> Result<()> {
        *self = Self::open_at_start(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

fn open_log(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open log file {}", path.display()))
}
