//! Append-only flat files holding raw block bytes.
//!
//! Records are framed as [magic u32][length u32][bytes], files roll over at
//! a size cap, and indices reference records by (file id, offset, length).
//! Rollback never truncates; discarded records simply become unreachable.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const RECORD_MAGIC: u32 = 0xc4d1_f11e;
const RECORD_HEADER_LEN: u64 = 8;

#[derive(Debug)]
pub enum FlatFileError {
    Io(String),
    /// Record framing did not match what the index claimed.
    BadRecord(&'static str),
    Poisoned,
}

impl fmt::Display for FlatFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatFileError::Io(message) => write!(f, "{message}"),
            FlatFileError::BadRecord(message) => write!(f, "{message}"),
            FlatFileError::Poisoned => write!(f, "flat file lock poisoned"),
        }
    }
}

impl std::error::Error for FlatFileError {}

impl From<std::io::Error> for FlatFileError {
    fn from(err: std::io::Error) -> Self {
        FlatFileError::Io(err.to_string())
    }
}

/// Where a record lives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileLocation {
    pub file_id: u32,
    pub offset: u64,
    pub len: u32,
}

struct WriteState {
    file_id: u32,
    handle: File,
    len: u64,
}

pub struct FlatFileStore {
    dir: PathBuf,
    prefix: String,
    max_file_size: u64,
    write: Mutex<WriteState>,
}

impl FlatFileStore {
    /// Opens the store in `dir`, resuming at the highest existing file.
    pub fn open(
        dir: impl AsRef<Path>,
        prefix: &str,
        max_file_size: u64,
    ) -> Result<Self, FlatFileError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let mut last_id = 0u32;
        for entry in std::fs::read_dir(&dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(id) = parse_file_name(name, prefix) {
                last_id = last_id.max(id);
            }
        }

        let path = file_path(&dir, prefix, last_id);
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        let len = handle.seek(SeekFrom::End(0))?;

        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            max_file_size,
            write: Mutex::new(WriteState {
                file_id: last_id,
                handle,
                len,
            }),
        })
    }

    /// Appends one record, rolling to a new file when the current one is
    /// full, and returns where it landed.
    pub fn append(&self, bytes: &[u8]) -> Result<FileLocation, FlatFileError> {
        let mut state = self.write.lock().map_err(|_| FlatFileError::Poisoned)?;

        let record_len = RECORD_HEADER_LEN + bytes.len() as u64;
        if state.len > 0 && state.len + record_len > self.max_file_size {
            let next_id = state.file_id + 1;
            let path = file_path(&self.dir, &self.prefix, next_id);
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .read(true)
                .open(path)?;
            *state = WriteState {
                file_id: next_id,
                handle,
                len: 0,
            };
        }

        let offset = state.len;
        let mut framed = Vec::with_capacity(record_len as usize);
        framed.extend_from_slice(&RECORD_MAGIC.to_le_bytes());
        framed.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        framed.extend_from_slice(bytes);
        state.handle.write_all(&framed)?;
        state.len += record_len;

        Ok(FileLocation {
            file_id: state.file_id,
            offset,
            len: bytes.len() as u32,
        })
    }

    /// Reads the record at `location`, verifying its framing.
    pub fn read(&self, location: FileLocation) -> Result<Vec<u8>, FlatFileError> {
        // Reads through the write handle would race the append cursor, so
        // every read opens its own descriptor.
        let path = file_path(&self.dir, &self.prefix, location.file_id);
        let mut handle = File::open(path)?;
        handle.seek(SeekFrom::Start(location.offset))?;

        let mut header = [0u8; RECORD_HEADER_LEN as usize];
        handle.read_exact(&mut header)?;
        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if magic != RECORD_MAGIC {
            return Err(FlatFileError::BadRecord("record magic mismatch"));
        }
        if len != location.len {
            return Err(FlatFileError::BadRecord("record length mismatch"));
        }

        let mut bytes = vec![0u8; len as usize];
        handle.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Forces buffered appends to disk.
    pub fn flush(&self) -> Result<(), FlatFileError> {
        let state = self.write.lock().map_err(|_| FlatFileError::Poisoned)?;
        state.handle.sync_all()?;
        Ok(())
    }
}

fn file_path(dir: &Path, prefix: &str, file_id: u32) -> PathBuf {
    dir.join(format!("{prefix}{file_id:05}.dat"))
}

fn parse_file_name(name: &str, prefix: &str) -> Option<u32> {
    let rest = name.strip_prefix(prefix)?;
    let digits = rest.strip_suffix(".dat")?;
    if digits.len() != 5 {
        return None;
    }
    digits.parse().ok()
}
