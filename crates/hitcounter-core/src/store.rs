//! Counter persistence.
//!
//! A store holds exactly one value as decimal ASCII text. Stores do no locking
//! of their own; [`CounterService`](crate::CounterService) serializes access.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::Count;

/// Single-value durable counter storage.
pub trait CounterStore: Send + Sync {
    /// Parse the stored value.
    ///
    /// `NotFound` when nothing has been written yet, `Corrupt` when the
    /// contents are not an unsigned decimal integer.
    fn read(&self) -> Result<Count, StoreError>;

    /// Replace the stored value, discarding whatever was there before.
    fn write(&self, count: Count) -> Result<(), StoreError>;
}

fn parse(raw: &str) -> Result<Count, StoreError> {
    raw.trim().parse::<Count>().map_err(|_| StoreError::Corrupt {
        contents: raw.to_string(),
    })
}

/// Counter kept in a text file.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so a concurrent reader sees either the old or the new value. The
/// target's permissions carry over to the replacement. When the rename is
/// refused (e.g. the target is a bind-mounted file) the value is written in
/// place instead.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    path: PathBuf,
}

impl FileCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_in_place(&self, count: Count) -> Result<(), StoreError> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(StoreError::Write)?;
        write!(file, "{count}").map_err(StoreError::Write)?;
        file.sync_all().map_err(StoreError::Write)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl CounterStore for FileCounterStore {
    fn read(&self) -> Result<Count, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                path: self.path.clone(),
            }),
            Err(e) => Err(StoreError::Read(e)),
        }
    }

    fn write(&self, count: Count) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(StoreError::Write)?;
        match fs::metadata(&self.path) {
            Ok(meta) => tmp
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(StoreError::Write)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::Write(e)),
        }
        write!(tmp, "{count}").map_err(StoreError::Write)?;
        tmp.as_file().sync_all().map_err(StoreError::Write)?;

        if let Err(e) = tmp.persist(&self.path) {
            if !self.path.exists() {
                return Err(StoreError::Write(e.error));
            }
            tracing::debug!(error = %e.error, "counter rename refused, writing in place");
            self.write_in_place(count)?;
        }
        Ok(())
    }
}

/// Counter kept in process memory. Holds raw text so tests can seed corrupt
/// contents.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    raw: Mutex<Option<String>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with arbitrary contents.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// Current raw contents, if any.
    pub fn raw(&self) -> Option<String> {
        match self.raw.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CounterStore for MemoryCounterStore {
    fn read(&self) -> Result<Count, StoreError> {
        match self.raw() {
            Some(raw) => parse(&raw),
            None => Err(StoreError::NotFound {
                path: PathBuf::from("<memory>"),
            }),
        }
    }

    fn write(&self, count: Count) -> Result<(), StoreError> {
        let mut g = match self.raw.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *g = Some(count.to_string());
        Ok(())
    }
}
