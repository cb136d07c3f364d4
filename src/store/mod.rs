//! store
//!
//! Where configuration documents live and how they are replaced.
//!
//! # Architecture
//!
//! The migration engine never touches the filesystem directly; it works
//! against the [`DocumentStore`] trait and receives whichever backing the
//! caller chose. [`FileStore`] is the real one, a single YAML file replaced
//! whole on every save. [`MemoryStore`] backs tests and embedders that hold
//! the document themselves.
//!
//! Saves are whole-document: there is no patch format. [`FileStore`] writes
//! to a sibling temp file, syncs, and renames over the original, so a crash
//! mid-write leaves either the old document or the new one, never a
//! truncated hybrid.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::document::{Document, DocumentError};

pub mod lock;

pub use lock::{LockError, StoreLock};

/// Errors from loading or saving a document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file's contents are not a configuration document.
    #[error("{path} is not a configuration document: {source}")]
    Decode {
        path: PathBuf,
        source: DocumentError,
    },

    /// The document could not be encoded for writing.
    #[error("document cannot be encoded: {source}")]
    Encode { source: DocumentError },
}

/// A place a configuration document can be loaded from and saved to.
pub trait DocumentStore {
    /// Load the document in full.
    fn load(&self) -> Result<Document, StoreError>;

    /// Replace the stored document in full.
    fn save(&mut self, document: &Document) -> Result<(), StoreError>;

    /// Where the document lives, for diagnostics.
    fn describe(&self) -> String;
}

/// A document stored as one YAML file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the lock file guarding this document.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<Document, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        Document::from_yaml(&raw).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&mut self, document: &Document) -> Result<(), StoreError> {
        let encoded = document
            .to_yaml()
            .map_err(|source| StoreError::Encode { source })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        // Write to a temp file first for atomicity
        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|source| StoreError::Write {
                    path: temp_path.clone(),
                    source,
                })?;

            file.write_all(encoded.as_bytes())
                .map_err(|source| StoreError::Write {
                    path: temp_path.clone(),
                    source,
                })?;

            file.sync_all().map_err(|source| StoreError::Write {
                path: temp_path.clone(),
                source,
            })?;
        }

        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A document held in memory. Backs tests and callers that manage
/// persistence themselves.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    document: Document,
}

impl MemoryStore {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The current document, as of the last save.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Document, StoreError> {
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &Document) -> Result<(), StoreError> {
        self.document = document.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory document".to_string()
    }
}
