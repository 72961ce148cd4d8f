//! Error taxonomy of the lit core
//!
//! Every fallible core operation returns [`Result`]. Absent-but-expected state
//! (an index file that was never written, a branch without commits) is not an
//! error and is reported as an empty value or `None` instead.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LitError {
    /// Reading or writing an object, index, ref or config file failed.
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored object could not be decoded.
    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: String, reason: String },

    /// The index file exists but cannot be decoded.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// HEAD does not hold the symbolic `ref: <name>` form.
    #[error("corrupt HEAD: {0:?}")]
    CorruptHead(String),

    /// A branch ref file holds something other than an object id.
    #[error("corrupt ref {}: {content:?}", path.display())]
    CorruptRef { path: PathBuf, content: String },

    /// A staged path is malformed or lies outside the work tree.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    /// No `.lit` directory was found walking up from the start directory.
    #[error("not a lit repository (or any of the parent directories): {}", .0.display())]
    MissingRepository(PathBuf),

    #[error("author identity unknown: set LIT_AUTHOR_NAME and LIT_AUTHOR_EMAIL or [user] in .lit/config")]
    MissingIdentity,

    /// An author name or email would break the commit header line.
    #[error("invalid author {field} {value:?}: newlines and angle brackets are not allowed")]
    InvalidIdentity { field: &'static str, value: String },

    #[error("aborting commit due to empty commit message")]
    EmptyMessage,

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl LitError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        LitError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn corrupt_object(oid: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        LitError::CorruptObject {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LitError>;

/// Attach the offending path to a raw I/O failure.
pub trait StorageContext<T> {
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> StorageContext<T> for std::io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| LitError::Storage {
            path: path.to_path_buf(),
            source,
        })
    }
}
