//! File-mode codes carried by index and tree entries

use crate::errors::{LitError, Result};
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::path::Path;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
    Symlink,
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    File(FileMode),
    Directory,
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode::File(FileMode::Regular)
    }
}

impl EntryMode {
    /// Classify a path from its (non-following) metadata.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        if metadata.file_type().is_symlink() {
            EntryMode::File(FileMode::Symlink)
        } else if metadata.is_dir() {
            EntryMode::Directory
        } else if path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::File(FileMode::Symlink) => "120000",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::File(FileMode::Symlink) => 0o120000,
            EntryMode::Directory => 0o40000,
        }
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = LitError;

    fn try_from(mode: u32) -> Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o120000 => Ok(EntryMode::File(FileMode::Symlink)),
            0o40000 => Ok(EntryMode::Directory),
            other => Err(LitError::CorruptIndex(format!(
                "invalid entry mode {other:o}"
            ))),
        }
    }
}

impl TryFrom<&str> for EntryMode {
    type Error = LitError;

    fn try_from(value: &str) -> Result<Self> {
        let mode = u32::from_str_radix(value, 8).map_err(|_| {
            LitError::corrupt_object("<tree>", format!("invalid entry mode {value:?}"))
        })?;

        EntryMode::try_from(mode).map_err(|_| {
            LitError::corrupt_object("<tree>", format!("invalid entry mode {value:?}"))
        })
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // zero-padded like `git ls-files -s`
        write!(f, "{:06o}", self.as_u32())
    }
}
