//! Staging index
//!
//! The index maps repository-relative paths to the blob and mode that the next
//! commit will record for them. It is loaded at the start of a command, edited
//! in memory and saved back explicitly.
//!
//! ## Data Structures
//!
//! - `entries`: staged files keyed by path, kept in byte-wise path order
//! - `children`: directory path to the staged files below it, so that a file
//!   replacing a directory (or the reverse) can evict the stale entries

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{IndexEntry, validate_path};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{LitError, Result, StorageContext};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<String, IndexEntry>,
    children: BTreeMap<String, BTreeSet<String>>,
    changed: bool,
}

impl Index {
    /// An empty index that will be saved to `path`
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    /// Read the index at `path`.
    ///
    /// A missing or zero-length file is an empty index. Anything else must
    /// carry a valid header and a matching checksum trailer.
    pub fn load(path: &Path) -> Result<Self> {
        let mut index = Index::new(path.into());

        if !path.exists() {
            tracing::debug!("no index at {}, starting empty", path.display());
            return Ok(index);
        }

        let content = std::fs::read(path).at_path(path)?;
        if content.is_empty() {
            return Ok(index);
        }
        if content.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(LitError::CorruptIndex(format!(
                "index is only {} bytes long",
                content.len()
            )));
        }

        let mut reader = Checksum::new(content.as_slice());
        let header = IndexHeader::deserialize(reader.read(HEADER_SIZE)?)?;

        for _ in 0..header.entries_count {
            let entry = IndexEntry::read_from(&mut reader)?;
            if index.entries.contains_key(&entry.name) {
                return Err(LitError::CorruptIndex(format!(
                    "duplicate entry {:?}",
                    entry.name
                )));
            }
            index.store_entry(entry);
        }

        reader.verify()?;
        tracing::debug!("loaded {} index entries", index.len());

        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the in-memory table differs from what was last loaded or saved
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Staged entries in path order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stage `entry`, replacing any entry at the same path.
    ///
    /// A staged file that is now an ancestor directory of `entry`, or staged
    /// files below a directory that `entry` now replaces, are dropped.
    pub fn add(&mut self, entry: IndexEntry) -> Result<()> {
        validate_path(&entry.name)?;

        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;

        Ok(())
    }

    /// Unstage a file, or every file below a directory.
    pub fn remove(&mut self, path: &str) {
        let removed = self.remove_entry(path) | self.remove_children(path);
        self.changed |= removed;
    }

    /// Serialise the table, path-sorted, and overwrite the index file.
    pub fn save(&mut self) -> Result<()> {
        let mut writer = Checksum::new(Vec::new());
        let io_error = |e: std::io::Error| LitError::CorruptIndex(e.to_string());

        let header = IndexHeader::with_count(self.entries.len() as u32);
        writer.write(&header.payload()?).map_err(io_error)?;
        for entry in self.entries.values() {
            writer.write(&entry.payload()?).map_err(io_error)?;
        }
        writer.write_checksum().map_err(io_error)?;

        std::fs::write(&self.path, writer.into_inner()).at_path(&self.path)?;
        tracing::debug!("saved {} index entries", self.entries.len());
        self.changed = false;

        Ok(())
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.name.clone());
        }

        self.entries.insert(entry.name.clone(), entry);
    }

    fn remove_children(&mut self, path: &str) -> bool {
        match self.children.remove(path) {
            Some(children) => {
                for child in children {
                    self.remove_entry(&child);
                }
                true
            }
            None => false,
        }
    }

    fn remove_entry(&mut self, path: &str) -> bool {
        let Some(entry) = self.entries.remove(path) else {
            return false;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }

        true
    }
}
