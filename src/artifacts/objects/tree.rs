//! Tree object
//!
//! Trees represent one directory level. They contain entries for files (blobs)
//! and subdirectories (other trees), each with a name and a mode.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<octal mode> <name>\0<20-byte sha1>`
//!
//! ## Ordering
//!
//! Entries of one level, files and subdirectories alike, are kept in a single
//! byte-wise ascending order of their names. The id of a tree is therefore a
//! pure function of its content, whatever order the paths were staged in.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::{IndexEntry, validate_path};
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{LitError, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// A reference to an already stored object (blob, or a tree read back from disk)
    Leaf(DatabaseEntry),
    /// A directory level still being built
    Subtree(Tree),
}

impl TreeEntry {
    pub fn object_type(&self) -> ObjectType {
        match self.mode() {
            EntryMode::Directory => ObjectType::Tree,
            EntryMode::File(_) => ObjectType::Blob,
        }
    }

    pub fn mode(&self) -> EntryMode {
        match self {
            TreeEntry::Leaf(entry) => entry.mode,
            TreeEntry::Subtree(_) => EntryMode::Directory,
        }
    }

    pub fn oid(&self) -> Result<ObjectId> {
        match self {
            TreeEntry::Leaf(entry) => Ok(entry.oid.clone()),
            TreeEntry::Subtree(tree) => tree.object_id(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Build the directory hierarchy for a flat list of staged entries
    ///
    /// Every path is split on `/`; the last segment becomes a leaf in the
    /// level reached by walking the preceding segments, creating subtrees on
    /// the way.
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Result<Self> {
        let mut root = Self::default();

        for entry in entries {
            validate_path(&entry.name)?;
            let segments = entry.name.split('/').collect::<Vec<_>>();
            root.add_entry(&segments, entry)?;
        }

        Ok(root)
    }

    fn add_entry(&mut self, segments: &[&str], entry: &IndexEntry) -> Result<()> {
        match segments {
            [] => Err(LitError::invalid_path(&entry.name, "empty path")),
            [name] => {
                if let Some(TreeEntry::Subtree(_)) = self.entries.get(*name) {
                    return Err(LitError::invalid_path(
                        &entry.name,
                        "path is staged as both a file and a directory",
                    ));
                }

                self.entries.insert(
                    name.to_string(),
                    TreeEntry::Leaf(DatabaseEntry::new(entry.oid.clone(), entry.mode)),
                );
                Ok(())
            }
            [dir, rest @ ..] => {
                let subtree = self
                    .entries
                    .entry(dir.to_string())
                    .or_insert_with(|| TreeEntry::Subtree(Tree::default()));

                match subtree {
                    TreeEntry::Subtree(tree) => tree.add_entry(rest, entry),
                    TreeEntry::Leaf(_) => Err(LitError::invalid_path(
                        &entry.name,
                        format!("{dir:?} is staged as both a file and a directory"),
                    )),
                }
            }
        }
    }

    /// Visit every level depth-first, children before their parent
    ///
    /// Storing in this order guarantees a tree is only written once all the
    /// trees it references exist.
    pub fn traverse<F>(&self, func: &mut F) -> Result<()>
    where
        F: FnMut(&Tree) -> Result<()>,
    {
        for entry in self.entries.values() {
            if let TreeEntry::Subtree(tree) = entry {
                tree.traverse(func)?;
            }
        }

        func(self)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeEntry)> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    pub fn subtree(&self, name: &str) -> Option<&Tree> {
        match self.entries.get(name) {
            Some(TreeEntry::Subtree(tree)) => Some(tree),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn payload(&self) -> Result<Bytes> {
        let mut content_bytes = Vec::new();

        for (name, tree_entry) in &self.entries {
            let oid = tree_entry.oid()?;

            write!(content_bytes, "{} {}\0", tree_entry.mode().as_str(), name)
                .and_then(|_| oid.write_h40_to(&mut content_bytes))
                .map_err(|e| LitError::corrupt_object("<tree>", e.to_string()))?;
        }

        Ok(Bytes::from(content_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = Cursor::new(payload);

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        let corrupt = |reason: &str| LitError::corrupt_object("<tree>", reason);

        loop {
            mode_bytes.clear();
            let n = reader
                .read_until(b' ', &mut mode_bytes)
                .map_err(|e| corrupt(&e.to_string()))?;
            if n == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(corrupt("unexpected EOF in mode"));
            }

            let mode_str = std::str::from_utf8(&mode_bytes).map_err(|_| corrupt("invalid mode"))?;
            let mode = EntryMode::try_from(mode_str)?;

            name_bytes.clear();
            reader
                .read_until(b'\0', &mut name_bytes)
                .map_err(|e| corrupt(&e.to_string()))?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(corrupt("unexpected EOF in name"));
            }
            let name = String::from_utf8(name_bytes.clone()).map_err(|_| corrupt("invalid name"))?;

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| corrupt("unexpected EOF in object id"))?;

            entries.insert(name, TreeEntry::Leaf(DatabaseEntry::new(oid, mode)));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, tree_entry)| {
                let oid = tree_entry
                    .oid()
                    .map(|oid| oid.to_string())
                    .unwrap_or_default();

                format!(
                    "{} {} {}\t{}",
                    tree_entry.mode(),
                    tree_entry.object_type(),
                    oid,
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
