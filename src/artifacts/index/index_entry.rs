//! Index entry representation
//!
//! Each entry records one staged file: its repository-relative path, the id of
//! the blob holding its content, and its file mode.
//!
//! ## Entry Format
//!
//! ```text
//! mode (u32) | object id (20 bytes) | path length (u16) | path bytes
//! ```
//!
//! All integers are in network byte order.

use crate::artifacts::index::MAX_PATH_SIZE;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{LitError, Result};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{Read, Write};

/// Staged path with its blob reference
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the repository root, `/`-separated
    pub name: String,
    pub oid: ObjectId,
    pub mode: EntryMode,
}

impl IndexEntry {
    /// Every ancestor directory of the entry, outermost first.
    ///
    /// `a/b/c` yields `["a", "a/b"]`.
    pub fn parent_dirs(&self) -> Vec<&str> {
        self.name
            .match_indices('/')
            .map(|(position, _)| &self.name[..position])
            .collect()
    }

    pub(crate) fn read_from<R: Read>(reader: &mut Checksum<R>) -> Result<Self> {
        let fixed = reader.read(4)?;
        let mode = EntryMode::try_from(byteorder::NetworkEndian::read_u32(&fixed))?;

        let oid_bytes = reader.read(20)?;
        let oid = ObjectId::read_h40_from(&mut oid_bytes.as_ref())
            .map_err(|e| LitError::CorruptIndex(e.to_string()))?;

        let name_len = byteorder::NetworkEndian::read_u16(&reader.read(2)?) as usize;
        let name_bytes = reader.read(name_len)?;
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|_| LitError::CorruptIndex("invalid UTF-8 in entry name".to_string()))?;

        validate_path(&name).map_err(|e| LitError::CorruptIndex(e.to_string()))?;

        Ok(IndexEntry { name, oid, mode })
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl Packable for IndexEntry {
    fn payload(&self) -> Result<Bytes> {
        if self.name.len() > MAX_PATH_SIZE {
            return Err(LitError::invalid_path(&self.name, "path is too long"));
        }

        let mut entry_bytes = Vec::with_capacity(26 + self.name.len());
        self.write_to(&mut entry_bytes)
            .map_err(|e| LitError::CorruptIndex(e.to_string()))?;

        Ok(Bytes::from(entry_bytes))
    }
}

impl IndexEntry {
    fn write_to(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_u32::<byteorder::NetworkEndian>(self.mode.as_u32())?;
        self.oid.write_h40_to(writer)?;
        writer.write_u16::<byteorder::NetworkEndian>(self.name.len() as u16)?;
        writer.write_all(self.name.as_bytes())
    }
}

/// Check that `path` is a well-formed repository-relative path.
///
/// Rejected: the empty path, absolute paths, trailing separators and any
/// empty, `.` or `..` segment. Nothing is normalised.
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LitError::invalid_path(path, "empty path"));
    }
    if path.contains('\0') {
        return Err(LitError::invalid_path(path, "path contains a NUL byte"));
    }

    for segment in path.split('/') {
        match segment {
            "" => return Err(LitError::invalid_path(path, "empty path segment")),
            "." | ".." => {
                return Err(LitError::invalid_path(
                    path,
                    format!("relative segment {segment:?}"),
                ));
            }
            _ => {}
        }
    }

    Ok(())
}
