use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{LitError, Result};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn with_count(entries_count: u32) -> Self {
        IndexHeader::new(String::from(SIGNATURE), VERSION, entries_count)
    }
}

impl Packable for IndexHeader {
    fn payload(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(self.marker.as_bytes());
        bytes
            .write_u32::<byteorder::NetworkEndian>(self.version)
            .and_then(|_| bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count))
            .map_err(|e| LitError::CorruptIndex(e.to_string()))?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(bytes: Bytes) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(LitError::CorruptIndex("invalid header size".to_string()));
        }

        let marker = String::from_utf8(bytes[0..4].to_vec())
            .map_err(|_| LitError::CorruptIndex("invalid marker in index header".to_string()))?;
        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let entries_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        if marker != SIGNATURE {
            return Err(LitError::CorruptIndex(format!(
                "invalid index signature {marker:?}"
            )));
        }
        if version != VERSION {
            return Err(LitError::CorruptIndex(format!(
                "unsupported index version {version}"
            )));
        }

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}
