//! Object store
//!
//! Objects live under `.lit/objects/<2 hex>/<38 hex>`, each file holding the
//! zlib-compressed `<type> <len>\0<payload>` sequence. Objects are written
//! once; storing content that already exists leaves the file untouched.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{LitError, Result, StorageContext};
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// A decoded object record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub object_type: ObjectType,
    pub payload: Bytes,
}

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Hash and persist a typed payload, returning its id.
    pub fn put(&self, object_type: ObjectType, payload: &[u8]) -> Result<ObjectId> {
        let framed = frame(object_type, payload);
        let object_id = ObjectId::from_framed(&framed);
        let object_path = self.object_path(&object_id);

        if object_path.exists() {
            tracing::trace!("{object_type} {object_id} already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| LitError::corrupt_object(&object_id, "object path has no parent"))?;
        std::fs::create_dir_all(object_dir).at_path(object_dir)?;

        self.write_object(&object_path, &framed)?;
        tracing::debug!("stored {object_type} {object_id} ({} bytes)", payload.len());

        Ok(object_id)
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.put(object.object_type(), &object.payload()?)
    }

    /// Read back an object, validating its header against the payload.
    pub fn load(&self, object_id: &ObjectId) -> Result<RawObject> {
        let object_path = self.object_path(object_id);
        let compressed = std::fs::read(&object_path).at_path(&object_path)?;
        let content = Self::decompress(&compressed)
            .map_err(|e| LitError::corrupt_object(object_id, format!("unable to decompress: {e}")))?;

        let mut reader = Cursor::new(content);
        let (object_type, declared_len) = ObjectType::parse_header(&mut reader)
            .map_err(|reason| LitError::corrupt_object(object_id, reason))?;

        let header_len = reader.position() as usize;
        let payload = reader.into_inner().slice(header_len..);
        if payload.len() != declared_len {
            return Err(LitError::corrupt_object(
                object_id,
                format!(
                    "declared length {declared_len} but payload has {} bytes",
                    payload.len()
                ),
            ));
        }

        Ok(RawObject {
            object_type,
            payload,
        })
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let RawObject {
            object_type,
            payload,
        } = self.load(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(payload)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(payload)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(payload)?))),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Option<Commit>> {
        let RawObject {
            object_type,
            payload,
        } = self.load(object_id)?;

        match object_type {
            ObjectType::Commit => Ok(Some(Commit::deserialize(payload)?)),
            _ => Ok(None),
        }
    }

    fn write_object(&self, object_path: &Path, framed: &[u8]) -> Result<()> {
        let object_dir = object_path.parent().unwrap_or(&self.path);
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = Self::compress(framed).at_path(object_path)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .at_path(&temp_object_path)?;
        file.write_all(&compressed).at_path(&temp_object_path)?;
        drop(file);

        // rename the temp file over the final name so readers never see a partial object
        std::fs::rename(&temp_object_path, object_path).at_path(object_path)
    }

    fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    #[rstest]
    fn put_writes_a_sharded_compressed_object(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let oid = database.put(ObjectType::Blob, b"hello").unwrap();

        assert_eq!(oid.as_ref(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
        let on_disk = objects_dir
            .path()
            .join("objects")
            .join("b6")
            .join("fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
        assert!(on_disk.is_file());

        let compressed = std::fs::read(on_disk).unwrap();
        let mut raw = Vec::new();
        flate2::read::ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw, b"blob 5\0hello");
    }

    #[rstest]
    fn load_returns_type_and_payload(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put(ObjectType::Commit, b"not really a commit").unwrap();

        let raw = database.load(&oid).unwrap();

        assert_eq!(raw.object_type, ObjectType::Commit);
        assert_eq!(raw.payload.as_ref(), b"not really a commit");
    }

    #[rstest]
    fn same_payload_under_another_type_is_another_object(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let blob = database.put(ObjectType::Blob, b"").unwrap();
        let tree = database.put(ObjectType::Tree, b"").unwrap();

        assert_eq!(tree.as_ref(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        assert!(blob != tree);
    }

    #[rstest]
    fn storing_twice_leaves_the_store_unchanged(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let first = database.put(ObjectType::Blob, b"twice").unwrap();
        let path = database.object_path(&first);
        let before = std::fs::read(&path).unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        let second = database.put(ObjectType::Blob, b"twice").unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), modified);

        let shard = path.parent().unwrap();
        assert_eq!(std::fs::read_dir(shard).unwrap().count(), 1);
    }

    #[rstest]
    fn missing_object_is_a_storage_error(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = ObjectId::try_parse("0".repeat(40)).unwrap();

        assert!(!database.contains(&oid));
        assert!(matches!(database.load(&oid), Err(LitError::Storage { .. })));
    }

    #[rstest]
    fn garbage_object_is_corrupt(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = ObjectId::try_parse("ab".repeat(20)).unwrap();
        let path = database.object_path(&oid);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"definitely not zlib").unwrap();

        assert!(matches!(
            database.load(&oid),
            Err(LitError::CorruptObject { .. })
        ));
    }

    #[rstest]
    fn parse_object_decodes_blobs(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob = Blob::new(Bytes::from_static(b"some text"));
        let oid = database.store(&blob).unwrap();

        match database.parse_object(&oid).unwrap() {
            ObjectBox::Blob(parsed) => assert_eq!(*parsed, blob),
            _ => panic!("expected a blob"),
        }
        assert_eq!(database.parse_object_as_commit(&oid).unwrap(), None);
    }
}
