use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Result;
use bytes::Bytes;

pub trait Packable {
    /// The object body, without the `<type> <len>\0` header.
    fn payload(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// Header plus payload, exactly the bytes that get hashed and compressed.
    fn serialize(&self) -> Result<Bytes> {
        Ok(frame(self.object_type(), &self.payload()?))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::from_framed(&self.serialize()?))
    }
}

pub fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = object_type.header(payload.len());

    let mut framed = Vec::with_capacity(header.len() + payload.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(payload);

    Bytes::from(framed)
}

pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}
