//! Object types and their encodings
//!
//! Everything the store holds is one of three object kinds:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (names, modes and object IDs)
//! - **Commit**: a tree snapshot plus parents, author/committer and message
//!
//! All objects are framed as `<type> <size>\0<payload>` before hashing and storage.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw bytes
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
