//! Data structures and their on-disk encodings
//!
//! - `database`: Database entry types
//! - `index`: Index file format and staged entries
//! - `objects`: Object types (blob, tree, commit) and object ids

pub mod database;
pub mod index;
pub mod objects;
