//! Core repository components
//!
//! - `database`: Content-addressed object store for blobs, trees and commits
//! - `index`: Staging area recording the next snapshot
//! - `refs`: HEAD and branch references
//! - `repository`: Repository discovery and the stage operation
//! - `workspace`: Work tree file system access

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
