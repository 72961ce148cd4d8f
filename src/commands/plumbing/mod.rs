//! Plumbing commands (low-level operations)
//!
//! Plumbing commands give direct access to the object store and the index.
//! They are the building blocks the porcelain commands compose.
//!
//! ## Commands
//!
//! - `hash-object`: Compute a blob id and optionally store the blob
//! - `cat-file`: Print a stored object
//! - `ls-files`: List the staged entries
//! - `write-tree`: Store the tree described by the index
//! - `write_commit`: Store a commit and advance the current branch

pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
pub mod write_commit;
pub mod write_tree;
