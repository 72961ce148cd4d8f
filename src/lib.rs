//! lit: a minimal content-addressed version-control engine
//!
//! Files are snapshotted into an object store under `.lit/objects`, staged in
//! a binary index, assembled into trees and recorded as commits on the branch
//! HEAD points at. Everything is synchronous and single-writer; see
//! [`areas::repository`] for what that means for concurrent invocations.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;
