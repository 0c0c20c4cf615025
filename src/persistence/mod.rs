//! Persistence layer for the in-process graph
//!
//! The whole graph is written as one compressed snapshot file on save and
//! read back when the graph is opened. Snapshots are overwritten wholesale,
//! never appended to.

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotError, SnapshotResult, SNAPSHOT_VERSION};
