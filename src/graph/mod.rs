//! Graph data layer
//!
//! This module implements the storage side of the knowledge base:
//! - Nodes identified by `(label, primary key)` with typed properties
//! - Directed, typed edges keyed by `(source, target, type)`
//! - The [`GraphStore`] contract shared by every backend
//! - [`MemoryGraph`], the in-process backend with a label index and snapshots

pub mod edge;
pub mod memory;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use memory::{GraphState, MemoryGraph};
pub use node::Node;
pub use property::{properties_from_json, properties_to_json, PropertyMap, PropertyValue, DATE_FORMAT};
pub use store::{EntityRef, GraphStatistics, GraphStore, StoreError, StoreResult};
pub use types::{EdgeType, Label, NodeKey};
