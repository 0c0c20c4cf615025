//! Storage engine contract shared by the in-process and remote backends

use super::property::{PropertyMap, PropertyValue};
use super::types::NodeKey;
use crate::persistence::SnapshotError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that storage operations raise to their caller.
///
/// Connectivity failures of the remote backend have no variant here:
/// they are logged and surface as empty results.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Relationship endpoint {0} does not exist")]
    EndpointNotFound(NodeKey),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Reference to a stored entity: label, primary-key field and its value
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'a> {
    pub label: &'a str,
    pub pk_field: &'a str,
    pub pk_value: &'a PropertyValue,
}

impl<'a> EntityRef<'a> {
    pub fn new(label: &'a str, pk_field: &'a str, pk_value: &'a PropertyValue) -> Self {
        Self { label, pk_field, pk_value }
    }

    /// Node identity addressed by this reference
    pub fn node_key(&self) -> NodeKey {
        NodeKey::new(self.label, self.pk_value.key_string())
    }
}

/// Node and edge counts of a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
}

/// Unified storage interface for the knowledge graph.
///
/// Implemented by:
/// - `MemoryGraph`: in-process directed graph with snapshot persistence
/// - `RemoteGraph`: Cypher over HTTP against a graph database server
///
/// Both implementations must behave identically for upserts, relationship
/// creation and lookups. Neither serializes writers: callers issue mutating
/// calls against one store from a single task at a time.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the node `(label, properties[pk_field])` or merge `properties`
    /// into it. A payload without `pk_field` is a logged no-op.
    async fn add_or_update_entity(
        &self,
        label: &str,
        pk_field: &str,
        properties: PropertyMap,
    ) -> StoreResult<()>;

    /// Create (or merge into) the edge `from -[rel_type]-> to`, plus the
    /// reverse edge when `symmetric`. Both endpoints must already exist.
    async fn add_relationship(
        &self,
        from: EntityRef<'_>,
        to: EntityRef<'_>,
        rel_type: &str,
        properties: Option<PropertyMap>,
        symmetric: bool,
    ) -> StoreResult<()>;

    /// All nodes carrying `label` (`[]` if the label is unknown)
    async fn get_all_entities_by_label(&self, label: &str) -> Vec<PropertyMap>;

    /// Properties of one node, `None` when not found
    async fn get_entity_properties(
        &self,
        label: &str,
        pk_field: &str,
        pk_value: &PropertyValue,
    ) -> Option<PropertyMap>;

    /// Properties of every `range_label` node reachable from `from` over `rel_type`
    async fn get_relationship_entities(
        &self,
        from: EntityRef<'_>,
        rel_type: &str,
        range_label: &str,
        range_pk_field: &str,
    ) -> Vec<PropertyMap>;

    /// Properties of the edge `from -[rel_type]-> to`, `None` when absent
    async fn get_relationship_properties(
        &self,
        from: EntityRef<'_>,
        rel_type: &str,
        to: EntityRef<'_>,
    ) -> Option<PropertyMap>;

    /// Nodes of `label` whose `field` contains `term`, case-insensitively
    async fn find_entities(&self, label: &str, field: &str, term: &str) -> Vec<PropertyMap>;

    /// Node and edge counts
    async fn statistics(&self) -> GraphStatistics;

    /// Remove every node and edge
    async fn reset(&self) -> StoreResult<()>;

    /// Persist the current state
    async fn save(&self) -> StoreResult<()>;

    /// Release the store
    async fn close(&self);
}
