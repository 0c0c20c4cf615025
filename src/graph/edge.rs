//! Edge implementation for the knowledge graph

use super::property::PropertyMap;
use super::types::{EdgeType, NodeKey};
use serde::{Deserialize, Serialize};

/// A directed, typed edge between two node identities
///
/// An edge is identified by `(source, target, edge_type)`; adding the same
/// triple again merges properties into the existing edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Source node (edge goes FROM this node)
    pub source: NodeKey,

    /// Target node (edge goes TO this node)
    pub target: NodeKey,

    /// Relationship type (e.g., "WORKS_FOR")
    pub edge_type: EdgeType,

    /// Properties associated with this edge
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Edge {
    /// Create a new directed edge with properties
    pub fn new(
        source: NodeKey,
        target: NodeKey,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> Self {
        Edge {
            source,
            target,
            edge_type: edge_type.into(),
            properties,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// The same edge pointing the other way, with identical properties
    pub fn reversed(&self) -> Self {
        Edge::new(
            self.target.clone(),
            self.source.clone(),
            self.edge_type.clone(),
            self.properties.clone(),
        )
    }

    /// Merge properties over the existing ones
    pub fn merge(&mut self, properties: PropertyMap) {
        self.properties.extend(properties);
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.target == other.target && self.edge_type == other.edge_type
    }
}

impl Eq for Edge {}
