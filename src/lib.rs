//! Factbase
//!
//! An ontology-driven knowledge graph layer for language-model agents.
//!
//! # Architecture
//!
//! - [`ontology`]: YAML schema of entity classes, relationships and typed properties
//! - [`tools`]: named, type-checked operations generated from the ontology
//! - [`graph`]: the [`GraphStore`] contract and the in-process [`MemoryGraph`]
//! - [`persistence`]: snapshot files of the in-process graph
//! - [`remote`]: the [`RemoteGraph`] backend (Cypher over HTTP)
//! - [`knowledge`]: the [`KnowledgeGraph`] facade handed to agents
//! - [`config`]: backend selection and connection settings
//!
//! Both backends behave identically for entity upserts (merge on the
//! primary key), relationship creation (including symmetric relationships)
//! and lookups.
//!
//! ## Example Usage
//!
//! ```rust
//! use factbase::{KnowledgeGraph, MemoryGraph, Ontology};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ontology = Ontology::from_yaml_str(r#"
//! entity_classes:
//!   Person:
//!     description: A human
//!     properties:
//!       - {name: name, type: string, description: Full name, primary_key: true}
//!   Company:
//!     description: A business
//!     properties:
//!       - {name: name, type: string, description: Legal name, primary_key: true}
//! relationships:
//!   WORKS_FOR:
//!     domain: Person
//!     range: Company
//!     description: Employment
//! "#)?;
//!
//! let kg = KnowledgeGraph::new(ontology, Arc::new(MemoryGraph::new()))?;
//! kg.invoke("add_or_update_Person_information", json!({"name": "Alice"})).await?;
//! kg.invoke("add_or_update_Company_information", json!({"name": "Acme"})).await?;
//! kg.invoke(
//!     "add_link_Person_WORKS_FOR_Company",
//!     json!({"from_Person_name": "Alice", "to_Company_name": "Acme"}),
//! )
//! .await?;
//!
//! let employers = kg
//!     .invoke("get_Companys_Person_WORKS_FOR", json!({"from_Person_name": "Alice"}))
//!     .await?;
//! assert_eq!(employers, json!([{"name": "Acme"}]));
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod graph;
pub mod knowledge;
pub mod ontology;
pub mod persistence;
pub mod remote;
pub mod tools;

// Re-export main types for convenience
pub use config::{BackendConfig, KnowledgeConfig, RemoteConfig};

pub use error::{ConfigurationError, ConfigurationResult, ValidationError, ValidationResult};

pub use graph::{
    Edge, EdgeType, EntityRef, GraphStatistics, GraphStore, Label, MemoryGraph, Node, NodeKey,
    PropertyMap, PropertyValue, StoreError, StoreResult,
};

pub use knowledge::{
    AgentError, AgentRequest, AgentResult, AgentTask, KnowledgeAgent, KnowledgeError, KnowledgeGraph,
    KnowledgeResult,
};

pub use ontology::{EntityClass, Ontology, Property, PropertyType, RelationshipClass};

pub use persistence::{Snapshot, SnapshotError};

pub use remote::{RemoteError, RemoteGraph};

pub use tools::{
    EntityOperations, ParameterSchema, RelationshipOperations, Tool, ToolAccess, ToolError, ToolRegistry,
    ToolResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
