//! Operations generated from the ontology
//!
//! Every entity class yields three operations and every relationship class
//! three more (see [`EntityOperations`] and [`RelationshipOperations`]). Each
//! operation is exposed as a [`Tool`]: a named, self-describing callable that
//! takes JSON arguments, validates them against the schema and runs against a
//! shared [`GraphStore`].

pub mod entity;
pub mod relationship;
pub mod schema;

pub use entity::EntityOperations;
pub use relationship::RelationshipOperations;
pub use schema::{Parameter, ParameterKind, ParameterSchema};

use crate::error::{ConfigurationError, ConfigurationResult, ValidationError};
use crate::graph::{GraphStore, StoreError};
use crate::ontology::Ontology;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown operation: {0}")]
    UnknownTool(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Whether an operation only reads the graph or may change it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolAccess {
    Read,
    Write,
}

/// Trait for generated operations
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn access(&self) -> ToolAccess;
    fn parameters(&self) -> &ParameterSchema;
    async fn execute(&self, args: Value) -> ToolResult<Value>;

    /// Name, description and JSON-Schema parameters, as handed to a tool-calling model
    fn definition(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": self.parameters().to_json_schema(),
        })
    }
}

/// Result payload of a successful write
pub(crate) fn ok_status() -> Value {
    json!({ "status": "ok" })
}

/// Operations by name, in generation order
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate every operation of `ontology`, bound to `store`
    pub fn from_ontology(ontology: &Ontology, store: Arc<dyn GraphStore>) -> ConfigurationResult<Self> {
        let mut registry = Self::new();

        for class in ontology.entity_classes() {
            let operations = Arc::new(EntityOperations::new(class.clone(), Arc::clone(&store)));
            for tool in operations.tools() {
                registry.register(tool)?;
            }
        }

        for rel in ontology.relationship_classes() {
            let range = ontology
                .find_entity_class(rel.range())
                .cloned()
                .ok_or_else(|| ConfigurationError::UndefinedClass {
                    relationship: rel.name().to_string(),
                    role: "range",
                    class: rel.range().to_string(),
                })?;
            let operations = Arc::new(RelationshipOperations::new(rel.clone(), range, Arc::clone(&store)));
            for tool in operations.tools() {
                registry.register(tool)?;
            }
        }

        info!("Generated {} operations from ontology '{}'", registry.len(), ontology.name());
        Ok(registry)
    }

    /// Add a tool; names must be unique
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> ConfigurationResult<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ConfigurationError::DuplicateOperation(name));
        }
        debug!("Registered operation {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Operations that only read the graph
    pub fn read_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.by_access(ToolAccess::Read)
    }

    /// Operations that add or update graph data
    pub fn write_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.by_access(ToolAccess::Write)
    }

    fn by_access(&self, access: ToolAccess) -> Vec<Arc<dyn Tool>> {
        self.tools
            .values()
            .filter(|tool| tool.access() == access)
            .cloned()
            .collect()
    }

    /// Call an operation by name
    pub async fn invoke(&self, name: &str, args: Value) -> ToolResult<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!("Invoking {} with {}", name, args);
        tool.execute(args).await
    }

    /// Definitions of every operation
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}
