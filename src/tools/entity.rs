//! Operations generated for an entity class

use super::schema::{argument_object, required_argument, ParameterSchema};
use super::{ok_status, Tool, ToolAccess, ToolResult};
use crate::error::{ValidationError, ValidationResult};
use crate::graph::{properties_to_json, GraphStore, PropertyMap, PropertyValue, StoreResult};
use crate::ontology::EntityClass;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed operations on the nodes of one entity class
pub struct EntityOperations {
    class: EntityClass,
    store: Arc<dyn GraphStore>,
}

impl EntityOperations {
    pub fn new(class: EntityClass, store: Arc<dyn GraphStore>) -> Self {
        Self { class, store }
    }

    pub fn class(&self) -> &EntityClass {
        &self.class
    }

    /// Upsert a node of this class. A payload without the primary key is ignored.
    pub async fn add_or_update(&self, properties: PropertyMap) -> StoreResult<()> {
        let pk = self.class.primary_key();
        debug!(
            "Adding or updating {} entity ({} = {:?})",
            self.class.name(),
            pk.name,
            properties.get(&pk.name)
        );
        self.store
            .add_or_update_entity(self.class.name(), &pk.name, properties)
            .await
    }

    /// Every node of this class
    pub async fn get_all(&self) -> Vec<PropertyMap> {
        self.store
            .get_all_entities_by_label(self.class.name())
            .await
            .into_iter()
            .map(|props| self.class.conform(props))
            .collect()
    }

    /// Properties of the node whose primary key is `pk_value`
    pub async fn get_properties(&self, pk_value: &PropertyValue) -> Option<PropertyMap> {
        self.store
            .get_entity_properties(self.class.name(), &self.class.primary_key().name, pk_value)
            .await
            .map(|props| self.class.conform(props))
    }

    /// Nodes of this class whose `field` contains `term`, ignoring case
    pub async fn find(&self, field: &str, term: &str) -> Vec<PropertyMap> {
        self.store
            .find_entities(self.class.name(), field, term)
            .await
            .into_iter()
            .map(|props| self.class.conform(props))
            .collect()
    }

    /// Primary-key values of every node of this class
    pub async fn primary_keys(&self) -> Vec<PropertyValue> {
        let pk = &self.class.primary_key().name;
        self.get_all()
            .await
            .into_iter()
            .filter_map(|mut props| props.remove(pk))
            .collect()
    }

    /// Coerce a JSON payload into typed properties of this class.
    ///
    /// Null fields are dropped; undeclared fields and type mismatches are errors.
    pub fn coerce_properties(&self, operation: &str, args: &Value) -> ValidationResult<PropertyMap> {
        let mut properties = PropertyMap::new();
        let Some(map) = argument_object(operation, args)? else {
            return Ok(properties);
        };

        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            let declared = self.class.property(name).ok_or_else(|| ValidationError::UnknownProperty {
                owner: self.class.name().to_string(),
                property: name.clone(),
            })?;
            properties.insert(name.clone(), declared.property_type.coerce(name, value)?);
        }
        Ok(properties)
    }

    /// Name of the lookup argument: `<Class>_<pk>`
    pub fn lookup_param(&self) -> String {
        format!("{}_{}", self.class.name(), self.class.primary_key().name)
    }

    /// The three generated tools of this class
    pub fn tools(self: &Arc<Self>) -> Vec<Arc<dyn Tool>> {
        [EntityToolKind::AddOrUpdate, EntityToolKind::GetAll, EntityToolKind::GetProperties]
            .into_iter()
            .map(|kind| Arc::new(EntityTool::new(kind, Arc::clone(self))) as Arc<dyn Tool>)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityToolKind {
    AddOrUpdate,
    GetAll,
    GetProperties,
}

struct EntityTool {
    kind: EntityToolKind,
    name: String,
    description: String,
    parameters: ParameterSchema,
    operations: Arc<EntityOperations>,
}

impl EntityTool {
    fn new(kind: EntityToolKind, operations: Arc<EntityOperations>) -> Self {
        let class = operations.class();
        let pk = class.primary_key();
        let listing = class
            .properties()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("; ");

        let (name, description, parameters) = match kind {
            EntityToolKind::AddOrUpdate => (
                format!("add_or_update_{}_information", class.name()),
                format!(
                    "Add or update a {} entity. Primary key: {}\nProperties: {}",
                    class.name(),
                    pk.name,
                    listing
                ),
                ParameterSchema::from_properties(class.properties()),
            ),
            EntityToolKind::GetAll => (
                format!("get_all_{}_entities", class.name()),
                format!("Get all {} entities.", class.name()),
                ParameterSchema::empty(),
            ),
            EntityToolKind::GetProperties => (
                format!("get_{}_properties", class.name()),
                format!("Get a {} properties.\nReturns properties: {}", class.name(), listing),
                ParameterSchema::empty().scalar(
                    operations.lookup_param(),
                    pk.property_type,
                    format!("The {} of the {}", pk.name, class.name()),
                    true,
                ),
            ),
        };

        Self {
            kind,
            name,
            description,
            parameters,
            operations,
        }
    }
}

#[async_trait]
impl Tool for EntityTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn access(&self) -> ToolAccess {
        match self.kind {
            EntityToolKind::AddOrUpdate => ToolAccess::Write,
            EntityToolKind::GetAll | EntityToolKind::GetProperties => ToolAccess::Read,
        }
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    async fn execute(&self, args: Value) -> ToolResult<Value> {
        let ops = &self.operations;
        match self.kind {
            EntityToolKind::AddOrUpdate => {
                let properties = ops.coerce_properties(&self.name, &args)?;
                if !properties.contains_key(&ops.class().primary_key().name) {
                    warn!(
                        "{}: primary key '{}' missing, nothing written",
                        self.name,
                        ops.class().primary_key().name
                    );
                }
                ops.add_or_update(properties).await?;
                Ok(ok_status())
            }
            EntityToolKind::GetAll => {
                let entities = ops.get_all().await;
                Ok(Value::Array(entities.iter().map(properties_to_json).collect()))
            }
            EntityToolKind::GetProperties => {
                let map = argument_object(&self.name, &args)?;
                let pk = ops.class().primary_key();
                let pk_value = required_argument(map, &ops.lookup_param(), pk.property_type)?;
                Ok(ops
                    .get_properties(&pk_value)
                    .await
                    .map(|props| properties_to_json(&props))
                    .unwrap_or(Value::Null))
            }
        }
    }
}
