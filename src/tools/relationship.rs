//! Operations generated for a relationship class

use super::schema::{argument_object, required_argument, ParameterSchema};
use super::{ok_status, Tool, ToolAccess, ToolResult};
use crate::error::{ValidationError, ValidationResult};
use crate::graph::{properties_to_json, EntityRef, GraphStore, PropertyMap, PropertyValue};
use crate::ontology::{EntityClass, RelationshipClass};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Typed operations on the edges of one relationship class
pub struct RelationshipOperations {
    class: RelationshipClass,
    range: EntityClass,
    store: Arc<dyn GraphStore>,
}

impl RelationshipOperations {
    /// `range` is the resolved range class, used to type the entities returned
    /// by traversals.
    pub fn new(class: RelationshipClass, range: EntityClass, store: Arc<dyn GraphStore>) -> Self {
        Self { class, range, store }
    }

    pub fn class(&self) -> &RelationshipClass {
        &self.class
    }

    fn from_ref<'a>(&'a self, pk_value: &'a PropertyValue) -> EntityRef<'a> {
        EntityRef::new(self.class.domain(), &self.class.domain_key().name, pk_value)
    }

    fn to_ref<'a>(&'a self, pk_value: &'a PropertyValue) -> EntityRef<'a> {
        EntityRef::new(self.class.range(), &self.class.range_key().name, pk_value)
    }

    /// Link `from -> to`, plus `to -> from` for symmetric relationships.
    ///
    /// Supplied properties must carry every declared relationship property;
    /// otherwise nothing is written.
    pub async fn add_link(
        &self,
        from: &PropertyValue,
        to: &PropertyValue,
        properties: Option<PropertyMap>,
    ) -> ToolResult<()> {
        if let Some(props) = &properties {
            self.class.validate_properties(props)?;
        }

        debug!(
            "Linking {}({}) -[{}]-> {}({})",
            self.class.domain(),
            from.key_string(),
            self.class.name(),
            self.class.range(),
            to.key_string()
        );
        self.store
            .add_relationship(
                self.from_ref(from),
                self.to_ref(to),
                self.class.name(),
                properties,
                self.class.is_symmetric(),
            )
            .await?;
        Ok(())
    }

    /// Properties of the edge `from -> to`
    pub async fn get_properties(&self, from: &PropertyValue, to: &PropertyValue) -> Option<PropertyMap> {
        self.store
            .get_relationship_properties(self.from_ref(from), self.class.name(), self.to_ref(to))
            .await
            .map(|props| self.class.conform(props))
    }

    /// Range entities reachable from `from`
    pub async fn get_related(&self, from: &PropertyValue) -> Vec<PropertyMap> {
        self.store
            .get_relationship_entities(
                self.from_ref(from),
                self.class.name(),
                self.class.range(),
                &self.class.range_key().name,
            )
            .await
            .into_iter()
            .map(|props| self.range.conform(props))
            .collect()
    }

    /// Read the optional `properties` argument.
    ///
    /// A missing, null or empty object means "no properties supplied".
    /// Declared fields are coerced to their schema type; extra scalar fields
    /// are kept untyped.
    fn coerce_properties(&self, args: Option<&serde_json::Map<String, Value>>) -> ValidationResult<Option<PropertyMap>> {
        let value = match args.and_then(|map| map.get("properties")) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };
        let map = match value {
            Value::Object(map) if map.is_empty() => return Ok(None),
            Value::Object(map) => map,
            other => {
                return Err(ValidationError::InvalidType {
                    argument: "properties".to_string(),
                    expected: "an object",
                    found: other.to_string(),
                })
            }
        };

        let mut properties = PropertyMap::new();
        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            let coerced = match self.class.property(name) {
                Some(declared) => declared.property_type.coerce(name, value)?,
                // Undeclared fields are stored as given
                None => PropertyValue::from_json(value).ok_or_else(|| ValidationError::InvalidType {
                    argument: name.clone(),
                    expected: "a scalar",
                    found: value.to_string(),
                })?,
            };
            properties.insert(name.clone(), coerced);
        }
        Ok(Some(properties))
    }

    /// The three generated tools of this relationship
    pub fn tools(self: &Arc<Self>) -> Vec<Arc<dyn Tool>> {
        [
            RelationshipToolKind::AddLink,
            RelationshipToolKind::GetProperties,
            RelationshipToolKind::GetRelated,
        ]
        .into_iter()
        .map(|kind| Arc::new(RelationshipTool::new(kind, Arc::clone(self))) as Arc<dyn Tool>)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelationshipToolKind {
    AddLink,
    GetProperties,
    GetRelated,
}

struct RelationshipTool {
    kind: RelationshipToolKind,
    name: String,
    description: String,
    parameters: ParameterSchema,
    operations: Arc<RelationshipOperations>,
}

impl RelationshipTool {
    fn new(kind: RelationshipToolKind, operations: Arc<RelationshipOperations>) -> Self {
        let rel = operations.class();
        let (from_param, to_param) = (rel.domain_param(), rel.range_param());
        let keys = format!("Domain Primary Key: {}\nRange Primary Key: {}", from_param, to_param);
        let listing = rel
            .properties()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("; ");

        let endpoints = ParameterSchema::empty().scalar(
            from_param.clone(),
            rel.domain_key().property_type,
            format!("The {} of the FROM entity ({})", rel.domain_key().name, rel.domain()),
            true,
        );
        let both_endpoints = endpoints.clone().scalar(
            to_param,
            rel.range_key().property_type,
            format!("The {} of the TO entity ({})", rel.range_key().name, rel.range()),
            true,
        );

        let (name, description, parameters) = match kind {
            RelationshipToolKind::AddLink => {
                let mut parameters = both_endpoints;
                if !rel.properties().is_empty() {
                    parameters = parameters.object(
                        "properties",
                        ParameterSchema::from_properties(rel.properties()),
                        format!("Properties of the {} relationship", rel.name()),
                        false,
                    );
                }
                let mut description = format!(
                    "Add or update a [{}] relationship between a [{}] and [{}]\n{}",
                    rel.name(),
                    rel.domain(),
                    rel.range(),
                    keys
                );
                if !listing.is_empty() {
                    description.push_str(&format!("\nProperties: {}", listing));
                }
                (
                    format!("add_link_{}_{}_{}", rel.domain(), rel.name(), rel.range()),
                    description,
                    parameters,
                )
            }
            RelationshipToolKind::GetProperties => (
                format!("get_{}_properties", rel.name()),
                format!(
                    "Get a {} relationship properties between {} and {}.\n{}",
                    rel.name(),
                    rel.domain(),
                    rel.range(),
                    keys
                ),
                both_endpoints,
            ),
            RelationshipToolKind::GetRelated => (
                format!("get_{}s_{}_{}", rel.range(), rel.domain(), rel.name()),
                format!(
                    "Get all {}s linked to a {} in a {} relationship.\nDomain Primary Key: {}\nReturns a list of {}s",
                    rel.range(),
                    rel.domain(),
                    rel.name(),
                    from_param,
                    rel.range()
                ),
                endpoints,
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
impl Tool for RelationshipTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn access(&self) -> ToolAccess {
        match self.kind {
            RelationshipToolKind::AddLink => ToolAccess::Write,
            RelationshipToolKind::GetProperties | RelationshipToolKind::GetRelated => ToolAccess::Read,
        }
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    async fn execute(&self, args: Value) -> ToolResult<Value> {
        let ops = &self.operations;
        let rel = ops.class();
        let map = argument_object(&self.name, &args)?;
        let from = required_argument(map, &rel.domain_param(), rel.domain_key().property_type)?;

        match self.kind {
            RelationshipToolKind::AddLink => {
                let to = required_argument(map, &rel.range_param(), rel.range_key().property_type)?;
                let properties = ops.coerce_properties(map)?;
                ops.add_link(&from, &to, properties).await?;
                Ok(ok_status())
            }
            RelationshipToolKind::GetProperties => {
                let to = required_argument(map, &rel.range_param(), rel.range_key().property_type)?;
                Ok(ops
                    .get_properties(&from, &to)
                    .await
                    .map(|props| properties_to_json(&props))
                    .unwrap_or(Value::Null))
            }
            RelationshipToolKind::GetRelated => {
                let related = ops.get_related(&from).await;
                Ok(Value::Array(related.iter().map(properties_to_json).collect()))
            }
        }
    }
}
