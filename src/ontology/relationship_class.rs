//! Relationship class: an edge type between two entity classes

use super::entity_class::{check_unique, conform, EntityClass};
use super::property::Property;
use crate::error::{ConfigurationError, ValidationError, ValidationResult};
use crate::graph::PropertyMap;
use serde::Serialize;
use std::fmt;

/// A class of relationships (edges), e.g. `WORKS_FOR: Person -> Company`
///
/// The domain and range primary keys are copied from the resolved entity
/// classes when the ontology is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipClass {
    name: String,
    description: String,
    domain: String,
    range: String,
    domain_key: Property,
    range_key: Property,
    properties: Vec<Property>,
    symmetric: bool,
}

impl RelationshipClass {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        domain: &EntityClass,
        range: &EntityClass,
        properties: Vec<Property>,
        symmetric: bool,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        check_unique(&name, &properties)?;

        Ok(Self {
            name,
            description: description.into(),
            domain: domain.name().to_string(),
            range: range.name().to_string(),
            domain_key: domain.primary_key().clone(),
            range_key: range.primary_key().clone(),
            properties,
            symmetric,
        })
    }

    /// Relationship name, used as edge type
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Domain (start node) class name
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Range (end node) class name
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Primary-key property of the domain class
    pub fn domain_key(&self) -> &Property {
        &self.domain_key
    }

    /// Primary-key property of the range class
    pub fn range_key(&self) -> &Property {
        &self.range_key
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Argument carrying the domain primary key: `from_<Domain>_<pk>`
    pub fn domain_param(&self) -> String {
        format!("from_{}_{}", self.domain, self.domain_key.name)
    }

    /// Argument carrying the range primary key: `to_<Range>_<pk>`
    pub fn range_param(&self) -> String {
        format!("to_{}_{}", self.range, self.range_key.name)
    }

    /// Every declared property must be present in a supplied property set
    pub fn validate_properties(&self, properties: &PropertyMap) -> ValidationResult<()> {
        match self.properties.iter().find(|p| !properties.contains_key(&p.name)) {
            Some(missing) => Err(ValidationError::SchemaMismatch {
                relationship: self.name.clone(),
                missing: missing.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Re-type stored edge properties against the declared property types
    pub fn conform(&self, properties: PropertyMap) -> PropertyMap {
        conform(&self.properties, properties)
    }
}

impl fmt::Display for RelationshipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}) - Domain: {} - Range: {}",
            self.name, self.description, self.domain, self.range
        )?;
        for property in &self.properties {
            writeln!(f, "   - {}", property)?;
        }
        if self.symmetric {
            writeln!(f, "   (This relationship is symmetric)")?;
        }
        Ok(())
    }
}
