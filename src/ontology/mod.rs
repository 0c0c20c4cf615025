//! Ontology: the declarative schema of the knowledge graph
//!
//! An ontology is loaded from a YAML document with three sections:
//!
//! ```yaml
//! world:
//!   name: Companies
//!   description: Public companies and the people who run them
//! entity_classes:
//!   Company:
//!     description: A business
//!     properties:
//!       - {name: name, type: string, description: Legal name, primary_key: true}
//! relationships:
//!   PARTNERS_WITH:
//!     domain: Company
//!     range: Company
//!     description: Business partnership
//!     symmetric: true
//!     properties: []
//! ```
//!
//! Loading validates the whole document; any problem is a
//! [`ConfigurationError`] and no partially-built ontology is returned.

mod document;
pub mod entity_class;
pub mod property;
pub mod relationship_class;

pub use entity_class::EntityClass;
pub use property::{Property, PropertyType};
pub use relationship_class::RelationshipClass;

use crate::error::{ConfigurationError, ConfigurationResult};
use document::{OntologyDocument, PropertyDocument};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

const UNNAMED: &str = "N/A";

/// The complete schema: world description, entity classes and relationships
#[derive(Debug, Clone, PartialEq)]
pub struct Ontology {
    name: String,
    description: String,
    entity_classes: Vec<EntityClass>,
    relationship_classes: Vec<RelationshipClass>,
}

impl Ontology {
    /// Load an ontology from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigurationResult<Self> {
        let path = path.as_ref();
        info!("Loading ontology from {:?}", path);
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Load an ontology from YAML text
    pub fn from_yaml_str(text: &str) -> ConfigurationResult<Self> {
        let document: OntologyDocument = serde_yaml::from_str(text)?;
        let ontology = Self::from_document(document)?;
        info!(
            "Ontology '{}' loaded: {} entity classes, {} relationships",
            ontology.name,
            ontology.entity_classes.len(),
            ontology.relationship_classes.len()
        );
        Ok(ontology)
    }

    fn from_document(document: OntologyDocument) -> ConfigurationResult<Self> {
        let mut entity_classes = Vec::with_capacity(document.entity_classes.len());
        for (name, class) in document.entity_classes {
            let properties = build_properties(&name, class.properties)?;
            debug!("Entity class {} with {} properties", name, properties.len());
            entity_classes.push(EntityClass::new(name, class.description.unwrap_or_default(), properties)?);
        }

        let find = |relationship: &str, role: &'static str, class: Option<String>| {
            let class = class.ok_or_else(|| ConfigurationError::MissingEndpoint {
                relationship: relationship.to_string(),
                role,
            })?;
            entity_classes
                .iter()
                .find(|c| c.name() == class)
                .ok_or(ConfigurationError::UndefinedClass {
                    relationship: relationship.to_string(),
                    role,
                    class,
                })
        };

        let mut relationship_classes = Vec::with_capacity(document.relationships.len());
        for (name, rel) in document.relationships {
            let domain = find(&name, "domain", rel.domain)?;
            let range = find(&name, "range", rel.range)?;
            let properties = build_properties(&name, rel.properties)?;
            debug!("Relationship {}: {} -> {}", name, domain.name(), range.name());
            relationship_classes.push(RelationshipClass::new(
                name,
                rel.description.unwrap_or_default(),
                domain,
                range,
                properties,
                rel.symmetric,
            )?);
        }

        Ok(Self {
            name: document.world.name.unwrap_or_else(|| UNNAMED.to_string()),
            description: document.world.description.unwrap_or_else(|| UNNAMED.to_string()),
            entity_classes,
            relationship_classes,
        })
    }

    /// World name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Entity classes, in document order
    pub fn entity_classes(&self) -> &[EntityClass] {
        &self.entity_classes
    }

    /// Relationship classes, in document order
    pub fn relationship_classes(&self) -> &[RelationshipClass] {
        &self.relationship_classes
    }

    pub fn find_entity_class(&self, name: &str) -> Option<&EntityClass> {
        let found = self.entity_classes.iter().find(|c| c.name() == name);
        if found.is_none() {
            debug!("Entity class not found: {}", name);
        }
        found
    }

    pub fn find_relationship_class(&self, name: &str) -> Option<&RelationshipClass> {
        self.relationship_classes.iter().find(|r| r.name() == name)
    }
}

fn build_properties(owner: &str, documents: Vec<PropertyDocument>) -> ConfigurationResult<Vec<Property>> {
    documents
        .into_iter()
        .map(|p| Property::from_parts(owner, p.name, p.type_name, p.description, p.primary_key))
        .collect()
}

impl fmt::Display for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ontology Name: {}", self.name)?;
        writeln!(f, "Ontology Description: {}", self.description)?;
        writeln!(f, "Entity Classes:")?;
        for class in &self.entity_classes {
            writeln!(f, "   {}", class)?;
        }
        writeln!(f, "Relationship Classes:")?;
        for rel in &self.relationship_classes {
            write!(f, "   {}", rel)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPANIES: &str = r#"
world:
  name: Companies
  description: Businesses and people
entity_classes:
  Person:
    description: A human
    properties:
      - {name: name, type: string, description: Full name, primary_key: true}
      - {name: born, type: date, description: Birth date}
  Company:
    description: A business
    properties:
      - {name: name, type: string, description: Legal name, primary_key: true}
      - {name: revenue, type: float, description: Annual revenue}
relationships:
  WORKS_FOR:
    domain: Person
    range: Company
    description: Employment
    properties:
      - {name: role, type: string, description: Job title}
  PARTNERS_WITH:
    domain: Company
    range: Company
    description: Partnership
    symmetric: true
"#;

    #[test]
    fn test_load_preserves_document_order() {
        let ontology = Ontology::from_yaml_str(COMPANIES).unwrap();
        assert_eq!(ontology.name(), "Companies");
        let names: Vec<&str> = ontology.entity_classes().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Person", "Company"]);
        let rels: Vec<&str> = ontology.relationship_classes().iter().map(|r| r.name()).collect();
        assert_eq!(rels, ["WORKS_FOR", "PARTNERS_WITH"]);
    }

    #[test]
    fn test_relationship_endpoints_resolved() {
        let ontology = Ontology::from_yaml_str(COMPANIES).unwrap();
        let rel = ontology.find_relationship_class("PARTNERS_WITH").unwrap();
        assert!(rel.is_symmetric());
        assert_eq!(rel.domain(), "Company");
        assert!(rel.properties().is_empty());

        let person = ontology.find_entity_class("Person").unwrap();
        assert_eq!(person.property("born").unwrap().property_type, PropertyType::Date);
        assert!(ontology.find_entity_class("Robot").is_none());
    }

    #[test]
    fn test_missing_world_defaults() {
        let ontology = Ontology::from_yaml_str("entity_classes: {}").unwrap();
        assert_eq!(ontology.name(), "N/A");
        assert!(ontology.entity_classes().is_empty());
    }

    #[test]
    fn test_undefined_range_class() {
        let text = COMPANIES.replace("    range: Company\n    description: Employment", "    range: Employer\n    description: Employment");
        let err = Ontology::from_yaml_str(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UndefinedClass { ref relationship, role: "range", ref class }
                if relationship == "WORKS_FOR" && class == "Employer"
        ));
    }

    #[test]
    fn test_missing_domain() {
        let text = r#"
entity_classes:
  Company:
    description: A business
    properties:
      - {name: name, type: string, description: Legal name, primary_key: true}
relationships:
  OWNS:
    range: Company
    description: Ownership
"#;
        let err = Ontology::from_yaml_str(text).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingEndpoint { role: "domain", .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Ontology::from_yaml_str("entity_classes: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigurationError::Yaml(_)));
    }

    #[test]
    fn test_display_renders_everything() {
        let ontology = Ontology::from_yaml_str(COMPANIES).unwrap();
        let text = ontology.to_string();
        assert!(text.starts_with("Ontology Name: Companies\n"));
        assert!(text.contains("Entity Classes:"));
        assert!(text.contains("WORKS_FOR (Employment) - Domain: Person - Range: Company"));
        assert!(text.contains("(This relationship is symmetric)"));
    }
}
