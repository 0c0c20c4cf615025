//! Entity class: a node type of the ontology

use super::property::Property;
use crate::error::ConfigurationError;
use crate::graph::PropertyMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A class of entities (nodes), e.g. `Company`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityClass {
    name: String,
    description: String,
    properties: Vec<Property>,
    #[serde(skip)]
    primary_key: usize,
}

impl EntityClass {
    /// Build a class from its properties.
    ///
    /// Exactly one property must be marked as primary key and property names
    /// must be unique.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        properties: Vec<Property>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        check_unique(&name, &properties)?;

        let keys: Vec<usize> = properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.primary_key)
            .map(|(i, _)| i)
            .collect();

        let primary_key = match keys.as_slice() {
            [single] => *single,
            [] => return Err(ConfigurationError::MissingPrimaryKey(name)),
            _ => {
                return Err(ConfigurationError::MultiplePrimaryKeys {
                    keys: keys.iter().map(|&i| properties[i].name.clone()).collect(),
                    class: name,
                })
            }
        };

        Ok(Self {
            name,
            description: description.into(),
            properties,
            primary_key,
        })
    }

    /// Class name, used as node label
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// The primary-key property
    pub fn primary_key(&self) -> &Property {
        &self.properties[self.primary_key]
    }

    /// Look up a declared property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Re-type stored values against the declared property types.
    ///
    /// Undeclared fields are passed through untouched.
    pub fn conform(&self, properties: PropertyMap) -> PropertyMap {
        conform(&self.properties, properties)
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.name, self.description)?;
        writeln!(f, "      Properties:")?;
        for property in &self.properties {
            writeln!(f, "      - {}", property)?;
        }
        Ok(())
    }
}

pub(crate) fn check_unique(owner: &str, properties: &[Property]) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for property in properties {
        if !seen.insert(property.name.as_str()) {
            return Err(ConfigurationError::DuplicateProperty {
                owner: owner.to_string(),
                property: property.name.clone(),
            });
        }
    }
    Ok(())
}

pub(crate) fn conform(declared: &[Property], properties: PropertyMap) -> PropertyMap {
    properties
        .into_iter()
        .map(|(name, value)| {
            let value = match declared.iter().find(|p| p.name == name) {
                Some(property) => property.property_type.conform(value),
                None => value,
            };
            (name, value)
        })
        .collect()
}
