//! Raw YAML shape of an ontology document

use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OntologyDocument {
    #[serde(default)]
    pub world: WorldDocument,
    #[serde(default)]
    pub entity_classes: IndexMap<String, ClassDocument>,
    #[serde(default)]
    pub relationships: IndexMap<String, RelationshipDocument>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorldDocument {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassDocument {
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationshipDocument {
    pub domain: Option<String>,
    pub range: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub symmetric: bool,
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyDocument {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
}
