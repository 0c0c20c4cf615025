//! Node implementation for the knowledge graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeKey};
use serde::{Deserialize, Serialize};

/// A node in the knowledge graph
///
/// Nodes have:
/// - An immutable identity `(label, primary key)`
/// - Properties (key-value pairs, including the primary key itself)
/// - Creation and update timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Identity of this node
    pub key: NodeKey,

    /// Properties associated with this node
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Node {
    /// Create a new node with its initial property set
    pub fn new(key: NodeKey, properties: PropertyMap) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Node {
            key,
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Label of this node
    pub fn label(&self) -> &Label {
        self.key.label()
    }

    /// Merge properties over the existing ones.
    ///
    /// Same-named fields are overwritten; fields absent from `properties` are kept.
    pub fn merge(&mut self, properties: PropertyMap) {
        self.properties.extend(properties);
        self.update_timestamp();
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Update the modification timestamp
    fn update_timestamp(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> Node {
        let mut props = PropertyMap::new();
        props.insert("name".to_string(), name.into());
        Node::new(NodeKey::new("Person", name), props)
    }

    fn update(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_create_node() {
        let node = person("Alice");
        assert_eq!(node.label(), &Label::new("Person"));
        assert_eq!(node.get_property("name").unwrap().as_string(), Some("Alice"));
        assert_eq!(node.properties.len(), 1);
        assert!(node.created_at > 0);
        assert_eq!(node.created_at, node.updated_at);
    }

    #[test]
    fn test_merge_overwrites_and_preserves() {
        let mut node = person("Bob");
        node.merge(update(&[("age", 30i64.into()), ("city", "Paris".into())]));
        node.merge(update(&[("age", 31i64.into()), ("role", "Engineer".into())]));

        assert_eq!(node.get_property("age").unwrap().as_integer(), Some(31));
        assert_eq!(node.get_property("city").unwrap().as_string(), Some("Paris"));
        assert_eq!(node.get_property("role").unwrap().as_string(), Some("Engineer"));
        assert_eq!(node.properties.len(), 4);
    }

    #[test]
    fn test_node_timestamps() {
        let node = person("Carol");
        std::thread::sleep(std::time::Duration::from_millis(10));
        let mut node2 = node.clone();
        node2.merge(update(&[("key", "value".into())]));

        assert!(node2.updated_at > node.updated_at);
        assert_eq!(node2.created_at, node.created_at);
    }

    #[test]
    fn test_node_equality_is_identity() {
        let node1 = person("Dan");
        let mut node2 = person("Dan");
        node2.merge(update(&[("age", 40i64.into())]));
        let node3 = person("Eve");

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
    }
}
