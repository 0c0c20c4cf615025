//! Core identity types for the knowledge graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node label: the entity-class name attached to a stored node (e.g., "Person")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

/// Edge type: the relationship-class name carried by an edge (e.g., "WORKS_FOR")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeType(String);

impl EdgeType {
    pub fn new(edge_type: impl Into<String>) -> Self {
        EdgeType(edge_type.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        EdgeType(s)
    }
}

impl From<&str> for EdgeType {
    fn from(s: &str) -> Self {
        EdgeType(s.to_string())
    }
}

/// Node identity: `(label, primary key value)`.
///
/// The primary key is held in its canonical text form (see
/// [`PropertyValue::key_string`](super::PropertyValue::key_string)), so the
/// same entity is addressed identically whether the key arrived as a string
/// or as a typed value. The label is part of identity: the same key under two
/// labels names two distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeKey {
    label: Label,
    key: String,
}

impl NodeKey {
    pub fn new(label: impl Into<Label>, key: impl Into<String>) -> Self {
        NodeKey {
            label: label.into(),
            key: key.into(),
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label, self.key)
    }
}
