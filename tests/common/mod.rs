//! Shared fixtures for integration tests

#![allow(dead_code)]

use factbase::{GraphStore, MemoryGraph, PropertyMap, PropertyValue, RemoteConfig, RemoteGraph};
use std::sync::Arc;

pub const COMPANIES: &str = r#"
world:
  name: Companies
  description: People and the companies they work for
entity_classes:
  Person:
    description: A human
    properties:
      - {name: name, type: string, description: Full name, primary_key: true}
      - {name: born, type: date, description: Date of birth}
      - {name: age, type: integer, description: Age in years}
  Company:
    description: A business
    properties:
      - {name: name, type: string, description: Legal name, primary_key: true}
      - {name: revenue, type: float, description: Revenue in millions}
relationships:
  WORKS_FOR:
    domain: Person
    range: Company
    description: Employment
    properties:
      - {name: role, type: string, description: Job title}
      - {name: since, type: date, description: Start date}
  PARTNERS_WITH:
    domain: Company
    range: Company
    description: Strategic partnership
    symmetric: true
"#;

pub fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Fresh in-process store
pub fn memory() -> Arc<dyn GraphStore> {
    Arc::new(MemoryGraph::new())
}

/// Remote store from `FACTBASE_GRAPH_URI`, `FACTBASE_GRAPH_USER` and
/// `FACTBASE_GRAPH_PASSWORD`, wiped before use. `None` when unset.
pub async fn remote() -> Option<Arc<dyn GraphStore>> {
    let config = RemoteConfig::from_env().ok()?;
    let graph = RemoteGraph::connect(&config).expect("remote client");
    graph.verify_connectivity().await.expect("remote graph reachable");
    graph.reset().await.expect("remote reset");
    Some(Arc::new(graph))
}
