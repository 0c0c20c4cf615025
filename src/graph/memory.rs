//! In-process graph storage with snapshot persistence
//!
//! Uses hash maps for O(1) identity lookups:
//! - nodes: arena of nodes, addressed through `node_index: NodeKey -> slot`
//! - edges: arena of edges, addressed through `edge_index: (source, target, type) -> slot`
//! - outgoing: slot -> Vec<edge slot> (adjacency list for outgoing edges)
//! - label_index: Label -> Set<NodeKey> (index for fast label lookups)

use super::edge::Edge;
use super::node::Node;
use super::property::{PropertyMap, PropertyValue};
use super::store::{EntityRef, GraphStatistics, GraphStore, StoreError, StoreResult};
use super::types::{EdgeType, Label, NodeKey};
use crate::persistence::{Snapshot, SnapshotError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Directed graph state behind [`MemoryGraph`]
#[derive(Debug, Default)]
pub struct GraphState {
    /// Node storage
    nodes: Vec<Node>,

    /// Node identity -> slot in `nodes`
    node_index: HashMap<NodeKey, usize>,

    /// Edge storage
    edges: Vec<Edge>,

    /// (source slot, target slot, type) -> slot in `edges`
    edge_index: HashMap<(usize, usize, EdgeType), usize>,

    /// Outgoing edges for each node (adjacency list)
    outgoing: Vec<Vec<usize>>,

    /// Label index for fast lookups
    label_index: HashMap<Label, HashSet<NodeKey>>,
}

impl GraphState {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph (and all indices) from stored nodes and edges
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, SnapshotError> {
        let mut state = GraphState::new();
        for node in nodes {
            if state.node_index.contains_key(&node.key) {
                return Err(SnapshotError::DuplicateNode(node.key));
            }
            state.insert_node(node);
        }
        for edge in edges {
            if !state.has_node(&edge.source) {
                return Err(SnapshotError::DanglingEdge(edge.source));
            }
            if !state.has_node(&edge.target) {
                return Err(SnapshotError::DanglingEdge(edge.target));
            }
            state.upsert_edge(edge);
        }
        Ok(state)
    }

    /// Insert a node or merge properties into the existing one.
    ///
    /// Returns true if a new node was created.
    pub fn upsert_node(&mut self, key: NodeKey, properties: PropertyMap) -> bool {
        if let Some(&idx) = self.node_index.get(&key) {
            self.nodes[idx].merge(properties);
            false
        } else {
            self.insert_node(Node::new(key, properties));
            true
        }
    }

    fn insert_node(&mut self, node: Node) {
        let idx = self.nodes.len();

        // Add to label index
        self.label_index
            .entry(node.label().clone())
            .or_insert_with(HashSet::new)
            .insert(node.key.clone());

        self.node_index.insert(node.key.clone(), idx);
        self.outgoing.push(Vec::new());
        self.nodes.push(node);
    }

    /// Insert an edge or merge properties into the existing edge of the same
    /// `(source, target, type)`. Endpoints must exist.
    ///
    /// Returns true if a new edge was created.
    pub fn upsert_edge(&mut self, edge: Edge) -> bool {
        let (source, target) = match (self.node_index.get(&edge.source), self.node_index.get(&edge.target)) {
            (Some(&s), Some(&t)) => (s, t),
            _ => return false,
        };

        let index_key = (source, target, edge.edge_type.clone());
        if let Some(&idx) = self.edge_index.get(&index_key) {
            self.edges[idx].merge(edge.properties);
            return false;
        }

        let idx = self.edges.len();
        self.edges.push(edge);
        self.edge_index.insert(index_key, idx);
        self.outgoing[source].push(idx);
        true
    }

    /// Check if a node exists
    pub fn has_node(&self, key: &NodeKey) -> bool {
        self.node_index.contains_key(key)
    }

    /// Get a node by identity
    pub fn get_node(&self, key: &NodeKey) -> Option<&Node> {
        self.node_index.get(key).map(|&idx| &self.nodes[idx])
    }

    /// Get the edge `source -[edge_type]-> target`
    pub fn get_edge(&self, source: &NodeKey, edge_type: &EdgeType, target: &NodeKey) -> Option<&Edge> {
        let s = *self.node_index.get(source)?;
        let t = *self.node_index.get(target)?;
        self.edge_index
            .get(&(s, t, edge_type.clone()))
            .map(|&idx| &self.edges[idx])
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, key: &NodeKey) -> Vec<&Edge> {
        self.node_index
            .get(key)
            .map(|&idx| self.outgoing[idx].iter().map(|&e| &self.edges[e]).collect())
            .unwrap_or_default()
    }

    /// Get all nodes with a label, in insertion order
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        let mut slots: Vec<usize> = self
            .label_index
            .get(label)
            .map(|keys| keys.iter().filter_map(|k| self.node_index.get(k).copied()).collect())
            .unwrap_or_default();
        slots.sort_unstable();
        slots.into_iter().map(|idx| &self.nodes[idx]).collect()
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The label index
    pub fn label_index(&self) -> &HashMap<Label, HashSet<NodeKey>> {
        &self.label_index
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Clear all data
    pub fn clear(&mut self) {
        *self = GraphState::new();
    }
}

/// In-process [`GraphStore`] backed by [`GraphState`].
///
/// When opened on a snapshot path, the snapshot is loaded on construction and
/// rewritten wholesale by [`GraphStore::save`]. [`GraphStore::close`] discards
/// the in-memory state without saving.
#[derive(Debug)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryGraph {
    /// Create an empty, non-persistent graph
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GraphState::new()),
            snapshot_path: None,
        }
    }

    /// Open a graph persisted at `path`, loading the snapshot if one exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match Snapshot::read_from(&path)? {
            Some(snapshot) => GraphState::from_parts(snapshot.nodes, snapshot.edges)?,
            None => {
                debug!("No snapshot at {:?}, starting with an empty graph", path);
                GraphState::new()
            }
        };

        info!(
            "In-memory graph initialized with {} nodes, {} relationships",
            state.node_count(),
            state.edge_count()
        );

        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
        })
    }

    /// Snapshot location, if this graph is persistent
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Acquire a read lock on the graph state.
    ///
    /// Use for direct read-only access (label index, iteration).
    pub async fn state(&self) -> tokio::sync::RwLockReadGuard<'_, GraphState> {
        self.state.read().await
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_ignore_case(value: &PropertyValue, needle: &str) -> bool {
    value.key_string().to_lowercase().contains(needle)
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn add_or_update_entity(
        &self,
        label: &str,
        pk_field: &str,
        properties: PropertyMap,
    ) -> StoreResult<()> {
        let key = match properties.get(pk_field) {
            Some(pk) => NodeKey::new(label, pk.key_string()),
            None => {
                warn!("Primary key '{}' not found in {} properties, ignoring upsert", pk_field, label);
                return Ok(());
            }
        };

        let created = self.state.write().await.upsert_node(key.clone(), properties);
        debug!("{} entity {}", if created { "Created" } else { "Updated" }, key);
        Ok(())
    }

    async fn add_relationship(
        &self,
        from: EntityRef<'_>,
        to: EntityRef<'_>,
        rel_type: &str,
        properties: Option<PropertyMap>,
        symmetric: bool,
    ) -> StoreResult<()> {
        let source = from.node_key();
        let target = to.node_key();

        let mut state = self.state.write().await;
        for endpoint in [&source, &target] {
            if !state.has_node(endpoint) {
                warn!("Cannot link {} -[{}]-> {}: {} does not exist", source, rel_type, target, endpoint);
                return Err(StoreError::EndpointNotFound(endpoint.clone()));
            }
        }

        let edge = Edge::new(source, target, rel_type, properties.unwrap_or_default());
        let reverse = symmetric.then(|| edge.reversed());
        debug!("Adding {} relationship {} -> {}", rel_type, edge.source, edge.target);
        state.upsert_edge(edge);
        if let Some(reverse) = reverse {
            state.upsert_edge(reverse);
        }
        Ok(())
    }

    async fn get_all_entities_by_label(&self, label: &str) -> Vec<PropertyMap> {
        let state = self.state.read().await;
        state
            .get_nodes_by_label(&Label::new(label))
            .into_iter()
            .map(|node| node.properties.clone())
            .collect()
    }

    async fn get_entity_properties(
        &self,
        label: &str,
        _pk_field: &str,
        pk_value: &PropertyValue,
    ) -> Option<PropertyMap> {
        let key = NodeKey::new(label, pk_value.key_string());
        let state = self.state.read().await;
        let found = state.get_node(&key).map(|node| node.properties.clone());
        if found.is_none() {
            debug!("No node found for {}", key);
        }
        found
    }

    async fn get_relationship_entities(
        &self,
        from: EntityRef<'_>,
        rel_type: &str,
        range_label: &str,
        _range_pk_field: &str,
    ) -> Vec<PropertyMap> {
        let source = from.node_key();
        let state = self.state.read().await;
        if !state.has_node(&source) {
            debug!("No domain node found for {}", source);
            return Vec::new();
        }

        state
            .get_outgoing_edges(&source)
            .into_iter()
            .filter(|edge| edge.edge_type.as_str() == rel_type && edge.target.label().as_str() == range_label)
            .filter_map(|edge| state.get_node(&edge.target))
            .map(|node| node.properties.clone())
            .collect()
    }

    async fn get_relationship_properties(
        &self,
        from: EntityRef<'_>,
        rel_type: &str,
        to: EntityRef<'_>,
    ) -> Option<PropertyMap> {
        let source = from.node_key();
        let target = to.node_key();
        let state = self.state.read().await;
        let found = state
            .get_edge(&source, &EdgeType::new(rel_type), &target)
            .map(|edge| edge.properties.clone());
        if found.is_none() {
            debug!("No {} relationship found for {} -> {}", rel_type, source, target);
        }
        found
    }

    async fn find_entities(&self, label: &str, field: &str, term: &str) -> Vec<PropertyMap> {
        let needle = term.to_lowercase();
        let state = self.state.read().await;
        state
            .get_nodes_by_label(&Label::new(label))
            .into_iter()
            .filter(|node| {
                node.get_property(field)
                    .map(|value| contains_ignore_case(value, &needle))
                    .unwrap_or(false)
            })
            .map(|node| node.properties.clone())
            .collect()
    }

    async fn statistics(&self) -> GraphStatistics {
        let state = self.state.read().await;
        GraphStatistics {
            node_count: state.node_count(),
            edge_count: state.edge_count(),
        }
    }

    async fn reset(&self) -> StoreResult<()> {
        info!("Resetting in-memory graph");
        self.state.write().await.clear();
        Ok(())
    }

    async fn save(&self) -> StoreResult<()> {
        let path = match &self.snapshot_path {
            Some(path) => path,
            None => {
                debug!("In-memory graph has no snapshot path, nothing to save");
                return Ok(());
            }
        };

        let state = self.state.read().await;
        Snapshot::write_to(path, state.nodes(), state.edges())?;
        info!(
            "Saved graph to {:?} ({} nodes, {} relationships)",
            path,
            state.node_count(),
            state.edge_count()
        );
        Ok(())
    }

    async fn close(&self) {
        info!("Closing in-memory graph, discarding unsaved state");
        self.state.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_upsert_node_merges() {
        let mut state = GraphState::new();
        let key = NodeKey::new("Person", "p1");

        assert!(state.upsert_node(key.clone(), props(&[("id", "p1".into()), ("age", 30i64.into())])));
        assert!(!state.upsert_node(key.clone(), props(&[("id", "p1".into()), ("city", "Oslo".into())])));

        let node = state.get_node(&key).unwrap();
        assert_eq!(node.get_property("age").unwrap().as_integer(), Some(30));
        assert_eq!(node.get_property("city").unwrap().as_string(), Some("Oslo"));
        assert_eq!(state.node_count(), 1);
    }

    #[test]
    fn test_label_index_partitions_nodes() {
        let mut state = GraphState::new();
        state.upsert_node(NodeKey::new("TypeA", "e1"), props(&[("id", "e1".into())]));
        state.upsert_node(NodeKey::new("TypeB", "e1"), props(&[("id", "e1".into())]));
        state.upsert_node(NodeKey::new("TypeA", "e2"), props(&[("id", "e2".into())]));

        assert_eq!(state.node_count(), 3);
        let indexed: usize = state.label_index().values().map(|keys| keys.len()).sum();
        assert_eq!(indexed, state.node_count());
        assert_eq!(state.get_nodes_by_label(&Label::new("TypeA")).len(), 2);
        assert!(state.get_nodes_by_label(&Label::new("Missing")).is_empty());
    }

    #[test]
    fn test_upsert_edge_requires_endpoints_and_merges() {
        let mut state = GraphState::new();
        let a = NodeKey::new("Company", "c1");
        let b = NodeKey::new("Company", "c2");
        state.upsert_node(a.clone(), props(&[("id", "c1".into())]));

        let edge = Edge::new(a.clone(), b.clone(), "PARTNERS_WITH", PropertyMap::new());
        assert!(!state.upsert_edge(edge.clone()));
        assert_eq!(state.edge_count(), 0);

        state.upsert_node(b.clone(), props(&[("id", "c2".into())]));
        assert!(state.upsert_edge(edge));
        let again = Edge::new(a.clone(), b.clone(), "PARTNERS_WITH", props(&[("since", 2020i64.into())]));
        assert!(!state.upsert_edge(again));

        assert_eq!(state.edge_count(), 1);
        let stored = state.get_edge(&a, &EdgeType::new("PARTNERS_WITH"), &b).unwrap();
        assert_eq!(stored.properties["since"], PropertyValue::Integer(2020));
        assert_eq!(state.get_outgoing_edges(&a).len(), 1);
        assert!(state.get_outgoing_edges(&b).is_empty());
    }

    #[test]
    fn test_from_parts_rejects_dangling_edges() {
        let a = NodeKey::new("Person", "a");
        let node = Node::new(a.clone(), props(&[("name", "a".into())]));
        let edge = Edge::new(a, NodeKey::new("Person", "ghost"), "KNOWS", PropertyMap::new());

        let err = GraphState::from_parts(vec![node], vec![edge]).unwrap_err();
        assert!(matches!(err, SnapshotError::DanglingEdge(key) if key.key() == "ghost"));
    }

    #[tokio::test]
    async fn test_missing_primary_key_is_noop() {
        let graph = MemoryGraph::new();
        graph
            .add_or_update_entity("Company", "id", props(&[("name", "TestCorp".into())]))
            .await
            .unwrap();
        assert_eq!(graph.statistics().await.node_count, 0);
    }

    #[tokio::test]
    async fn test_dangling_relationship_is_rejected() {
        let graph = MemoryGraph::new();
        graph
            .add_or_update_entity("Person", "name", props(&[("name", "Alice".into())]))
            .await
            .unwrap();

        let alice = PropertyValue::from("Alice");
        let acme = PropertyValue::from("Acme");
        let err = graph
            .add_relationship(
                EntityRef::new("Person", "name", &alice),
                EntityRef::new("Company", "name", &acme),
                "WORKS_FOR",
                None,
                true,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::EndpointNotFound(key) if key == NodeKey::new("Company", "Acme")));
        assert_eq!(graph.statistics().await.edge_count, 0);
    }

    #[tokio::test]
    async fn test_find_entities_substring() {
        let graph = MemoryGraph::new();
        for name in ["AlphaInc", "BetaCorp", "alphabet"] {
            graph
                .add_or_update_entity("Company", "name", props(&[("name", name.into())]))
                .await
                .unwrap();
        }

        let found = graph.find_entities("Company", "name", "ALPHA").await;
        assert_eq!(found.len(), 2);
        assert!(graph.find_entities("Company", "ticker", "alpha").await.is_empty());
        assert!(graph.find_entities("Person", "name", "alpha").await.is_empty());
    }

    #[tokio::test]
    async fn test_close_discards_state() {
        let graph = MemoryGraph::new();
        graph
            .add_or_update_entity("Person", "name", props(&[("name", "Alice".into())]))
            .await
            .unwrap();
        graph.close().await;

        assert_eq!(graph.statistics().await, GraphStatistics::default());
        assert!(graph.get_all_entities_by_label("Person").await.is_empty());
    }
}
