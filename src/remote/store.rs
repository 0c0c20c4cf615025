//! [`GraphStore`] backed by a remote graph database

use super::client::{CypherClient, RemoteResult};
use super::cypher;
use crate::config::RemoteConfig;
use crate::graph::{
    properties_from_json, properties_to_json, EntityRef, GraphStatistics, GraphStore, NodeKey, PropertyMap,
    PropertyValue, StoreError, StoreResult,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Remote backend speaking Cypher over HTTP.
///
/// Every operation is a separate request. Connection and server failures are
/// logged and read as empty results; only a missing relationship endpoint is
/// reported as an error.
pub struct RemoteGraph {
    client: CypherClient,
    closed: AtomicBool,
}

impl RemoteGraph {
    /// Build a client for `config`. No request is made until the first operation.
    pub fn connect(config: &RemoteConfig) -> RemoteResult<Self> {
        let client = CypherClient::new(config)?;
        info!("Remote graph configured at {}", client.commit_url());
        Ok(Self {
            client,
            closed: AtomicBool::new(false),
        })
    }

    /// Round-trip a trivial statement to check the server is reachable
    pub async fn verify_connectivity(&self) -> RemoteResult<()> {
        self.client.run(cypher::PING, json!({})).await?;
        info!("Remote graph at {} is reachable", self.client.commit_url());
        Ok(())
    }

    fn is_closed(&self) -> bool {
        let closed = self.closed.load(Ordering::Acquire);
        if closed {
            warn!("Remote graph is closed, ignoring request");
        }
        closed
    }

    /// Run a statement, logging and swallowing failures
    async fn run_logged(&self, what: &str, statement: &str, parameters: Value) -> Option<Vec<Vec<Value>>> {
        if self.is_closed() {
            return None;
        }
        match self.client.run(statement, parameters).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!("Remote {} failed: {}", what, e);
                None
            }
        }
    }

    /// Read rows whose first column is a property object
    async fn fetch_properties(&self, what: &str, statement: &str, parameters: Value) -> Vec<PropertyMap> {
        self.run_logged(what, statement, parameters)
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|row| row.first())
            .map(properties_from_json)
            .collect()
    }

    async fn count(&self, statement: &str) -> usize {
        self.run_logged("count", statement, json!({}))
            .await
            .and_then(|rows| rows.first().and_then(|row| row.first()).and_then(Value::as_u64))
            .unwrap_or(0) as usize
    }
}

fn first_count(row: &[Value], idx: usize) -> u64 {
    row.get(idx).and_then(Value::as_u64).unwrap_or(0)
}

#[async_trait]
impl GraphStore for RemoteGraph {
    async fn add_or_update_entity(
        &self,
        label: &str,
        pk_field: &str,
        properties: PropertyMap,
    ) -> StoreResult<()> {
        let pk_value = match properties.get(pk_field) {
            Some(pk) => pk.to_json(),
            None => {
                warn!("Primary key '{}' not found in {} properties, ignoring upsert", pk_field, label);
                return Ok(());
            }
        };

        let params = json!({ "pk_value": pk_value, "props": properties_to_json(&properties) });
        if self
            .run_logged("upsert", &cypher::upsert_entity(label, pk_field), params)
            .await
            .is_some()
        {
            debug!("Upserted {}({})", label, pk_value);
        }
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
        let params = json!({
            "from_value": from.pk_value.to_json(),
            "to_value": to.pk_value.to_json(),
            "props": properties.as_ref().map(properties_to_json).unwrap_or_else(|| json!({})),
        });

        let check = cypher::count_endpoints(from.label, from.pk_field, to.label, to.pk_field);
        let Some(rows) = self.run_logged("endpoint check", &check, params.clone()).await else {
            return Ok(());
        };
        let row = rows.first().map(Vec::as_slice).unwrap_or(&[]);
        for (idx, endpoint) in [(0, &from), (1, &to)] {
            if first_count(row, idx) == 0 {
                let key: NodeKey = endpoint.node_key();
                warn!("Cannot link {} -[{}]-> {}: {} does not exist", from.node_key(), rel_type, to.node_key(), key);
                return Err(StoreError::EndpointNotFound(key));
            }
        }

        let forward = cypher::merge_relationship(from.label, from.pk_field, to.label, to.pk_field, rel_type, false);
        self.run_logged("relationship upsert", &forward, params.clone()).await;

        if symmetric {
            let reverse = cypher::merge_relationship(from.label, from.pk_field, to.label, to.pk_field, rel_type, true);
            self.run_logged("reverse relationship upsert", &reverse, params).await;
        }

        debug!("Linked {} -[{}]-> {}", from.node_key(), rel_type, to.node_key());
        Ok(())
    }

    async fn get_all_entities_by_label(&self, label: &str) -> Vec<PropertyMap> {
        self.fetch_properties("label scan", &cypher::all_by_label(label), json!({}))
            .await
    }

    async fn get_entity_properties(
        &self,
        label: &str,
        pk_field: &str,
        pk_value: &PropertyValue,
    ) -> Option<PropertyMap> {
        let params = json!({ "pk_value": pk_value.to_json() });
        let found = self
            .fetch_properties("entity lookup", &cypher::entity_properties(label, pk_field), params)
            .await
            .into_iter()
            .next();
        if found.is_none() {
            debug!("No node found for {}({})", label, pk_value.key_string());
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
        let statement = cypher::related_entities(from.label, from.pk_field, rel_type, range_label);
        let params = json!({ "from_value": from.pk_value.to_json() });
        self.fetch_properties("traversal", &statement, params).await
    }

    async fn get_relationship_properties(
        &self,
        from: EntityRef<'_>,
        rel_type: &str,
        to: EntityRef<'_>,
    ) -> Option<PropertyMap> {
        let statement = cypher::relationship_properties(from.label, from.pk_field, rel_type, to.label, to.pk_field);
        let params = json!({
            "from_value": from.pk_value.to_json(),
            "to_value": to.pk_value.to_json(),
        });
        self.fetch_properties("relationship lookup", &statement, params)
            .await
            .into_iter()
            .next()
    }

    async fn find_entities(&self, label: &str, field: &str, term: &str) -> Vec<PropertyMap> {
        self.fetch_properties("search", &cypher::find_entities(label, field), json!({ "term": term }))
            .await
    }

    async fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            node_count: self.count(cypher::COUNT_NODES).await,
            edge_count: self.count(cypher::COUNT_RELATIONSHIPS).await,
        }
    }

    async fn reset(&self) -> StoreResult<()> {
        info!("Deleting every node and relationship of the remote graph");
        self.run_logged("reset", cypher::DELETE_ALL, json!({})).await;
        Ok(())
    }

    async fn save(&self) -> StoreResult<()> {
        debug!("Remote graph commits every write, nothing to save");
        Ok(())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Remote graph connection to {} closed", self.client.commit_url());
        }
    }
}
