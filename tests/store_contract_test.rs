//! Behaviour every GraphStore backend must share
//!
//! Each check runs against a fresh in-process graph. Setting the
//! FACTBASE_GRAPH_* variables runs the same checks, in sequence, against a
//! remote database as well.

mod common;

use common::{memory, props, remote};
use factbase::{EntityRef, GraphStore, NodeKey, PropertyValue, StoreError};
use std::sync::Arc;

async fn seed_people(store: &Arc<dyn GraphStore>) {
    store
        .add_or_update_entity("Person", "name", props(&[("name", "Alice".into())]))
        .await
        .unwrap();
    store
        .add_or_update_entity("Company", "name", props(&[("name", "Acme".into())]))
        .await
        .unwrap();
}

async fn check_upsert_is_idempotent(store: Arc<dyn GraphStore>) {
    for _ in 0..3 {
        store
            .add_or_update_entity("Person", "name", props(&[("name", "Alice".into()), ("age", 30.into())]))
            .await
            .unwrap();
    }
    store
        .add_or_update_entity("Person", "name", props(&[("name", "Alice".into()), ("age", 31.into())]))
        .await
        .unwrap();
    store
        .add_or_update_entity("Person", "name", props(&[("name", "Alice".into()), ("city", "Paris".into())]))
        .await
        .unwrap();

    assert_eq!(store.statistics().await.node_count, 1);
    let alice = store
        .get_entity_properties("Person", "name", &"Alice".into())
        .await
        .unwrap();
    let merged = props(&[("name", "Alice".into()), ("age", 31.into()), ("city", "Paris".into())]);
    assert_eq!(alice, merged);
    assert_eq!(store.get_all_entities_by_label("Person").await, vec![merged]);
}

async fn check_missing_primary_key_is_ignored(store: Arc<dyn GraphStore>) {
    store
        .add_or_update_entity("Person", "name", props(&[("age", 30.into())]))
        .await
        .unwrap();
    assert_eq!(store.statistics().await.node_count, 0);
    assert!(store.get_all_entities_by_label("Person").await.is_empty());
}

async fn check_relationships_are_unique(store: Arc<dyn GraphStore>) {
    seed_people(&store).await;
    let alice = PropertyValue::from("Alice");
    let acme = PropertyValue::from("Acme");

    for role in ["Engineer", "Lead"] {
        store
            .add_relationship(
                EntityRef::new("Person", "name", &alice),
                EntityRef::new("Company", "name", &acme),
                "WORKS_FOR",
                Some(props(&[("role", role.into())])),
                false,
            )
            .await
            .unwrap();
    }

    assert_eq!(store.statistics().await.edge_count, 1);
    let edge = store
        .get_relationship_properties(
            EntityRef::new("Person", "name", &alice),
            "WORKS_FOR",
            EntityRef::new("Company", "name", &acme),
        )
        .await
        .unwrap();
    assert_eq!(edge["role"], PropertyValue::from("Lead"));

    let employers = store
        .get_relationship_entities(EntityRef::new("Person", "name", &alice), "WORKS_FOR", "Company", "name")
        .await;
    assert_eq!(employers.len(), 1);
    assert_eq!(employers[0]["name"], acme);

    // Only the stored direction is traversable
    assert!(store
        .get_relationship_entities(EntityRef::new("Company", "name", &acme), "WORKS_FOR", "Person", "name")
        .await
        .is_empty());
}

async fn check_symmetric_links_both_ways(store: Arc<dyn GraphStore>) {
    for name in ["Acme", "Globex"] {
        store
            .add_or_update_entity("Company", "name", props(&[("name", name.into())]))
            .await
            .unwrap();
    }
    let acme = PropertyValue::from("Acme");
    let globex = PropertyValue::from("Globex");

    store
        .add_relationship(
            EntityRef::new("Company", "name", &acme),
            EntityRef::new("Company", "name", &globex),
            "PARTNERS_WITH",
            None,
            true,
        )
        .await
        .unwrap();

    assert_eq!(store.statistics().await.edge_count, 2);
    let forward = store
        .get_relationship_entities(EntityRef::new("Company", "name", &acme), "PARTNERS_WITH", "Company", "name")
        .await;
    let backward = store
        .get_relationship_entities(EntityRef::new("Company", "name", &globex), "PARTNERS_WITH", "Company", "name")
        .await;
    assert_eq!(forward[0]["name"], globex);
    assert_eq!(backward[0]["name"], acme);
}

async fn check_dangling_relationship_is_rejected(store: Arc<dyn GraphStore>) {
    seed_people(&store).await;
    let alice = PropertyValue::from("Alice");
    let ghost = PropertyValue::from("Initech");

    let err = store
        .add_relationship(
            EntityRef::new("Person", "name", &alice),
            EntityRef::new("Company", "name", &ghost),
            "WORKS_FOR",
            None,
            false,
        )
        .await
        .unwrap_err();

    match err {
        StoreError::EndpointNotFound(key) => assert_eq!(key, NodeKey::new("Company", "Initech")),
        other => panic!("expected missing endpoint, got {:?}", other),
    }
    let stats = store.statistics().await;
    assert_eq!(stats.node_count, 2);
    assert_eq!(stats.edge_count, 0);
}

async fn check_lookups_on_unknown_data(store: Arc<dyn GraphStore>) {
    seed_people(&store).await;
    let bob = PropertyValue::from("Bob");
    let acme = PropertyValue::from("Acme");

    assert!(store.get_all_entities_by_label("Planet").await.is_empty());
    assert!(store.get_entity_properties("Person", "name", &bob).await.is_none());
    assert!(store
        .get_relationship_entities(EntityRef::new("Person", "name", &bob), "WORKS_FOR", "Company", "name")
        .await
        .is_empty());
    assert!(store
        .get_relationship_properties(
            EntityRef::new("Person", "name", &bob),
            "WORKS_FOR",
            EntityRef::new("Company", "name", &acme),
        )
        .await
        .is_none());
}

async fn check_find_ignores_case(store: Arc<dyn GraphStore>) {
    for name in ["Acme Rockets", "Globex", "ACME Labs"] {
        store
            .add_or_update_entity("Company", "name", props(&[("name", name.into())]))
            .await
            .unwrap();
    }
    let mut found: Vec<String> = store
        .find_entities("Company", "name", "acme")
        .await
        .iter()
        .filter_map(|p| p["name"].as_string().map(str::to_string))
        .collect();
    found.sort();
    assert_eq!(found, vec!["ACME Labs", "Acme Rockets"]);
}

async fn check_reset_clears_everything(store: Arc<dyn GraphStore>) {
    seed_people(&store).await;
    store.reset().await.unwrap();
    assert_eq!(store.statistics().await, Default::default());
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    check_upsert_is_idempotent(memory()).await;
}

#[tokio::test]
async fn test_missing_primary_key_is_ignored() {
    check_missing_primary_key_is_ignored(memory()).await;
}

#[tokio::test]
async fn test_relationships_are_unique() {
    check_relationships_are_unique(memory()).await;
}

#[tokio::test]
async fn test_symmetric_links_both_ways() {
    check_symmetric_links_both_ways(memory()).await;
}

#[tokio::test]
async fn test_dangling_relationship_is_rejected() {
    check_dangling_relationship_is_rejected(memory()).await;
}

#[tokio::test]
async fn test_lookups_on_unknown_data() {
    check_lookups_on_unknown_data(memory()).await;
}

#[tokio::test]
async fn test_find_ignores_case() {
    check_find_ignores_case(memory()).await;
}

#[tokio::test]
async fn test_reset_clears_everything() {
    check_reset_clears_everything(memory()).await;
}

#[tokio::test]
async fn test_remote_contract() {
    let Some(store) = remote().await else {
        eprintln!("FACTBASE_GRAPH_* not set, skipping remote contract");
        return;
    };

    check_upsert_is_idempotent(Arc::clone(&store)).await;
    store.reset().await.unwrap();
    check_missing_primary_key_is_ignored(Arc::clone(&store)).await;
    store.reset().await.unwrap();
    check_relationships_are_unique(Arc::clone(&store)).await;
    store.reset().await.unwrap();
    check_symmetric_links_both_ways(Arc::clone(&store)).await;
    store.reset().await.unwrap();
    check_dangling_relationship_is_rejected(Arc::clone(&store)).await;
    store.reset().await.unwrap();
    check_lookups_on_unknown_data(Arc::clone(&store)).await;
    store.reset().await.unwrap();
    check_find_ignores_case(Arc::clone(&store)).await;
    check_reset_clears_everything(Arc::clone(&store)).await;
    store.close().await;
}
