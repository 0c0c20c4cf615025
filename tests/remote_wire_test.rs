//! Remote backend against a mock transactional Cypher endpoint

mod common;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::{props, COMPANIES};
use factbase::{
    EntityRef, GraphStore, KnowledgeGraph, NodeKey, Ontology, PropertyValue, RemoteConfig, RemoteGraph, StoreError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned server behaviour plus a log of every request body
#[derive(Clone)]
struct MockServer {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    endpoint_counts: (u64, u64),
    stored_person: Value,
}

impl MockServer {
    fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            endpoint_counts: (1, 1),
            stored_person: json!({"name": "Alice", "born": "1990-05-17"}),
        }
    }

    fn statements(&self) -> Vec<(String, Value)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| {
                let statement = &body["statements"][0];
                (
                    statement["statement"].as_str().unwrap_or_default().to_string(),
                    statement["parameters"].clone(),
                )
            })
            .collect()
    }
}

async fn commit(
    State(server): State<MockServer>,
    Path(database): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Basic "))
        .unwrap_or(false);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }

    let statement = body["statements"][0]["statement"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    server.requests.lock().unwrap().push((database, body));

    let rows = if statement.starts_with("OPTIONAL MATCH") {
        vec![json!({"row": [server.endpoint_counts.0, server.endpoint_counts.1]})]
    } else if statement.contains("`Person`") && statement.contains("RETURN properties(n)") {
        vec![json!({"row": [server.stored_person.clone()]})]
    } else if statement.contains("BROKEN") {
        return (
            StatusCode::OK,
            Json(json!({
                "results": [],
                "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
            })),
        );
    } else {
        Vec::new()
    };
    (
        StatusCode::OK,
        Json(json!({"results": [{"columns": [], "data": rows}], "errors": []})),
    )
}

async fn spawn(server: MockServer) -> RemoteConfig {
    let app = Router::new()
        .route("/db/:database/tx/commit", post(commit))
        .with_state(server);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    RemoteConfig::new(format!("http://{}", addr), "neo4j", "secret").with_database("facts")
}

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn test_dates_travel_as_iso_strings() {
    init_logging();
    let server = MockServer::new();
    let config = spawn(server.clone()).await;
    let ontology = Ontology::from_yaml_str(COMPANIES).unwrap();
    let kg = KnowledgeGraph::new(ontology, Arc::new(RemoteGraph::connect(&config).unwrap())).unwrap();

    kg.invoke(
        "add_or_update_Person_information",
        json!({"name": "Alice", "born": "1990-05-17", "age": 34}),
    )
    .await
    .unwrap();

    let statements = server.statements();
    let (statement, params) = &statements[0];
    assert!(statement.starts_with("MERGE (n:`Person` {`name`: $pk_value})"));
    assert_eq!(params["pk_value"], json!("Alice"));
    assert_eq!(params["props"]["born"], json!("1990-05-17"));
    assert_eq!(params["props"]["age"], json!(34));
    assert_eq!(server.requests.lock().unwrap()[0].0, "facts");

    let alice = kg
        .invoke("get_Person_properties", json!({"Person_name": "Alice"}))
        .await
        .unwrap();
    assert_eq!(alice, json!({"name": "Alice", "born": "1990-05-17"}));

    let stored = kg
        .store()
        .get_entity_properties("Person", "name", &"Alice".into())
        .await
        .unwrap();
    assert_eq!(stored["born"], PropertyValue::from("1990-05-17"));
    let class = kg.ontology().find_entity_class("Person").unwrap();
    assert!(class.conform(stored)["born"].as_date().is_some());
}

#[tokio::test]
async fn test_symmetric_link_sends_both_directions() {
    let server = MockServer::new();
    let config = spawn(server.clone()).await;
    let graph = RemoteGraph::connect(&config).unwrap();
    let acme = PropertyValue::from("Acme");
    let globex = PropertyValue::from("Globex");

    graph
        .add_relationship(
            EntityRef::new("Company", "name", &acme),
            EntityRef::new("Company", "name", &globex),
            "PARTNERS_WITH",
            Some(props(&[("since", chrono::NaiveDate::from_ymd_opt(2021, 3, 4).unwrap().into())])),
            true,
        )
        .await
        .unwrap();

    let statements = server.statements();
    assert_eq!(statements.len(), 3);
    assert!(statements[0].0.starts_with("OPTIONAL MATCH"));
    assert!(statements[1].0.contains("MERGE (a)-[r:`PARTNERS_WITH`]->(b)"));
    assert!(statements[2].0.contains("MERGE (b)-[r:`PARTNERS_WITH`]->(a)"));
    for (_, params) in &statements[1..] {
        assert_eq!(params["from_value"], json!("Acme"));
        assert_eq!(params["to_value"], json!("Globex"));
        assert_eq!(params["props"], json!({"since": "2021-03-04"}));
    }
}

#[tokio::test]
async fn test_missing_endpoint_stops_before_merge() {
    let mut server = MockServer::new();
    server.endpoint_counts = (1, 0);
    let config = spawn(server.clone()).await;
    let graph = RemoteGraph::connect(&config).unwrap();
    let alice = PropertyValue::from("Alice");
    let ghost = PropertyValue::from("Initech");

    let err = graph
        .add_relationship(
            EntityRef::new("Person", "name", &alice),
            EntityRef::new("Company", "name", &ghost),
            "WORKS_FOR",
            None,
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::EndpointNotFound(key) if key == NodeKey::new("Company", "Initech")));

    let statements = server.statements();
    assert_eq!(statements.len(), 1);
    assert!(!statements[0].0.contains("MERGE"));
}

#[tokio::test]
async fn test_server_errors_read_as_empty() {
    let server = MockServer::new();
    let config = spawn(server.clone()).await;
    let graph = RemoteGraph::connect(&config).unwrap();

    assert!(graph.find_entities("BROKEN", "name", "x").await.is_empty());

    // Unrouted path: the server answers 404
    let misrouted = RemoteGraph::connect(&RemoteConfig {
        uri: format!("{}/missing", config.uri),
        ..config.clone()
    })
    .unwrap();
    assert!(misrouted.get_all_entities_by_label("Company").await.is_empty());
    assert_eq!(server.statements().len(), 1);
}

#[tokio::test]
async fn test_unreachable_server_degrades() {
    init_logging();
    let config = RemoteConfig::new("http://127.0.0.1:9", "neo4j", "secret").with_timeout(Duration::from_secs(1));
    let graph = RemoteGraph::connect(&config).unwrap();
    let acme = PropertyValue::from("Acme");
    let globex = PropertyValue::from("Globex");

    assert!(graph.verify_connectivity().await.is_err());
    graph
        .add_or_update_entity("Company", "name", props(&[("name", "Acme".into())]))
        .await
        .unwrap();
    graph
        .add_relationship(
            EntityRef::new("Company", "name", &acme),
            EntityRef::new("Company", "name", &globex),
            "PARTNERS_WITH",
            None,
            true,
        )
        .await
        .unwrap();
    assert!(graph.get_all_entities_by_label("Company").await.is_empty());
    assert!(graph.get_entity_properties("Company", "name", &acme).await.is_none());
    assert_eq!(graph.statistics().await, Default::default());
    graph.save().await.unwrap();
}

#[tokio::test]
async fn test_closed_graph_sends_nothing() {
    let server = MockServer::new();
    let config = spawn(server.clone()).await;
    let graph = RemoteGraph::connect(&config).unwrap();

    graph.close().await;
    graph
        .add_or_update_entity("Company", "name", props(&[("name", "Acme".into())]))
        .await
        .unwrap();
    assert!(graph.get_all_entities_by_label("Company").await.is_empty());
    assert!(server.statements().is_empty());
}
