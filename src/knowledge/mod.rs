//! Knowledge graph facade
//!
//! [`KnowledgeGraph`] wires an [`Ontology`], a [`GraphStore`] and the
//! generated [`ToolRegistry`] together and hands read or write operations to a
//! [`KnowledgeAgent`].

pub mod agent;

pub use agent::{AgentError, AgentRequest, AgentResult, AgentTask, KnowledgeAgent};

use crate::config::{BackendConfig, KnowledgeConfig};
use crate::error::ConfigurationError;
use crate::graph::{GraphStatistics, GraphStore, MemoryGraph, PropertyMap, PropertyValue, StoreError, StoreResult};
use crate::ontology::Ontology;
use crate::remote::{RemoteError, RemoteGraph};
use crate::tools::{EntityOperations, Tool, ToolError, ToolRegistry, ToolResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Answer returned when the agent produced nothing
pub const NO_ANSWER: &str = "A verifiable answer is not available.";

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

/// Ontology-driven knowledge graph bound to one store
pub struct KnowledgeGraph {
    ontology: Arc<Ontology>,
    store: Arc<dyn GraphStore>,
    registry: ToolRegistry,
    entities: Vec<EntityOperations>,
}

impl KnowledgeGraph {
    /// Generate the operations of `ontology` against `store`
    pub fn new(ontology: Ontology, store: Arc<dyn GraphStore>) -> KnowledgeResult<Self> {
        let registry = ToolRegistry::from_ontology(&ontology, Arc::clone(&store))?;
        let entities = ontology
            .entity_classes()
            .iter()
            .map(|class| EntityOperations::new(class.clone(), Arc::clone(&store)))
            .collect();

        info!(
            "Knowledge graph '{}' ready with {} operations",
            ontology.name(),
            registry.len()
        );
        Ok(Self {
            ontology: Arc::new(ontology),
            store,
            registry,
            entities,
        })
    }

    /// Load the ontology and open the backend named by `config`
    pub async fn open(config: &KnowledgeConfig) -> KnowledgeResult<Self> {
        let ontology = Ontology::from_file(&config.ontology)?;
        let store: Arc<dyn GraphStore> = match &config.backend {
            BackendConfig::InMemory { snapshot } => Arc::new(MemoryGraph::open(snapshot)?),
            BackendConfig::Remote(remote) => {
                let graph = RemoteGraph::connect(remote)?;
                if let Err(e) = graph.verify_connectivity().await {
                    warn!("Remote graph is not reachable yet: {}", e);
                }
                Arc::new(graph)
            }
        };
        Self::new(ontology, store)
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Operations handed to query agents
    pub fn query_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.registry.read_tools()
    }

    /// Operations handed to update agents
    pub fn update_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.registry.write_tools()
    }

    /// Call a generated operation by name
    pub async fn invoke(&self, name: &str, args: Value) -> ToolResult<Value> {
        self.registry.invoke(name, args).await
    }

    /// Primary keys of every stored entity, per class
    pub async fn class_entity_pairs(&self) -> IndexMap<String, Vec<PropertyValue>> {
        let mut pairs = IndexMap::new();
        for ops in &self.entities {
            pairs.insert(ops.class().name().to_string(), ops.primary_keys().await);
        }
        pairs
    }

    /// Entities of `class` whose `field` contains `term`, ignoring case
    pub async fn find_entities(&self, class: &str, field: &str, term: &str) -> Vec<PropertyMap> {
        match self.entities.iter().find(|ops| ops.class().name() == class) {
            Some(ops) => ops.find(field, term).await,
            None => {
                debug!("No entity class named {}", class);
                Vec::new()
            }
        }
    }

    /// Answer `question` from the graph through `agent`
    pub async fn query(&self, agent: &dyn KnowledgeAgent, question: &str) -> KnowledgeResult<String> {
        info!("Querying knowledge graph: {}", question);
        let request = self.request(AgentTask::Query, question, self.query_tools()).await;
        let answer = agent.run(request).await?;
        if answer.trim().is_empty() {
            debug!("No answer found to {}, returning fallback", question);
            return Ok(NO_ANSWER.to_string());
        }
        Ok(answer)
    }

    /// Let `agent` record `knowledge` in the graph, then save the store.
    ///
    /// A failed save is logged and does not fail the update.
    pub async fn update_knowledge(&self, agent: &dyn KnowledgeAgent, knowledge: &str) -> KnowledgeResult<String> {
        info!("Updating knowledge graph with {} bytes of knowledge", knowledge.len());
        let request = self.request(AgentTask::Update, knowledge, self.update_tools()).await;
        let result = agent.run(request).await?;

        match self.store.save().await {
            Ok(()) => debug!("Graph saved after update"),
            Err(e) => warn!("Failed to save graph after update: {}", e),
        }
        Ok(result)
    }

    async fn request(&self, task: AgentTask, prompt: &str, tools: Vec<Arc<dyn Tool>>) -> AgentRequest {
        AgentRequest {
            task,
            instructions: self.instructions(task),
            prompt: prompt.to_string(),
            known_entities: self.class_entity_pairs().await,
            tools,
        }
    }

    /// System instructions for an agent run
    pub fn instructions(&self, task: AgentTask) -> String {
        let today = chrono::Utc::now().format("%Y-%m-%d");
        match task {
            AgentTask::Query => format!(
                "Get information from the knowledge base.\n\
                 Use the tools to get information from the graph.\n\
                 Only use information from the knowledge graph to answer the question, do not make up answers.\n\
                 If you don't know the answer, say \"{}\"\n\
                 Provide all sources for your answer, taken from the properties of the entities in the graph.\n\
                 Ontology:\n{}\n\
                 Today is {}",
                NO_ANSWER, self.ontology, today
            ),
            AgentTask::Update => format!(
                "Translate the knowledge you are given into a structured format based on the ontology.\n\
                 Add every entity and every relationship to the graph using the tools available to you.\n\
                 First add the entities, then add the relationships.\n\
                 Ontology:\n{}\n\
                 Today is {}",
                self.ontology, today
            ),
        }
    }

    /// Node and edge counts of the store
    pub async fn statistics(&self) -> GraphStatistics {
        self.store.statistics().await
    }

    /// Persist the store
    pub async fn save(&self) -> StoreResult<()> {
        self.store.save().await
    }

    /// Release the store. The in-process backend discards unsaved state.
    pub async fn close(&self) {
        self.store.close().await;
        info!("Knowledge graph '{}' closed", self.ontology.name());
    }
}
