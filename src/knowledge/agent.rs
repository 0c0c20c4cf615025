//! Interface to the agent layer that decides what to read or write

use crate::graph::PropertyValue;
use crate::tools::{Tool, ToolError};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Execution error: {0}")]
    Execution(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Whether the agent answers a question or records new knowledge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTask {
    Query,
    Update,
}

/// Everything an agent run gets to see
pub struct AgentRequest {
    pub task: AgentTask,
    /// System instructions, including the rendered ontology
    pub instructions: String,
    pub prompt: String,
    /// Primary keys already in the graph, per entity class
    pub known_entities: IndexMap<String, Vec<PropertyValue>>,
    /// Operations the agent may call
    pub tools: Vec<Arc<dyn Tool>>,
}

impl AgentRequest {
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }
}

/// A language-model agent driving the generated operations
#[async_trait]
pub trait KnowledgeAgent: Send + Sync {
    async fn run(&self, request: AgentRequest) -> AgentResult<String>;
}
