//! Agents answer one natural-language input with text.
//!
//! Both kinds run the same tool-calling loop (see [`executor`]): a
//! [`DatasetAgent`] calls read-only queries over one CSV table, an
//! [`OrchestratorAgent`] calls other agents wrapped as [`Tool`]s.

mod dataset;
pub mod executor;
mod orchestrator;

pub use dataset::DatasetAgent;
pub use orchestrator::OrchestratorAgent;

use crate::prompt::TemplateError;
use crate::table::TableError;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] anyhow::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{agent} stopped after {iterations} iterations without a final answer")]
    IterationLimit { agent: String, iterations: usize },

    #[error("{0} returned an empty answer")]
    EmptyAnswer(String),
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, input: &str) -> AgentResult<String>;
}

/// A named, described callable wrapping one agent's `invoke`.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    agent: Arc<dyn Agent>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        agent: Arc<dyn Agent>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            agent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Name as exposed to the model; function names only allow
    /// `[A-Za-z0-9_-]`.
    pub fn function_name(&self) -> String {
        self.name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }

    pub fn definition(&self) -> crate::llm::ToolDefinition {
        crate::llm::ToolDefinition::function(
            self.function_name(),
            self.description.clone(),
            json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "The question to forward, self-contained."
                    }
                },
                "required": ["input"]
            }),
        )
    }

    pub async fn call(&self, input: &str) -> AgentResult<String> {
        self.agent.invoke(input).await
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("agent", &self.agent.name())
            .finish()
    }
}
