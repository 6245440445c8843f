//! Builds the agents a dispatcher needs, fresh for every request.

use crate::agent::{Agent, AgentResult, DatasetAgent, OrchestratorAgent, Tool};
use crate::llm::{ChatModel, OpenAiChat};
use crate::platform::Platform;
use crate::prompt::PromptTemplate;
use crate::settings::Settings;
use crate::table::Table;
use std::sync::Arc;

pub const ORCHESTRATOR_NAME: &str = "Agente Maestro";

pub trait AgentFactory: Send + Sync {
    fn dataset_agent(&self, platform: Platform) -> AgentResult<Arc<dyn Agent>>;

    fn orchestrator(
        &self,
        tools: Vec<Tool>,
        template: PromptTemplate,
    ) -> AgentResult<Arc<dyn Agent>>;
}

/// Agents backed by the configured OpenAI-compatible endpoint. Every agent
/// gets its own client and every dataset agent re-reads its CSV file.
pub struct OpenAiAgentFactory {
    settings: Settings,
}

impl OpenAiAgentFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn chat_model(&self) -> Box<dyn ChatModel> {
        Box::new(OpenAiChat::new(
            self.settings.api_base.as_str(),
            self.settings.api_key.as_str(),
            self.settings.model.as_str(),
            self.settings.temperature,
        ))
    }
}

impl AgentFactory for OpenAiAgentFactory {
    fn dataset_agent(&self, platform: Platform) -> AgentResult<Arc<dyn Agent>> {
        let path = self.settings.dataset_path(platform);
        let table = Table::load(path)?;
        tracing::debug!(%platform, path = %path.display(), rows = table.len(), "dataset loaded");
        Ok(Arc::new(DatasetAgent::new(
            platform.tool_name(),
            self.chat_model(),
            table,
            self.settings.max_iterations,
        )))
    }

    fn orchestrator(
        &self,
        tools: Vec<Tool>,
        template: PromptTemplate,
    ) -> AgentResult<Arc<dyn Agent>> {
        Ok(Arc::new(OrchestratorAgent::new(
            ORCHESTRATOR_NAME,
            self.chat_model(),
            tools,
            template,
            self.settings.max_iterations,
        )))
    }
}
