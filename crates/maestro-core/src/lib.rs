//! # Maestro Core Library
//!
//! Everything behind the Maestro terminal UI that does not draw to the
//! screen: configuration, the chat-completion client, CSV tables, the
//! dataset and orchestrating agents, and the two request dispatchers.
//!
//! ## Modules
//!
//! - `settings`: layered configuration (defaults, `config.toml`, environment)
//! - `platform`: the three platforms, their preset questions and tool names
//! - `table`: CSV loading and the read-only queries dataset agents run
//! - `llm`: OpenAI-compatible chat completions with function calling
//! - `prompt`: role templates for the orchestrating agent
//! - `agent`: dataset and orchestrating agents sharing one tool-calling loop
//! - `factory`: builds fresh agents for every request
//! - `dispatch`: preset-task and free-text query handlers
//! - `theme`: UI theming

pub mod agent;
pub mod dispatch;
pub mod factory;
pub mod llm;
pub mod platform;
pub mod prompt;
pub mod settings;
pub mod table;
pub mod theme;

use dispatch::Dispatcher;
use factory::OpenAiAgentFactory;
use settings::Settings;
use std::sync::Arc;

/// Dispatcher wired to the configured model endpoint, datasets and template
/// source.
pub fn dispatcher(settings: &Settings) -> Dispatcher {
    let templates = prompt::template_source(settings.prompt_template_url.as_deref());
    Dispatcher::new(
        Arc::new(OpenAiAgentFactory::new(settings.clone())),
        Arc::from(templates),
    )
}
