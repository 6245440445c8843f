//! The tool-calling loop shared by every agent.

use super::{AgentError, AgentResult};
use crate::llm::{ChatMessage, ChatModel, ToolDefinition};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// The functions one agent offers its model.
#[async_trait]
pub trait ToolBox: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Runs a call to one of the defined functions. An `Err` aborts the
    /// agent; problems the model can fix should come back as `Ok` text.
    async fn call(&self, name: &str, arguments: &str) -> AgentResult<String>;
}

/// Asks the model, runs the tools it requests, feeds the observations back,
/// and repeats until it answers in plain text.
pub async fn run_tool_loop(
    agent: &str,
    model: &dyn ChatModel,
    mut messages: Vec<ChatMessage>,
    toolbox: &dyn ToolBox,
    max_iterations: usize,
) -> AgentResult<String> {
    let definitions = toolbox.definitions();
    let known: Vec<&str> = definitions
        .iter()
        .map(|d| d.function.name.as_str())
        .collect();

    for iteration in 1..=max_iterations {
        let reply = model.complete(&messages, &definitions).await?;

        if reply.tool_calls.is_empty() {
            let Some(answer) = reply.content else {
                return Err(AgentError::EmptyAnswer(agent.to_string()));
            };
            tracing::info!(agent, iteration, "final answer");
            return Ok(answer);
        }

        let calls = reply.tool_calls.clone();
        messages.push(reply);

        for call in calls {
            let name = call.function.name.as_str();
            tracing::info!(agent, iteration, tool = name, arguments = %call.function.arguments, "tool call");

            let observation = if known.contains(&name) {
                toolbox.call(name, &call.function.arguments).await?
            } else {
                format!(
                    "{} is not a valid tool, try one of [{}].",
                    name,
                    known.join(", ")
                )
            };

            tracing::debug!(agent, tool = name, %observation, "observation");
            messages.push(ChatMessage::tool_result(call.id, observation));
        }
    }

    Err(AgentError::IterationLimit {
        agent: agent.to_string(),
        iterations: max_iterations,
    })
}

/// Decodes a function call's JSON arguments. Models sometimes send an empty
/// string for functions without parameters.
pub fn parse_arguments<T: DeserializeOwned>(arguments: &str) -> Result<T, String> {
    let raw = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(raw).map_err(|e| format!("invalid arguments {}: {}", arguments, e))
}
