use super::executor::{parse_arguments, run_tool_loop, ToolBox};
use super::{Agent, AgentResult, Tool};
use crate::llm::{ChatMessage, ChatModel, ToolDefinition};
use crate::prompt::PromptTemplate;
use async_trait::async_trait;
use serde::Deserialize;

/// Answers free-text questions by delegating to other agents exposed as tools.
pub struct OrchestratorAgent {
    name: String,
    model: Box<dyn ChatModel>,
    tools: ToolSet,
    template: PromptTemplate,
    max_iterations: usize,
}

impl OrchestratorAgent {
    pub fn new(
        name: impl Into<String>,
        model: Box<dyn ChatModel>,
        tools: Vec<Tool>,
        template: PromptTemplate,
        max_iterations: usize,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            tools: ToolSet(tools),
            template,
            max_iterations,
        }
    }

    #[cfg(test)]
    pub(crate) fn tools(&self) -> &[Tool] {
        &self.tools.0
    }

    /// Role prompt for one question. ReAct-style templates may also carry
    /// `{input}` and `{agent_scratchpad}`; the scratchpad starts empty
    /// because tool calls travel as messages.
    fn system_prompt(&self, input: &str) -> AgentResult<String> {
        let tools = self
            .tools
            .0
            .iter()
            .map(|t| format!("{}: {}", t.function_name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let tool_names = self
            .tools
            .0
            .iter()
            .map(Tool::function_name)
            .collect::<Vec<_>>()
            .join(", ");

        Ok(self
            .template
            .render(&[
                ("tools", tools.as_str()),
                ("tool_names", tool_names.as_str()),
                ("input", input),
                ("agent_scratchpad", ""),
            ])?)
    }
}

#[async_trait]
impl Agent for OrchestratorAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: &str) -> AgentResult<String> {
        tracing::info!(agent = %self.name, input, tools = self.tools.0.len(), "orchestrator invoked");
        let messages = vec![
            ChatMessage::system(self.system_prompt(input)?),
            ChatMessage::user(input),
        ];
        run_tool_loop(
            &self.name,
            self.model.as_ref(),
            messages,
            &self.tools,
            self.max_iterations,
        )
        .await
    }
}

struct ToolSet(Vec<Tool>);

#[derive(Deserialize)]
struct ToolInput {
    input: String,
}

#[async_trait]
impl ToolBox for ToolSet {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.0.iter().map(Tool::definition).collect()
    }

    async fn call(&self, name: &str, arguments: &str) -> AgentResult<String> {
        let Some(tool) = self.0.iter().find(|t| t.function_name() == name) else {
            return Ok(format!("{name} is not a valid tool"));
        };
        match parse_arguments::<ToolInput>(arguments) {
            Ok(args) => tool.call(&args.input).await,
            Err(e) => Ok(format!("Error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::executor::testing::{ScriptedModel, Step};
    use crate::agent::AgentError;
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
        inputs: Mutex<Vec<String>>,
    }

    impl Recording {
        fn new(name: &'static str, reply: Result<&'static str, &'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                inputs: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Agent for Recording {
        fn name(&self) -> &str {
            self.name
        }

        async fn invoke(&self, input: &str) -> AgentResult<String> {
            self.inputs.lock().unwrap().push(input.to_string());
            self.reply
                .map(str::to_string)
                .map_err(|e| AgentError::Llm(anyhow::anyhow!(e)))
        }
    }

    fn template() -> PromptTemplate {
        PromptTemplate::new("{instructions}\n{tools}\n[{tool_names}]")
            .partial("instructions", "Responde preguntas utilizando el agente adecuado.")
    }

    #[tokio::test]
    async fn delegates_to_the_requested_tool() {
        let ps4 = Recording::new("ps4", Ok("Marvel's Spider-Man"));
        let xbox = Recording::new("xbox", Ok("Grand Theft Auto V"));
        let model = ScriptedModel::new(vec![
            Step::Calls(vec![
                ("PlayStation_4_Agent", r#"{"input":"best seller?"}"#),
                ("Xbox_One_Agent", r#"{"input":"best seller?"}"#),
            ]),
            Step::Answer("PS4: Spider-Man. Xbox: GTA V."),
        ]);
        let orchestrator = OrchestratorAgent::new(
            "maestro",
            Box::new(model),
            vec![
                Tool::new("PlayStation 4 Agent", "PS4 games", ps4.clone()),
                Tool::new("Xbox One Agent", "Xbox games", xbox.clone()),
            ],
            template(),
            5,
        );

        let answer = orchestrator
            .invoke("What sold best on PS4 and Xbox?")
            .await
            .unwrap();
        assert_eq!(answer, "PS4: Spider-Man. Xbox: GTA V.");
        assert_eq!(*ps4.inputs.lock().unwrap(), vec!["best seller?"]);
        assert_eq!(*xbox.inputs.lock().unwrap(), vec!["best seller?"]);
    }

    #[test]
    fn system_prompt_lists_tools() {
        let agent = Recording::new("a", Ok(""));
        let orchestrator = OrchestratorAgent::new(
            "maestro",
            Box::new(ScriptedModel::new(vec![])),
            vec![Tool::new("Xbox One Agent", "Xbox games", agent)],
            template(),
            5,
        );
        assert_eq!(
            orchestrator.system_prompt("?").unwrap(),
            "Responde preguntas utilizando el agente adecuado.\nXbox_One_Agent: Xbox games\n[Xbox_One_Agent]"
        );
        assert_eq!(orchestrator.tools().len(), 1);
    }

    #[tokio::test]
    async fn react_template_with_input_and_scratchpad_renders() {
        let agent = Recording::new("xbox", Ok(""));
        let model = Arc::new(ScriptedModel::new(vec![Step::Answer("Minecraft")]));
        let orchestrator = OrchestratorAgent::new(
            "maestro",
            Box::new(model.clone()),
            vec![Tool::new("Xbox One Agent", "Xbox games", agent)],
            PromptTemplate::new("{instructions}|{tools}|[{tool_names}]|Question: {input}|{agent_scratchpad}")
                .partial("instructions", "Responde."),
            5,
        );

        let answer = orchestrator.invoke("Best seller on Xbox?").await.unwrap();
        assert_eq!(answer, "Minecraft");
        assert_eq!(model.request_count(), 1);

        let requests = model.requests.lock().unwrap();
        assert_eq!(
            requests[0].0[0].content.as_deref(),
            Some("Responde.|Xbox_One_Agent: Xbox games|[Xbox_One_Agent]|Question: Best seller on Xbox?|")
        );
    }

    #[tokio::test]
    async fn sub_agent_failure_aborts() {
        let broken = Recording::new("switch", Err("switch.csv missing"));
        let model = ScriptedModel::new(vec![Step::Calls(vec![(
            "Nintendo_Switch_Agent",
            r#"{"input":"?"}"#,
        )])]);
        let orchestrator = OrchestratorAgent::new(
            "maestro",
            Box::new(model),
            vec![Tool::new("Nintendo Switch Agent", "Switch games", broken)],
            template(),
            5,
        );

        let err = orchestrator.invoke("?").await.unwrap_err();
        assert_eq!(err.to_string(), "switch.csv missing");
    }

    #[tokio::test]
    async fn unfilled_template_fails_before_calling_the_model() {
        let model = Arc::new(ScriptedModel::new(vec![Step::Answer("never")]));
        let orchestrator = OrchestratorAgent::new(
            "maestro",
            Box::new(model.clone()),
            vec![],
            PromptTemplate::new("{instructions} {tools}"),
            5,
        );
        let err = orchestrator.invoke("?").await.unwrap_err();
        assert_eq!(err.to_string(), "template variable 'instructions' was not provided");
        assert_eq!(model.request_count(), 0);
    }
}
