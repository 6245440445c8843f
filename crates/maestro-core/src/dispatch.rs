//! The two request handlers behind the UI buttons.
//!
//! Each handler turns one button press into an [`Outcome`]. Failures never
//! escape as errors: they are logged and rendered as a message.

use crate::agent::{AgentResult, Tool};
use crate::factory::AgentFactory;
use crate::platform::Platform;
use crate::prompt::TemplateSource;
use std::sync::Arc;

pub const AGENT_HEADING: &str = "Respuesta del agente:";
pub const ORCHESTRATOR_HEADING: &str = "Respuesta del agente maestro:";
pub const UNKNOWN_TASK: &str = "Tarea no reconocida.";
pub const EMPTY_QUERY: &str = "Por favor ingresa una pregunta válida.";
pub const ORCHESTRATOR_INSTRUCTIONS: &str = "Responde preguntas utilizando el agente adecuado.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answer { heading: &'static str, text: String },
    /// The input was rejected before any work started.
    Invalid(String),
    Failed(String),
}

pub struct Dispatcher {
    factory: Arc<dyn AgentFactory>,
    templates: Arc<dyn TemplateSource>,
}

impl Dispatcher {
    pub fn new(factory: Arc<dyn AgentFactory>, templates: Arc<dyn TemplateSource>) -> Self {
        Self { factory, templates }
    }

    /// Runs one of the fixed preset questions against its platform's agent.
    pub async fn run_preset(&self, question: &str) -> Outcome {
        let Some(platform) = Platform::from_preset(question) else {
            tracing::warn!(question, "unrecognized preset task");
            return Outcome::Failed(UNKNOWN_TASK.to_string());
        };

        tracing::info!(%platform, "running preset task");
        match self.preset(platform, question).await {
            Ok(text) => Outcome::Answer {
                heading: AGENT_HEADING,
                text,
            },
            Err(e) => {
                tracing::warn!(%platform, error = %e, "preset task failed");
                Outcome::Failed(format!("Error al procesar la tarea: {e}"))
            }
        }
    }

    /// Routes a free-text question through the orchestrating agent.
    pub async fn run_query(&self, query: &str) -> Outcome {
        if query.trim().is_empty() {
            return Outcome::Invalid(EMPTY_QUERY.to_string());
        }

        tracing::info!(query, "running general query");
        match self.query(query).await {
            Ok(text) => Outcome::Answer {
                heading: ORCHESTRATOR_HEADING,
                text,
            },
            Err(e) => {
                tracing::warn!(error = %e, "general query failed");
                Outcome::Failed(format!("Error al procesar la pregunta: {e}"))
            }
        }
    }

    async fn preset(&self, platform: Platform, question: &str) -> AgentResult<String> {
        let agent = self.factory.dataset_agent(platform)?;
        agent.invoke(question).await
    }

    async fn query(&self, query: &str) -> AgentResult<String> {
        let template = self
            .templates
            .pull()
            .await?
            .partial("instructions", ORCHESTRATOR_INSTRUCTIONS);

        let tools = Platform::all()
            .into_iter()
            .map(|platform| -> AgentResult<Tool> {
                let agent = self.factory.dataset_agent(platform)?;
                Ok(Tool::new(
                    platform.tool_name(),
                    platform.tool_description(),
                    agent,
                ))
            })
            .collect::<AgentResult<Vec<Tool>>>()?;

        let orchestrator = self.factory.orchestrator(tools, template)?;
        orchestrator.invoke(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentError};
    use crate::prompt::{PromptTemplate, TemplateError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Agent double that records its inputs and replies with a fixed result.
    struct FakeAgent {
        name: String,
        fail_with: Option<&'static str>,
        inputs: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl Agent for FakeAgent {
        fn name(&self) -> &str {
            &self.name
        }

        async fn invoke(&self, input: &str) -> AgentResult<String> {
            self.inputs
                .lock()
                .unwrap()
                .push((self.name.clone(), input.to_string()));
            match self.fail_with {
                Some(message) => Err(AgentError::Llm(anyhow::anyhow!(message))),
                None => Ok(format!("{} answered", self.name)),
            }
        }
    }

    #[derive(Default)]
    struct RecordingFactory {
        fail_with: Option<&'static str>,
        missing: Option<Platform>,
        built: Mutex<Vec<Platform>>,
        orchestrators: Mutex<Vec<(Vec<String>, String)>>,
        invocations: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingFactory {
        fn agent(&self, name: String) -> Arc<dyn Agent> {
            Arc::new(FakeAgent {
                name,
                fail_with: self.fail_with,
                inputs: self.invocations.clone(),
            })
        }

        fn invocations(&self) -> Vec<(String, String)> {
            self.invocations.lock().unwrap().clone()
        }
    }

    impl AgentFactory for RecordingFactory {
        fn dataset_agent(&self, platform: Platform) -> AgentResult<Arc<dyn Agent>> {
            if self.missing == Some(platform) {
                return Err(crate::table::Table::load("/missing/xboxone.csv")
                    .err()
                    .map(AgentError::from)
                    .unwrap());
            }
            self.built.lock().unwrap().push(platform);
            Ok(self.agent(platform.tool_name()))
        }

        fn orchestrator(
            &self,
            tools: Vec<Tool>,
            template: PromptTemplate,
        ) -> AgentResult<Arc<dyn Agent>> {
            let names = tools.iter().map(|t| t.name().to_string()).collect();
            let system = template.render(&[("tools", ""), ("tool_names", "")])?;
            self.orchestrators.lock().unwrap().push((names, system));
            Ok(self.agent("maestro".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingTemplates {
        pulls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TemplateSource for CountingTemplates {
        async fn pull(&self) -> Result<PromptTemplate, TemplateError> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TemplateError::Fetch {
                    url: "https://templates.invalid/react".to_string(),
                    reason: "HTTP 503 Service Unavailable".to_string(),
                });
            }
            Ok(PromptTemplate::new("{instructions}{tools}{tool_names}"))
        }
    }

    fn setup(
        factory: RecordingFactory,
    ) -> (Dispatcher, Arc<RecordingFactory>, Arc<CountingTemplates>) {
        let factory = Arc::new(factory);
        let templates = Arc::new(CountingTemplates::default());
        (
            Dispatcher::new(factory.clone(), templates.clone()),
            factory,
            templates,
        )
    }

    #[tokio::test]
    async fn each_preset_invokes_only_its_agent() {
        for platform in Platform::all() {
            let (dispatcher, factory, templates) = setup(RecordingFactory::default());
            let question = platform.preset_question();

            let outcome = dispatcher.run_preset(question).await;

            assert_eq!(
                outcome,
                Outcome::Answer {
                    heading: AGENT_HEADING,
                    text: format!("{} answered", platform.tool_name()),
                }
            );
            assert_eq!(*factory.built.lock().unwrap(), vec![platform]);
            assert_eq!(
                factory.invocations(),
                vec![(platform.tool_name(), question.to_string())]
            );
            assert_eq!(templates.pulls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn switch_preset_never_touches_other_platforms() {
        let (dispatcher, factory, _) = setup(RecordingFactory::default());

        dispatcher
            .run_preset("¿Cuál es el juego más vendido de Nintendo Switch?")
            .await;

        let invoked: Vec<String> = factory.invocations().into_iter().map(|(n, _)| n).collect();
        assert_eq!(invoked, vec!["Nintendo Switch Agent"]);
    }

    #[tokio::test]
    async fn preset_runs_while_template_source_is_down() {
        let factory = Arc::new(RecordingFactory::default());
        let templates = Arc::new(CountingTemplates {
            fail: true,
            ..CountingTemplates::default()
        });
        let dispatcher = Dispatcher::new(factory.clone(), templates.clone());

        let outcome = dispatcher
            .run_preset(Platform::PlayStation4.preset_question())
            .await;

        assert!(matches!(outcome, Outcome::Answer { heading: AGENT_HEADING, .. }));
        assert_eq!(templates.pulls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_preset_is_rejected_without_agents() {
        let (dispatcher, factory, _) = setup(RecordingFactory::default());

        let outcome = dispatcher.run_preset("¿Cuál es el juego más vendido de Wii U?").await;

        assert_eq!(outcome, Outcome::Failed(UNKNOWN_TASK.to_string()));
        assert!(factory.built.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn preset_failure_is_rendered() {
        let (dispatcher, _, _) = setup(RecordingFactory {
            fail_with: Some("Chat completion API error 401 Unauthorized: bad key"),
            ..Default::default()
        });

        let outcome = dispatcher
            .run_preset(Platform::XboxOne.preset_question())
            .await;

        assert_eq!(
            outcome,
            Outcome::Failed(
                "Error al procesar la tarea: Chat completion API error 401 Unauthorized: bad key"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn blank_query_constructs_nothing() {
        for query in ["", "   ", "\t\n"] {
            let (dispatcher, factory, templates) = setup(RecordingFactory::default());

            let outcome = dispatcher.run_query(query).await;

            assert_eq!(outcome, Outcome::Invalid(EMPTY_QUERY.to_string()));
            assert!(factory.built.lock().unwrap().is_empty());
            assert!(factory.orchestrators.lock().unwrap().is_empty());
            assert!(factory.invocations().is_empty());
            assert_eq!(templates.pulls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn query_builds_three_tools_and_invokes_orchestrator_once() {
        let (dispatcher, factory, templates) = setup(RecordingFactory::default());

        let outcome = dispatcher.run_query("What sold best on PS4 and Xbox?").await;

        assert_eq!(
            outcome,
            Outcome::Answer {
                heading: ORCHESTRATOR_HEADING,
                text: "maestro answered".to_string(),
            }
        );
        assert_eq!(templates.pulls.load(Ordering::SeqCst), 1);
        assert_eq!(*factory.built.lock().unwrap(), Platform::all());

        let orchestrators = factory.orchestrators.lock().unwrap();
        assert_eq!(orchestrators.len(), 1);
        assert_eq!(
            orchestrators[0].0,
            vec!["Nintendo Switch Agent", "PlayStation 4 Agent", "Xbox One Agent"]
        );
        assert_eq!(orchestrators[0].1, ORCHESTRATOR_INSTRUCTIONS);

        assert_eq!(
            factory.invocations(),
            vec![(
                "maestro".to_string(),
                "What sold best on PS4 and Xbox?".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn query_failures_are_rendered() {
        let (dispatcher, _, _) = setup(RecordingFactory {
            fail_with: Some("rate limited"),
            ..Default::default()
        });
        assert_eq!(
            dispatcher.run_query("¿Qué juego vendió más?").await,
            Outcome::Failed("Error al procesar la pregunta: rate limited".to_string())
        );

        let (dispatcher, factory, _) = setup(RecordingFactory {
            missing: Some(Platform::XboxOne),
            ..Default::default()
        });
        let outcome = dispatcher.run_query("¿Qué juego vendió más?").await;
        match outcome {
            Outcome::Failed(message) => {
                assert!(message.starts_with("Error al procesar la pregunta: could not read /missing/xboxone.csv"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(factory.orchestrators.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn template_fetch_failure_is_rendered() {
        let factory = Arc::new(RecordingFactory::default());
        let templates = Arc::new(CountingTemplates {
            fail: true,
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(factory.clone(), templates);

        let outcome = dispatcher.run_query("¿Qué juego vendió más?").await;

        assert_eq!(
            outcome,
            Outcome::Failed(
                "Error al procesar la pregunta: failed to fetch prompt template from \
                 https://templates.invalid/react: HTTP 503 Service Unavailable"
                    .to_string()
            )
        );
        assert!(factory.built.lock().unwrap().is_empty());
    }
}
