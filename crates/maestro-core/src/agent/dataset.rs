use super::executor::{parse_arguments, run_tool_loop, ToolBox};
use super::{Agent, AgentResult};
use crate::llm::{ChatMessage, ChatModel, ToolDefinition};
use crate::table::{Table, DEFAULT_LIMIT, MAX_LIMIT};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const HEAD_ROWS: usize = 5;

/// Answers questions about one CSV table by querying it through tools.
pub struct DatasetAgent {
    name: String,
    model: Box<dyn ChatModel>,
    table: TableTools,
    max_iterations: usize,
}

impl DatasetAgent {
    pub fn new(
        name: impl Into<String>,
        model: Box<dyn ChatModel>,
        table: Table,
        max_iterations: usize,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            table: TableTools(table),
            max_iterations,
        }
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &Table {
        &self.table.0
    }

    fn system_prompt(&self) -> String {
        let table = &self.table.0;
        format!(
            "You are working with a table loaded from `{file}` ({rows} rows).\n\
             Columns: {columns}\n\
             These are the first rows:\n{head}\n\n\
             Answer questions about this data using the tools to inspect it. \
             Base every figure on what the tools return, and answer in the same \
             language as the question.",
            file = table.source_name(),
            rows = table.len(),
            columns = table.headers().join(", "),
            head = table.head(HEAD_ROWS),
        )
    }
}

#[async_trait]
impl Agent for DatasetAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: &str) -> AgentResult<String> {
        tracing::info!(agent = %self.name, input, "dataset agent invoked");
        let messages = vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(input),
        ];
        run_tool_loop(
            &self.name,
            self.model.as_ref(),
            messages,
            &self.table,
            self.max_iterations,
        )
        .await
    }
}

struct TableTools(Table);

#[derive(Deserialize)]
struct SortArgs {
    column: String,
    #[serde(default = "default_descending")]
    descending: bool,
    limit: Option<usize>,
}

fn default_descending() -> bool {
    true
}

#[derive(Deserialize)]
struct FilterArgs {
    column: String,
    contains: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct ColumnArgs {
    column: String,
}

impl TableTools {
    fn run(&self, name: &str, arguments: &str) -> Result<String, String> {
        let table = &self.0;
        match name {
            "describe_table" => Ok(table.describe()),
            "sort_rows" => {
                let args: SortArgs = parse_arguments(arguments)?;
                table
                    .sort_rows(&args.column, args.descending, args.limit)
                    .map_err(|e| e.to_string())
            }
            "filter_rows" => {
                let args: FilterArgs = parse_arguments(arguments)?;
                table
                    .filter_rows(&args.column, &args.contains, args.limit)
                    .map_err(|e| e.to_string())
            }
            "column_stats" => {
                let args: ColumnArgs = parse_arguments(arguments)?;
                table.column_stats(&args.column).map_err(|e| e.to_string())
            }
            other => Err(format!("{other} is not a table tool")),
        }
    }
}

#[async_trait]
impl ToolBox for TableTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        let limit = json!({
            "type": "integer",
            "description": format!("Rows to return, default {DEFAULT_LIMIT}, at most {MAX_LIMIT}."),
        });
        vec![
            ToolDefinition::function(
                "describe_table",
                "Row count, column names and the first rows of the table.",
                json!({"type": "object", "properties": {}}),
            ),
            ToolDefinition::function(
                "sort_rows",
                "Rows ordered by a column. Numeric cells (e.g. sales figures) sort as numbers.",
                json!({
                    "type": "object",
                    "properties": {
                        "column": {"type": "string"},
                        "descending": {"type": "boolean", "description": "Largest first. Defaults to true."},
                        "limit": limit,
                    },
                    "required": ["column"]
                }),
            ),
            ToolDefinition::function(
                "filter_rows",
                "Rows whose column contains the given text, case-insensitive.",
                json!({
                    "type": "object",
                    "properties": {
                        "column": {"type": "string"},
                        "contains": {"type": "string"},
                        "limit": limit,
                    },
                    "required": ["column", "contains"]
                }),
            ),
            ToolDefinition::function(
                "column_stats",
                "Count, sum, min, max and mean of the numeric cells in a column.",
                json!({
                    "type": "object",
                    "properties": {"column": {"type": "string"}},
                    "required": ["column"]
                }),
            ),
        ]
    }

    async fn call(&self, name: &str, arguments: &str) -> AgentResult<String> {
        Ok(self
            .run(name, arguments)
            .unwrap_or_else(|e| format!("Error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::executor::testing::{ScriptedModel, Step};
    use crate::llm::Role;
    use std::sync::Arc;

    const XBOX: &str = "\
Title,Sales,Publisher
Minecraft,\"8,000,000\",Microsoft
Grand Theft Auto V,\"8,720,000\",Rockstar Games
Call of Duty: Black Ops III,\"7,370,000\",Activision
";

    fn agent(steps: Vec<Step>) -> (DatasetAgent, Arc<ScriptedModel>) {
        let model = Arc::new(ScriptedModel::new(steps));
        let table = Table::parse("xboxone.csv", XBOX).unwrap();
        let agent = DatasetAgent::new("Xbox One Agent", Box::new(model.clone()), table, 5);
        (agent, model)
    }

    #[tokio::test]
    async fn answers_after_querying_the_table() {
        let (agent, model) = agent(vec![
            Step::Calls(vec![("sort_rows", r#"{"column":"Sales","limit":1}"#)]),
            Step::Answer("Grand Theft Auto V"),
        ]);

        let answer = agent
            .invoke("¿Cuál es el juego más vendido de Xbox One?")
            .await
            .unwrap();
        assert_eq!(answer, "Grand Theft Auto V");

        let requests = model.requests.lock().unwrap();
        let (first, tools) = &requests[0];
        assert_eq!(
            tools,
            &vec!["describe_table", "sort_rows", "filter_rows", "column_stats"]
        );
        assert_eq!(first[0].role, Role::System);
        assert!(first[0].content.as_deref().unwrap().contains("xboxone.csv"));
        assert_eq!(
            first[1].content.as_deref(),
            Some("¿Cuál es el juego más vendido de Xbox One?")
        );

        let observation = requests[1].0.last().unwrap().content.clone().unwrap();
        assert_eq!(
            observation,
            "Title | Sales | Publisher\nGrand Theft Auto V | 8,720,000 | Rockstar Games"
        );
    }

    #[tokio::test]
    async fn table_errors_go_back_to_the_model() {
        let (agent, model) = agent(vec![
            Step::Calls(vec![
                ("column_stats", r#"{"column":"Units"}"#),
                ("filter_rows", r#"{"column":"Title"}"#),
            ]),
            Step::Answer("No lo sé"),
        ]);

        agent.invoke("¿Cuántas unidades?").await.unwrap();

        let requests = model.requests.lock().unwrap();
        let messages = &requests[1].0;
        let unknown = messages[messages.len() - 2].content.clone().unwrap();
        let bad_args = messages[messages.len() - 1].content.clone().unwrap();
        assert!(unknown.starts_with("Error: unknown column 'Units'"));
        assert!(bad_args.starts_with("Error: invalid arguments"));
    }

    #[test]
    fn sort_defaults_to_descending() {
        let (agent, _) = agent(vec![]);
        let out = agent
            .table
            .run("sort_rows", r#"{"column":"sales","limit":2}"#)
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].starts_with("Grand Theft Auto V"));
        assert!(lines[2].starts_with("Minecraft"));
        assert_eq!(agent.table().len(), 3);
    }
}
