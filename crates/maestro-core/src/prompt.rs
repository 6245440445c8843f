//! Prompt templates with `{name}` placeholders and where they come from.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use thiserror::Error;

/// Role template for the orchestrating agent. The model sees the tools as
/// functions; `{tools}` and `{tool_names}` restate them in prose.
pub const BUILTIN_ORCHESTRATOR_TEMPLATE: &str = r#"{instructions}

You have access to the following tools:

{tools}

Work step by step. Decide which of [{tool_names}] can answer each part of the question,
call them with a precise question in their `input` argument, and read what they return.
You may call several tools, or the same tool more than once. When you know the answer,
reply to the user directly and in the same language as the question, without calling
any further tools. Never invent figures that no tool returned."#;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template variable '{0}' was not provided")]
    Missing(String),
    #[error("unbalanced brace at byte {0} in template")]
    Unbalanced(usize),
    #[error("failed to fetch prompt template from {url}: {reason}")]
    Fetch { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    text: String,
    partials: BTreeMap<String, String>,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            partials: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Pre-fills one variable; later `render` values for it are ignored.
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.partials.insert(name.into(), value.into());
        self
    }

    /// Names of every placeholder in the template, in order of appearance.
    pub fn variables(&self) -> Result<Vec<String>, TemplateError> {
        let mut names = Vec::new();
        for segment in parse(&self.text)? {
            if let Segment::Var(name) = segment {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    pub fn render(&self, values: &[(&str, &str)]) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        for segment in parse(&self.text)? {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Brace(c) => out.push(c),
                Segment::Var(name) => {
                    let value = self
                        .partials
                        .get(name)
                        .map(String::as_str)
                        .or_else(|| values.iter().find(|(k, _)| *k == name).map(|(_, v)| *v))
                        .ok_or_else(|| TemplateError::Missing(name.to_string()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Var(&'a str),
}

fn parse(text: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                segments.push(Segment::Literal(&text[start..i]));
                segments.push(Segment::Brace(bytes[i] as char));
                i += 2;
                start = i;
            }
            b'{' => {
                let close = text[i + 1..]
                    .find('}')
                    .map(|offset| i + 1 + offset)
                    .ok_or(TemplateError::Unbalanced(i))?;
                let name = text[i + 1..close].trim();
                if name.is_empty() || name.contains('{') {
                    return Err(TemplateError::Unbalanced(i));
                }
                segments.push(Segment::Literal(&text[start..i]));
                segments.push(Segment::Var(name));
                i = close + 1;
                start = i;
            }
            b'}' => return Err(TemplateError::Unbalanced(i)),
            _ => i += 1,
        }
    }
    segments.push(Segment::Literal(&text[start..]));
    Ok(segments)
}

/// Where the orchestrator's role template comes from.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn pull(&self) -> Result<PromptTemplate, TemplateError>;
}

pub struct BuiltinTemplate;

#[async_trait]
impl TemplateSource for BuiltinTemplate {
    async fn pull(&self) -> Result<PromptTemplate, TemplateError> {
        Ok(PromptTemplate::new(BUILTIN_ORCHESTRATOR_TEMPLATE))
    }
}

/// Fetches the template body as plain text on every pull.
pub struct RemoteTemplate {
    client: Client,
    url: String,
}

impl RemoteTemplate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl TemplateSource for RemoteTemplate {
    async fn pull(&self) -> Result<PromptTemplate, TemplateError> {
        let fetch_error = |reason: String| TemplateError::Fetch {
            url: self.url.clone(),
            reason,
        };

        tracing::debug!(url = %self.url, "pulling prompt template");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        let body = response.text().await.map_err(|e| fetch_error(e.to_string()))?;
        let template = PromptTemplate::new(body);
        let variables = template.variables()?;
        tracing::debug!(url = %self.url, ?variables, "prompt template pulled");
        Ok(template)
    }
}

/// Remote source when a URL is configured, the built-in template otherwise.
pub fn template_source(url: Option<&str>) -> Box<dyn TemplateSource> {
    match url {
        Some(url) if !url.trim().is_empty() => Box::new(RemoteTemplate::new(url.trim())),
        _ => Box::new(BuiltinTemplate),
    }
}
