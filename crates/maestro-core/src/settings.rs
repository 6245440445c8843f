use crate::platform::Platform;
use crate::theme::ThemeVariant;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    ApiKey,
    Model,
    MaxIterations,
}

/// CSV file backing each platform's dataset agent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub switch: PathBuf,
    pub playstation4: PathBuf,
    pub xbox_one: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            switch: PathBuf::from("switch.csv"),
            playstation4: PathBuf::from("ps4.csv"),
            xbox_one: PathBuf::from("xboxone.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemeVariant,
    pub model: String,
    pub temperature: f32,
    pub api_base: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub max_iterations: usize,
    pub datasets: DatasetPaths,
    pub prompt_template_url: Option<String>,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::default(),
            model: "gpt-4".to_string(),
            temperature: 0.0,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            max_iterations: 15,
            datasets: DatasetPaths::default(),
            prompt_template_url: None,
            log_file: PathBuf::from("maestro.log"),
        }
    }
}

impl Settings {
    /// Loads settings from `config.toml` in the working directory, then the
    /// process environment.
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment(CONFIG_FILE).extract()
    }

    /// Layering, lowest first: defaults, the TOML file, `MAESTRO_*`
    /// variables (nested keys split on `__`), `OPENAI_API_KEY`.
    pub fn figment(config_path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path.as_ref()))
            .merge(Env::prefixed("MAESTRO_").split("__"))
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY"])
                    .map(|_| "api_key".into()),
            )
    }

    /// Persists the theme choice. Other keys already in the config file are
    /// kept as written; environment overrides never reach the file.
    pub fn save_theme(&self) -> anyhow::Result<()> {
        self.save_theme_to(CONFIG_FILE)
    }

    pub fn save_theme_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let mut table: toml::Table = match fs::read_to_string(path) {
            Ok(text) => text.parse()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => toml::Table::new(),
            Err(e) => return Err(e.into()),
        };
        table.insert("theme".to_string(), toml::Value::try_from(self.theme)?);
        fs::write(path, toml::to_string_pretty(&table)?)?;
        Ok(())
    }

    pub fn dataset_path(&self, platform: Platform) -> &Path {
        match platform {
            Platform::Switch => &self.datasets.switch,
            Platform::PlayStation4 => &self.datasets.playstation4,
            Platform::XboxOne => &self.datasets.xbox_one,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::Model);
        }
        if self.max_iterations == 0 {
            return Err(ValidationError::MaxIterations);
        }
        if !self.has_api_key() {
            return Err(ValidationError::ApiKey);
        }
        Ok(())
    }
}
