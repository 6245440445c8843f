//! The three gaming platforms, their preset questions and tool metadata.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Platform {
    #[strum(to_string = "Nintendo Switch")]
    Switch,
    #[strum(to_string = "PlayStation 4")]
    PlayStation4,
    #[strum(to_string = "Xbox One")]
    XboxOne,
}

impl Platform {
    /// All platforms in picker order.
    pub fn all() -> Vec<Platform> {
        Platform::iter().collect()
    }

    /// The fixed preset question routed to this platform's agent.
    pub fn preset_question(&self) -> &'static str {
        match self {
            Platform::Switch => "¿Cuál es el juego más vendido de Nintendo Switch?",
            Platform::PlayStation4 => "¿Cuál es el juego más vendido de PlayStation 4?",
            Platform::XboxOne => "¿Cuál es el juego más vendido de Xbox One?",
        }
    }

    /// Maps a preset question back to its platform. Matching is exact.
    pub fn from_preset(question: &str) -> Option<Platform> {
        Platform::iter().find(|p| p.preset_question() == question)
    }

    pub fn tool_name(&self) -> String {
        format!("{} Agent", self)
    }

    pub fn tool_description(&self) -> String {
        format!(
            "Responde preguntas sobre juegos de {}, como el más vendido.",
            self
        )
    }
}

/// Preset questions in picker order.
pub fn preset_questions() -> Vec<&'static str> {
    Platform::iter().map(|p| p.preset_question()).collect()
}
