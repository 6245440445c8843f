use maestro_core::{
    settings::{Settings, ValidationError},
    theme::{Element, Theme},
};
use ratatui::{
    prelude::{Alignment, Frame, Rect},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Paragraph},
};

pub const TITLE: &str = "🎮 Agente Maestro de Juegos";
pub const INTRO: &str = "Esta aplicación permite consultar información sobre los juegos más vendidos \
para Nintendo Switch, PlayStation 4 y Xbox One mediante un agente maestro.";

pub fn render_header(frame: &mut Frame, area: Rect, theme: &Theme, settings: &Settings) {
    let title = Title::from(format!(" {} ", TITLE)).alignment(Alignment::Left);

    let (status_text, status_element) = status(settings);
    let line = Line::from(vec![
        Span::styled("Maestro :: ", theme.style(Element::Text)),
        Span::styled(settings.model.as_str(), theme.style(Element::Info)),
        Span::styled(" :: ", theme.style(Element::Text)),
        Span::styled(status_text, theme.style(status_element)),
    ]);

    let header = Paragraph::new(line).alignment(Alignment::Left).block(
        Block::new()
            .borders(Borders::ALL)
            .title(title)
            .title_style(theme.style(Element::Title))
            .border_style(theme.style(Element::Border)),
    );

    frame.render_widget(header, area);
}

fn status(settings: &Settings) -> (&'static str, Element) {
    match settings.is_valid() {
        Ok(()) => ("API KEY OK", Element::Active),
        Err(ValidationError::ApiKey) => ("[FALTA OPENAI_API_KEY]", Element::Error),
        Err(ValidationError::Model) => ("[CONFIGURE MODEL]", Element::Error),
        Err(ValidationError::MaxIterations) => ("[CONFIGURE MAX ITERATIONS]", Element::Warning),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_api_key() {
        let mut settings = Settings::default();
        settings.api_key.clear();
        assert_eq!(status(&settings).0, "[FALTA OPENAI_API_KEY]");

        settings.api_key = "sk-test".to_string();
        assert_eq!(status(&settings), ("API KEY OK", Element::Active));
    }
}
