use super::button;
use maestro_core::theme::{Element, Theme};
use ratatui::{
    prelude::{Constraint, Direction, Frame, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub const SUBMIT_LABEL: &str = "Procesar pregunta";
const PLACEHOLDER: &str = "Escribe tu pregunta aquí:";

/// The free-text question field and its submit button.
pub fn render_query(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    query: &str,
    focus_field: bool,
    focus_button: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let mut spans = if query.is_empty() && !focus_field {
        vec![Span::styled(PLACEHOLDER, theme.style(Element::Inactive))]
    } else {
        vec![Span::styled(query, theme.style(Element::Text))]
    };
    if focus_field {
        spans.push(Span::styled("_", theme.style(Element::Highlight)));
    }

    let field = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Preguntas sobre los juegos más vendidos ")
            .title_style(theme.style(Element::Title))
            .border_style(theme.border_style(focus_field)),
    );

    frame.render_widget(field, chunks[0]);
    frame.render_widget(button(SUBMIT_LABEL, focus_button, theme), chunks[1]);
}
