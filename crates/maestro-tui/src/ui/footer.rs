use maestro_core::theme::{Element, Theme};
use ratatui::{
    prelude::{Alignment, Frame, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render_footer(frame: &mut Frame, area: Rect, theme: &Theme) {
    let footer_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.style(Element::Border));

    let inner_area = footer_block.inner(area);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(key, theme.style(Element::Text)),
            Span::styled(label, theme.style(Element::Inactive)),
        ]
    };

    let mut spans = Vec::new();
    for (i, (key, label)) in [
        ("[Tab]", " foco"),
        ("[↑↓]", " tarea"),
        ("[Enter]", " ejecutar"),
        ("[PgUp/PgDn]", " desplazar"),
        ("[Ctrl+T]", " tema"),
        ("[Esc]", " salir"),
    ]
    .into_iter()
    .enumerate()
    {
        if i > 0 {
            spans.push(Span::raw(" | "));
        }
        spans.extend(hint(key, label));
    }

    let footer_paragraph = Paragraph::new(Line::from(spans).alignment(Alignment::Center))
        .style(theme.style(Element::Text));

    frame.render_widget(footer_block, area);
    frame.render_widget(footer_paragraph, inner_area);
}
