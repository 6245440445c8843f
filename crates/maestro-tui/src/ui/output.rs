use maestro_core::{
    dispatch::Outcome,
    theme::{Element, Theme},
};
use ratatui::{
    prelude::{Frame, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub const WORKING: &str = "Procesando...";

/// What the output block currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Empty,
    Working,
    Done(Outcome),
}

pub fn render_output(frame: &mut Frame, area: Rect, theme: &Theme, output: &Output, scroll: u16) {
    let (title, text) = match output {
        Output::Empty => ("", Text::default()),
        Output::Working => ("", styled_lines(WORKING, theme.style(Element::Info))),
        Output::Done(Outcome::Answer { heading, text }) => {
            (*heading, styled_lines(text, theme.style(Element::Text)))
        }
        Output::Done(Outcome::Invalid(message)) => {
            ("", styled_lines(message, theme.style(Element::Warning)))
        }
        Output::Done(Outcome::Failed(message)) => {
            ("", styled_lines(message, theme.style(Element::Error)))
        }
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.style(Element::Border));
    if !title.is_empty() {
        block = block
            .title(format!(" {} ", title))
            .title_style(theme.style(Element::Title));
    }

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

/// One `Line` per source line, so error bodies keep their breaks.
fn styled_lines(text: &str, style: Style) -> Text<'_> {
    Text::from(
        text.lines()
            .map(|l| Line::from(Span::styled(l, style)))
            .collect::<Vec<_>>(),
    )
}
