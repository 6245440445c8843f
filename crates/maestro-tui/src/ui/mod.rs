pub mod app;
mod footer;
mod header;
mod output;
mod query;
mod tasks;

use maestro_core::theme::{Element, Theme};
use ratatui::{
    prelude::Alignment,
    text::{Line, Span},
    widgets::Paragraph,
};

/// A one-line button, highlighted while it has focus.
fn button<'a>(label: &'a str, focused: bool, theme: &Theme) -> Paragraph<'a> {
    let style = if focused {
        theme.style(Element::Active)
    } else {
        theme.style(Element::Inactive)
    };
    Paragraph::new(Line::from(vec![
        Span::styled("[ ", style),
        Span::styled(label, style),
        Span::styled(" ]", style),
    ]))
    .alignment(Alignment::Left)
}
