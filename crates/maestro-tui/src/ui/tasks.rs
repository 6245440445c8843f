use super::button;
use maestro_core::theme::{Element, Theme};
use ratatui::{
    prelude::{Constraint, Direction, Frame, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

pub const RUN_TASK_LABEL: &str = "Ejecutar tarea seleccionada";

/// The preset-question picker and its run button.
pub fn render_tasks(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    tasks: &[&str],
    selected: usize,
    focus_picker: bool,
    focus_button: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| ListItem::new(Line::from(Span::raw(*task))))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Selección de tareas predefinidas ")
                .title_style(theme.style(Element::Title))
                .border_style(theme.border_style(focus_picker)),
        )
        .style(theme.style(Element::Text))
        .highlight_style(theme.style(Element::Highlight))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, chunks[0], &mut state);
    frame.render_widget(button(RUN_TASK_LABEL, focus_button, theme), chunks[1]);
}
