use super::{
    footer::render_footer,
    header::{render_header, INTRO},
    output::{render_output, Output},
    query::render_query,
    tasks::render_tasks,
};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use maestro_core::{
    dispatch::Dispatcher,
    platform::preset_questions,
    settings::Settings,
    theme::{Element, Theme},
};
use ratatui::{
    prelude::{Backend, Constraint, Direction, Layout, Terminal},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::time::Duration;

const SCROLL_STEP: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tasks,
    RunTask,
    Query,
    SubmitQuery,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Self::Tasks => Self::RunTask,
            Self::RunTask => Self::Query,
            Self::Query => Self::SubmitQuery,
            Self::SubmitQuery => Self::Tasks,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Self::Tasks => Self::SubmitQuery,
            Self::RunTask => Self::Tasks,
            Self::Query => Self::RunTask,
            Self::SubmitQuery => Self::Query,
        }
    }
}

/// Work a key press asks for beyond a plain state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RunPreset(String),
    SubmitQuery(String),
    ToggleTheme,
    Quit,
}

pub struct App {
    should_quit: bool,
    theme: Theme,
    settings: Settings,
    dispatcher: Dispatcher,
    tasks: Vec<&'static str>,
    focus: Focus,
    selected_task: usize,
    query: String,
    output: Output,
    scroll: u16,
}

impl App {
    pub fn new(settings: Settings, dispatcher: Dispatcher) -> Self {
        let theme = Theme::new(settings.theme);
        Self {
            should_quit: false,
            theme,
            settings,
            dispatcher,
            tasks: preset_questions(),
            focus: Focus::default(),
            selected_task: 0,
            query: String::new(),
            output: Output::default(),
            scroll: 0,
        }
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.draw(terminal)?;
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = self.handle_key(key) {
                            self.perform(action, terminal).await?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn perform<B: Backend>(
        &mut self,
        action: Action,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleTheme => {
                self.theme.toggle();
                self.settings.theme = self.theme.variant();
                if let Err(e) = self.settings.save_theme() {
                    tracing::warn!(error = %e, "could not persist theme");
                }
            }
            Action::RunPreset(question) => {
                self.begin(terminal)?;
                let outcome = self.dispatcher.run_preset(&question).await;
                self.output = Output::Done(outcome);
                discard_pending_input()?;
            }
            Action::SubmitQuery(query) => {
                self.begin(terminal)?;
                let outcome = self.dispatcher.run_query(&query).await;
                self.output = Output::Done(outcome);
                discard_pending_input()?;
            }
        }
        Ok(())
    }

    fn begin<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.output = Output::Working;
        self.scroll = 0;
        self.draw(terminal)
    }

    /// Applies a key press to the local state, returning any work it triggers.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Some(Action::Quit),
            KeyCode::Char('t') if ctrl => return Some(Action::ToggleTheme),
            KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return None;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
                return None;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(SCROLL_STEP);
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Tasks => match key.code {
                KeyCode::Up => {
                    self.selected_task =
                        (self.selected_task + self.tasks.len() - 1) % self.tasks.len();
                    None
                }
                KeyCode::Down => {
                    self.selected_task = (self.selected_task + 1) % self.tasks.len();
                    None
                }
                KeyCode::Enter => self.run_selected(),
                _ => None,
            },
            Focus::RunTask => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.run_selected(),
                _ => None,
            },
            Focus::Query => match key.code {
                KeyCode::Enter => Some(Action::SubmitQuery(self.query.clone())),
                KeyCode::Backspace => {
                    self.query.pop();
                    None
                }
                KeyCode::Char(c) if !ctrl => {
                    self.query.push(c);
                    None
                }
                _ => None,
            },
            Focus::SubmitQuery => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    Some(Action::SubmitQuery(self.query.clone()))
                }
                _ => None,
            },
        }
    }

    fn run_selected(&self) -> Option<Action> {
        self.tasks
            .get(self.selected_task)
            .map(|task| Action::RunPreset(task.to_string()))
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.size();
            frame.render_widget(
                Block::new()
                    .borders(Borders::NONE)
                    .style(self.theme.style(Element::Background)),
                area,
            );

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(self.tasks.len() as u16 + 3),
                    Constraint::Length(4),
                    Constraint::Min(3),
                    Constraint::Length(3),
                ])
                .split(area);

            render_header(frame, chunks[0], &self.theme, &self.settings);

            let intro = Paragraph::new(INTRO)
                .style(self.theme.style(Element::Text))
                .wrap(Wrap { trim: true })
                .block(Block::new().borders(Borders::NONE));
            frame.render_widget(intro, chunks[1]);

            render_tasks(
                frame,
                chunks[2],
                &self.theme,
                &self.tasks,
                self.selected_task,
                self.focus == Focus::Tasks,
                self.focus == Focus::RunTask,
            );
            render_query(
                frame,
                chunks[3],
                &self.theme,
                &self.query,
                self.focus == Focus::Query,
                self.focus == Focus::SubmitQuery,
            );
            render_output(frame, chunks[4], &self.theme, &self.output, self.scroll);
            render_footer(frame, chunks[5], &self.theme);
        })?;
        Ok(())
    }
}

/// Drops key presses typed while a request was running.
fn discard_pending_input() -> Result<()> {
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    Ok(())
}
