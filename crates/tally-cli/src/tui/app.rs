use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tally_core::todos::{TodoId, TodoList};
use tally_todo::LoadState;

use crate::theme::Theme;

/// What the keyboard is currently driving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Adding { input: String },
    Editing { id: TodoId, input: String },
}

/// Store operation requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Add(String),
    Rename { id: TodoId, text: String },
    Toggle(TodoId),
    Delete(TodoId),
}

/// View state of the TUI. The todo list itself is a copy refreshed from the store.
#[derive(Debug, Clone)]
pub struct App {
    pub todos: TodoList,
    pub selected: usize,
    pub mode: Mode,
    pub theme: Theme,
    pub status: Option<String>,
}

impl App {
    pub fn new(todos: TodoList, theme: Theme, load_state: &LoadState) -> Self {
        let status = match load_state {
            LoadState::Discarded { reason } => {
                Some(format!("stored todos were unreadable and have been reset: {reason}"))
            }
            _ => None,
        };
        Self {
            todos,
            selected: 0,
            mode: Mode::Browse,
            theme,
            status,
        }
    }

    /// Take a fresh list from the store, keeping the selection in range.
    /// A grown list selects its new last row, where added todos land.
    pub fn refresh(&mut self, todos: TodoList) {
        let grew = todos.len() > self.todos.len();
        self.todos = todos;
        let last = self.todos.len().saturating_sub(1);
        self.selected = if grew { last } else { self.selected.min(last) };
    }

    pub fn selected_id(&self) -> Option<TodoId> {
        self.todos.as_slice().get(self.selected).map(|t| t.id)
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        if self.mode == Mode::Browse {
            return self.on_browse_key(key.code);
        }
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                None
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                if let Some(input) = self.input_mut() {
                    input.pop();
                }
                None
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.input_mut() {
                    input.push(c);
                }
                None
            }
            _ => None,
        }
    }

    /// Text being typed, if an input line is open.
    pub fn input(&self) -> Option<&str> {
        match &self.mode {
            Mode::Browse => None,
            Mode::Adding { input } | Mode::Editing { input, .. } => Some(input),
        }
    }

    fn input_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            Mode::Browse => None,
            Mode::Adding { input } | Mode::Editing { input, .. } => Some(input),
        }
    }

    fn on_browse_key(&mut self, code: KeyCode) -> Option<Action> {
        self.status = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.todos.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Char('a') => {
                self.mode = Mode::Adding {
                    input: String::new(),
                };
                None
            }
            KeyCode::Char('e') => {
                if let Some(todo) = self.todos.as_slice().get(self.selected) {
                    self.mode = Mode::Editing {
                        id: todo.id,
                        input: todo.text.clone(),
                    };
                }
                None
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.selected_id().map(Action::Toggle),
            KeyCode::Char('d') => self.selected_id().map(Action::Delete),
            KeyCode::Char('t') => {
                self.theme = self.theme.toggled();
                self.status = Some(format!("{} theme", self.theme.label()));
                None
            }
            _ => None,
        }
    }

    fn submit_input(&mut self) -> Option<Action> {
        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Adding { input } => Some(Action::Add(input)),
            Mode::Editing { id, input } => Some(Action::Rename { id, text: input }),
            Mode::Browse => None,
        }
    }
}
