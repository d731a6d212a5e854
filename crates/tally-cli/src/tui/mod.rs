mod app;

use std::{io, time::Duration};

use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tally_core::{storage::SlotStore, todos::TodoPatch};
use tally_todo::{Change, TodoStore};
use tracing::debug;

use crate::theme::Theme;
use app::{Action, App, Mode};

/// Interactive todo list. The view subscribes to the store and redraws from
/// the list it publishes after every mutation.
pub async fn launch<S: SlotStore>(todos: &TodoStore<S>, theme: Theme) -> Result<()> {
    let mut changes = todos.subscribe();
    let mut app = App::new(changes.borrow_and_update().clone(), theme, todos.load_state());

    // Guard restores the terminal even if we early-return.
    let guard = TerminalGuard::enter()?;
    let mut terminal = guard.terminal()?;

    loop {
        if changes.has_changed().unwrap_or(false) {
            app.refresh(changes.borrow_and_update().clone());
        }
        terminal.draw(|frame| draw(frame, &app))?;

        if !event::poll(Duration::from_millis(150))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.on_key(key) {
            Some(Action::Quit) => break,
            Some(action) => {
                if let Err(err) = apply(todos, action).await {
                    app.status = Some(format!("{err:#}"));
                }
            }
            None => {}
        }
    }

    Ok(())
}

async fn apply<S: SlotStore>(todos: &TodoStore<S>, action: Action) -> anyhow::Result<()> {
    debug!(?action, "applying tui action");
    match action {
        Action::Quit => {}
        Action::Add(text) => {
            todos.add(text).await?;
        }
        Action::Rename { id, text } => {
            let Some(current) = todos.list().get(id).cloned() else {
                return Ok(());
            };
            let patch = TodoPatch {
                text,
                ..TodoPatch::from_todo(&current)
            };
            todos.update(id, patch).await?;
        }
        Action::Toggle(id) => {
            todos.toggle_complete(id).await?;
        }
        Action::Delete(id) => {
            if let Change::Unchanged = todos.delete(id).await? {
                debug!(id, "delete targeted a todo that is already gone");
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    let base = Style::default().fg(palette.text).bg(palette.background);
    frame.render_widget(Block::default().style(base), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let done = app.todos.completed_count();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Tally",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {done}/{} done", app.todos.len())),
    ]))
    .style(base)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!("Todos ({} theme)", app.theme.label())),
    );
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = app
        .todos
        .iter()
        .map(|t| {
            let (mark, color) = if t.is_completed {
                ("[x]", palette.done)
            } else {
                ("[ ]", palette.pending)
            };
            let mut text_style = Style::default();
            if t.is_completed {
                text_style = text_style.add_modifier(Modifier::CROSSED_OUT);
            }
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(t.text.as_str(), text_style),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    if !app.todos.is_empty() {
        state.select(Some(app.selected));
    }
    let body = List::new(items)
        .style(base)
        .highlight_style(Style::default().bg(palette.highlight))
        .block(Block::default().borders(Borders::ALL).title("Items"));
    frame.render_stateful_widget(body, chunks[1], &mut state);

    let (input_title, input_text) = match &app.mode {
        Mode::Browse => ("Input", app.status.clone().unwrap_or_default()),
        Mode::Adding { .. } => ("New todo", app.input().unwrap_or_default().to_string()),
        Mode::Editing { .. } => ("Edit todo", app.input().unwrap_or_default().to_string()),
    };
    let input = Paragraph::new(input_text)
        .style(base)
        .block(Block::default().borders(Borders::ALL).title(input_title));
    frame.render_widget(input, chunks[2]);

    let hint = match app.mode {
        Mode::Browse => "a add  e edit  space toggle  d delete  t theme  q quit",
        _ => "Enter save  Esc cancel",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(palette.accent),
    )))
    .style(base)
    .block(Block::default().borders(Borders::ALL).title("Controls"));
    frame.render_widget(footer, chunks[3]);
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors go to stderr, Drop cannot propagate them.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}
