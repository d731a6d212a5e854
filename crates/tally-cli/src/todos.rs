use std::io::Write;

use color_eyre::Result;
use tally_core::{
    storage::SlotStore,
    todos::{Todo, TodoId, TodoPatch},
};
use tally_todo::{Change, LoadState, TodoStore};

use crate::cli::TodoCommand;

/// Execute a todo subcommand against an open store, writing human output to `out`.
pub async fn handle<S: SlotStore, W: Write>(
    cmd: TodoCommand,
    todos: &TodoStore<S>,
    out: &mut W,
) -> Result<()> {
    if let LoadState::Discarded { reason } = todos.load_state() {
        writeln!(out, "Stored todos were unreadable and have been reset ({reason}).")?;
    }

    match cmd {
        TodoCommand::List => {
            let list = todos.list();
            if list.is_empty() {
                writeln!(out, "No todos yet. Add one with `tally add <text>`.")?;
                return Ok(());
            }
            for todo in &list {
                writeln!(out, "{}", format_todo(todo))?;
            }
            writeln!(
                out,
                "{} of {} done",
                list.completed_count(),
                list.len()
            )?;
        }
        TodoCommand::Add { text } => {
            let todo = todos
                .add(text.join(" "))
                .await
                .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?;
            writeln!(out, "Added {}: {}", todo.id, todo.text)?;
        }
        TodoCommand::Edit {
            id,
            text,
            completed,
        } => {
            let Some(current) = todos.list().get(id).cloned() else {
                return report_missing(out, id);
            };
            let mut patch = TodoPatch::from_todo(&current);
            if let Some(text) = text {
                patch.text = text;
            }
            if let Some(completed) = completed {
                patch.is_completed = completed;
            }
            let change = todos
                .update(id, patch)
                .await
                .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?;
            match change {
                Change::Applied(todo) => writeln!(out, "Updated {}", format_todo(&todo))?,
                Change::Unchanged => writeln!(out, "Nothing to change for {id}.")?,
            }
        }
        TodoCommand::Toggle { id } => {
            let change = todos
                .toggle_complete(id)
                .await
                .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?;
            match change {
                Change::Applied(todo) => writeln!(out, "Toggled {}", format_todo(&todo))?,
                Change::Unchanged => report_missing(out, id)?,
            }
        }
        TodoCommand::Delete { id } => {
            let change = todos
                .delete(id)
                .await
                .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?;
            match change {
                Change::Applied(todo) => writeln!(out, "Deleted {}: {}", todo.id, todo.text)?,
                Change::Unchanged => report_missing(out, id)?,
            }
        }
    }

    Ok(())
}

pub fn format_todo(todo: &Todo) -> String {
    let mark = if todo.is_completed { 'x' } else { ' ' };
    format!("{} [{mark}] {}", todo.id, todo.text)
}

fn report_missing<W: Write>(out: &mut W, id: TodoId) -> Result<()> {
    writeln!(out, "No todo with id {id}.")?;
    Ok(())
}
