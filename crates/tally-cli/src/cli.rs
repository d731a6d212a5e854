use clap::{ArgAction, Parser, Subcommand};
use tally_core::todos::TodoId;

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "A small persisted todo list for the terminal",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch the interactive TUI (press q or Esc to exit).
    Tui,
    /// Print version and exit.
    Version,
    /// Run a health check against the slot storage.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(flatten)]
    Todo(TodoCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TodoCommand {
    /// Add a todo; words are joined with single spaces.
    Add {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// List todos in insertion order.
    List,
    /// Change the text or completion flag of a todo.
    Edit {
        id: TodoId,
        /// New text.
        #[arg(long)]
        text: Option<String>,
        /// New completion flag (`true` or `false`).
        #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
        completed: Option<bool>,
    },
    /// Flip the completion flag of a todo.
    Toggle { id: TodoId },
    /// Remove a todo.
    Delete { id: TodoId },
}
