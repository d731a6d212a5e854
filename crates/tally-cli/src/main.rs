mod cli;
mod config;
mod storage;
mod theme;
mod todos;
mod tui;

use crate::cli::{Command, ConfigCommand};
use clap::Parser;
use color_eyre::Result;
use tally_core::storage::SlotStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI subcommands and the TUI to one todo store.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);
    init_tracing(&command);

    let config = config::load()?;
    match command {
        Command::Tui => {
            let store = storage::open_todos(&config).await?;
            tui::launch(&store, config.theme()).await?
        }
        Command::Version => print_version(),
        Command::Health => run_health_check(&config).await?,
        Command::Config(ConfigCommand::Init) => init_config()?,
        Command::Todo(cmd) => {
            let store = storage::open_todos(&config).await?;
            todos::handle(cmd, &store, &mut std::io::stdout()).await?
        }
    }

    Ok(())
}

fn init_tracing(command: &Command) {
    // The TUI owns the screen, so only warnings get through by default there.
    let default_level = match command {
        Command::Tui => "warn",
        _ => "info",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("tally {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick health check of the slot storage path.
async fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

async fn run_store_health<S: SlotStore>(store: &S) -> Result<()> {
    let probe_key = "health-probe";
    let payload = b"ok";
    store
        .put(probe_key, payload)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    let round_trip = store
        .get(probe_key)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    store
        .delete(probe_key)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config() -> Result<()> {
    let path = config::write_default_if_missing()?;
    println!("Config initialized at {}", path.display());
    Ok(())
}
