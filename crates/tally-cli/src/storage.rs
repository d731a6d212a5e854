use std::path::PathBuf;

use crate::config::Config;
use color_eyre::Result;
use dirs::data_dir;
use tally_storage::file_slot_store::FileSlotStore;
use tally_todo::TodoStore;
use tracing::debug;

/// Resolve the default data directory for Tally.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("tally"))
}

/// Build the file-backed slot store, honouring the config override.
pub fn store_from_config(config: &Config) -> Result<FileSlotStore> {
    let root = match &config.data_dir {
        Some(root) => {
            debug!(?root, "initializing slot store (config override)");
            root.clone()
        }
        None => {
            let root = default_data_dir()?;
            debug!(?root, "initializing slot store");
            root
        }
    };
    Ok(FileSlotStore::new(root))
}

/// Open the todo store for this process.
pub async fn open_todos(config: &Config) -> Result<TodoStore<FileSlotStore>> {
    let store = store_from_config(config)?;
    TodoStore::open(store, config.slot_key())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))
}
