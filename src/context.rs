use crate::config::ConfigManager;
use crate::db::LinkStore;
use anyhow::{Context as AnyhowContext, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Everything one invocation needs: resolved configuration and the open store.
/// The store is released when the context is closed or dropped.
pub struct AppContext {
    pub store: LinkStore,
    pub store_path: PathBuf,
    pub config_manager: ConfigManager,
}

impl AppContext {
    pub fn new(store_path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config_manager = ConfigManager::new(config_path)?;
        if let Some(path) = &config_manager.global_config_path {
            debug!("Global config path: {}", path.display());
        }
        if let Some(path) = &config_manager.explicit_config_path {
            debug!("Explicit config path: {}", path.display());
        }
        debug!("Using configuration: {:?}", config_manager.config());

        let store = LinkStore::open(store_path, config_manager.store_options())
            .with_context(|| format!("Failed to initialize store at {}", store_path.display()))?;

        Ok(Self {
            store,
            store_path: store_path.to_path_buf(),
            config_manager,
        })
    }

    pub fn pretty(&self) -> bool {
        self.config_manager.pretty()
    }

    pub fn close(self) -> Result<()> {
        debug!("Closing store at {}", self.store_path.display());
        self.store
            .close()
            .with_context(|| format!("Failed to close store at {}", self.store_path.display()))
    }
}
