//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kanban_core::board::{default_board, Board, BoardStore};
use kanban_core::storage::{FileKeyValueStore, KeyValueStore};

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    board_store: BoardStore,
    data_dir: PathBuf,
}

impl AppState {
    /// Open the board saved in the configured data directory
    pub async fn new(config: &ServerConfig) -> kanban_core::Result<Self> {
        let storage = Arc::new(FileKeyValueStore::new(config.storage_path()).await?);
        Self::with_storage(config, storage).await
    }

    /// Open the board from an arbitrary key-value store
    pub async fn with_storage(
        config: &ServerConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> kanban_core::Result<Self> {
        let initial = if config.seed_default {
            default_board
        } else {
            Board::new
        };
        let board_store = BoardStore::load_or(storage, config.storage_key.clone(), initial).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                board_store,
                data_dir: config.data_dir.clone(),
            }),
        })
    }

    /// Get reference to the board store
    pub fn board_store(&self) -> &BoardStore {
        &self.inner.board_store
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }
}
