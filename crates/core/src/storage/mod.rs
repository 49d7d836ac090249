//! Key-value persistence
//!
//! The board is saved as a single string value under one key, the same way
//! a browser keeps it in local storage.

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

use async_trait::async_trait;

use crate::Result;

/// Key under which the serialized board is kept
pub const DEFAULT_BOARD_KEY: &str = "columns";

/// String key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing what was there
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
