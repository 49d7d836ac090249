//! Server configuration from environment variables

use std::path::PathBuf;

use kanban_core::storage::DEFAULT_BOARD_KEY;

const DEFAULT_DATA_DIR: &str = ".kanban-data";
const DEFAULT_REST_PORT: u16 = 8081;
const DEFAULT_SOCKET_PORT: u16 = 8080;

/// Name of the key-value file inside the data directory
pub const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub rest_port: u16,
    pub socket_port: u16,
    /// Start an unsaved board from the sample columns rather than empty
    pub seed_default: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_BOARD_KEY.to_string(),
            rest_port: DEFAULT_REST_PORT,
            socket_port: DEFAULT_SOCKET_PORT,
            seed_default: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup("KANBAN_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            storage_key: lookup("KANBAN_STORAGE_KEY")
                .filter(|key| !key.trim().is_empty())
                .unwrap_or(defaults.storage_key),
            rest_port: port(&lookup, "KANBAN_REST_PORT", defaults.rest_port),
            socket_port: port(&lookup, "KANBAN_SOCKET_PORT", defaults.socket_port),
            seed_default: flag(&lookup, "KANBAN_SEED_DEFAULT", defaults.seed_default),
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    match lookup(name) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!("Ignoring invalid {}={:?}", name, raw);
                default
            }
        },
        None => default,
    }
}

fn port(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u16) -> u16 {
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", name, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), ServerConfig::default());
        assert_eq!(
            ServerConfig::default().storage_path(),
            PathBuf::from(".kanban-data/storage.json")
        );
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("KANBAN_DATA_DIR", "/var/lib/kanban"),
            ("KANBAN_STORAGE_KEY", "board"),
            ("KANBAN_REST_PORT", "9000"),
            ("KANBAN_SOCKET_PORT", " 9001 "),
            ("KANBAN_SEED_DEFAULT", "off"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/kanban"));
        assert_eq!(config.storage_key, "board");
        assert_eq!(config.rest_port, 9000);
        assert_eq!(config.socket_port, 9001);
        assert!(!config.seed_default);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("KANBAN_STORAGE_KEY", "  "),
            ("KANBAN_REST_PORT", "http"),
            ("KANBAN_SEED_DEFAULT", "maybe"),
        ]);
        assert_eq!(config.storage_key, "columns");
        assert_eq!(config.rest_port, 8081);
        assert!(config.seed_default);
    }
}
