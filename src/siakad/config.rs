//! # Configuration
//!
//! Settings are loaded with [`confique`] in priority order:
//! 1. **Environment variables**: `SIAKAD_DATA_DIR`, `SIAKAD_LOG_LEVEL`.
//! 2. **Config file**: `siakad.toml` in the OS config directory.
//! 3. **Compiled defaults**.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data directory | Where the document store and session file live |
//! | `log_level` | `warn` | Filter used when `RUST_LOG` is unset |
//! | `remember_me` | `false` | Default for `siakad login --remember` |

use crate::error::{Result, SiakadError};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "siakad.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SiakadConfig {
    /// Directory holding `db/` and `session.json`.
    #[config(env = "SIAKAD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(env = "SIAKAD_LOG_LEVEL", default = "warn")]
    pub log_level: String,

    /// Remember the credential on login unless told otherwise.
    #[config(default = false)]
    pub remember_me: bool,
}

impl Default for SiakadConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "warn".to_string(),
            remember_me: false,
        }
    }
}

impl SiakadConfig {
    /// Loads from the environment, then `<config_dir>/siakad.toml` when a
    /// directory is given. A missing file is not an error.
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(dir) = config_dir {
            builder = builder.file(dir.join(CONFIG_FILE));
        }
        builder
            .load()
            .map_err(|e| SiakadError::Config(e.to_string()))
    }

    /// `data_dir`, or `fallback` when unset.
    pub fn data_dir_or(&self, fallback: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SiakadConfig::default();
        assert_eq!(config.log_level, "warn");
        assert!(!config.remember_me);
        assert_eq!(
            config.data_dir_or(Path::new("/tmp/siakad")),
            PathBuf::from("/tmp/siakad")
        );
    }

    #[test]
    fn test_file_values_are_read() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "log_level = \"debug\"\nremember_me = true\n",
        )
        .unwrap();

        let config = SiakadConfig::load(Some(dir.path())).unwrap();
        assert!(config.remember_me);
        if std::env::var_os("SIAKAD_LOG_LEVEL").is_none() {
            assert_eq!(config.log_level, "debug");
        }
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "remember_me = \"sometimes\"").unwrap();
        assert!(matches!(
            SiakadConfig::load(Some(dir.path())),
            Err(SiakadError::Config(_))
        ));
    }
}
