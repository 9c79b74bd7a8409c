//! # Configuration
//!
//! Configuration is managed by [`confique`] and resolved once at startup, then
//! passed by reference into [`crate::api::TreeApi`] and [`crate::admin`].
//! Nothing in the library reads the process environment on its own.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `TAGTREE_DB_PATH`, `TAGTREE_DATA_DIR`
//! 2. **TOML file**: when a path is given to [`TreeConfig::load`]
//! 3. **Compiled defaults**
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `db_path` | `untracked/metadata.sqlite` | SQLite metadata database |
//! | `data_file_dir` | `untracked/data` | Directory holding data files |

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Path to the SQLite metadata database.
    #[config(env = "TAGTREE_DB_PATH", default = "untracked/metadata.sqlite")]
    pub db_path: PathBuf,

    /// Directory the data files live in.
    #[config(env = "TAGTREE_DATA_DIR", default = "untracked/data")]
    pub data_file_dir: PathBuf,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("untracked").join("metadata.sqlite"),
            data_file_dir: PathBuf::from("untracked").join("data"),
        }
    }
}

impl TreeConfig {
    pub fn new(db_path: impl Into<PathBuf>, data_file_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            data_file_dir: data_file_dir.into(),
        }
    }

    /// Layer environment variables over an optional TOML file over defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        Ok(builder.load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = TreeConfig::default();
        assert_eq!(config.db_path, PathBuf::from("untracked/metadata.sqlite"));
        assert_eq!(config.data_file_dir, PathBuf::from("untracked/data"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tagtree.toml");
        fs::write(
            &file,
            "db_path = \"/srv/meta.sqlite\"\ndata_file_dir = \"/srv/data\"\n",
        )
        .unwrap();

        let config = TreeConfig::load(Some(&file)).unwrap();
        // Env vars would win here; the test environment does not set them.
        if std::env::var_os("TAGTREE_DB_PATH").is_none() {
            assert_eq!(config.db_path, PathBuf::from("/srv/meta.sqlite"));
        }
        if std::env::var_os("TAGTREE_DATA_DIR").is_none() {
            assert_eq!(config.data_file_dir, PathBuf::from("/srv/data"));
        }
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TreeConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        if std::env::var_os("TAGTREE_DB_PATH").is_none() {
            assert_eq!(config.db_path, TreeConfig::default().db_path);
        }
    }
}
