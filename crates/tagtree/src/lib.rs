//! # tagtree
//!
//! A tagged logical file tree. Logical files live at slash-separated paths
//! and carry tags; their contents are JSON or CSV data files on disk.
//!
//! ## Architecture
//!
//! ```text
//! api (TreeApi, Response)         payload decode, dispatch, error folding
//!   └── commands/*                consistency rules, one module per operation
//!         ├── store::metadata     SQLite: file records, tags, associations
//!         ├── store::content      data-file directory: load, save, allocate refs
//!         └── tree                flat paths -> nested folder/file view
//! admin                           init / destroy / export whole stores
//! config                          TreeConfig (confique)
//! ```
//!
//! The metadata store is authoritative for what logical files exist; the
//! content store only holds bytes. The two are kept consistent by the command
//! layer's check-then-act ordering, and [`commands::doctor`] reports any drift.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tagtree::{admin, config::TreeConfig};
//! use serde_json::json;
//!
//! let config = TreeConfig::load(None)?;
//! let api = admin::init(&config, None)?;
//! let response = api.control(&json!({"control": "list"}));
//! println!("{}", response.to_value());
//! # Ok::<(), tagtree::error::TreeError>(())
//! ```

pub mod admin;
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod tree;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use api::{Response, TreeApi};
pub use error::{Result, TreeError};
