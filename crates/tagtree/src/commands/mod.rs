//! # Command Layer
//!
//! The consistency rules live here. Each operation is its own submodule with a
//! `run` function taking the two stores and a typed request, and returning a
//! typed `Result`. Conversion into the `{}` / `{...}` / `{"error": ...}`
//! response map is the API facade's job, not the commands'.
//!
//! ## Ordering Rules
//!
//! Every operation runs inside one [`MetadataStore::session`](crate::store::MetadataStore::session)
//! and follows check-then-act: all "not found" and "already exists" checks
//! happen before the first mutation. There is no cross-store rollback. When a
//! data file and a record are both mutated, the data file goes first:
//!
//! - `upload`: save data file, then insert record
//! - `delete`: remove data file, then remove record
//!
//! A crash between the two leaves either an orphan data file (reported by
//! [`doctor`]) or a record whose data file is missing (reported by `load` and
//! `delete` as not found).
//!
//! ## Command Modules
//!
//! - [`list`]: Tree view plus tag vocabulary
//! - [`load`]: Record fields plus decoded data file
//! - [`upload`]: Store a new data file and its record
//! - [`delete`]: Remove a record and (if unshared) its data file
//! - [`move_file`]: Change a record's logical path
//! - [`copy`]: New record aliasing the source's data file
//! - [`update`]: In-place field overwrite
//! - [`doctor`]: Read-only consistency report
//! - [`helpers`]: Request field checks

use crate::model::FileUpdate;
use serde::{Deserialize, Deserializer};

pub mod copy;
pub mod delete;
pub mod doctor;
pub mod helpers;
pub mod list;
pub mod load;
pub mod move_file;
pub mod update;
pub mod upload;

/// Request addressing one record by logical path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub path: String,
}

impl PathRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Request for `move` and `copy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub source: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub dest: String,
}

impl TransferRequest {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,
    #[serde(flatten)]
    pub fields: FileUpdate,
}

/// Raw uploaded file. `filename` is only used for its extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            bytes: bytes.into(),
        }
    }
}

/// Form fields accompanying an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadForm {
    pub path: Option<String>,
}

/// Required string fields treat an explicit `null` like an absent field, so
/// both reach the emptiness check instead of failing to decode.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
