//! # API Facade
//!
//! A thin layer over [`crate::commands`]. It is the single entry point for
//! callers, whether they hold typed requests or raw request maps.
//!
//! ## Two Surfaces
//!
//! - **Typed**: one method per operation ([`TreeApi::load`], [`TreeApi::copy`], ...)
//!   taking a request struct and returning `Result<T>`.
//! - **Payload**: [`TreeApi::control`] and [`TreeApi::upload_request`] take the
//!   client's JSON map, decode it once, dispatch, and fold the outcome into a
//!   [`Response`]: `{}` on success without payload, `{...}` on success with
//!   payload, `{"error": message}` otherwise. Errors never escape this surface.
//!
//! ## What the API Does NOT Do
//!
//! - **Consistency rules**: check order and mutation order live in `commands/*.rs`
//! - **Transport**: no HTTP, no multipart parsing
//! - **Subscriber setup**: events are emitted through `tracing`; the embedding
//!   process decides where they go
//!
//! ## Control Dispatch
//!
//! The payload surface reads the `control` field to pick an operation:
//!
//! | `control` | Request fields | Success payload |
//! |-----------|----------------|-----------------|
//! | `list` | none | `{"tree": ..., "tags": [...]}` |
//! | `load` | `path` | record fields plus `data` |
//! | `delete` | `path` | `{}` |
//! | `move` | `source`, `dest` | `{}` |
//! | `copy` | `source`, `dest` | `{}` |
//! | `update` | `path`, any of `name`, `data_file_type`, `data_file_path`, `tags` | `{}` |
//!
//! Upload is separate because it carries raw bytes next to the form fields.

use crate::commands::{
    self, delete::Deleted, doctor::DoctorReport, load::LoadedFile, PathRequest, TransferRequest,
    UpdateRequest, UploadForm, UploadedFile,
};
use crate::config::TreeConfig;
use crate::error::{ErrorKind, Result, TreeError};
use crate::model::FileRecord;
use crate::store::{ContentStore, MetadataStore};
use crate::tree::TreeView;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

/// Operations reachable through [`TreeApi::control`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    List,
    Load,
    Delete,
    Move,
    Copy,
    Update,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::List,
        Control::Load,
        Control::Delete,
        Control::Move,
        Control::Copy,
        Control::Update,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Control::List => "list",
            Control::Load => "load",
            Control::Delete => "delete",
            Control::Move => "move",
            Control::Copy => "copy",
            Control::Update => "update",
        }
    }
}

impl FromStr for Control {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        Control::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TreeError::Validation(format!("Unsupported control: {}.", s)))
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a payload-surface call. Serializes to exactly one of `{}`,
/// the payload map, or `{"error": message}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Empty,
    Data(Map<String, Value>),
    Error(String),
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Response::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Response::Empty => Value::Object(Map::new()),
            Response::Data(map) => Value::Object(map.clone()),
            Response::Error(message) => {
                let mut map = Map::new();
                map.insert("error".to_string(), Value::String(message.clone()));
                Value::Object(map)
            }
        }
    }

    fn data<T: Serialize>(payload: &T) -> Result<Self> {
        match serde_json::to_value(payload)? {
            Value::Object(map) => Ok(Response::Data(map)),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                Ok(Response::Data(map))
            }
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<TreeError> for Response {
    fn from(err: TreeError) -> Self {
        Response::Error(err.to_string())
    }
}

/// The main API facade. Owns both stores.
pub struct TreeApi {
    store: MetadataStore,
    content: ContentStore,
}

impl TreeApi {
    pub fn new(store: MetadataStore, content: ContentStore) -> Self {
        Self { store, content }
    }

    /// Open the stores named by `config`. The database file's parent
    /// directory must already exist; see [`crate::admin::init`].
    pub fn open(config: &TreeConfig) -> Result<Self> {
        let store = MetadataStore::open(&config.db_path)?;
        Ok(Self::new(store, ContentStore::new(&config.data_file_dir)))
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn list(&self) -> Result<TreeView> {
        commands::list::run(&self.store)
    }

    pub fn load(&self, request: &PathRequest) -> Result<LoadedFile> {
        commands::load::run(&self.store, &self.content, request)
    }

    pub fn delete(&self, request: &PathRequest) -> Result<Deleted> {
        commands::delete::run(&self.store, &self.content, request)
    }

    pub fn move_file(&self, request: &TransferRequest) -> Result<FileRecord> {
        commands::move_file::run(&self.store, request)
    }

    pub fn copy(&self, request: &TransferRequest) -> Result<FileRecord> {
        commands::copy::run(&self.store, request)
    }

    pub fn update(&self, request: &UpdateRequest) -> Result<FileRecord> {
        commands::update::run(&self.store, request)
    }

    pub fn upload(&self, file: Option<&UploadedFile>, form: &UploadForm) -> Result<FileRecord> {
        commands::upload::run(&self.store, &self.content, file, form)
    }

    pub fn doctor(&self) -> Result<DoctorReport> {
        commands::doctor::run(&self.store, &self.content)
    }

    /// Decode `{"control": ..., ...}` and dispatch it.
    pub fn control(&self, payload: &Value) -> Response {
        let outcome = control_name(payload)
            .and_then(|name| name.parse::<Control>())
            .and_then(|control| self.dispatch(control, payload).map(|r| (control, r)));

        match outcome {
            Ok((control, response)) => {
                info!(%control, "request handled");
                response
            }
            Err(err) => rejected("control", err),
        }
    }

    /// Payload-surface upload: `form` carries the `path` field.
    pub fn upload_request(&self, file: Option<&UploadedFile>, form: &Value) -> Response {
        let outcome = decode::<UploadForm>(form).and_then(|form| self.upload(file, &form));
        match outcome {
            Ok(_) => Response::Empty,
            Err(err) => rejected("upload", err),
        }
    }

    fn dispatch(&self, control: Control, payload: &Value) -> Result<Response> {
        match control {
            Control::List => Response::data(&self.list()?),
            Control::Load => Response::data(&self.load(&decode(payload)?)?),
            Control::Delete => self.delete(&decode(payload)?).map(|_| Response::Empty),
            Control::Move => self.move_file(&decode(payload)?).map(|_| Response::Empty),
            Control::Copy => self.copy(&decode(payload)?).map(|_| Response::Empty),
            Control::Update => self.update(&decode(payload)?).map(|_| Response::Empty),
        }
    }
}

fn control_name(payload: &Value) -> Result<&str> {
    payload
        .get("control")
        .and_then(Value::as_str)
        .ok_or_else(|| TreeError::Validation("Control not found in request.".into()))
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    T::deserialize(payload)
        .map_err(|e| TreeError::Validation(format!("Malformed request: {}.", e)))
}

fn rejected(control: &str, err: TreeError) -> Response {
    if err.kind() == ErrorKind::Internal {
        error!(control, error = %err, "request failed");
    } else {
        warn!(control, error = %err, "request rejected");
    }
    Response::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;
    use serde_json::json;

    #[test]
    fn control_parses_known_names_only() {
        for control in Control::ALL {
            assert_eq!(control.as_str().parse::<Control>().unwrap(), control);
        }
        let err = "upload".parse::<Control>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported control: upload.");
        assert!("LIST".parse::<Control>().is_err());
    }

    #[test]
    fn response_shapes() {
        assert_eq!(Response::Empty.to_value(), json!({}));
        assert_eq!(
            Response::Error("boom".into()).to_value(),
            json!({"error": "boom"})
        );
        let data = Response::data(&json!({"a": 1})).unwrap();
        assert_eq!(serde_json::to_value(&data).unwrap(), json!({"a": 1}));
        let wrapped = Response::data(&json!([1, 2])).unwrap();
        assert_eq!(wrapped.to_value(), json!({"data": [1, 2]}));
    }

    #[test]
    fn control_list_returns_tree_and_tags() {
        let env = TestEnv::new();
        let response = env.api.control(&json!({"control": "list"}));
        let value = response.to_value();
        assert_eq!(value["tags"], json!(["tag-1", "tag-2"]));
        assert_eq!(value["tree"]["test-file-2"]["type"], "file");
        assert_eq!(value["tree"]["test-folder-1"]["type"], "folder");
        assert_eq!(
            value["tree"]["test-folder-1"]["children"]["test-file-1"]["full-path"],
            "test-folder-1/test-file-1"
        );
    }

    #[test]
    fn control_load_returns_record_and_data() {
        let env = TestEnv::new();
        let value = env
            .api
            .control(&json!({"control": "load", "path": "test-file-2"}))
            .to_value();
        assert_eq!(value["data"], json!({"column-1": "value-1"}));
        assert_eq!(value["path"], "test-file-2");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn mutations_return_empty_map() {
        let env = TestEnv::new();
        let api = &env.api;
        let copy = api.control(&json!({"control": "copy", "source": "test-file-2", "dest": "b"}));
        assert_eq!(copy, Response::Empty);
        let mv = api.control(&json!({"control": "move", "source": "b", "dest": "c/d"}));
        assert_eq!(mv, Response::Empty);
        let update = api.control(&json!({"control": "update", "path": "c/d", "name": "renamed"}));
        assert_eq!(update, Response::Empty);
        let delete = api.control(&json!({"control": "delete", "path": "c/d"}));
        assert_eq!(delete, Response::Empty);
    }

    #[test]
    fn errors_become_error_maps() {
        let env = TestEnv::new();
        let api = &env.api;
        assert_eq!(
            api.control(&json!({"path": "x"})).error_message(),
            Some("Control not found in request.")
        );
        assert_eq!(
            api.control(&json!({"control": "purge"})).error_message(),
            Some("Unsupported control: purge.")
        );
        assert_eq!(
            api.control(&json!({"control": "load"})).error_message(),
            Some("Path cannot be empty.")
        );
        assert_eq!(
            api.control(&json!({"control": "load", "path": "test-folder-2/test-file-4"}))
                .error_message(),
            Some("Unsupported data file type: fake-data-type.")
        );
        assert_eq!(
            api.control(&json!({"control": "move", "source": "test-file-2", "dest": "test-file-2"}))
                .error_message(),
            Some("Dest path test-file-2 already exists.")
        );
        let malformed = api.control(&json!({"control": "load", "path": 7}));
        assert!(malformed.error_message().unwrap().starts_with("Malformed request"));
    }

    #[test]
    fn upload_request_decodes_form() {
        let env = TestEnv::empty();
        let file = UploadedFile::new("a.json", "[1]");
        let response = env.api.upload_request(Some(&file), &json!({"path": "x/a"}));
        assert_eq!(response, Response::Empty);

        let again = env.api.upload_request(Some(&file), &json!({"path": "x/a"}));
        assert_eq!(again.error_message(), Some("Path x/a already exists."));

        let missing = env.api.upload_request(Some(&file), &json!({}));
        assert_eq!(missing.error_message(), Some("Path not found in request."));
    }

    #[test]
    fn null_required_fields_read_as_empty() {
        let env = TestEnv::new();
        let api = &env.api;
        assert_eq!(
            api.control(&json!({"control": "load", "path": null})).error_message(),
            Some("Path cannot be empty.")
        );
        assert_eq!(
            api.control(&json!({"control": "move", "source": null, "dest": "x"}))
                .error_message(),
            Some("Source path cannot be empty.")
        );
        assert_eq!(
            api.control(&json!({"control": "copy", "source": "test-file-2", "dest": null}))
                .error_message(),
            Some("Dest path cannot be empty.")
        );
        assert_eq!(
            api.control(&json!({"control": "update", "path": null, "name": "n"}))
                .error_message(),
            Some("Path cannot be empty.")
        );
    }
}
