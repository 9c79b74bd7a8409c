use super::helpers::require_path;
use super::PathRequest;
use crate::error::{Result, TreeError};
use crate::model::FileRecord;
use crate::store::{ContentData, ContentStore, MetadataStore};
use serde::Serialize;
use tracing::debug;

/// Record fields with the decoded data file under `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedFile {
    #[serde(flatten)]
    pub record: FileRecord,
    pub data: ContentData,
}

pub fn run(
    store: &MetadataStore,
    content: &ContentStore,
    request: &PathRequest,
) -> Result<LoadedFile> {
    let path = require_path(&request.path)?;
    debug!(control = "load", path);

    let record = store.session(|s| s.find_by_path(path))?;
    let record = record.ok_or_else(|| TreeError::record_not_found(path))?;
    let data = content.load(&record.content_ref, &record.content_type)?;
    Ok(LoadedFile { record, data })
}
