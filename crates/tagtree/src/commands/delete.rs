use super::helpers::require_path;
use super::PathRequest;
use crate::error::{Result, TreeError};
use crate::store::{ContentStore, MetadataStore};
use tracing::{debug, info};

/// Outcome of a delete. `data_file_removed` is false when another record
/// still references the same data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub path: String,
    pub content_ref: String,
    pub data_file_removed: bool,
}

/// Remove the record at `request.path`.
///
/// The data file must exist, or nothing is changed. It is removed first, and
/// only when this record is its last user; copies made with
/// [`copy`](super::copy) keep working after the source is deleted.
pub fn run(
    store: &MetadataStore,
    content: &ContentStore,
    request: &PathRequest,
) -> Result<Deleted> {
    let path = require_path(&request.path)?;
    debug!(control = "delete", path);

    store.session(|s| {
        let record = s
            .find_by_path(path)?
            .ok_or_else(|| TreeError::record_not_found(path))?;
        if !content.exists(&record.content_ref)? {
            return Err(TreeError::data_file_not_found(&record.content_ref));
        }

        let shared = s.count_content_ref_users(&record.content_ref)? > 1;
        if !shared {
            content.delete(&record.content_ref)?;
        }
        s.delete_file_record(&record)?;

        info!(path, content_ref = %record.content_ref, shared, "deleted file");
        Ok(Deleted {
            path: record.path,
            content_ref: record.content_ref,
            data_file_removed: !shared,
        })
    })
}
