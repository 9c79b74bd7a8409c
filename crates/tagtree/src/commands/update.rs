use super::helpers::require_path;
use super::UpdateRequest;
use crate::error::{Result, TreeError};
use crate::model::FileRecord;
use crate::store::MetadataStore;
use tracing::{debug, info};

/// Overwrite name, content type, content ref and/or tags in place. The path
/// is the address and is not changed here; use `move` for that.
pub fn run(store: &MetadataStore, request: &UpdateRequest) -> Result<FileRecord> {
    let path = require_path(&request.path)?;
    debug!(control = "update", path);

    store.session(|s| {
        let record = s
            .find_by_path(path)?
            .ok_or_else(|| TreeError::record_not_found(path))?;
        if request.fields.is_empty() {
            return Ok(record);
        }
        let updated = s.update_file_record(&record, &request.fields)?;
        info!(path, "updated file");
        Ok(updated)
    })
}
