use super::helpers::require;
use super::TransferRequest;
use crate::error::{Result, TreeError};
use crate::model::{FileRecord, NewFileRecord};
use crate::store::MetadataStore;
use tracing::{debug, info};

/// New record at `dest` sharing the source's name, type, data file and tags.
/// The data file is aliased, not duplicated.
pub fn run(store: &MetadataStore, request: &TransferRequest) -> Result<FileRecord> {
    let source = require(&request.source, "Source path cannot be empty.")?;
    let dest = require(&request.dest, "Dest path cannot be empty.")?;
    debug!(control = "copy", source, dest);

    store.session(|s| {
        let source_record = s
            .find_by_path(source)?
            .ok_or_else(|| TreeError::record_not_found(source))?;
        if s.path_exists(dest)? {
            return Err(TreeError::Conflict(format!("Dest path {} already exists.", dest)));
        }

        let mut candidate = NewFileRecord::from(&source_record);
        candidate.path = dest.to_string();
        let copied = s.upsert_file_record(&candidate)?;
        info!(source, dest, content_ref = %copied.content_ref, "copied file");
        Ok(copied)
    })
}
