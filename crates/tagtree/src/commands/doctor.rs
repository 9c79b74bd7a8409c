use crate::error::Result;
use crate::store::{ContentStore, MetadataStore};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Read-only consistency report between the two stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorReport {
    /// `(path, content_ref)` for records whose data file is missing.
    pub missing_blobs: Vec<(String, String)>,
    /// Data files no record references.
    pub orphan_blobs: Vec<String>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.missing_blobs.is_empty() && self.orphan_blobs.is_empty()
    }
}

/// Report inconsistencies without repairing them. Stale records stay visible
/// so that `load` and `delete` keep reporting them.
pub fn run(store: &MetadataStore, content: &ContentStore) -> Result<DoctorReport> {
    debug!(control = "doctor");
    store.session(|s| {
        let records = s.list_all_file_records()?;
        let mut report = DoctorReport::default();
        let mut referenced = HashSet::new();

        for record in &records {
            referenced.insert(record.content_ref.as_str());
            if !matches!(content.exists(&record.content_ref), Ok(true)) {
                warn!(path = %record.path, content_ref = %record.content_ref, "data file missing");
                report
                    .missing_blobs
                    .push((record.path.clone(), record.content_ref.clone()));
            }
        }

        for content_ref in content.list_refs()? {
            if !referenced.contains(content_ref.as_str()) {
                warn!(content_ref = %content_ref, "orphan data file");
                report.orphan_blobs.push(content_ref);
            }
        }

        Ok(report)
    })
}
