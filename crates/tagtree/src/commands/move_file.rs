use super::helpers::require;
use super::TransferRequest;
use crate::error::{Result, TreeError};
use crate::model::FileRecord;
use crate::store::MetadataStore;
use tracing::{debug, info};

/// Re-address a record. The data file and `content_ref` are untouched.
pub fn run(store: &MetadataStore, request: &TransferRequest) -> Result<FileRecord> {
    let source = require(&request.source, "Source path cannot be empty.")?;
    let dest = require(&request.dest, "Dest path cannot be empty.")?;
    debug!(control = "move", source, dest);

    store.session(|s| {
        let mut record = s
            .find_by_path(source)?
            .ok_or_else(|| TreeError::record_not_found(source))?;
        if s.path_exists(dest)? {
            return Err(TreeError::Conflict(format!("Dest path {} already exists.", dest)));
        }

        s.set_path(&record, dest)?;
        record.path = dest.to_string();
        info!(source, dest, "moved file");
        Ok(record)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{load, PathRequest};
    use crate::error::ErrorKind;
    use crate::test_utils::TestEnv;

    fn mv(env: &TestEnv, source: &str, dest: &str) -> Result<FileRecord> {
        run(env.store(), &TransferRequest::new(source, dest))
    }

    fn load_at(env: &TestEnv, path: &str) -> Result<load::LoadedFile> {
        load::run(env.store(), env.content(), &PathRequest::new(path))
    }

    #[test]
    fn validation_order() {
        let env = TestEnv::new();
        assert_eq!(mv(&env, "", "").unwrap_err().to_string(), "Source path cannot be empty.");
        assert_eq!(
            mv(&env, "test-file-2", "").unwrap_err().to_string(),
            "Dest path cannot be empty."
        );
        assert_eq!(
            mv(&env, "nope", "test-file-2").unwrap_err().to_string(),
            "File metadata not found for path nope."
        );
        let err = mv(&env, "test-file-2", "test-folder-1/test-file-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "Dest path test-folder-1/test-file-1 already exists.");
    }

    #[test]
    fn moved_record_loads_the_same_payload() {
        let env = TestEnv::new();
        let before = load_at(&env, "test-file-2").unwrap();

        let moved = mv(&env, "test-file-2", "archive/2024/test-file-2").unwrap();
        assert_eq!(moved.id, before.record.id);
        assert_eq!(moved.content_ref, before.record.content_ref);

        let after = load_at(&env, "archive/2024/test-file-2").unwrap();
        assert_eq!(after.data, before.data);
        assert_eq!(after.record.tags, before.record.tags);

        let gone = load_at(&env, "test-file-2").unwrap_err();
        assert_eq!(gone.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn move_onto_itself_is_conflict() {
        let env = TestEnv::new();
        let err = mv(&env, "test-file-2", "test-file-2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn move_does_not_touch_data_files() {
        let env = TestEnv::new();
        let before = env.data_files();
        mv(&env, "test-folder-1/test-file-3", "elsewhere").unwrap();
        assert_eq!(env.data_files(), before);
    }
}
