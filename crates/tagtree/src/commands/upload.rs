use super::helpers::leaf_name;
use super::{UploadForm, UploadedFile};
use crate::error::{Result, TreeError};
use crate::model::{ContentType, FileRecord, NewFileRecord};
use crate::store::{ContentStore, MetadataStore};
use tracing::{debug, info};

/// Store an uploaded file under a freshly allocated ref and insert its record
/// (no tags) at the requested logical path.
///
/// Allocation, save and insert all happen while the metadata session holds
/// the store lock, so two uploads through the same store never allocate the
/// same ref.
pub fn run(
    store: &MetadataStore,
    content: &ContentStore,
    file: Option<&UploadedFile>,
    form: &UploadForm,
) -> Result<FileRecord> {
    let file = file.ok_or_else(|| TreeError::Validation("File not found in request.".into()))?;
    let filename = file
        .filename
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| TreeError::Validation("File has no filename.".into()))?;
    let content_type = ContentType::from_filename(filename)
        .map_err(|ext| TreeError::UnsupportedType(format!("File type {} not supported.", ext)))?;
    let path = form
        .path
        .as_deref()
        .filter(|path| !path.is_empty())
        .ok_or_else(|| TreeError::Validation("Path not found in request.".into()))?;
    debug!(control = "upload", filename, path, %content_type);

    store.session(|s| {
        if s.path_exists(path)? {
            return Err(TreeError::Conflict(format!("Path {} already exists.", path)));
        }

        let content_ref = content.allocate_ref(content_type.as_str())?;
        content.save(&content_ref, &file.bytes)?;

        let candidate =
            NewFileRecord::new(leaf_name(path), path, content_type.as_str(), &content_ref);
        let record = s.upsert_file_record(&candidate)?;
        info!(
            path,
            content_ref = %record.content_ref,
            bytes = file.bytes.len(),
            "uploaded file"
        );
        Ok(record)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{load, PathRequest};
    use crate::error::ErrorKind;
    use crate::store::ContentData;
    use crate::test_utils::TestEnv;

    fn form(path: &str) -> UploadForm {
        UploadForm {
            path: Some(path.to_string()),
        }
    }

    #[test]
    fn failure_cases_in_check_order() {
        let env = TestEnv::new();
        let (store, content) = (env.store(), env.content());

        let err = run(store, content, None, &UploadForm::default()).unwrap_err();
        assert_eq!(err.to_string(), "File not found in request.");

        let nameless = UploadedFile {
            filename: None,
            bytes: b"{}".to_vec(),
        };
        let err = run(store, content, Some(&nameless), &UploadForm::default()).unwrap_err();
        assert_eq!(err.to_string(), "File has no filename.");

        let empty_name = UploadedFile::new("", "{}");
        let err = run(store, content, Some(&empty_name), &form("x")).unwrap_err();
        assert_eq!(err.to_string(), "File has no filename.");

        let txt = UploadedFile::new("notes.txt", "hi");
        let err = run(store, content, Some(&txt), &UploadForm::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert_eq!(err.to_string(), "File type txt not supported.");

        let json = UploadedFile::new("doc.json", "{}");
        let err = run(store, content, Some(&json), &UploadForm::default()).unwrap_err();
        assert_eq!(err.to_string(), "Path not found in request.");

        let err = run(store, content, Some(&json), &form("test-file-2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "Path test-file-2 already exists.");

        assert_eq!(env.data_files().len(), 2);
    }

    #[test]
    fn upload_then_load_round_trips_csv() {
        let env = TestEnv::empty();
        let file = UploadedFile::new("People.CSV", "name,age\nada,36\n");
        let record = run(env.store(), env.content(), Some(&file), &form("people/all")).unwrap();
        assert_eq!(record.name, "all");
        assert_eq!(record.content_type, "csv");
        assert_eq!(record.content_ref, "0.csv");
        assert!(record.tags.is_empty());

        let loaded =
            load::run(env.store(), env.content(), &PathRequest::new("people/all")).unwrap();
        assert_eq!(
            loaded.data,
            ContentData::Csv(vec![
                vec!["name".into(), "age".into()],
                vec!["ada".into(), "36".into()],
            ])
        );
    }

    #[test]
    fn refs_are_allocated_sequentially_per_extension() {
        let env = TestEnv::empty();
        let (store, content) = (env.store(), env.content());
        let a = run(store, content, Some(&UploadedFile::new("a.json", "1")), &form("a")).unwrap();
        let b = run(store, content, Some(&UploadedFile::new("b.json", "2")), &form("b")).unwrap();
        let c = run(store, content, Some(&UploadedFile::new("c.csv", "x")), &form("c")).unwrap();
        assert_eq!(a.content_ref, "0.json");
        assert_eq!(b.content_ref, "1.json");
        assert_eq!(c.content_ref, "0.csv");
    }

    #[test]
    fn uploaded_bytes_are_stored_verbatim() {
        let env = TestEnv::empty();
        let body = "{\"k\": [1, 2, {\"n\": null}]}";
        let record = run(
            env.store(),
            env.content(),
            Some(&UploadedFile::new("doc.json", body)),
            &form("doc"),
        )
        .unwrap();
        let on_disk = std::fs::read_to_string(env.content().path_for(&record.content_ref).unwrap())
            .unwrap();
        assert_eq!(on_disk, body);
    }
}
