use crate::api::TreeApi;
use crate::model::{NewFileRecord, SeedData};
use crate::store::{ContentStore, MetadataStore};
use std::path::PathBuf;
use tempfile::TempDir;

pub const BASELINE_CSV: &str = "column-1,column-2\nvalue-1,value-2\nvalue-3,value-4\n";
pub const BASELINE_JSON: &str = "{\"column-1\": \"value-1\"}\n";

/// Four records over two data files:
///
/// 1. `test-folder-1/test-file-1` → `test-file-1.csv`, tags `tag-1, tag-2`
/// 2. `test-file-2` → `data-folder-1/test-file-2.json`, tag `tag-1`
/// 3. `test-folder-1/test-file-3` → `fake-file.json` (data file missing)
/// 4. `test-folder-2/test-file-4` → `test-file-1.csv` typed `fake-data-type`
pub fn baseline_seed() -> SeedData {
    SeedData {
        files: vec![
            NewFileRecord::new("test-file-1", "test-folder-1/test-file-1", "csv", "test-file-1.csv")
                .with_tags(["tag-1", "tag-2"]),
            NewFileRecord::new(
                "test-file-2",
                "test-file-2",
                "json",
                "data-folder-1/test-file-2.json",
            )
            .with_tags(["tag-1"]),
            NewFileRecord::new(
                "test-file-3",
                "test-folder-1/test-file-3",
                "json",
                "fake-file.json",
            ),
            NewFileRecord::new(
                "test-file-4",
                "test-folder-2/test-file-4",
                "fake-data-type",
                "test-file-1.csv",
            ),
        ],
    }
}

pub struct TestEnv {
    // Keeps the directory alive for the duration of the test
    pub _temp_dir: TempDir,
    pub api: TreeApi,
    pub data_dir: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    /// Baseline records in an in-memory store plus the two real data files.
    pub fn new() -> Self {
        let env = Self::empty();
        env.api
            .store()
            .mass_add(&baseline_seed())
            .expect("failed to seed metadata");
        let content = env.api.content();
        content
            .save("test-file-1.csv", BASELINE_CSV.as_bytes())
            .expect("failed to write csv fixture");
        content
            .save("data-folder-1/test-file-2.json", BASELINE_JSON.as_bytes())
            .expect("failed to write json fixture");
        env
    }

    pub fn empty() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let data_dir = temp_dir.path().join("data");
        std::fs::create_dir_all(&data_dir).expect("failed to create data dir");
        let store = MetadataStore::open_in_memory().expect("failed to open metadata store");
        let api = TreeApi::new(store, ContentStore::new(&data_dir));
        Self {
            _temp_dir: temp_dir,
            api,
            data_dir,
        }
    }

    pub fn store(&self) -> &MetadataStore {
        self.api.store()
    }

    pub fn content(&self) -> &ContentStore {
        self.api.content()
    }

    pub fn data_files(&self) -> Vec<String> {
        self.api.content().list_refs().expect("failed to list data files")
    }
}
