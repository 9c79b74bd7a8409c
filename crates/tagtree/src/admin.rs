//! Whole-store administration: create, destroy and export the metadata
//! database together with its data directory.
//!
//! These operate on a [`TreeConfig`] rather than an open [`TreeApi`] because
//! they create or remove the things a `TreeApi` would hold open.

use crate::api::TreeApi;
use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::model::{NewFileRecord, SeedData};
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Create the database (with schema) and data directory, then insert `seed`.
pub fn init(config: &TreeConfig, seed: Option<&SeedData>) -> Result<TreeApi> {
    if let Some(parent) = config.db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(&config.data_file_dir)?;

    let api = TreeApi::open(config)?;
    let seeded = match seed {
        Some(seed) => api.store().mass_add(seed)?,
        None => 0,
    };
    info!(
        db = %config.db_path.display(),
        data_dir = %config.data_file_dir.display(),
        seeded,
        "initialized"
    );
    Ok(api)
}

/// Remove the database file and data directory. Missing ones are skipped.
pub fn destroy(config: &TreeConfig) -> Result<()> {
    if config.db_path.is_file() {
        fs::remove_file(&config.db_path)?;
    }
    if config.data_file_dir.is_dir() {
        fs::remove_dir_all(&config.data_file_dir)?;
    }
    info!(
        db = %config.db_path.display(),
        data_dir = %config.data_file_dir.display(),
        "destroyed"
    );
    Ok(())
}

/// Parse a seed file in the baseline JSON shape.
pub fn read_seed(path: &Path) -> Result<SeedData> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write `tagtree-<timestamp>.tar.gz` into `target_dir` and return its path.
///
/// The archive holds `metadata.json` (a [`SeedData`] snapshot, loadable by
/// [`init`]) and every data file under `data/`. A store that was never
/// initialised is reported as not found.
pub fn export(config: &TreeConfig, target_dir: &Path) -> Result<PathBuf> {
    if !config.db_path.is_file() {
        return Err(TreeError::NotFound(format!(
            "Metadata database not found at {}.",
            config.db_path.display()
        )));
    }
    let api = TreeApi::open(config)?;
    let snapshot = SeedData {
        files: api
            .store()
            .list_all_file_records()?
            .iter()
            .map(NewFileRecord::from)
            .collect(),
    };

    fs::create_dir_all(target_dir)?;
    let now = Utc::now();
    let archive = target_dir.join(format!(
        "tagtree-{}.tar.gz",
        now.format("%Y-%m-%d_%H-%M-%S")
    ));
    let file = File::create(&archive)?;
    let entries = write_archive(file, &snapshot, &api)?;

    info!(archive = %archive.display(), records = snapshot.files.len(), entries, "exported");
    Ok(archive)
}

fn write_archive<W: Write>(writer: W, snapshot: &SeedData, api: &TreeApi) -> Result<usize> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    let metadata = serde_json::to_vec_pretty(snapshot)?;
    append(&mut tar, "metadata.json", &metadata)?;
    let mut entries = 1;

    for content_ref in api.content().list_refs()? {
        let bytes = fs::read(api.content().path_for(&content_ref)?)?;
        append(&mut tar, &format!("data/{}", content_ref), &bytes)?;
        entries += 1;
    }

    tar.into_inner()?.finish()?;
    Ok(entries)
}

fn append<W: Write>(tar: &mut tar::Builder<W>, name: &str, bytes: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    tar.append_data(&mut header, name, bytes)?;
    Ok(())
}
