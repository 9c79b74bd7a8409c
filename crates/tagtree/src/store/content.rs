//! Content Store: data files addressed by generated filename under one root.
//!
//! A `content_ref` is a path relative to the root (usually a bare filename
//! such as `4.csv`, but seeded records may point into subdirectories).

use crate::error::{Result, TreeError};
use crate::model::ContentType;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Decoded data file.
///
/// Serializes untagged: a JSON document as itself, a CSV table as an array of
/// string rows (header row included, no type inference).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContentData {
    Json(serde_json::Value),
    Csv(Vec<Vec<String>>),
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `content_ref` under the root. Refs that would resolve
    /// outside the root are rejected.
    pub fn path_for(&self, content_ref: &str) -> Result<PathBuf> {
        validate_ref(content_ref)?;
        Ok(self.root.join(content_ref))
    }

    pub fn exists(&self, content_ref: &str) -> Result<bool> {
        Ok(self.path_for(content_ref)?.is_file())
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    /// Read and decode a data file.
    ///
    /// Existence is checked before the declared type, so a missing file is
    /// reported as such even when its type is also unsupported.
    pub fn load(&self, content_ref: &str, declared_type: &str) -> Result<ContentData> {
        let path = self.path_for(content_ref)?;
        if !path.is_file() {
            return Err(TreeError::data_file_not_found(content_ref));
        }
        let content_type: ContentType = declared_type.parse().map_err(|_| {
            TreeError::UnsupportedType(format!("Unsupported data file type: {}.", declared_type))
        })?;

        debug!(content_ref, %content_type, "loading data file");
        match content_type {
            ContentType::Json => {
                let raw = fs::read_to_string(&path)?;
                Ok(ContentData::Json(serde_json::from_str(&raw)?))
            }
            ContentType::Csv => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_path(&path)?;
                let rows = reader
                    .records()
                    .map(|row| row.map(|r| r.iter().map(str::to_string).collect()))
                    .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
                Ok(ContentData::Csv(rows))
            }
        }
    }

    /// Next sequential ref for `extension`: one past the largest integer stem
    /// among `<n>.<extension>` files in the root, or `0.<extension>`.
    ///
    /// Recomputed from the directory on every call. Callers serialise
    /// allocation through the metadata store session lock. A stem of
    /// `u64::MAX` leaves no successor and is reported as a conflict rather
    /// than wrapping onto an existing file.
    pub fn allocate_ref(&self, extension: &str) -> Result<String> {
        let suffix = format!(".{}", extension);
        let mut next: u64 = 0;

        if self.root.is_dir() {
            for entry in fs::read_dir(&self.root)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let name = entry.file_name();
                let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(&suffix)) else {
                    continue;
                };
                if let Ok(n) = stem.parse::<u64>() {
                    let after = n.checked_add(1).ok_or_else(|| {
                        TreeError::Conflict(format!(
                            "No data file name left after {}.",
                            name.to_string_lossy()
                        ))
                    })?;
                    next = next.max(after);
                }
            }
        }

        Ok(format!("{}.{}", next, extension))
    }

    /// Write bytes atomically (tmp file then rename).
    pub fn save(&self, content_ref: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_root()?;
        let target = self.path_for(content_ref)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.root.join(format!(".blob-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &target)?;
        debug!(content_ref, bytes = bytes.len(), "saved data file");
        Ok(())
    }

    pub fn delete(&self, content_ref: &str) -> Result<()> {
        let path = self.path_for(content_ref)?;
        if !path.is_file() {
            return Err(TreeError::data_file_not_found(content_ref));
        }
        fs::remove_file(path)?;
        debug!(content_ref, "deleted data file");
        Ok(())
    }

    /// Every data file under the root, as refs relative to it, sorted.
    /// Temporary files from interrupted saves are skipped.
    pub fn list_refs(&self) -> Result<Vec<String>> {
        let mut refs = Vec::new();
        if self.root.is_dir() {
            collect_refs(&self.root, &self.root, &mut refs)?;
        }
        refs.sort();
        Ok(refs)
    }
}

/// A ref must be a non-empty relative path made only of normal components.
pub fn validate_ref(content_ref: &str) -> Result<()> {
    let path = Path::new(content_ref);
    let contained = !content_ref.is_empty()
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if !contained {
        return Err(TreeError::Validation(format!(
            "Invalid data file path {}.",
            content_ref
        )));
    }
    Ok(())
}

fn collect_refs(root: &Path, dir: &Path, refs: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_refs(root, &path, refs)?;
        } else if file_type.is_file() {
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(".tmp") {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(root) {
                let parts: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                refs.push(parts.join("/"));
            }
        }
    }
    Ok(())
}
