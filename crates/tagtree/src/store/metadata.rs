//! Metadata Store: file records, tags and their association in SQLite.
//!
//! All access goes through [`MetadataStore::session`], which takes the
//! store-wide lock and opens one immediate transaction for the duration of
//! the closure. Commit happens when the closure returns `Ok`; any `Err` rolls
//! back. Check-then-act sequences inside one session therefore cannot
//! interleave with another caller's on the same store.
//!
//! Tags on a [`FileRecord`] are fetched eagerly with explicit association
//! queries; nothing is loaded lazily after the session ends.

use super::content::validate_ref;
use super::schema::SCHEMA;
use crate::error::{Result, TreeError};
use crate::model::{EntityKind, FileRecord, FileUpdate, NewFileRecord, SeedData, Tag};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

pub struct MetadataStore {
    conn: Mutex<Connection>,
}

impl MetadataStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` inside one locked transaction.
    ///
    /// Not reentrant: calling `session` again from inside `f` deadlocks.
    pub fn session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Session<'_>) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&Session { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }

    pub fn list_all_file_records(&self) -> Result<Vec<FileRecord>> {
        self.session(|s| s.list_all_file_records())
    }

    pub fn list_all_tag_names(&self) -> Result<Vec<String>> {
        self.session(|s| s.list_all_tag_names())
    }

    pub fn counts_by_table(&self) -> Result<BTreeMap<EntityKind, usize>> {
        self.session(|s| s.counts_by_table())
    }

    pub fn mass_add(&self, seed: &SeedData) -> Result<usize> {
        self.session(|s| s.mass_add(seed))
    }
}

/// Handle to one open transaction. Obtained from [`MetadataStore::session`].
pub struct Session<'a> {
    conn: &'a Connection,
}

const RECORD_COLUMNS: &str = "id, name, path, content_type, content_ref";

struct RecordRow {
    id: i64,
    name: String,
    path: String,
    content_type: String,
    content_ref: String,
}

impl RecordRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            path: row.get(2)?,
            content_type: row.get(3)?,
            content_ref: row.get(4)?,
        })
    }

    fn with_tags(self, tags: Vec<String>) -> FileRecord {
        FileRecord {
            id: self.id,
            name: self.name,
            path: self.path,
            content_type: self.content_type,
            content_ref: self.content_ref,
            tags,
        }
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Session<'_> {
    pub fn find_by_path(&self, path: &str) -> Result<Option<FileRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM file_metadata WHERE path = ?1", RECORD_COLUMNS),
                params![path],
                RecordRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => {
                let tags = self.tag_names_for(row.id)?;
                Ok(Some(row.with_tags(tags)))
            }
            None => Ok(None),
        }
    }

    pub fn path_exists(&self, path: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM file_metadata WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name FROM tag WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    fn tag_names_for(&self, file_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name FROM file_tags ft JOIN tag t ON t.id = ft.tag_id
             WHERE ft.file_id = ?1 ORDER BY ft.rowid",
        )?;
        let names = stmt
            .query_map(params![file_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Existing tag with this exact name, or a newly created one.
    pub fn upsert_tag(&self, name: &str) -> Result<Tag> {
        if let Some(tag) = self.find_tag_by_name(name)? {
            return Ok(tag);
        }
        self.conn
            .execute("INSERT INTO tag (name) VALUES (?1)", params![name])?;
        let tag = Tag {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        };
        debug!(tag = %tag.name, id = tag.id, "created tag");
        Ok(tag)
    }

    fn attach_tags(&self, file_id: i64, names: &[String]) -> Result<()> {
        for name in names {
            let tag = self.upsert_tag(name)?;
            self.conn.execute(
                "INSERT OR IGNORE INTO file_tags (file_id, tag_id) VALUES (?1, ?2)",
                params![file_id, tag.id],
            )?;
        }
        Ok(())
    }

    /// Return the record at `candidate.path` unchanged if there is one;
    /// otherwise insert the candidate with its tags.
    pub fn upsert_file_record(&self, candidate: &NewFileRecord) -> Result<FileRecord> {
        if let Some(existing) = self.find_by_path(&candidate.path)? {
            return Ok(existing);
        }
        validate_ref(&candidate.content_ref)?;

        self.conn
            .execute(
                "INSERT INTO file_metadata (name, path, content_type, content_ref)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    candidate.name,
                    candidate.path,
                    candidate.content_type,
                    candidate.content_ref
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    TreeError::Conflict(format!("Path {} already exists.", candidate.path))
                } else {
                    e.into()
                }
            })?;
        let id = self.conn.last_insert_rowid();
        self.attach_tags(id, &candidate.tags)?;
        debug!(path = %candidate.path, id, "inserted file record");

        let tags = self.tag_names_for(id)?;
        Ok(FileRecord {
            id,
            name: candidate.name.clone(),
            path: candidate.path.clone(),
            content_type: candidate.content_type.clone(),
            content_ref: candidate.content_ref.clone(),
            tags,
        })
    }

    pub fn set_path(&self, record: &FileRecord, new_path: &str) -> Result<()> {
        self.conn
            .execute(
                "UPDATE file_metadata SET path = ?1 WHERE id = ?2",
                params![new_path, record.id],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    TreeError::Conflict(format!("Dest path {} already exists.", new_path))
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    /// Overwrite the given fields in place. A tag list replaces the current
    /// associations wholesale; tag rows themselves are never removed.
    pub fn update_file_record(
        &self,
        record: &FileRecord,
        update: &FileUpdate,
    ) -> Result<FileRecord> {
        if let Some(content_ref) = &update.content_ref {
            validate_ref(content_ref)?;
        }
        let name = update.name.as_ref().unwrap_or(&record.name);
        let content_type = update.content_type.as_ref().unwrap_or(&record.content_type);
        let content_ref = update.content_ref.as_ref().unwrap_or(&record.content_ref);

        self.conn.execute(
            "UPDATE file_metadata SET name = ?1, content_type = ?2, content_ref = ?3 WHERE id = ?4",
            params![name, content_type, content_ref, record.id],
        )?;

        if let Some(tags) = &update.tags {
            self.conn
                .execute("DELETE FROM file_tags WHERE file_id = ?1", params![record.id])?;
            self.attach_tags(record.id, tags)?;
        }

        Ok(FileRecord {
            id: record.id,
            name: name.clone(),
            path: record.path.clone(),
            content_type: content_type.clone(),
            content_ref: content_ref.clone(),
            tags: self.tag_names_for(record.id)?,
        })
    }

    /// Remove the record and its associations. Tag rows are left alone.
    pub fn delete_file_record(&self, record: &FileRecord) -> Result<()> {
        self.conn
            .execute("DELETE FROM file_tags WHERE file_id = ?1", params![record.id])?;
        self.conn
            .execute("DELETE FROM file_metadata WHERE id = ?1", params![record.id])?;
        Ok(())
    }

    /// Number of records pointing at `content_ref`.
    pub fn count_content_ref_users(&self, content_ref: &str) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM file_metadata WHERE content_ref = ?1",
            params![content_ref],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// All records in id order, tags included.
    pub fn list_all_file_records(&self) -> Result<Vec<FileRecord>> {
        let mut tags_by_file: HashMap<i64, Vec<String>> = HashMap::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT ft.file_id, t.name FROM file_tags ft JOIN tag t ON t.id = ft.tag_id
                 ORDER BY ft.rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (file_id, name) = row?;
                tags_by_file.entry(file_id).or_default().push(name);
            }
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM file_metadata ORDER BY id",
            RECORD_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], RecordRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tags_by_file.remove(&row.id).unwrap_or_default();
                row.with_tags(tags)
            })
            .collect())
    }

    /// Every tag name, in creation order.
    pub fn list_all_tag_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM tag ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn counts_by_table(&self) -> Result<BTreeMap<EntityKind, usize>> {
        let mut counts = BTreeMap::new();
        for kind in EntityKind::ALL {
            let n: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", kind.table_name()),
                [],
                |row| row.get(0),
            )?;
            counts.insert(kind, n as usize);
        }
        Ok(counts)
    }

    /// Upsert every seed record; returns how many were newly inserted.
    pub fn mass_add(&self, seed: &SeedData) -> Result<usize> {
        let mut inserted = 0;
        for candidate in &seed.files {
            if self.path_exists(&candidate.path)? {
                continue;
            }
            self.upsert_file_record(candidate)?;
            inserted += 1;
        }
        Ok(inserted)
    }
}
