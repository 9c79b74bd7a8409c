use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encodings the content store knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Json,
    Csv,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Json, ContentType::Csv];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Csv => "csv",
        }
    }

    /// Detects the content type from an uploaded filename's extension.
    /// Matching is case-insensitive; a name without an extension yields `Err`
    /// carrying the empty string.
    pub fn from_filename(filename: &str) -> std::result::Result<Self, String> {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        ext.parse().map_err(|_| ext)
    }
}

impl FromStr for ContentType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(ContentType::Json),
            "csv" => Ok(ContentType::Csv),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of tables in the metadata store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    FileMetadata,
    Tag,
    FileTags,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::FileMetadata,
        EntityKind::Tag,
        EntityKind::FileTags,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::FileMetadata => "file_metadata",
            EntityKind::Tag => "tag",
            EntityKind::FileTags => "file_tags",
        }
    }
}

/// One entry in the logical tree.
///
/// `content_type` is kept as the raw stored string: records may carry types
/// the content store cannot decode, and those only fail when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[serde(rename = "data_file_type")]
    pub content_type: String,
    #[serde(rename = "data_file_path")]
    pub content_ref: String,
    /// Tag names, in association order.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A record to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFileRecord {
    pub name: String,
    pub path: String,
    #[serde(rename = "data_file_type")]
    pub content_type: String,
    #[serde(rename = "data_file_path")]
    pub content_ref: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewFileRecord {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        content_type: impl Into<String>,
        content_ref: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_type: content_type.into(),
            content_ref: content_ref.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&FileRecord> for NewFileRecord {
    fn from(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            path: record.path.clone(),
            content_type: record.content_type.clone(),
            content_ref: record.content_ref.clone(),
            tags: record.tags.clone(),
        }
    }
}

/// Partial field set for an in-place update. `None` leaves the field as is;
/// `Some(tags)` replaces the tag set wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "data_file_type")]
    pub content_type: Option<String>,
    #[serde(default, rename = "data_file_path")]
    pub content_ref: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl FileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.content_type.is_none()
            && self.content_ref.is_none()
            && self.tags.is_none()
    }
}

/// Seed/snapshot format for the metadata store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default, alias = "file_metadata")]
    pub files: Vec<NewFileRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_filename_is_case_insensitive() {
        assert_eq!(ContentType::from_filename("data.CSV"), Ok(ContentType::Csv));
        assert_eq!(ContentType::from_filename("a.b.json"), Ok(ContentType::Json));
    }

    #[test]
    fn content_type_from_filename_reports_bad_extension() {
        assert_eq!(ContentType::from_filename("notes.txt"), Err("txt".to_string()));
        assert_eq!(ContentType::from_filename("README"), Err(String::new()));
    }

    #[test]
    fn content_type_parse_is_exact() {
        assert_eq!("json".parse::<ContentType>(), Ok(ContentType::Json));
        assert!("JSON".parse::<ContentType>().is_err());
        assert!("fake-data-type".parse::<ContentType>().is_err());
    }

    #[test]
    fn entity_kinds_map_to_tables() {
        let names: Vec<_> = EntityKind::ALL.iter().map(|k| k.table_name()).collect();
        assert_eq!(names, vec!["file_metadata", "tag", "file_tags"]);
    }

    #[test]
    fn seed_uses_data_file_field_names() {
        let seed: SeedData = serde_json::from_str(
            r#"{"file_metadata": [{
                "name": "f", "path": "a/f",
                "data_file_type": "csv", "data_file_path": "0.csv"
            }]}"#,
        )
        .unwrap();
        assert_eq!(seed.files.len(), 1);
        assert_eq!(seed.files[0].content_ref, "0.csv");
        assert!(seed.files[0].tags.is_empty());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(FileUpdate::default().is_empty());
        let update = FileUpdate {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn record_and_update_share_wire_names() {
        let record = FileRecord {
            id: 1,
            name: "f".into(),
            path: "a/f".into(),
            content_type: "csv".into(),
            content_ref: "0.csv".into(),
            tags: vec![],
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["data_file_type"], "csv");
        assert_eq!(value["data_file_path"], "0.csv");
        assert!(value.get("content_type").is_none());

        let update: FileUpdate = serde_json::from_value(serde_json::json!({
            "data_file_type": value["data_file_type"],
            "data_file_path": value["data_file_path"],
        }))
        .unwrap();
        assert_eq!(update.content_type.as_deref(), Some("csv"));
        assert_eq!(update.content_ref.as_deref(), Some("0.csv"));
    }
}
