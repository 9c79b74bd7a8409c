//! # Storage Layer
//!
//! Two independent stores back every logical file:
//!
//! 1. **Metadata** ([`metadata::MetadataStore`]): SQLite tables for file
//!    records, tags and the `file_tags` association.
//! 2. **Content** ([`content::ContentStore`]): the data files themselves,
//!    one per `content_ref`, under a configured directory.
//!
//! There is no transaction spanning both. The command layer orders its steps
//! so that every check happens before any mutation, and a record whose data
//! file has vanished is reported (not repaired) the next time it is touched.
//!
//! ## Storage Layout
//!
//! ```text
//! untracked/
//! ├── metadata.sqlite     # file_metadata, tag, file_tags
//! └── data/
//!     ├── 0.csv           # allocated sequentially per extension
//!     ├── 1.json
//!     └── ...
//! ```

pub mod content;
pub mod metadata;
pub mod schema;

pub use content::{ContentData, ContentStore};
pub use metadata::{MetadataStore, Session};
