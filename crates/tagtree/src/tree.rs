//! Tree Builder: nested folder/file view from flat record paths.
//!
//! Every segment but the last becomes a folder keyed by segment name; the last
//! becomes a file. Folders and files share one child map per level, so a
//! folder and a file with the same name at the same level collide and the
//! later record wins.

use crate::model::FileRecord;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Folder {
        #[serde(rename = "full-path")]
        full_path: String,
        children: BTreeMap<String, Node>,
    },
    File {
        #[serde(rename = "full-path")]
        full_path: String,
        tags: Vec<String>,
    },
}

impl Node {
    pub fn full_path(&self) -> &str {
        match self {
            Node::Folder { full_path, .. } | Node::File { full_path, .. } => full_path,
        }
    }

    /// Children of this folder. A file is first replaced by an empty folder.
    fn folder_children(&mut self, full_path: &str) -> &mut BTreeMap<String, Node> {
        match self {
            Node::Folder { children, .. } => children,
            Node::File { .. } => {
                *self = empty_folder(full_path);
                self.folder_children(full_path)
            }
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Folder { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeView {
    pub tree: BTreeMap<String, Node>,
    pub tags: Vec<String>,
}

/// Build the nested view. `all_tags` is the full tag vocabulary from the
/// metadata store (not just tags in use); it comes back sorted and deduplicated.
pub fn build_tree(records: &[FileRecord], all_tags: &[String]) -> TreeView {
    let mut tree = BTreeMap::new();

    for record in records {
        let segments: Vec<&str> = record.path.split('/').collect();
        let Some((leaf, folders)) = segments.split_last() else {
            continue;
        };

        let mut level = &mut tree;
        let mut prefix = String::new();
        for folder in folders {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(folder);

            level = level
                .entry(folder.to_string())
                .or_insert_with(|| empty_folder(&prefix))
                .folder_children(&prefix);
        }

        level.insert(
            leaf.to_string(),
            Node::File {
                full_path: record.path.clone(),
                tags: record.tags.clone(),
            },
        );
    }

    let mut tags = all_tags.to_vec();
    tags.sort();
    tags.dedup();

    TreeView { tree, tags }
}

fn empty_folder(full_path: &str) -> Node {
    Node::Folder {
        full_path: full_path.to_string(),
        children: BTreeMap::new(),
    }
}
