use crate::error::Result;
use crate::store::MetadataStore;
use crate::tree::{build_tree, TreeView};
use tracing::debug;

/// Never fails on well-formed stores; an empty store yields an empty tree.
pub fn run(store: &MetadataStore) -> Result<TreeView> {
    debug!(control = "list");
    let (records, tags) =
        store.session(|s| Ok((s.list_all_file_records()?, s.list_all_tag_names()?)))?;
    Ok(build_tree(&records, &tags))
}
