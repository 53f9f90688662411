//! Locating masks inside an arbitrary JSON tree.

use serde_json::Value;

use crate::descriptor::MASK_KEY;
use crate::pointer;

/// Collect the JSON Pointer of every mask in `root`.
///
/// Depth-first pre-order. A mask is a leaf: the walk never descends into
/// one, so no returned path is a prefix of another. Non-objects (including
/// arrays) contribute nothing. A mask at the root yields the empty
/// pointer.
pub fn find_all_mask_paths(root: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect(root, String::new(), &mut paths);
    paths
}

fn collect(value: &Value, path: String, out: &mut Vec<String>) {
    let Some(map) = value.as_object() else {
        return;
    };
    if map.contains_key(MASK_KEY) {
        out.push(path);
        return;
    }
    for (key, child) in map {
        collect(child, pointer::join(&path, key), out);
    }
}
