//! RFC 6901 JSON Pointer helpers.
//!
//! Mask paths are pointers into a resource; `/` inside a key is encoded
//! as `~1` and `~` as `~0`. The empty pointer addresses the root.

use serde_json::Value;

/// Escape one reference token for embedding in a pointer.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Undo [`escape_token`]. Order matters: `~1` first, then `~0`.
pub fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Split a pointer into unescaped reference tokens. `""` is the root.
pub fn split(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .split('/')
        .skip(1)
        .map(unescape_token)
        .collect()
}

/// Extend `parent` with one more (unescaped) token.
pub fn join(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, escape_token(token))
}

/// Resolve a pointer against a value.
pub fn resolve<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut current = root;
    for token in split(pointer) {
        current = match current {
            Value::Object(map) => map.get(&token)?,
            Value::Array(items) => items.get(array_index(&token)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replace the value at a pointer. Returns false when the path does not
/// exist; the empty pointer replaces the root.
pub fn set_at(root: &mut Value, pointer: &str, value: Value) -> bool {
    let tokens = split(pointer);
    let Some((last, parents)) = tokens.split_last() else {
        *root = value;
        return true;
    };

    let mut current = root;
    for token in parents {
        current = match current {
            Value::Object(map) => match map.get_mut(token) {
                Some(child) => child,
                None => return false,
            },
            Value::Array(items) => {
                match array_index(token).and_then(|i| items.get_mut(i)) {
                    Some(child) => child,
                    None => return false,
                }
            }
            _ => return false,
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            true
        }
        Value::Array(items) => match array_index(last).filter(|&i| i < items.len()) {
            Some(i) => {
                items[i] = value;
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn array_index(token: &str) -> Option<usize> {
    // RFC 6901 forbids leading zeros
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}
