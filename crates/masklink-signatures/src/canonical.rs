//! Canonical JSON serialization and hashing.
//!
//! The canonical form has sorted object keys and no whitespace, so the
//! same logical document always hashes to the same digest regardless of
//! key ordering on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::SignatureError;

/// Algorithm label carried alongside every digest.
pub const HASH_ALG: &str = "SHA256";

/// A digest of a JSON value's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashInfo {
    pub alg: String,
    /// Lowercase hex encoding of the digest bytes.
    pub hash: String,
}

/// Serialize a JSON value canonically: sorted keys, no whitespace.
///
/// Numbers must be finite; JSON has no representation for NaN/Infinity.
pub fn canonical_json(value: &Value) -> Result<String, SignatureError> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), SignatureError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => {
            if !n.as_f64().is_some_and(f64::is_finite) {
                return Err(SignatureError::NonFiniteNumber);
            }
            out.push_str(&n.to_string());
        }
        Value::String(s) => out.push_str(&serde_json::to_string(s)?),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(&map[key], out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Hash a JSON value's canonical form with SHA-256.
pub fn hash_json(value: &Value) -> Result<HashInfo, SignatureError> {
    let canonical = canonical_json(value)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(HashInfo {
        alg: HASH_ALG.to_string(),
        hash: hex_encode(&digest),
    })
}

pub(crate) fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_at_every_level() {
        let a = canonical_json(&json!({"z": 1, "a": {"d": 2, "c": 3}})).unwrap();
        let b = canonical_json(&json!({"a": {"c": 3, "d": 2}, "z": 1})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, r#"{"a":{"c":3,"d":2},"z":1}"#);
    }

    #[test]
    fn preserves_array_order() {
        assert_eq!(canonical_json(&json!([3, 1, 2])).unwrap(), "[3,1,2]");
    }

    #[test]
    fn scalars() {
        assert_eq!(canonical_json(&Value::Null).unwrap(), "null");
        assert_eq!(canonical_json(&json!(false)).unwrap(), "false");
        assert_eq!(canonical_json(&json!(42)).unwrap(), "42");
        assert_eq!(canonical_json(&json!("hi")).unwrap(), r#""hi""#);
    }

    #[test]
    fn escapes_strings() {
        assert_eq!(
            canonical_json(&json!("a\"b\\c")).unwrap(),
            r#""a\"b\\c""#
        );
    }

    #[test]
    fn hash_is_key_order_independent() {
        let h1 = hash_json(&json!({"x": 1, "y": [true, null]})).unwrap();
        let h2 = hash_json(&json!({"y": [true, null], "x": 1})).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.alg, "SHA256");
        assert_eq!(h1.hash.len(), 64);
    }

    #[test]
    fn hash_differs_on_content() {
        let h1 = hash_json(&json!({"x": 1})).unwrap();
        let h2 = hash_json(&json!({"x": 2})).unwrap();
        assert_ne!(h1.hash, h2.hash);
    }
}
