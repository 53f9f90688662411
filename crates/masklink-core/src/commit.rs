//! The salted hash commitment a mask carries.

use masklink_signatures::{base64url_encode, hash_json, HashInfo};
use serde_json::{json, Value};

use crate::error::MaskError;

/// Nonce entropy: 256 bits.
pub const NONCE_BYTES: usize = 32;

/// Commit to `original` under `nonce`.
///
/// The commitment hashes the two-key wrapper
/// `{"original": original, "nonce": nonce}`; producer and verifier must
/// both use exactly this shape.
pub fn commit(original: &Value, nonce: &str) -> Result<HashInfo, MaskError> {
    let wrapper = json!({ "original": original, "nonce": nonce });
    Ok(hash_json(&wrapper)?)
}

/// Generate a fresh base64url-encoded 256-bit nonce.
pub fn generate_nonce() -> Result<String, MaskError> {
    let mut bytes = [0u8; NONCE_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| MaskError::RngFailed(e.to_string()))?;
    Ok(base64url_encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_is_deterministic() {
        let original = json!({"location": {"here": "here"}});
        assert_eq!(
            commit(&original, "abcdefg").unwrap(),
            commit(&original, "abcdefg").unwrap()
        );
    }

    #[test]
    fn commitment_binds_original_and_nonce() {
        let original = json!({"here": "here"});
        let base = commit(&original, "abcdefg").unwrap();
        assert_ne!(base, commit(&original, "hijklmn").unwrap());
        assert_ne!(base, commit(&json!({"here": "there"}), "abcdefg").unwrap());
    }

    #[test]
    fn commitment_uses_the_named_key_wrapper() {
        let original = json!({"x": 1});
        let expected = hash_json(&json!({"original": {"x": 1}, "nonce": "n"})).unwrap();
        assert_eq!(commit(&original, "n").unwrap(), expected);
    }

    #[test]
    fn nonces_are_unique_and_urlsafe() {
        let a = generate_nonce().unwrap();
        let b = generate_nonce().unwrap();
        assert_ne!(a, b);
        // 32 bytes -> 43 unpadded base64url chars
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
