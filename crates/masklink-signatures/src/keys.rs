//! P-256 JWK handling: import/export, generation, RFC 7638 thumbprints.

use p256::ecdsa::{SigningKey, VerifyingKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::base64url::{base64url_decode, base64url_encode};
use crate::error::SignatureError;

/// Generate a new P-256 signing key.
pub fn generate_signing_key() -> SigningKey {
    SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng)
}

/// Export a verifying key as a public JWK.
pub fn export_public_jwk(key: &VerifyingKey) -> Value {
    let point = key.to_encoded_point(false);
    json!({
        "kty": "EC",
        "crv": "P-256",
        "x": base64url_encode(point.x().unwrap().as_slice()),
        "y": base64url_encode(point.y().unwrap().as_slice()),
    })
}

/// Export a signing key as a private JWK (includes `d`).
pub fn export_private_jwk(key: &SigningKey) -> Value {
    let mut jwk = export_public_jwk(key.verifying_key());
    let mut scalar = key.to_bytes().to_vec();
    jwk["d"] = Value::String(base64url_encode(&scalar));
    zeroize::Zeroize::zeroize(&mut scalar);
    jwk
}

/// Import a public JWK as a P-256 verifying key.
pub fn import_public_jwk(jwk: &Value) -> Result<VerifyingKey, SignatureError> {
    let x = decode_coordinate(jwk, "x")?;
    let y = decode_coordinate(jwk, "y")?;

    // SEC1 uncompressed point: 0x04 || x || y, coordinates left-padded to 32
    let mut point = Vec::with_capacity(65);
    point.push(0x04);
    point.extend(std::iter::repeat_n(0u8, 32usize.saturating_sub(x.len())));
    point.extend_from_slice(&x);
    point.extend(std::iter::repeat_n(0u8, 32usize.saturating_sub(y.len())));
    point.extend_from_slice(&y);

    VerifyingKey::from_sec1_bytes(&point)
        .map_err(|e| SignatureError::InvalidJwk(format!("P-256 point: {}", e)))
}

/// Import a private JWK as a P-256 signing key.
pub fn import_private_jwk(jwk: &Value) -> Result<SigningKey, SignatureError> {
    let d = jwk
        .get("d")
        .and_then(Value::as_str)
        .ok_or(SignatureError::MissingJwkField("d"))?;
    let d_bytes =
        base64url_decode(d).map_err(|e| SignatureError::InvalidJwk(format!("d: {}", e)))?;
    if d_bytes.len() != 32 {
        return Err(SignatureError::InvalidJwk(format!(
            "d: expected 32 bytes, got {}",
            d_bytes.len()
        )));
    }
    SigningKey::from_bytes(d_bytes.as_slice().into())
        .map_err(|e| SignatureError::InvalidJwk(format!("P-256 scalar: {}", e)))
}

/// Derive the public JWK corresponding to a private JWK.
pub fn public_jwk_from_private(jwk: &Value) -> Result<Value, SignatureError> {
    let key = import_private_jwk(jwk)?;
    Ok(export_public_jwk(key.verifying_key()))
}

/// Compute the RFC 7638 thumbprint of an EC JWK.
///
/// The thumbprint input is `{"crv","kty","x","y"}` in lexicographic order;
/// the result is the base64url-encoded SHA-256 of that string.
pub fn jwk_thumbprint(jwk: &Value) -> Result<String, SignatureError> {
    let kty = jwk
        .get("kty")
        .and_then(Value::as_str)
        .ok_or(SignatureError::MissingJwkField("kty"))?;
    if kty != "EC" {
        return Err(SignatureError::UnsupportedKeyType(kty.to_string()));
    }
    let crv = jwk
        .get("crv")
        .and_then(Value::as_str)
        .ok_or(SignatureError::MissingJwkField("crv"))?;
    let x = jwk
        .get("x")
        .and_then(Value::as_str)
        .ok_or(SignatureError::MissingJwkField("x"))?;
    let y = jwk
        .get("y")
        .and_then(Value::as_str)
        .ok_or(SignatureError::MissingJwkField("y"))?;

    let input = format!(
        r#"{{"crv":"{}","kty":"{}","x":"{}","y":"{}"}}"#,
        crv, kty, x, y
    );
    Ok(base64url_encode(&Sha256::digest(input.as_bytes())))
}

fn decode_coordinate(jwk: &Value, field: &'static str) -> Result<Vec<u8>, SignatureError> {
    let b64 = jwk
        .get(field)
        .and_then(Value::as_str)
        .ok_or(SignatureError::MissingJwkField(field))?;
    let bytes = base64url_decode(b64)
        .map_err(|e| SignatureError::InvalidJwk(format!("{}: {}", field, e)))?;
    if bytes.is_empty() || bytes.len() > 32 {
        return Err(SignatureError::InvalidJwk(format!(
            "{}: coordinate out of range",
            field
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_import_public_round_trip() {
        let key = generate_signing_key();
        let jwk = export_public_jwk(key.verifying_key());
        let imported = import_public_jwk(&jwk).unwrap();
        assert_eq!(&imported, key.verifying_key());
    }

    #[test]
    fn export_import_private_round_trip() {
        let key = generate_signing_key();
        let jwk = export_private_jwk(&key);
        let imported = import_private_jwk(&jwk).unwrap();
        assert_eq!(imported.to_bytes(), key.to_bytes());
    }

    #[test]
    fn public_from_private_drops_d() {
        let key = generate_signing_key();
        let private = export_private_jwk(&key);
        let public = public_jwk_from_private(&private).unwrap();
        assert!(public.get("d").is_none());
        assert_eq!(public["x"], private["x"]);
        assert_eq!(public["y"], private["y"]);
    }

    #[test]
    fn thumbprint_is_stable_and_key_bound() {
        let jwk1 = export_public_jwk(generate_signing_key().verifying_key());
        let jwk2 = export_public_jwk(generate_signing_key().verifying_key());
        assert_eq!(jwk_thumbprint(&jwk1).unwrap(), jwk_thumbprint(&jwk1).unwrap());
        assert_ne!(jwk_thumbprint(&jwk1).unwrap(), jwk_thumbprint(&jwk2).unwrap());
        assert_eq!(jwk_thumbprint(&jwk1).unwrap().len(), 43);
    }

    #[test]
    fn thumbprint_ignores_private_fields() {
        let key = generate_signing_key();
        let public = export_public_jwk(key.verifying_key());
        let private = export_private_jwk(&key);
        assert_eq!(
            jwk_thumbprint(&public).unwrap(),
            jwk_thumbprint(&private).unwrap()
        );
    }

    #[test]
    fn rejects_non_ec_keys() {
        let jwk = serde_json::json!({"kty": "RSA"});
        assert!(matches!(
            jwk_thumbprint(&jwk),
            Err(SignatureError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn rejects_missing_coordinates() {
        let jwk = serde_json::json!({"kty": "EC", "crv": "P-256", "x": "AQAB"});
        assert!(import_public_jwk(&jwk).is_err());
    }
}
