//! Resource signature chains.
//!
//! A signed resource carries a `signatures` array of compact JWS entries
//! (`base64url(header).base64url(payload).base64url(signature)`). Each
//! payload commits to the SHA-256 of the document exactly as it existed
//! when that signature was appended, so signatures can be peeled off in
//! reverse order to recover every intermediate form.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey};
use serde_json::{json, Map, Value};

use crate::base64url::{base64url_decode, base64url_encode};
use crate::canonical::{hash_json, HashInfo};
use crate::error::SignatureError;
use crate::keys::{export_public_jwk, import_public_jwk, jwk_thumbprint};

/// Key under which signature entries accumulate on a resource.
pub const SIGNATURES_KEY: &str = "signatures";

/// Options for appending a signature to a resource.
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Signature type recorded in the payload (e.g. `"mask"`).
    pub sig_type: String,
    /// Optional signer identity block copied into the payload.
    pub signer: Option<Value>,
    /// Extra payload entries (e.g. `"mask-paths"`).
    pub payload: Option<Map<String, Value>>,
}

/// Result of consuming the top-most signature of a document.
#[derive(Debug, Clone)]
pub struct VerifiedSignature {
    /// Signer's key is in the caller's trust list.
    pub trusted: bool,
    /// The document minus this signature hashes to the payload's `hashinfo`.
    pub unchanged: bool,
    /// The entry parsed and its ES256 signature verified.
    pub valid: bool,
    /// The document as it existed when this signature was appended.
    pub original: Value,
    /// The decoded signature payload (`Value::Null` when unparseable).
    pub payload: Value,
    /// Human-readable notes accumulated during verification.
    pub details: Vec<String>,
}

/// A set of trusted signer keys, identified by RFC 7638 thumbprint.
#[derive(Debug, Clone, Default)]
pub struct TrustList {
    thumbprints: BTreeSet<String>,
}

impl VerifiedSignature {
    fn invalid(original: Value, payload: Value, details: Vec<String>) -> Self {
        VerifiedSignature {
            trusted: false,
            unchanged: false,
            valid: false,
            original,
            payload,
            details,
        }
    }
}

impl TrustList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signer's JWK (public or private form) to the list.
    pub fn trust(&mut self, jwk: &Value) -> Result<(), SignatureError> {
        self.thumbprints.insert(jwk_thumbprint(jwk)?);
        Ok(())
    }

    pub fn is_trusted(&self, jwk: &Value) -> bool {
        jwk_thumbprint(jwk)
            .map(|t| self.thumbprints.contains(&t))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.thumbprints.is_empty()
    }
}

/// Append a signature to `doc`, returning the signed copy.
///
/// The payload commits to `hash_json(doc)` as given, including any
/// signatures already present, which is what makes the chain peelable.
pub fn sign_resource_document(
    doc: &Value,
    key: &SigningKey,
    opts: &SignOptions,
) -> Result<Value, SignatureError> {
    if !doc.is_object() {
        return Err(SignatureError::NotAnObject(json_kind(doc)));
    }

    let hashinfo = hash_json(doc)?;
    let iat = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| SignatureError::ClockSkew)?
        .as_secs();

    let header = json!({
        "alg": "ES256",
        "jwk": export_public_jwk(key.verifying_key()),
    });

    let mut payload = Map::new();
    payload.insert("hashinfo".to_string(), serde_json::to_value(&hashinfo)?);
    payload.insert("iat".to_string(), json!(iat));
    payload.insert("type".to_string(), Value::String(opts.sig_type.clone()));
    if let Some(signer) = &opts.signer {
        payload.insert("signer".to_string(), signer.clone());
    }
    if let Some(extra) = &opts.payload {
        for (k, v) in extra {
            payload.insert(k.clone(), v.clone());
        }
    }

    let header_b64 = base64url_encode(serde_json::to_string(&header)?.as_bytes());
    let payload_b64 = base64url_encode(serde_json::to_string(&Value::Object(payload))?.as_bytes());
    let signing_input = format!("{}.{}", header_b64, payload_b64);

    let signature: Signature = key
        .try_sign(signing_input.as_bytes())
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;
    let entry = format!(
        "{}.{}",
        signing_input,
        base64url_encode(&signature.to_bytes().to_vec())
    );

    let mut signed = doc.clone();
    let map = signed.as_object_mut().unwrap();
    match map.get_mut(SIGNATURES_KEY) {
        Some(Value::Array(entries)) => entries.push(Value::String(entry)),
        _ => {
            map.insert(SIGNATURES_KEY.to_string(), json!([entry]));
        }
    }
    Ok(signed)
}

/// Consume the top-most signature of `doc`.
///
/// A malformed or cryptographically bad entry is reported through
/// `valid = false`, not an error; `Err` is reserved for documents with
/// no signatures at all.
pub fn verify_resource_document(
    doc: &Value,
    trust: &TrustList,
) -> Result<VerifiedSignature, SignatureError> {
    if !doc.is_object() {
        return Err(SignatureError::NotAnObject(json_kind(doc)));
    }
    let (original, entry) = pop_signature(doc)?;

    let mut details = Vec::new();
    let parsed = match entry.as_str().map(parse_entry) {
        Some(Ok(parsed)) => parsed,
        Some(Err(e)) => {
            details.push(format!("signature did not parse: {}", e));
            return Ok(VerifiedSignature::invalid(original, Value::Null, details));
        }
        None => {
            details.push("signature entry is not a string".to_string());
            return Ok(VerifiedSignature::invalid(original, Value::Null, details));
        }
    };

    let jwk = &parsed.header["jwk"];
    let valid = match import_public_jwk(jwk) {
        Ok(verifying_key) => match Signature::from_slice(&parsed.signature) {
            Ok(sig) => verifying_key
                .verify(parsed.signing_input.as_bytes(), &sig)
                .is_ok(),
            Err(e) => {
                details.push(format!("signature bytes malformed: {}", e));
                false
            }
        },
        Err(e) => {
            details.push(format!("signer key unusable: {}", e));
            false
        }
    };
    if !valid {
        return Ok(VerifiedSignature::invalid(original, parsed.payload, details));
    }

    let unchanged = match parsed
        .payload
        .get("hashinfo")
        .map(|h| serde_json::from_value::<HashInfo>(h.clone()))
    {
        Some(Ok(committed)) => {
            let actual = hash_json(&original)?;
            if actual != committed {
                details.push("document hash does not match the signed hashinfo".to_string());
                false
            } else {
                true
            }
        }
        _ => {
            details.push("signature payload has no usable hashinfo".to_string());
            false
        }
    };

    let trusted = trust.is_trusted(jwk);
    if !trusted {
        details.push("signer is not on the trust list".to_string());
    }

    Ok(VerifiedSignature {
        trusted,
        unchanged,
        valid,
        original,
        payload: parsed.payload,
        details,
    })
}

/// True when `doc` carries at least one signature entry.
pub fn has_signatures(doc: &Value) -> bool {
    doc.get(SIGNATURES_KEY)
        .and_then(Value::as_array)
        .is_some_and(|entries| !entries.is_empty())
}

struct ParsedEntry {
    header: Value,
    payload: Value,
    signature: Vec<u8>,
    signing_input: String,
}

fn parse_entry(entry: &str) -> Result<ParsedEntry, SignatureError> {
    let mut parts = entry.split('.');
    let (header_b64, payload_b64, sig_b64) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s)) if parts.next().is_none() => (h, p, s),
        _ => {
            return Err(SignatureError::InvalidJwk(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };

    let header_bytes =
        base64url_decode(header_b64).map_err(|e| SignatureError::Base64Decode(e.to_string()))?;
    let payload_bytes =
        base64url_decode(payload_b64).map_err(|e| SignatureError::Base64Decode(e.to_string()))?;
    let signature =
        base64url_decode(sig_b64).map_err(|e| SignatureError::Base64Decode(e.to_string()))?;

    Ok(ParsedEntry {
        header: serde_json::from_slice(&header_bytes)?,
        payload: serde_json::from_slice(&payload_bytes)?,
        signature,
        signing_input: format!("{}.{}", header_b64, payload_b64),
    })
}

/// Remove the last signature entry, returning the document as it was
/// signed plus the removed entry. An array emptied by the pop is removed
/// entirely so the result matches the pre-signing form.
fn pop_signature(doc: &Value) -> Result<(Value, Value), SignatureError> {
    let mut original = doc.clone();
    let map = original.as_object_mut().unwrap();

    let entries = match map.get_mut(SIGNATURES_KEY) {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(SignatureError::NoSignatures),
    };
    let entry = entries.pop().unwrap();
    if entries.is_empty() {
        map.remove(SIGNATURES_KEY);
    }
    Ok((original, entry))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
