//! Thin facade over the signature layer for mask-type signatures.

use masklink_signatures::{import_private_jwk, sign_resource_document, SignOptions};
use serde_json::{json, Map, Value};

use crate::error::ClientError;

/// Inputs to [`sign_resource`].
#[derive(Debug, Clone)]
pub struct SignResourceRequest {
    pub resource: Value,
    /// P-256 private JWK; the signature header's public key is derived
    /// from it.
    pub private_jwk: Value,
    /// Optional signer identity block recorded in the payload.
    pub signer: Option<Value>,
    /// Paths masked in this round, declared as the payload's
    /// `mask-paths`.
    pub paths: Option<Vec<String>>,
}

/// Append a mask-type signature to a resource. Non-mutating.
pub fn sign_resource(req: &SignResourceRequest) -> Result<Value, ClientError> {
    let key = import_private_jwk(&req.private_jwk)?;

    let payload = req.paths.as_ref().map(|paths| {
        let mut payload = Map::new();
        payload.insert("mask-paths".to_string(), json!(paths));
        payload
    });

    Ok(sign_resource_document(
        &req.resource,
        &key,
        &SignOptions {
            sig_type: "mask".to_string(),
            signer: req.signer.clone(),
            payload,
        },
    )?)
}
