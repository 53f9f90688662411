//! Signature-chain verification of a remote resource.
//!
//! Signatures are peeled off newest-first. Each mask-type round rebuilds
//! the document as it existed when that round was signed; the next round
//! then verifies against the rebuilt form, so any divergence between a
//! payload's declared paths and the paths actually masked shows up as
//! `unchanged = false` one round further down.

use std::future::Future;
use std::pin::Pin;

use masklink_core::find_all_mask_paths;
use masklink_signatures::{has_signatures, verify_resource_document, TrustList};
use serde_json::Value;

use crate::connection::Connection;
use crate::error::ClientError;
use crate::remote::{reconstruct_original_from_mask_paths, Reconstruction};

/// Composite verdict over a resource's whole masking history.
#[derive(Debug, Clone)]
pub struct ResourceVerification {
    /// Every signer is on the trust list.
    pub trusted: bool,
    /// Every round's signed-over form matched its signature's hashinfo.
    /// Vacuously false when nothing was signed.
    pub unchanged: bool,
    /// Every signature parsed and every referenced mask was well-formed
    /// and retrievable.
    pub valid: bool,
    /// Every mask commitment matched its authoritative sources.
    pub matches: bool,
    /// The fully unmasked document from before the first round.
    pub original: Value,
    pub details: Vec<String>,
}

/// Fetch `url` and verify its entire signature chain, reconstructing
/// originals along the way.
pub async fn verify_remote_resource(
    url: &str,
    conn: &Connection,
    trust: &TrustList,
) -> Result<ResourceVerification, ClientError> {
    let doc = conn.get(url).await?;
    tracing::debug!(%url, "verifying resource");
    let mut verdict = peel(doc, conn, trust).await?;

    // Masks that were never declared by any signature still need
    // reconstructing before the original is complete.
    let leftover = find_all_mask_paths(&verdict.original);
    if !leftover.is_empty() {
        let rc = reconstruct_original_from_mask_paths(&verdict.original, &leftover, conn).await;
        verdict.valid &= rc.valid;
        verdict.matches &= rc.matches;
        verdict.details.extend(rc.details);
        verdict.original = rc.resource;
    }

    Ok(verdict)
}

/// Consume one signature and recurse over what it signed.
fn peel<'a>(
    doc: Value,
    conn: &'a Connection,
    trust: &'a TrustList,
) -> Pin<Box<dyn Future<Output = Result<ResourceVerification, ClientError>> + Send + 'a>> {
    Box::pin(async move {
        if !has_signatures(&doc) {
            // Nothing attested: structurally fine, but nothing vouches
            // for integrity or provenance.
            return Ok(ResourceVerification {
                trusted: false,
                unchanged: false,
                valid: true,
                matches: true,
                original: doc,
                details: Vec::new(),
            });
        }

        let sig = verify_resource_document(&doc, trust)?;
        if !sig.valid {
            // An unverifiable signature ends the walk; nothing below it
            // can be attributed.
            return Ok(ResourceVerification {
                trusted: false,
                unchanged: false,
                valid: false,
                matches: false,
                original: sig.original,
                details: sig.details,
            });
        }

        let sig_type = sig.payload.get("type").and_then(Value::as_str).unwrap_or("");
        let rc = match sig_type {
            "mask" => match declared_paths(&sig.payload) {
                Some(paths) => {
                    reconstruct_original_from_mask_paths(&sig.original, &paths, conn).await
                }
                None => Reconstruction {
                    valid: false,
                    matches: true,
                    details: vec!["mask signature payload has no mask-paths list".to_string()],
                    resource: sig.original,
                },
            },
            // Modification signatures rewrite the signed-over form; a
            // mutator-aware peel would slot in here.
            "modification" => return Err(ClientError::ModificationUnsupported),
            _ => Reconstruction {
                valid: true,
                matches: true,
                details: Vec::new(),
                resource: sig.original,
            },
        };

        let next = if has_signatures(&rc.resource) {
            peel(rc.resource, conn, trust).await?
        } else {
            // Identity element: the chain bottomed out cleanly.
            ResourceVerification {
                trusted: true,
                unchanged: true,
                valid: true,
                matches: true,
                original: rc.resource,
                details: Vec::new(),
            }
        };

        let mut details = sig.details;
        details.extend(rc.details);
        details.extend(next.details);
        Ok(ResourceVerification {
            trusted: sig.trusted && next.trusted,
            unchanged: sig.unchanged && next.unchanged,
            valid: sig.valid && next.valid && rc.valid,
            matches: next.matches && rc.matches,
            original: next.original,
            details,
        })
    })
}

fn declared_paths(payload: &Value) -> Option<Vec<String>> {
    payload.get("mask-paths")?.as_array().map(|paths| {
        paths
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}
