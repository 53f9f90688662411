//! Verifying masks against their authoritative sources and rebuilding
//! originals from masked documents.

use futures::future::join_all;
use masklink_core::{descriptor_of, pointer, verify_mask};
use serde_json::Value;

use crate::connection::Connection;
use crate::error::ClientError;

/// Verdict of [`verify_mask_remote`].
#[derive(Debug, Clone, Default)]
pub struct RemoteVerification {
    pub valid: bool,
    pub matches: bool,
    /// The original subtree fetched from the mask's `url`, when reachable.
    pub original: Option<Value>,
    /// The nonce fetched from the mask's `nonceurl`, when reachable.
    pub nonce: Option<String>,
    pub details: Vec<String>,
}

impl RemoteVerification {
    fn invalid(detail: impl Into<String>) -> Self {
        RemoteVerification {
            details: vec![detail.into()],
            ..Default::default()
        }
    }
}

/// Fetch a mask's original and nonce and check the commitment.
///
/// The two fetches run concurrently. Fetch failures are not fatal; they
/// surface as `valid = false` with details naming the failing side.
pub async fn verify_mask_remote(mask: &Value, conn: &Connection) -> RemoteVerification {
    let Some(descriptor) = descriptor_of(mask) else {
        return RemoteVerification::invalid("value is not a mask descriptor");
    };

    let fetched = tokio::join!(conn.get(&descriptor.url), conn.get(&descriptor.nonceurl));
    let (original, nonce_value) = match fetched {
        (Ok(original), Ok(nonce_value)) => (original, nonce_value),
        (original, nonce_value) => {
            let mut details = Vec::new();
            if let Err(e) = &original {
                details.push(format!("could not fetch original: {}", e));
            }
            if let Err(e) = &nonce_value {
                details.push(format!("could not fetch nonce: {}", e));
            }
            tracing::warn!(url = %descriptor.url, "mask sources unreachable");
            return RemoteVerification {
                valid: false,
                matches: false,
                original: original.ok(),
                nonce: None,
                details,
            };
        }
    };

    let nonce = match nonce_value {
        Value::String(nonce) => nonce,
        other => {
            return RemoteVerification {
                original: Some(original),
                details: vec![format!(
                    "nonce at {} is not a JSON string: {}",
                    descriptor.nonceurl, other
                )],
                ..Default::default()
            }
        }
    };

    let verdict = verify_mask(mask, Some(&original), Some(&nonce));
    RemoteVerification {
        valid: verdict.valid,
        matches: verdict.matches,
        original: Some(original),
        nonce: Some(nonce),
        details: verdict.details,
    }
}

/// Verdict of [`reconstruct_original_from_mask_paths`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Every listed path held a well-formed, retrievable mask.
    pub valid: bool,
    /// Every commitment matched its authoritative sources.
    pub matches: bool,
    pub details: Vec<String>,
    /// The document with fetched originals written back over the masks.
    pub resource: Value,
}

/// Replace the masks at `paths` with the originals fetched from their
/// sources.
///
/// Per-path verification runs concurrently; write-back is a serial fold.
/// A fetched original is written back even when its commitment does not
/// match: later rounds of chain verification still need the structural
/// reconstruction, and the `matches` verdict records the mismatch.
pub async fn reconstruct_original_from_mask_paths(
    masked: &Value,
    paths: &[String],
    conn: &Connection,
) -> Reconstruction {
    let checks = join_all(paths.iter().map(|path| async move {
        match pointer::resolve(masked, path) {
            Some(value) => verify_mask_remote(value, conn).await,
            None => RemoteVerification::invalid(format!("no value at {:?}", path)),
        }
    }))
    .await;

    let mut resource = masked.clone();
    let mut valid = true;
    let mut matches = true;
    let mut details = Vec::new();
    for (path, check) in paths.iter().zip(checks) {
        valid &= check.valid;
        matches &= check.matches;
        details.extend(check.details.into_iter().map(|d| format!("{}: {}", path, d)));
        if let Some(original) = check.original {
            pointer::set_at(&mut resource, path, original);
        }
    }

    Reconstruction {
        valid,
        matches,
        details,
        resource,
    }
}
