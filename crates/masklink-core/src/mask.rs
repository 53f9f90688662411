//! Masking and verifying a single subtree.

use serde_json::{json, Value};

use crate::commit::{commit, generate_nonce};
use crate::descriptor::{descriptor_of, MaskDescriptor, MASK_KEY, MASK_VERSION};
use crate::error::MaskError;

/// Inputs to [`mask`].
#[derive(Debug, Clone)]
pub struct MaskRequest {
    /// The subtree being redacted.
    pub original: Value,
    /// URL at which the original subtree can be fetched. Must point at a
    /// sub-path of a resource; a resource-root URL produces a mask that
    /// cannot be verified through normal retrieval.
    pub url: String,
    /// Salt for the commitment; generated when `None`.
    pub nonce: Option<String>,
    /// URL at which the nonce can be fetched.
    pub nonceurl: String,
}

/// Output of [`mask`].
#[derive(Debug, Clone)]
pub struct Masked {
    pub nonce: String,
    pub nonceurl: String,
    /// The wrapped descriptor that replaces the original subtree.
    pub mask: Value,
}

/// Verdict of [`verify_mask`].
#[derive(Debug, Clone, Default)]
pub struct Verification {
    /// The descriptor and inputs were well-formed.
    pub valid: bool,
    /// The commitment matches `commit(original, nonce)`.
    pub matches: bool,
    pub details: Vec<String>,
}

impl Verification {
    fn invalid(detail: impl Into<String>) -> Self {
        Verification {
            valid: false,
            matches: false,
            details: vec![detail.into()],
        }
    }
}

/// Build a mask committing to `original`. Pure; no I/O.
pub fn mask(req: &MaskRequest) -> Result<Masked, MaskError> {
    if req.nonceurl.is_empty() {
        return Err(MaskError::MissingNonceUrl);
    }
    if req.url.is_empty() {
        return Err(MaskError::MissingUrl);
    }

    let nonce = match &req.nonce {
        Some(nonce) => nonce.clone(),
        None => generate_nonce()?,
    };
    let descriptor = MaskDescriptor {
        version: MASK_VERSION.to_string(),
        hashinfo: commit(&req.original, &nonce)?,
        url: req.url.clone(),
        nonceurl: req.nonceurl.clone(),
    };

    Ok(Masked {
        nonce,
        nonceurl: req.nonceurl.clone(),
        mask: json!({ MASK_KEY: descriptor }),
    })
}

/// Check a mask against a claimed original and nonce. Pure; no I/O.
pub fn verify_mask(mask: &Value, original: Option<&Value>, nonce: Option<&str>) -> Verification {
    let Some(descriptor) = descriptor_of(mask) else {
        return Verification::invalid("value is not a mask descriptor");
    };
    if descriptor.version != MASK_VERSION {
        return Verification::invalid(format!(
            "unsupported mask version {:?}, expected {:?}",
            descriptor.version, MASK_VERSION
        ));
    }
    let Some(original) = original else {
        return Verification::invalid("no original supplied to verify against");
    };
    let Some(nonce) = nonce else {
        return Verification::invalid("no nonce supplied to verify against");
    };

    let recomputed = match commit(original, nonce) {
        Ok(hashinfo) => hashinfo,
        Err(e) => return Verification::invalid(format!("could not hash original: {}", e)),
    };
    let matches = recomputed == descriptor.hashinfo;
    let details = if matches {
        Vec::new()
    } else {
        vec!["commitment does not match the supplied original and nonce".to_string()]
    };
    Verification {
        valid: true,
        matches,
        details,
    }
}
