//! The mask descriptor: the small object left behind where a subtree
//! was redacted.

use masklink_signatures::HashInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which a descriptor is wrapped inside the masked document.
pub const MASK_KEY: &str = "trellis-mask";

/// Descriptor version this library produces and accepts.
pub const MASK_VERSION: &str = "1.0";

/// Contents of a `trellis-mask` entry.
///
/// `hashinfo` commits to the redacted subtree (salted with the nonce);
/// `url` and `nonceurl` say where the plaintext and the salt can be
/// fetched by parties authorized to audit the mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskDescriptor {
    pub version: String,
    pub hashinfo: HashInfo,
    pub url: String,
    pub nonceurl: String,
}

/// Extract the descriptor from either the wrapping object or the inner
/// descriptor itself. `None` when the value is not descriptor-shaped.
pub fn descriptor_of(value: &Value) -> Option<MaskDescriptor> {
    let obj = value.as_object()?;
    let inner = obj.get(MASK_KEY).unwrap_or(value);
    serde_json::from_value(inner.clone()).ok()
}

/// True when `value` is a mask: all four descriptor fields present and
/// well-typed, in either wrapped or bare form.
pub fn is_mask(value: &Value) -> bool {
    descriptor_of(value).is_some()
}

/// The `scheme://host[:port]` portion of the descriptor's `url`, or
/// `None` when the descriptor or its URL is malformed.
pub fn domain_for_mask(value: &Value) -> Option<String> {
    let descriptor = descriptor_of(value)?;
    domain_from_url(&descriptor.url)
}

/// The `scheme://host[:port]` portion of any absolute URL.
pub fn domain_from_url(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    if scheme.is_empty()
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    {
        return None;
    }
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|a| !a.is_empty())?;
    Some(format!("{}://{}", scheme, authority))
}
