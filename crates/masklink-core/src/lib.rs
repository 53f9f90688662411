//! Mask & Link core: selective redaction of JSON subtrees with salted
//! hash commitments and links back to the authoritative plaintext.
//!
//! Everything in this crate is pure: masking, verification against a
//! supplied original, locating masks, and masking whole resources. The
//! companion `masklink-client` crate adds the remote halves (fetching
//! originals and nonces, persisting masked copies, chain verification).

pub mod commit;
pub mod descriptor;
pub mod error;
pub mod mask;
pub mod pointer;
pub mod resource;
pub mod walker;

pub use commit::{commit, generate_nonce, NONCE_BYTES};
pub use descriptor::{
    descriptor_of, domain_for_mask, domain_from_url, is_mask, MaskDescriptor, MASK_KEY,
    MASK_VERSION,
};
pub use error::MaskError;
pub use mask::{mask, verify_mask, MaskRequest, Masked, Verification};
pub use resource::{mask_resource, MaskResourceRequest, MaskedResource, NONCE_META_PATH};
pub use walker::find_all_mask_paths;
