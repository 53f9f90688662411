//! Signature primitives for masklink resources.
//!
//! Provides the canonical JSON hash that mask commitments are built on,
//! P-256 JWK key handling, and the `signatures` chain that records each
//! masking round on a resource.

pub use p256;

pub mod base64url;
pub mod canonical;
pub mod error;
pub mod keys;
pub mod signature;

pub use base64url::{base64url_decode, base64url_encode};
pub use canonical::{canonical_json, hash_json, HashInfo, HASH_ALG};
pub use error::SignatureError;
pub use keys::{
    export_private_jwk, export_public_jwk, generate_signing_key, import_private_jwk,
    import_public_jwk, jwk_thumbprint, public_jwk_from_private,
};
pub use signature::{
    has_signatures, sign_resource_document, verify_resource_document, SignOptions, TrustList,
    VerifiedSignature, SIGNATURES_KEY,
};
