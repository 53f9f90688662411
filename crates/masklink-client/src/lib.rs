//! Remote half of Mask & Link: fetching originals and nonces, persisting
//! masked copies, and verifying a resource's signature chain against its
//! authoritative sources.

pub mod connection;
pub mod error;
pub mod masker;
pub mod remote;
pub mod signing;
pub mod verifier;

pub use connection::{Connection, ResolveConnection, DEFAULT_CONTENT_TYPE, DEFAULT_TIMEOUT};
pub use error::ClientError;
pub use masker::{
    mask_and_sign_remote_resource_as_new_resource, mask_remote_resource_as_new_resource,
    MaskRemoteRequest, SignatureCallback,
};
pub use remote::{
    reconstruct_original_from_mask_paths, verify_mask_remote, Reconstruction, RemoteVerification,
};
pub use signing::{sign_resource, SignResourceRequest};
pub use verifier::{verify_remote_resource, ResourceVerification};
