use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("either a connection or a token + domain must be supplied")]
    MissingCredentials,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} answered {status}")]
    Http { status: u16, url: String },

    #[error("could not fetch the original resource at {url}: {reason}")]
    OriginalFetchFailed { url: String, reason: String },

    #[error("could not persist the nonce at {url}: {reason}")]
    NoncePersistFailed { url: String, reason: String },

    #[error("could not persist the masked copy: {0}")]
    CopyPersistFailed(String),

    #[error("response carried no content-location header")]
    MissingContentLocation,

    #[error("modification signatures are not supported")]
    ModificationUnsupported,

    #[error(transparent)]
    Mask(#[from] masklink_core::MaskError),

    #[error(transparent)]
    Signature(#[from] masklink_signatures::SignatureError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
