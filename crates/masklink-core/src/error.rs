use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaskError {
    #[error("mask requires a nonceurl at which the nonce can be fetched")]
    MissingNonceUrl,

    #[error("mask requires a url at which the original can be fetched")]
    MissingUrl,

    #[error("masking an entire resource root is not allowed")]
    CannotMaskRoot,

    #[error("no value at pointer {0:?}")]
    PathNotFound(String),

    #[error("random number generation failed: {0}")]
    RngFailed(String),

    #[error(transparent)]
    Signature(#[from] masklink_signatures::SignatureError),
}
