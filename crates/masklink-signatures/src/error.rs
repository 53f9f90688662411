use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("canonical JSON: non-finite number is not representable")]
    NonFiniteNumber,

    #[error("document has no signatures to verify")]
    NoSignatures,

    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("JWK missing {0}")]
    MissingJwkField(&'static str),

    #[error("Invalid JWK: {0}")]
    InvalidJwk(String),

    #[error("JWK thumbprint only supports EC keys, got kty={0}")]
    UnsupportedKeyType(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("System clock is before the UNIX epoch")]
    ClockSkew,
}
