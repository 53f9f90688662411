use base64ct::{Base64UrlUnpadded, Encoding};

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Base64url decode a string to bytes.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64UrlUnpadded::decode_vec(s)
}
