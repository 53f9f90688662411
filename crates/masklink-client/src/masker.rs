//! Masking a remote resource into a new, redacted copy.

use futures::future::BoxFuture;
use masklink_core::{domain_from_url, mask_resource, MaskResourceRequest, NONCE_META_PATH};
use serde_json::{json, Value};

use crate::connection::{Connection, ResolveConnection, DEFAULT_CONTENT_TYPE};
use crate::error::ClientError;
use crate::signing::{sign_resource, SignResourceRequest};

/// Hook run on the masked resource before it is persisted, typically to
/// append a signature.
pub type SignatureCallback<'a> =
    Box<dyn FnOnce(Value) -> BoxFuture<'a, Result<Value, ClientError>> + Send + 'a>;

/// Inputs to the remote maskers.
#[derive(Debug, Clone, Default)]
pub struct MaskRemoteRequest {
    /// Absolute URL of the resource to redact.
    pub url: String,
    /// JSON Pointers of the subtrees to redact.
    pub paths: Vec<String>,
    pub token: Option<String>,
    pub connection: Option<Connection>,
}

/// Redact `paths` of the resource at `url` and persist the result as a
/// new resource, returning the new resource id.
///
/// The nonce on the original is write-once: an existing
/// `/_meta/nonce` is reused, and one is generated and PUT there only
/// when absent.
pub async fn mask_remote_resource_as_new_resource(
    req: MaskRemoteRequest,
    signature_callback: Option<SignatureCallback<'_>>,
) -> Result<String, ClientError> {
    if req.url.is_empty() {
        return Err(ClientError::InvalidArgument("url must not be empty"));
    }
    if req.paths.is_empty() {
        return Err(ClientError::InvalidArgument("paths must not be empty"));
    }

    let conn = Connection::resolve(ResolveConnection {
        connection: req.connection.clone(),
        token: req.token.clone(),
        domain: domain_from_url(&req.url),
    })?;

    let original = conn
        .get(&req.url)
        .await
        .map_err(|e| ClientError::OriginalFetchFailed {
            url: req.url.clone(),
            reason: e.to_string(),
        })?;
    let content_type = original
        .get("_type")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let nonceurl = format!("{}{}", req.url, NONCE_META_PATH);
    let nonce = match conn.get(&nonceurl).await {
        Ok(Value::String(existing)) => {
            tracing::debug!(%nonceurl, "reusing existing nonce");
            Some(existing)
        }
        _ => None,
    };
    let nonce = match nonce {
        Some(nonce) => nonce,
        None => {
            let fresh = masklink_core::generate_nonce()?;
            conn.put(&nonceurl, &json!(fresh), &content_type)
                .await
                .map_err(|e| ClientError::NoncePersistFailed {
                    url: nonceurl.clone(),
                    reason: e.to_string(),
                })?;
            tracing::info!(%nonceurl, "persisted fresh nonce");
            fresh
        }
    };

    let masked = mask_resource(&MaskResourceRequest {
        resource: original,
        url_to_resource: Some(req.url.clone()),
        paths: req.paths.clone(),
        nonce: Some(nonce),
        nonceurl: Some(nonceurl),
    })?;
    // url_to_resource was checked non-empty above
    let mut resource = masked.resource.unwrap();

    if let Some(callback) = signature_callback {
        resource = callback(resource).await?;
    }

    let location = conn
        .post("/resources", &resource, &content_type)
        .await
        .map_err(|e| ClientError::CopyPersistFailed(e.to_string()))?;
    let id = location.trim_start_matches('/').to_string();
    tracing::info!(%id, url = %req.url, "persisted masked copy");
    Ok(id)
}

/// [`mask_remote_resource_as_new_resource`] with a mask-type signature
/// over the redacted copy, declaring the masked paths.
pub async fn mask_and_sign_remote_resource_as_new_resource(
    req: MaskRemoteRequest,
    private_jwk: Value,
    signer: Option<Value>,
) -> Result<String, ClientError> {
    let paths = req.paths.clone();
    let callback: SignatureCallback<'_> = Box::new(move |resource| {
        Box::pin(async move {
            sign_resource(&SignResourceRequest {
                resource,
                private_jwk,
                signer,
                paths: Some(paths),
            })
        })
    });
    mask_remote_resource_as_new_resource(req, Some(callback)).await
}
