//! HTTP connection to a resource server.
//!
//! Connections are constructed explicitly and threaded through the call
//! graph; there is no ambient global connection. All requests share one
//! ambient timeout, send Bearer auth, and speak JSON.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::error::ClientError;

/// Ambient bound on every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Content type used when the resource does not declare its own `_type`.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct Connection {
    domain: String,
    token: String,
    http: reqwest::Client,
}

/// Inputs to [`Connection::resolve`]: reuse a connection, or build one
/// from a token and domain.
#[derive(Debug, Clone, Default)]
pub struct ResolveConnection {
    pub connection: Option<Connection>,
    pub token: Option<String>,
    pub domain: Option<String>,
}

impl Connection {
    pub fn new(domain: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        let domain: String = domain.into();
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Transport {
                url: domain.clone(),
                reason: e.to_string(),
            })?;
        Ok(Connection {
            domain: domain.trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }

    /// Reuse the supplied connection, or construct one from credentials.
    pub fn resolve(args: ResolveConnection) -> Result<Connection, ClientError> {
        if let Some(connection) = args.connection {
            return Ok(connection);
        }
        match (args.token, args.domain) {
            (Some(token), Some(domain)) => Connection::new(domain, token),
            _ => Err(ClientError::MissingCredentials),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Absolute URLs pass through; paths are joined onto the domain.
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.domain, path)
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.url_for(path);
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                url,
            });
        }
        response.json().await.map_err(|e| ClientError::Transport {
            url,
            reason: e.to_string(),
        })
    }

    pub async fn put(
        &self,
        path: &str,
        data: &Value,
        content_type: &str,
    ) -> Result<(), ClientError> {
        let url = self.url_for(path);
        tracing::debug!(%url, %content_type, "PUT");
        let response = self
            .http
            .put(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, content_type.to_string())
            .body(serde_json::to_vec(data)?)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }

    /// POST `data`, returning the `content-location` response header.
    pub async fn post(
        &self,
        path: &str,
        data: &Value,
        content_type: &str,
    ) -> Result<String, ClientError> {
        let url = self.url_for(path);
        tracing::debug!(%url, %content_type, "POST");
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, content_type.to_string())
            .body(serde_json::to_vec(data)?)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                url,
            });
        }
        response
            .headers()
            .get("content-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(ClientError::MissingContentLocation)
    }
}
