//! Low-level HTTP transport for the store API.
//!
//! The transport owns the connection details: base address, request
//! timeout, and the session token header. It knows nothing about KV
//! envelopes or AppRole; callers hand it logical API paths such as
//! `secret/data/db01/1234` or `auth/token/lookup-self`.

use keywarden_core::SecretString;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::trace;
use url::Url;

use crate::error::{Result, VaultError};

/// Header carrying the session token.
const TOKEN_HEADER: &str = "X-Vault-Token";

/// HTTP transport with a shared session token.
pub struct Transport {
    /// HTTP client.
    client: Client,

    /// Store base address, without a trailing slash.
    address: String,

    /// Session token sent with every request once set.
    token: RwLock<Option<SecretString>>,
}

impl Transport {
    /// Create a transport for the store at `address`.
    pub fn new(address: &str, timeout: Duration) -> Result<Self> {
        // Parse up front so a bad address fails here, not on first use.
        let url = Url::parse(address).map_err(|e| {
            VaultError::config(format!("Invalid store address '{}': {}", address, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(VaultError::config(format!(
                "Store address '{}' must use http or https",
                address
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            address: address.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Install or clear the session token used for subsequent requests.
    pub async fn set_token(&self, token: Option<SecretString>) {
        *self.token.write().await = token;
    }

    /// Whether a session token is currently installed.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// GET a path, expecting a JSON body.
    pub async fn get_json(&self, path: &str) -> Result<VaultResponse> {
        let response = self.send(Method::GET, path, None, None).await?;
        Self::parse_body(response, path).await
    }

    /// GET a path using `token` instead of the installed session token.
    ///
    /// Used to validate a static token before it is installed.
    pub async fn get_json_with_token(
        &self,
        path: &str,
        token: &SecretString,
    ) -> Result<VaultResponse> {
        let response = self.send(Method::GET, path, None, Some(token)).await?;
        Self::parse_body(response, path).await
    }

    /// POST a JSON body to a path.
    ///
    /// Returns `None` for responses without a body (the store answers
    /// `204 No Content` for plain KV writes).
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Option<VaultResponse>> {
        let response = self.send(Method::POST, path, Some(body), None).await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Self::parse_body(response, path).await.map(Some)
    }

    /// DELETE a path. A missing path counts as success, so deletes are
    /// idempotent.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.send(Method::DELETE, path, None, None).await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(Self::error_from(response).await)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token_override: Option<&SecretString>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/v1/{}", self.address, path);
        trace!(%method, path, "store request");

        let mut request = self.client.request(method, url);

        match token_override {
            Some(token) => {
                request = request.header(TOKEN_HEADER, token.expose_secret());
            }
            None => {
                if let Some(token) = self.token.read().await.as_ref() {
                    request = request.header(TOKEN_HEADER, token.expose_secret());
                }
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    async fn parse_body(response: reqwest::Response, path: &str) -> Result<VaultResponse> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(VaultError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(response.json::<VaultResponse>().await?)
    }

    async fn error_from(response: reqwest::Response) -> VaultError {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();

        let message = if body.errors.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            body.errors.join(", ")
        };

        VaultError::api(status.as_u16(), message)
    }
}

// Wire types shared by every store endpoint.

/// Envelope common to all store responses.
#[derive(Debug, Default, Deserialize)]
pub struct VaultResponse {
    /// Payload of data-bearing endpoints (KV reads, lookups).
    #[serde(default)]
    pub data: Option<Value>,

    /// Payload of credential-issuing endpoints (logins, renewals).
    #[serde(default)]
    pub auth: Option<AuthPayload>,
}

/// Credential payload returned by logins and renewals.
#[derive(Debug, Deserialize)]
pub struct AuthPayload {
    /// The session token.
    pub client_token: SecretString,

    /// Token lifetime in seconds; zero means no expiry is known.
    #[serde(default)]
    pub lease_duration: u64,

    /// Whether the token can be renewed in place.
    #[serde(default)]
    pub renewable: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}
