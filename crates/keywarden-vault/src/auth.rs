//! Credential proofs and the login exchange.

use keywarden_core::config::VaultConfig;
use keywarden_core::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{AuthError, Result, VaultError};
use crate::session::SessionCredential;
use crate::transport::Transport;

/// How the client proves itself to the store.
///
/// The two supported methods are an AppRole pair exchanged for a session
/// token, and a pre-issued static token. The enum is closed on purpose:
/// every credential-dependent code path matches it exhaustively.
pub enum AuthMethod {
    /// AppRole role_id/secret_id pair.
    AppRole {
        role_id: SecretString,
        secret_id: SecretString,
    },

    /// Pre-issued static token.
    Token(SecretString),
}

impl AuthMethod {
    /// Build the method from the store configuration.
    ///
    /// A configured token wins; otherwise AppRole is assumed. Absent
    /// credentials become empty strings so the failure surfaces as an
    /// [`AuthError`] at login time rather than a config error.
    pub fn from_config(config: &VaultConfig) -> Self {
        if let Some(token) = &config.token {
            return Self::Token(token.clone());
        }
        Self::AppRole {
            role_id: config.role_id.clone().unwrap_or_default(),
            secret_id: config.secret_id.clone().unwrap_or_default(),
        }
    }

    /// Method name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AppRole { .. } => "approle",
            Self::Token(_) => "token",
        }
    }

    /// Whether this is AppRole authentication.
    pub fn is_approle(&self) -> bool {
        matches!(self, Self::AppRole { .. })
    }

    /// Exchange the proof for a session credential.
    ///
    /// Empty credentials fail before any request is sent. A rejection by
    /// the store becomes [`AuthError::Exchange`]; transport-level failures
    /// (network, timeout) pass through unchanged.
    pub async fn login(
        &self,
        transport: &Transport,
        auth_mount: &str,
    ) -> Result<SessionCredential> {
        match self {
            Self::AppRole { role_id, secret_id } => {
                if role_id.is_empty() {
                    return Err(AuthError::EmptyRoleId.into());
                }
                if secret_id.is_empty() {
                    return Err(AuthError::EmptySecretId.into());
                }

                let path = format!("auth/{}/login", auth_mount);
                let body = json!({
                    "role_id": role_id.expose_secret(),
                    "secret_id": secret_id.expose_secret(),
                });

                match transport.post_json(&path, &body).await {
                    Ok(Some(response)) => match response.auth {
                        Some(auth) => {
                            debug!(
                                lease_duration = auth.lease_duration,
                                renewable = auth.renewable,
                                "approle login succeeded"
                            );
                            Ok(SessionCredential::new(
                                auth.client_token,
                                auth.lease_duration,
                                auth.renewable,
                            ))
                        }
                        None => Err(AuthError::Exchange(
                            "login response carried no auth payload".to_string(),
                        )
                        .into()),
                    },
                    Ok(None) => {
                        Err(AuthError::Exchange("login response was empty".to_string()).into())
                    }
                    Err(VaultError::Api { status, message }) => {
                        Err(AuthError::Exchange(format!("{} (status {})", message, status)).into())
                    }
                    Err(VaultError::NotFound { .. }) => Err(AuthError::Exchange(format!(
                        "login endpoint not found; check auth mount '{}'",
                        auth_mount
                    ))
                    .into()),
                    Err(other) => Err(other),
                }
            }

            Self::Token(token) => {
                if token.is_empty() {
                    return Err(AuthError::EmptyToken.into());
                }

                // The token is never exchanged; a lookup-self both validates
                // it and reports its remaining lifetime.
                match transport
                    .get_json_with_token("auth/token/lookup-self", token)
                    .await
                {
                    Ok(response) => {
                        let data = response
                            .data
                            .ok_or(VaultError::MissingData("token metadata"))?;
                        let info: TokenSelf = serde_json::from_value(data)?;
                        debug!(ttl = info.ttl, renewable = info.renewable, "token validated");
                        Ok(SessionCredential::new(token.clone(), info.ttl, info.renewable))
                    }
                    Err(VaultError::Api { status, message }) => {
                        Err(AuthError::Exchange(format!("{} (status {})", message, status)).into())
                    }
                    Err(VaultError::NotFound { .. }) => {
                        Err(AuthError::Exchange("token was rejected by the store".to_string())
                            .into())
                    }
                    Err(other) => Err(other),
                }
            }
        }
    }
}

// Wire types for the lookup-self endpoint.

#[derive(Debug, Deserialize)]
struct TokenSelf {
    #[serde(default)]
    ttl: u64,

    #[serde(default)]
    renewable: bool,
}
