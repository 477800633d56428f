//! Session token lifetime management.
//!
//! A session is only trusted while its expiry is comfortably in the
//! future. Within [`SAFETY_BUFFER`] of expiry the token is refreshed
//! before use, so an operation started near the boundary cannot have its
//! token lapse mid-flight.

use keywarden_core::SecretString;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::auth::AuthMethod;
use crate::error::{Result, VaultError};
use crate::transport::Transport;

/// Remaining lifetime below which a token is no longer trusted.
pub const SAFETY_BUFFER: Duration = Duration::from_secs(30);

/// Observable session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credential has been obtained yet.
    Unauthenticated,

    /// The credential has more than [`SAFETY_BUFFER`] of lifetime left.
    Valid,

    /// The credential expires within [`SAFETY_BUFFER`].
    ExpiringSoon,

    /// The credential has expired, or its expiry is unknown.
    Expired,
}

/// A session token and what is known about its lifetime.
#[derive(Debug)]
pub struct SessionCredential {
    token: SecretString,
    renewable: bool,
    lease_duration: Duration,
    expires_at: Option<Instant>,
}

impl SessionCredential {
    /// Build a credential from an issued token and its lease.
    ///
    /// A zero lease means the store reported no expiry. Such a credential
    /// is never treated as valid; it gets revalidated before every use
    /// instead of being trusted indefinitely.
    pub fn new(token: SecretString, lease_duration_secs: u64, renewable: bool) -> Self {
        let lease_duration = Duration::from_secs(lease_duration_secs);
        let expires_at = if lease_duration_secs > 0 {
            Some(Instant::now() + lease_duration)
        } else {
            None
        };

        Self {
            token,
            renewable,
            lease_duration,
            expires_at,
        }
    }

    /// The session token.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Whether the token can be renewed in place.
    pub fn renewable(&self) -> bool {
        self.renewable
    }

    /// Lease duration reported at issue time.
    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    fn state(&self) -> SessionState {
        match self.expires_at {
            None => SessionState::Expired,
            Some(expires_at) => {
                let now = Instant::now();
                if now >= expires_at {
                    SessionState::Expired
                } else if expires_at - now <= SAFETY_BUFFER {
                    SessionState::ExpiringSoon
                } else {
                    SessionState::Valid
                }
            }
        }
    }
}

/// Drives the session lifecycle against the store.
pub struct SessionManager {
    method: AuthMethod,
    auth_mount: String,
    credential: Option<SessionCredential>,
}

impl SessionManager {
    /// Create a manager for the given proof of identity.
    pub fn new(method: AuthMethod, auth_mount: impl Into<String>) -> Self {
        Self {
            method,
            auth_mount: auth_mount.into(),
            credential: None,
        }
    }

    /// The configured authentication method.
    pub fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// The current credential, if any.
    pub fn credential(&self) -> Option<&SessionCredential> {
        self.credential.as_ref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.credential
            .as_ref()
            .map(|c| c.state())
            .unwrap_or(SessionState::Unauthenticated)
    }

    /// Whether the session can be used as-is.
    pub fn is_valid(&self) -> bool {
        self.state() == SessionState::Valid
    }

    /// Obtain a fresh credential and install its token on the transport.
    ///
    /// On failure the previous credential, if any, is left untouched.
    pub async fn authenticate(&mut self, transport: &Transport) -> Result<()> {
        let credential = self.method.login(transport, &self.auth_mount).await?;
        transport.set_token(Some(credential.token().clone())).await;
        self.credential = Some(credential);
        Ok(())
    }

    /// Extend the current credential's lifetime.
    ///
    /// Renewal is an optimization over a fresh login: when the token is
    /// not renewable, or the renewal request fails for any reason, this
    /// falls back to [`authenticate`](Self::authenticate) and reports that
    /// outcome instead.
    pub async fn renew(&mut self, transport: &Transport) -> Result<()> {
        let credential = self.credential.as_ref().ok_or(VaultError::NoTokenToRenew)?;

        if !credential.renewable() {
            debug!("session token is not renewable, re-authenticating");
            return self.authenticate(transport).await;
        }

        match self.try_renew(transport).await {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!(error = %err, "token renewal failed, falling back to login");
                self.authenticate(transport).await
            }
        }
    }

    async fn try_renew(&mut self, transport: &Transport) -> Result<()> {
        let response = transport
            .post_json("auth/token/renew-self", &json!({}))
            .await?
            .ok_or(VaultError::MissingData("renewal response"))?;
        let auth = response
            .auth
            .ok_or(VaultError::MissingData("renewal auth payload"))?;

        let credential =
            SessionCredential::new(auth.client_token, auth.lease_duration, auth.renewable);
        transport.set_token(Some(credential.token().clone())).await;
        debug!(
            lease_duration = auth.lease_duration,
            "session token renewed"
        );
        self.credential = Some(credential);
        Ok(())
    }

    /// Make the session usable, by whatever means are cheapest.
    ///
    /// A valid session is left alone. A renewable one is renewed (with
    /// its built-in login fallback); anything else authenticates from
    /// scratch.
    pub async fn ensure_valid(&mut self, transport: &Transport) -> Result<()> {
        match self.state() {
            SessionState::Valid => Ok(()),
            SessionState::Unauthenticated => self.authenticate(transport).await,
            SessionState::ExpiringSoon | SessionState::Expired => {
                let renewable = self
                    .credential
                    .as_ref()
                    .map(|c| c.renewable())
                    .unwrap_or(false);
                if renewable {
                    self.renew(transport).await
                } else {
                    self.authenticate(transport).await
                }
            }
        }
    }

    /// Drop the credential and clear the transport token.
    ///
    /// Idempotent; the token memory is zeroed on drop.
    pub async fn clear(&mut self, transport: &Transport) {
        self.credential = None;
        transport.set_token(None).await;
    }
}
