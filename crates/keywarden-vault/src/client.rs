//! High-level secret store client.
//!
//! [`VaultClient`] ties the lower layers together: it owns the HTTP
//! transport, keeps the session fresh through [`SessionManager`], shapes
//! paths and payloads for the configured KV version, and runs every
//! operation under the retry policy. Callers deal in logical secret paths
//! relative to the mount (`db01/<uuid>`); the full API path never leaks
//! out of this module.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use keywarden_core::{Config, SecretRecord, SecretString};

use crate::auth::AuthMethod;
use crate::error::{Result, VaultError};
use crate::kv::{self, KvVersion};
use crate::retry::{with_retry, RetryError, RetryPolicy};
use crate::session::SessionManager;
use crate::transport::Transport;

/// Client for a Vault-compatible secret store.
///
/// Cheap to share behind an `Arc`; all interior state is synchronized.
pub struct VaultClient {
    transport: Transport,
    session: Mutex<SessionManager>,
    policy: RetryPolicy,
    cancel: CancellationToken,
    mount: String,
    auth_mount: String,
    kv_version: KvVersion,
}

impl VaultClient {
    /// Build a client from configuration.
    ///
    /// Validates the address and KV version eagerly; credentials are only
    /// checked when the first operation needs a session.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Transport::new(&config.vault.address, config.vault.timeout())?;
        let method = AuthMethod::from_config(&config.vault);
        let kv_version = KvVersion::try_from(config.vault.kv_version)?;
        info!(
            address = %config.vault.address,
            mount = %config.vault.mount,
            auth = method.name(),
            "configured secret store client"
        );

        Ok(Self {
            transport,
            session: Mutex::new(SessionManager::new(method, config.vault.auth_mount.clone())),
            policy: RetryPolicy::from(&config.retry),
            cancel: CancellationToken::new(),
            mount: config.vault.mount.clone(),
            auth_mount: config.vault.auth_mount.clone(),
            kv_version,
        })
    }

    /// Use `cancel` to interrupt in-flight retry loops.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Override the retry policy from configuration.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read the secret record at `path`, relative to the mount.
    pub async fn read(&self, path: &str) -> Result<SecretRecord> {
        let api_path = kv::data_path(&self.mount, self.kv_version, path);
        debug!(path = %api_path, "reading secret");
        with_retry(&self.policy, &self.cancel, || self.attempt_read(&api_path))
            .await
            .map_err(|err| VaultError::read(path, flatten(err)))
    }

    /// Write `record` at `path`, replacing whatever is there.
    pub async fn write(&self, path: &str, record: &SecretRecord) -> Result<()> {
        let api_path = kv::data_path(&self.mount, self.kv_version, path);
        let body = kv::wrap_write(self.kv_version, record);
        debug!(path = %api_path, "writing secret");
        with_retry(&self.policy, &self.cancel, || self.attempt_write(&api_path, &body))
            .await
            .map_err(|err| VaultError::write(path, flatten(err)))
    }

    /// Delete the secret at `path`. Deleting a path that does not exist
    /// succeeds.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let api_path = kv::data_path(&self.mount, self.kv_version, path);
        debug!(path = %api_path, "deleting secret");
        with_retry(&self.policy, &self.cancel, || self.attempt_delete(&api_path))
            .await
            .map_err(|err| VaultError::delete(path, flatten(err)))
    }

    /// Mint a replacement secret_id for `role_name`.
    ///
    /// Only meaningful for AppRole authentication; fails with
    /// [`VaultError::NotApplicable`] before any network call otherwise.
    pub async fn rotate_secret_id(&self, role_name: &str) -> Result<RotatedSecretId> {
        self.require_approle("secret_id rotation").await?;
        let api_path = format!("auth/{}/role/{}/secret-id", self.auth_mount, role_name);
        let body = json!({});
        let rotated = with_retry(&self.policy, &self.cancel, || {
            self.attempt_rotate(&api_path, &body)
        })
        .await
        .map_err(flatten)?;
        info!(role = role_name, accessor = %rotated.secret_id_accessor, "minted new secret_id");
        Ok(rotated)
    }

    /// Look up lifetime metadata for the secret_id this client holds.
    pub async fn secret_id_info(&self, role_name: &str) -> Result<SecretIdInfo> {
        let secret_id = {
            let session = self.session.lock().await;
            match session.method() {
                AuthMethod::AppRole { secret_id, .. } => secret_id.clone(),
                AuthMethod::Token(_) => {
                    return Err(VaultError::NotApplicable("secret_id lookup"))
                }
            }
        };
        let api_path = format!(
            "auth/{}/role/{}/secret-id/lookup",
            self.auth_mount, role_name
        );
        let body = json!({ "secret_id": secret_id.expose_secret() });
        with_retry(&self.policy, &self.cancel, || {
            self.attempt_secret_id_lookup(&api_path, &body)
        })
        .await
        .map_err(flatten)
    }

    /// Look up metadata for the current session token.
    pub async fn token_info(&self) -> Result<TokenInfo> {
        self.require_approle("session inspection").await?;
        with_retry(&self.policy, &self.cancel, || self.attempt_token_info())
            .await
            .map_err(flatten)
    }

    /// Drop the current session and forget its token.
    pub async fn logout(&self) {
        let mut session = self.session.lock().await;
        session.clear(&self.transport).await;
    }

    async fn require_approle(&self, operation: &'static str) -> Result<()> {
        let session = self.session.lock().await;
        if session.method().is_approle() {
            Ok(())
        } else {
            Err(VaultError::NotApplicable(operation))
        }
    }

    /// Make sure the session token is usable, logging in or renewing as
    /// needed. The lock is held only for the check itself, not for the
    /// operation that follows.
    async fn ensure_session(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        session.ensure_valid(&self.transport).await
    }

    async fn attempt_read(&self, api_path: &str) -> Result<SecretRecord> {
        self.ensure_session().await?;
        let response = self.transport.get_json(api_path).await?;
        let data = response.data.ok_or(VaultError::MissingData("data payload"))?;
        kv::unwrap_read(self.kv_version, data)
    }

    async fn attempt_write(&self, api_path: &str, body: &Value) -> Result<()> {
        self.ensure_session().await?;
        self.transport.post_json(api_path, body).await?;
        Ok(())
    }

    async fn attempt_delete(&self, api_path: &str) -> Result<()> {
        self.ensure_session().await?;
        self.transport.delete(api_path).await
    }

    async fn attempt_rotate(&self, api_path: &str, body: &Value) -> Result<RotatedSecretId> {
        self.ensure_session().await?;
        let response = self
            .transport
            .post_json(api_path, body)
            .await?
            .ok_or(VaultError::MissingData("secret_id payload"))?;
        let data = response
            .data
            .ok_or(VaultError::MissingData("secret_id payload"))?;
        Ok(serde_json::from_value(data)?)
    }

    async fn attempt_secret_id_lookup(&self, api_path: &str, body: &Value) -> Result<SecretIdInfo> {
        self.ensure_session().await?;
        let response = self
            .transport
            .post_json(api_path, body)
            .await?
            .ok_or(VaultError::MissingData("secret_id metadata"))?;
        let data = response
            .data
            .ok_or(VaultError::MissingData("secret_id metadata"))?;
        Ok(serde_json::from_value(data)?)
    }

    async fn attempt_token_info(&self) -> Result<TokenInfo> {
        self.ensure_session().await?;
        let response = self.transport.get_json("auth/token/lookup-self").await?;
        let data = response
            .data
            .ok_or(VaultError::MissingData("token metadata"))?;
        Ok(serde_json::from_value(data)?)
    }
}

fn flatten(err: RetryError<VaultError>) -> VaultError {
    match err {
        RetryError::Cancelled => VaultError::Cancelled,
        RetryError::Exhausted { retries, source } => VaultError::RetryExhausted {
            retries,
            source: Box::new(source),
        },
    }
}

/// Replacement secret_id minted by [`VaultClient::rotate_secret_id`].
#[derive(Debug, Deserialize)]
pub struct RotatedSecretId {
    /// The new secret_id. Store it somewhere safe; it is shown once.
    pub secret_id: SecretString,
    /// Accessor for auditing or revoking the secret_id without holding it.
    pub secret_id_accessor: String,
}

/// Lifetime metadata for an AppRole secret_id.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretIdInfo {
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub secret_id_ttl: Option<u64>,
    #[serde(default)]
    pub secret_id_num_uses: Option<i64>,
}

/// Metadata for the current session token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub ttl: u64,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub expire_time: Option<DateTime<Utc>>,
}
