//! Configuration loading and persistence.

use super::Config;
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::Path;
use url::Url;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&paths::config_file())
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        tracing::debug!(path = %path.display(), "loading configuration");
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the effective configuration for a CLI invocation.
    ///
    /// Precedence: explicit `--config` path, then `KEYWARDEN_CONFIG`, then the
    /// system default path. An explicitly named file must exist; a missing
    /// default file falls back to built-in defaults. Environment overrides are
    /// applied afterwards and the result is validated.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match env::get_var(env::vars::KEYWARDEN_CONFIG) {
                Some(path) => Self::load(Path::new(&path))?,
                None => Self::load_or_default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, falling back to defaults if
    /// no file exists.
    pub fn load_or_default() -> Self {
        match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => {
                tracing::debug!("no configuration file, using built-in defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Apply credential and address overrides from the environment.
    ///
    /// `VAULT_ADDR` and `VAULT_TOKEN` are honored so the standard store
    /// tooling and keywarden can share a shell session.
    pub fn apply_env_overrides(&mut self) {
        if let Some(address) = env::get_var(env::vars::VAULT_ADDR) {
            tracing::debug!(%address, "VAULT_ADDR override in effect");
            self.vault.address = address;
        }
        // Credential overrides are logged without their values.
        if let Some(token) = env::get_var(env::vars::VAULT_TOKEN) {
            tracing::debug!("VAULT_TOKEN override in effect");
            self.vault.token = Some(token.into());
        }
        if let Some(role_id) = env::get_var(env::vars::KEYWARDEN_ROLE_ID) {
            tracing::debug!("KEYWARDEN_ROLE_ID override in effect");
            self.vault.role_id = Some(role_id.into());
        }
        if let Some(secret_id) = env::get_var(env::vars::KEYWARDEN_SECRET_ID) {
            tracing::debug!("KEYWARDEN_SECRET_ID override in effect");
            self.vault.secret_id = Some(secret_id.into());
        }
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Store address must be a usable HTTP(S) URL
        match Url::parse(&self.vault.address) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    errors.push(format!(
                        "Store address '{}' must use http or https",
                        self.vault.address
                    ));
                }
            }
            Err(e) => {
                errors.push(format!(
                    "Invalid store address '{}': {}",
                    self.vault.address, e
                ));
            }
        }

        // 2. KV backend version
        if self.vault.kv_version != 1 && self.vault.kv_version != 2 {
            errors.push(format!(
                "kv_version must be 1 or 2, got {}",
                self.vault.kv_version
            ));
        }

        // 3. Mount points must not be empty
        if self.vault.mount.is_empty() {
            errors.push("KV mount must not be empty".to_string());
        }
        if self.vault.auth_mount.is_empty() {
            errors.push("Auth mount must not be empty".to_string());
        }

        // 4. Auth method consistency. Presence only: empty credential
        //    strings are a login-time failure, not a config failure.
        if self.vault.token.is_some()
            && (self.vault.role_id.is_some() || self.vault.secret_id.is_some())
        {
            errors.push(
                "Both a token and AppRole credentials are configured; choose one".to_string(),
            );
        }
        if self.vault.role_id.is_some() != self.vault.secret_id.is_some() {
            errors.push("role_id and secret_id must be configured together".to_string());
        }

        // 5. Timeout sanity
        if self.vault.timeout_secs == 0 {
            errors.push("Request timeout must be greater than 0 seconds".to_string());
        }

        // 6. Staging dir must be absolute
        if !self.staging.dir.is_absolute() {
            errors.push(format!(
                "Staging dir '{}' must be an absolute path",
                self.staging.dir.display()
            ));
        }

        // Return collected errors
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

/// Configuration builder for creating configs programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.vault.address = address.into();
        self
    }

    /// Set the KV mount point.
    pub fn mount(mut self, mount: impl Into<String>) -> Self {
        self.config.vault.mount = mount.into();
        self
    }

    /// Set the KV backend version.
    pub fn kv_version(mut self, version: u8) -> Self {
        self.config.vault.kv_version = version;
        self
    }

    /// Configure AppRole credentials.
    pub fn approle(
        mut self,
        role_id: impl Into<String>,
        secret_id: impl Into<String>,
    ) -> Self {
        self.config.vault.role_id = Some(role_id.into().into());
        self.config.vault.secret_id = Some(secret_id.into().into());
        self
    }

    /// Configure a static token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.vault.token = Some(token.into().into());
        self
    }

    /// Set the retry policy.
    pub fn retries(mut self, max_retries: u32, delay_secs: u64) -> Self {
        self.config.retry.max_retries = max_retries;
        self.config.retry.delay_secs = delay_secs;
        self
    }

    /// Set the key staging directory.
    pub fn staging_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.staging.dir = dir.into();
        self
    }

    /// Build the config.
    pub fn build(self) -> Config {
        self.config
    }

    /// Validate and build the config, returning an error if validation fails.
    pub fn build_validated(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
