//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Common environment variable names.
pub mod vars {
    /// Store address override (shared with the standard Vault tooling).
    pub const VAULT_ADDR: &str = "VAULT_ADDR";

    /// Static store token override.
    pub const VAULT_TOKEN: &str = "VAULT_TOKEN";

    /// AppRole role_id override.
    pub const KEYWARDEN_ROLE_ID: &str = "KEYWARDEN_ROLE_ID";

    /// AppRole secret_id override.
    pub const KEYWARDEN_SECRET_ID: &str = "KEYWARDEN_SECRET_ID";

    /// Config file override.
    pub const KEYWARDEN_CONFIG: &str = "KEYWARDEN_CONFIG";

    /// Log filter directive.
    pub const KEYWARDEN_LOG: &str = "KEYWARDEN_LOG";
}
