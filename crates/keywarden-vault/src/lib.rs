//! # keywarden-vault
//!
//! Client for the Vault-compatible secret store that holds dm-crypt keys.
//!
//! The crate is layered:
//!
//! - [`transport`] speaks HTTP and knows about token headers and error
//!   bodies, nothing else
//! - [`auth`] and [`session`] turn configured credentials into a session
//!   token and keep it fresh
//! - [`kv`] isolates the v1/v2 KV backend differences
//! - [`retry`] runs operations under a fixed-delay retry policy with
//!   cooperative cancellation
//! - [`client`] composes the above into [`VaultClient`], the type the rest
//!   of Keywarden uses

pub mod auth;
pub mod client;
pub mod error;
pub mod kv;
pub mod retry;
pub mod session;
pub mod transport;

pub use auth::AuthMethod;
pub use client::{RotatedSecretId, SecretIdInfo, TokenInfo, VaultClient};
pub use error::{AuthError, Result, VaultError};
pub use kv::KvVersion;
pub use retry::{with_retry, RetryError, RetryPolicy};
pub use session::{SessionCredential, SessionManager, SessionState, SAFETY_BUFFER};
pub use transport::{AuthPayload, Transport, VaultResponse};
