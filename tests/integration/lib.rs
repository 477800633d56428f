//! Shared fixtures for the keywarden integration tests.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keywarden_core::{Config, ConfigBuilder};

/// Session token handed out by [`mount_login`].
pub const SESSION_TOKEN: &str = "s.integration";

/// Mount the standard AppRole login endpoint on `server`.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "auth": {
                "client_token": SESSION_TOKEN,
                "lease_duration": 3600,
                "renewable": true,
            }
        })))
        .mount(server)
        .await;
}

/// AppRole configuration pointing at `server`, with retry delays removed
/// so failure tests finish quickly.
pub fn approle_config(server: &MockServer) -> Config {
    ConfigBuilder::new()
        .address(server.uri())
        .approle("role-1", "secret-1")
        .retries(0, 0)
        .build()
}
