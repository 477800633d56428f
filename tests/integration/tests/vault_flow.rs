//! Store client lifecycle tests against a mock Vault-compatible server.
//!
//! These walk a key record through its whole life on both KV versions:
//! write, read back, delete, and confirm the subsequent read reports
//! not-found.

use keywarden_core::record::KeyRecord;
use keywarden_core::ConfigBuilder;
use keywarden_integration_tests::{approle_config, mount_login};
use keywarden_vault::{AuthError, VaultClient, VaultError};
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET_PATH: &str = "db01/vol1";

#[tokio::test]
async fn test_kv2_lifecycle_write_read_delete() {
    let record = KeyRecord::generate("/dev/vdb");
    let map = record.to_record();

    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/secret/data/db01/vol1"))
        .and(body_json(serde_json::json!({ "data": &map })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    // The first read is served the stored record; once this mock is
    // consumed the later 404 mock takes over.
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/db01/vol1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "data": &map,
                "metadata": { "version": 1 },
            }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/secret/data/db01/vol1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/db01/vol1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = VaultClient::from_config(&approle_config(&server)).unwrap();

    client.write(SECRET_PATH, &map).await.unwrap();

    let got = client.read(SECRET_PATH).await.unwrap();
    assert_eq!(got, map);
    let parsed = KeyRecord::from_record(&got).unwrap();
    assert_eq!(
        parsed.decode_key().unwrap().as_slice(),
        record.decode_key().unwrap().as_slice()
    );

    client.delete(SECRET_PATH).await.unwrap();

    let err = client.read(SECRET_PATH).await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err}");
}

#[tokio::test]
async fn test_kv1_lifecycle_uses_flat_paths() {
    let record = KeyRecord::generate("/dev/vdc");
    let map = record.to_record();

    let server = MockServer::start().await;
    mount_login(&server).await;
    // No /data/ segment and no envelope on KV v1.
    Mock::given(method("POST"))
        .and(path("/v1/kv/db01/vol1"))
        .and(body_json(&map))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/db01/vol1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": &map })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/kv/db01/vol1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/db01/vol1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    // Anything the mocks above did not claim is a wrong path.
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = ConfigBuilder::new()
        .address(server.uri())
        .mount("kv")
        .kv_version(1)
        .approle("role-1", "secret-1")
        .retries(0, 0)
        .build();
    let client = VaultClient::from_config(&config).unwrap();

    client.write(SECRET_PATH, &map).await.unwrap();
    let got = client.read(SECRET_PATH).await.unwrap();
    assert_eq!(got, map);
    client.delete(SECRET_PATH).await.unwrap();

    let err = client.read(SECRET_PATH).await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err}");
}

#[tokio::test]
async fn test_empty_secret_id_never_reaches_the_store() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = ConfigBuilder::new()
        .address(server.uri())
        .approle("role-1", "")
        .retries(0, 0)
        .build();
    let client = VaultClient::from_config(&config).unwrap();

    let err = client.read(SECRET_PATH).await.unwrap_err();
    assert!(err.to_string().contains("secret_id is empty"), "got: {err}");
    match err {
        VaultError::Read { source, .. } => match *source {
            VaultError::RetryExhausted { retries: 0, source } => {
                assert!(matches!(*source, VaultError::Auth(AuthError::EmptySecretId)))
            }
            other => panic!("unexpected inner error: {other}"),
        },
        other => panic!("unexpected error: {other}"),
    }
}
