//! End-to-end volume lifecycle: the key record written during encrypt is
//! the one decrypt feeds back to the encryption tool.
//!
//! The store is a mock server and the device-facing collaborators are
//! stubs, so the test pins down exactly what crosses each seam: the JSON
//! written to the store, and the raw key bytes handed to the tool.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use wiremock::matchers::{method, path as url_path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use keywarden_cli::workflow::{
    decrypt_device, encrypt_device, secret_path, DecryptOptions, EncryptOptions,
};
use keywarden_core::record::KEY_SIZE;
use keywarden_disk::{DeviceResolver, EncryptionTool, KeyStaging, ServiceSupervisor};
use keywarden_integration_tests::{approle_config, mount_login};
use keywarden_vault::VaultClient;

const UUID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Encryption tool stub that records the key bytes it is given.
struct RecordingTool {
    key_seen: Arc<Mutex<Option<Vec<u8>>>>,
}

impl RecordingTool {
    fn new() -> Self {
        Self {
            key_seen: Arc::default(),
        }
    }

    fn key(&self) -> Vec<u8> {
        self.key_seen
            .lock()
            .unwrap()
            .clone()
            .expect("tool was never handed a key")
    }
}

#[async_trait]
impl EncryptionTool for RecordingTool {
    async fn format(
        &self,
        _device: &Path,
        _key_file: &Path,
        _uuid: &str,
    ) -> keywarden_disk::Result<()> {
        Ok(())
    }

    async fn open(
        &self,
        _device: &Path,
        key_file: &Path,
        _name: &str,
    ) -> keywarden_disk::Result<()> {
        *self.key_seen.lock().unwrap() = Some(std::fs::read(key_file).unwrap());
        Ok(())
    }
}

struct NoopSupervisor;

#[async_trait]
impl ServiceSupervisor for NoopSupervisor {
    async fn enable(&self, _unit: &str) -> keywarden_disk::Result<()> {
        Ok(())
    }

    async fn disable(&self, _unit: &str) -> keywarden_disk::Result<()> {
        Ok(())
    }
}

struct FixedResolver(PathBuf);

#[async_trait]
impl DeviceResolver for FixedResolver {
    async fn resolve(&self, _uuid: &str) -> keywarden_disk::Result<PathBuf> {
        Ok(self.0.clone())
    }
}

/// Responder that stores the request body so the test can replay it.
struct CaptureBody {
    body: Arc<Mutex<Option<serde_json::Value>>>,
}

impl Respond for CaptureBody {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        *self.body.lock().unwrap() = serde_json::from_slice(&request.body).ok();
        ResponseTemplate::new(204)
    }
}

#[tokio::test]
async fn test_encrypt_then_decrypt_round_trips_the_key() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let written: Arc<Mutex<Option<serde_json::Value>>> = Arc::default();
    Mock::given(method("POST"))
        .and(url_path(format!("/v1/secret/data/{}", secret_path(UUID))))
        .respond_with(CaptureBody {
            body: written.clone(),
        })
        .expect(1)
        .mount(&server)
        .await;

    let client = VaultClient::from_config(&approle_config(&server)).unwrap();
    let tmp = TempDir::new().unwrap();
    let staging = KeyStaging::new(tmp.path().join("staging"));

    let tool = RecordingTool::new();
    let uuid = encrypt_device(
        &client,
        &tool,
        &NoopSupervisor,
        &staging,
        EncryptOptions {
            device: PathBuf::from("/dev/vdb"),
            uuid: Some(UUID.to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(uuid, UUID);
    let encrypt_key = tool.key();
    assert_eq!(encrypt_key.len(), KEY_SIZE);

    // The store received a v2-wrapped record for the right device.
    let stored = written.lock().unwrap().take().expect("no record written");
    let record = stored["data"].clone();
    assert!(record["dmcrypt_key"].is_string());
    assert_eq!(record["device"], "/dev/vdb");

    // Serve that same record back and open the volume with it.
    Mock::given(method("GET"))
        .and(url_path(format!("/v1/secret/data/{}", secret_path(UUID))))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "data": record }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = RecordingTool::new();
    let resolver = FixedResolver(PathBuf::from("/dev/disk/by-uuid/resolved"));
    let device = decrypt_device(
        &client,
        &tool,
        &resolver,
        &staging,
        DecryptOptions {
            uuid: UUID.to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(device, PathBuf::from("/dev/disk/by-uuid/resolved"));
    assert_eq!(tool.key(), encrypt_key);

    // Both workflows cleaned their staged key files up.
    let leftovers = std::fs::read_dir(staging.dir())
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}
