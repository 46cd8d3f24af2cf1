//! PostgREST-style household table client
//!
//! Talks to a hosted table exposing `household_id` and `payload` columns:
//!
//! - fetch: `GET {endpoint}/rest/v1/{table}?household_id=eq.{id}&select=payload`
//! - upsert: `POST {endpoint}/rest/v1/{table}?on_conflict=household_id` with
//!   `Prefer: resolution=merge-duplicates`

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::crypto::Envelope;
use crate::error::{SyncError, SyncResult};

use super::{envelope_from_payload, RemoteConfig, RemoteStore};

/// A row as returned by `select=payload`
#[derive(Debug, Deserialize)]
struct PayloadRow {
    #[serde(default)]
    payload: serde_json::Value,
}

/// Remote store backed by a hosted REST table
#[derive(Debug, Clone)]
pub struct RestRemoteStore {
    config: RemoteConfig,
    client: Client,
}

impl RestRemoteStore {
    /// Build a client for `config`. An unconfigured store is valid and
    /// simply reports itself unavailable.
    pub fn new(config: RemoteConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// `{endpoint}/rest/v1/{table}`, keeping any base path on the endpoint
    fn table_url(&self) -> SyncResult<Url> {
        let mut url = self
            .config
            .endpoint
            .clone()
            .ok_or_else(|| SyncError::RemoteUnavailable("no endpoint configured".into()))?;
        if url.cannot_be_a_base() {
            return Err(SyncError::Config(format!("endpoint is not a base URL: {}", url)));
        }
        url.path_segments_mut()
            .map_err(|_| SyncError::Config("endpoint is not a base URL".into()))?
            .pop_if_empty()
            .extend(["rest", "v1", self.config.table.as_str()]);
        url.set_query(None);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn fetch(&self, household_id: &str) -> Option<Envelope> {
        if !self.is_available() {
            debug!("remote store not configured, skipping fetch");
            return None;
        }
        let url = match self.table_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "remote fetch skipped");
                return None;
            }
        };

        let filter = format!("eq.{}", household_id);
        let request = self
            .client
            .get(url)
            .query(&[("household_id", filter.as_str()), ("select", "payload")]);

        let response = match self.authorized(request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "remote fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "remote fetch rejected");
            return None;
        }

        let rows: Vec<PayloadRow> = match response.json().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "remote fetch returned an unreadable body");
                return None;
            }
        };

        let Some(row) = rows.into_iter().next() else {
            debug!("no remote row for household");
            return None;
        };

        let envelope = envelope_from_payload(row.payload);
        if envelope.is_none() {
            warn!("remote row does not hold an envelope");
        }
        envelope
    }

    async fn upsert(&self, household_id: &str, envelope: &Envelope) -> SyncResult<()> {
        if !self.is_available() {
            return Err(SyncError::RemoteUnavailable(
                "remote store not configured".into(),
            ));
        }
        let url = self.table_url()?;

        let payload = envelope
            .to_json()
            .map_err(|e| SyncError::RemoteWrite(format!("envelope not serializable: {}", e)))?;
        let body = json!({
            "household_id": household_id,
            "payload": payload,
        });

        let request = self
            .client
            .post(url)
            .query(&[("on_conflict", "household_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| SyncError::RemoteWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteWrite(format!(
                "upsert rejected with {}: {}",
                status,
                detail.trim()
            )));
        }

        debug!("remote upsert accepted");
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.config.is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request with `status` and `body`, returning the
    /// raw request text once it has been served
    async fn serve_once(status: &'static str, body: String) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        (Url::parse(&format!("http://{}", addr)).unwrap(), handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn request_body(request: &str) -> serde_json::Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    fn sealed() -> Envelope {
        crate::crypto::encrypt("pass", &json!({"buckets": [], "transactions": []})).unwrap()
    }

    fn store(endpoint: &str) -> RestRemoteStore {
        RestRemoteStore::new(RemoteConfig::new(Url::parse(endpoint).unwrap(), "key")).unwrap()
    }

    #[test]
    fn test_table_url() {
        let url = store("https://example.supabase.co").table_url().unwrap();
        assert_eq!(url.as_str(), "https://example.supabase.co/rest/v1/households");
    }

    #[test]
    fn test_table_url_keeps_base_path() {
        let url = store("https://proxy.example.com/budget/").table_url().unwrap();
        assert_eq!(url.as_str(), "https://proxy.example.com/budget/rest/v1/households");
    }

    #[test]
    fn test_custom_table() {
        let mut config = RemoteConfig::new(Url::parse("https://example.com").unwrap(), "key");
        config.table = "ledgers".into();
        let url = RestRemoteStore::new(config).unwrap().table_url().unwrap();
        assert!(url.as_str().ends_with("/rest/v1/ledgers"));
    }

    #[tokio::test]
    async fn test_unconfigured_store() {
        let store = RestRemoteStore::new(RemoteConfig::default()).unwrap();
        assert!(!store.is_available());
        assert!(store.fetch("household").await.is_none());

        let envelope = crate::crypto::encrypt("pass", &serde_json::json!({})).unwrap();
        let err = store.upsert("household", &envelope).await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_fetch_is_absent() {
        // Port 9 (discard) on loopback is not expected to serve HTTP
        let mut config = RemoteConfig::new(Url::parse("http://127.0.0.1:9").unwrap(), "key");
        config.timeout_secs = 1;
        let store = RestRemoteStore::new(config).unwrap();
        assert!(store.fetch("household").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_selects_household_row() {
        let envelope = sealed();
        let rows = json!([{"payload": envelope.to_json().unwrap()}]).to_string();
        let (endpoint, server) = serve_once("200 OK", rows).await;

        let fetched = RestRemoteStore::new(RemoteConfig::new(endpoint, "anon-key"))
            .unwrap()
            .fetch("smiths")
            .await;
        assert_eq!(fetched, Some(envelope));

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /rest/v1/households?"));
        assert!(request_line.contains("household_id=eq.smiths"));
        assert!(request_line.contains("select=payload"));
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("apikey: anon-key"));
        assert!(lower.contains("authorization: bearer anon-key"));
    }

    #[tokio::test]
    async fn test_fetch_payload_stored_as_text() {
        let envelope = sealed();
        let text = envelope.to_json().unwrap().to_string();
        let rows = json!([{ "payload": text }]).to_string();
        let (endpoint, server) = serve_once("200 OK", rows).await;

        let store = RestRemoteStore::new(RemoteConfig::new(endpoint, "key")).unwrap();
        assert_eq!(store.fetch("smiths").await, Some(envelope));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_empty_result_is_absent() {
        let (endpoint, server) = serve_once("200 OK", "[]".to_string()).await;
        let store = RestRemoteStore::new(RemoteConfig::new(endpoint, "key")).unwrap();
        assert!(store.fetch("smiths").await.is_none());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_absent() {
        let body = json!({"message": "JWT expired"}).to_string();
        let (endpoint, server) = serve_once("401 Unauthorized", body).await;
        let store = RestRemoteStore::new(RemoteConfig::new(endpoint, "key")).unwrap();
        assert!(store.fetch("smiths").await.is_none());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_upsert_request_shape() {
        let envelope = sealed();
        let (endpoint, server) = serve_once("201 Created", String::new()).await;

        RestRemoteStore::new(RemoteConfig::new(endpoint, "service-key"))
            .unwrap()
            .upsert("smiths", &envelope)
            .await
            .unwrap();

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("POST /rest/v1/households?on_conflict=household_id "));
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("prefer: resolution=merge-duplicates"));
        assert!(lower.contains("apikey: service-key"));
        assert!(lower.contains("content-type: application/json"));

        let body = request_body(&request);
        assert_eq!(body["household_id"], "smiths");
        assert_eq!(Envelope::from_json(body["payload"].clone()).unwrap(), envelope);
    }

    #[tokio::test]
    async fn test_upsert_rejection_is_a_remote_write_error() {
        let body = json!({"message": "permission denied for table households"}).to_string();
        let (endpoint, server) = serve_once("403 Forbidden", body).await;

        let err = RestRemoteStore::new(RemoteConfig::new(endpoint, "key"))
            .unwrap()
            .upsert("smiths", &sealed())
            .await
            .unwrap_err();
        match err {
            SyncError::RemoteWrite(detail) => {
                assert!(detail.contains("403"));
                assert!(detail.contains("permission denied"));
            }
            other => panic!("expected RemoteWrite, got {:?}", other),
        }
        server.await.unwrap();
    }
}
