//! etcd Store
//!
//! Talks to etcd through its v3 JSON gateway. Keys and values travel
//! base64-encoded. Create and update are single-key transactions guarded
//! on the key's create revision, so a create never overwrites and an update
//! never resurrects a deleted key.

use super::{KvRequest, KvResponse, KvStore};
use crate::config::DatabaseConfig;
use crate::error::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

type Result<T, E = Error> = std::result::Result<T, E>;

// =============================================================================
// Gateway Messages
// =============================================================================

#[derive(Debug, Serialize)]
struct RangeRequest {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    range_end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RangeResponse {
    kvs: Vec<KeyValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyValue {
    key: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct TxnRequest {
    compare: Vec<Compare>,
    success: Vec<RequestOp>,
}

#[derive(Debug, Serialize)]
struct Compare {
    key: String,
    target: &'static str,
    result: &'static str,
    create_revision: String,
}

#[derive(Debug, Serialize)]
struct RequestOp {
    request_put: PutRequest,
}

#[derive(Debug, Serialize)]
struct PutRequest {
    key: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TxnResponse {
    succeeded: bool,
}

#[derive(Debug, Serialize)]
struct DeleteRangeRequest {
    key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteRangeResponse {
    // int64 fields are strings on the gateway
    deleted: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    name: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthResponse {
    token: String,
}

// =============================================================================
// etcd Store
// =============================================================================

/// [`KvStore`] backed by an etcd cluster
pub struct EtcdStore {
    client: reqwest::Client,
    endpoints: Vec<String>,
    username: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl EtcdStore {
    /// Build a client for the configured endpoints; no connection is made yet
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.endpoints.is_empty() {
            return Err(Error::Configuration(
                "etcd requires at least one endpoint".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoints: config
                .endpoints
                .iter()
                .map(|e| e.trim_end_matches('/').to_string())
                .collect(),
            username: config.username.clone(),
            password: config.password.clone(),
            token: RwLock::new(None),
        })
    }

    async fn authenticate(&self, endpoint: &str) -> Result<Option<String>, String> {
        if self.username.is_empty() {
            return Ok(None);
        }
        let cached = self.token.read().clone();
        if let Some(token) = cached {
            return Ok(Some(token));
        }
        let resp: AuthResponse = self
            .send(
                endpoint,
                "/v3/auth/authenticate",
                &AuthRequest {
                    name: &self.username,
                    password: &self.password,
                },
                None,
            )
            .await?;
        *self.token.write() = Some(resp.token.clone());
        Ok(Some(resp.token))
    }

    async fn send<B, R>(
        &self,
        endpoint: &str,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<R, String>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let mut builder = self.client.post(format!("{}{}", endpoint, path)).json(body);
        if let Some(token) = token {
            builder = builder.header("Authorization", token);
        }
        let resp = builder.send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                *self.token.write() = None;
            }
            return Err(format!("etcd returned {}: {}", status, text));
        }
        resp.json::<R>().await.map_err(|e| e.to_string())
    }

    /// Post to each endpoint in turn until one answers
    async fn call<B, R>(&self, path: &str, body: &B) -> Result<R, String>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let mut last_error = String::new();
        for endpoint in &self.endpoints {
            let token = match self.authenticate(endpoint).await {
                Ok(token) => token,
                Err(e) => {
                    warn!("etcd authentication against {} failed: {}", endpoint, e);
                    last_error = e;
                    continue;
                }
            };
            match self.send(endpoint, path, body, token.as_deref()).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    warn!("etcd call {} on {} failed: {}", path, endpoint, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn guarded_put(&self, key: &str, value: &Bytes, must_exist: bool) -> Result<bool, String> {
        let encoded_key = STANDARD.encode(key);
        let request = TxnRequest {
            compare: vec![Compare {
                key: encoded_key.clone(),
                target: "CREATE",
                result: if must_exist { "GREATER" } else { "EQUAL" },
                create_revision: "0".to_string(),
            }],
            success: vec![RequestOp {
                request_put: PutRequest {
                    key: encoded_key,
                    value: STANDARD.encode(value),
                },
            }],
        };
        let resp: TxnResponse = self.call("/v3/kv/txn", &request).await?;
        Ok(resp.succeeded)
    }

    async fn range(&self, key: &str, prefix: bool) -> Result<Vec<Bytes>, String> {
        let request = RangeRequest {
            key: STANDARD.encode(key),
            range_end: prefix.then(|| STANDARD.encode(prefix_range_end(key.as_bytes()))),
        };
        let resp: RangeResponse = self.call("/v3/kv/range", &request).await?;
        resp.kvs
            .into_iter()
            .map(|kv| {
                STANDARD
                    .decode(kv.value.as_bytes())
                    .map(Bytes::from)
                    .map_err(|e| format!("invalid value encoding for {}: {}", kv.key, e))
            })
            .collect()
    }
}

/// Smallest key greater than every key starting with `prefix`
fn prefix_range_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last < 0xff {
            *last += 1;
            return end;
        }
        end.pop();
    }
    // all 0xff: range to the end of the keyspace
    vec![0]
}

#[async_trait]
impl KvStore for EtcdStore {
    fn name(&self) -> &str {
        "etcd"
    }

    async fn create(&self, request: KvRequest) -> KvResponse {
        debug!("etcd create {}", request.url);
        match self.guarded_put(&request.url, &request.content, false).await {
            Ok(true) => KvResponse::success(vec![request.content]),
            Ok(false) => KvResponse::failure(format!("key already exists: {}", request.url)),
            Err(e) => {
                error!("etcd create {} failed: {}", request.url, e);
                KvResponse::failure(e)
            }
        }
    }

    async fn get(&self, request: KvRequest) -> KvResponse {
        match self.range(&request.url, false).await {
            Ok(values) if values.is_empty() => {
                KvResponse::not_found(format!("key not found: {}", request.url))
            }
            Ok(values) => KvResponse::success(values),
            Err(e) => {
                error!("etcd get {} failed: {}", request.url, e);
                KvResponse::failure(e)
            }
        }
    }

    async fn list(&self, request: KvRequest) -> KvResponse {
        match self.range(&request.url, true).await {
            Ok(values) => KvResponse::success(values),
            Err(e) => {
                error!("etcd list {} failed: {}", request.url, e);
                KvResponse::failure(e)
            }
        }
    }

    async fn update(&self, request: KvRequest) -> KvResponse {
        debug!("etcd update {}", request.url);
        match self.guarded_put(&request.url, &request.new_content, true).await {
            Ok(true) => KvResponse::success(vec![request.new_content]),
            Ok(false) => KvResponse::not_found(format!("key not found: {}", request.url)),
            Err(e) => {
                error!("etcd update {} failed: {}", request.url, e);
                KvResponse::failure(e)
            }
        }
    }

    async fn delete(&self, request: KvRequest) -> KvResponse {
        debug!("etcd delete {}", request.url);
        let body = DeleteRangeRequest {
            key: STANDARD.encode(&request.url),
        };
        match self
            .call::<_, DeleteRangeResponse>("/v3/kv/deleterange", &body)
            .await
        {
            Ok(resp) => {
                let deleted = resp
                    .deleted
                    .as_deref()
                    .and_then(|d| d.parse::<i64>().ok())
                    .unwrap_or(0);
                if deleted > 0 {
                    KvResponse::success(Vec::new())
                } else {
                    KvResponse::not_found(format!("key not found: {}", request.url))
                }
            }
            Err(e) => {
                error!("etcd delete {} failed: {}", request.url, e);
                KvResponse::failure(e)
            }
        }
    }
}
