use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::error::{Error, Result};
use crate::rpc::UpstreamClient;

/// JSON-RPC 2.0 client for a Solana-style endpoint.
pub struct HttpRpcClient {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl HttpRpcClient {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(HttpRpcClient {
            endpoint: endpoint.into(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self.http.post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {}", status)));
        }

        let envelope: RpcResponse = response.json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("{}: {}", method, e)))?;

        if let Some(err) = envelope.error {
            return Err(self.unavailable(format!("RPC error {}: {}", err.code, err.message)));
        }

        envelope.result
            .ok_or_else(|| Error::MalformedResponse(format!("{}: missing result", method)))
    }

    fn unavailable(&self, reason: String) -> Error {
        Error::EndpointUnavailable {
            endpoint: self.endpoint.clone(),
            reason,
        }
    }
}

#[async_trait]
impl UpstreamClient for HttpRpcClient {
    async fn probe(&self) -> Result<()> {
        let result = self.call("getLatestBlockhash", json!([{ "commitment": "finalized" }])).await?;

        match result.pointer("/value/blockhash") {
            Some(Value::String(_)) => Ok(()),
            _ => Err(Error::MalformedResponse("getLatestBlockhash: missing blockhash".to_string())),
        }
    }

    async fn account_exists(&self, address: &str) -> Result<bool> {
        let result = self.call("getAccountInfo", json!([address, { "encoding": "base64" }])).await?;

        match result.get("value") {
            None => Err(Error::MalformedResponse("getAccountInfo: missing value".to_string())),
            Some(Value::Null) => Ok(false),
            Some(account) => {
                let lamports = account.get("lamports")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| Error::MalformedResponse("getAccountInfo: missing lamports".to_string()))?;
                Ok(lamports > 0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> HttpRpcClient {
        HttpRpcClient::new(server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn probe_accepts_blockhash_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "getLatestBlockhash" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 250_000_000u64 },
                    "value": { "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N", "lastValidBlockHeight": 1000 }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).await.probe().await.unwrap();
    }

    #[tokio::test]
    async fn server_error_is_endpoint_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).await.probe().await.unwrap_err();
        assert!(matches!(err, Error::EndpointUnavailable { .. }));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn rpc_error_object_is_endpoint_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32005, "message": "Node is behind" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.probe().await.unwrap_err();
        match err {
            Error::EndpointUnavailable { reason, .. } => assert!(reason.contains("-32005")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.probe().await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn account_exists_reads_lamports() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "getAccountInfo", "params": ["funded", { "encoding": "base64" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": { "context": { "slot": 1 }, "value": { "lamports": 1_461_600u64, "owner": "Tokenkeg", "executable": false } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "getAccountInfo", "params": ["missing", { "encoding": "base64" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 2,
                "result": { "context": { "slot": 1 }, "value": null }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "getAccountInfo", "params": ["drained", { "encoding": "base64" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 3,
                "result": { "context": { "slot": 1 }, "value": { "lamports": 0 } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.account_exists("funded").await.unwrap());
        assert!(!client.account_exists("missing").await.unwrap());
        assert!(!client.account_exists("drained").await.unwrap());
    }
}
