//! ============================================================================
//! HTTP EVM Provider - JSON-RPC 2.0 over HTTP
//! ============================================================================
//! Lets a node or signer endpoint (anvil, geth --dev, a remote signer) stand
//! in for a browser-injected provider.
//! ============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::{EvmCapabilities, EvmProvider, ProviderError, RequestArguments};

/// JSON-RPC "internal error" used when the transport itself fails
const TRANSPORT_ERROR_CODE: i64 = -32603;

/// EVM provider backed by a JSON-RPC HTTP endpoint
pub struct HttpEvmProvider {
    client: reqwest::Client,
    url: String,
    capabilities: EvmCapabilities,
    next_id: AtomicU64,
}

impl HttpEvmProvider {
    pub fn new(url: impl Into<String>, capabilities: EvmCapabilities) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            capabilities,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EvmProvider for HttpEvmProvider {
    fn capabilities(&self) -> EvmCapabilities {
        self.capabilities
    }

    async fn request(&self, args: RequestArguments) -> Result<serde_json::Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method: &args.method,
            params: args.params.as_deref().unwrap_or(&[]),
        };

        debug!("JSON-RPC {} (id {}) -> {}", args.method, id, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::with_code(TRANSPORT_ERROR_CODE, format!("RPC transport error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::with_code(
                TRANSPORT_ERROR_CODE,
                format!("RPC HTTP error {}: {}", status, text),
            ));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::with_code(TRANSPORT_ERROR_CODE, format!("Invalid RPC response: {}", e)))?;

        into_result(parsed)
    }
}

/// Map a JSON-RPC envelope onto the provider result
fn into_result(response: RpcResponse) -> Result<serde_json::Value, ProviderError> {
    if let Some(error) = response.error {
        return Err(ProviderError::with_code(error.code, error.message));
    }
    Ok(response.result.unwrap_or(serde_json::Value::Null))
}

// ============================================================================
// JSON-RPC Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [serde_json::Value],
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}
