//! Ethereum JSON-RPC client
//!
//! Communicates with a wallet provider using JSON-RPC 2.0 over HTTP. The
//! provider holds the user's keys (a local desktop signer or a development
//! node with unlocked accounts) and signs everything sent through
//! `eth_sendTransaction`.

use alloy_primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use polylend_core::{Confirmations, RemoteError, TxOutcome, WalletProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// Geth-style error code for a reverted call.
pub const EXECUTION_REVERTED: i64 = 3;
/// JSON-RPC: method not found.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Reads, receipt polls and anything else the node answers on its own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Methods that wait on a wallet prompt until the user answers it.
const PROMPT_TIMEOUT: Duration = Duration::from_secs(300);

fn request_timeout(method: &str) -> Duration {
    match method {
        "eth_requestAccounts" | "eth_sendTransaction" | "wallet_switchEthereumChain" => {
            PROMPT_TIMEOUT
        }
        _ => REQUEST_TIMEOUT,
    }
}

#[derive(Debug, Clone)]
pub struct EvmRpcClient {
    rpc_endpoint: String,
    client: Client,
    poll_interval: Duration,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response. A `null` result is meaningful (pending receipt),
/// so it is kept as `Value::Null` rather than treated as missing.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl EvmRpcClient {
    pub fn new(endpoint: impl Into<String>, poll_interval: Duration) -> Result<Self, ClientError> {
        let endpoint = endpoint.into();
        let rpc_endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint
        } else {
            format!("http://{}", endpoint)
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        log::info!("📡 JSON-RPC client initialized: {}", rpc_endpoint);

        Ok(Self {
            rpc_endpoint,
            client,
            poll_interval,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.rpc_endpoint
    }

    /// Send a JSON-RPC 2.0 request and return the result
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        log::debug!("→ RPC {}: {}", method, request.params);

        let response = self
            .client
            .post(&self.rpc_endpoint)
            .timeout(request_timeout(method))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::http(response.status().as_u16()));
        }

        let rpc_response: JsonRpcResponse = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse JSON-RPC response: {}", e))
        })?;

        if let Some(error) = rpc_response.error {
            return Err(ClientError::RpcError(error.code, error.message));
        }

        Ok(rpc_response.result)
    }

    /// Ask the provider for the user's accounts. Providers that only speak
    /// the pre-EIP-1102 dialect get `eth_accounts` instead.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let result = match self.rpc_call("eth_requestAccounts", json!([])).await {
            Err(ClientError::RpcError(METHOD_NOT_FOUND, _)) => {
                log::debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.rpc_call("eth_accounts", json!([])).await?
            }
            other => other?,
        };
        parse_accounts(result)
    }

    pub async fn chain_id(&self) -> Result<u64, ClientError> {
        let result = self.rpc_call("eth_chainId", json!([])).await?;
        parse_quantity(&result)
    }

    /// Read-only contract call against the latest block.
    pub async fn call(
        &self,
        to: Address,
        data: Bytes,
        from: Option<Address>,
    ) -> Result<Bytes, ClientError> {
        let mut tx = json!({ "to": to, "data": data });
        if let Some(from) = from {
            tx["from"] = json!(from);
        }
        let result = self.rpc_call("eth_call", json!([tx, "latest"])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Have the provider sign and broadcast a transaction.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<TxHash, ClientError> {
        let tx = json!({ "from": from, "to": to, "data": data });
        let result = self.rpc_call("eth_sendTransaction", json!([tx])).await?;
        let hash: TxHash = serde_json::from_value(result)?;
        log::info!("📤 Transaction submitted: {}", hash);
        Ok(hash)
    }

    /// `None` while the transaction is pending, otherwise whether it succeeded.
    pub async fn receipt_status(&self, tx: TxHash) -> Result<Option<bool>, ClientError> {
        let result = self
            .rpc_call("eth_getTransactionReceipt", json!([tx]))
            .await?;
        parse_receipt_status(&result)
    }

    /// Ask the provider to switch to another chain.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), ClientError> {
        self.rpc_call(
            "wallet_switchEthereumChain",
            json!([{ "chainId": format!("0x{:x}", chain_id) }]),
        )
        .await?;
        log::info!("🔀 Switched provider to chain {}", chain_id);
        Ok(())
    }
}

#[async_trait]
impl WalletProvider for EvmRpcClient {
    async fn request_accounts(&self) -> Result<Vec<Address>, RemoteError> {
        Ok(EvmRpcClient::request_accounts(self).await?)
    }

    async fn chain_id(&self) -> Result<u64, RemoteError> {
        Ok(EvmRpcClient::chain_id(self).await?)
    }
}

#[async_trait]
impl Confirmations for EvmRpcClient {
    async fn wait(&self, tx: TxHash) -> Result<TxOutcome, RemoteError> {
        loop {
            match self.receipt_status(tx).await? {
                Some(true) => return Ok(TxOutcome::Confirmed),
                Some(false) => return Ok(TxOutcome::Reverted),
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

// ============================================================================
// Response parsing
// ============================================================================

fn parse_accounts(result: Value) -> Result<Vec<Address>, ClientError> {
    Ok(serde_json::from_value(result)?)
}

/// Parse a hex `QUANTITY` such as `"0x13882"`.
fn parse_quantity(value: &Value) -> Result<u64, ClientError> {
    let s = value
        .as_str()
        .ok_or_else(|| ClientError::InvalidResponse(format!("expected quantity, got {}", value)))?;
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| ClientError::InvalidResponse(format!("quantity without 0x: {}", s)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|_| ClientError::InvalidResponse(format!("bad quantity: {}", s)))
}

fn parse_receipt_status(receipt: &Value) -> Result<Option<bool>, ClientError> {
    if receipt.is_null() {
        return Ok(None);
    }
    let status = receipt
        .get("status")
        .ok_or_else(|| ClientError::InvalidResponse("receipt has no status".into()))?;
    Ok(Some(parse_quantity(status)? == 1))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("RPC error {0}: {1}")]
    RpcError(i64, String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn http(status: u16) -> Self {
        let message = match status {
            400 => "Bad Request",
            401 => "Unauthorized",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown Error",
        };
        Self::Http(status, message.to_string())
    }
}

impl From<ClientError> for RemoteError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Request(_) | ClientError::Http(..) => RemoteError::Unavailable(e.to_string()),
            ClientError::RpcError(USER_REJECTED, _) => RemoteError::Rejected,
            ClientError::RpcError(code, message)
                if code == EXECUTION_REVERTED || message.to_lowercase().contains("revert") =>
            {
                RemoteError::Reverted(message)
            }
            other => RemoteError::Other(other.to_string()),
        }
    }
}
