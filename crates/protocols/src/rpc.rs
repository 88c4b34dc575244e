//! JSON-RPC access to the ledger node.

use crate::abi::{from_hex, parse_quantity, to_hex};
use crate::confirmation::{ReceiptSource, TransactionReceipt, TxHash};
use crate::error::LedgerError;
use amm_swap_domain::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Configuration for the RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// HTTP endpoint of the node.
    pub url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Raw JSON-RPC request channel.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends one request and returns its `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    fn into_ledger_error(self) -> LedgerError {
        let message = match self.data {
            Some(Value::String(data)) => format!("{} ({data})", self.message),
            _ => self.message,
        };
        LedgerError::from_rpc(self.code, message)
    }
}

/// HTTP transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Creates a transport for the configured endpoint.
    ///
    /// # Errors
    /// Returns `LedgerError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &RpcConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "Sending RPC request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transport(format!(
                "{method}: HTTP {status}"
            )));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(error.into_ledger_error());
        }
        Ok(body.result.unwrap_or(Value::Null))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    gas_used: Option<String>,
}

impl RawReceipt {
    fn parse(self) -> Result<TransactionReceipt, LedgerError> {
        let hash: TxHash = self.transaction_hash.parse()?;
        let block_number = self
            .block_number
            .as_deref()
            .map(parse_quantity)
            .transpose()?
            .map(|n| n.low_u64());
        // Pre-Byzantium receipts have no status; treat them as successful.
        let success = match self.status.as_deref() {
            Some(s) => !parse_quantity(s)?.is_zero(),
            None => true,
        };
        let gas_used = self
            .gas_used
            .as_deref()
            .map(parse_quantity)
            .transpose()?
            .map(|g| g.low_u64());

        Ok(TransactionReceipt {
            hash,
            block_number,
            success,
            gas_used,
        })
    }
}

/// Typed ledger calls over a [`RpcTransport`].
#[derive(Clone)]
pub struct RpcProvider {
    transport: Arc<dyn RpcTransport>,
}

impl RpcProvider {
    /// Creates a provider over any transport.
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    /// Creates a provider over HTTP.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn http(config: &RpcConfig) -> Result<Self, LedgerError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let value = self.transport.request(method, params).await?;
        serde_json::from_value(value).map_err(|e| LedgerError::Decode(format!("{method}: {e}")))
    }

    /// Executes a read-only call against the latest block.
    pub async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, LedgerError> {
        let result: String = self
            .request(
                "eth_call",
                json!([{ "to": to.to_string(), "data": to_hex(data) }, "latest"]),
            )
            .await?;
        from_hex(&result)
    }

    /// Submits a transaction for the wallet endpoint to sign.
    ///
    /// Returns as soon as the node accepts it; the transaction is not yet
    /// confirmed.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<TxHash, LedgerError> {
        let result: String = self
            .request(
                "eth_sendTransaction",
                json!([{
                    "from": from.to_string(),
                    "to": to.to_string(),
                    "data": to_hex(data),
                }]),
            )
            .await?;
        result.parse()
    }

    /// Fetches a receipt; `None` while the transaction is pending.
    pub async fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, LedgerError> {
        let raw: Option<RawReceipt> = self
            .request("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        raw.map(RawReceipt::parse).transpose()
    }

    /// Asks the wallet endpoint to authorize account access.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        self.request("eth_requestAccounts", json!([])).await
    }

    /// Lists accounts already authorized on the endpoint.
    pub async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
        self.request("eth_accounts", json!([])).await
    }
}

#[async_trait]
impl ReceiptSource for RpcProvider {
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, LedgerError> {
        self.get_transaction_receipt(hash).await
    }
}
