//! Transaction source abstraction and its Alloy implementation
//!
//! Uses raw JSON requests for transaction fetching to support all EVM chains
//! including L2s like Optimism/Base that have non-standard transaction types.

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::B256;
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use anyhow::{Context, Result};
use tracing::debug;

use super::types::{parse_receipt, parse_transaction, FetchedReceipt, FetchedTransaction};

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Http("http://localhost:8545".to_string())
    }
}

/// Lookup of transactions and receipts by hash
///
/// Retries and transport details belong to the implementation; callers
/// only see found / not found / failed.
#[async_trait::async_trait]
pub trait TransactionSource: Send + Sync {
    /// Get a transaction by hash (chain-agnostic raw format)
    async fn get_transaction(&self, hash: B256) -> Result<Option<FetchedTransaction>>;

    /// Get a transaction receipt by hash; `None` while pending
    async fn get_receipt(&self, hash: B256) -> Result<Option<FetchedReceipt>>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Alloy-backed transaction source over HTTP, WebSocket or IPC
pub struct AlloyProvider {
    provider: FilledProvider,
    endpoint: String,
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<AlloyProvider> {
    let endpoint = config.display();
    let provider = match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            ProviderBuilder::new().connect_http(rpc_url)
        }
        ProviderConfig::WebSocket(url) => ProviderBuilder::new()
            .connect(&url)
            .await
            .context("Failed to create WebSocket provider")?,
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?
        }
    };
    Ok(AlloyProvider { provider, endpoint })
}

#[async_trait::async_trait]
impl TransactionSource for AlloyProvider {
    async fn get_transaction(&self, hash: B256) -> Result<Option<FetchedTransaction>> {
        debug!(%hash, endpoint = %self.endpoint, "eth_getTransactionByHash");
        let json: serde_json::Value = self
            .provider
            .raw_request("eth_getTransactionByHash".into(), (hash,))
            .await
            .context("eth_getTransactionByHash failed")?;

        if json.is_null() {
            return Ok(None);
        }
        Ok(Some(parse_transaction(&json)?))
    }

    async fn get_receipt(&self, hash: B256) -> Result<Option<FetchedReceipt>> {
        debug!(%hash, endpoint = %self.endpoint, "eth_getTransactionReceipt");
        let json: serde_json::Value = self
            .provider
            .raw_request("eth_getTransactionReceipt".into(), (hash,))
            .await
            .context("eth_getTransactionReceipt failed")?;

        if json.is_null() {
            return Ok(None);
        }
        Ok(Some(parse_receipt(&json)?))
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}
