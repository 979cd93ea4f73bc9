//! Transaction view - fetches a transaction, decodes it and builds the display model

mod details;
mod table;

use alloy::primitives::B256;
use anyhow::{Context, Result};
use tracing::debug;

use crate::config::CurrencyConfig;
use crate::domain::abi::{CallDecoder, InterfaceRegistry};
use crate::infrastructure::ethereum::TransactionSource;

pub use details::{
    argument_rows, format_amount, ArgumentRow, FunctionCalled, Recipient, TransactionDetails,
};
pub use table::{render_arguments, render_details, DetailTable};

/// The transaction page: every collaborator is passed in, none is global
pub struct TransactionPage<'a> {
    source: &'a dyn TransactionSource,
    decoder: &'a dyn CallDecoder,
    interfaces: &'a InterfaceRegistry,
    currency: CurrencyConfig,
}

impl<'a> TransactionPage<'a> {
    pub fn new(
        source: &'a dyn TransactionSource,
        decoder: &'a dyn CallDecoder,
        interfaces: &'a InterfaceRegistry,
        currency: CurrencyConfig,
    ) -> Self {
        Self {
            source,
            decoder,
            interfaces,
            currency,
        }
    }

    /// Fetch the transaction and its receipt, then decode the call
    pub async fn load(&self, hash: B256) -> Result<TransactionDetails> {
        let tx = self
            .source
            .get_transaction(hash)
            .await?
            .with_context(|| {
                format!("transaction {hash} not found on {}", self.source.endpoint_name())
            })?;
        let receipt = self.source.get_receipt(hash).await?;
        if receipt.is_none() {
            debug!(%hash, "no receipt yet");
        }

        let decoded = self.decoder.decode(&tx.as_raw(), self.interfaces);
        Ok(TransactionDetails::build(
            &tx,
            receipt.as_ref(),
            &decoded,
            &self.currency,
        ))
    }
}

/// Parse a 0x-prefixed 32-byte transaction hash
pub fn parse_tx_hash(input: &str) -> Result<B256> {
    let trimmed = input.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(payload).with_context(|| format!("invalid hex in hash '{input}'"))?;
    anyhow::ensure!(bytes.len() == 32, "hash must be 32 bytes, got {}", bytes.len());
    Ok(B256::from_slice(&bytes))
}
