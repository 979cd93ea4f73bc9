//! Conversions from raw JSON-RPC objects to chain-agnostic types
//!
//! Fields are read straight from the JSON so that transaction shapes of any
//! EVM chain (including L2 deposit types) parse.

use std::str::FromStr;

use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::abi::RawTransaction;

/// Transaction data parsed from `eth_getTransactionByHash`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTransaction {
    pub hash: B256,
    /// `None` while pending
    pub block_number: Option<u64>,
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub gas: u64,
    pub gas_price: Option<U256>,
    pub nonce: u64,
    pub tx_type: Option<u8>,
}

impl FetchedTransaction {
    /// The destination and call data, as the decoder sees them
    pub fn as_raw(&self) -> RawTransaction {
        RawTransaction::new(self.to, self.input.clone())
    }
}

/// Receipt data parsed from `eth_getTransactionReceipt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedReceipt {
    /// `None` on pre-Byzantium receipts
    pub status: Option<bool>,
    pub gas_used: u64,
    pub effective_gas_price: Option<U256>,
    /// Set when the transaction created a contract
    pub contract_address: Option<Address>,
}

/// Parse a single transaction from JSON
pub fn parse_transaction(json: &Value) -> Result<FetchedTransaction> {
    let hash = B256::from_str(str_field(json, "hash")?).context("invalid tx hash")?;
    let from = Address::from_str(str_field(json, "from")?).context("invalid from address")?;
    let to = opt_str_field(json, "to")
        .map(Address::from_str)
        .transpose()
        .context("invalid to address")?;

    let value = opt_str_field(json, "value")
        .map(parse_hex_u256)
        .transpose()?
        .unwrap_or(U256::ZERO);

    let input_str = opt_str_field(json, "input").unwrap_or("0x");
    let input = Bytes::from(
        hex::decode(input_str.strip_prefix("0x").unwrap_or(input_str))
            .context("invalid input hex")?,
    );

    let block_number = opt_str_field(json, "blockNumber")
        .map(parse_hex_u64)
        .transpose()?;
    let gas = opt_str_field(json, "gas").map(parse_hex_u64).transpose()?.unwrap_or(0);
    let gas_price = opt_str_field(json, "gasPrice").map(parse_hex_u256).transpose()?;
    let nonce = opt_str_field(json, "nonce").map(parse_hex_u64).transpose()?.unwrap_or(0);

    let tx_type = opt_str_field(json, "type")
        .and_then(|s| parse_hex_u64(s).ok())
        .and_then(|n| u8::try_from(n).ok());

    Ok(FetchedTransaction {
        hash,
        block_number,
        from,
        to,
        value,
        input,
        gas,
        gas_price,
        nonce,
        tx_type,
    })
}

/// Parse a receipt from JSON
pub fn parse_receipt(json: &Value) -> Result<FetchedReceipt> {
    let status = opt_str_field(json, "status")
        .map(parse_hex_u64)
        .transpose()?
        .map(|s| s == 1);
    let gas_used = opt_str_field(json, "gasUsed")
        .map(parse_hex_u64)
        .transpose()?
        .unwrap_or(0);
    let effective_gas_price = opt_str_field(json, "effectiveGasPrice")
        .map(parse_hex_u256)
        .transpose()?;
    let contract_address = opt_str_field(json, "contractAddress")
        .map(Address::from_str)
        .transpose()
        .context("invalid contract address")?;

    Ok(FetchedReceipt {
        status,
        gas_used,
        effective_gas_price,
        contract_address,
    })
}

fn str_field<'a>(json: &'a Value, key: &str) -> Result<&'a str> {
    opt_str_field(json, key).with_context(|| format!("missing field '{key}'"))
}

/// String field, treating JSON null as absent
fn opt_str_field<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    json.get(key).and_then(|v| v.as_str())
}

/// Parse hex string to u64
pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).context("Failed to parse hex u64")
}

/// Parse hex string to U256
pub fn parse_hex_u256(s: &str) -> Result<U256> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(s, 16).context("Failed to parse hex U256")
}
