//! Display model of one transaction

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;
use serde::Serialize;

use crate::config::CurrencyConfig;
use crate::domain::abi::{DecodeError, DecodedCall, UnknownReason};
use crate::infrastructure::abi::format_dyn_sol_value;
use crate::infrastructure::ethereum::{FetchedReceipt, FetchedTransaction};

/// Destination column of the detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum Recipient {
    Address(String),
    ContractCreation(String),
    /// Creation transaction whose receipt is not available yet
    Pending,
}

/// What the transaction called, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionCalled {
    NoCall,
    Unknown {
        selector: String,
        reason: String,
    },
    Function {
        name: String,
        signature: String,
        selector: String,
        arg_names: Vec<String>,
    },
    DecodeFailed {
        selector: Option<String>,
        error: String,
    },
}

impl FunctionCalled {
    pub fn from_result(input: &[u8], decoded: &Result<DecodedCall, DecodeError>) -> Self {
        match decoded {
            Ok(DecodedCall::NoCall) => FunctionCalled::NoCall,
            Ok(DecodedCall::Unknown { selector, reason }) => FunctionCalled::Unknown {
                selector: format!("0x{}", hex::encode(selector)),
                reason: match reason {
                    UnknownReason::NoInterface => "no known interface at destination",
                    UnknownReason::SelectorNotFound => "selector not in contract interface",
                }
                .to_string(),
            },
            Ok(DecodedCall::Function(call)) => FunctionCalled::Function {
                name: call.function_name.clone(),
                signature: call.signature.clone(),
                selector: call.selector_hex(),
                arg_names: call.arg_names().into_iter().map(str::to_string).collect(),
            },
            Err(err) => FunctionCalled::DecodeFailed {
                selector: input.get(..4).map(|s| format!("0x{}", hex::encode(s))),
                error: err.to_string(),
            },
        }
    }

    /// One-line summary, e.g. `transfer(to,amount) [0xa9059cbb]`
    pub fn summary(&self) -> String {
        match self {
            FunctionCalled::NoCall => "This transaction did not call any function.".to_string(),
            FunctionCalled::Unknown { selector, reason } => {
                format!("Unknown function [{selector}] ({reason})")
            }
            FunctionCalled::Function {
                name,
                selector,
                arg_names,
                ..
            } => format!("{}({}) [{}]", name, arg_names.join(","), selector),
            FunctionCalled::DecodeFailed { selector, error } => match selector {
                Some(selector) => format!("Malformed call data [{selector}]: {error}"),
                None => format!("Malformed call data: {error}"),
            },
        }
    }
}

/// One row of the argument table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentRow {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Everything the transaction view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDetails {
    pub hash: String,
    /// `None` while pending
    pub block_number: Option<u64>,
    pub from: String,
    pub to: Recipient,
    pub value: String,
    pub function: FunctionCalled,
    pub arguments: Vec<ArgumentRow>,
    pub gas_price: Option<String>,
    pub status: Option<String>,
    pub data: String,
}

impl TransactionDetails {
    pub fn build(
        tx: &FetchedTransaction,
        receipt: Option<&FetchedReceipt>,
        decoded: &Result<DecodedCall, DecodeError>,
        currency: &CurrencyConfig,
    ) -> Self {
        let to = match (tx.to, receipt.and_then(|r| r.contract_address)) {
            (_, Some(created)) => Recipient::ContractCreation(created.to_checksum(None)),
            (Some(to), None) => Recipient::Address(to.to_checksum(None)),
            (None, None) => Recipient::Pending,
        };

        let gas_price = tx
            .gas_price
            .or_else(|| receipt.and_then(|r| r.effective_gas_price))
            .map(|price| format!("{} Gwei", format_amount(price, 9)));

        let status = receipt.and_then(|r| r.status).map(|ok| {
            if ok {
                "Success".to_string()
            } else {
                "Reverted".to_string()
            }
        });

        Self {
            hash: tx.hash.to_string(),
            block_number: tx.block_number,
            from: tx.from.to_checksum(None),
            to,
            value: format!(
                "{} {}",
                format_amount(tx.value, currency.decimals),
                currency.symbol
            ),
            function: FunctionCalled::from_result(&tx.input, decoded),
            arguments: argument_rows(decoded),
            gas_price,
            status,
            data: tx.input.to_string(),
        }
    }
}

/// Argument table rows; empty unless a function matched
pub fn argument_rows(decoded: &Result<DecodedCall, DecodeError>) -> Vec<ArgumentRow> {
    match decoded {
        Ok(DecodedCall::Function(call)) => call
            .arguments
            .iter()
            .map(|arg| ArgumentRow {
                name: arg.name.clone(),
                kind: arg.kind.clone(),
                value: format_dyn_sol_value(&arg.value),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Format an integer amount in a decimal unit, trimming trailing zeros but
/// keeping one fractional digit (`1.0`, `0.25`)
pub fn format_amount(amount: U256, decimals: u8) -> String {
    let Ok(formatted) = format_units(amount, decimals) else {
        return amount.to_string();
    };
    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => format!("{formatted}.0"),
    }
}
