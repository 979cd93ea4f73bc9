//! Ethereum infrastructure - Alloy provider implementation

mod provider;
pub(crate) mod types;

pub use provider::{create_provider, AlloyProvider, ProviderConfig, TransactionSource};
pub use types::{FetchedReceipt, FetchedTransaction};
