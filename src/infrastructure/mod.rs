//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based transaction source over HTTP, WebSocket and IPC
//! - ABI loading and call data decoding using alloy-json-abi / alloy-dyn-abi

pub mod abi;
pub mod ethereum;

pub use abi::{AbiLoader, AlloyCallDecoder};
pub use ethereum::{create_provider, ProviderConfig, TransactionSource};
