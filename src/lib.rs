//! Transaction inspection for EVM chains
//!
//! Fetches a transaction and its receipt, resolves the destination
//! contract's interface by address and decodes the call data into a
//! function name with typed arguments.
//!
//! ```no_run
//! # use txpeek::domain::abi::{CallDecoder, InterfaceRegistry, RawTransaction};
//! # use txpeek::infrastructure::AlloyCallDecoder;
//! let registry = InterfaceRegistry::new();
//! let tx = RawTransaction::new(None, Vec::new());
//! let decoded = AlloyCallDecoder::new().decode(&tx, &registry).unwrap();
//! assert!(decoded.is_no_call());
//! ```

pub mod config;
pub mod domain;
pub mod explorer;
pub mod infrastructure;
