//! ABI domain models and contracts
//!
//! Contract interfaces, the address-keyed registry they live in, and the
//! decoder trait that turns call data into a [`DecodedCall`].

mod decoder;
mod interface;
mod registry;

pub use decoder::{
    CallDecoder, DecodeError, DecodedArg, DecodedCall, FunctionCall, RawTransaction,
    UnknownReason,
};
pub use interface::{compute_selector, ContractInterface, FunctionSignature, InterfaceError, ParamSpec};
pub use registry::InterfaceRegistry;
