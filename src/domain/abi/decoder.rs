//! Call decoder trait and types

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes};
use thiserror::Error;
use tracing::debug;

use super::{FunctionSignature, InterfaceRegistry};

/// The part of a transaction the decoder looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTransaction {
    /// Destination address, `None` for contract creation
    pub to: Option<Address>,
    /// Call data (selector followed by encoded arguments)
    pub input: Bytes,
}

impl RawTransaction {
    pub fn new(to: Option<Address>, input: impl Into<Bytes>) -> Self {
        Self {
            to,
            input: input.into(),
        }
    }
}

/// A decoded function argument
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Decoded value
    pub value: DynSolValue,
}

/// A call matched against a known function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub function_name: String,
    /// Full function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Decoded arguments, in declaration order
    pub arguments: Vec<DecodedArg>,
}

impl FunctionCall {
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    pub fn arg_names(&self) -> Vec<&str> {
        self.arguments.iter().map(|arg| arg.name.as_str()).collect()
    }
}

/// Why a selector could not be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// No interface is registered for the destination (or it is a contract creation)
    NoInterface,
    /// The interface exists but has no function with this selector
    SelectorNotFound,
}

/// Result of decoding a transaction's call data
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedCall {
    /// Call data was empty; no function was called
    NoCall,
    /// Call data carries a selector no known interface resolves
    ///
    /// `selector` is the first four bytes of the call data, or all of it when
    /// shorter data is sent to an address without an interface.
    Unknown {
        selector: Bytes,
        reason: UnknownReason,
    },
    /// Selector matched and arguments decoded
    Function(FunctionCall),
}

impl DecodedCall {
    /// Raw selector, if the call data had one
    pub fn selector(&self) -> Option<&[u8]> {
        match self {
            DecodedCall::NoCall => None,
            DecodedCall::Unknown { selector, .. } => Some(selector.as_ref()),
            DecodedCall::Function(call) => Some(&call.selector),
        }
    }

    /// Matched function, if any
    pub fn function(&self) -> Option<&FunctionCall> {
        match self {
            DecodedCall::Function(call) => Some(call),
            _ => None,
        }
    }

    pub fn is_no_call(&self) -> bool {
        matches!(self, DecodedCall::NoCall)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DecodedCall::Unknown { .. })
    }
}

/// Call data that does not match the declared layout
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Call data for a known interface that is shorter than a selector
    #[error("calldata too short: {len} bytes (need at least 4 for selector)")]
    ShortCalldata { len: usize },
    /// Call data was decoded against the wrong function
    #[error("selector mismatch: got 0x{}, expected 0x{}", hex::encode(.actual), hex::encode(.expected))]
    SelectorMismatch { actual: [u8; 4], expected: [u8; 4] },
    /// Argument bytes do not fit the parameter types
    #[error("malformed encoding for {signature}: {source}")]
    MalformedEncoding {
        signature: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },
    /// Arguments decoded, but the bytes are not their canonical encoding
    /// (dirty padding, booleans other than 0/1, integers wider than their
    /// type, or offsets that do not follow the standard layout)
    #[error("non-canonical encoding for {signature}: {reason}")]
    NonCanonical { signature: String, reason: String },
    /// Arguments decoded but did not consume the payload exactly
    #[error("{signature}: expected {expected} bytes of arguments, found {actual}")]
    LengthMismatch {
        signature: String,
        expected: usize,
        actual: usize,
    },
}

/// Trait for call data decoding implementations
///
/// Implementors only decode argument bytes against a known function; the
/// selector and interface resolution in [`CallDecoder::decode`] is shared.
pub trait CallDecoder: Send + Sync {
    /// Decode calldata given a function signature
    ///
    /// # Arguments
    /// * `function` - The function signature to decode with
    /// * `data` - The calldata bytes (including the 4-byte selector)
    fn decode_calldata(
        &self,
        function: &FunctionSignature,
        data: &[u8],
    ) -> Result<FunctionCall, DecodeError>;

    /// Decode a transaction against the interfaces registered for its destination
    ///
    /// # Returns
    /// * `Ok(DecodedCall::NoCall)` - Empty call data
    /// * `Ok(DecodedCall::Unknown { .. })` - No interface or no matching selector
    /// * `Ok(DecodedCall::Function(..))` - Selector matched and arguments decoded
    /// * `Err(...)` - Call data is malformed for the matched function
    fn decode(
        &self,
        tx: &RawTransaction,
        interfaces: &InterfaceRegistry,
    ) -> Result<DecodedCall, DecodeError> {
        let data = tx.input.as_ref();
        if data.is_empty() {
            return Ok(DecodedCall::NoCall);
        }
        let Some(interface) = tx.to.as_ref().and_then(|to| interfaces.get(to)) else {
            let prefix = &data[..data.len().min(4)];
            debug!(to = ?tx.to, selector = %hex::encode(prefix), "no interface for destination");
            return Ok(DecodedCall::Unknown {
                selector: Bytes::copy_from_slice(prefix),
                reason: UnknownReason::NoInterface,
            });
        };

        let Some(&selector) = data.first_chunk::<4>() else {
            return Err(DecodeError::ShortCalldata { len: data.len() });
        };

        let Some(function) = interface.lookup(selector) else {
            debug!(to = ?tx.to, selector = %hex::encode(selector), "selector not in interface");
            return Ok(DecodedCall::Unknown {
                selector: Bytes::copy_from_slice(&selector),
                reason: UnknownReason::SelectorNotFound,
            });
        };

        let call = self.decode_calldata(function, data)?;
        debug!(signature = %call.signature, args = call.arguments.len(), "decoded call");
        Ok(DecodedCall::Function(call))
    }
}
