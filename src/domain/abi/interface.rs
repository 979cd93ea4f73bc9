//! Contract interface - function signatures of one contract indexed by selector

use std::collections::HashMap;

use alloy_dyn_abi::DynSolType;
use alloy_primitives::keccak256;
use thiserror::Error;

/// Errors raised while building a contract interface
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// A parameter type tag could not be parsed
    #[error("invalid type '{kind}' for parameter '{name}': {source}")]
    InvalidType {
        name: String,
        kind: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },
    /// A human-readable signature could not be parsed
    #[error("invalid function signature '{signature}': {reason}")]
    InvalidSignature { signature: String, reason: String },
    /// ABI JSON could not be parsed
    #[error("invalid ABI JSON: {0}")]
    InvalidAbi(#[from] serde_json::Error),
}

/// A function parameter specification
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Canonical Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Parsed type used for decoding
    pub ty: DynSolType,
}

impl ParamSpec {
    /// Parse a parameter from its name and type tag
    pub fn new(name: impl Into<String>, kind: &str) -> Result<Self, InterfaceError> {
        let name = name.into();
        let ty = DynSolType::parse(kind).map_err(|source| InterfaceError::InvalidType {
            name: name.clone(),
            kind: kind.to_string(),
            source,
        })?;
        Ok(Self {
            name,
            kind: ty.sol_type_name().into_owned(),
            ty,
        })
    }
}

/// A function signature with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Canonical signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
}

impl FunctionSignature {
    /// Build a signature from a name and its parameters.
    ///
    /// The canonical signature and selector are derived from the parsed types,
    /// so `uint` and `uint256` produce the same selector.
    pub fn new(name: impl Into<String>, inputs: Vec<ParamSpec>) -> Self {
        let name = name.into();
        let types: Vec<&str> = inputs.iter().map(|param| param.kind.as_str()).collect();
        let signature = format!("{}({})", name, types.join(","));
        let selector = compute_selector(&signature);
        Self {
            selector,
            name,
            signature,
            inputs,
        }
    }

    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    /// Parameter types as a single tuple, the shape of the encoded arguments
    pub fn params_type(&self) -> DynSolType {
        DynSolType::Tuple(self.inputs.iter().map(|param| param.ty.clone()).collect())
    }

    /// Parameter names, `arg{n}` where the ABI leaves them blank
    pub fn param_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(idx, param)| {
                if param.name.trim().is_empty() {
                    format!("arg{}", idx)
                } else {
                    param.name.clone()
                }
            })
            .collect()
    }
}

/// Compute the 4-byte function selector from a canonical signature
pub fn compute_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Functions of a single contract indexed by selector.
///
/// Built once from an ABI and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct ContractInterface {
    /// Contract name, when known
    pub name: Option<String>,
    functions: HashMap<[u8; 4], FunctionSignature>,
}

impl ContractInterface {
    /// Build an interface from a set of functions
    ///
    /// Note: First function for a given selector wins (no overwrite)
    pub fn from_functions(
        name: Option<String>,
        functions: impl IntoIterator<Item = FunctionSignature>,
    ) -> Self {
        let mut interface = Self {
            name,
            functions: HashMap::new(),
        };
        interface.extend(functions);
        interface
    }

    /// Add functions whose selector is not yet present
    pub fn extend(&mut self, functions: impl IntoIterator<Item = FunctionSignature>) {
        for function in functions {
            self.functions.entry(function.selector).or_insert(function);
        }
    }

    /// Look up a function by selector
    pub fn lookup(&self, selector: [u8; 4]) -> Option<&FunctionSignature> {
        self.functions.get(&selector)
    }

    /// Look up a function by selector hex string (e.g., "0xa9059cbb")
    pub fn lookup_hex(&self, selector_hex: &str) -> Option<&FunctionSignature> {
        let normalized = selector_hex
            .strip_prefix("0x")
            .or_else(|| selector_hex.strip_prefix("0X"))
            .unwrap_or(selector_hex);

        if normalized.len() != 8 {
            return None;
        }

        let bytes = hex::decode(normalized).ok()?;
        let selector: [u8; 4] = bytes.try_into().ok()?;
        self.lookup(selector)
    }

    /// Get the number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the interface has no functions
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Get all functions
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions.values()
    }
}
