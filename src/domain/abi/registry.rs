//! Interface registry - contract interfaces indexed by address

use std::collections::HashMap;

use alloy_primitives::Address;

use super::ContractInterface;

/// Registry of known contract interfaces keyed by deployment address
#[derive(Debug, Default, Clone)]
pub struct InterfaceRegistry {
    contracts: HashMap<Address, ContractInterface>,
    /// Number of source files read while building the registry
    pub loaded_files: usize,
    /// Load errors, one entry per skipped source
    pub errors: Vec<String>,
}

impl InterfaceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interface for an address
    ///
    /// Registering the same address twice merges the function sets; for a
    /// selector known to both, the earlier entry is kept.
    pub fn insert(&mut self, address: Address, interface: ContractInterface) {
        match self.contracts.get_mut(&address) {
            Some(existing) => {
                if existing.name.is_none() {
                    existing.name = interface.name.clone();
                }
                existing.extend(interface.functions().cloned());
            }
            None => {
                self.contracts.insert(address, interface);
            }
        }
    }

    /// Look up the interface deployed at an address
    pub fn get(&self, address: &Address) -> Option<&ContractInterface> {
        self.contracts.get(address)
    }

    /// Get the number of registered contracts
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Total number of functions across all contracts
    pub fn function_count(&self) -> usize {
        self.contracts.values().map(ContractInterface::len).sum()
    }

    /// Merge another registry into this one
    pub fn merge(&mut self, other: Self) {
        self.loaded_files = self.loaded_files.saturating_add(other.loaded_files);
        self.errors.extend(other.errors);
        for (address, interface) in other.contracts {
            self.insert(address, interface);
        }
    }

    /// Iterate over registered contracts
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &ContractInterface)> {
        self.contracts.iter()
    }
}
