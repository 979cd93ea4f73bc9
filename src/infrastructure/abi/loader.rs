//! ABI loader - builds contract interfaces from ABI JSON and deployment files

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy_json_abi::{Function, JsonAbi, Param};
use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::domain::abi::{
    ContractInterface, FunctionSignature, InterfaceError, InterfaceRegistry, ParamSpec,
};

/// Files above this size are never ABI artifacts worth reading
const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// One contract entry of a deployed-contracts file
#[derive(Debug, Deserialize)]
struct DeployedContract {
    address: String,
    abi: JsonAbi,
}

/// ABI loader
pub struct AbiLoader;

impl AbiLoader {
    /// Build an interface from a parsed ABI
    pub fn interface_from_abi(
        name: Option<String>,
        abi: &JsonAbi,
    ) -> Result<ContractInterface, InterfaceError> {
        let functions = abi
            .functions()
            .map(Self::function_signature)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ContractInterface::from_functions(name, functions))
    }

    /// Build an interface from human-readable signatures,
    /// e.g. `transfer(address to, uint256 amount)`
    pub fn from_signatures(
        name: Option<String>,
        signatures: &[String],
    ) -> Result<ContractInterface, InterfaceError> {
        let functions = signatures
            .iter()
            .map(|signature| {
                let function = Function::parse(signature.trim()).map_err(|err| {
                    InterfaceError::InvalidSignature {
                        signature: signature.clone(),
                        reason: err.to_string(),
                    }
                })?;
                Self::function_signature(&function)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ContractInterface::from_functions(name, functions))
    }

    /// Load a single ABI file: a raw ABI array or an artifact with an "abi" field
    pub fn load_file(path: &Path) -> Result<ContractInterface> {
        let value = Self::read_json(path)?;
        let Some(abi) = Self::extract_abi(value) else {
            bail!("no ABI found");
        };
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string);
        Ok(Self::interface_from_abi(name, &abi)?)
    }

    /// Scan a deployments directory (hardhat-deploy layout) for files that
    /// carry both an `address` and an `abi`
    pub fn scan_deployments(root: impl AsRef<Path>) -> InterfaceRegistry {
        let root = root.as_ref();
        let mut registry = InterfaceRegistry::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    registry.errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > MAX_FILE_SIZE => continue,
                Ok(_) => {}
                Err(err) => {
                    registry.errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            }

            registry.loaded_files += 1;

            if let Err(err) = Self::load_deployment_file(path, &mut registry) {
                registry.errors.push(format!("{}: {:#}", path.display(), err));
            }
        }

        debug!(
            root = %root.display(),
            contracts = registry.len(),
            files = registry.loaded_files,
            "scanned deployments"
        );
        registry
    }

    /// Load a deployed-contracts file mapping chain id -> contract name -> {address, abi}
    ///
    /// With `chain_id` set only that chain's contracts are registered.
    pub fn load_deployed_contracts(path: &Path, chain_id: Option<u64>) -> Result<InterfaceRegistry> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let chains: BTreeMap<String, BTreeMap<String, DeployedContract>> =
            serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;

        let mut registry = InterfaceRegistry::new();
        registry.loaded_files = 1;

        for (chain, contracts) in chains {
            if let Some(wanted) = chain_id {
                if chain.parse::<u64>().ok() != Some(wanted) {
                    continue;
                }
            }
            for (name, contract) in contracts {
                let address = Address::from_str(contract.address.trim())
                    .with_context(|| format!("{name}: invalid address '{}'", contract.address))?;
                let interface = Self::interface_from_abi(Some(name.clone()), &contract.abi)
                    .with_context(|| format!("{name}: invalid ABI"))?;
                registry.insert(address, interface);
            }
        }

        Ok(registry)
    }

    /// Merge every configured source into one registry
    ///
    /// Individual source failures are recorded in `errors` and logged;
    /// the remaining sources are still loaded.
    pub fn build_registry(config: &Config) -> InterfaceRegistry {
        let mut registry = InterfaceRegistry::new();

        for contract in &config.contracts {
            match Self::load_contract_spec(contract) {
                Ok((address, interface)) => registry.insert(address, interface),
                Err(err) => {
                    let label = contract.name.as_deref().unwrap_or(&contract.address);
                    registry.errors.push(format!("{label}: {err:#}"));
                }
            }
        }

        for root in &config.deployments {
            registry.merge(Self::scan_deployments(root));
        }

        for path in &config.deployed_contracts {
            match Self::load_deployed_contracts(Path::new(path), config.chain_id) {
                Ok(loaded) => registry.merge(loaded),
                Err(err) => registry.errors.push(format!("{path}: {err:#}")),
            }
        }

        for err in &registry.errors {
            warn!("skipped ABI source: {err}");
        }
        debug!(
            contracts = registry.len(),
            functions = registry.function_count(),
            "interface registry ready"
        );

        registry
    }

    fn load_contract_spec(
        contract: &crate::config::ContractSpec,
    ) -> Result<(Address, ContractInterface)> {
        let address = Address::from_str(contract.address.trim())
            .with_context(|| format!("invalid address '{}'", contract.address))?;

        let mut interface = match &contract.abi {
            Some(path) => Self::load_file(&PathBuf::from(path))
                .with_context(|| format!("load ABI {path}"))?,
            None => ContractInterface::default(),
        };
        if contract.name.is_some() {
            interface.name = contract.name.clone();
        }
        let from_signatures = Self::from_signatures(None, &contract.signatures)?;
        interface.extend(from_signatures.functions().cloned());

        Ok((address, interface))
    }

    fn load_deployment_file(path: &Path, registry: &mut InterfaceRegistry) -> Result<()> {
        let value = Self::read_json(path)?;

        // Files without an address are plain artifacts, not deployments
        let Some(address) = value.get("address").and_then(|v| v.as_str()) else {
            return Ok(());
        };
        let address = Address::from_str(address.trim())
            .with_context(|| format!("invalid address '{address}'"))?;

        let Some(abi) = Self::extract_abi(value) else {
            return Ok(());
        };
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string);

        registry.insert(address, Self::interface_from_abi(name, &abi)?);
        Ok(())
    }

    fn read_json(path: &Path) -> Result<serde_json::Value> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Extract an ABI from a raw array or an object's "abi" field
    fn extract_abi(value: serde_json::Value) -> Option<JsonAbi> {
        let abi_value = match value {
            serde_json::Value::Array(_) => value,
            serde_json::Value::Object(mut map) => map.remove("abi")?,
            _ => return None,
        };
        serde_json::from_value(abi_value).ok()
    }

    fn function_signature(function: &Function) -> Result<FunctionSignature, InterfaceError> {
        let inputs = function
            .inputs
            .iter()
            .map(Self::param_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FunctionSignature::new(function.name.clone(), inputs))
    }

    fn param_spec(param: &Param) -> Result<ParamSpec, InterfaceError> {
        // Tuples are declared as "tuple" with components; the selector type
        // spells them out as "(uint256,address)"
        ParamSpec::new(param.name.clone(), &param.selector_type())
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| {
                matches!(
                    name,
                    ".git" | "target" | "node_modules" | ".next" | "dist" | "build" | "solcInputs"
                )
            })
            .unwrap_or(false)
    }
}
