use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ContractSpec {
    pub name: Option<String>,
    pub address: String,
    /// Path to an ABI file (raw array or artifact)
    pub abi: Option<String>,
    /// Human-readable signatures, e.g. "transfer(address to, uint256 amount)"
    #[serde(default)]
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimals: default_decimals(),
        }
    }
}

fn default_symbol() -> String {
    "ETH".to_string()
}

fn default_decimals() -> u8 {
    18
}

fn default_strict() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub currency: CurrencyConfig,

    #[serde(default = "default_strict")]
    pub strict_decoding: bool,

    #[serde(default)]
    pub chain_id: Option<u64>,

    #[serde(default)]
    pub contracts: Vec<ContractSpec>,

    /// Directories of per-contract deployment JSON files
    #[serde(default)]
    pub deployments: Vec<String>,

    /// Files mapping chain id -> contract name -> {address, abi}
    #[serde(default)]
    pub deployed_contracts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            currency: CurrencyConfig::default(),
            strict_decoding: default_strict(),
            chain_id: None,
            contracts: Vec::new(),
            deployments: Vec::new(),
            deployed_contracts: Vec::new(),
        }
    }
}

/// Load the config from an explicit path or the default location.
///
/// A missing file yields the defaults; a file that exists but does not
/// parse is an error.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };
    let content =
        fs::read_to_string(&path).with_context(|| format!("read config {}", path.display()))?;
    parse(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TXPEEK_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("txpeek").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("txpeek").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "txpeek", "txpeek")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
