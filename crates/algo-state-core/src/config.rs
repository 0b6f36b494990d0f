/// Node connection configuration
/// Resolved from defaults, a TOML file and environment variables, in that order
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const SANDBOX_ALGOD_ADDRESS: &str = "http://localhost:4001";
pub const SANDBOX_ALGOD_TOKEN: &str =
    "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const DEFAULT_TOKEN_HEADER: &str = "X-Algo-API-Token";
pub const DEFAULT_CONFIG_FILE: &str = ".algo-state.toml";
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub algod_address: String,
    pub algod_token: String,
    /// Header carrying the token; hosted nodes often expect `X-API-Key`
    pub api_key_header: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            algod_address: SANDBOX_ALGOD_ADDRESS.to_string(),
            algod_token: SANDBOX_ALGOD_TOKEN.to_string(),
            api_key_header: None,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl NodeConfig {
    /// Load configuration: file (explicit path or `./.algo-state.toml`), then environment
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        let config = config.with_env()?;
        config.validate()?;

        info!(
            "Node configuration loaded: address={}, header={}, timeout={}s",
            config.algod_address,
            config.token_header(),
            config.timeout_secs
        );
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        debug!(path, "read node config file");
        Ok(config)
    }

    /// Override fields from `ALGOD_*` environment variables
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(|name| env::var(name).ok())
    }

    fn with_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("ALGOD_ADDRESS") {
            self.algod_address = address;
        }
        if let Some(token) = lookup("ALGOD_TOKEN") {
            self.algod_token = token;
        }
        if let Some(header) = lookup("ALGOD_API_HEADER") {
            self.api_key_header = Some(header);
        }
        if let Some(timeout) = lookup("ALGOD_TIMEOUT_SECS") {
            self.timeout_secs = timeout.parse().map_err(|e| {
                ConfigError::Invalid(format!("Invalid ALGOD_TIMEOUT_SECS {:?}: {}", timeout, e))
            })?;
        }
        if let Some(retries) = lookup("ALGOD_MAX_RETRIES") {
            self.max_retries = retries.parse().map_err(|e| {
                ConfigError::Invalid(format!("Invalid ALGOD_MAX_RETRIES {:?}: {}", retries, e))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.algod_address.is_empty() {
            return Err(ConfigError::Invalid("algod address is empty".to_string()));
        }
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(ConfigError::Invalid(
                "Timeout must be between 1 and 300 seconds".to_string(),
            ));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_retries must be at most {}",
                MAX_RETRIES_LIMIT
            )));
        }
        if let Some(header) = &self.api_key_header {
            reqwest::header::HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
                ConfigError::Invalid(format!("Invalid API key header name {:?}", header))
            })?;
        }
        Ok(())
    }

    pub fn token_header(&self) -> &str {
        self.api_key_header.as_deref().unwrap_or(DEFAULT_TOKEN_HEADER)
    }
}
