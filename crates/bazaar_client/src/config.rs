//! # Client Configuration
//!
//! The explicit context a client runs with: which networks exist and
//! which gateway credentials to hand providers. Loaded once at startup
//! from TOML (or built in code) and then passed by reference - nothing
//! in this crate reads ambient global state.

use std::fs;
use std::path::Path;

use bazaar_types::ChainDescriptor;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// API keys for hosted RPC gateways, all optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayKeys {
    /// Thirdweb API key.
    #[serde(default)]
    pub thirdweb_api_key: Option<String>,
    /// Alchemy API key.
    #[serde(default)]
    pub alchemy_api_key: Option<String>,
    /// Infura API key.
    #[serde(default)]
    pub infura_api_key: Option<String>,
}

/// Everything the client needs to know about its environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Networks this deployment can talk to, preferred network first.
    #[serde(default = "ChainDescriptor::default_chains")]
    chains: Vec<ChainDescriptor>,
    /// Gateway credentials for providers that want them.
    #[serde(default)]
    gateways: GatewayKeys,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chains: ChainDescriptor::default_chains(),
            gateways: GatewayKeys::default(),
        }
    }
}

impl ClientConfig {
    /// A config supporting exactly the given networks.
    #[must_use]
    pub fn new(chains: Vec<ChainDescriptor>) -> Self {
        Self {
            chains,
            gateways: GatewayKeys::default(),
        }
    }

    /// Attaches gateway credentials.
    #[must_use]
    pub fn with_gateways(mut self, gateways: GatewayKeys) -> Self {
        self.gateways = gateways;
        self
    }

    /// Parses a config from TOML text.
    ///
    /// Missing sections fall back to the defaults, so an empty string
    /// yields the stock configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when the text is not
    /// valid TOML for this schema.
    pub fn from_toml_str(text: &str) -> ClientResult<Self> {
        toml::from_str(text).map_err(|err| ClientError::InvalidConfig(err.to_string()))
    }

    /// Loads a config file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when the file cannot be
    /// read or does not parse.
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            ClientError::InvalidConfig(format!("{}: {err}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Looks a supported network up by chain id.
    #[must_use]
    pub fn chain(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|chain| chain.chain_id() == chain_id)
    }

    /// Whether a chain id is in the supported set.
    #[must_use]
    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.chain(chain_id).is_some()
    }

    /// The supported networks, preferred network first.
    #[must_use]
    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    /// Gateway credentials.
    #[must_use]
    pub const fn gateways(&self) -> &GatewayKeys {
        &self.gateways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_supports_mainnet() {
        let config = ClientConfig::default();
        assert!(config.is_supported(1));
        assert_eq!(config.chain(1).map(ChainDescriptor::name), Some("Ethereum"));
        assert!(!config.is_supported(31_337));
    }

    #[test]
    fn test_empty_toml_is_the_stock_config() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_toml_round() {
        let text = r#"
            [[chains]]
            chain_id = 31337
            name = "Anvil"
            rpc_url = "http://127.0.0.1:8545"
            currency_symbol = "ETH"

            [gateways]
            thirdweb_api_key = "tw-key"
            alchemy_api_key = "test-key"
        "#;
        let config = ClientConfig::from_toml_str(text).unwrap();
        assert_eq!(config.chains().len(), 1);
        assert!(config.is_supported(31_337));
        assert_eq!(config.gateways().thirdweb_api_key.as_deref(), Some("tw-key"));
        assert_eq!(config.gateways().alchemy_api_key.as_deref(), Some("test-key"));
        assert!(config.gateways().infura_api_key.is_none());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let err = ClientConfig::from_toml_str("chains = 12").unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }
}
