//! # Chain Descriptors
//!
//! Static descriptions of the networks a marketplace deployment can live
//! on. These are configuration material: loaded once at startup, then
//! consulted for display names and RPC endpoints.

use serde::{Deserialize, Serialize};

/// One supported network.
///
/// Fields are private so a descriptor is always internally consistent;
/// construct one through the named presets or [`ChainDescriptor::custom`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    chain_id: u64,
    name: String,
    rpc_url: String,
    currency_symbol: String,
    explorer_url: Option<String>,
}

impl ChainDescriptor {
    /// Describes a network not covered by the presets.
    #[must_use]
    pub fn custom(
        chain_id: u64,
        name: impl Into<String>,
        rpc_url: impl Into<String>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            name: name.into(),
            rpc_url: rpc_url.into(),
            currency_symbol: currency_symbol.into(),
            explorer_url: None,
        }
    }

    /// Attaches a block-explorer base URL.
    #[must_use]
    pub fn with_explorer(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }

    /// Ethereum mainnet.
    #[must_use]
    pub fn mainnet() -> Self {
        Self::custom(1, "Ethereum", "https://eth.llamarpc.com", "ETH")
            .with_explorer("https://etherscan.io")
    }

    /// Sepolia testnet.
    #[must_use]
    pub fn sepolia() -> Self {
        Self::custom(11_155_111, "Sepolia", "https://rpc.sepolia.org", "ETH")
            .with_explorer("https://sepolia.etherscan.io")
    }

    /// Polygon PoS mainnet.
    #[must_use]
    pub fn polygon() -> Self {
        Self::custom(137, "Polygon", "https://polygon-rpc.com", "MATIC")
            .with_explorer("https://polygonscan.com")
    }

    /// Arbitrum One.
    #[must_use]
    pub fn arbitrum() -> Self {
        Self::custom(42_161, "Arbitrum One", "https://arb1.arbitrum.io/rpc", "ETH")
            .with_explorer("https://arbiscan.io")
    }

    /// OP Mainnet.
    #[must_use]
    pub fn optimism() -> Self {
        Self::custom(10, "Optimism", "https://mainnet.optimism.io", "ETH")
            .with_explorer("https://optimistic.etherscan.io")
    }

    /// The networks a stock deployment supports, mainnet first.
    #[must_use]
    pub fn default_chains() -> Vec<Self> {
        vec![
            Self::mainnet(),
            Self::polygon(),
            Self::arbitrum(),
            Self::optimism(),
            Self::sepolia(),
        ]
    }

    /// Numeric chain id (EIP-155).
    #[inline]
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Human-readable network name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default RPC endpoint for the network.
    #[inline]
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Ticker symbol of the native currency.
    #[inline]
    #[must_use]
    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Block-explorer base URL, when one is known.
    #[inline]
    #[must_use]
    pub fn explorer_url(&self) -> Option<&str> {
        self.explorer_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_chain_ids() {
        assert_eq!(ChainDescriptor::mainnet().chain_id(), 1);
        assert_eq!(ChainDescriptor::polygon().chain_id(), 137);
        assert_eq!(ChainDescriptor::sepolia().chain_id(), 11_155_111);
    }

    #[test]
    fn test_default_chains_are_unique() {
        let chains = ChainDescriptor::default_chains();
        for (i, a) in chains.iter().enumerate() {
            for b in &chains[i + 1..] {
                assert_ne!(a.chain_id(), b.chain_id());
            }
        }
    }

    #[test]
    fn test_custom_chain() {
        let chain = ChainDescriptor::custom(31_337, "Anvil", "http://127.0.0.1:8545", "ETH");
        assert_eq!(chain.chain_id(), 31_337);
        assert_eq!(chain.name(), "Anvil");
        assert!(chain.explorer_url().is_none());
    }
}
