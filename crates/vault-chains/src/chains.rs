use alloy_primitives::{address, Address, B256};
use serde::Serialize;

use crate::error::ChainError;

/// The wrapped ERC-20 form of a chain's native currency (WETH, WMATIC, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WrappedNative {
    pub address: Address,
    pub symbol: &'static str,
}

/// Definition of an EVM network a vault can live on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainProfile {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
    /// Absent where deposits never need a wrap step.
    pub wrapped_native: Option<WrappedNative>,
}

impl ChainProfile {
    /// Whether `token` is this chain's wrapped-native token.
    pub fn is_wrapped_native(&self, token: &Address) -> bool {
        self.wrapped_native
            .map(|w| w.address == *token)
            .unwrap_or(false)
    }

    /// Block-explorer link for a transaction on this chain.
    pub fn tx_url(&self, tx_hash: &B256) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url)
    }
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: ChainProfile = ChainProfile {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://eth.llamarpc.com",
    explorer_url: "https://etherscan.io",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
        symbol: "WETH",
    }),
};

/// Optimism (chain ID 10).
pub const OPTIMISM: ChainProfile = ChainProfile {
    chain_id: 10,
    name: "Optimism",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://mainnet.optimism.io",
    explorer_url: "https://optimistic.etherscan.io",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("4200000000000000000000000000000000000006"),
        symbol: "WETH",
    }),
};

/// BNB Smart Chain (chain ID 56).
pub const BSC: ChainProfile = ChainProfile {
    chain_id: 56,
    name: "BNB Smart Chain",
    symbol: "BNB",
    decimals: 18,
    rpc_url: "https://bsc-dataseed.binance.org",
    explorer_url: "https://bscscan.com",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"),
        symbol: "WBNB",
    }),
};

/// Polygon PoS (chain ID 137).
pub const POLYGON: ChainProfile = ChainProfile {
    chain_id: 137,
    name: "Polygon",
    symbol: "MATIC",
    decimals: 18,
    rpc_url: "https://polygon-rpc.com",
    explorer_url: "https://polygonscan.com",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("0d500b1d8e8ef31e21c99d1db9a6444d3adf1270"),
        symbol: "WMATIC",
    }),
};

/// Fantom Opera (chain ID 250).
pub const FANTOM: ChainProfile = ChainProfile {
    chain_id: 250,
    name: "Fantom",
    symbol: "FTM",
    decimals: 18,
    rpc_url: "https://rpc.ftm.tools",
    explorer_url: "https://ftmscan.com",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("21be370d5312f44cb42ce377bc9b8a0cef1a4c83"),
        symbol: "WFTM",
    }),
};

/// Base (chain ID 8453).
pub const BASE: ChainProfile = ChainProfile {
    chain_id: 8453,
    name: "Base",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("4200000000000000000000000000000000000006"),
        symbol: "WETH",
    }),
};

/// Arbitrum One (chain ID 42161).
pub const ARBITRUM: ChainProfile = ChainProfile {
    chain_id: 42161,
    name: "Arbitrum One",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://arb1.arbitrum.io/rpc",
    explorer_url: "https://arbiscan.io",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("82af49447d8a07e3bd95bd0d56f35241523fbab1"),
        symbol: "WETH",
    }),
};

/// Avalanche C-Chain (chain ID 43114).
pub const AVALANCHE: ChainProfile = ChainProfile {
    chain_id: 43114,
    name: "Avalanche C-Chain",
    symbol: "AVAX",
    decimals: 18,
    rpc_url: "https://api.avax.network/ext/bc/C/rpc",
    explorer_url: "https://snowtrace.io",
    is_testnet: false,
    wrapped_native: Some(WrappedNative {
        address: address!("b31f66aa3c1e785363f0875a1b74e27b85fd66c7"),
        symbol: "WAVAX",
    }),
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: ChainProfile = ChainProfile {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://rpc.sepolia.org",
    explorer_url: "https://sepolia.etherscan.io",
    is_testnet: true,
    wrapped_native: None,
};

/// All bundled networks.
const ALL_CHAINS: &[&ChainProfile] = &[
    &ETHEREUM,
    &OPTIMISM,
    &BSC,
    &POLYGON,
    &FANTOM,
    &BASE,
    &ARBITRUM,
    &AVALANCHE,
    &SEPOLIA,
];

/// Lookup table of supported networks. A chain missing from the table is
/// unsupported, full stop.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainProfile>,
}

impl ChainRegistry {
    /// Registry over the bundled network table.
    pub fn bundled() -> Self {
        Self {
            chains: ALL_CHAINS.iter().map(|c| (*c).clone()).collect(),
        }
    }

    /// Registry over an explicit set of profiles. Later duplicates of a chain
    /// ID are ignored.
    pub fn from_profiles(profiles: impl IntoIterator<Item = ChainProfile>) -> Self {
        let mut chains: Vec<ChainProfile> = Vec::new();
        for profile in profiles {
            if !chains.iter().any(|c| c.chain_id == profile.chain_id) {
                chains.push(profile);
            }
        }
        Self { chains }
    }

    /// Returns the profile for `chain_id`, or `None` if unsupported.
    pub fn get(&self, chain_id: u64) -> Option<&ChainProfile> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Returns the profile for `chain_id` or [`ChainError::UnsupportedChain`].
    pub fn resolve_chain(&self, chain_id: u64) -> Result<&ChainProfile, ChainError> {
        self.get(chain_id)
            .ok_or(ChainError::UnsupportedChain(chain_id))
    }

    pub fn supported_chains(&self) -> &[ChainProfile] {
        &self.chains
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}
