//! Static registry of the ledgers Gateway transfers run between.
//!
//! `Chain` is a closed enumeration: every supported ledger is a variant
//! carrying a static descriptor, so lookups are total functions and an
//! unknown chain cannot exist past argument parsing. `EvmChain` is the
//! user-facing subset — the Arc ledger is always the implicit other
//! endpoint of a transfer and is not selectable.

use alloy::primitives::{Address, address};
use clap::ValueEnum;
use std::fmt::Display;
use std::str::FromStr;

/// Gateway custodial vault contract (same address on every testnet).
pub const GATEWAY_WALLET: Address = address!("0x0077777d7EBA4688BDeF3E311b846F25870A19B9");

/// Gateway minter contract (same address on every testnet).
pub const GATEWAY_MINTER: Address = address!("0x0022222ABE238Cc2C7Bb1f21003F0a260052475B");

/// Network parameters for one ledger. Testnet deployment parameters,
/// loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    /// Registry key, also the CLI spelling.
    pub key: &'static str,
    /// Native chain id.
    pub chain_id: u64,
    /// Gateway domain id (the attestation network's routing identifier,
    /// distinct from the chain id).
    pub domain: u32,
    /// Default JSON-RPC endpoint.
    pub rpc_url: &'static str,
    /// USDC token contract on this ledger.
    pub usdc: Address,
    /// Native currency symbol, for gas-related messages.
    pub native_symbol: &'static str,
}

const ARC_TESTNET: ChainDescriptor = ChainDescriptor {
    key: "arcTestnet",
    chain_id: 8811,
    domain: 16,
    rpc_url: "https://rpc.testnet.arc.network",
    usdc: address!("0x3600daD0c8eBEBD8c4aD4b71AF4D6c6C05B9C1A0"),
    native_symbol: "USDC",
};

const ETHEREUM_SEPOLIA: ChainDescriptor = ChainDescriptor {
    key: "ethereumSepolia",
    chain_id: 11_155_111,
    domain: 0,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    usdc: address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
    native_symbol: "ETH",
};

const BASE_SEPOLIA: ChainDescriptor = ChainDescriptor {
    key: "baseSepolia",
    chain_id: 84_532,
    domain: 6,
    rpc_url: "https://sepolia.base.org",
    usdc: address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e"),
    native_symbol: "ETH",
};

const AVALANCHE_FUJI: ChainDescriptor = ChainDescriptor {
    key: "avalancheFuji",
    chain_id: 43_113,
    domain: 1,
    rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
    usdc: address!("0x5425890298aed601595a70AB815c96711a31Bc65"),
    native_symbol: "AVAX",
};

/// A ledger Gateway can burn from or mint to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Chain {
    #[value(name = "arcTestnet")]
    ArcTestnet,
    #[value(name = "ethereumSepolia")]
    EthereumSepolia,
    #[value(name = "baseSepolia")]
    BaseSepolia,
    #[value(name = "avalancheFuji")]
    AvalancheFuji,
}

impl Chain {
    pub const ALL: [Self; 4] = [
        Self::ArcTestnet,
        Self::EthereumSepolia,
        Self::BaseSepolia,
        Self::AvalancheFuji,
    ];

    /// Total lookup: every variant has a descriptor.
    pub const fn descriptor(self) -> &'static ChainDescriptor {
        match self {
            Self::ArcTestnet => &ARC_TESTNET,
            Self::EthereumSepolia => &ETHEREUM_SEPOLIA,
            Self::BaseSepolia => &BASE_SEPOLIA,
            Self::AvalancheFuji => &AVALANCHE_FUJI,
        }
    }

    pub const fn domain(self) -> u32 {
        self.descriptor().domain
    }

    pub const fn usdc(self) -> Address {
        self.descriptor().usdc
    }

    pub const fn key(self) -> &'static str {
        self.descriptor().key
    }

    /// Maps a Gateway domain id back to a registered chain, if any.
    /// Unregistered domains are surfaced by callers under a synthetic
    /// `Domain N` label instead of failing.
    pub fn from_domain(domain: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.domain() == domain)
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The EVM endpoint of a transfer, as supplied by the caller.
///
/// Deliberately excludes the Arc ledger: a transfer always has Arc as
/// its other endpoint, so accepting it here would name the same ledger
/// twice. `arcTestnet` therefore fails to parse for either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EvmChain {
    #[value(name = "ethereumSepolia")]
    EthereumSepolia,
    #[value(name = "baseSepolia")]
    BaseSepolia,
    #[value(name = "avalancheFuji")]
    AvalancheFuji,
}

impl From<EvmChain> for Chain {
    fn from(chain: EvmChain) -> Self {
        match chain {
            EvmChain::EthereumSepolia => Self::EthereumSepolia,
            EvmChain::BaseSepolia => Self::BaseSepolia,
            EvmChain::AvalancheFuji => Self::AvalancheFuji,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown transfer chain: {0} (the Arc ledger is always the implicit other endpoint)")]
pub struct UnknownChainError(pub String);

impl FromStr for EvmChain {
    type Err = UnknownChainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ethereumSepolia" => Ok(Self::EthereumSepolia),
            "baseSepolia" => Ok(Self::BaseSepolia),
            "avalancheFuji" => Ok(Self::AvalancheFuji),
            other => Err(UnknownChainError(other.to_string())),
        }
    }
}

impl Display for EvmChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Chain::from(*self).fmt(f)
    }
}
