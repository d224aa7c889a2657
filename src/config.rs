//! Plaintext config plus secrets TOML, assembled into a runtime [`Ctx`].

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use url::Url;

use crate::amount::Usdc;
use crate::balance::PollingConfig;
use crate::chain::Chain;
use crate::transfer::{DEFAULT_FEE_BUFFER, DEFAULT_MAX_FEE};

#[derive(Parser, Debug)]
pub struct Env {
    /// Path to plaintext TOML configuration file
    #[clap(long)]
    pub config: PathBuf,
    /// Path to TOML secrets file
    #[clap(long)]
    pub secrets: PathBuf,
}

/// Non-secret settings deserialized from the plaintext config TOML.
#[derive(Deserialize)]
struct Config {
    gateway_url: Url,
    log_level: Option<LogLevel>,
    fee_buffer: Option<Decimal>,
    max_fee: Option<Decimal>,
    polling: Option<PollingSection>,
    /// Per-chain RPC endpoint overrides, keyed by chain key
    /// (e.g. `baseSepolia`). Chains without an override use the
    /// registry default.
    #[serde(default)]
    rpc: HashMap<String, Url>,
}

/// Secret credentials deserialized from the secrets TOML.
#[derive(Deserialize)]
struct Secrets {
    /// Depositor private key, shared across every chain.
    private_key: B256,
}

#[derive(Deserialize)]
struct PollingSection {
    interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
    max_retries: Option<usize>,
}

/// Combined runtime context. Assembled from plaintext config and
/// secrets; holds the signer rather than raw key material.
#[derive(Debug, Clone)]
pub struct Ctx {
    pub gateway_url: Url,
    pub log_level: LogLevel,
    pub fee_buffer: Usdc,
    pub max_fee: Usdc,
    pub polling: PollingConfig,
    pub signer: PrivateKeySigner,
    rpc: RpcEndpoints,
}

/// Resolved RPC endpoint per chain, override applied over the
/// registry default.
#[derive(Debug, Clone)]
struct RpcEndpoints {
    arc_testnet: Url,
    ethereum_sepolia: Url,
    base_sepolia: Url,
    avalanche_fuji: Url,
}

impl RpcEndpoints {
    fn resolve(overrides: &HashMap<String, Url>) -> Result<Self, ConfigError> {
        let endpoint = |chain: Chain| -> Result<Url, ConfigError> {
            if let Some(url) = overrides.get(chain.key()) {
                return Ok(url.clone());
            }

            Url::parse(chain.descriptor().rpc_url)
                .map_err(|source| ConfigError::InvalidRpcUrl { chain, source })
        };

        Ok(Self {
            arc_testnet: endpoint(Chain::ArcTestnet)?,
            ethereum_sepolia: endpoint(Chain::EthereumSepolia)?,
            base_sepolia: endpoint(Chain::BaseSepolia)?,
            avalanche_fuji: endpoint(Chain::AvalancheFuji)?,
        })
    }

    fn url(&self, chain: Chain) -> &Url {
        match chain {
            Chain::ArcTestnet => &self.arc_testnet,
            Chain::EthereumSepolia => &self.ethereum_sepolia,
            Chain::BaseSepolia => &self.base_sepolia,
            Chain::AvalancheFuji => &self.avalanche_fuji,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML")]
    Toml(#[from] toml::de::Error),
    #[error("failed to derive address from private_key")]
    PrivateKeyDerivation(#[source] alloy::signers::k256::ecdsa::Error),
    #[error("fee_buffer must not be negative, got {0}")]
    NegativeFeeBuffer(Decimal),
    #[error("max_fee must not be negative, got {0}")]
    NegativeMaxFee(Decimal),
    #[error("unknown chain key `{0}` in [rpc] section")]
    UnknownRpcChain(String),
    #[error("invalid RPC URL for {chain}")]
    InvalidRpcUrl {
        chain: Chain,
        #[source]
        source: url::ParseError,
    },
}

impl Ctx {
    pub fn load_files(config: &Path, secrets: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(config)?;
        let secrets_str = std::fs::read_to_string(secrets)?;
        Self::from_toml(&config_str, &secrets_str)
    }

    pub fn from_toml(config_toml: &str, secrets_toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(config_toml)?;
        let secrets: Secrets = toml::from_str(secrets_toml)?;

        let signer = PrivateKeySigner::from_bytes(&secrets.private_key)
            .map_err(ConfigError::PrivateKeyDerivation)?;

        let fee_buffer = config.fee_buffer.unwrap_or(DEFAULT_FEE_BUFFER);
        if fee_buffer.is_sign_negative() {
            return Err(ConfigError::NegativeFeeBuffer(fee_buffer));
        }

        let max_fee = config.max_fee.unwrap_or(DEFAULT_MAX_FEE);
        if max_fee.is_sign_negative() {
            return Err(ConfigError::NegativeMaxFee(max_fee));
        }

        for key in config.rpc.keys() {
            if !Chain::ALL.iter().any(|chain| chain.key() == key) {
                return Err(ConfigError::UnknownRpcChain(key.clone()));
            }
        }
        let rpc = RpcEndpoints::resolve(&config.rpc)?;

        let defaults = PollingConfig::default();
        let polling = match config.polling {
            Some(section) => PollingConfig {
                interval: section
                    .interval_secs
                    .map_or(defaults.interval, Duration::from_secs),
                timeout: section
                    .timeout_secs
                    .map_or(defaults.timeout, Duration::from_secs),
                max_retries: section.max_retries.unwrap_or(defaults.max_retries),
                ..defaults
            },
            None => defaults,
        };

        Ok(Self {
            gateway_url: config.gateway_url,
            log_level: config.log_level.unwrap_or(LogLevel::Info),
            fee_buffer: Usdc::new(fee_buffer),
            max_fee: Usdc::new(max_fee),
            polling,
            signer,
            rpc,
        })
    }

    /// RPC endpoint for `chain`, honoring any `[rpc]` override.
    pub fn rpc_url(&self, chain: Chain) -> &Url {
        self.rpc.url(chain)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

pub fn setup_tracing(log_level: LogLevel) {
    let level: Level = log_level.into();
    let default_filter = format!("gateway_transfer={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
