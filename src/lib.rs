//! Cross-ledger USDC transfers through Circle Gateway.
//!
//! A transfer burns USDC out of a custodial vault on the source chain,
//! exchanges the depositor's signed burn intent for an attestation at
//! the Gateway API, and redeems that attestation for a mint on the
//! destination chain. One endpoint is always the Arc ledger; the other
//! is a registered EVM testnet.

pub mod amount;
pub mod balance;
mod bindings;
pub mod chain;
pub mod cli;
pub mod config;
pub mod deposit;
pub mod evm;
pub mod gateway;
pub mod intent;
pub mod mint;
pub mod transfer;

pub use config::setup_tracing;
