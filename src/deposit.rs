//! Moving wallet USDC into the Gateway custodial vault.
//!
//! A burn intent can only be redeemed against vault balance, so a
//! deficient vault is topped up here: approve the vault for the amount,
//! then call `deposit`, each awaited to confirmation. The wallet
//! balance is checked first and a shortfall fails fast — nothing has
//! been committed at that point.

use alloy::primitives::{Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tracing::info;

use crate::bindings::{IERC20, IGatewayWallet};
use crate::chain::{Chain, GATEWAY_WALLET};
use crate::evm::{EvmError, Wallet};

#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    #[error(
        "wallet on {chain} holds {available} USDC units, {required} required for the deposit"
    )]
    InsufficientWalletBalance {
        chain: Chain,
        available: U256,
        required: U256,
    },
    #[error("contract read failed: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("transaction failed: {0}")]
    Evm(#[from] EvmError),
}

/// Deposits token balance into the custodial vault on one chain.
#[async_trait]
pub trait VaultDepositor: Send + Sync {
    /// Moves `amount` smallest units from the wallet into the vault,
    /// returning the deposit transaction hash.
    async fn deposit(&self, amount: U256) -> Result<TxHash, DepositError>;
}

/// [`VaultDepositor`] over a live EVM chain connection.
pub struct EvmDepositor<W> {
    wallet: W,
    chain: Chain,
}

impl<W> EvmDepositor<W> {
    pub fn new(wallet: W, chain: Chain) -> Self {
        Self { wallet, chain }
    }
}

#[async_trait]
impl<W: Wallet> VaultDepositor for EvmDepositor<W> {
    async fn deposit(&self, amount: U256) -> Result<TxHash, DepositError> {
        let usdc = self.chain.usdc();
        let token = IERC20::new(usdc, self.wallet.provider().clone());

        let available = token.balanceOf(self.wallet.address()).call().await?;

        if available < amount {
            return Err(DepositError::InsufficientWalletBalance {
                chain: self.chain,
                available,
                required: amount,
            });
        }

        info!(chain = %self.chain, %amount, "Approving USDC for the Gateway vault");

        let approve = IERC20::approveCall {
            spender: GATEWAY_WALLET,
            amount,
        };
        self.wallet
            .send(
                usdc,
                Bytes::from(SolCall::abi_encode(&approve)),
                "USDC approve for Gateway vault",
            )
            .await?;

        info!(chain = %self.chain, %amount, "Depositing USDC into the Gateway vault");

        let deposit = IGatewayWallet::depositCall {
            token: usdc,
            amount,
        };
        let receipt = self
            .wallet
            .send(
                GATEWAY_WALLET,
                Bytes::from(SolCall::abi_encode(&deposit)),
                "Gateway vault deposit",
            )
            .await?;

        Ok(receipt.transaction_hash)
    }
}

/// Runs a batch of deposits one chain at a time.
///
/// A failure on one chain aborts the remaining chains; already-confirmed
/// deposits stand (they are ordinary vault balance, usable later).
pub async fn deposit_each<D: VaultDepositor>(
    deposits: &[(&D, U256)],
) -> Result<Vec<TxHash>, DepositError> {
    let mut hashes = Vec::with_capacity(deposits.len());

    for (depositor, amount) in deposits {
        hashes.push(depositor.deposit(*amount).await?);
    }

    Ok(hashes)
}
