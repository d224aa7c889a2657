//! EVM chain interaction abstraction.
//!
//! [`Wallet`] is the signing-key context passed into every component
//! that submits transactions: it exposes the provider for read-only
//! contract calls, the signer address, and a `send` method that signs,
//! submits, and waits out confirmation of a calldata payload. There is
//! no process-wide account state; each chain connection owns its own
//! wallet instance.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use tracing::info;

/// Errors that can occur during EVM operations.
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("transaction error: {0}")]
    Transaction(#[from] alloy::providers::PendingTransactionError),
    #[error("transport error: {0}")]
    Transport(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("contract error: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("transaction reverted: {tx_hash}")]
    Reverted { tx_hash: alloy::primitives::TxHash },
}

/// Signing wallet on an EVM chain.
///
/// Consumers build ABI-encoded calldata and pass it to `send` without
/// knowing how the transaction is signed or submitted.
#[async_trait]
pub trait Wallet: Send + Sync + 'static {
    /// The provider type used for chain access.
    type Provider: Provider + Clone + Send + Sync;

    /// Returns the underlying provider for read-only contract calls.
    fn provider(&self) -> &Self::Provider;

    /// Returns the address this wallet signs transactions from.
    fn address(&self) -> Address;

    /// Submit a signed contract call transaction and wait for its receipt.
    ///
    /// - `contract` -- target contract address
    /// - `calldata` -- ABI-encoded function call
    /// - `note` -- human-readable operation description, used for logging
    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TransactionReceipt, EvmError>;
}

/// Wallet that signs with an in-process private key.
///
/// Wraps a provider that includes a wallet filler (built with
/// `ProviderBuilder::new().wallet(wallet).connect_http(...)`); the
/// signer address is derived from the provider's default signer.
pub struct PrivateKeyWallet<P> {
    provider: P,
    address: Address,
    required_confirmations: u64,
}

impl<P> PrivateKeyWallet<P> {
    pub fn new(provider: P, address: Address, required_confirmations: u64) -> Self {
        Self {
            provider,
            address,
            required_confirmations,
        }
    }
}

#[async_trait]
impl<P> Wallet for PrivateKeyWallet<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    type Provider = P;

    fn provider(&self) -> &P {
        &self.provider
    }

    fn address(&self) -> Address {
        self.address
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TransactionReceipt, EvmError> {
        info!(%contract, note, "Submitting contract call");

        let tx = alloy::rpc::types::TransactionRequest::default()
            .to(contract)
            .input(calldata.into());

        let pending = self.provider.send_transaction(tx).await?;

        info!(tx_hash = %pending.tx_hash(), note, "Transaction submitted");

        let receipt = pending
            .with_required_confirmations(self.required_confirmations)
            .get_receipt()
            .await?;

        if !receipt.status() {
            return Err(EvmError::Reverted {
                tx_hash: receipt.transaction_hash,
            });
        }

        info!(tx_hash = %receipt.transaction_hash, note, "Transaction confirmed");

        Ok(receipt)
    }
}

#[async_trait]
impl<T: Wallet> Wallet for Arc<T> {
    type Provider = T::Provider;

    fn provider(&self) -> &Self::Provider {
        (**self).provider()
    }

    fn address(&self) -> Address {
        (**self).address()
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TransactionReceipt, EvmError> {
        (**self).send(contract, calldata, note).await
    }
}
