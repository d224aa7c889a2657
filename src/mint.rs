//! Redeeming a Gateway attestation on the destination chain.

use alloy::primitives::{Bytes, TxHash};
use alloy::sol_types::SolCall;
use alloy::transports::RpcError;
use async_trait::async_trait;
use tracing::info;

use crate::bindings::IGatewayMinter;
use crate::chain::{Chain, GATEWAY_MINTER};
use crate::evm::{EvmError, Wallet};

#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// The burn is final and the attestation remains redeemable; only the
    /// mint needs retrying once the destination wallet is funded with gas.
    #[error(
        "minting on {chain} failed for lack of native gas: {source}; \
         the burn is already final — fund the wallet and retry the mint alone"
    )]
    InsufficientGas { chain: Chain, source: EvmError },
    #[error("mint transaction failed on {chain}: {source}")]
    Execution { chain: Chain, source: EvmError },
}

/// Submits an attestation to the Gateway minter on one chain.
#[async_trait]
pub trait MintSubmitter: Send + Sync {
    async fn mint(&self, attestation: Bytes, signature: Bytes) -> Result<TxHash, MintError>;
}

/// [`MintSubmitter`] over a live EVM chain connection.
pub struct EvmMinter<W> {
    wallet: W,
    chain: Chain,
}

impl<W> EvmMinter<W> {
    pub fn new(wallet: W, chain: Chain) -> Self {
        Self { wallet, chain }
    }
}

#[async_trait]
impl<W: Wallet> MintSubmitter for EvmMinter<W> {
    async fn mint(&self, attestation: Bytes, signature: Bytes) -> Result<TxHash, MintError> {
        info!(chain = %self.chain, "Submitting Gateway attestation for mint");

        let call = IGatewayMinter::gatewayMintCall {
            attestationPayload: attestation,
            signature,
        };

        let receipt = self
            .wallet
            .send(
                GATEWAY_MINTER,
                Bytes::from(SolCall::abi_encode(&call)),
                "Gateway mint",
            )
            .await
            .map_err(|source| {
                if is_gas_shortfall(&source) {
                    MintError::InsufficientGas {
                        chain: self.chain,
                        source,
                    }
                } else {
                    MintError::Execution {
                        chain: self.chain,
                        source,
                    }
                }
            })?;

        Ok(receipt.transaction_hash)
    }
}

/// Whether the node rejected the transaction because the sender cannot
/// cover gas. Nodes signal this with an RPC error rather than a revert,
/// so it is visible before anything lands on chain.
fn is_gas_shortfall(error: &EvmError) -> bool {
    match error {
        EvmError::Transport(RpcError::ErrorResp(payload)) => payload
            .message
            .to_lowercase()
            .contains("insufficient funds"),
        _ => false,
    }
}
