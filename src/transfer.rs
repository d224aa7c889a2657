//! End-to-end transfer orchestration: top up the source vault if
//! needed, sign and submit the burn intent, redeem the attestation on
//! the destination chain.

use alloy::primitives::TxHash;
use alloy::signers::local::PrivateKeySigner;
use clap::ValueEnum;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::amount::{AmountError, Usdc};
use crate::balance::{self, PollingConfig, WaitError};
use crate::chain::{Chain, EvmChain};
use crate::deposit::{DepositError, VaultDepositor};
use crate::gateway::{GatewayApiClient, GatewayApiError};
use crate::intent::{build_burn_intent, sign_burn_intent};
use crate::mint::{MintError, MintSubmitter};

/// Extra vault balance required beyond the transfer amount, covering
/// the Gateway transfer fee.
pub const DEFAULT_FEE_BUFFER: Decimal = dec!(0.01);

/// Cap on the fee the signed intent authorizes the Gateway to take.
pub const DEFAULT_MAX_FEE: Decimal = dec!(1);

/// Which side of the Arc ledger the USDC moves toward. The Arc ledger
/// is always one endpoint; the selected EVM chain is the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// Burn on the EVM chain, mint on Arc.
    ToArc,
    /// Burn on Arc, mint on the EVM chain.
    FromArc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub direction: Direction,
    pub chain: EvmChain,
    pub amount: Usdc,
}

impl TransferRequest {
    pub fn new(
        direction: Direction,
        chain: EvmChain,
        amount: Usdc,
    ) -> Result<Self, TransferError> {
        if !amount.is_positive() {
            return Err(TransferError::InvalidAmount(amount));
        }

        Ok(Self {
            direction,
            chain,
            amount,
        })
    }

    /// The `(source, destination)` chains of the burn and mint.
    pub fn endpoints(&self) -> (Chain, Chain) {
        let evm = Chain::from(self.chain);
        match self.direction {
            Direction::ToArc => (evm, Chain::ArcTestnet),
            Direction::FromArc => (Chain::ArcTestnet, evm),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("transfer amount must be positive, got {0}")]
    InvalidAmount(Usdc),
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Deposit(#[from] DepositError),
    #[error(transparent)]
    Balance(#[from] WaitError),
    #[error("gateway API error: {0}")]
    Gateway(#[from] GatewayApiError),
    #[error("signing failed: {0}")]
    Signer(#[from] alloy::signers::Error),
    #[error(transparent)]
    Mint(#[from] MintError),
}

/// Outcome of a completed transfer.
#[derive(Debug)]
pub struct TransferOutcome {
    /// Deposit transaction on the source chain, when a top-up ran.
    pub deposit_tx: Option<TxHash>,
    /// Mint transaction on the destination chain.
    pub mint_tx: TxHash,
}

/// Drives one transfer from vault check through destination mint.
pub struct Transferor<D, M> {
    gateway: GatewayApiClient,
    signer: PrivateKeySigner,
    depositor: D,
    minter: M,
    fee_buffer: Usdc,
    max_fee: Usdc,
    polling: PollingConfig,
}

impl<D: VaultDepositor, M: MintSubmitter> Transferor<D, M> {
    pub fn new(
        gateway: GatewayApiClient,
        signer: PrivateKeySigner,
        depositor: D,
        minter: M,
    ) -> Self {
        Self {
            gateway,
            signer,
            depositor,
            minter,
            fee_buffer: Usdc::new(DEFAULT_FEE_BUFFER),
            max_fee: Usdc::new(DEFAULT_MAX_FEE),
            polling: PollingConfig::default(),
        }
    }

    pub fn with_fee_buffer(mut self, fee_buffer: Usdc) -> Self {
        self.fee_buffer = fee_buffer;
        self
    }

    pub fn with_max_fee(mut self, max_fee: Usdc) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Runs the transfer to completion.
    ///
    /// The vault must hold the amount plus the fee buffer before the
    /// intent is signed; a deficit triggers a wallet deposit on the
    /// source chain and a wait for it to settle. Once the burn intent
    /// is accepted by the Gateway the burn is final, so any later mint
    /// failure leaves a redeemable attestation rather than lost funds.
    pub async fn run(&self, request: &TransferRequest) -> Result<TransferOutcome, TransferError> {
        let (source, dest) = request.endpoints();
        let depositor_address = self.signer.address();

        info!(
            %source,
            %dest,
            amount = %request.amount,
            "Starting Gateway transfer"
        );

        let required = request.amount.checked_add(self.fee_buffer)?;
        let available = balance::vault_balance(&self.gateway, depositor_address, source).await?;

        let deposit_tx = if available < required {
            info!(
                %source,
                %available,
                %required,
                "Vault balance deficient, depositing from wallet"
            );

            let tx_hash = self.depositor.deposit(required.to_units_ceil()?).await?;

            balance::wait_for_vault_balance(
                &self.gateway,
                depositor_address,
                source,
                required,
                &self.polling,
            )
            .await?;

            Some(tx_hash)
        } else {
            None
        };

        let intent = build_burn_intent(
            source,
            dest,
            request.amount.to_units()?,
            depositor_address,
            None,
            self.max_fee.to_units()?,
        );
        let signed = sign_burn_intent(&self.signer, intent).await?;

        let attestation = self.gateway.transfer(&signed).await?;

        info!(%dest, "Attestation received, minting on destination");

        let mint_tx = self
            .minter
            .mint(attestation.attestation, attestation.signature)
            .await?;

        info!(%mint_tx, "Transfer complete");

        Ok(TransferOutcome {
            deposit_tx,
            mint_tx,
        })
    }
}
