//! CLI commands for Gateway transfers, vault inspection, and recovery.

use alloy::network::EthereumWallet;
use alloy::primitives::utils::format_ether;
use alloy::primitives::{Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use clap::{Parser, Subcommand};
use std::io::Write;

use crate::amount::Usdc;
use crate::balance;
use crate::bindings::IERC20;
use crate::chain::{Chain, EvmChain};
use crate::config::{Ctx, Env};
use crate::deposit::{deposit_each, EvmDepositor};
use crate::evm::{PrivateKeyWallet, Wallet};
use crate::gateway::GatewayApiClient;
use crate::mint::{EvmMinter, MintSubmitter};
use crate::transfer::{Direction, TransferRequest, Transferor};

const REQUIRED_CONFIRMATIONS: u64 = 1;

#[derive(Debug, Parser)]
#[command(name = "gateway-transfer")]
#[command(about = "Move USDC between EVM testnets and the Arc ledger via Circle Gateway")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub env: Env,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a full transfer: vault top-up if needed, burn intent, mint
    ///
    /// The Arc ledger is always the other endpoint; `--chain` names the
    /// EVM side and `--direction` which way the USDC moves.
    Transfer {
        /// Direction of transfer
        #[arg(short = 'd', long = "direction")]
        direction: Direction,
        /// EVM endpoint of the transfer
        #[arg(short = 'c', long = "chain")]
        chain: EvmChain,
        /// Amount of USDC to transfer
        #[arg(short = 'a', long = "amount")]
        amount: Usdc,
    },

    /// Show vault, wallet USDC, and native balances on every registered chain
    Balances,

    /// Deposit wallet USDC into the Gateway vault
    ///
    /// The transfer command does this automatically when the vault is
    /// short; use this to pre-fund vaults ahead of time. Repeat
    /// `--chain` to deposit the amount on several chains in sequence.
    Deposit {
        /// Chain to deposit on (repeatable)
        #[arg(short = 'c', long = "chain", required = true)]
        chains: Vec<Chain>,
        /// Amount of USDC to deposit on each chain
        #[arg(short = 'a', long = "amount")]
        amount: Usdc,
    },

    /// Redeem an already-issued attestation on the destination chain
    ///
    /// Use this when a transfer burned successfully but the mint failed,
    /// for example because the destination wallet ran out of gas.
    MintRecover {
        /// Destination chain to mint on
        #[arg(short = 'c', long = "chain")]
        chain: Chain,
        /// Attestation payload returned by the gateway (0x-prefixed hex)
        #[arg(long = "attestation")]
        attestation: Bytes,
        /// Operator co-signature returned by the gateway (0x-prefixed hex)
        #[arg(long = "signature")]
        signature: Bytes,
    },
}

pub async fn run(ctx: Ctx, command: Commands) -> anyhow::Result<()> {
    run_command(ctx, command, &mut std::io::stdout()).await
}

async fn run_command<W: Write>(
    ctx: Ctx,
    command: Commands,
    stdout: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Transfer {
            direction,
            chain,
            amount,
        } => transfer_command(stdout, direction, chain, amount, &ctx).await,
        Commands::Balances => balances_command(stdout, &ctx).await,
        Commands::Deposit { chains, amount } => {
            deposit_command(stdout, &chains, amount, &ctx).await
        }
        Commands::MintRecover {
            chain,
            attestation,
            signature,
        } => mint_recover_command(stdout, chain, attestation, signature, &ctx).await,
    }
}

/// Connects a signing wallet to `chain` over HTTP.
fn connect_wallet(ctx: &Ctx, chain: Chain) -> PrivateKeyWallet<DynProvider> {
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(ctx.signer.clone()))
        .connect_http(ctx.rpc_url(chain).clone())
        .erased();

    PrivateKeyWallet::new(provider, ctx.signer.address(), REQUIRED_CONFIRMATIONS)
}

fn gateway_client(ctx: &Ctx) -> GatewayApiClient {
    GatewayApiClient::new(ctx.gateway_url.as_str())
}

async fn transfer_command<W: Write>(
    stdout: &mut W,
    direction: Direction,
    chain: EvmChain,
    amount: Usdc,
    ctx: &Ctx,
) -> anyhow::Result<()> {
    let request = TransferRequest::new(direction, chain, amount)?;
    let (source, dest) = request.endpoints();

    writeln!(
        stdout,
        "Gateway transfer: {source} -> {dest}, Amount: {amount} USDC"
    )?;
    writeln!(stdout, "   Depositor: {}", ctx.signer.address())?;

    let transferor = Transferor::new(
        gateway_client(ctx),
        ctx.signer.clone(),
        EvmDepositor::new(connect_wallet(ctx, source), source),
        EvmMinter::new(connect_wallet(ctx, dest), dest),
    )
    .with_fee_buffer(ctx.fee_buffer)
    .with_max_fee(ctx.max_fee)
    .with_polling(ctx.polling.clone());

    let outcome = transferor.run(&request).await?;

    if let Some(deposit_tx) = outcome.deposit_tx {
        writeln!(stdout, "   Vault top-up tx on {source}: {deposit_tx}")?;
    }
    writeln!(
        stdout,
        "Transfer complete! Mint tx on {dest}: {}",
        outcome.mint_tx
    )?;

    Ok(())
}

async fn balances_command<W: Write>(stdout: &mut W, ctx: &Ctx) -> anyhow::Result<()> {
    let gateway = gateway_client(ctx);
    let depositor = ctx.signer.address();

    writeln!(stdout, "Vault balances for {depositor}:")?;

    let entries = balance::vault_balances(&gateway, depositor, &Chain::ALL).await?;

    if entries.is_empty() {
        writeln!(stdout, "   (no balances reported)")?;
    }

    for entry in entries {
        writeln!(stdout, "   {:<16} {} USDC", entry.label, entry.balance)?;
    }

    writeln!(stdout, "Wallet balances:")?;

    for chain in Chain::ALL {
        let wallet = connect_wallet(ctx, chain);
        let token = IERC20::new(chain.usdc(), wallet.provider().clone());

        let usdc_units = token.balanceOf(depositor).call().await?;
        let native = wallet.provider().get_balance(depositor).await?;

        write_wallet_balance(stdout, chain, Usdc::from_units(usdc_units)?, native)?;
    }

    Ok(())
}

fn write_wallet_balance<W: Write>(
    stdout: &mut W,
    chain: Chain,
    usdc: Usdc,
    native: U256,
) -> std::io::Result<()> {
    writeln!(
        stdout,
        "   {:<16} {} USDC, {} {}",
        chain.key(),
        usdc,
        format_native(native),
        chain.descriptor().native_symbol
    )
}

/// Formats a wei balance in whole-coin units without trailing zeros.
fn format_native(amount: U256) -> String {
    let formatted = format_ether(amount);

    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

async fn deposit_command<W: Write>(
    stdout: &mut W,
    chains: &[Chain],
    amount: Usdc,
    ctx: &Ctx,
) -> anyhow::Result<()> {
    if !amount.is_positive() {
        anyhow::bail!("deposit amount must be positive, got {amount}");
    }

    let units = amount.to_units()?;

    for chain in chains {
        writeln!(stdout, "Depositing {amount} USDC into the vault on {chain}")?;
    }

    let depositors: Vec<_> = chains
        .iter()
        .map(|&chain| EvmDepositor::new(connect_wallet(ctx, chain), chain))
        .collect();
    let batch: Vec<_> = depositors.iter().map(|d| (d, units)).collect();

    let hashes = deposit_each(&batch).await?;

    for (chain, tx_hash) in chains.iter().zip(hashes) {
        writeln!(stdout, "Deposit complete on {chain}! Tx: {tx_hash}")?;
    }

    Ok(())
}

async fn mint_recover_command<W: Write>(
    stdout: &mut W,
    chain: Chain,
    attestation: Bytes,
    signature: Bytes,
    ctx: &Ctx,
) -> anyhow::Result<()> {
    writeln!(
        stdout,
        "Submitting attestation ({} bytes) for mint on {chain}",
        attestation.len()
    )?;

    let minter = EvmMinter::new(connect_wallet(ctx, chain), chain);
    let tx_hash = minter.mint(attestation, signature).await?;

    writeln!(stdout, "Mint complete! Tx: {tx_hash}")?;

    Ok(())
}
