//! Custodial vault balance reads and the settlement-lag waiter.
//!
//! The inspector is a pure read over the gateway balance endpoint. The
//! waiter bridges the lag between an on-chain deposit confirming and
//! the attestation service recognizing it: it re-reads the vault
//! balance at a fixed interval until a threshold is met or a deadline
//! elapses. The only suspension point is `tokio::time::sleep`; no lock
//! is held across polls.

use std::time::Duration;

use alloy::primitives::Address;
use backon::{ExponentialBuilder, Retryable};
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::amount::Usdc;
use crate::chain::Chain;
use crate::gateway::{GatewayApiClient, GatewayApiError};

/// Vault balance snapshot for one Gateway domain.
///
/// `chain` is `None` for domains the registry does not know yet; they
/// still surface, under a synthetic `Domain N` label.
#[derive(Debug, Clone)]
pub struct VaultBalance {
    pub chain: Option<Chain>,
    pub label: String,
    pub balance: Usdc,
}

/// Batched vault balance read for a set of chains.
pub async fn vault_balances(
    gateway: &GatewayApiClient,
    depositor: Address,
    chains: &[Chain],
) -> Result<Vec<VaultBalance>, GatewayApiError> {
    let domains: Vec<u32> = chains.iter().map(|chain| chain.domain()).collect();
    let balances = gateway.balances(depositor, &domains).await?;

    Ok(balances
        .into_iter()
        .map(|entry| {
            let chain = Chain::from_domain(entry.domain);
            let label = match chain {
                Some(chain) => chain.key().to_string(),
                None => format!("Domain {}", entry.domain),
            };

            VaultBalance {
                chain,
                label,
                balance: entry.balance,
            }
        })
        .collect())
}

/// Vault balance for a single chain.
///
/// A response omitting the requested domain is read as a zero balance;
/// the service drops domains the depositor has never touched.
pub async fn vault_balance(
    gateway: &GatewayApiClient,
    depositor: Address,
    chain: Chain,
) -> Result<Usdc, GatewayApiError> {
    let balances = gateway.balances(depositor, &[chain.domain()]).await?;

    let balance = balances
        .iter()
        .find(|entry| entry.domain == chain.domain())
        .map_or(Usdc::ZERO, |entry| entry.balance);

    debug!(%chain, %balance, "Vault balance observed");

    Ok(balance)
}

/// Polling cadence for [`wait_for_vault_balance`].
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_retries: usize,
    pub min_retry_delay: Duration,
    pub max_retry_delay: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(25 * 60),
            max_retries: 5,
            min_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error("gateway API error: {0}")]
    Gateway(#[from] GatewayApiError),
    #[error(
        "vault balance on {chain} did not reach {threshold} within {elapsed:?} \
         (last observed: {last_observed})"
    )]
    Timeout {
        chain: Chain,
        threshold: Usdc,
        last_observed: Usdc,
        elapsed: Duration,
    },
}

/// Polls the vault balance on `chain` until it reaches `threshold`.
///
/// Returns the first balance at or above the threshold. Transient
/// gateway 5xx responses are retried with backoff inside each poll;
/// anything else propagates immediately. On deadline the error carries
/// the last observed balance.
pub async fn wait_for_vault_balance(
    gateway: &GatewayApiClient,
    depositor: Address,
    chain: Chain,
    threshold: Usdc,
    config: &PollingConfig,
) -> Result<Usdc, WaitError> {
    let start = Instant::now();
    let mut last_observed = Usdc::ZERO;

    let retry_strategy = ExponentialBuilder::default()
        .with_max_times(config.max_retries)
        .with_min_delay(config.min_retry_delay)
        .with_max_delay(config.max_retry_delay);

    info!(%chain, %threshold, "Waiting for vault balance to settle");

    loop {
        if start.elapsed() >= config.timeout {
            return Err(WaitError::Timeout {
                chain,
                threshold,
                last_observed,
                elapsed: start.elapsed(),
            });
        }

        let observed = (|| async { vault_balance(gateway, depositor, chain).await })
            .retry(retry_strategy)
            .when(|error| {
                matches!(
                    error,
                    GatewayApiError::Api { status, .. } if status.is_server_error()
                )
            })
            .await?;

        if observed >= threshold {
            info!(%chain, %observed, "Vault balance threshold reached");
            return Ok(observed);
        }

        if observed != last_observed {
            info!(%chain, %observed, %threshold, "Vault balance still settling");
        }
        last_observed = observed;

        sleep(config.interval).await;
    }
}
