//! HTTP client for the Gateway attestation service.
//!
//! Two endpoints matter here: `POST /v1/balances` for custodial vault
//! balances and `POST /v1/transfer` to exchange a signed burn intent
//! for an attestation plus operator co-signature. Integer-valued intent
//! fields wider than 32 bits travel as decimal strings to avoid
//! precision loss in JSON.

use alloy::primitives::{Address, Bytes, FixedBytes};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amount::Usdc;
use crate::intent::{BurnIntent, SignedBurnIntent, TransferSpec};

/// Token identifier the balance endpoint expects.
pub const USDC_TOKEN: &str = "USDC";

/// Errors from the attestation service boundary. All are fatal for the
/// current attempt; a failed exchange never consumed anything on-chain,
/// so the whole transfer is safe to retry from scratch with a fresh salt.
#[derive(Debug, thiserror::Error)]
pub enum GatewayApiError {
    #[error("gateway HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("gateway response missing field `{field}`")]
    MissingField { field: &'static str },
}

/// Gateway attestation service HTTP client.
pub struct GatewayApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GatewayApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();

        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Queries custodial balances for `depositor` across the given
    /// domains in one batched request.
    pub async fn balances(
        &self,
        depositor: Address,
        domains: &[u32],
    ) -> Result<Vec<DomainBalance>, GatewayApiError> {
        let sources: Vec<BalanceSource> = domains
            .iter()
            .map(|&domain| BalanceSource { domain, depositor })
            .collect();
        let request = BalancesRequest {
            token: USDC_TOKEN,
            sources: &sources,
        };
        let url = format!("{}/v1/balances", self.base_url);

        debug!(%depositor, ?domains, "Querying gateway balances");

        let response = self.http_client.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            return Err(GatewayApiError::Api { status, body });
        }

        let parsed: BalancesResponse = response.json().await?;

        Ok(parsed.balances)
    }

    /// Submits a signed burn intent and returns the attestation payload
    /// plus operator co-signature.
    ///
    /// The request body is a list for forward compatibility with batched
    /// intents; this client always submits exactly one.
    pub async fn transfer(
        &self,
        signed: &SignedBurnIntent,
    ) -> Result<AttestationResult, GatewayApiError> {
        let url = format!("{}/v1/transfer", self.base_url);
        let body = [TransferEntry::from(signed)];

        debug!(value = %signed.intent.spec.value, "Submitting burn intent to gateway");

        let response = self.http_client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            return Err(GatewayApiError::Api { status, body });
        }

        let parsed: TransferResponse = response.json().await?;

        let attestation = parsed
            .attestation
            .ok_or(GatewayApiError::MissingField {
                field: "attestation",
            })?;
        let signature = parsed
            .signature
            .ok_or(GatewayApiError::MissingField { field: "signature" })?;

        Ok(AttestationResult {
            attestation,
            signature,
        })
    }
}

/// One (domain, depositor) pair in a balance query.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BalanceSource {
    pub domain: u32,
    pub depositor: Address,
}

#[derive(Serialize)]
struct BalancesRequest<'a> {
    token: &'a str,
    sources: &'a [BalanceSource],
}

/// Custodial balance for one Gateway domain.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DomainBalance {
    pub domain: u32,
    pub balance: Usdc,
}

#[derive(Deserialize)]
struct BalancesResponse {
    balances: Vec<DomainBalance>,
}

/// Attestation payload and operator co-signature, held only long
/// enough to submit the mint.
#[derive(Debug, Clone)]
pub struct AttestationResult {
    pub attestation: Bytes,
    pub signature: Bytes,
}

#[derive(Deserialize)]
struct TransferResponse {
    attestation: Option<Bytes>,
    signature: Option<Bytes>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferEntry {
    burn_intent: BurnIntentBody,
    signature: Bytes,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BurnIntentBody {
    max_block_height: String,
    max_fee: String,
    spec: TransferSpecBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferSpecBody {
    version: u32,
    source_domain: u32,
    destination_domain: u32,
    source_contract: FixedBytes<32>,
    destination_contract: FixedBytes<32>,
    source_token: FixedBytes<32>,
    destination_token: FixedBytes<32>,
    source_depositor: FixedBytes<32>,
    destination_recipient: FixedBytes<32>,
    source_signer: FixedBytes<32>,
    destination_caller: FixedBytes<32>,
    value: String,
    salt: FixedBytes<32>,
    hook_data: Bytes,
}

impl From<&SignedBurnIntent> for TransferEntry {
    fn from(signed: &SignedBurnIntent) -> Self {
        Self {
            burn_intent: BurnIntentBody::from(&signed.intent),
            signature: signed.signature.clone(),
        }
    }
}

impl From<&BurnIntent> for BurnIntentBody {
    fn from(intent: &BurnIntent) -> Self {
        let spec: &TransferSpec = &intent.spec;

        Self {
            max_block_height: intent.maxBlockHeight.to_string(),
            max_fee: intent.maxFee.to_string(),
            spec: TransferSpecBody {
                version: spec.version,
                source_domain: spec.sourceDomain,
                destination_domain: spec.destinationDomain,
                source_contract: spec.sourceContract,
                destination_contract: spec.destinationContract,
                source_token: spec.sourceToken,
                destination_token: spec.destinationToken,
                source_depositor: spec.sourceDepositor,
                destination_recipient: spec.destinationRecipient,
                source_signer: spec.sourceSigner,
                destination_caller: spec.destinationCaller,
                value: spec.value.to_string(),
                salt: spec.salt,
                hook_data: spec.hookData.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{U256, address};
    use httpmock::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::chain::Chain;
    use crate::intent::build_burn_intent;

    use super::*;

    fn depositor() -> Address {
        address!("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd")
    }

    fn signed_intent() -> SignedBurnIntent {
        let intent = build_burn_intent(
            Chain::BaseSepolia,
            Chain::ArcTestnet,
            U256::from(1_000_000u64),
            depositor(),
            None,
            U256::from(10_000u64),
        );

        SignedBurnIntent {
            intent,
            signature: Bytes::from(vec![0x11; 65]),
        }
    }

    #[tokio::test]
    async fn balances_maps_domains() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/balances")
                .json_body_partial(r#"{"token": "USDC"}"#);
            then.status(200).json_body(json!({
                "balances": [
                    { "domain": 6, "balance": "12.5" },
                    { "domain": 16, "balance": "0" }
                ]
            }));
        });

        let client = GatewayApiClient::new(server.base_url());
        let balances = client
            .balances(depositor(), &[6, 16])
            .await
            .unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].domain, 6);
        assert_eq!(balances[0].balance, Usdc::new(dec!(12.5)));
        assert_eq!(balances[1].balance, Usdc::ZERO);

        mock.assert();
    }

    #[tokio::test]
    async fn balances_surfaces_non_success_status() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1/balances");
            then.status(500).body("upstream exploded");
        });

        let client = GatewayApiClient::new(server.base_url());
        let error = client.balances(depositor(), &[6]).await.unwrap_err();

        assert!(matches!(
            &error,
            GatewayApiError::Api { status, body }
                if *status == StatusCode::INTERNAL_SERVER_ERROR && body == "upstream exploded"
        ));
    }

    #[tokio::test]
    async fn transfer_returns_attestation_and_signature() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/transfer");
            then.status(201).json_body(json!({
                "attestation": "0xdeadbeef",
                "signature": "0x0102"
            }));
        });

        let client = GatewayApiClient::new(server.base_url());
        let result = client.transfer(&signed_intent()).await.unwrap();

        assert_eq!(result.attestation, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(result.signature, Bytes::from(vec![0x01, 0x02]));

        mock.assert();
    }

    #[tokio::test]
    async fn transfer_sends_bigints_as_decimal_strings() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/transfer")
                .json_body_partial(r#"[{"burnIntent": {"spec": {"value": "1000000"}}}]"#);
            then.status(200).json_body(json!({
                "attestation": "0x01",
                "signature": "0x02"
            }));
        });

        let client = GatewayApiClient::new(server.base_url());
        client.transfer(&signed_intent()).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn transfer_error_carries_status_and_body() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1/transfer");
            then.status(400).body("insufficient vault balance");
        });

        let client = GatewayApiClient::new(server.base_url());
        let error = client.transfer(&signed_intent()).await.unwrap_err();

        let message = error.to_string();
        assert!(message.contains("400"), "missing status: {message}");
        assert!(
            message.contains("insufficient vault balance"),
            "missing body: {message}"
        );
    }

    #[tokio::test]
    async fn transfer_rejects_response_missing_attestation() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1/transfer");
            then.status(200).json_body(json!({ "signature": "0x02" }));
        });

        let client = GatewayApiClient::new(server.base_url());
        let error = client.transfer(&signed_intent()).await.unwrap_err();

        assert!(matches!(
            error,
            GatewayApiError::MissingField {
                field: "attestation"
            }
        ));
    }

    #[tokio::test]
    async fn transfer_rejects_response_missing_signature() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1/transfer");
            then.status(200).json_body(json!({ "attestation": "0x01" }));
        });

        let client = GatewayApiClient::new(server.base_url());
        let error = client.transfer(&signed_intent()).await.unwrap_err();

        assert!(matches!(
            error,
            GatewayApiError::MissingField { field: "signature" }
        ));
    }
}
