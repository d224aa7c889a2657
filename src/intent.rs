//! Burn intent construction and EIP-712 signing.
//!
//! A burn intent authorizes Gateway to debit the depositor's vault
//! balance on the source ledger in exchange for a mint on the
//! destination ledger. The `TransferSpec`/`BurnIntent` schema below is
//! the wire contract for signature verification: field order is part of
//! the typed-data hash, so reordering a field produces a wrong hash
//! (not a decode error) and the attestation service silently rejects
//! the signature.

use alloy::primitives::{Address, B256, Bytes, FixedBytes, U256};
use alloy::signers::Signer;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::{Eip712Domain, eip712_domain};

use crate::chain::{Chain, GATEWAY_MINTER, GATEWAY_WALLET};

sol! {
    /// Value-transfer description between two Gateway domains.
    #[derive(Debug)]
    struct TransferSpec {
        uint32 version;
        uint32 sourceDomain;
        uint32 destinationDomain;
        bytes32 sourceContract;
        bytes32 destinationContract;
        bytes32 sourceToken;
        bytes32 destinationToken;
        bytes32 sourceDepositor;
        bytes32 destinationRecipient;
        bytes32 sourceSigner;
        bytes32 destinationCaller;
        uint256 value;
        bytes32 salt;
        bytes hookData;
    }

    /// Signed wrapper around a [`TransferSpec`].
    #[derive(Debug)]
    struct BurnIntent {
        uint256 maxBlockHeight;
        uint256 maxFee;
        TransferSpec spec;
    }
}

/// EIP-712 signing domain fixed by the GatewayWallet contract.
pub static GATEWAY_DOMAIN: Eip712Domain = eip712_domain! {
    name: "GatewayWallet",
    version: "1",
};

/// Current TransferSpec schema version.
pub const TRANSFER_SPEC_VERSION: u32 = 1;

/// Canonical 32-byte form of an address: the 20 address bytes
/// left-padded with zeros. Part of the signature's domain, so it must
/// be bit-exact with what the verifying contract computes.
pub fn canonical_address(address: Address) -> FixedBytes<32> {
    FixedBytes::<32>::left_padding_from(address.as_slice())
}

/// A burn intent together with the depositor's signature over its
/// typed-data encoding. Produced once, submitted once; the salt makes
/// every intent unique, so a signed intent is never reused.
#[derive(Debug)]
pub struct SignedBurnIntent {
    pub intent: BurnIntent,
    pub signature: Bytes,
}

/// Builds a burn intent for moving `value` smallest units from
/// `source` to `dest`.
///
/// The recipient defaults to the depositor (self-transfer between the
/// depositor's own balances). `destinationCaller` is left zero so any
/// caller may submit the mint. Each call draws a fresh random salt.
pub fn build_burn_intent(
    source: Chain,
    dest: Chain,
    value: U256,
    depositor: Address,
    recipient: Option<Address>,
    max_fee: U256,
) -> BurnIntent {
    let recipient = recipient.unwrap_or(depositor);

    BurnIntent {
        // No expiry in practice; the salt already makes intents one-shot.
        maxBlockHeight: U256::MAX,
        maxFee: max_fee,
        spec: TransferSpec {
            version: TRANSFER_SPEC_VERSION,
            sourceDomain: source.domain(),
            destinationDomain: dest.domain(),
            sourceContract: canonical_address(GATEWAY_WALLET),
            destinationContract: canonical_address(GATEWAY_MINTER),
            sourceToken: canonical_address(source.usdc()),
            destinationToken: canonical_address(dest.usdc()),
            sourceDepositor: canonical_address(depositor),
            destinationRecipient: canonical_address(recipient),
            sourceSigner: canonical_address(depositor),
            destinationCaller: FixedBytes::<32>::ZERO,
            value,
            salt: B256::random(),
            hookData: Bytes::new(),
        },
    }
}

/// Signs a burn intent with the depositor's key under the
/// GatewayWallet typed-data domain.
pub async fn sign_burn_intent(
    signer: &PrivateKeySigner,
    intent: BurnIntent,
) -> Result<SignedBurnIntent, alloy::signers::Error> {
    let signature = signer.sign_typed_data(&intent, &GATEWAY_DOMAIN).await?;

    Ok(SignedBurnIntent {
        intent,
        signature: Bytes::from(signature.as_bytes().to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use alloy::sol_types::SolStruct;
    use proptest::prelude::*;
    use std::str::FromStr;

    use super::*;

    fn depositor() -> Address {
        address!("0x1111111111111111111111111111111111111111")
    }

    fn build(value: u64) -> BurnIntent {
        build_burn_intent(
            Chain::BaseSepolia,
            Chain::ArcTestnet,
            U256::from(value),
            depositor(),
            None,
            U256::from(1_000_000u64),
        )
    }

    #[test]
    fn encode_type_pins_schema_and_field_order() {
        assert_eq!(
            BurnIntent::eip712_encode_type(),
            "BurnIntent(uint256 maxBlockHeight,uint256 maxFee,TransferSpec spec)\
             TransferSpec(uint32 version,uint32 sourceDomain,uint32 destinationDomain,\
             bytes32 sourceContract,bytes32 destinationContract,bytes32 sourceToken,\
             bytes32 destinationToken,bytes32 sourceDepositor,bytes32 destinationRecipient,\
             bytes32 sourceSigner,bytes32 destinationCaller,uint256 value,bytes32 salt,\
             bytes hookData)"
        );
    }

    #[test]
    fn same_request_gets_distinct_salts_and_hashes() {
        let first = build(1_000_000);
        let second = build(1_000_000);

        assert_ne!(first.spec.salt, second.spec.salt);
        assert_ne!(
            first.eip712_signing_hash(&GATEWAY_DOMAIN),
            second.eip712_signing_hash(&GATEWAY_DOMAIN)
        );
    }

    #[test]
    fn domains_come_from_the_registry() {
        let intent = build(5);
        assert_eq!(intent.spec.sourceDomain, Chain::BaseSepolia.domain());
        assert_eq!(intent.spec.destinationDomain, Chain::ArcTestnet.domain());
        assert_ne!(intent.spec.sourceDomain, intent.spec.destinationDomain);
    }

    #[test]
    fn destination_caller_is_unrestricted() {
        assert_eq!(build(5).spec.destinationCaller, FixedBytes::<32>::ZERO);
    }

    #[test]
    fn recipient_defaults_to_depositor() {
        let intent = build(5);
        assert_eq!(
            intent.spec.destinationRecipient,
            canonical_address(depositor())
        );
        assert_eq!(intent.spec.sourceDepositor, intent.spec.destinationRecipient);
    }

    #[test]
    fn explicit_recipient_is_respected() {
        let recipient = address!("0x2222222222222222222222222222222222222222");
        let intent = build_burn_intent(
            Chain::EthereumSepolia,
            Chain::ArcTestnet,
            U256::from(5u64),
            depositor(),
            Some(recipient),
            U256::ZERO,
        );

        assert_eq!(
            intent.spec.destinationRecipient,
            canonical_address(recipient)
        );
        assert_eq!(intent.spec.sourceSigner, canonical_address(depositor()));
    }

    #[test]
    fn canonical_address_left_pads_with_zeros() {
        let canon = canonical_address(depositor());
        assert_eq!(&canon[..12], &[0u8; 12]);
        assert_eq!(&canon[12..], depositor().as_slice());
    }

    #[test]
    fn canonical_address_roundtrips_through_hex() {
        let canon = canonical_address(depositor());
        let reparsed = Address::from_str(&format!(
            "0x{}",
            alloy::hex::encode(&canon[12..])
        ))
        .unwrap();

        assert_eq!(canonical_address(reparsed), canon);
    }

    #[tokio::test]
    async fn signature_is_65_bytes_and_verifies_signer() {
        let signer = PrivateKeySigner::random();
        let intent = build_burn_intent(
            Chain::BaseSepolia,
            Chain::ArcTestnet,
            U256::from(1_000_000u64),
            signer.address(),
            None,
            U256::from(10_000u64),
        );
        let hash = intent.eip712_signing_hash(&GATEWAY_DOMAIN);

        let signed = sign_burn_intent(&signer, intent).await.unwrap();

        assert_eq!(signed.signature.len(), 65);

        let signature =
            alloy::primitives::Signature::from_raw(signed.signature.as_ref()).unwrap();
        assert_eq!(
            signature.recover_address_from_prehash(&hash).unwrap(),
            signer.address()
        );
    }

    proptest! {
        #[test]
        fn canonicalization_is_idempotent(raw in any::<[u8; 20]>()) {
            let address = Address::from(raw);
            let canon = canonical_address(address);

            prop_assert_eq!(canon.len(), 32);
            prop_assert_eq!(
                canonical_address(Address::from_slice(&canon[12..])),
                canon
            );
        }
    }
}
