//! USDC amount type with a single, explicit fixed-point boundary.
//!
//! User-facing amounts are decimals; everything onchain and in burn
//! intents is an integer count of smallest units (6 decimals for USDC).
//! The conversion happens exactly once, here, with round-half-up.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Number of decimal places in the USDC fixed-point representation.
pub const USDC_DECIMALS: u32 = 6;

/// A USDC dollar amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Usdc(Decimal);

impl Usdc {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Converts to smallest units (round-half-up on the sub-unit digit).
    ///
    /// `1` -> `1_000_000`, `0.5` -> `500_000`, `0.0000005` -> `1`.
    pub fn to_units(self) -> Result<U256, AmountError> {
        let scaled = self.scaled()?;
        let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Self::units_from_decimal(rounded)
    }

    /// Converts to smallest units, rounding any fractional unit up.
    ///
    /// Used when sizing deposits: depositing a unit too much is safe,
    /// depositing a unit too little strands the transfer below threshold.
    pub fn to_units_ceil(self) -> Result<U256, AmountError> {
        let scaled = self.scaled()?.ceil();

        Self::units_from_decimal(scaled)
    }

    /// Converts a smallest-unit integer back to a decimal amount.
    pub fn from_units(units: U256) -> Result<Self, AmountError> {
        let raw: u128 = units
            .try_into()
            .map_err(|_| AmountError::UnitsOverflow(units))?;
        let signed = i128::try_from(raw).map_err(|_| AmountError::UnitsOverflow(units))?;

        // Decimal carries a 96-bit mantissa, narrower than i128.
        let decimal = Decimal::try_from_i128_with_scale(signed, USDC_DECIMALS)
            .map_err(|_| AmountError::UnitsOverflow(units))?;

        Ok(Self(decimal.normalize()))
    }

    /// Checked addition, surfacing overflow instead of panicking.
    pub fn checked_add(self, rhs: Self) -> Result<Self, AmountError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    fn scaled(self) -> Result<Decimal, AmountError> {
        if self.is_negative() {
            return Err(AmountError::Negative(self));
        }

        self.0
            .checked_mul(Decimal::from(10u64.pow(USDC_DECIMALS)))
            .ok_or(AmountError::Overflow)
    }

    fn units_from_decimal(rounded: Decimal) -> Result<U256, AmountError> {
        rounded
            .to_u128()
            .map(U256::from)
            .ok_or(AmountError::Overflow)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("USDC amount cannot be negative: {0}")]
    Negative(Usdc),
    #[error("USDC amount arithmetic overflowed")]
    Overflow,
    #[error("smallest-unit value {0} does not fit a USDC amount")]
    UnitsOverflow(U256),
}

impl FromStr for Usdc {
    type Err = rust_decimal::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(value).map(Self)
    }
}

impl Display for Usdc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Usdc {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Usdc> for Decimal {
    fn from(value: Usdc) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn one_usdc_is_a_million_units() {
        let amount = Usdc::new(dec!(1));
        assert_eq!(amount.to_units().unwrap(), U256::from(1_000_000u64));
    }

    #[test]
    fn half_usdc_is_half_a_million_units() {
        let amount = Usdc::new(dec!(0.5));
        assert_eq!(amount.to_units().unwrap(), U256::from(500_000u64));
    }

    #[test]
    fn sub_unit_midpoint_rounds_up() {
        let amount = Usdc::new(dec!(0.0000005));
        assert_eq!(amount.to_units().unwrap(), U256::from(1u64));
    }

    #[test]
    fn sub_unit_below_midpoint_rounds_down() {
        let amount = Usdc::new(dec!(0.0000004));
        assert_eq!(amount.to_units().unwrap(), U256::ZERO);
    }

    #[test]
    fn ceil_rounds_any_fraction_up() {
        let amount = Usdc::new(dec!(1.0000001));
        assert_eq!(amount.to_units_ceil().unwrap(), U256::from(1_000_001u64));
    }

    #[test]
    fn ceil_leaves_exact_values_alone() {
        let amount = Usdc::new(dec!(1.01));
        assert_eq!(amount.to_units_ceil().unwrap(), U256::from(1_010_000u64));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let amount = Usdc::new(dec!(-1));
        assert!(matches!(
            amount.to_units().unwrap_err(),
            AmountError::Negative(_)
        ));
    }

    #[test]
    fn from_units_reverses_to_units() {
        let amount = Usdc::from_units(U256::from(1_010_000u64)).unwrap();
        assert_eq!(amount, Usdc::new(dec!(1.01)));
    }

    #[test]
    fn from_units_rejects_oversized_values() {
        assert!(matches!(
            Usdc::from_units(U256::MAX).unwrap_err(),
            AmountError::UnitsOverflow(_)
        ));
    }

    #[test]
    fn from_units_rejects_values_beyond_the_decimal_mantissa() {
        // Fits u128 and i128 but not Decimal's 96-bit mantissa.
        assert!(matches!(
            Usdc::from_units(U256::from(1u128 << 100)).unwrap_err(),
            AmountError::UnitsOverflow(_)
        ));
    }

    #[test]
    fn checked_add_sums() {
        let amount = Usdc::new(dec!(1)).checked_add(Usdc::new(dec!(0.01))).unwrap();
        assert_eq!(amount, Usdc::new(dec!(1.01)));
    }

    #[test]
    fn parses_from_str() {
        let amount: Usdc = "2.5".parse().unwrap();
        assert_eq!(amount, Usdc::new(dec!(2.5)));
    }

    #[test]
    fn displays_without_trailing_zeros() {
        assert_eq!(Usdc::new(dec!(1.500)).to_string(), "1.5");
    }

    #[test]
    fn deserializes_from_decimal_string() {
        let amount: Usdc = serde_json::from_str("\"10.25\"").unwrap();
        assert_eq!(amount, Usdc::new(dec!(10.25)));
    }

    proptest! {
        #[test]
        fn units_roundtrip_for_six_decimal_values(raw in 0u64..1_000_000_000_000u64) {
            let amount = Usdc::from_units(U256::from(raw)).unwrap();
            prop_assert_eq!(amount.to_units().unwrap(), U256::from(raw));
        }

        #[test]
        fn ceil_never_undershoots(raw in 0u64..1_000_000_000_000u64) {
            let amount = Usdc::from_units(U256::from(raw)).unwrap();
            prop_assert!(amount.to_units_ceil().unwrap() >= amount.to_units().unwrap());
        }
    }
}
