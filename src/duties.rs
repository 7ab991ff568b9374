//! Stamp duties and fees levied on a decoupling.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::format_whole_amount;

/// A slice of the price taxed at a single rate. `width` of `None` means
/// the band is open-ended.
struct DutyBand {
    width: Option<Decimal>,
    rate: Decimal,
}

/// Buyer's stamp duty bands, applied in order to successive slices of the price.
const BUYERS_STAMP_DUTY_BANDS: [DutyBand; 6] = [
    DutyBand { width: Some(dec!(180_000)), rate: dec!(0.01) },
    DutyBand { width: Some(dec!(180_000)), rate: dec!(0.02) },
    DutyBand { width: Some(dec!(640_000)), rate: dec!(0.03) },
    DutyBand { width: Some(dec!(500_000)), rate: dec!(0.04) },
    DutyBand { width: Some(dec!(1_500_000)), rate: dec!(0.05) },
    DutyBand { width: None, rate: dec!(0.06) },
];

const VALUATION_FEE_FLAT: Decimal = dec!(300);
const VALUATION_FEE_ESTIMATE: Decimal = dec!(400);
const VALUATION_FEE_FLAT_BELOW: Decimal = dec!(1_000_000);
const VALUATION_FEE_ESTIMATE_BELOW: Decimal = dec!(2_000_000);

/// Residency status of the buyer, which decides the additional stamp duty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Residency {
    #[default]
    Singaporean,
    PermanentResident,
    Foreigner,
}

impl Residency {
    /// Reads a residency label. Unknown labels fall back to `Singaporean`,
    /// which carries no additional duty.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "singaporean" | "citizen" => Self::Singaporean,
            "pr" | "permanentresident" | "permanent resident" | "permanent_resident" => {
                Self::PermanentResident
            }
            "foreigner" => Self::Foreigner,
            other => {
                tracing::warn!(label = other, "unrecognized residency, treating as Singaporean");
                Self::Singaporean
            }
        }
    }

    /// Additional buyer's stamp duty rate for this residency.
    pub fn additional_duty_rate(self) -> Decimal {
        match self {
            Self::Singaporean => Decimal::ZERO,
            Self::PermanentResident => dec!(0.05),
            Self::Foreigner => dec!(0.60),
        }
    }
}

impl From<String> for Residency {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

/// How long the seller has held the property, as offered by the widget's
/// "years since purchase" selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingPeriod {
    UnderOneYear,
    OneToTwoYears,
    TwoToThreeYears,
    ThreeYearsOrMore,
}

impl HoldingPeriod {
    pub fn sellers_duty_rate(self) -> Decimal {
        match self {
            Self::UnderOneYear => dec!(0.12),
            Self::OneToTwoYears => dec!(0.08),
            Self::TwoToThreeYears => dec!(0.04),
            Self::ThreeYearsOrMore => Decimal::ZERO,
        }
    }
}

impl TryFrom<u32> for HoldingPeriod {
    type Error = DomainError;

    fn try_from(bucket: u32) -> Result<Self, Self::Error> {
        match bucket {
            0 => Ok(Self::UnderOneYear),
            1 => Ok(Self::OneToTwoYears),
            2 => Ok(Self::TwoToThreeYears),
            3 => Ok(Self::ThreeYearsOrMore),
            other => Err(DomainError::HoldingPeriodOutOfRange(other)),
        }
    }
}

/// Fee charged by the bank's valuer. Above the flat tier the amount is only
/// an estimate; [`ValuationFee::amount`] gives the figure used in totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum ValuationFee {
    Fixed(Decimal),
    Estimated(Decimal),
    FromAmount(Decimal),
}

impl ValuationFee {
    pub fn amount(self) -> Decimal {
        match self {
            Self::Fixed(amount) | Self::Estimated(amount) | Self::FromAmount(amount) => amount,
        }
    }
}

impl fmt::Display for ValuationFee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(amount) => write!(f, "{}", format_whole_amount(*amount)),
            Self::Estimated(amount) => write!(f, "estimated ~{}", format_whole_amount(*amount)),
            Self::FromAmount(amount) => write!(f, "{} onwards", format_whole_amount(*amount)),
        }
    }
}

/// Progressive buyer's stamp duty on `price`.
///
/// Each band taxes only the part of the price that falls inside it.
pub fn buyers_stamp_duty(price: Decimal) -> Decimal {
    let mut remaining = price.max(Decimal::ZERO);
    let mut duty = Decimal::ZERO;

    for band in &BUYERS_STAMP_DUTY_BANDS {
        if remaining.is_zero() {
            break;
        }
        let taxed = match band.width {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        duty += taxed * band.rate;
        remaining -= taxed;
    }

    duty
}

/// Additional buyer's stamp duty on `price` for the buyer's residency.
pub fn additional_buyers_stamp_duty(price: Decimal, residency: Residency) -> Decimal {
    price * residency.additional_duty_rate()
}

/// Seller's stamp duty on `price`, by years-since-purchase bucket (0 to 3).
///
/// # Errors
///
/// Returns [`DomainError::HoldingPeriodOutOfRange`] for a bucket above 3.
pub fn sellers_stamp_duty(price: Decimal, years_owned_bucket: u32) -> Result<Decimal, DomainError> {
    let period = HoldingPeriod::try_from(years_owned_bucket)?;
    Ok(price * period.sellers_duty_rate())
}

/// Valuation fee for a property of the given valuation.
pub fn valuation_fee(property_valuation: Decimal) -> ValuationFee {
    if property_valuation < VALUATION_FEE_FLAT_BELOW {
        ValuationFee::Fixed(VALUATION_FEE_FLAT)
    } else if property_valuation < VALUATION_FEE_ESTIMATE_BELOW {
        ValuationFee::Estimated(VALUATION_FEE_ESTIMATE)
    } else {
        ValuationFee::FromAmount(VALUATION_FEE_ESTIMATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};
    use rstest::rstest;

    #[rstest]
    #[case(dec!(0), dec!(0))]
    #[case(dec!(100_000), dec!(1_000))]
    #[case(dec!(180_000), dec!(1_800))]
    #[case(dec!(360_000), dec!(5_400))]
    #[case(dec!(500_000), dec!(9_600))]
    #[case(dec!(1_000_000), dec!(24_600))]
    #[case(dec!(1_500_000), dec!(44_600))]
    #[case(dec!(3_000_000), dec!(119_600))]
    #[case(dec!(4_000_000), dec!(179_600))]
    fn test_buyers_stamp_duty_tiers(#[case] price: Decimal, #[case] expected: Decimal) {
        assert_eq!(buyers_stamp_duty(price), expected);
    }

    #[test]
    fn test_buyers_stamp_duty_band_edges_are_exact() {
        let first_three = dec!(180_000) * dec!(0.01) + dec!(180_000) * dec!(0.02) + dec!(640_000) * dec!(0.03);
        assert_eq!(buyers_stamp_duty(dec!(1_000_000)), first_three);

        let up_to_five_percent = first_three + dec!(500_000) * dec!(0.04) + dec!(1_500_000) * dec!(0.05);
        assert_eq!(buyers_stamp_duty(dec!(3_000_000)), up_to_five_percent);
    }

    #[rstest]
    #[case(Residency::Singaporean, dec!(0))]
    #[case(Residency::PermanentResident, dec!(50_000))]
    #[case(Residency::Foreigner, dec!(600_000))]
    fn test_additional_buyers_stamp_duty(#[case] residency: Residency, #[case] expected: Decimal) {
        assert_eq!(additional_buyers_stamp_duty(dec!(1_000_000), residency), expected);
    }

    #[rstest]
    #[case("Singaporean", Residency::Singaporean)]
    #[case("PR", Residency::PermanentResident)]
    #[case("Permanent Resident", Residency::PermanentResident)]
    #[case("foreigner", Residency::Foreigner)]
    #[case("Martian", Residency::Singaporean)]
    #[case("", Residency::Singaporean)]
    fn test_residency_labels(#[case] label: &str, #[case] expected: Residency) {
        assert_eq!(Residency::from_label(label), expected);
    }

    #[test]
    fn test_residency_deserializes_unknown_label_as_singaporean() {
        let residency: Residency = serde_json::from_str("\"Alien\"").unwrap();
        assert_eq!(residency, Residency::Singaporean);
        let residency: Residency = serde_json::from_str("\"PR\"").unwrap();
        assert_eq!(residency, Residency::PermanentResident);
    }

    #[rstest]
    #[case(0, dec!(60_000))]
    #[case(1, dec!(40_000))]
    #[case(2, dec!(20_000))]
    #[case(3, dec!(0))]
    fn test_sellers_stamp_duty(#[case] bucket: u32, #[case] expected: Decimal) {
        assert_eq!(sellers_stamp_duty(dec!(500_000), bucket), Ok(expected));
    }

    #[test]
    fn test_sellers_stamp_duty_rejects_unknown_bucket() {
        assert_eq!(
            sellers_stamp_duty(dec!(500_000), 4),
            Err(DomainError::HoldingPeriodOutOfRange(4))
        );
    }

    #[rstest]
    #[case(dec!(999_999), ValuationFee::Fixed(dec!(300)), "$300")]
    #[case(dec!(1_000_000), ValuationFee::Estimated(dec!(400)), "estimated ~$400")]
    #[case(dec!(2_000_000), ValuationFee::FromAmount(dec!(400)), "$400 onwards")]
    fn test_valuation_fee(#[case] valuation: Decimal, #[case] expected: ValuationFee, #[case] shown: &str) {
        let fee = valuation_fee(valuation);
        assert_eq!(fee, expected);
        assert_eq!(fee.to_string(), shown);
    }

    #[test]
    fn test_estimated_fees_count_as_four_hundred() {
        assert_eq!(valuation_fee(dec!(5_000_000)).amount(), dec!(400));
        assert_eq!(valuation_fee(dec!(500_000)).amount(), dec!(300));
    }

    proptest! {
        #[test]
        fn prop_buyers_stamp_duty_is_monotonic(low in 0u64..5_000_000, step in 0u64..1_000_000) {
            let low = Decimal::from(low);
            let high = low + Decimal::from(step);
            prop_assert!(buyers_stamp_duty(low) <= buyers_stamp_duty(high));
        }

        #[test]
        fn prop_buyers_stamp_duty_stays_within_top_rates(price in 1u64..10_000_000) {
            let price = Decimal::from(price);
            let duty = buyers_stamp_duty(price);
            prop_assert!(duty >= price * dec!(0.01));
            prop_assert!(duty <= price * dec!(0.06));
        }
    }
}
