//! Canonical decoupling policy.
//!
//! Every limit the calculator enforces lives here so that a single rule set
//! can be audited and tested in one place. The financing tranche ratios are
//! regulatory and kept as constants rather than policy fields.

use anyhow::{Context, ensure};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Portion of the purchase price that must be paid in cash.
pub const CASH_DOWNPAYMENT_RATIO: Decimal = dec!(0.05);

/// Portion of the purchase price payable from CPF or cash.
pub const CPF_OR_CASH_DOWNPAYMENT_RATIO: Decimal = dec!(0.20);

/// Portion of the purchase price financed by the bank.
pub const BANK_LOAN_RATIO: Decimal = dec!(0.75);

/// Limits and fixed amounts used by validation and the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecouplingPolicy {
    /// Smallest property valuation accepted.
    pub minimum_valuation: Decimal,
    pub minimum_buyer_age: u32,
    pub maximum_buyer_age: u32,
    /// Age at which the new loan must be fully repaid.
    pub retirement_age: u32,
    pub maximum_tenure_years: u32,
    /// Upper bound (inclusive) of the editable interest rate, as a percentage.
    pub maximum_interest_rate_percent: Decimal,
    /// Rate used when the caller leaves the interest rate blank.
    pub default_interest_rate_percent: Decimal,
    /// Ceiling of the existing loan relative to valuation, as a percentage.
    pub maximum_loan_to_value_percent: Decimal,
    /// Ceiling of loan plus CPF usage relative to valuation, as a ratio.
    pub maximum_total_financing_ratio: Decimal,
    /// Legal fee charged to each side.
    pub legal_fee: Decimal,
}

impl Default for DecouplingPolicy {
    fn default() -> Self {
        Self {
            minimum_valuation: dec!(100_000),
            minimum_buyer_age: 21,
            maximum_buyer_age: 60,
            retirement_age: 65,
            maximum_tenure_years: 30,
            maximum_interest_rate_percent: dec!(10),
            default_interest_rate_percent: dec!(2.5),
            maximum_loan_to_value_percent: dec!(75),
            maximum_total_financing_ratio: dec!(0.95),
            legal_fee: dec!(3000),
        }
    }
}

impl DecouplingPolicy {
    /// Loads a policy from JSON. Keys that are absent keep their default value.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or if the resulting
    /// policy could yield a zero loan tenure for an accepted buyer.
    pub fn from_json_str(raw: &str) -> Result<Self, anyhow::Error> {
        let policy: Self = serde_json::from_str(raw).context("policy is not valid JSON")?;
        policy.check()?;
        Ok(policy)
    }

    fn check(&self) -> Result<(), anyhow::Error> {
        ensure!(
            self.minimum_buyer_age <= self.maximum_buyer_age,
            "minimum buyer age {} exceeds maximum buyer age {}",
            self.minimum_buyer_age,
            self.maximum_buyer_age
        );
        ensure!(
            self.maximum_buyer_age < self.retirement_age,
            "maximum buyer age {} must be below retirement age {}",
            self.maximum_buyer_age,
            self.retirement_age
        );
        ensure!(self.maximum_tenure_years > 0, "maximum tenure must be at least one year");
        ensure!(
            self.maximum_interest_rate_percent > Decimal::ZERO,
            "maximum interest rate must be positive"
        );
        Ok(())
    }
}
