//! Field-level and cross-field checks run before any computation.
//!
//! Every check is independent and all of them run, so the caller sees every
//! problem with the input at once.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::duties::HoldingPeriod;
use crate::engine::DecouplingInput;
use crate::money::format_whole_amount;
use crate::policy::DecouplingPolicy;

/// Input field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PropertyValuation,
    OutstandingLoan,
    YearsSincePurchase,
    BuyerShare,
    BuyerAge,
    SellerCpfRefund,
    BuyerCpfUsage,
    BuyerCpfOaBalance,
    InterestRate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: Field,
    pub message: String,
}

pub(crate) const HOLDING_PERIOD_MESSAGE: &str =
    "Please select the years since purchase (0, 1, 2 or 3+)";

impl Violation {
    pub(crate) fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every violation found in one input, in evaluation order. Never empty
/// when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub(crate) fn new(found: Vec<Violation>) -> Self {
        Self(found)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.message.as_str()).collect()
    }

    pub fn concerns(&self, field: Field) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join(" | "))
    }
}

impl std::error::Error for Violations {}

/// Runs every check against `input`.
///
/// # Errors
///
/// Returns all failing checks when at least one fails.
pub fn validate(input: &DecouplingInput, policy: &DecouplingPolicy) -> Result<(), Violations> {
    let found = collect_violations(input, policy);
    if found.is_empty() {
        Ok(())
    } else {
        Err(Violations(found))
    }
}

/// Every failing check, in evaluation order. The ratio checks only run on
/// a valuation that passed its own check.
pub(crate) fn collect_violations(input: &DecouplingInput, policy: &DecouplingPolicy) -> Vec<Violation> {
    let valuation = check_valuation(input, policy);
    let ratios_apply = valuation.is_none();

    [
        valuation,
        check_outstanding_loan(input),
        check_shares(input),
        check_buyer_age(input, policy),
        check_non_negative(input.seller_cpf_refund, Field::SellerCpfRefund, "CPF usage cannot be negative"),
        check_non_negative(input.buyer_cpf_usage, Field::BuyerCpfUsage, "Buyer CPF usage cannot be negative"),
        check_non_negative(input.buyer_cpf_oa_balance, Field::BuyerCpfOaBalance, "CPF OA balance cannot be negative"),
        check_interest_rate(input, policy),
        ratios_apply.then(|| check_loan_to_value(input, policy)).flatten(),
        ratios_apply.then(|| check_total_financing(input, policy)).flatten(),
        check_holding_period(input),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn check_valuation(input: &DecouplingInput, policy: &DecouplingPolicy) -> Option<Violation> {
    let valuation = input.property_valuation;
    if valuation.is_zero() {
        return Some(Violation::new(Field::PropertyValuation, "Please enter a valid valuation"));
    }
    if valuation < policy.minimum_valuation {
        return Some(Violation::new(
            Field::PropertyValuation,
            format!("Valuation must be at least S{}", format_whole_amount(policy.minimum_valuation)),
        ));
    }
    None
}

fn check_outstanding_loan(input: &DecouplingInput) -> Option<Violation> {
    (input.outstanding_loan < Decimal::ZERO)
        .then(|| Violation::new(Field::OutstandingLoan, "Loan amount cannot be negative"))
}

fn check_shares(input: &DecouplingInput) -> Option<Violation> {
    let buyer = input.buyer_share_percent;
    if buyer.is_zero() {
        return Some(Violation::new(Field::BuyerShare, "Please enter a valid percentage"));
    }
    if buyer < dec!(1) || buyer > dec!(99) {
        return Some(Violation::new(Field::BuyerShare, "Share must be between 1% and 99%"));
    }
    if buyer + input.seller_share_percent() != dec!(100) {
        return Some(Violation::new(Field::BuyerShare, "Buyer and Seller shares must total 100%"));
    }
    None
}

fn check_buyer_age(input: &DecouplingInput, policy: &DecouplingPolicy) -> Option<Violation> {
    let age = input.buyer_age;
    if age == 0 {
        return Some(Violation::new(Field::BuyerAge, "Please enter a valid age"));
    }
    if age < policy.minimum_buyer_age {
        return Some(Violation::new(
            Field::BuyerAge,
            format!("Age must be at least {}", policy.minimum_buyer_age),
        ));
    }
    if age > policy.maximum_buyer_age {
        return Some(Violation::new(
            Field::BuyerAge,
            format!("Age cannot exceed {}", policy.maximum_buyer_age),
        ));
    }
    None
}

fn check_non_negative(amount: Decimal, field: Field, message: &str) -> Option<Violation> {
    (amount < Decimal::ZERO).then(|| Violation::new(field, message))
}

fn check_interest_rate(input: &DecouplingInput, policy: &DecouplingPolicy) -> Option<Violation> {
    let rate = input.interest_rate_percent;
    (rate <= Decimal::ZERO || rate > policy.maximum_interest_rate_percent).then(|| {
        Violation::new(
            Field::InterestRate,
            format!(
                "Interest rate must be above 0% and at most {}%",
                policy.maximum_interest_rate_percent.normalize()
            ),
        )
    })
}

fn check_loan_to_value(input: &DecouplingInput, policy: &DecouplingPolicy) -> Option<Violation> {
    // An amount too large to divide or scale is over any ceiling.
    let within = input
        .outstanding_loan
        .checked_div(input.property_valuation)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .is_some_and(|loan_to_value| loan_to_value <= policy.maximum_loan_to_value_percent);
    (!within).then(|| {
        Violation::new(
            Field::OutstandingLoan,
            format!(
                "Outstanding loan cannot exceed {}% of the property valuation",
                policy.maximum_loan_to_value_percent.normalize()
            ),
        )
    })
}

fn check_total_financing(input: &DecouplingInput, policy: &DecouplingPolicy) -> Option<Violation> {
    let financed = input
        .outstanding_loan
        .checked_add(input.buyer_cpf_usage)
        .and_then(|sum| sum.checked_add(input.seller_cpf_refund));
    let ceiling = input
        .property_valuation
        .checked_mul(policy.maximum_total_financing_ratio);
    let within = matches!((financed, ceiling), (Some(financed), Some(ceiling)) if financed <= ceiling);
    (!within).then(|| {
        Violation::new(
            Field::OutstandingLoan,
            format!(
                "Outstanding loan and CPF usage cannot exceed {}% of the property valuation",
                (policy.maximum_total_financing_ratio * dec!(100)).normalize()
            ),
        )
    })
}

fn check_holding_period(input: &DecouplingInput) -> Option<Violation> {
    HoldingPeriod::try_from(input.years_since_purchase)
        .is_err()
        .then(|| Violation::new(Field::YearsSincePurchase, HOLDING_PERIOD_MESSAGE))
}
