//! Fixed-rate loan repayment.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::DomainError;
use crate::policy::DecouplingPolicy;

/// Converts an annual interest rate percentage to a nominal monthly rate.
///
/// Bank installments in Singapore use the nominal rate, so 2.5% per year
/// becomes `0.025 / 12` per month rather than a compounded equivalent.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(12) / dec!(100)
}

/// Calculates the fixed monthly installment that repays `principal` over
/// `years` at `annual_rate_percent`.
///
/// The annuity formula is: PMT = P * [r(1 + r)^n] / [(1 + r)^n - 1].
/// A zero rate repays the principal in equal parts instead.
///
/// # Errors
///
/// Returns [`DomainError::ZeroLoanTerm`] when `years` is zero and
/// [`DomainError::InstallmentOverflow`] when `(1 + r)^n` cannot be represented.
pub fn monthly_installment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    years: u32,
) -> Result<Decimal, DomainError> {
    if years == 0 {
        return Err(DomainError::ZeroLoanTerm);
    }

    let rate = monthly_rate(annual_rate_percent);
    let months = u64::from(years) * 12;
    if rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let growth = (dec!(1) + rate)
        .checked_powu(months)
        .ok_or(DomainError::InstallmentOverflow)?;
    let denominator = growth - dec!(1);
    if denominator.is_zero() {
        return Err(DomainError::InstallmentOverflow);
    }

    principal
        .checked_mul(rate * growth)
        .and_then(|scaled| scaled.checked_div(denominator))
        .ok_or(DomainError::InstallmentOverflow)
}

/// Loan tenure for a buyer of `buyer_age`: the policy cap, or the years left
/// until retirement if fewer.
///
/// # Errors
///
/// Returns [`DomainError::NonPositiveTenure`] when the buyer has already
/// reached retirement age.
pub fn tenure_years(policy: &DecouplingPolicy, buyer_age: u32) -> Result<u32, DomainError> {
    let until_retirement = policy.retirement_age.saturating_sub(buyer_age);
    match policy.maximum_tenure_years.min(until_retirement) {
        0 => Err(DomainError::NonPositiveTenure {
            age: buyer_age,
            retirement_age: policy.retirement_age,
        }),
        years => Ok(years),
    }
}
