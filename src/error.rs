use thiserror::Error;

use crate::validation::Violations;

/// Failure of a single decoupling calculation.
///
/// Both variants are local to one attempt; supplying corrected input on the
/// next call resolves them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecouplingError {
    /// One or more fields, or relationships between fields, are invalid.
    #[error("invalid input: {0}")]
    Validation(#[from] Violations),

    /// The input passed validation but leaves a formula undefined.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Inputs the formulas cannot give a meaningful answer for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("years since purchase bucket {0} is out of range (expected 0 to 3)")]
    HoldingPeriodOutOfRange(u32),

    #[error("buyer age {age} leaves no loan tenure before retirement age {retirement_age}")]
    NonPositiveTenure { age: u32, retirement_age: u32 },

    #[error("loan term must be at least one year")]
    ZeroLoanTerm,

    #[error("monthly installment overflowed decimal precision")]
    InstallmentOverflow,
}
