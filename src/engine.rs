//! Buyer and seller breakdown of a decoupling.
//!
//! The buyer takes over the seller's share of the property. The purchase is
//! financed 5% in cash, 20% from CPF or cash and 75% by a new bank loan that
//! is added to the buyer's share of the existing loan. The seller receives
//! the value of their share, less their share of the existing loan and the
//! CPF they must refund to their own account.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{monthly_installment, tenure_years};
use crate::duties::{
    Residency, ValuationFee, additional_buyers_stamp_duty, buyers_stamp_duty, sellers_stamp_duty,
    valuation_fee,
};
use crate::error::DecouplingError;
use crate::money::derive_seller_share;
use crate::policy::{
    BANK_LOAN_RATIO, CASH_DOWNPAYMENT_RATIO, CPF_OR_CASH_DOWNPAYMENT_RATIO, DecouplingPolicy,
};
use crate::validation::validate;

/// Input parameters for a decoupling calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecouplingInput {
    pub property_valuation: Decimal,
    pub outstanding_loan: Decimal,
    /// Years-since-purchase bucket: 0, 1 and 2 for each year held, 3 for
    /// three years or more.
    pub years_since_purchase: u32,
    /// The buyer's current share of the property, as a percentage. The
    /// seller's share is always derived from it.
    pub buyer_share_percent: Decimal,
    pub residency: Residency,
    pub buyer_age: u32,
    /// CPF the seller used on the property and must refund to their account.
    pub seller_cpf_refund: Decimal,
    /// CPF the buyer contributes directly, outside the downpayment.
    pub buyer_cpf_usage: Decimal,
    /// CPF Ordinary Account balance available for the downpayment and legal fee.
    pub buyer_cpf_oa_balance: Decimal,
    pub interest_rate_percent: Decimal,
}

impl DecouplingInput {
    /// The seller's share, rounded to a whole percent.
    pub fn seller_share_percent(&self) -> Decimal {
        derive_seller_share(self.buyer_share_percent)
    }
}

/// Split of one obligation between CPF and cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpfDraw {
    pub from_cpf: Decimal,
    pub cash_topup: Decimal,
}

/// Funds `needed` from `cpf_available` first and covers any shortfall with cash.
pub fn draw_cpf_first(cpf_available: Decimal, needed: Decimal) -> CpfDraw {
    let from_cpf = cpf_available.max(Decimal::ZERO).min(needed);
    CpfDraw {
        from_cpf,
        cash_topup: needed - from_cpf,
    }
}

/// How the buyer's post-decoupling position relative to valuation is financed,
/// as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipStructure {
    pub loan_percent: Decimal,
    /// Excludes CPF spent on the legal fee, which does not finance the property.
    pub cpf_percent: Decimal,
    /// Remainder after loan and CPF. Negative when the property is over-financed.
    pub cashable_equity_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerBreakdown {
    pub property_share: Decimal,
    pub loan_liability: Decimal,
    pub purchase_price: Decimal,
    pub cash_downpayment: Decimal,
    pub cpf_or_cash_downpayment: Decimal,
    pub bank_loan: Decimal,
    pub new_total_loan: Decimal,
    pub tenure_years: u32,
    /// Rounded to cents.
    pub monthly_installment: Decimal,
    pub stamp_duty: Decimal,
    pub additional_stamp_duty: Decimal,
    pub legal_fee: Decimal,
    pub valuation_fee: ValuationFee,
    pub cpf_used_for_downpayment: Decimal,
    pub cash_topup_for_downpayment: Decimal,
    pub cpf_used_for_legal_fee: Decimal,
    pub cash_topup_for_legal_fee: Decimal,
    pub total_cash_required: Decimal,
    pub total_cash_required_with_legal_fee: Decimal,
    pub ownership: OwnershipStructure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerBreakdown {
    pub property_share: Decimal,
    pub loan_liability: Decimal,
    /// Equal to `property_share`: the seller sells the whole share.
    pub selling_price: Decimal,
    pub stamp_duty: Decimal,
    pub legal_fee: Decimal,
    pub cpf_refund: Decimal,
    /// Can be negative when the loan and CPF refund exceed the selling price.
    pub cash_proceeds: Decimal,
}

/// Complete result of a decoupling calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecouplingResult {
    pub buyer: BuyerBreakdown,
    pub seller: SellerBreakdown,
}

/// Validates `input` and calculates the buyer and seller breakdown.
///
/// This is the main entry point of the library. The calculation is a pure
/// function of its arguments.
///
/// # Errors
///
/// Returns [`DecouplingError::Validation`] with every failing check when the
/// input is invalid, and [`DecouplingError::Domain`] when a validated input
/// still leaves a formula undefined (an out-of-range years bucket, or no
/// tenure left before retirement).
pub fn calculate(
    input: &DecouplingInput,
    policy: &DecouplingPolicy,
) -> Result<DecouplingResult, DecouplingError> {
    if let Err(violations) = validate(input, policy) {
        tracing::debug!(count = violations.len(), "decoupling input rejected");
        return Err(violations.into());
    }

    let buyer_share = input.buyer_share_percent / dec!(100);
    let seller_share = input.seller_share_percent() / dec!(100);
    let valuation = input.property_valuation;

    let seller = seller_breakdown(input, policy, seller_share)?;
    let buyer = buyer_breakdown(input, policy, buyer_share, seller_share)?;

    tracing::debug!(
        purchase_price = %buyer.purchase_price,
        new_total_loan = %buyer.new_total_loan,
        cash_proceeds = %seller.cash_proceeds,
        valuation = %valuation,
        "decoupling calculated"
    );

    Ok(DecouplingResult { buyer, seller })
}

fn buyer_breakdown(
    input: &DecouplingInput,
    policy: &DecouplingPolicy,
    buyer_share: Decimal,
    seller_share: Decimal,
) -> Result<BuyerBreakdown, DecouplingError> {
    let valuation = input.property_valuation;
    let property_share = valuation * buyer_share;
    let loan_liability = input.outstanding_loan * buyer_share;
    // The buyer acquires the seller's share.
    let purchase_price = valuation * seller_share;

    let cash_downpayment = purchase_price * CASH_DOWNPAYMENT_RATIO;
    let cpf_or_cash_downpayment = purchase_price * CPF_OR_CASH_DOWNPAYMENT_RATIO;
    let bank_loan = purchase_price * BANK_LOAN_RATIO;
    let new_total_loan = loan_liability + bank_loan;

    let tenure = tenure_years(policy, input.buyer_age)?;
    let installment = monthly_installment(new_total_loan, input.interest_rate_percent, tenure)?;

    let stamp_duty = buyers_stamp_duty(purchase_price);
    let additional_stamp_duty = additional_buyers_stamp_duty(purchase_price, input.residency);
    let valuation_fee = valuation_fee(valuation);

    let downpayment = draw_cpf_first(input.buyer_cpf_oa_balance, cpf_or_cash_downpayment);
    let legal = draw_cpf_first(
        input.buyer_cpf_oa_balance - downpayment.from_cpf,
        policy.legal_fee,
    );

    let total_cash_required = cash_downpayment
        + downpayment.cash_topup
        + stamp_duty
        + additional_stamp_duty
        + valuation_fee.amount();

    let loan_percent = new_total_loan / valuation * dec!(100);
    let cpf_percent = input.buyer_cpf_usage / valuation * dec!(100)
        + downpayment.from_cpf / valuation * dec!(100);

    Ok(BuyerBreakdown {
        property_share,
        loan_liability,
        purchase_price,
        cash_downpayment,
        cpf_or_cash_downpayment,
        bank_loan,
        new_total_loan,
        tenure_years: tenure,
        monthly_installment: installment.round_dp(2),
        stamp_duty,
        additional_stamp_duty,
        legal_fee: policy.legal_fee,
        valuation_fee,
        cpf_used_for_downpayment: downpayment.from_cpf,
        cash_topup_for_downpayment: downpayment.cash_topup,
        cpf_used_for_legal_fee: legal.from_cpf,
        cash_topup_for_legal_fee: legal.cash_topup,
        total_cash_required,
        total_cash_required_with_legal_fee: total_cash_required + legal.cash_topup,
        ownership: OwnershipStructure {
            loan_percent,
            cpf_percent,
            cashable_equity_percent: dec!(100) - loan_percent - cpf_percent,
        },
    })
}

fn seller_breakdown(
    input: &DecouplingInput,
    policy: &DecouplingPolicy,
    seller_share: Decimal,
) -> Result<SellerBreakdown, DecouplingError> {
    let property_share = input.property_valuation * seller_share;
    let loan_liability = input.outstanding_loan * seller_share;
    let selling_price = property_share;
    let stamp_duty = sellers_stamp_duty(selling_price, input.years_since_purchase)?;

    Ok(SellerBreakdown {
        property_share,
        loan_liability,
        selling_price,
        stamp_duty,
        legal_fee: policy.legal_fee,
        cpf_refund: input.seller_cpf_refund,
        cash_proceeds: selling_price - loan_liability - input.seller_cpf_refund,
    })
}
