//! Raw text submitted by a calculator widget.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::duties::{HoldingPeriod, Residency};
use crate::engine::DecouplingInput;
use crate::money::{derive_seller_share, parse_amount, parse_percent};
use crate::policy::DecouplingPolicy;
use crate::validation::{
    Field, HOLDING_PERIOD_MESSAGE, Violation, Violations, collect_violations,
};

/// The calculator's fields exactly as typed. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecouplingForm {
    pub property_valuation: String,
    pub outstanding_loan: String,
    /// `0`, `1`, `2`, `3` or `3+`.
    pub years_since_purchase: String,
    pub buyer_share: String,
    pub residency: String,
    pub buyer_age: String,
    pub cpf_usage: String,
    pub buyer_cpf_usage: String,
    pub buyer_cpf_oa_balance: String,
    pub interest_rate: String,
}

impl DecouplingForm {
    /// The read-only seller share shown next to the buyer share.
    pub fn seller_share_text(&self) -> String {
        derive_seller_share(parse_percent(&self.buyer_share)).to_string()
    }

    /// Converts the text fields to a typed input. Unreadable amounts become
    /// zero and a blank interest rate takes the policy default, leaving range
    /// problems to validation.
    ///
    /// The years-since-purchase bucket has no safe default, since every
    /// bucket is a legal duty tier.
    ///
    /// # Errors
    ///
    /// Returns every violation of the form, including the bucket's, when
    /// the bucket text is not one of the offered choices.
    pub fn to_input(&self, policy: &DecouplingPolicy) -> Result<DecouplingInput, Violations> {
        let interest_rate_percent = if self.interest_rate.trim().is_empty() {
            policy.default_interest_rate_percent
        } else {
            parse_percent(&self.interest_rate)
        };
        let holding_bucket = parse_holding_bucket(&self.years_since_purchase);

        let input = DecouplingInput {
            property_valuation: parse_amount(&self.property_valuation),
            outstanding_loan: parse_amount(&self.outstanding_loan),
            years_since_purchase: holding_bucket.unwrap_or_default(),
            buyer_share_percent: parse_percent(&self.buyer_share),
            residency: Residency::from_label(&self.residency),
            buyer_age: parse_whole(&self.buyer_age),
            seller_cpf_refund: parse_amount(&self.cpf_usage),
            buyer_cpf_usage: parse_amount(&self.buyer_cpf_usage),
            buyer_cpf_oa_balance: parse_amount(&self.buyer_cpf_oa_balance),
            interest_rate_percent,
        };

        match holding_bucket {
            Some(_) => Ok(input),
            None => {
                let mut found = collect_violations(&input, policy);
                found.push(Violation::new(Field::YearsSincePurchase, HOLDING_PERIOD_MESSAGE));
                Err(Violations::new(found))
            }
        }
    }
}

fn parse_holding_bucket(text: &str) -> Option<u32> {
    match text.trim() {
        "3+" => Some(3),
        other => other
            .parse::<u32>()
            .ok()
            .filter(|bucket| HoldingPeriod::try_from(*bucket).is_ok()),
    }
}

fn parse_whole(text: &str) -> u32 {
    parse_amount(text).trunc().to_u32().unwrap_or(0)
}
