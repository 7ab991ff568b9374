//! `sg_decoupling` is a Rust library for calculating the costs of decoupling a
//! co-owned property in Singapore.
//!
//! In a decoupling one owner (the buyer) takes over the share of the other
//! owner (the seller). The library calculates both sides:
//! - **Buyer**: purchase price, the 5% cash / 20% CPF-or-cash / 75% loan
//!   financing split, the new total loan and its monthly installment, buyer's
//!   and additional buyer's stamp duty, fees, and how much CPF and cash the
//!   buyer has to put in.
//! - **Seller**: selling price, seller's stamp duty and the cash proceeds left
//!   after the seller's share of the loan and the CPF refund.
//!
//! ## Usage
//!
//! Add `sg_decoupling` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sg_decoupling = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then, use the `calculate` function to get the breakdown for both sides:
//!
//! ```rust
//! use sg_decoupling::{calculate, DecouplingInput, DecouplingPolicy, Residency};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let input = DecouplingInput {
//!         property_valuation: dec!(1_000_000),
//!         outstanding_loan: dec!(400_000),
//!         years_since_purchase: 3,
//!         buyer_share_percent: dec!(50),
//!         residency: Residency::Singaporean,
//!         buyer_age: 35,
//!         seller_cpf_refund: dec!(100_000),
//!         buyer_cpf_usage: dec!(0),
//!         buyer_cpf_oa_balance: dec!(50_000),
//!         interest_rate_percent: dec!(2.5),
//!     };
//!
//!     match calculate(&input, &DecouplingPolicy::default()) {
//!         Ok(result) => {
//!             println!("Purchase Price:      {:.2}", result.buyer.purchase_price);
//!             println!("Monthly Installment: {:.2}", result.buyer.monthly_installment);
//!             println!("Seller Proceeds:     {:.2}", result.seller.cash_proceeds);
//!             assert_eq!(result.seller.cash_proceeds, dec!(200_000));
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating decoupling: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod amortization;
pub mod duties;
pub mod engine;
pub mod error;
pub mod form;
pub mod money;
pub mod policy;
pub mod validation;

pub use duties::{Residency, ValuationFee};
pub use engine::{
    BuyerBreakdown, DecouplingInput, DecouplingResult, OwnershipStructure, SellerBreakdown,
    calculate,
};
pub use error::{DecouplingError, DomainError};
pub use form::DecouplingForm;
pub use policy::DecouplingPolicy;
pub use validation::{Field, Violation, Violations};
