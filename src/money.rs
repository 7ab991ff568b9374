//! Conversion between user-entered text and exact decimal amounts.
//!
//! Parsing never fails: a widget recalculates on every keystroke, so text
//! that cannot be read as a number becomes zero and is left for the
//! validator to report. Nothing past this boundary defaults silently.

use std::str::FromStr;

use num_format::{Locale, ToFormattedString as _};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Parses a currency amount such as `"S$1,250,000.50"`.
///
/// Currency symbols, thousands separators and whitespace are ignored. A
/// leading minus sign is kept so that negative input reaches validation.
/// Unreadable text yields zero.
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '_') && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.strip_prefix('S').unwrap_or(&cleaned);
    let cleaned = match cleaned.strip_prefix("-S") {
        Some(rest) => format!("-{rest}"),
        None => cleaned.to_string(),
    };
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Parses a percentage such as `"50"` or `"2.5 %"`. Unreadable text yields zero.
pub fn parse_percent(text: &str) -> Decimal {
    parse_amount(&text.replace('%', ""))
}

/// Formats an amount with two decimal places, e.g. `$1,234.50` or `-$80.00`.
pub fn format_amount(amount: Decimal) -> String {
    format_with_places(amount, 2)
}

/// Formats an amount rounded to whole currency units, e.g. `$1,235`.
pub fn format_whole_amount(amount: Decimal) -> String {
    format_with_places(amount, 0)
}

/// Formats a percentage with two decimal places, without a `%` suffix.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// The seller's share implied by the buyer's, rounded to a whole percent.
///
/// Halves round up, so a `99.5` buyer share implies `1` and the pair no
/// longer sums to 100. A buyer share too negative to subtract implies `0`.
pub fn derive_seller_share(buyer_share_percent: Decimal) -> Decimal {
    dec!(100)
        .checked_sub(buyer_share_percent)
        .unwrap_or_default()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn format_with_places(amount: Decimal, places: u32) -> String {
    let magnitude = amount
        .abs()
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let sign = if amount.is_sign_negative() && !magnitude.is_zero() {
        "-"
    } else {
        ""
    };
    let whole = magnitude
        .trunc()
        .to_u128()
        .unwrap_or_default()
        .to_formatted_string(&Locale::en);

    let text = format!("{:.*}", places as usize, magnitude);
    match text.split_once('.') {
        Some((_, fraction)) => format!("{sign}${whole}.{fraction}"),
        None => format!("{sign}${whole}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1,250,000", dec!(1250000))]
    #[case("S$1,250,000.50", dec!(1250000.50))]
    #[case(" 400 000 ", dec!(400000))]
    #[case("-5,000", dec!(-5000))]
    #[case("", dec!(0))]
    #[case("abc", dec!(0))]
    #[case("12.3.4", dec!(0))]
    fn test_parse_amount(#[case] text: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(text), expected);
    }

    #[test]
    fn test_parse_percent_accepts_suffix() {
        assert_eq!(parse_percent("2.5%"), dec!(2.5));
        assert_eq!(parse_percent("50"), dec!(50));
        assert_eq!(parse_percent("half"), dec!(0));
    }

    #[rstest]
    #[case(dec!(0), "$0.00")]
    #[case(dec!(999.5), "$999.50")]
    #[case(dec!(1234.5), "$1,234.50")]
    #[case(dec!(1000000), "$1,000,000.00")]
    #[case(dec!(2271.945), "$2,271.95")]
    #[case(dec!(-1234), "-$1,234.00")]
    #[case(dec!(-0.001), "$0.00")]
    fn test_format_amount(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_amount(amount), expected);
    }

    #[test]
    fn test_format_whole_amount() {
        assert_eq!(format_whole_amount(dec!(100000)), "$100,000");
        assert_eq!(format_whole_amount(dec!(1234.5)), "$1,235");
        assert_eq!(format_whole_amount(dec!(-1234)), "-$1,234");
        assert_eq!(format_whole_amount(dec!(999)), "$999");
    }

    #[test]
    fn test_format_largest_amounts() {
        assert_eq!(
            format_whole_amount(Decimal::MAX),
            "$79,228,162,514,264,337,593,543,950,335"
        );
        assert_eq!(
            format_amount(Decimal::MIN),
            "-$79,228,162,514,264,337,593,543,950,335.00"
        );
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(37.5)), "37.50");
        assert_eq!(format_percent(dec!(-12.345)), "-12.35");
        assert_eq!(format_percent(dec!(0)), "0.00");
    }

    #[test]
    fn test_derive_seller_share() {
        assert_eq!(derive_seller_share(dec!(50)), dec!(50));
        assert_eq!(derive_seller_share(dec!(1)), dec!(99));
        assert_eq!(derive_seller_share(dec!(99.5)), dec!(1));
        assert_eq!(derive_seller_share(dec!(50.4)), dec!(50));
        assert_eq!(derive_seller_share(Decimal::MIN), dec!(0));
    }
}
