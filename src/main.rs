use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sg_decoupling::money::{format_amount, format_percent};
use sg_decoupling::{DecouplingError, DecouplingForm, DecouplingPolicy, DecouplingResult, calculate};

/// Calculates the buyer and seller costs of decoupling a property.
#[derive(Debug, Parser)]
#[command(name = "decoupling", version)]
struct Cli {
    /// JSON file with the calculator fields. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON file overriding the default policy.
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Print the result as JSON instead of a report.
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        let (code, message) = failure(&e);
        eprintln!("{message}");
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<(), anyhow::Error> {
    let policy = match &cli.policy {
        Some(path) => DecouplingPolicy::from_json_str(&read_file(path)?)
            .with_context(|| format!("invalid policy in {}", path.display()))?,
        None => DecouplingPolicy::default(),
    };

    let raw = match &cli.input {
        Some(path) => read_file(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read input from stdin")?;
            raw
        }
    };

    evaluate(&raw, &policy, cli.json, &mut std::io::stdout().lock())
}

fn read_file(path: &Path) -> Result<String, anyhow::Error> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Runs one calculation on a JSON form and writes the result to `out`.
fn evaluate(
    raw: &str,
    policy: &DecouplingPolicy,
    json: bool,
    out: &mut impl Write,
) -> Result<(), anyhow::Error> {
    let form: DecouplingForm = serde_json::from_str(raw).context("input is not valid JSON")?;
    let input = form.to_input(policy).map_err(DecouplingError::from)?;
    let result = calculate(&input, policy)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &result)?;
        writeln!(out)?;
    } else {
        write_report(out, &result)?;
    }
    Ok(())
}

/// Exit code and stderr text for a failed run: 2 with one line per
/// violation when the form is invalid, 1 for anything else.
fn failure(e: &anyhow::Error) -> (i32, String) {
    match e.downcast_ref::<DecouplingError>() {
        Some(DecouplingError::Validation(violations)) => (2, violations.messages().join("\n")),
        _ => (1, format!("Error: {e:#}")),
    }
}

fn write_report(out: &mut impl Write, result: &DecouplingResult) -> std::io::Result<()> {
    let buyer = &result.buyer;
    let seller = &result.seller;

    writeln!(out, "Buyer")?;
    writeln!(out, "  Property share            {}", format_amount(buyer.property_share))?;
    writeln!(out, "  Loan liability            {}", format_amount(buyer.loan_liability))?;
    writeln!(out, "  Purchase price            {}", format_amount(buyer.purchase_price))?;
    writeln!(out, "  5% cash                   {}", format_amount(buyer.cash_downpayment))?;
    writeln!(out, "  20% cash/CPF              {}", format_amount(buyer.cpf_or_cash_downpayment))?;
    writeln!(out, "  75% bank loan             {}", format_amount(buyer.bank_loan))?;
    writeln!(out, "  New total loan            {}", format_amount(buyer.new_total_loan))?;
    writeln!(out, "  Tenure                    {} years", buyer.tenure_years)?;
    writeln!(out, "  Monthly installment       {}", format_amount(buyer.monthly_installment))?;
    writeln!(out, "  Buyer's stamp duty        {}", format_amount(buyer.stamp_duty))?;
    writeln!(out, "  Additional stamp duty     {}", format_amount(buyer.additional_stamp_duty))?;
    writeln!(out, "  Legal fee                 {} +/-", format_amount(buyer.legal_fee))?;
    writeln!(out, "  Valuation fee             {}", buyer.valuation_fee)?;
    writeln!(out, "  CPF for downpayment       {}", format_amount(buyer.cpf_used_for_downpayment))?;
    writeln!(out, "  Cash top-up, downpayment  {}", format_amount(buyer.cash_topup_for_downpayment))?;
    writeln!(out, "  CPF for legal fee         {}", format_amount(buyer.cpf_used_for_legal_fee))?;
    writeln!(out, "  Cash top-up, legal fee    {}", format_amount(buyer.cash_topup_for_legal_fee))?;
    writeln!(
        out,
        "  Total cash required       {}",
        format_amount(buyer.total_cash_required_with_legal_fee)
    )?;
    writeln!(
        out,
        "  Ownership                 loan {}% / CPF {}% / cashable equity {}%",
        format_percent(buyer.ownership.loan_percent),
        format_percent(buyer.ownership.cpf_percent),
        format_percent(buyer.ownership.cashable_equity_percent)
    )?;

    writeln!(out, "Seller")?;
    writeln!(out, "  Property share            {}", format_amount(seller.property_share))?;
    writeln!(out, "  Loan liability            {}", format_amount(seller.loan_liability))?;
    writeln!(out, "  Selling price             {}", format_amount(seller.selling_price))?;
    writeln!(out, "  CPF refund to OA          {}", format_amount(seller.cpf_refund))?;
    writeln!(out, "  Seller's stamp duty       {}", format_amount(seller.stamp_duty))?;
    writeln!(out, "  Legal fee                 {} +/-", format_amount(seller.legal_fee))?;
    writeln!(out, "  Cash proceeds             {}", format_amount(seller.cash_proceeds))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SCENARIO: &str = include_str!("../demos/scenario.json");

    fn evaluate_to_string(raw: &str, policy: &DecouplingPolicy, json: bool) -> Result<String, anyhow::Error> {
        let mut out = Vec::new();
        evaluate(raw, policy, json, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_report_lists_both_parties() {
        let report = evaluate_to_string(SCENARIO, &DecouplingPolicy::default(), false).unwrap();
        assert!(report.starts_with("Buyer\n"));
        assert!(report.contains("  Monthly installment       $2,271.95\n"));
        assert!(report.contains("  Tenure                    30 years\n"));
        assert!(report.contains("Seller\n"));
        assert!(report.ends_with("  Cash proceeds             $200,000.00\n"));
    }

    #[test]
    fn test_json_output_is_the_result() {
        let printed = evaluate_to_string(SCENARIO, &DecouplingPolicy::default(), true).unwrap();
        let result: DecouplingResult = serde_json::from_str(&printed).unwrap();
        assert_eq!(result.seller.cash_proceeds, dec!(200_000));
        assert_eq!(result.buyer.monthly_installment, dec!(2271.95));
    }

    #[test]
    fn test_violations_exit_with_two() {
        let raw = r#"{ "property_valuation": "50,000", "buyer_share": "50", "buyer_age": "35", "years_since_purchase": "" }"#;
        let err = evaluate_to_string(raw, &DecouplingPolicy::default(), false).unwrap_err();
        assert_eq!(
            failure(&err),
            (
                2,
                "Valuation must be at least S$100,000\nPlease select the years since purchase (0, 1, 2 or 3+)"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_domain_error_exits_with_one() {
        let policy = DecouplingPolicy {
            maximum_buyer_age: 70,
            ..DecouplingPolicy::default()
        };
        let raw = SCENARIO.replace(r#""buyer_age": "35""#, r#""buyer_age": "66""#);
        let err = evaluate_to_string(&raw, &policy, false).unwrap_err();
        let (code, message) = failure(&err);
        assert_eq!(code, 1);
        assert!(message.starts_with("Error: buyer age 66 leaves no loan tenure"));
    }

    #[test]
    fn test_policy_and_input_errors_exit_with_one() {
        let err = DecouplingPolicy::from_json_str(r#"{ "maximum_buyer_age": 65 }"#).unwrap_err();
        assert_eq!(failure(&err).0, 1);

        let err = evaluate_to_string("not json", &DecouplingPolicy::default(), false).unwrap_err();
        let (code, message) = failure(&err);
        assert_eq!(code, 1);
        assert!(message.starts_with("Error: input is not valid JSON"));
    }
}
