use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use trezo_core::debt::amortization::{self, Debt};
use trezo_core::debt::overview;
use trezo_core::Currency;

use crate::commands::resolve_as_of;
use crate::input;

/// Arguments for a single-debt amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON debt file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Display name of the debt
    #[arg(long)]
    pub label: Option<String>,

    /// Borrowed amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (3.5 = 3.5%)
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Total duration in months
    #[arg(long, alias = "months")]
    pub total_duration_months: Option<u32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Months between installments (1 monthly, 3 quarterly, 12 annual)
    #[arg(long, alias = "frequency", default_value_t = 1)]
    pub payment_frequency_months: u32,

    /// Date against which installments are marked paid or due (default: today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for the periodic installment only
#[derive(Args)]
pub struct InstallmentArgs {
    /// Borrowed amount
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Decimal,

    /// Number of installments
    #[arg(long)]
    pub periods: u32,

    /// Months between installments
    #[arg(long, alias = "frequency", default_value_t = 1)]
    pub payment_frequency_months: u32,
}

/// Arguments for the multi-debt overview
#[derive(Args)]
pub struct OverviewArgs {
    /// Path to JSON file: an array of debts or {"debts": [...]}
    #[arg(long)]
    pub input: Option<String>,

    /// Date against which installments are marked paid or due (default: today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt: Debt = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        Debt {
            label: args.label,
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args
                .annual_rate_pct
                .ok_or("--annual-rate-pct is required (or provide --input)")?,
            total_duration_months: args
                .total_duration_months
                .ok_or("--total-duration-months is required (or provide --input)")?,
            start_date: args
                .start_date
                .ok_or("--start-date is required (or provide --input)")?,
            payment_frequency_months: args.payment_frequency_months,
            currency: Currency::default(),
        }
    };

    let as_of = resolve_as_of(args.as_of);
    info!(%as_of, principal = %debt.principal, "amortizing debt");
    let result = amortization::amortize(&debt, as_of)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_installment(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let installment_amount = amortization::compute_periodic_installment(
        args.principal,
        args.annual_rate_pct,
        args.periods,
        args.payment_frequency_months,
    )?;
    let periodic_rate =
        amortization::periodic_rate(args.annual_rate_pct, args.payment_frequency_months);

    Ok(serde_json::json!({
        "installment_amount": installment_amount.to_string(),
        "periodic_rate": periodic_rate.to_string(),
        "total_paid": (installment_amount * Decimal::from(args.periods)).to_string(),
    }))
}

pub fn run_overview(args: OverviewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input file is required for the debt overview".into());
    };

    let debts: Vec<Debt> = match data {
        Value::Object(mut map) => {
            let list = map.remove("debts").ok_or("expected a \"debts\" array")?;
            serde_json::from_value(list)?
        }
        other => serde_json::from_value(other)?,
    };

    let as_of = resolve_as_of(args.as_of);
    info!(%as_of, debts = debts.len(), "summarizing debts");
    let result = overview::summarize_debts(&debts, as_of)?;
    Ok(serde_json::to_value(result)?)
}
