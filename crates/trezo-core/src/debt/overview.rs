//! Portfolio view over several debts, as shown on the debt dashboard.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::amortization::{build_schedule, Debt};
use crate::error::TrezoError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::TrezoResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtOverviewLine {
    pub label: String,
    pub principal: Money,
    pub annual_rate_pct: Decimal,
    pub installment_amount: Money,
    pub payment_frequency_months: u32,
    /// Installment spread over its months (a quarterly 300 counts as 100/month).
    pub monthly_equivalent: Money,
    pub outstanding_balance: Money,
    pub remaining_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtOverview {
    pub debts: Vec<DebtOverviewLine>,
    pub total_principal: Money,
    pub total_outstanding: Money,
    pub total_remaining_interest: Money,
    pub total_monthly_burden: Money,
    /// Outstanding-weighted, in percent. Zero once everything is repaid.
    pub weighted_average_rate_pct: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_end_date: Option<NaiveDate>,
}

/// Run the amortization engine over every debt and aggregate the results.
pub fn summarize_debts(
    debts: &[Debt],
    as_of: NaiveDate,
) -> TrezoResult<ComputationOutput<DebtOverview>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if debts.is_empty() {
        return Err(TrezoError::InsufficientData(
            "Debt overview requires at least one debt".into(),
        ));
    }

    let mut lines = Vec::with_capacity(debts.len());
    for (idx, debt) in debts.iter().enumerate() {
        let schedule = build_schedule(debt, as_of).map_err(|e| prefix_field(e, idx))?;
        let summary = &schedule.summary;

        if summary.due_count == 0 {
            warnings.push(format!(
                "Debt {} is fully repaid as of {as_of}",
                idx + 1
            ));
        }

        lines.push(DebtOverviewLine {
            label: debt
                .label
                .clone()
                .unwrap_or_else(|| format!("Dette {}", idx + 1)),
            principal: debt.principal,
            annual_rate_pct: debt.annual_rate_pct,
            installment_amount: schedule.installment_amount,
            payment_frequency_months: debt.payment_frequency_months,
            monthly_equivalent: schedule.installment_amount
                / Decimal::from(debt.payment_frequency_months),
            outstanding_balance: summary.outstanding_balance,
            remaining_interest: summary.remaining_interest,
            next_due_date: summary.next_due_date,
            end_date: summary.end_date,
        });
    }

    let total_outstanding: Money = lines.iter().map(|l| l.outstanding_balance).sum();
    let weighted_average_rate_pct = if total_outstanding.is_zero() {
        Decimal::ZERO
    } else {
        lines
            .iter()
            .map(|l| l.outstanding_balance * l.annual_rate_pct)
            .sum::<Decimal>()
            / total_outstanding
    };
    // Repaid debts no longer weigh on the monthly budget.
    let total_monthly_burden: Money = lines
        .iter()
        .filter(|l| l.next_due_date.is_some())
        .map(|l| l.monthly_equivalent)
        .sum();

    let overview = DebtOverview {
        total_principal: lines.iter().map(|l| l.principal).sum(),
        total_outstanding,
        total_remaining_interest: lines.iter().map(|l| l.remaining_interest).sum(),
        total_monthly_burden,
        weighted_average_rate_pct,
        last_end_date: lines.iter().map(|l| l.end_date).max(),
        debts: lines,
    };

    debug!(
        debts = overview.debts.len(),
        total_outstanding = %overview.total_outstanding,
        "summarized debts"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt overview: per-debt amortization aggregated as of a date",
        &serde_json::json!({
            "debt_count": debts.len(),
            "as_of": as_of,
        }),
        warnings,
        elapsed,
        overview,
    ))
}

fn prefix_field(err: TrezoError, idx: usize) -> TrezoError {
    match err {
        TrezoError::InvalidDebtParameters { field, reason } => TrezoError::InvalidDebtParameters {
            field: format!("debts[{idx}].{field}"),
            reason,
        },
        other => other,
    }
}
