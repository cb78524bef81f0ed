//! Savings goal ("objectif") progress.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use crate::error::TrezoError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::TrezoResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub target_amount: Money,
    pub current_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProgress {
    /// current / target, not capped.
    pub progress_ratio: Decimal,
    /// Capped at 100.
    pub progress_pct: Decimal,
    pub remaining_amount: Money,
    pub achieved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_monthly_contribution: Option<Money>,
}

pub fn goal_progress(
    input: &GoalInput,
    as_of: NaiveDate,
) -> TrezoResult<ComputationOutput<GoalProgress>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.target_amount <= Decimal::ZERO {
        return Err(TrezoError::InvalidInput {
            field: "target_amount".into(),
            reason: "Target amount must be positive".into(),
        });
    }
    if input.current_amount < Decimal::ZERO {
        return Err(TrezoError::InvalidInput {
            field: "current_amount".into(),
            reason: "Current amount cannot be negative".into(),
        });
    }

    let progress_ratio = input.current_amount / input.target_amount;
    let progress_pct = (progress_ratio * dec!(100)).min(dec!(100));
    let remaining_amount = (input.target_amount - input.current_amount).max(Decimal::ZERO);
    let achieved = remaining_amount.is_zero();

    let months_remaining = input.deadline.map(|d| whole_months_between(as_of, d));
    let required_monthly_contribution = match (input.deadline, months_remaining) {
        (Some(deadline), Some(months)) => {
            if !achieved && deadline < as_of {
                warn!(%deadline, %as_of, "goal deadline passed before completion");
                warnings.push(format!(
                    "Deadline {deadline} has passed with {remaining_amount} still to save"
                ));
            }
            if achieved {
                Some(Decimal::ZERO)
            } else if months == 0 {
                Some(remaining_amount)
            } else {
                Some(remaining_amount / Decimal::from(months))
            }
        }
        _ => None,
    };

    let output = GoalProgress {
        progress_ratio,
        progress_pct,
        remaining_amount,
        achieved,
        months_remaining,
        required_monthly_contribution,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Goal progress: current over target, linear monthly contribution to deadline",
        &serde_json::json!({
            "label": input.label,
            "target_amount": input.target_amount.to_string(),
            "as_of": as_of,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Complete calendar months from `from` to `to`; 0 when `to` is not after `from`.
fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}
