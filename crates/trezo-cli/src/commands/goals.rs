use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use trezo_core::goals::{self, GoalInput};

use crate::commands::resolve_as_of;
use crate::input;

/// Arguments for savings goal progress
#[derive(Args)]
pub struct GoalArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Goal name
    #[arg(long)]
    pub label: Option<String>,

    /// Amount to reach
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Amount saved so far
    #[arg(long)]
    pub current: Option<Decimal>,

    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<NaiveDate>,

    /// Reference date (default: today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_goal_progress(args: GoalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let goal: GoalInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        GoalInput {
            label: args.label,
            target_amount: args.target.ok_or("--target is required (or provide --input)")?,
            current_amount: args
                .current
                .ok_or("--current is required (or provide --input)")?,
            deadline: args.deadline,
        }
    };

    let result = goals::goal_progress(&goal, resolve_as_of(args.as_of))?;
    Ok(serde_json::to_value(result)?)
}
