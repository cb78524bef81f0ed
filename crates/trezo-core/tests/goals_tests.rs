#![cfg(feature = "goals")]

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use trezo_core::goals::{goal_progress, GoalInput};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_goal_three_quarters_done() {
    let input = GoalInput {
        label: Some("Fonds d'urgence".into()),
        target_amount: dec!(10000),
        current_amount: dec!(7500),
        deadline: Some(date(2025, 1, 1)),
    };
    let out = goal_progress(&input, date(2024, 1, 1)).unwrap();
    let p = &out.result;

    assert_eq!(p.progress_pct, dec!(75));
    assert_eq!(p.remaining_amount, dec!(2500));
    assert!(!p.achieved);
    assert_eq!(p.months_remaining, Some(12));
    assert_eq!(p.required_monthly_contribution, Some(dec!(2500) / dec!(12)));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_goal_rejects_zero_target() {
    let input = GoalInput {
        label: None,
        target_amount: dec!(0),
        current_amount: dec!(10),
        deadline: None,
    };
    assert!(goal_progress(&input, date(2024, 1, 1)).is_err());
}
