use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;

use trezo_core::debt::amortization::{self, Debt};
use trezo_core::debt::overview;
use trezo_core::goals::{self, GoalInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// `as_of` from the caller (ISO date), or the host's local date.
fn parse_as_of(as_of: Option<String>) -> NapiResult<NaiveDate> {
    match as_of {
        Some(s) => s.parse::<NaiveDate>().map_err(to_napi_error),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

// ---------------------------------------------------------------------------
// Debts
// ---------------------------------------------------------------------------

#[napi]
pub fn amortize(debt_json: String, as_of: Option<String>) -> NapiResult<String> {
    let debt: Debt = serde_json::from_str(&debt_json).map_err(to_napi_error)?;
    let output = amortization::amortize(&debt, parse_as_of(as_of)?).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn periodic_installment(
    principal: String,
    annual_rate_pct: String,
    total_periods: u32,
    payment_frequency_months: Option<u32>,
) -> NapiResult<String> {
    let principal = principal.parse().map_err(to_napi_error)?;
    let rate = annual_rate_pct.parse().map_err(to_napi_error)?;
    let amount = amortization::compute_periodic_installment(
        principal,
        rate,
        total_periods,
        payment_frequency_months.unwrap_or(1),
    )
    .map_err(to_napi_error)?;
    Ok(amount.to_string())
}

#[napi]
pub fn debt_overview(debts_json: String, as_of: Option<String>) -> NapiResult<String> {
    let debts: Vec<Debt> = serde_json::from_str(&debts_json).map_err(to_napi_error)?;
    let output = overview::summarize_debts(&debts, parse_as_of(as_of)?).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[napi]
pub fn goal_progress(goal_json: String, as_of: Option<String>) -> NapiResult<String> {
    let goal: GoalInput = serde_json::from_str(&goal_json).map_err(to_napi_error)?;
    let output = goals::goal_progress(&goal, parse_as_of(as_of)?).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[napi]
pub fn format_money(amount: String, currency: Option<String>) -> NapiResult<String> {
    let amount = amount.parse().map_err(to_napi_error)?;
    let currency = match currency {
        Some(code) => serde_json::from_value(serde_json::Value::String(code.clone()))
            .unwrap_or(trezo_core::Currency::Other(code)),
        None => trezo_core::Currency::default(),
    };
    Ok(trezo_core::format::format_money(amount, &currency))
}
