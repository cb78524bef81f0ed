//! Constant-payment (annuity) amortization schedules.
//!
//! A [`Debt`] is turned into a fully materialized list of [`Installment`]s.
//! The schedule is a pure function of the debt and an explicit `as_of` date;
//! the only date-dependent field is the paid/due status, which is a display
//! heuristic and not a record of actual payments.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::TrezoError;
use crate::time_value::pmt;
use crate::types::{with_metadata, ComputationOutput, Currency, Money, Rate};
use crate::TrezoResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);
/// 100 years. Keeps chrono month arithmetic in range.
const MAX_DURATION_MONTHS: u32 = 1200;
/// Upper bounds on principal and rate. Together with the duration cap they keep
/// every total (installments × periods) well inside Decimal's 28 digits.
const MAX_PRINCIPAL: Decimal = dec!(1_000_000_000_000_000);
const MAX_ANNUAL_RATE_PCT: Decimal = dec!(1000);

fn default_frequency() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// A debt as entered on the debt-management form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Borrowed amount.
    pub principal: Money,
    /// Nominal annual rate in percent (3.5 = 3.5%). Zero is allowed.
    pub annual_rate_pct: Decimal,
    pub total_duration_months: u32,
    /// Due date of the first installment.
    pub start_date: NaiveDate,
    /// Months between installments: 1 monthly, 3 quarterly, 6 semi-annual, 12 annual.
    #[serde(default = "default_frequency")]
    pub payment_frequency_months: u32,
    #[serde(default)]
    pub currency: Currency,
}

impl Debt {
    /// Number of installments. Only meaningful once the frequency is known
    /// to divide the duration.
    pub fn number_of_installments(&self) -> u32 {
        self.total_duration_months / self.payment_frequency_months.max(1)
    }

    pub fn periodic_rate(&self) -> Rate {
        periodic_rate(self.annual_rate_pct, self.payment_frequency_months)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Paid,
    Due,
}

impl InstallmentStatus {
    /// `Paid` when the due date is strictly before `as_of`.
    pub fn as_of(due_date: NaiveDate, as_of: NaiveDate) -> Self {
        if due_date < as_of {
            InstallmentStatus::Paid
        } else {
            InstallmentStatus::Due
        }
    }
}

/// One period of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 0-based.
    pub sequence_index: u32,
    pub due_date: NaiveDate,
    pub total_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Never negative.
    pub remaining_balance_after: Money,
    pub status: InstallmentStatus,
}

/// Aggregates over a schedule as seen from the `as_of` date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub paid_count: u32,
    pub due_count: u32,
    /// Balance after the last paid installment, or the principal if none.
    pub outstanding_balance: Money,
    /// Interest carried by installments still due.
    pub remaining_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_amount: Option<Money>,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub currency: Currency,
    /// Per-period rate as a decimal (not percent).
    pub periodic_rate: Rate,
    pub installment_amount: Money,
    pub number_of_installments: u32,
    pub installments: Vec<Installment>,
    pub summary: ScheduleSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Annual percentage rate converted to the rate of one repayment period.
///
/// The monthly rate is scaled linearly by the frequency, so a quarterly
/// period at 4.2% carries 1.05%.
pub fn periodic_rate(annual_rate_pct: Decimal, payment_frequency_months: u32) -> Rate {
    annual_rate_pct / MONTHS_PER_YEAR / PERCENT * Decimal::from(payment_frequency_months)
}

/// Fixed installment that fully repays `principal` over `total_periods`
/// periods of `payment_frequency_months` months each.
///
/// A zero rate repays in straight line (`principal / total_periods`);
/// otherwise the annuity formula `P·r(1+r)^n / ((1+r)^n − 1)` applies,
/// evaluated in its discounted form `P·r / (1 − (1+r)^-n)`.
pub fn compute_periodic_installment(
    principal: Money,
    annual_rate_pct: Decimal,
    total_periods: u32,
    payment_frequency_months: u32,
) -> TrezoResult<Money> {
    validate_amounts(principal, annual_rate_pct)?;
    if total_periods == 0 {
        return Err(TrezoError::debt(
            "total_periods",
            "At least one period is required",
        ));
    }
    if total_periods > MAX_DURATION_MONTHS {
        return Err(TrezoError::debt(
            "total_periods",
            format!("Cannot exceed {MAX_DURATION_MONTHS} periods"),
        ));
    }
    if payment_frequency_months == 0 {
        return Err(TrezoError::debt(
            "payment_frequency_months",
            "Payment frequency must be at least one month",
        ));
    }

    let rate = periodic_rate(annual_rate_pct, payment_frequency_months);
    if rate.is_zero() {
        return Ok(principal / Decimal::from(total_periods));
    }

    pmt(rate, total_periods, principal, Decimal::ZERO)
        .map(|payment| -payment)
        .map_err(|e| match e {
            TrezoError::DivisionByZero { .. } => TrezoError::debt(
                "annual_rate_pct",
                format!("Rate {annual_rate_pct}% is too small to amortize over {total_periods} periods"),
            ),
            other => TrezoError::debt("principal", other.to_string()),
        })
}

/// Full schedule for `debt`. Statuses are evaluated against `as_of`.
///
/// Interest is charged on the running balance; the balance after each period
/// is read off the closed-form annuity curve instead of being accumulated, so
/// rounding cannot compound over long, high-rate schedules. Principal portions
/// therefore telescope to exactly the original principal and the last period
/// leaves nothing outstanding.
pub fn generate_schedule(debt: &Debt, as_of: NaiveDate) -> TrezoResult<Vec<Installment>> {
    validate_debt(debt)?;

    let periods = debt.number_of_installments();
    let rate = debt.periodic_rate();
    let installment = compute_periodic_installment(
        debt.principal,
        debt.annual_rate_pct,
        periods,
        debt.payment_frequency_months,
    )?;
    let curve = BalanceCurve::new(debt.principal, rate, periods)?;

    (0..periods)
        .scan(debt.principal, |balance, index| {
            let row = curve.after(index + 1).and_then(|next| {
                let next = next.min(*balance).max(Decimal::ZERO);
                let interest_portion = *balance * rate;
                let principal_portion = *balance - next;
                *balance = next;

                let due_date = due_date(debt.start_date, index, debt.payment_frequency_months)?;
                Ok(Installment {
                    sequence_index: index,
                    due_date,
                    total_amount: installment,
                    principal_portion,
                    interest_portion,
                    remaining_balance_after: next,
                    status: InstallmentStatus::as_of(due_date, as_of),
                })
            });
            Some(row)
        })
        .collect()
}

/// Schedule plus its summary, without the computation envelope.
pub fn build_schedule(debt: &Debt, as_of: NaiveDate) -> TrezoResult<AmortizationSchedule> {
    let installments = generate_schedule(debt, as_of)?;
    let summary = summarize(debt, &installments)?;
    let installment_amount = installments
        .first()
        .map(|i| i.total_amount)
        .unwrap_or(Decimal::ZERO);

    debug!(
        principal = %debt.principal,
        annual_rate_pct = %debt.annual_rate_pct,
        installments = installments.len(),
        installment_amount = %installment_amount,
        "built amortization schedule"
    );

    Ok(AmortizationSchedule {
        label: debt.label.clone(),
        currency: debt.currency.clone(),
        periodic_rate: debt.periodic_rate(),
        installment_amount,
        number_of_installments: debt.number_of_installments(),
        installments,
        summary,
    })
}

/// Amortize a debt and wrap the schedule in the standard output envelope.
pub fn amortize(
    debt: &Debt,
    as_of: NaiveDate,
) -> TrezoResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = build_schedule(debt, as_of)?;

    if debt.annual_rate_pct.is_zero() {
        warnings.push(format!(
            "Zero interest rate: straight-line repayment of {} per installment",
            schedule.installment_amount
        ));
    }
    if debt.start_date.day() > 28 {
        warn!(start_date = %debt.start_date, "due dates will clamp to month end");
        warnings.push(format!(
            "Start date {} falls after the 28th; due dates in shorter months clamp to the last day",
            debt.start_date
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Constant-payment amortization (annuity), running-balance interest split",
        &serde_json::json!({
            "principal": debt.principal.to_string(),
            "annual_rate_pct": debt.annual_rate_pct.to_string(),
            "total_duration_months": debt.total_duration_months,
            "payment_frequency_months": debt.payment_frequency_months,
            "start_date": debt.start_date,
            "as_of": as_of,
        }),
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_amounts(principal: Money, annual_rate_pct: Decimal) -> TrezoResult<()> {
    if principal <= Decimal::ZERO {
        return Err(TrezoError::debt("principal", "Principal must be positive"));
    }
    if principal > MAX_PRINCIPAL {
        return Err(TrezoError::debt(
            "principal",
            format!("Principal cannot exceed {MAX_PRINCIPAL}"),
        ));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(TrezoError::debt(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    if annual_rate_pct > MAX_ANNUAL_RATE_PCT {
        return Err(TrezoError::debt(
            "annual_rate_pct",
            format!("Interest rate cannot exceed {MAX_ANNUAL_RATE_PCT}%"),
        ));
    }
    Ok(())
}

fn validate_debt(debt: &Debt) -> TrezoResult<()> {
    validate_amounts(debt.principal, debt.annual_rate_pct)?;
    if debt.total_duration_months == 0 {
        return Err(TrezoError::debt(
            "total_duration_months",
            "Duration must be at least one month",
        ));
    }
    if debt.total_duration_months > MAX_DURATION_MONTHS {
        return Err(TrezoError::debt(
            "total_duration_months",
            format!("Duration cannot exceed {MAX_DURATION_MONTHS} months"),
        ));
    }
    if debt.payment_frequency_months == 0 {
        return Err(TrezoError::debt(
            "payment_frequency_months",
            "Payment frequency must be at least one month",
        ));
    }
    if debt.total_duration_months % debt.payment_frequency_months != 0 {
        return Err(TrezoError::debt(
            "payment_frequency_months",
            format!(
                "Frequency of {} months does not divide a duration of {} months",
                debt.payment_frequency_months, debt.total_duration_months
            ),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Remaining balance after `k` of `n` constant payments:
/// `P·(1 − v^(n−k)) / (1 − v^n)` with `v = 1 / (1 + r)`, or `P·(n − k) / n`
/// when the rate is zero.
struct BalanceCurve {
    principal: Money,
    periods: u32,
    /// `v` and `1 − v^n`; `None` for interest-free debts.
    discount: Option<(Decimal, Decimal)>,
}

impl BalanceCurve {
    fn new(principal: Money, rate: Rate, periods: u32) -> TrezoResult<Self> {
        let discount = if rate.is_zero() {
            None
        } else {
            let v = Decimal::ONE / (Decimal::ONE + rate);
            let denominator = Decimal::ONE - power(v, periods)?;
            if denominator.is_zero() {
                return Err(TrezoError::debt(
                    "annual_rate_pct",
                    "Rate is too small to amortize at decimal precision",
                ));
            }
            Some((v, denominator))
        };
        Ok(Self {
            principal,
            periods,
            discount,
        })
    }

    fn after(&self, k: u32) -> TrezoResult<Money> {
        let left = self.periods.saturating_sub(k);
        match self.discount {
            None => Ok(self.principal * Decimal::from(left) / Decimal::from(self.periods)),
            Some((v, denominator)) => {
                let unpaid = Decimal::ONE - power(v, left)?;
                Ok(self.principal * unpaid / denominator)
            }
        }
    }
}

/// `v^exp` for `0 < v < 1`; cannot overflow, only underflow towards zero.
fn power(v: Decimal, exp: u32) -> TrezoResult<Decimal> {
    v.checked_powu(u64::from(exp)).ok_or_else(|| {
        TrezoError::debt(
            "total_duration_months",
            format!("Discount factor {v}^{exp} is out of decimal range"),
        )
    })
}

fn due_date(start: NaiveDate, index: u32, frequency_months: u32) -> TrezoResult<NaiveDate> {
    start
        .checked_add_months(Months::new(index * frequency_months))
        .ok_or_else(|| {
            TrezoError::DateError(format!(
                "Installment {index} due date overflows the calendar from {start}"
            ))
        })
}

fn summarize(debt: &Debt, installments: &[Installment]) -> TrezoResult<ScheduleSummary> {
    let last = installments.last().ok_or_else(|| {
        TrezoError::InsufficientData("Schedule has no installments".into())
    })?;

    let (paid, due): (Vec<&Installment>, Vec<&Installment>) = installments
        .iter()
        .partition(|i| i.status == InstallmentStatus::Paid);

    let outstanding_balance = paid
        .last()
        .map(|i| i.remaining_balance_after)
        .unwrap_or(debt.principal);
    let next_due = due.first();

    Ok(ScheduleSummary {
        total_paid: installments.iter().map(|i| i.total_amount).sum(),
        total_interest: installments.iter().map(|i| i.interest_portion).sum(),
        total_principal: installments.iter().map(|i| i.principal_portion).sum(),
        paid_count: paid.len() as u32,
        due_count: due.len() as u32,
        outstanding_balance,
        remaining_interest: due.iter().map(|i| i.interest_portion).sum(),
        next_due_date: next_due.map(|i| i.due_date),
        next_due_amount: next_due.map(|i| i.total_amount),
        end_date: last.due_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mortgage() -> Debt {
        Debt {
            label: Some("Prêt immobilier".into()),
            principal: dec!(150000),
            annual_rate_pct: dec!(3.5),
            total_duration_months: 180,
            start_date: date(2020, 6, 15),
            payment_frequency_months: 1,
            currency: Currency::EUR,
        }
    }

    #[test]
    fn test_periodic_rate_scales_with_frequency() {
        assert_eq!(periodic_rate(dec!(12), 1), dec!(0.01));
        assert_eq!(periodic_rate(dec!(12), 3), dec!(0.03));
    }

    #[test]
    fn test_installment_standard_annuity() {
        let amount = compute_periodic_installment(dec!(150000), dec!(3.5), 180, 1).unwrap();
        assert!((amount - dec!(1072.32)).abs() < dec!(0.01), "got {amount}");
    }

    #[test]
    fn test_installment_zero_rate() {
        let amount = compute_periodic_installment(dec!(12000), dec!(0), 12, 1).unwrap();
        assert_eq!(amount, dec!(1000));
    }

    #[test]
    fn test_installment_rejects_zero_periods() {
        let err = compute_periodic_installment(dec!(1000), dec!(5), 0, 1).unwrap_err();
        assert_eq!(err.field(), Some("total_periods"));
    }

    #[test]
    fn test_installment_high_rate_long_term_is_finite() {
        // 36% over 1200 months on a quadrillion: P·(1+r)^n would overflow.
        let amount = compute_periodic_installment(
            dec!(1_000_000_000_000_000),
            dec!(36),
            1200,
            1,
        )
        .unwrap();
        // (1.03)^-1200 is ~1e-16, so the installment is P·r to within a unit.
        assert!((amount - dec!(30_000_000_000_000)).abs() < dec!(1), "got {amount}");
    }

    #[test]
    fn test_out_of_range_terms_are_debt_parameter_errors() {
        let cases = [
            (dec!(1_000_000_000_000_001), dec!(5), "principal"),
            (dec!(1000), dec!(1000.01), "annual_rate_pct"),
        ];
        for (principal, rate, field) in cases {
            let err = compute_periodic_installment(principal, rate, 12, 1).unwrap_err();
            assert!(matches!(err, TrezoError::InvalidDebtParameters { .. }));
            assert_eq!(err.field(), Some(field));
        }
        let err = compute_periodic_installment(dec!(1000), dec!(5), 1201, 1).unwrap_err();
        assert_eq!(err.field(), Some("total_periods"));
    }

    #[test]
    fn test_full_century_at_100_pct_amortizes() {
        let debt = Debt {
            label: None,
            principal: dec!(10000),
            annual_rate_pct: dec!(100),
            total_duration_months: 1200,
            start_date: date(2020, 1, 1),
            payment_frequency_months: 1,
            currency: Currency::EUR,
        };
        let schedule = generate_schedule(&debt, date(2020, 1, 1)).unwrap();
        assert_eq!(schedule.len(), 1200);

        let repaid: Decimal = schedule.iter().map(|i| i.principal_portion).sum();
        assert!((repaid - dec!(10000)).abs() < dec!(0.000000000001));
        assert_eq!(schedule[1199].remaining_balance_after, Decimal::ZERO);
        // Early periods are almost pure interest.
        assert!((schedule[0].interest_portion - dec!(833.33)).abs() < dec!(0.01));
    }

    #[test]
    fn test_balance_curve_endpoints() {
        let curve = BalanceCurve::new(dec!(5000), dec!(0.01), 24).unwrap();
        assert!((curve.after(0).unwrap() - dec!(5000)).abs() < dec!(0.00000000000001));
        assert_eq!(curve.after(24).unwrap(), Decimal::ZERO);

        let flat = BalanceCurve::new(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(flat.after(3).unwrap(), dec!(900));
    }

    #[test]
    fn test_first_interest_portion() {
        let schedule = generate_schedule(&mortgage(), date(2020, 1, 1)).unwrap();
        assert_eq!(schedule.len(), 180);
        assert!((schedule[0].interest_portion - dec!(437.50)).abs() < dec!(0.01));
    }

    #[test]
    fn test_status_pinned_by_as_of() {
        let schedule = generate_schedule(&mortgage(), date(2021, 6, 15)).unwrap();
        // 2020-06-15 .. 2021-05-15 are before as_of; 2021-06-15 is due.
        let paid = schedule
            .iter()
            .filter(|i| i.status == InstallmentStatus::Paid)
            .count();
        assert_eq!(paid, 12);
        assert_eq!(schedule[12].status, InstallmentStatus::Due);
    }

    #[test]
    fn test_non_dividing_frequency_rejected() {
        let mut debt = mortgage();
        debt.total_duration_months = 10;
        debt.payment_frequency_months = 3;
        let err = generate_schedule(&debt, date(2020, 1, 1)).unwrap_err();
        assert_eq!(err.field(), Some("payment_frequency_months"));
    }

    #[test]
    fn test_month_end_start_clamps() {
        let debt = Debt {
            label: None,
            principal: dec!(3000),
            annual_rate_pct: dec!(0),
            total_duration_months: 3,
            start_date: date(2024, 1, 31),
            payment_frequency_months: 1,
            currency: Currency::EUR,
        };
        let schedule = generate_schedule(&debt, date(2024, 1, 1)).unwrap();
        assert_eq!(schedule[1].due_date, date(2024, 2, 29));
        assert_eq!(schedule[2].due_date, date(2024, 3, 31));

        let output = amortize(&debt, date(2024, 1, 1)).unwrap();
        assert_eq!(output.warnings.len(), 2);
    }

    #[test]
    fn test_summary_outstanding_and_next_due() {
        let debt = Debt {
            label: None,
            principal: dec!(12000),
            annual_rate_pct: dec!(0),
            total_duration_months: 12,
            start_date: date(2024, 1, 10),
            payment_frequency_months: 1,
            currency: Currency::EUR,
        };
        let schedule = build_schedule(&debt, date(2024, 4, 1)).unwrap();
        let summary = &schedule.summary;
        assert_eq!(summary.paid_count, 3);
        assert_eq!(summary.due_count, 9);
        assert_eq!(summary.outstanding_balance, dec!(9000));
        assert_eq!(summary.next_due_date, Some(date(2024, 4, 10)));
        assert_eq!(summary.next_due_amount, Some(dec!(1000)));
        assert_eq!(summary.end_date, date(2024, 12, 10));
        assert_eq!(summary.total_paid, dec!(12000));
    }
}
