pub mod debt;
pub mod goals;

use chrono::NaiveDate;

/// Evaluation date for paid/due status: `--as-of` when given, else today.
pub fn resolve_as_of(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}
