//! Debt management: constant-payment amortization and multi-debt overview.

pub mod amortization;
pub mod overview;
