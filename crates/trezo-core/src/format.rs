//! French-locale money formatting (`1 072,32 €`).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Currency, Money};

/// Narrow no-break space, the fr-FR thousands separator.
const GROUP_SEPARATOR: char = '\u{202F}';
/// No-break space between the amount and the currency symbol.
const SYMBOL_SEPARATOR: char = '\u{A0}';

/// Format an amount with two decimals, rounded half away from zero.
pub fn format_money(amount: Money, currency: &Currency) -> String {
    format!(
        "{}{}{}",
        format_decimal(amount, 2),
        SYMBOL_SEPARATOR,
        currency.symbol()
    )
}

/// Group and localize a decimal without a currency symbol.
pub fn format_decimal(amount: Decimal, decimals: u32) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    rounded.rescale(decimals);

    let digits = rounded.to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}
