use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::TrezoError;
use crate::types::{Money, Rate};
use crate::TrezoResult;

/// Payment (PMT), spreadsheet sign convention: a positive present value
/// (cash received) yields a negative payment.
///
/// Evaluated as `-(pv + fv·v^n)·r / (1 − v^n)` with `v = 1 / (1 + r)`. For
/// positive rates `v^n` stays in `(0, 1]`, so no intermediate grows past the
/// inputs themselves.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> TrezoResult<Money> {
    if nper == 0 {
        return Err(TrezoError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate <= dec!(-1) {
        return Err(TrezoError::InvalidInput {
            field: "rate".into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let discount = (Decimal::ONE / (Decimal::ONE + rate))
        .checked_powu(u64::from(nper))
        .ok_or_else(|| TrezoError::InvalidInput {
            field: "nper".into(),
            reason: format!("(1 + {rate})^-{nper} overflows decimal range"),
        })?;
    let annuity_factor = Decimal::ONE - discount;

    if annuity_factor.is_zero() {
        return Err(TrezoError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    future_value
        .checked_mul(discount)
        .and_then(|fv| fv.checked_add(present_value))
        .and_then(|v| v.checked_mul(rate))
        .and_then(|v| v.checked_div(annuity_factor))
        .map(|payment| -payment)
        .ok_or_else(|| TrezoError::InvalidInput {
            field: "present_value".into(),
            reason: format!("Payment on {present_value} at {rate} overflows decimal range"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pmt_mortgage() {
        // 200k over 360 months at 6%/12 ≈ 1199.10
        let result = pmt(dec!(0.005), 360, dec!(200000), dec!(0)).unwrap();
        assert!((result + dec!(1199.10)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate() {
        let result = pmt(dec!(0), 12, dec!(12000), dec!(0)).unwrap();
        assert_eq!(result, dec!(-1000));
    }

    #[test]
    fn test_pmt_matches_compounding_form() {
        // 10k over 12 periods at 1%: 10000 * 0.01 * 1.01^12 / (1.01^12 - 1) ≈ 888.49
        let result = pmt(dec!(0.01), 12, dec!(10000), dec!(0)).unwrap();
        assert!((result + dec!(888.49)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_overflow_is_an_error() {
        let err = pmt(dec!(10), 1, Decimal::MAX, dec!(0)).unwrap_err();
        assert!(matches!(err, TrezoError::InvalidInput { ref field, .. } if field == "present_value"));
    }

    #[test]
    fn test_pmt_long_high_rate_stays_finite() {
        // (1.0833)^1200 is far outside decimal range; the discounted form is not.
        let result = pmt(dec!(1) / dec!(12), 1200, dec!(10000), dec!(0)).unwrap();
        assert!((result + dec!(833.33)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_periods() {
        assert!(pmt(dec!(0.01), 0, dec!(1000), dec!(0)).is_err());
    }
}
