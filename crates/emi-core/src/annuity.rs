//! Level-payment annuity solver.
//!
//! Computes the equated monthly installment (EMI) that fully amortizes a
//! balance over a number of months at a constant monthly rate, plus the
//! rounding and interest helpers the schedule builder shares with it so that
//! installments and row components are always rounded the same way.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LoanError;
use crate::types::{Money, Percent};
use crate::LoanResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Round a monetary amount to `decimal_places`, midpoint away from zero.
pub fn round_money(amount: Money, decimal_places: u32) -> Money {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Monthly rate in percent for an annual percentage rate.
pub fn monthly_rate_percent(annual_rate_percent: Percent) -> Percent {
    annual_rate_percent / MONTHS_PER_YEAR
}

/// Smallest positive amount at `decimal_places` (1 for whole units, 0.01 for cents).
pub fn minor_unit(decimal_places: u32) -> Money {
    Decimal::new(1, decimal_places)
}

pub(crate) fn out_of_range(field: &str) -> LoanError {
    LoanError::InvalidInput {
        field: field.into(),
        reason: "Amount exceeds the representable decimal range".into(),
    }
}

/// Interest accruing for one month on `balance`, rounded to the currency unit.
pub fn monthly_interest(
    balance: Money,
    annual_rate_percent: Percent,
    decimal_places: u32,
) -> LoanResult<Money> {
    // balance * annual / 1200 keeps one division instead of two
    let accrued = balance
        .checked_mul(annual_rate_percent)
        .ok_or_else(|| out_of_range("balance"))?;
    Ok(round_money(
        accrued / (MONTHS_PER_YEAR * dec!(100)),
        decimal_places,
    ))
}

/// Installment amortizing `balance` over `remaining_months`, rounded to whole units.
pub fn compute_installment(
    balance: Money,
    monthly_rate_percent: Percent,
    remaining_months: u32,
) -> LoanResult<Money> {
    compute_installment_with_precision(balance, monthly_rate_percent, remaining_months, 0)
}

/// Installment amortizing `balance` over `remaining_months`, rounded to
/// `decimal_places`.
///
/// `installment = B * r * (1+r)^n / ((1+r)^n - 1)` for `r > 0`, and `B / n`
/// for a zero rate. Never less than one minor unit; a tiny balance over a long
/// term simply pays off early.
pub fn compute_installment_with_precision(
    balance: Money,
    monthly_rate_percent: Percent,
    remaining_months: u32,
    decimal_places: u32,
) -> LoanResult<Money> {
    if balance <= Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "balance".into(),
            reason: "Outstanding balance must be positive".into(),
        });
    }
    if remaining_months == 0 {
        return Err(LoanError::InvalidInput {
            field: "remaining_months".into(),
            reason: "Remaining months must be at least 1".into(),
        });
    }
    if monthly_rate_percent < Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "monthly_rate_percent".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    let n = Decimal::from(remaining_months);
    let r = monthly_rate_percent / dec!(100);

    let raw = if r.is_zero() {
        balance / n
    } else {
        match (Decimal::ONE + r).checked_powi(remaining_months as i64) {
            Some(factor) => {
                let denom = factor - Decimal::ONE;
                if denom.is_zero() {
                    // Rate too small to register over n periods.
                    balance / n
                } else {
                    (balance * r)
                        .checked_mul(factor / denom)
                        .ok_or_else(|| out_of_range("balance"))?
                }
            }
            // (1+r)^n beyond Decimal range: factor / (factor - 1) is 1.
            None => balance * r,
        }
    };

    Ok(round_money(raw, decimal_places).max(minor_unit(decimal_places)))
}
