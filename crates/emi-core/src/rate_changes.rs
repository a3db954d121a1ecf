//! Floating-rate timeline generation.
//!
//! Produces the ordered sequence of future rate changes for a periodic,
//! additive rate-step rule. The generator knows nothing about loan types;
//! hybrid loans anchor it at the fixed-to-floating transition and filter the
//! output with [`events_after`].

use log::debug;
use rust_decimal::Decimal;

use crate::error::LoanError;
use crate::types::{Percent, RateChangeEvent};
use crate::LoanResult;

/// Rate changes every `frequency_months`, the first at
/// `start_month + frequency_months`, up to and including `horizon_months`.
///
/// Each step adds `increase_percent` percentage points to the previous rate.
/// A zero frequency or zero increase yields no events. Decreasing rates are
/// floored at zero; the zero-rate event is emitted and generation stops.
pub fn generate_rate_changes(
    base_rate_percent: Percent,
    increase_percent: Percent,
    frequency_months: u32,
    horizon_months: u32,
    start_month: u32,
) -> LoanResult<Vec<RateChangeEvent>> {
    if base_rate_percent < Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "base_rate_percent".into(),
            reason: "Base rate cannot be negative".into(),
        });
    }
    if start_month == 0 {
        return Err(LoanError::InvalidInput {
            field: "start_month".into(),
            reason: "Months are 1-indexed".into(),
        });
    }

    let mut events = Vec::new();
    if frequency_months == 0 || increase_percent.is_zero() {
        return Ok(events);
    }
    // Already at the floor: a decrease cannot move the rate.
    if base_rate_percent.is_zero() && increase_percent < Decimal::ZERO {
        return Ok(events);
    }

    let mut rate = base_rate_percent;
    let mut month = start_month.saturating_add(frequency_months);

    while month <= horizon_months {
        rate = rate
            .checked_add(increase_percent)
            .ok_or_else(|| LoanError::InvalidInput {
                field: "increase_percent".into(),
                reason: "Rate exceeds the representable decimal range".into(),
            })?;
        if rate <= Decimal::ZERO {
            events.push(RateChangeEvent {
                from_month: month,
                annual_rate_percent: Decimal::ZERO,
            });
            debug!("floating rate floored at zero from month {month}");
            break;
        }
        events.push(RateChangeEvent {
            from_month: month,
            annual_rate_percent: rate,
        });
        month = match month.checked_add(frequency_months) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(events)
}

/// Events taking effect strictly after `month`.
pub fn events_after(events: Vec<RateChangeEvent>, month: u32) -> Vec<RateChangeEvent> {
    events.into_iter().filter(|e| e.from_month > month).collect()
}
