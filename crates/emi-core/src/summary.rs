//! Aggregations over a finished schedule for tables and charts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AmortizationRow, AmortizationSchedule, Money, Percent, ResetReason};

const MONTHS_PER_YEAR: usize = 12;

/// Totals for one loan year (a block of 12 consecutive months).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    /// Loan year (1-indexed)
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub total_paid: Money,
    /// Outstanding balance after the last month of the year
    pub closing_balance: Money,
}

/// A rate change worth highlighting on a balance chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateMarker {
    pub month: u32,
    pub reason: ResetReason,
    pub annual_rate_percent: Percent,
    pub installment: Money,
}

/// Year-by-year principal and interest totals. A partial final year is kept.
pub fn yearly_breakdown(schedule: &AmortizationSchedule) -> Vec<YearSummary> {
    schedule
        .rows
        .chunks(MONTHS_PER_YEAR)
        .enumerate()
        .map(|(i, rows)| {
            let principal_paid: Money = rows.iter().map(|r| r.principal_component).sum();
            let interest_paid: Money = rows.iter().map(|r| r.interest_component).sum();
            let total_paid: Money = rows.iter().map(|r| r.installment).sum();
            YearSummary {
                year: (i + 1) as u32,
                principal_paid,
                interest_paid,
                total_paid,
                closing_balance: rows
                    .last()
                    .map(|r| r.closing_balance)
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

/// One row per completed year plus the final row.
pub fn chart_points(schedule: &AmortizationSchedule) -> Vec<AmortizationRow> {
    let mut points: Vec<AmortizationRow> = schedule
        .rows
        .iter()
        .filter(|r| r.month as usize % MONTHS_PER_YEAR == 0)
        .cloned()
        .collect();

    if let Some(last) = schedule.rows.last() {
        if points.last().map(|p| p.month) != Some(last.month) {
            points.push(last.clone());
        }
    }
    points
}

/// Every reset after origination.
pub fn rate_markers(schedule: &AmortizationSchedule) -> Vec<RateMarker> {
    schedule
        .resets
        .iter()
        .filter(|r| r.reason != ResetReason::Origination)
        .map(|r| RateMarker {
            month: r.month,
            reason: r.reason,
            annual_rate_percent: r.annual_rate_percent,
            installment: r.installment,
        })
        .collect()
}
