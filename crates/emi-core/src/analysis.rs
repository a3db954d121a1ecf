//! Loan analysis: the schedule plus the summaries a presentation layer
//! needs, wrapped in the standard computation envelope.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::schedule::build_schedule;
use crate::summary::{chart_points, rate_markers, yearly_breakdown, RateMarker, YearSummary};
use crate::types::{
    with_metadata, AmortizationRow, AmortizationSchedule, ComputationOutput, LoanTerms, LoanType,
    Money, RateResetPolicy, ResetReason,
};
use crate::LoanResult;

/// Installment growth above which a warning is raised (25%).
const INSTALLMENT_SHOCK_THRESHOLD: Decimal = dec!(1.25);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    /// Installment at origination.
    pub installment: Money,
    /// Largest regular installment over the life of the loan.
    pub peak_installment: Money,
    pub total_principal_paid: Money,
    pub total_interest_paid: Money,
    pub total_amount_paid: Money,
    pub payoff_month: u32,
    pub yearly: Vec<YearSummary>,
    pub chart: Vec<AmortizationRow>,
    pub rate_markers: Vec<RateMarker>,
    pub schedule: AmortizationSchedule,
}

/// Build the schedule and its summaries for a loan.
pub fn analyze_loan(terms: &LoanTerms) -> LoanResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();

    let schedule = build_schedule(terms)?;
    let warnings = collect_warnings(terms, &schedule);

    let methodology = match terms.loan_type {
        LoanType::Fixed => "Fixed-rate level-payment amortization",
        LoanType::Floating(_) => match terms.rate_reset_policy {
            RateResetPolicy::RecomputeInstallment => {
                "Floating-rate amortization, installment re-solved at each reset"
            }
            RateResetPolicy::HoldInstallment => {
                "Floating-rate amortization, installment held and tenure adjusted"
            }
        },
        LoanType::Hybrid(_) => "Hybrid fixed-to-floating amortization",
    };

    let peak_installment = schedule
        .resets
        .iter()
        .map(|r| r.installment)
        .max()
        .unwrap_or(Decimal::ZERO);

    let analysis = LoanAnalysis {
        installment: schedule.initial_installment(),
        peak_installment,
        total_principal_paid: schedule.total_principal_paid,
        total_interest_paid: schedule.total_interest_paid,
        total_amount_paid: schedule.total_amount_paid,
        payoff_month: schedule.payoff_month,
        yearly: yearly_breakdown(&schedule),
        chart: chart_points(&schedule),
        rate_markers: rate_markers(&schedule),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(methodology, terms, warnings, elapsed, analysis)
}

fn collect_warnings(terms: &LoanTerms, schedule: &AmortizationSchedule) -> Vec<String> {
    let mut warnings = Vec::new();

    if schedule.payoff_month > terms.tenure_months {
        warnings.push(format!(
            "Tenure extended from {} to {} months to absorb rate increases",
            terms.tenure_months, schedule.payoff_month
        ));
    } else if schedule.payoff_month < terms.tenure_months {
        warnings.push(format!(
            "Loan repaid in {} months, {} months ahead of the {}-month tenure",
            schedule.payoff_month,
            terms.tenure_months - schedule.payoff_month,
            terms.tenure_months
        ));
    }

    if let Some(reset) = schedule
        .resets
        .iter()
        .find(|r| r.reason == ResetReason::FloatingReset && r.annual_rate_percent.is_zero())
    {
        warnings.push(format!(
            "Floating rate falls to zero from month {}; later decreases are ignored",
            reset.month
        ));
    }

    let initial = schedule.initial_installment();
    if let Some(peak) = schedule.resets.iter().max_by_key(|r| r.installment) {
        if peak.installment > initial * INSTALLMENT_SHOCK_THRESHOLD {
            let rise = ((peak.installment / initial - Decimal::ONE) * dec!(100)).round_dp(1);
            warnings.push(format!(
                "Installment rises to {} at month {}, {}% above the original {}",
                peak.installment, peak.month, rise, initial
            ));
        }
    }

    warnings
}
