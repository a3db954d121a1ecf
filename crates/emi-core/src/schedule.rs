//! Month-by-month amortization schedule builder.
//!
//! Fixed, floating and hybrid loans share one state machine. The only thing
//! that differs between them is the list of rate boundaries: empty for fixed
//! loans, the generated rate timeline for floating loans, and the
//! fixed-to-floating transition followed by the anchored timeline for hybrid
//! loans. At each boundary the installment is re-solved on the outstanding
//! balance over the remaining tenure (or held, under
//! [`RateResetPolicy::HoldInstallment`]).
//!
//! The final row absorbs accumulated rounding drift: its principal component
//! is set to the opening balance exactly, so total principal paid always
//! equals the amount borrowed.

use log::{debug, trace};
use rust_decimal::Decimal;

use crate::annuity::{
    compute_installment_with_precision, monthly_interest, monthly_rate_percent, out_of_range,
};
use crate::error::LoanError;
use crate::rate_changes::{events_after, generate_rate_changes};
use crate::types::{
    AmortizationRow, AmortizationSchedule, InstallmentReset, LoanTerms, LoanType, Money, Percent,
    RateResetPolicy, ResetReason, MAX_TENURE_MONTHS,
};
use crate::LoanResult;

/// Highest supported currency precision.
const MAX_DECIMAL_PLACES: u32 = 6;

/// A month at which the effective rate changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateBoundary {
    pub month: u32,
    pub annual_rate_percent: Percent,
    pub reason: ResetReason,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full amortization schedule for a loan.
///
/// Pure and deterministic: identical terms always produce identical schedules.
pub fn build_schedule(terms: &LoanTerms) -> LoanResult<AmortizationSchedule> {
    let boundaries = rate_boundaries(terms)?;
    simulate(terms, &boundaries)
}

/// Rate boundaries implied by the loan type, ordered by month.
///
/// Terms are validated first, so a hybrid fixed period is always shorter
/// than the tenure.
pub fn rate_boundaries(terms: &LoanTerms) -> LoanResult<Vec<RateBoundary>> {
    validate_terms(terms)?;
    let tenure = terms.tenure_months;
    let boundaries = match &terms.loan_type {
        LoanType::Fixed => Vec::new(),
        LoanType::Floating(floating) => generate_rate_changes(
            terms.annual_rate_percent,
            floating.rate_increase_percent,
            floating.rate_change_frequency_months,
            tenure,
            1,
        )?
        .into_iter()
        .map(|e| RateBoundary {
            month: e.from_month,
            annual_rate_percent: e.annual_rate_percent,
            reason: ResetReason::FloatingReset,
        })
        .collect(),
        LoanType::Hybrid(hybrid) => {
            let transition = hybrid.fixed_period_months.checked_add(1).ok_or_else(|| {
                LoanError::InvalidInput {
                    field: "fixed_period_months".into(),
                    reason: "Fixed period is out of range".into(),
                }
            })?;
            let floating = generate_rate_changes(
                hybrid.floating_rate_percent,
                hybrid.rate_increase_percent,
                hybrid.rate_change_frequency_months,
                tenure,
                transition,
            )?;

            let mut boundaries = Vec::with_capacity(floating.len() + 1);
            boundaries.push(RateBoundary {
                month: transition,
                annual_rate_percent: hybrid.floating_rate_percent,
                reason: ResetReason::FixedToFloating,
            });
            boundaries.extend(events_after(floating, transition).into_iter().map(|e| {
                RateBoundary {
                    month: e.from_month,
                    annual_rate_percent: e.annual_rate_percent,
                    reason: ResetReason::FloatingReset,
                }
            }));
            boundaries
        }
    };
    Ok(boundaries)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(terms: &LoanTerms) -> LoanResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if terms.annual_rate_percent < Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if terms.tenure_months == 0 {
        return Err(LoanError::InvalidInput {
            field: "tenure_months".into(),
            reason: "Tenure must be at least one month".into(),
        });
    }
    if terms.tenure_months > MAX_TENURE_MONTHS {
        return Err(LoanError::InvalidInput {
            field: "tenure_months".into(),
            reason: format!("Tenure cannot exceed {MAX_TENURE_MONTHS} months"),
        });
    }
    if terms.decimal_places > MAX_DECIMAL_PLACES {
        return Err(LoanError::InvalidInput {
            field: "decimal_places".into(),
            reason: format!("At most {MAX_DECIMAL_PLACES} decimal places are supported"),
        });
    }
    if let LoanType::Hybrid(hybrid) = &terms.loan_type {
        if hybrid.fixed_period_months == 0 {
            return Err(LoanError::InvalidInput {
                field: "fixed_period_months".into(),
                reason: "Hybrid loans need a fixed period of at least one month".into(),
            });
        }
        if hybrid.fixed_period_months >= terms.tenure_months {
            return Err(LoanError::InvalidInput {
                field: "fixed_period_months".into(),
                reason: "Fixed period must be shorter than the tenure".into(),
            });
        }
        if hybrid.floating_rate_percent < Decimal::ZERO {
            return Err(LoanError::InvalidInput {
                field: "floating_rate_percent".into(),
                reason: "Floating rate cannot be negative".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

fn simulate(terms: &LoanTerms, boundaries: &[RateBoundary]) -> LoanResult<AmortizationSchedule> {
    let tenure = terms.tenure_months;
    let dp = terms.decimal_places;
    let policy = terms.rate_reset_policy;
    let limit = match policy {
        RateResetPolicy::RecomputeInstallment => tenure,
        RateResetPolicy::HoldInstallment => MAX_TENURE_MONTHS,
    };

    let mut balance: Money = terms.principal;
    let mut rate = terms.annual_rate_percent;
    let mut installment =
        compute_installment_with_precision(balance, monthly_rate_percent(rate), tenure, dp)?;

    let mut resets = vec![InstallmentReset {
        month: 1,
        reason: ResetReason::Origination,
        annual_rate_percent: rate,
        outstanding_balance: balance,
        remaining_months: tenure,
        installment,
    }];
    debug!("origination: rate {rate}% over {tenure} months, installment {installment}");

    let mut rows: Vec<AmortizationRow> = Vec::with_capacity(tenure as usize);
    let mut total_principal = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut pending = boundaries.iter().peekable();
    let mut month: u32 = 0;

    while !balance.is_zero() {
        month += 1;
        if month > limit {
            return Err(LoanError::TenureLimitExceeded { limit });
        }

        // Boundaries a shortened schedule never reaches are simply dropped.
        while let Some(boundary) = pending.next_if(|b| b.month == month) {
            rate = boundary.annual_rate_percent;
            let remaining = tenure.saturating_sub(month - 1);
            if policy == RateResetPolicy::RecomputeInstallment {
                installment = compute_installment_with_precision(
                    balance,
                    monthly_rate_percent(rate),
                    remaining,
                    dp,
                )?;
            }
            resets.push(InstallmentReset {
                month,
                reason: boundary.reason,
                annual_rate_percent: rate,
                outstanding_balance: balance,
                remaining_months: remaining,
                installment,
            });
            debug!(
                "{:?} at month {month}: rate {rate}%, balance {balance}, installment {installment}",
                boundary.reason
            );
        }

        let interest = monthly_interest(balance, rate, dp)?;
        let mut principal = installment - interest;

        let stalled = principal.is_zero() && policy == RateResetPolicy::HoldInstallment;
        if principal < Decimal::ZERO || stalled {
            return Err(LoanError::NegativeAmortization {
                month,
                installment,
                interest,
            });
        }

        let last_scheduled = policy == RateResetPolicy::RecomputeInstallment && month == tenure;
        let mut payment = installment;
        if last_scheduled || principal >= balance {
            principal = balance;
            payment = interest + principal;
        }

        let closing = balance - principal;
        trace!("month {month}: opening {balance}, interest {interest}, principal {principal}");
        rows.push(AmortizationRow {
            month,
            opening_balance: balance,
            installment: payment,
            principal_component: principal,
            interest_component: interest,
            closing_balance: closing,
        });

        total_principal = total_principal
            .checked_add(principal)
            .ok_or_else(|| out_of_range("principal"))?;
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| out_of_range("principal"))?;
        total_paid = total_paid
            .checked_add(payment)
            .ok_or_else(|| out_of_range("principal"))?;
        balance = closing;
    }

    Ok(AmortizationSchedule {
        rows,
        resets,
        total_principal_paid: total_principal,
        total_interest_paid: total_interest,
        total_amount_paid: total_paid,
        payoff_month: month,
    })
}
