use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::LoanResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Interest rates in this engine are percentages (8.5 = 8.5% p.a.), not decimals.
pub type Percent = Decimal;

/// Upper bound on any schedule length (100 years of monthly payments).
pub const MAX_TENURE_MONTHS: u32 = 1200;

/// Floating-rate leg: additive rate steps at a fixed monthly frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingTerms {
    /// Percentage points added to the rate at every change (may be negative).
    pub rate_increase_percent: Percent,
    /// Months between successive rate changes. Zero disables changes.
    pub rate_change_frequency_months: u32,
}

/// Fixed period followed by a floating period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridTerms {
    /// Annual rate that applies from the first floating month.
    pub floating_rate_percent: Percent,
    /// Length of the fixed-rate period; must be shorter than the tenure.
    pub fixed_period_months: u32,
    #[serde(default)]
    pub rate_increase_percent: Percent,
    #[serde(default)]
    pub rate_change_frequency_months: u32,
}

/// Loan type selector. Each variant carries only the fields its math needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Fixed,
    Floating(FloatingTerms),
    Hybrid(HybridTerms),
}

/// What happens to the installment when the rate changes mid-tenure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateResetPolicy {
    /// Tenure held constant; the installment is re-solved at every boundary.
    #[default]
    RecomputeInstallment,
    /// Installment held constant; the tenure shortens or extends.
    HoldInstallment,
}

/// Loan parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual rate at origination (the fixed-period rate for hybrid loans).
    pub annual_rate_percent: Percent,
    /// Number of monthly payments.
    pub tenure_months: u32,
    pub loan_type: LoanType,
    #[serde(default)]
    pub rate_reset_policy: RateResetPolicy,
    /// Currency minor-unit precision used for every rounded amount.
    #[serde(default)]
    pub decimal_places: u32,
}

impl LoanTerms {
    pub fn fixed(principal: Money, annual_rate_percent: Percent, tenure_months: u32) -> Self {
        LoanTerms {
            principal,
            annual_rate_percent,
            tenure_months,
            loan_type: LoanType::Fixed,
            rate_reset_policy: RateResetPolicy::default(),
            decimal_places: 0,
        }
    }
}

/// A future change of the annual rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateChangeEvent {
    /// 1-indexed month from which the new rate applies.
    pub from_month: u32,
    pub annual_rate_percent: Percent,
}

/// One month of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Month number (1-indexed)
    pub month: u32,
    /// Outstanding balance at start of month
    pub opening_balance: Money,
    /// Amount paid this month
    pub installment: Money,
    /// Balance reduction for the month
    pub principal_component: Money,
    /// Interest charged for the month
    pub interest_component: Money,
    /// Outstanding balance at end of month
    pub closing_balance: Money,
}

/// Why the installment was (re)derived at a given month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    Origination,
    FloatingReset,
    FixedToFloating,
}

/// Record of an installment derivation point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentReset {
    pub month: u32,
    pub reason: ResetReason,
    pub annual_rate_percent: Percent,
    /// Balance the installment was solved against.
    pub outstanding_balance: Money,
    /// Months remaining at the reset, including the reset month itself.
    pub remaining_months: u32,
    pub installment: Money,
}

/// Complete month-by-month schedule with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    pub resets: Vec<InstallmentReset>,
    pub total_principal_paid: Money,
    pub total_interest_paid: Money,
    pub total_amount_paid: Money,
    pub payoff_month: u32,
}

impl AmortizationSchedule {
    /// Installment fixed at origination.
    pub fn initial_installment(&self) -> Money {
        self.resets
            .first()
            .map(|r| r.installment)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> LoanResult<ComputationOutput<T>> {
    Ok(ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions)?,
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    })
}
