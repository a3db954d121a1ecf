use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use emi_core::analysis;
use emi_core::annuity;
use emi_core::rate_changes;
use emi_core::schedule;
use emi_core::{FloatingTerms, HybridTerms, LoanTerms, LoanType, RateResetPolicy};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LoanKind {
    Fixed,
    Floating,
    Hybrid,
}

/// Loan parameters shared by the schedule and analyze commands
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON loan terms (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (the fixed-period rate for hybrid loans)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Loan type
    #[arg(long, value_enum, default_value = "fixed")]
    pub loan_type: LoanKind,

    /// Percentage points added at each floating rate change (may be negative)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub rate_increase: Decimal,

    /// Months between floating rate changes
    #[arg(long, default_value_t = 0)]
    pub frequency: u32,

    /// Annual rate in percent once a hybrid loan turns floating
    #[arg(long)]
    pub floating_rate: Option<Decimal>,

    /// Length of the hybrid fixed period in months
    #[arg(long)]
    pub fixed_period: Option<u32>,

    /// Keep the installment at rate changes and let the tenure adjust
    #[arg(long)]
    pub hold_installment: bool,

    /// Currency decimal places for rounding
    #[arg(long, default_value_t = 0)]
    pub decimal_places: u32,
}

impl LoanArgs {
    fn into_terms(self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        if let Some(terms) = input::load::<LoanTerms>(self.input.as_deref())? {
            return Ok(terms);
        }

        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let annual_rate_percent = self.rate.ok_or("--rate is required (or provide --input)")?;
        let tenure_months = self
            .tenure
            .ok_or("--tenure is required (or provide --input)")?;

        let loan_type = match self.loan_type {
            LoanKind::Fixed => LoanType::Fixed,
            LoanKind::Floating => LoanType::Floating(FloatingTerms {
                rate_increase_percent: self.rate_increase,
                rate_change_frequency_months: self.frequency,
            }),
            LoanKind::Hybrid => LoanType::Hybrid(HybridTerms {
                floating_rate_percent: self
                    .floating_rate
                    .ok_or("--floating-rate is required for hybrid loans")?,
                fixed_period_months: self
                    .fixed_period
                    .ok_or("--fixed-period is required for hybrid loans")?,
                rate_increase_percent: self.rate_increase,
                rate_change_frequency_months: self.frequency,
            }),
        };

        let rate_reset_policy = if self.hold_installment {
            RateResetPolicy::HoldInstallment
        } else {
            RateResetPolicy::RecomputeInstallment
        };

        Ok(LoanTerms {
            principal,
            annual_rate_percent,
            tenure_months,
            loan_type,
            rate_reset_policy,
            decimal_places: self.decimal_places,
        })
    }
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.into_terms()?;
    let result = schedule::build_schedule(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_analyze(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.into_terms()?;
    let result = analysis::analyze_loan(&terms)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a single installment calculation
#[derive(Args)]
pub struct InstallmentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Remaining months
    #[arg(long)]
    pub months: Option<u32>,

    /// Currency decimal places for rounding
    #[arg(long, default_value_t = 0)]
    pub decimal_places: u32,
}

#[derive(Deserialize)]
struct InstallmentInput {
    balance: Decimal,
    annual_rate_percent: Decimal,
    remaining_months: u32,
    #[serde(default)]
    decimal_places: u32,
}

pub fn run_installment(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req = match input::load::<InstallmentInput>(args.input.as_deref())? {
        Some(req) => req,
        None => InstallmentInput {
            balance: args
                .balance
                .ok_or("--balance is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            remaining_months: args
                .months
                .ok_or("--months is required (or provide --input)")?,
            decimal_places: args.decimal_places,
        },
    };

    let monthly = annuity::monthly_rate_percent(req.annual_rate_percent);
    let installment = annuity::compute_installment_with_precision(
        req.balance,
        monthly,
        req.remaining_months,
        req.decimal_places,
    )?;
    let total_paid = installment * Decimal::from(req.remaining_months);

    Ok(json!({
        "installment": installment,
        "balance": req.balance,
        "annual_rate_percent": req.annual_rate_percent,
        "monthly_rate_percent": monthly,
        "remaining_months": req.remaining_months,
        "approximate_total_paid": total_paid,
    }))
}

/// Arguments for generating a floating rate timeline
#[derive(Args)]
pub struct RateChangesArgs {
    /// Starting annual rate in percent
    #[arg(long)]
    pub base_rate: Decimal,

    /// Percentage points added at each change (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub increase: Decimal,

    /// Months between changes
    #[arg(long)]
    pub frequency: u32,

    /// Last month a change may take effect
    #[arg(long)]
    pub horizon: u32,

    /// Month the timeline is anchored at
    #[arg(long, default_value_t = 1)]
    pub start_month: u32,
}

pub fn run_rate_changes(args: RateChangesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let events = rate_changes::generate_rate_changes(
        args.base_rate,
        args.increase,
        args.frequency,
        args.horizon,
        args.start_month,
    )?;
    Ok(serde_json::to_value(events)?)
}
