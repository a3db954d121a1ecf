use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use emi_core::{analysis, annuity, rate_changes, schedule, LoanTerms};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Annuity
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct InstallmentRequest {
    balance: Decimal,
    monthly_rate_percent: Decimal,
    remaining_months: u32,
    #[serde(default)]
    decimal_places: u32,
}

#[napi]
pub fn compute_installment(input_json: String) -> NapiResult<String> {
    let req: InstallmentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let installment = annuity::compute_installment_with_precision(
        req.balance,
        req.monthly_rate_percent,
        req.remaining_months,
        req.decimal_places,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&installment).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rate timeline
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RateChangesRequest {
    base_rate_percent: Decimal,
    increase_percent: Decimal,
    frequency_months: u32,
    horizon_months: u32,
    #[serde(default = "first_month")]
    start_month: u32,
}

fn first_month() -> u32 {
    1
}

#[napi]
pub fn generate_rate_changes(input_json: String) -> NapiResult<String> {
    let req: RateChangesRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let events = rate_changes::generate_rate_changes(
        req.base_rate_percent,
        req.increase_percent,
        req.frequency_months,
        req.horizon_months,
        req.start_month,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&events).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::analyze_loan(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
