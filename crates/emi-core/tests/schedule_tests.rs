use emi_core::annuity::{compute_installment, monthly_rate_percent};
use emi_core::rate_changes::generate_rate_changes;
use emi_core::schedule::{build_schedule, rate_boundaries};
use emi_core::{
    FloatingTerms, HybridTerms, LoanError, LoanTerms, LoanType, Money, RateResetPolicy,
    ResetReason,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn fixed_home_loan() -> LoanTerms {
    LoanTerms::fixed(dec!(1_000_000), dec!(8.5), 240)
}

fn floating_home_loan() -> LoanTerms {
    LoanTerms {
        loan_type: LoanType::Floating(FloatingTerms {
            rate_increase_percent: dec!(0.5),
            rate_change_frequency_months: 24,
        }),
        ..fixed_home_loan()
    }
}

fn hybrid_home_loan() -> LoanTerms {
    LoanTerms {
        annual_rate_percent: dec!(8.0),
        loan_type: LoanType::Hybrid(HybridTerms {
            floating_rate_percent: dec!(8.5),
            fixed_period_months: 60,
            rate_increase_percent: dec!(0.5),
            rate_change_frequency_months: 24,
        }),
        ..fixed_home_loan()
    }
}

fn all_loans() -> Vec<LoanTerms> {
    vec![
        fixed_home_loan(),
        floating_home_loan(),
        hybrid_home_loan(),
        LoanTerms::fixed(dec!(75_000), dec!(13.25), 36),
        LoanTerms::fixed(dec!(99_999), Decimal::ZERO, 7),
        LoanTerms {
            decimal_places: 2,
            ..LoanTerms::fixed(dec!(350_000.50), dec!(6.99), 180)
        },
        LoanTerms {
            rate_reset_policy: RateResetPolicy::HoldInstallment,
            ..floating_home_loan()
        },
    ]
}

// ===========================================================================
// Conservation and continuity
// ===========================================================================

#[test]
fn test_principal_is_conserved_exactly() {
    for terms in all_loans() {
        let s = build_schedule(&terms).unwrap();
        let principal: Money = s.rows.iter().map(|r| r.principal_component).sum();
        assert_eq!(principal, terms.principal);
        assert_eq!(s.total_principal_paid, terms.principal);
        assert_eq!(s.rows.last().unwrap().closing_balance, Decimal::ZERO);
        assert_eq!(s.payoff_month as usize, s.rows.len());
    }
}

#[test]
fn test_row_invariants_hold() {
    for terms in all_loans() {
        let s = build_schedule(&terms).unwrap();
        for row in &s.rows {
            assert_eq!(
                row.closing_balance,
                row.opening_balance - row.principal_component
            );
            assert_eq!(
                row.installment,
                row.principal_component + row.interest_component
            );
            assert!(row.closing_balance >= Decimal::ZERO);
            assert!(row.principal_component >= Decimal::ZERO);
        }
    }
}

#[test]
fn test_balances_are_continuous() {
    for terms in all_loans() {
        let s = build_schedule(&terms).unwrap();
        assert_eq!(s.rows[0].opening_balance, terms.principal);
        for pair in s.rows.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
            assert_eq!(pair[1].month, pair[0].month + 1);
        }
    }
}

#[test]
fn test_payoff_on_tenure_when_recomputing() {
    for terms in all_loans()
        .into_iter()
        .filter(|t| t.rate_reset_policy == RateResetPolicy::RecomputeInstallment)
    {
        let s = build_schedule(&terms).unwrap();
        assert_eq!(s.payoff_month, terms.tenure_months);
    }
}

// ===========================================================================
// Fixed loans
// ===========================================================================

#[test]
fn test_fixed_loan_monotonicity() {
    let s = build_schedule(&fixed_home_loan()).unwrap();
    // The reconciled last row is excluded from the principal check.
    let regular = &s.rows[..s.rows.len() - 1];
    for pair in regular.windows(2) {
        assert!(pair[1].interest_component <= pair[0].interest_component);
        assert!(pair[1].principal_component >= pair[0].principal_component);
    }
}

#[test]
fn test_fixed_loan_reference_scenario() {
    let s = build_schedule(&fixed_home_loan()).unwrap();
    assert_eq!(s.initial_installment(), dec!(8678));
    assert_eq!(s.payoff_month, 240);
    assert_eq!(s.total_principal_paid, dec!(1_000_000));
    assert_eq!(s.total_interest_paid, dec!(1_082_846));
    assert!(s.rows[..239].iter().all(|r| r.installment == dec!(8678)));
}

#[test]
fn test_zero_rate_loan() {
    let s = build_schedule(&LoanTerms::fixed(dec!(120_000), Decimal::ZERO, 12)).unwrap();
    assert!(s.rows.iter().all(|r| r.interest_component.is_zero()));
    assert!(s.rows.iter().all(|r| r.installment == dec!(10_000)));
    assert_eq!(s.total_interest_paid, Decimal::ZERO);
}

#[test]
fn test_zero_rate_uneven_division_reconciles() {
    let s = build_schedule(&LoanTerms::fixed(dec!(100_000), Decimal::ZERO, 7)).unwrap();
    assert_eq!(s.rows[0].installment, dec!(14_286));
    assert_eq!(s.rows[6].installment, dec!(14_284));
    assert_eq!(s.total_principal_paid, dec!(100_000));
}

#[test]
fn test_idempotent() {
    for terms in all_loans() {
        let a = build_schedule(&terms).unwrap();
        let b = build_schedule(&terms).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

// ===========================================================================
// Floating loans
// ===========================================================================

#[test]
fn test_floating_resets_follow_generator() {
    let s = build_schedule(&floating_home_loan()).unwrap();
    let events = generate_rate_changes(dec!(8.5), dec!(0.5), 24, 240, 1).unwrap();
    let reset_months: Vec<u32> = s.resets[1..].iter().map(|r| r.month).collect();
    let event_months: Vec<u32> = events.iter().map(|e| e.from_month).collect();
    assert_eq!(reset_months, event_months);
    assert!(s.resets[1..]
        .iter()
        .all(|r| r.reason == ResetReason::FloatingReset));
}

#[test]
fn test_floating_installments_derivable_from_solver() {
    let terms = floating_home_loan();
    let s = build_schedule(&terms).unwrap();
    for reset in &s.resets[1..] {
        let idx = (reset.month - 1) as usize;
        let balance = s.rows[idx - 1].closing_balance;
        let remaining = terms.tenure_months - (reset.month - 1);
        let expected = compute_installment(
            balance,
            monthly_rate_percent(reset.annual_rate_percent),
            remaining,
        )
        .unwrap();
        assert_eq!(s.rows[idx].installment, expected);
        assert_eq!(s.rows[idx].opening_balance, balance);
    }
}

#[test]
fn test_floating_installment_constant_between_resets() {
    let s = build_schedule(&floating_home_loan()).unwrap();
    assert!(s.rows[24..48].iter().all(|r| r.installment == dec!(8975)));
}

#[test]
fn test_floating_with_zero_increase_matches_fixed() {
    let terms = LoanTerms {
        loan_type: LoanType::Floating(FloatingTerms {
            rate_increase_percent: Decimal::ZERO,
            rate_change_frequency_months: 12,
        }),
        ..fixed_home_loan()
    };
    let floating = build_schedule(&terms).unwrap();
    let fixed = build_schedule(&fixed_home_loan()).unwrap();
    assert_eq!(floating.rows, fixed.rows);
}

#[test]
fn test_falling_rates_floor_at_zero() {
    let terms = LoanTerms {
        annual_rate_percent: dec!(2),
        loan_type: LoanType::Floating(FloatingTerms {
            rate_increase_percent: dec!(-0.75),
            rate_change_frequency_months: 12,
        }),
        ..LoanTerms::fixed(dec!(200_000), dec!(2), 60)
    };
    let s = build_schedule(&terms).unwrap();
    assert_eq!(s.resets.last().unwrap().month, 37);
    assert_eq!(s.resets.last().unwrap().annual_rate_percent, Decimal::ZERO);
    assert!(s.rows[36..].iter().all(|r| r.interest_component.is_zero()));
    assert_eq!(s.total_principal_paid, dec!(200_000));
}

// ===========================================================================
// Hybrid loans
// ===========================================================================

#[test]
fn test_hybrid_fixed_period_then_floating() {
    let s = build_schedule(&hybrid_home_loan()).unwrap();
    let first = s.rows[0].installment;
    assert!(s.rows[..60].iter().all(|r| r.installment == first));

    let transition = &s.resets[1];
    assert_eq!(transition.month, 61);
    assert_eq!(transition.reason, ResetReason::FixedToFloating);
    assert_eq!(transition.annual_rate_percent, dec!(8.5));

    let carried = s.rows[59].closing_balance;
    assert_eq!(s.rows[60].opening_balance, carried);
    let expected = compute_installment(carried, monthly_rate_percent(dec!(8.5)), 180).unwrap();
    assert_eq!(s.rows[60].installment, expected);
}

#[test]
fn test_hybrid_floating_resets_after_transition() {
    let s = build_schedule(&hybrid_home_loan()).unwrap();
    let months: Vec<u32> = s.resets.iter().map(|r| r.month).collect();
    assert_eq!(months, vec![1, 61, 85, 109, 133, 157, 181, 205, 229]);
    assert_eq!(s.resets[2].annual_rate_percent, dec!(9.0));
}

#[test]
fn test_hybrid_without_floating_steps() {
    let terms = LoanTerms {
        loan_type: LoanType::Hybrid(HybridTerms {
            floating_rate_percent: dec!(9.25),
            fixed_period_months: 24,
            rate_increase_percent: Decimal::ZERO,
            rate_change_frequency_months: 0,
        }),
        ..LoanTerms::fixed(dec!(400_000), dec!(7), 120)
    };
    let s = build_schedule(&terms).unwrap();
    assert_eq!(s.resets.len(), 2);
    assert!(s.rows[24..119]
        .iter()
        .all(|r| r.installment == s.resets[1].installment));
}

// ===========================================================================
// Small balances
// ===========================================================================

#[test]
fn test_tiny_zero_rate_loan_pays_one_unit_a_month() {
    let s = build_schedule(&LoanTerms::fixed(dec!(100), Decimal::ZERO, 240)).unwrap();
    assert_eq!(s.initial_installment(), dec!(1));
    assert_eq!(s.payoff_month, 100);
    assert_eq!(s.total_principal_paid, dec!(100));
    assert_eq!(s.total_interest_paid, Decimal::ZERO);
    assert!(s.rows.iter().all(|r| r.installment == dec!(1)));
}

#[test]
fn test_tiny_interest_bearing_loan_pays_off_early() {
    let s = build_schedule(&LoanTerms::fixed(dec!(10), dec!(12), 240)).unwrap();
    assert_eq!(s.initial_installment(), dec!(1));
    assert_eq!(s.payoff_month, 10);
    assert_eq!(s.total_amount_paid, dec!(10));
}

#[test]
fn test_floating_loan_at_zero_rate_ignores_decreases() {
    let terms = LoanTerms {
        loan_type: LoanType::Floating(FloatingTerms {
            rate_increase_percent: dec!(-0.5),
            rate_change_frequency_months: 12,
        }),
        ..LoanTerms::fixed(dec!(120_000), Decimal::ZERO, 36)
    };
    let s = build_schedule(&terms).unwrap();
    assert_eq!(s.resets.len(), 1);
    assert_eq!(s.resets[0].reason, ResetReason::Origination);
    assert_eq!(s.payoff_month, 36);
    assert_eq!(s.total_interest_paid, Decimal::ZERO);
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn test_invalid_inputs_rejected_before_simulation() {
    let cases = vec![
        LoanTerms::fixed(dec!(-1), dec!(8), 12),
        LoanTerms::fixed(dec!(1_000), dec!(-0.01), 12),
        LoanTerms::fixed(dec!(1_000), dec!(8), 0),
    ];
    for terms in cases {
        let err = build_schedule(&terms).unwrap_err();
        assert!(matches!(err, LoanError::InvalidInput { .. }));
    }
}

#[test]
fn test_hybrid_fixed_period_equal_to_tenure_rejected() {
    let terms = LoanTerms {
        loan_type: LoanType::Hybrid(HybridTerms {
            floating_rate_percent: dec!(9),
            fixed_period_months: 120,
            rate_increase_percent: Decimal::ZERO,
            rate_change_frequency_months: 0,
        }),
        ..LoanTerms::fixed(dec!(400_000), dec!(7), 120)
    };
    assert!(matches!(
        build_schedule(&terms).unwrap_err(),
        LoanError::InvalidInput { .. }
    ));
}

#[test]
fn test_principal_beyond_decimal_range_rejected() {
    let terms = LoanTerms::fixed(dec!(50_000_000_000_000_000_000_000_000_000), dec!(8.5), 240);
    assert!(matches!(
        build_schedule(&terms).unwrap_err(),
        LoanError::InvalidInput { .. }
    ));
}

#[test]
fn test_hybrid_fixed_period_at_u32_max_rejected() {
    let terms = LoanTerms {
        loan_type: LoanType::Hybrid(HybridTerms {
            floating_rate_percent: dec!(9),
            fixed_period_months: u32::MAX,
            rate_increase_percent: dec!(0.5),
            rate_change_frequency_months: 12,
        }),
        ..LoanTerms::fixed(dec!(400_000), dec!(7), 120)
    };
    assert!(matches!(
        rate_boundaries(&terms).unwrap_err(),
        LoanError::InvalidInput { ref field, .. } if field == "fixed_period_months"
    ));
    assert!(build_schedule(&terms).is_err());
}

#[test]
fn test_negative_amortization_surfaces_as_error() {
    let terms = LoanTerms {
        annual_rate_percent: dec!(1),
        loan_type: LoanType::Floating(FloatingTerms {
            rate_increase_percent: dec!(20),
            rate_change_frequency_months: 12,
        }),
        rate_reset_policy: RateResetPolicy::HoldInstallment,
        ..fixed_home_loan()
    };
    match build_schedule(&terms).unwrap_err() {
        LoanError::NegativeAmortization {
            month,
            installment,
            interest,
        } => {
            assert_eq!(month, 13);
            assert_eq!(installment, dec!(4599));
            assert!(interest > installment);
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ===========================================================================
// Serde
// ===========================================================================

#[test]
fn test_terms_from_json() {
    let json = r#"{
        "principal": "1000000",
        "annual_rate_percent": "8.0",
        "tenure_months": 240,
        "loan_type": {
            "hybrid": {
                "floating_rate_percent": "8.5",
                "fixed_period_months": 60
            }
        }
    }"#;
    let terms: LoanTerms = serde_json::from_str(json).unwrap();
    assert_eq!(terms.rate_reset_policy, RateResetPolicy::RecomputeInstallment);
    assert_eq!(terms.decimal_places, 0);
    match terms.loan_type {
        LoanType::Hybrid(ref h) => {
            assert_eq!(h.fixed_period_months, 60);
            assert_eq!(h.rate_change_frequency_months, 0);
        }
        _ => panic!("expected hybrid terms"),
    }
    assert_eq!(build_schedule(&terms).unwrap().payoff_month, 240);
}
