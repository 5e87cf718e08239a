use loanbook_core::amortization::calculators::{
    calculate_affordability, calculate_dti, calculate_repayment, compare_loan_options,
    price_rates, AffordabilityInput, ComparisonInput, RepaymentInput,
};
use loanbook_core::amortization::{
    affordable_loan_amount, compare_rates, compare_terms, debt_to_income, generate_schedule,
    is_amortizable, monthly_payment, schedule_iter, total_interest,
};
use loanbook_core::LoanbookError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn round2(d: Decimal) -> Decimal {
    d.round_dp(2)
}

// ===========================================================================
// Payment and schedule
// ===========================================================================

#[test]
fn test_thirty_year_mortgage_payment() {
    let payment = monthly_payment(dec!(250000), dec!(4.5), 360);
    assert_eq!(round2(payment), dec!(1266.71));

    let interest = total_interest(dec!(250000), payment, 360);
    // 1,266.71 × 360 − 250,000 ≈ 206,016
    assert!((interest - dec!(206016)).abs() < dec!(5), "interest {interest}");
}

#[test]
fn test_auto_loan_schedule_totals() {
    let schedule = generate_schedule(dec!(35000), dec!(3.2), 60);
    assert_eq!(schedule.len(), 60);

    let principal_paid: Decimal = schedule.iter().map(|r| r.principal).sum();
    assert!((principal_paid - dec!(35000)).abs() < dec!(0.0001));

    // Interest falls as the balance amortizes
    assert!(schedule[0].interest > schedule[59].interest);
    assert!(schedule.windows(2).all(|w| w[1].balance <= w[0].balance));
}

#[test]
fn test_schedule_iter_restarts_when_cloned() {
    let iter = schedule_iter(dec!(10000), dec!(7), 24);
    let first: Vec<_> = iter.clone().take(3).collect();
    let again: Vec<_> = iter.take(3).collect();
    assert_eq!(first, again);
    assert_eq!(first[2].period, 3);
}

#[test]
fn test_degenerate_inputs() {
    assert_eq!(monthly_payment(Decimal::ZERO, dec!(5), 12), Decimal::ZERO);
    assert_eq!(monthly_payment(dec!(1000), dec!(5), 0), Decimal::ZERO);
    assert!(generate_schedule(dec!(-5), dec!(5), 12).is_empty());
    assert!(generate_schedule(dec!(1000), dec!(5), 0).is_empty());
    // Negative rates repay straight-line
    assert_eq!(monthly_payment(dec!(1200), dec!(-3), 12), dec!(100));
    assert!(generate_schedule(dec!(1200), dec!(-3), 12)
        .iter()
        .all(|r| r.interest.is_zero()));
}

#[test]
fn test_debt_to_income() {
    assert_eq!(debt_to_income(dec!(1800), dec!(5000)), dec!(36));
    assert_eq!(debt_to_income(dec!(1800), Decimal::ZERO), Decimal::ZERO);
}

// ===========================================================================
// Comparisons
// ===========================================================================

#[test]
fn test_higher_rates_cost_more() {
    let rows = compare_rates(dec!(200000), 360, &[dec!(3), dec!(5), dec!(7)]);
    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|w| w[0].total_cost < w[1].total_cost));
    assert!(rows.iter().all(|r| r.total_cost == dec!(200000) + r.total_interest));
}

#[test]
fn test_longer_terms_lower_payment_raise_interest() {
    let rows = compare_terms(dec!(200000), dec!(6), &[120, 240, 360]);
    assert!(rows.windows(2).all(|w| w[0].monthly_payment > w[1].monthly_payment));
    assert!(rows.windows(2).all(|w| w[0].total_interest < w[1].total_interest));
    assert_eq!(rows[2].term, 360);
}

// ===========================================================================
// Calculator envelopes
// ===========================================================================

#[test]
fn test_calculate_repayment_envelope() {
    let input = RepaymentInput {
        principal: dec!(250000),
        annual_rate_percent: dec!(4.5),
        term_months: 360,
        include_schedule: false,
    };
    let out = calculate_repayment(&input).unwrap();
    let r = &out.result;
    assert_eq!(round2(r.monthly_payment), dec!(1266.71));
    assert_eq!(r.total_cost, dec!(250000) + r.total_interest);
    assert!(r.schedule.is_none());
    assert_eq!(r.yearly_summary.len(), 30);
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

#[test]
fn test_calculate_repayment_rejects_bad_input() {
    let mut input = RepaymentInput {
        principal: dec!(1000),
        annual_rate_percent: dec!(120),
        term_months: 12,
        include_schedule: false,
    };
    assert!(matches!(
        calculate_repayment(&input),
        Err(LoanbookError::InvalidInput { .. })
    ));
    input.annual_rate_percent = dec!(5);
    input.term_months = 0;
    assert!(calculate_repayment(&input).is_err());
}

#[test]
fn test_affordability_applies_dti_cap() {
    let input = AffordabilityInput {
        monthly_income: dec!(8000),
        monthly_expenses: dec!(3000),
        annual_rate_percent: dec!(6),
        term_months: 360,
        down_payment: Some(dec!(50000)),
        max_dti_percent: None,
    };
    let out = calculate_affordability(&input).unwrap();
    let r = &out.result;
    assert_eq!(r.available_monthly, dec!(5000));
    // 36% of free cash flow
    assert_eq!(r.monthly_payment, dec!(1800));
    assert_eq!(r.total_purchase, r.affordable_amount + dec!(50000));
    // Servicing the affordable amount costs the budget
    let check = monthly_payment(r.affordable_amount, dec!(6), 360);
    assert!((check - dec!(1800)).abs() < dec!(0.0001));
    assert_eq!(r.rate_sensitivity.len(), 5);
}

#[test]
fn test_affordability_with_no_free_cash_flow_warns() {
    let input = AffordabilityInput {
        monthly_income: dec!(3000),
        monthly_expenses: dec!(3500),
        annual_rate_percent: dec!(6),
        term_months: 360,
        down_payment: None,
        max_dti_percent: Some(dec!(40)),
    };
    let out = calculate_affordability(&input).unwrap();
    assert_eq!(out.result.affordable_amount, Decimal::ZERO);
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_compare_loan_options_picks_cheapest() {
    let input = ComparisonInput {
        principal: dec!(100000),
        term_months: 180,
        annual_rate_percent: dec!(5),
        rates: vec![dec!(6), dec!(4.5), dec!(5.5)],
        terms: vec![360, 120, 240],
    };
    let out = compare_loan_options(&input).unwrap();
    assert_eq!(out.result.lowest_cost_rate, Some(dec!(4.5)));
    assert_eq!(out.result.lowest_cost_term, Some(120));
}

#[test]
fn test_long_high_rate_loans_are_rejected() {
    for (rate, term) in [(dec!(100), 900), (dec!(30), 2500), (dec!(50), 1500)] {
        let input = RepaymentInput {
            principal: dec!(100000),
            annual_rate_percent: rate,
            term_months: term,
            include_schedule: false,
        };
        assert!(
            matches!(calculate_repayment(&input), Err(LoanbookError::InvalidInput { .. })),
            "{rate}% over {term} months"
        );
    }

    // Still within precision: the schedule settles
    let schedule = generate_schedule(dec!(100000), dec!(100), 300);
    assert!(schedule.last().unwrap().balance < dec!(0.01));
}

#[test]
fn test_overflowing_comparisons_are_errors() {
    let principal = dec!(1_000_000_000_000_000_000_000_000_000);
    assert!(matches!(
        price_rates(principal, 6000, &[dec!(100)]),
        Err(LoanbookError::InvalidInput { .. })
    ));
    assert!(calculate_dti(Decimal::MAX, dec!(0.0000001)).is_err());
    assert_eq!(calculate_dti(dec!(1800), dec!(6000)).unwrap(), dec!(30));
}

#[test]
fn test_compare_loan_options_needs_alternatives() {
    let input = ComparisonInput {
        principal: dec!(100000),
        term_months: 180,
        annual_rate_percent: dec!(5),
        rates: vec![],
        terms: vec![],
    };
    assert!(compare_loan_options(&input).is_err());
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_schedule_terminates_and_retires_balance(
        principal in 1u32..2_000_000,
        rate_bp in 0u32..=10_000,
        term in 1u32..=1_200,
    ) {
        let principal = Decimal::from(principal);
        let rate = Decimal::new(i64::from(rate_bp), 2);

        if !is_amortizable(principal, rate, term) {
            let input = RepaymentInput {
                principal,
                annual_rate_percent: rate,
                term_months: term,
                include_schedule: false,
            };
            prop_assert!(
                matches!(calculate_repayment(&input), Err(LoanbookError::InvalidInput { .. })),
                "{}% over {} months was accepted", rate, term
            );
            return Ok(());
        }

        let schedule = generate_schedule(principal, rate, term);
        prop_assert!(!schedule.is_empty());
        prop_assert!(schedule.len() as u32 <= term);
        for row in &schedule {
            prop_assert!(row.balance >= Decimal::ZERO);
            prop_assert!(
                (row.principal + row.interest - row.payment).abs() < dec!(0.000000001),
                "period {} splits {} + {} != {}", row.period, row.principal, row.interest, row.payment
            );
        }
        let last = schedule.last().map(|r| r.balance).unwrap_or_default();
        prop_assert!(last < dec!(0.01), "final balance {}", last);
    }

    #[test]
    fn prop_affordability_inverts_payment(
        budget in 1u32..20_000,
        rate_bp in 1u32..2_500,
        term in 1u32..481,
    ) {
        let budget = Decimal::from(budget);
        let rate = Decimal::new(i64::from(rate_bp), 2);
        let amount = affordable_loan_amount(budget, rate, term);
        let payment = monthly_payment(amount, rate, term);
        prop_assert!((payment - budget).abs() < dec!(0.0001), "{} vs {}", payment, budget);
    }
}
