use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent};

/// Interest totals below this magnitude are rounding noise (zero-rate loans).
pub const INTEREST_EPSILON: Decimal = dec!(0.000001);

/// Ceiling on `principal · (1+r)^n` for a level-payment schedule. Decimal
/// rounding in the payment grows by `(1+r)^n` over the term, and past this
/// bound the final balance no longer settles within a cent.
pub const MAX_COMPOUNDED_PRINCIPAL: Decimal = dec!(1_000_000_000_000_000_000_000);

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

/// Periodic (monthly) rate as a decimal fraction: `annual% / 100 / 12`.
pub fn monthly_rate(annual_rate_percent: Percent) -> Decimal {
    annual_rate_percent / HUNDRED / MONTHS_PER_YEAR
}

/// `(1 + r)^n`, or `None` when it leaves the decimal range.
pub fn compound_factor(rate: Decimal, term_months: u32) -> Option<Decimal> {
    Decimal::ONE
        .checked_add(rate)?
        .checked_powi(i64::from(term_months))
}

/// `1 / (1 + r)^n`, or zero when the compound factor leaves the decimal range.
fn discount_factor(rate: Decimal, term_months: u32) -> Decimal {
    compound_factor(rate, term_months)
        .and_then(|factor| Decimal::ONE.checked_div(factor))
        .unwrap_or(Decimal::ZERO)
}

/// True when a level payment retires `principal` to within a cent.
///
/// Straight-line (non-positive rate) and degenerate loans always qualify.
/// Otherwise `principal · (1+r)^n` must stay within
/// [`MAX_COMPOUNDED_PRINCIPAL`].
pub fn is_amortizable(principal: Money, annual_rate_percent: Percent, term_months: u32) -> bool {
    if principal <= Decimal::ZERO || term_months == 0 || annual_rate_percent <= Decimal::ZERO {
        return true;
    }
    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return true;
    }
    compound_factor(r, term_months)
        .and_then(|factor| principal.checked_mul(factor))
        .is_some_and(|compounded| compounded <= MAX_COMPOUNDED_PRINCIPAL)
}

/// Level monthly payment that retires `principal` over `term_months`.
///
/// Non-positive principal or a zero term yields zero rather than an error so
/// half-filled calculator inputs stay quiet. A non-positive rate falls back to
/// straight-line repayment.
pub fn monthly_payment(principal: Money, annual_rate_percent: Percent, term_months: u32) -> Money {
    if principal <= Decimal::ZERO || term_months == 0 {
        return Decimal::ZERO;
    }
    let straight_line = principal / Decimal::from(term_months);
    if annual_rate_percent <= Decimal::ZERO {
        return straight_line;
    }

    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return straight_line;
    }

    // P·r·(1+r)^n / ((1+r)^n − 1), rearranged as P·r / (1 − (1+r)^−n)
    let annuity_denominator = Decimal::ONE - discount_factor(r, term_months);
    match principal.checked_mul(r) {
        Some(interest) => interest
            .checked_div(annuity_denominator)
            .unwrap_or(straight_line),
        None => Decimal::MAX,
    }
}

/// Total interest over the life of the loan: `payment · n − principal`.
///
/// Not clamped; zero-rate loans can come out a hair below zero. Saturates at
/// the decimal range.
pub fn total_interest(principal: Money, monthly_payment: Money, term_months: u32) -> Money {
    monthly_payment
        .saturating_mul(Decimal::from(term_months))
        .saturating_sub(principal)
}

/// True when an interest amount is indistinguishable from zero.
pub fn is_negligible(amount: Money) -> bool {
    amount.abs() < INTEREST_EPSILON
}

/// Largest principal a given monthly payment can service (inverse annuity).
pub fn affordable_loan_amount(
    monthly_payment: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> Money {
    if monthly_payment <= Decimal::ZERO || term_months == 0 {
        return Decimal::ZERO;
    }
    let undiscounted = monthly_payment.saturating_mul(Decimal::from(term_months));
    if annual_rate_percent <= Decimal::ZERO {
        return undiscounted;
    }

    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return undiscounted;
    }

    // M·((1+r)^n − 1) / (r·(1+r)^n) == M·(1 − (1+r)^−n) / r
    (monthly_payment * (Decimal::ONE - discount_factor(r, term_months)))
        .checked_div(r)
        .unwrap_or(undiscounted)
}

/// Debt-to-income ratio in percent. Zero when income is not positive;
/// saturates when the ratio leaves the decimal range.
pub fn debt_to_income(monthly_debt: Money, monthly_income: Money) -> Percent {
    if monthly_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match monthly_debt.checked_div(monthly_income) {
        Some(ratio) => ratio.saturating_mul(HUNDRED),
        None if monthly_debt.is_sign_negative() => Decimal::MIN,
        None => Decimal::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_payment_thirty_year_mortgage() {
        let pmt = monthly_payment(dec!(250000), dec!(4.5), 360);
        assert!((pmt - dec!(1266.71)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_monthly_payment_zero_rate_is_straight_line() {
        assert_eq!(monthly_payment(dec!(12000), dec!(0), 12), dec!(1000));
        assert_eq!(monthly_payment(dec!(12000), dec!(-1), 12), dec!(1000));
    }

    #[test]
    fn test_monthly_payment_degenerate_inputs_are_zero() {
        assert_eq!(monthly_payment(dec!(0), dec!(5), 12), Decimal::ZERO);
        assert_eq!(monthly_payment(dec!(-100), dec!(5), 12), Decimal::ZERO);
        assert_eq!(monthly_payment(dec!(1000), dec!(5), 0), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_payment_single_period() {
        // One period at 12%/yr: repay principal plus one month of interest
        let pmt = monthly_payment(dec!(1000), dec!(12), 1);
        assert!((pmt - dec!(1010)).abs() < dec!(0.0000001), "got {pmt}");
    }

    #[test]
    fn test_monthly_payment_overflowing_factor_tends_to_interest_only() {
        // (1 + 100%/12)^6000 is far outside the decimal range
        let pmt = monthly_payment(dec!(1000), dec!(100), 6000);
        let interest_only = dec!(1000) * monthly_rate(dec!(100));
        assert_eq!(pmt, interest_only);
    }

    #[test]
    fn test_amortizable_bounds_compounded_principal() {
        assert!(is_amortizable(dec!(250000), dec!(4.5), 360));
        assert!(is_amortizable(dec!(100000), dec!(100), 300));
        // (1 + 100%/12)^900 ≈ 2e31 overflows
        assert!(!is_amortizable(dec!(100000), dec!(100), 900));
        // (1 + 50%/12)^1500 ≈ 4e26, too coarse for a cent-level schedule
        assert!(!is_amortizable(dec!(100000), dec!(50), 1500));
        assert!(is_amortizable(dec!(100000), dec!(0), 100_000));
        assert!(is_amortizable(dec!(0), dec!(100), 100_000));
    }

    #[test]
    fn test_overflowing_products_saturate() {
        let huge = Decimal::MAX / dec!(2);
        assert_eq!(total_interest(Decimal::ZERO, huge, 6000), Decimal::MAX);
        assert_eq!(monthly_payment(huge, dec!(100000), 12), Decimal::MAX);
        assert_eq!(affordable_loan_amount(huge, dec!(0), 6000), Decimal::MAX);
        assert_eq!(debt_to_income(huge, dec!(0.0000001)), Decimal::MAX);
        assert_eq!(debt_to_income(-huge, dec!(0.0000001)), Decimal::MIN);
    }

    #[test]
    fn test_total_interest_identity() {
        let pmt = monthly_payment(dec!(35000), dec!(3.2), 60);
        let interest = total_interest(dec!(35000), pmt, 60);
        assert_eq!(interest, pmt * dec!(60) - dec!(35000));
        assert!(interest > Decimal::ZERO);
    }

    #[test]
    fn test_total_interest_zero_rate_is_negligible() {
        let pmt = monthly_payment(dec!(1000), dec!(0), 3);
        let interest = total_interest(dec!(1000), pmt, 3);
        assert!(is_negligible(interest), "got {interest}");
    }

    #[test]
    fn test_affordable_amount_inverts_monthly_payment() {
        let principal = affordable_loan_amount(dec!(1080), dec!(5), 360);
        let pmt = monthly_payment(principal, dec!(5), 360);
        assert!((pmt - dec!(1080)).abs() < dec!(0.000001), "got {pmt}");
    }

    #[test]
    fn test_affordable_amount_edge_cases() {
        assert_eq!(affordable_loan_amount(dec!(0), dec!(5), 360), Decimal::ZERO);
        assert_eq!(affordable_loan_amount(dec!(500), dec!(5), 0), Decimal::ZERO);
        assert_eq!(affordable_loan_amount(dec!(500), dec!(0), 24), dec!(12000));
    }

    #[test]
    fn test_debt_to_income() {
        assert_eq!(debt_to_income(dec!(1500), dec!(5000)), dec!(30));
        assert_eq!(debt_to_income(dec!(1500), dec!(0)), Decimal::ZERO);
        assert_eq!(debt_to_income(dec!(1500), dec!(-10)), Decimal::ZERO);
    }
}
