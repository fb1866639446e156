use log::debug;
use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::{Money, Rate};
use crate::payments::InstallmentCalculator;
use crate::types::InstallmentFormula;

/// compound-interest installment calculator used by the web transaction flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnuityCalculator {
    minor_units: u32,
}

impl AnnuityCalculator {
    pub fn new(minor_units: u32) -> Self {
        Self { minor_units }
    }
}

impl InstallmentCalculator for AnnuityCalculator {
    fn checked_monthly_payment(&self, principal: Money, annual_rate: Rate, term_months: u32) -> Option<Money> {
        if term_months == 0 || principal.is_zero() || principal.is_negative() || annual_rate.is_negative() {
            return Some(Money::ZERO);
        }

        let monthly_rate = annual_rate.monthly_rate().as_decimal();

        let payment = match annuity_factor(monthly_rate, term_months) {
            // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
            Some(factor) => {
                Money::from_decimal(principal.as_decimal().checked_mul(monthly_rate)?.checked_mul(factor)?)
            }
            // no growth at decimal precision, straight line
            None => principal.checked_div(Decimal::from(term_months))?,
        };

        let payment = payment.round_to_unit(self.minor_units);
        debug!(
            "annuity installment: principal={} rate={} term={} payment={}",
            principal, annual_rate, term_months, payment
        );
        Some(payment)
    }

    fn formula(&self) -> InstallmentFormula {
        InstallmentFormula::Annuity
    }
}

/// (1 + r)^n / ((1 + r)^n - 1), tending to 1 once the compound term overflows.
/// `None` when the rate leaves (1 + r)^n indistinguishable from 1.
fn annuity_factor(monthly_rate: Decimal, term_months: u32) -> Option<Decimal> {
    if monthly_rate.is_zero() {
        return None;
    }
    let compound = match (Decimal::ONE + monthly_rate).checked_powu(u64::from(term_months)) {
        Some(compound) => compound,
        None => return Some(Decimal::ONE),
    };

    compound.checked_div(compound - Decimal::ONE)
}

/// monthly installment under the compound annuity formula, whole currency units
pub fn annuity_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    AnnuityCalculator::default().monthly_payment(principal, annual_rate, term_months)
}
