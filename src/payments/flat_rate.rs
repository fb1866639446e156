use log::debug;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::payments::InstallmentCalculator;
use crate::types::InstallmentFormula;

/// simple-interest installment calculator used by the mobile credit simulation.
///
/// Interest is charged flat on the original principal for the whole term, so
/// for the same inputs the installment is higher than the annuity one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlatRateCalculator {
    minor_units: u32,
}

impl FlatRateCalculator {
    pub fn new(minor_units: u32) -> Self {
        Self { minor_units }
    }

    /// principal * rate * (term / 12), unrounded; `None` on overflow
    pub fn total_interest(&self, principal: Money, annual_rate: Rate, term_months: u32) -> Option<Money> {
        if principal.is_negative() || annual_rate.is_negative() {
            return Some(Money::ZERO);
        }
        let interest = principal
            .as_decimal()
            .checked_mul(annual_rate.as_decimal())?
            .checked_mul(Decimal::from(term_months))?
            .checked_div(Decimal::from(12))?;
        Some(Money::from_decimal(interest))
    }
}

impl InstallmentCalculator for FlatRateCalculator {
    fn checked_monthly_payment(&self, principal: Money, annual_rate: Rate, term_months: u32) -> Option<Money> {
        if term_months == 0 || principal.is_zero() || principal.is_negative() || annual_rate.is_negative() {
            return Some(Money::ZERO);
        }

        let total_credit = principal.checked_add(self.total_interest(principal, annual_rate, term_months)?)?;
        let payment = total_credit
            .checked_div(Decimal::from(term_months))?
            .round_to_unit(self.minor_units);
        debug!(
            "flat rate installment: principal={} rate={} term={} payment={}",
            principal, annual_rate, term_months, payment
        );
        Some(payment)
    }

    fn formula(&self) -> InstallmentFormula {
        InstallmentFormula::FlatRate
    }
}

/// monthly installment under the flat simple-interest formula, whole currency units
pub fn flat_rate_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    FlatRateCalculator::default().monthly_payment(principal, annual_rate, term_months)
}
