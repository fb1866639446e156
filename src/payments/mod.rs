pub mod amortization;
pub mod annuity;
pub mod flat_rate;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::InstallmentFormula;

pub use amortization::{AmortizationSchedule, ScheduledPayment};
pub use annuity::{annuity_payment, AnnuityCalculator};
pub use flat_rate::{flat_rate_payment, FlatRateCalculator};

/// trait for monthly installment calculations
pub trait InstallmentCalculator {
    /// level monthly installment, rounded to the currency unit.
    /// `Some(0)` when the inputs cannot produce a payment yet, `None` when
    /// the amounts overflow the decimal range.
    fn checked_monthly_payment(&self, principal: Money, annual_rate: Rate, term_months: u32) -> Option<Money>;

    fn formula(&self) -> InstallmentFormula;

    /// installment as displayed, zero when it cannot be computed
    fn monthly_payment(&self, principal: Money, annual_rate: Rate, term_months: u32) -> Money {
        self.checked_monthly_payment(principal, annual_rate, term_months)
            .unwrap_or(Money::ZERO)
    }

    /// installment times term
    fn checked_total_payable(&self, principal: Money, annual_rate: Rate, term_months: u32) -> Option<Money> {
        self.checked_monthly_payment(principal, annual_rate, term_months)?
            .checked_mul(Decimal::from(term_months))
    }
}

impl InstallmentFormula {
    /// calculator bound to this formula
    pub fn calculator(self, minor_units: u32) -> Box<dyn InstallmentCalculator> {
        match self {
            InstallmentFormula::Annuity => Box::new(AnnuityCalculator::new(minor_units)),
            InstallmentFormula::FlatRate => Box::new(FlatRateCalculator::new(minor_units)),
        }
    }

    pub fn monthly_payment(
        self,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        minor_units: u32,
    ) -> Money {
        self.checked_monthly_payment(principal, annual_rate, term_months, minor_units)
            .unwrap_or(Money::ZERO)
    }

    pub fn checked_monthly_payment(
        self,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        minor_units: u32,
    ) -> Option<Money> {
        match self {
            InstallmentFormula::Annuity => {
                AnnuityCalculator::new(minor_units).checked_monthly_payment(principal, annual_rate, term_months)
            }
            InstallmentFormula::FlatRate => {
                FlatRateCalculator::new(minor_units).checked_monthly_payment(principal, annual_rate, term_months)
            }
        }
    }
}

/// side by side result of both formulas for the same inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaComparison {
    pub annuity_payment: Money,
    pub flat_rate_payment: Money,
    /// flat rate minus annuity
    pub difference: Money,
}

impl FormulaComparison {
    pub fn diverges(&self) -> bool {
        !self.difference.is_zero()
    }
}

/// compare the web (annuity) and mobile (flat rate) installments
pub fn compare_formulas(principal: Money, annual_rate: Rate, term_months: u32) -> FormulaComparison {
    let annuity = annuity_payment(principal, annual_rate, term_months);
    let flat = flat_rate_payment(principal, annual_rate, term_months);

    FormulaComparison {
        annuity_payment: annuity,
        flat_rate_payment: flat,
        difference: flat - annuity,
    }
}
