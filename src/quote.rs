use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CurrencyConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{CreditError, Result};
use crate::payments::{AmortizationSchedule, FormulaComparison};
use crate::types::{InstallmentFormula, MAX_TERM_MONTHS};

/// the four inputs of a credit quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub vehicle_price: Money,
    pub down_payment: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
}

impl LoanTerms {
    /// `annual_rate_percent` is whole percent as typed (15 for 15%)
    pub fn new(vehicle_price: Money, down_payment: Money, annual_rate_percent: Decimal, term_months: u32) -> Self {
        Self {
            vehicle_price,
            down_payment,
            annual_rate: Rate::from_percent(annual_rate_percent),
            term_months,
        }
    }

    /// price minus down payment, never below zero.
    /// zero as well when a negative down payment overflows the difference.
    pub fn principal(&self) -> Money {
        self.vehicle_price
            .checked_sub(self.down_payment)
            .unwrap_or(Money::ZERO)
            .max(Money::ZERO)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vehicle_price.is_negative() {
            return Err(CreditError::NegativeAmount {
                field: "vehiclePrice",
                amount: self.vehicle_price,
            });
        }
        if self.down_payment.is_negative() {
            return Err(CreditError::NegativeAmount {
                field: "downPayment",
                amount: self.down_payment,
            });
        }
        if self.down_payment > self.vehicle_price {
            return Err(CreditError::DownPaymentExceedsPrice {
                vehicle_price: self.vehicle_price,
                down_payment: self.down_payment,
            });
        }
        if self.annual_rate.is_negative() {
            return Err(CreditError::InvalidInterestRate { rate: self.annual_rate });
        }
        if self.term_months == 0 || self.term_months > MAX_TERM_MONTHS {
            return Err(CreditError::InvalidTerm {
                term_months: i64::from(self.term_months),
            });
        }
        Ok(())
    }
}

/// a computed credit quote, recomputed on demand and never stored as such
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuote {
    pub vehicle_price: Money,
    pub down_payment: Money,
    pub principal: Money,
    pub annual_interest_rate_percent: Decimal,
    pub term_months: u32,
    pub formula: InstallmentFormula,
    pub monthly_payment: Money,
    /// installment times term; includes the rounding slack
    pub total_payable: Money,
    pub total_interest: Money,
}

impl LoanQuote {
    pub fn compute(terms: LoanTerms, formula: InstallmentFormula, currency: &CurrencyConfig) -> Result<Self> {
        if let Err(err) = terms.validate() {
            warn!("credit quote rejected: {}", err);
            return Err(err);
        }

        let principal = terms.principal();
        let amounts = formula
            .checked_monthly_payment(principal, terms.annual_rate, terms.term_months, currency.minor_units)
            .and_then(|payment| Some((payment, payment.checked_mul(Decimal::from(terms.term_months))?)));
        let Some((monthly_payment, total_payable)) = amounts else {
            let err = CreditError::AmountOutOfRange { principal };
            warn!("credit quote rejected: {}", err);
            return Err(err);
        };
        let total_interest = (total_payable - principal).max(Money::ZERO);

        debug!(
            "{:?} quote: price={} dp={} principal={} payment={}",
            formula, terms.vehicle_price, terms.down_payment, principal, monthly_payment
        );

        Ok(Self {
            vehicle_price: terms.vehicle_price,
            down_payment: terms.down_payment,
            principal,
            annual_interest_rate_percent: terms.annual_rate.as_percentage().normalize(),
            term_months: terms.term_months,
            formula,
            monthly_payment,
            total_payable,
            total_interest,
        })
    }

    pub fn terms(&self) -> LoanTerms {
        LoanTerms::new(
            self.vehicle_price,
            self.down_payment,
            self.annual_interest_rate_percent,
            self.term_months,
        )
    }

    pub fn annual_rate(&self) -> Rate {
        Rate::from_percent(self.annual_interest_rate_percent)
    }

    /// month by month breakdown under the same formula
    pub fn schedule(&self, start_date: DateTime<Utc>, currency: &CurrencyConfig) -> Result<AmortizationSchedule> {
        AmortizationSchedule::generate(
            self.principal,
            self.annual_rate(),
            self.term_months,
            start_date,
            self.formula,
            currency,
        )
    }

    /// what the other surface's formula would show for the same terms
    pub fn compare(&self) -> FormulaComparison {
        crate::payments::compare_formulas(self.principal, self.annual_rate(), self.term_months)
    }

    pub fn json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}
