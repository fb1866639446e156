use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CurrencyConfig;
use crate::decimal::Money;
use crate::errors::{CreditError, Result};
use crate::quote::{LoanQuote, LoanTerms};
use crate::types::{CreditType, InstallmentFormula};

/// credit fields persisted on a sale transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRecord {
    pub credit_type: CreditType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leasing_company: Option<String>,
    pub down_payment: Money,
    /// annual percent
    pub interest_rate: Decimal,
    pub tenor_months: u32,
    /// some call sites store the installment, others recompute it on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
}

impl CreditRecord {
    pub fn from_quote(
        quote: &LoanQuote,
        credit_type: CreditType,
        leasing_company: Option<String>,
        persist_payment: bool,
    ) -> Result<Self> {
        let leasing_company = leasing_company
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        if credit_type == CreditType::Leasing && leasing_company.is_none() {
            return Err(CreditError::MissingLeasingCompany);
        }

        Ok(Self {
            credit_type,
            leasing_company,
            down_payment: quote.down_payment,
            interest_rate: quote.annual_interest_rate_percent,
            tenor_months: quote.term_months,
            monthly_payment: persist_payment.then_some(quote.monthly_payment),
        })
    }

    /// loan terms for the sale price the record belongs to
    pub fn terms(&self, vehicle_price: Money) -> LoanTerms {
        LoanTerms::new(vehicle_price, self.down_payment, self.interest_rate, self.tenor_months)
    }

    /// stored installment, or a fresh computation; invalid combinations give 0
    pub fn resolve_monthly_payment(
        &self,
        vehicle_price: Money,
        formula: InstallmentFormula,
        currency: &CurrencyConfig,
    ) -> Money {
        if let Some(payment) = self.monthly_payment {
            return payment;
        }
        LoanQuote::compute(self.terms(vehicle_price), formula, currency)
            .map(|quote| quote.monthly_payment)
            .unwrap_or(Money::ZERO)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
