//! Lenient parsing of the raw credit form.
//!
//! Browser forms hand over strings that are read with `parseFloat` and
//! `parseInt`: leading whitespace is skipped, the longest numeric prefix is
//! taken and anything after it is ignored. An empty or non-numeric field is
//! not an error, it just leaves the quote incomplete and the installment at 0.

use std::str::FromStr;

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{CreditConfig, CurrencyConfig};
use crate::decimal::Money;
use crate::errors::{CreditError, Result};
use crate::quote::{LoanQuote, LoanTerms};
use crate::types::{CreditSurface, InstallmentFormula, MAX_TERM_MONTHS};

/// largest decimal exponent accepted before the value stops fitting a `Decimal`
const MAX_EXPONENT: i64 = 28;

/// `parseFloat`: numeric prefix of `input`, `None` where JavaScript yields NaN
pub fn parse_float(input: &str) -> Option<Decimal> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if !int_digits.is_empty() || frac_end > frac_start {
            frac_digits = &s[frac_start..frac_end];
            pos = frac_end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut exponent: i64 = 0;
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_pos = pos + 1;
        let exp_negative = match bytes.get(exp_pos) {
            Some(b'-') => {
                exp_pos += 1;
                true
            }
            Some(b'+') => {
                exp_pos += 1;
                false
            }
            _ => false,
        };
        let exp_start = exp_pos;
        while exp_pos < bytes.len() && bytes[exp_pos].is_ascii_digit() {
            exp_pos += 1;
        }
        if exp_pos > exp_start {
            let magnitude = s[exp_start..exp_pos].parse::<i64>().unwrap_or(i64::MAX);
            exponent = if exp_negative { -magnitude } else { magnitude };
        }
    }

    let mut literal = String::with_capacity(int_digits.len() + frac_digits.len() + 3);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }

    let mantissa = Decimal::from_str(&literal).ok()?;
    apply_exponent(mantissa, exponent)
}

fn apply_exponent(mantissa: Decimal, exponent: i64) -> Option<Decimal> {
    if exponent > MAX_EXPONENT {
        return if mantissa.is_zero() { Some(Decimal::ZERO) } else { None };
    }
    if exponent < -MAX_EXPONENT {
        // underflows to zero like a double would
        return Some(Decimal::ZERO);
    }

    let mut value = mantissa;
    for _ in 0..exponent.unsigned_abs() {
        value = if exponent > 0 {
            value.checked_mul(Decimal::TEN)?
        } else {
            value / Decimal::TEN
        };
    }
    Some(value)
}

/// `parseInt(s, 10)`: leading integer of `input`, `None` where JavaScript yields NaN.
/// integers beyond `i64` saturate, they are still numbers.
pub fn parse_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;
    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        pos += 1;
    }
    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }
    match s[..pos].trim_start_matches('+').parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if negative => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

/// fields of the credit form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteField {
    Price,
    DownPayment,
    InterestRate,
    TenorMonths,
}

/// raw credit form as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteForm {
    #[serde(alias = "vehiclePrice")]
    pub price: String,
    pub down_payment: String,
    /// annual percent, e.g. "15"
    pub interest_rate: String,
    pub tenor_months: String,
}

/// result of evaluating a form on every change
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// some field is empty, non-numeric or the tenor is not positive
    Incomplete { missing: Vec<QuoteField> },
    /// complete but invalid, e.g. down payment above price
    Rejected {
        error: CreditError,
        clamped_principal: Money,
    },
    Ready(LoanQuote),
}

impl QuoteOutcome {
    /// installment to display, 0 while the form cannot be quoted
    pub fn monthly_payment(&self) -> Money {
        match self {
            QuoteOutcome::Ready(quote) => quote.monthly_payment,
            _ => Money::ZERO,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, QuoteOutcome::Ready(_))
    }

    pub fn quote(&self) -> Option<&LoanQuote> {
        match self {
            QuoteOutcome::Ready(quote) => Some(quote),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CreditError> {
        match self {
            QuoteOutcome::Rejected { error, .. } => Some(error),
            _ => None,
        }
    }

    /// ready quote or the rejection; incomplete forms are reported as `None`
    pub fn into_result(self) -> Option<Result<LoanQuote>> {
        match self {
            QuoteOutcome::Ready(quote) => Some(Ok(quote)),
            QuoteOutcome::Rejected { error, .. } => Some(Err(error)),
            QuoteOutcome::Incomplete { .. } => None,
        }
    }
}

impl QuoteForm {
    pub fn new(
        price: impl Into<String>,
        down_payment: impl Into<String>,
        interest_rate: impl Into<String>,
        tenor_months: impl Into<String>,
    ) -> Self {
        Self {
            price: price.into(),
            down_payment: down_payment.into(),
            interest_rate: interest_rate.into(),
            tenor_months: tenor_months.into(),
        }
    }

    pub fn evaluate(&self, formula: InstallmentFormula, currency: &CurrencyConfig) -> QuoteOutcome {
        let price = parse_float(&self.price);
        let down_payment = parse_float(&self.down_payment);
        let rate = parse_float(&self.interest_rate);
        let tenor = parse_int(&self.tenor_months).filter(|t| *t > 0);

        let mut missing = Vec::new();
        if price.is_none() {
            missing.push(QuoteField::Price);
        }
        if down_payment.is_none() {
            missing.push(QuoteField::DownPayment);
        }
        if rate.is_none() {
            missing.push(QuoteField::InterestRate);
        }
        if tenor.is_none() {
            missing.push(QuoteField::TenorMonths);
        }

        let (Some(price), Some(down_payment), Some(rate), Some(tenor)) = (price, down_payment, rate, tenor) else {
            return QuoteOutcome::Incomplete { missing };
        };

        let vehicle_price = Money::from_decimal(price);
        let down_payment = Money::from_decimal(down_payment);
        let term_months = u32::try_from(tenor).unwrap_or(u32::MAX);
        let terms = LoanTerms::new(vehicle_price, down_payment, rate, term_months);
        let clamped_principal = terms.principal();

        if term_months > MAX_TERM_MONTHS {
            warn!("tenor {} out of range", tenor);
            return QuoteOutcome::Rejected {
                error: CreditError::InvalidTerm { term_months: tenor },
                clamped_principal,
            };
        }

        match LoanQuote::compute(terms, formula, currency) {
            Ok(quote) => QuoteOutcome::Ready(quote),
            Err(error) => QuoteOutcome::Rejected {
                error,
                clamped_principal,
            },
        }
    }

    /// installment as shown on `surface`, 0 while incomplete or invalid
    pub fn monthly_payment_for(&self, surface: CreditSurface, config: &CreditConfig) -> Money {
        self.evaluate(config.formula_for(surface), &config.currency)
            .monthly_payment()
    }
}
