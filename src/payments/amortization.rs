use chrono::{DateTime, Months, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CurrencyConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{CreditError, Result};
use crate::payments::{AnnuityCalculator, FlatRateCalculator, InstallmentCalculator};
use crate::types::{InstallmentFormula, MAX_TERM_MONTHS};

/// scheduled payment in amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub payment_date: DateTime<Utc>,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// month by month breakdown of an installment plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: DateTime<Utc>,
    pub formula: InstallmentFormula,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule, first installment one month after `start_date`
    pub fn generate(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
        formula: InstallmentFormula,
        currency: &CurrencyConfig,
    ) -> Result<Self> {
        if term_months == 0 || term_months > MAX_TERM_MONTHS {
            return Err(CreditError::InvalidTerm {
                term_months: i64::from(term_months),
            });
        }
        if principal.is_negative() {
            return Err(CreditError::NegativeAmount {
                field: "principal",
                amount: principal,
            });
        }
        if annual_rate.is_negative() {
            return Err(CreditError::InvalidInterestRate { rate: annual_rate });
        }
        formula
            .calculator(currency.minor_units)
            .checked_total_payable(principal, annual_rate, term_months)
            .ok_or(CreditError::AmountOutOfRange { principal })?;

        let payments = match formula {
            InstallmentFormula::Annuity => {
                annuity_schedule(principal, annual_rate, term_months, start_date, currency.minor_units)?
            }
            InstallmentFormula::FlatRate => {
                flat_rate_schedule(principal, annual_rate, term_months, start_date, currency.minor_units)?
            }
        };

        let total_interest = payments
            .iter()
            .map(|p| p.interest_portion)
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_payment = payments
            .iter()
            .map(|p| p.payment_amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        debug!(
            "{:?} schedule: principal={} term={} total_interest={}",
            formula, principal, term_months, total_interest
        );

        Ok(Self {
            principal,
            annual_rate,
            term_months,
            start_date,
            formula,
            payments,
            total_interest,
            total_payment,
        })
    }

    /// get payment for specific period (1-based)
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        if payment_number == 0 {
            return None;
        }
        self.payments.get((payment_number - 1) as usize)
    }

    /// remaining balance after payment, principal before the first one
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.ending_balance)
            .unwrap_or(self.principal)
    }

    pub fn total_principal(&self) -> Money {
        self.payments
            .iter()
            .map(|p| p.principal_portion)
            .fold(Money::ZERO, |acc, x| acc + x)
    }

    /// level installment shown to the customer
    pub fn installment(&self) -> Money {
        self.payments.first().map(|p| p.payment_amount).unwrap_or(Money::ZERO)
    }
}

/// level payment, interest on the declining balance
fn annuity_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    start_date: DateTime<Utc>,
    minor_units: u32,
) -> Result<Vec<ScheduledPayment>> {
    let monthly_rate = annual_rate.monthly_rate().as_decimal();
    let installment = AnnuityCalculator::new(minor_units)
        .checked_monthly_payment(principal, annual_rate, term_months)
        .ok_or(CreditError::AmountOutOfRange { principal })?;

    let mut payments = Vec::with_capacity(term_months as usize);
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;

    for i in 1..=term_months {
        let interest_portion = balance
            .checked_mul(monthly_rate)
            .ok_or(CreditError::AmountOutOfRange { principal })?
            .round_to_unit(minor_units);

        // final installment clears whatever rounding left behind
        let principal_portion = if i == term_months {
            balance
        } else {
            (installment - interest_portion).max(Money::ZERO).min(balance)
        };

        cumulative_interest += interest_portion;
        cumulative_principal += principal_portion;
        let ending_balance = balance - principal_portion;

        payments.push(ScheduledPayment {
            payment_number: i,
            payment_date: add_months(start_date, i)?,
            beginning_balance: balance,
            payment_amount: principal_portion + interest_portion,
            principal_portion,
            interest_portion,
            ending_balance,
            cumulative_interest,
            cumulative_principal,
        });

        balance = ending_balance;
    }

    Ok(payments)
}

/// equal principal plus equal flat interest
fn flat_rate_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    start_date: DateTime<Utc>,
    minor_units: u32,
) -> Result<Vec<ScheduledPayment>> {
    let calculator = FlatRateCalculator::new(minor_units);
    let out_of_range = CreditError::AmountOutOfRange { principal };
    let installment = calculator
        .checked_monthly_payment(principal, annual_rate, term_months)
        .ok_or_else(|| out_of_range.clone())?;
    let total_interest = calculator
        .total_interest(principal, annual_rate, term_months)
        .ok_or(out_of_range)?
        .round_to_unit(minor_units);
    let interest_each = (total_interest / Decimal::from(term_months)).round_to_unit(minor_units);

    let mut payments = Vec::with_capacity(term_months as usize);
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;

    for i in 1..=term_months {
        let (principal_portion, interest_portion) = if i == term_months {
            (balance, (total_interest - cumulative_interest).max(Money::ZERO))
        } else {
            let interest = interest_each.min(installment);
            ((installment - interest).min(balance), interest)
        };

        cumulative_interest += interest_portion;
        cumulative_principal += principal_portion;
        let ending_balance = balance - principal_portion;

        payments.push(ScheduledPayment {
            payment_number: i,
            payment_date: add_months(start_date, i)?,
            beginning_balance: balance,
            payment_amount: principal_portion + interest_portion,
            principal_portion,
            interest_portion,
            ending_balance,
            cumulative_interest,
            cumulative_principal,
        });

        balance = ending_balance;
    }

    Ok(payments)
}

fn add_months(date: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| CreditError::InvalidConfiguration {
            message: format!("payment date {} months after {} is out of range", months, date),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    fn idr() -> CurrencyConfig {
        CurrencyConfig::default()
    }

    fn start() -> DateTime<Utc> {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        ));
        time.now()
    }

    #[test]
    fn test_annuity_schedule() {
        let principal = Money::from_major(20_000_000);
        let schedule = AmortizationSchedule::generate(
            principal,
            Rate::from_percent(dec!(15)),
            24,
            start(),
            InstallmentFormula::Annuity,
            &idr(),
        )
        .unwrap();

        assert_eq!(schedule.payments.len(), 24);
        assert_eq!(schedule.installment(), Money::from_major(969_733));

        let first = schedule.get_payment(1).unwrap();
        assert_eq!(first.beginning_balance, principal);
        assert_eq!(first.interest_portion, Money::from_major(250_000));
        assert_eq!(first.principal_portion, Money::from_major(719_733));

        // interest declines with the balance
        for pair in schedule.payments.windows(2) {
            assert!(pair[1].interest_portion <= pair[0].interest_portion);
        }

        // level installment apart from the last one
        for payment in &schedule.payments[..23] {
            assert_eq!(payment.payment_amount, Money::from_major(969_733));
        }
        let last = schedule.get_payment(24).unwrap();
        assert!((last.payment_amount - Money::from_major(969_733)).abs() <= Money::from_major(24));

        assert_eq!(last.ending_balance, Money::ZERO);
        assert_eq!(schedule.total_principal(), principal);
        assert_eq!(schedule.total_payment, principal + schedule.total_interest);
    }

    #[test]
    fn test_flat_rate_schedule() {
        let principal = Money::from_major(20_000_000);
        let schedule = AmortizationSchedule::generate(
            principal,
            Rate::from_percent(dec!(15)),
            24,
            start(),
            InstallmentFormula::FlatRate,
            &idr(),
        )
        .unwrap();

        assert_eq!(schedule.installment(), Money::from_major(1_083_333));
        for payment in &schedule.payments[..23] {
            assert_eq!(payment.interest_portion, Money::from_major(250_000));
            assert_eq!(payment.principal_portion, Money::from_major(833_333));
        }

        assert_eq!(schedule.total_interest, Money::from_major(6_000_000));
        assert_eq!(schedule.total_principal(), principal);
        assert_eq!(schedule.total_payment, Money::from_major(26_000_000));
        assert_eq!(schedule.balance_after_payment(24), Money::ZERO);
    }

    #[test]
    fn test_zero_interest_residue_lands_in_last_installment() {
        let schedule = AmortizationSchedule::generate(
            Money::from_major(10),
            Rate::ZERO,
            3,
            start(),
            InstallmentFormula::Annuity,
            &idr(),
        )
        .unwrap();

        let amounts: Vec<Money> = schedule.payments.iter().map(|p| p.payment_amount).collect();
        assert_eq!(amounts, vec![Money::from_major(3), Money::from_major(3), Money::from_major(4)]);
        assert_eq!(schedule.total_interest, Money::ZERO);
    }

    #[test]
    fn test_payment_dates_follow_calendar_months() {
        let schedule = AmortizationSchedule::generate(
            Money::from_major(6_000_000),
            Rate::from_percent(dec!(12)),
            3,
            start(),
            InstallmentFormula::Annuity,
            &idr(),
        )
        .unwrap();

        // end of january clamps to the end of february
        let dates: Vec<(u32, u32)> = schedule
            .payments
            .iter()
            .map(|p| (p.payment_date.month(), p.payment_date.day()))
            .collect();
        assert_eq!(dates, vec![(2, 29), (3, 31), (4, 30)]);
    }

    #[test]
    fn test_lookup_edges() {
        let schedule = AmortizationSchedule::generate(
            Money::from_major(1_200_000),
            Rate::from_percent(dec!(6)),
            12,
            start(),
            InstallmentFormula::Annuity,
            &idr(),
        )
        .unwrap();

        assert!(schedule.get_payment(0).is_none());
        assert!(schedule.get_payment(13).is_none());
        assert_eq!(schedule.balance_after_payment(0), Money::from_major(1_200_000));
    }

    #[test]
    fn test_invalid_inputs() {
        let err = AmortizationSchedule::generate(
            Money::from_major(1_000),
            Rate::from_percent(dec!(10)),
            0,
            start(),
            InstallmentFormula::FlatRate,
            &idr(),
        )
        .unwrap_err();
        assert_eq!(err, CreditError::InvalidTerm { term_months: 0 });

        let err = AmortizationSchedule::generate(
            Money::from_major(1_000),
            Rate::from_percent(dec!(-2)),
            12,
            start(),
            InstallmentFormula::Annuity,
            &idr(),
        )
        .unwrap_err();
        assert!(matches!(err, CreditError::InvalidInterestRate { .. }));
    }

    #[test]
    fn test_tenor_above_cap_is_rejected_before_allocating() {
        let err = AmortizationSchedule::generate(
            Money::from_major(100_000_000),
            Rate::from_percent(dec!(10)),
            4_000_000_000,
            start(),
            InstallmentFormula::Annuity,
            &idr(),
        )
        .unwrap_err();
        assert_eq!(err, CreditError::InvalidTerm { term_months: 4_000_000_000 });

        let longest = AmortizationSchedule::generate(
            Money::from_major(100_000_000),
            Rate::from_percent(dec!(10)),
            MAX_TERM_MONTHS,
            start(),
            InstallmentFormula::FlatRate,
            &idr(),
        )
        .unwrap();
        assert_eq!(longest.payments.len(), 600);
        assert_eq!(longest.total_principal(), Money::from_major(100_000_000));
    }

    #[test]
    fn test_overflowing_amounts_are_errors() {
        let principal = Money::from_decimal(dec!(9000000000000000000000000000));
        for formula in [InstallmentFormula::Annuity, InstallmentFormula::FlatRate] {
            let err = AmortizationSchedule::generate(
                principal,
                Rate::from_percent(dec!(1000)),
                60,
                start(),
                formula,
                &idr(),
            )
            .unwrap_err();
            assert_eq!(err, CreditError::AmountOutOfRange { principal });
        }
    }
}
