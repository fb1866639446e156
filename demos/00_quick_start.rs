/// quick start - quote a vehicle on credit
use dealer_credit_rs::{CreditConfig, InstallmentFormula, LoanQuote, LoanTerms, Money};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = CreditConfig::standard();

    // 25m car, 5m down, 15% a year over 24 months
    let terms = LoanTerms::new(
        Money::from_major(25_000_000),
        Money::from_major(5_000_000),
        dec!(15),
        24,
    );

    let quote = LoanQuote::compute(terms, InstallmentFormula::Annuity, &config.currency)?;
    println!("{}", quote.json());

    Ok(())
}
