/// web and mobile installments side by side, with a schedule
use dealer_credit_rs::{
    chrono::{TimeZone, Utc},
    compare_formulas, CreditConfig, CreditSurface, LoanQuote, LoanTerms, Money, SafeTimeProvider,
    TimeSource, STANDARD_TENORS,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = CreditConfig::standard();
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
    ));

    let terms = LoanTerms::new(
        Money::from_major(180_000_000),
        Money::from_major(36_000_000),
        dec!(9.5),
        36,
    );

    println!("tenor   web (annuity)   mobile (flat)   difference");
    for tenor in STANDARD_TENORS {
        let c = compare_formulas(terms.principal(), terms.annual_rate, tenor);
        println!(
            "{:>5}   {:>13}   {:>13}   {:>10}",
            tenor, c.annuity_payment, c.flat_rate_payment, c.difference
        );
    }

    let formula = config.formula_for(CreditSurface::WebTransaction);
    let quote = LoanQuote::compute(terms, formula, &config.currency)?;
    let schedule = quote.schedule(time.now(), &config.currency)?;

    println!("\nfirst six installments of the web quote:");
    for payment in schedule.payments.iter().take(6) {
        println!(
            "#{:<3} {}  pay {:>10}  interest {:>9}  principal {:>10}  balance {:>11}",
            payment.payment_number,
            payment.payment_date.date_naive(),
            payment.payment_amount,
            payment.interest_portion,
            payment.principal_portion,
            payment.ending_balance,
        );
    }
    println!("total interest: {}", schedule.total_interest);

    Ok(())
}
