/// evaluating the raw form on every keystroke
use dealer_credit_rs::{CreditConfig, CreditRecord, CreditSurface, CreditType, QuoteForm, QuoteOutcome};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = CreditConfig::standard();
    let formula = config.formula_for(CreditSurface::WebTransaction);

    // the user is still typing
    let keystrokes = [
        QuoteForm::new("25000000", "", "", ""),
        QuoteForm::new("25000000", "5000000", "15", ""),
        QuoteForm::new("25000000", "30000000", "15", "24"),
        QuoteForm::new("25000000", "5000000", "15", "24"),
    ];

    for form in &keystrokes {
        match form.evaluate(formula, &config.currency) {
            QuoteOutcome::Incomplete { missing } => println!("incomplete, waiting for {:?}: 0", missing),
            QuoteOutcome::Rejected { error, .. } => println!("rejected ({}): 0", error),
            QuoteOutcome::Ready(quote) => {
                println!("installment: {}", quote.monthly_payment);

                let record = CreditRecord::from_quote(
                    &quote,
                    CreditType::Leasing,
                    Some("Adira Finance".to_string()),
                    true,
                )?;
                println!("transaction credit payload: {}", record.to_json()?);
            }
        }
    }

    Ok(())
}
