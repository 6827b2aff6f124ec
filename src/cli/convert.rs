use super::ui;
use crate::core::{ConversionLedger, ConversionRequest};
use anyhow::Result;

pub fn format_conversion(request: &ConversionRequest, converted_amount: f64) -> String {
    format!(
        "{} {} = {:.2} {}",
        request.amount, request.base, converted_amount, request.target
    )
}

/// Parses the user's input, converts it and prints the outcome.
pub async fn run(
    ledger: &mut ConversionLedger,
    base: &str,
    target: &str,
    amount: &str,
) -> Result<()> {
    let request = ConversionRequest::parse(base, target, amount)?;

    let pb = ui::new_spinner("Fetching rates...");
    let result = ledger
        .convert(&request.base, &request.target, request.amount)
        .await;
    pb.finish_and_clear();

    let converted_amount = result?;
    println!(
        "{}",
        ui::style_text(
            &format_conversion(&request, converted_amount),
            ui::StyleType::Result
        )
    );
    Ok(())
}
