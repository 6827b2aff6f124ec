use crate::core::error::{ExchangeError, Result};

/// A conversion as typed by the user, cleaned up and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub base: String,
    pub target: String,
    pub amount: f64,
}

impl ConversionRequest {
    pub fn parse(base: &str, target: &str, amount: &str) -> Result<Self> {
        let base = normalize_code(base);
        let target = normalize_code(target);
        let amount: f64 = amount
            .trim()
            .parse()
            .map_err(|_| ExchangeError::InvalidInput(format!("Invalid amount: {amount:?}")))?;

        if base.is_empty() || target.is_empty() || !amount.is_finite() || amount <= 0.0 {
            return Err(ExchangeError::InvalidInput("Invalid input.".to_string()));
        }
        if let Some(code) = [&base, &target]
            .into_iter()
            .find(|c| !c.chars().all(|ch| ch.is_ascii_alphanumeric()))
        {
            return Err(ExchangeError::InvalidInput(format!(
                "Invalid currency code: {code:?}"
            )));
        }

        Ok(ConversionRequest {
            base,
            target,
            amount,
        })
    }
}

/// Currency codes are compared verbatim downstream, so they are trimmed and
/// upper-cased on the way in.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
