//! Error types for rate lookups, conversions and the conversion history.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single spot price could not be obtained from the price service.
#[derive(Error, Debug)]
pub enum RateFetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {status} for symbol: {symbol}")]
    Status {
        status: reqwest::StatusCode,
        symbol: String,
    },

    #[error("Failed to parse JSON response for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },

    #[error("Invalid price {price:?} for symbol: {symbol}")]
    InvalidPrice { symbol: String, price: String },

    #[error("Invalid symbol: {symbol:?}")]
    InvalidSymbol { symbol: String },

    #[error("Pair is not quoted against {reference}")]
    NotQuoted { reference: String },

    #[error("Rate {rate} is out of range")]
    OutOfRange { rate: f64 },
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Error getting rate for {base} -> {target}: {source}")]
    RateUnavailable {
        base: String,
        target: String,
        #[source]
        source: RateFetchError,
    },

    #[error("Conversion error: {0}")]
    ConversionFailed(#[source] Box<ExchangeError>),

    #[error("No data available for {base} -> {target}.")]
    NoData { base: String, target: String },

    #[error("Failed to load history from {}: {reason}", .path.display())]
    HistoryLoadFailed { path: PathBuf, reason: String },

    #[error("Failed to save history to {}: {reason}", .path.display())]
    HistorySaveFailed { path: PathBuf, reason: String },
}

impl ExchangeError {
    pub fn rate_unavailable(base: &str, target: &str, source: RateFetchError) -> Self {
        ExchangeError::RateUnavailable {
            base: base.to_string(),
            target: target.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
