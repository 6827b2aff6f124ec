//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod ledger;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use error::{ExchangeError, RateFetchError};
pub use history::{ConversionRecord, History, HistoryFile, Statistics};
pub use input::ConversionRequest;
pub use ledger::ConversionLedger;
pub use rate::RateProvider;
