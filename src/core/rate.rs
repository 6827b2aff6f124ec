//! Spot rate abstractions

use crate::core::error::Result;
use async_trait::async_trait;

/// Looks up the spot rate for converting one unit of `base` into `target`.
///
/// Implementations answer only pairs where one side is the reference
/// currency of the price service; cross pairs are bridged by the ledger.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_rate(&self, base: &str, target: &str) -> Result<f64>;

    /// The currency every direct price is quoted in.
    fn reference_currency(&self) -> &str;
}
