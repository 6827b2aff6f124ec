use crate::core::error::{ExchangeError, RateFetchError, Result};
use crate::core::rate::RateProvider;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

const USER_AGENT: &str = concat!("xrate/", env!("CARGO_PKG_VERSION"));

/// Spot prices from the Binance `ticker/price` endpoint.
///
/// Binance quotes a symbol such as `BTCUSDT` as the number of reference
/// units for one unit of the other currency, so a lookup from the reference
/// currency is the inverse of the quoted price.
pub struct BinanceRateProvider {
    base_url: String,
    reference_currency: String,
    client: reqwest::Client,
}

impl BinanceRateProvider {
    pub fn new(base_url: &str, reference_currency: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(BinanceRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            reference_currency: reference_currency.to_string(),
            client,
        })
    }

    /// Fetches the quoted price for `symbol`, in reference units.
    async fn fetch_price(&self, symbol: &str) -> std::result::Result<f64, RateFetchError> {
        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol);
        debug!("Requesting price from {}", url);

        let response = self.client.get(&url).send().await?;
        debug!(response = ?response, "Received Binance response");

        if !response.status().is_success() {
            return Err(RateFetchError::Status {
                status: response.status(),
                symbol: symbol.to_string(),
            });
        }

        let text = response.text().await?;
        let data: TickerPriceResponse =
            serde_json::from_str(&text).map_err(|e| RateFetchError::Malformed {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let price: f64 = data.price.trim().parse().map_err(|_| RateFetchError::InvalidPrice {
            symbol: symbol.to_string(),
            price: data.price.clone(),
        })?;
        if !price.is_finite() || price <= 0.0 {
            return Err(RateFetchError::InvalidPrice {
                symbol: symbol.to_string(),
                price: data.price,
            });
        }

        Ok(price)
    }
}

#[derive(Debug, Deserialize)]
struct TickerPriceResponse {
    price: String,
}

#[async_trait]
impl RateProvider for BinanceRateProvider {
    #[instrument(name = "BinanceRateFetch", skip(self))]
    async fn get_rate(&self, base: &str, target: &str) -> Result<f64> {
        let reference = self.reference_currency.as_str();

        let (symbol, invert) = if base == reference {
            (format!("{target}{reference}"), true)
        } else if target == reference {
            (format!("{base}{reference}"), false)
        } else {
            return Err(ExchangeError::rate_unavailable(
                base,
                target,
                RateFetchError::NotQuoted {
                    reference: reference.to_string(),
                },
            ));
        };

        // The symbol goes into the query string unescaped
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExchangeError::rate_unavailable(
                base,
                target,
                RateFetchError::InvalidSymbol { symbol },
            ));
        }

        let price = self
            .fetch_price(&symbol)
            .await
            .map_err(|e| ExchangeError::rate_unavailable(base, target, e))?;

        let rate = if invert { 1.0 / price } else { price };
        if !rate.is_finite() {
            return Err(ExchangeError::rate_unavailable(
                base,
                target,
                RateFetchError::OutOfRange { rate },
            ));
        }
        debug!("Rate {base} -> {target}: {rate}");
        Ok(rate)
    }

    fn reference_currency(&self) -> &str {
        &self.reference_currency
    }
}
