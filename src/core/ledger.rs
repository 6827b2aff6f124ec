//! Converts amounts between currencies and records every conversion.
use crate::core::error::{ExchangeError, RateFetchError, Result};
use crate::core::history::{ConversionRecord, History, HistoryFile, Statistics};
use crate::core::rate::RateProvider;
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns the conversion history and resolves rates through a [`RateProvider`].
///
/// Direct pairs (one side is the provider's reference currency) take one
/// lookup. Cross pairs are bridged: `base -> reference` times
/// `reference -> target`.
pub struct ConversionLedger {
    provider: Arc<dyn RateProvider>,
    file: HistoryFile,
    history: History,
}

impl ConversionLedger {
    pub fn new(provider: Arc<dyn RateProvider>, file: HistoryFile, history: History) -> Self {
        ConversionLedger {
            provider,
            file,
            history,
        }
    }

    /// Loads the history behind `file`. An unreadable file is reported back
    /// as a warning and the ledger starts with an empty history.
    pub fn open(
        provider: Arc<dyn RateProvider>,
        file: HistoryFile,
    ) -> (Self, Option<ExchangeError>) {
        let (history, warning) = match file.load() {
            Ok(history) => (history, None),
            Err(e) => {
                warn!("{e}; continuing with an empty history");
                (History::new(), Some(e))
            }
        };
        (Self::new(provider, file, history), warning)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn reference_currency(&self) -> &str {
        self.provider.reference_currency()
    }

    /// Effective rate for one unit of `base` in `target`.
    pub async fn resolve_rate(&self, base: &str, target: &str) -> Result<f64> {
        let reference = self.provider.reference_currency();

        if base == reference || target == reference {
            debug!("Direct pair {base} -> {target}");
            return self.provider.get_rate(base, target).await;
        }

        debug!("Bridging {base} -> {target} through {reference}");
        let to_reference = self.provider.get_rate(base, reference).await?;
        let from_reference = self.provider.get_rate(reference, target).await?;
        let rate = to_reference * from_reference;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ExchangeError::rate_unavailable(
                base,
                target,
                RateFetchError::OutOfRange { rate },
            ));
        }
        Ok(rate)
    }

    /// Converts `amount` of `base` into `target`, records the conversion and
    /// returns the converted amount.
    pub async fn convert(&mut self, base: &str, target: &str, amount: f64) -> Result<f64> {
        validate(base, target, amount)?;

        let rate = self
            .resolve_rate(base, target)
            .await
            .map_err(|e| ExchangeError::ConversionFailed(Box::new(e)))?;
        let converted_amount = amount * rate;
        // Non-finite values serialize as null and would make the file unreadable
        if !converted_amount.is_finite() {
            return Err(ExchangeError::InvalidInput(format!(
                "Amount {amount} is too large to convert at rate {rate}."
            )));
        }
        debug!("Converted {amount} {base} at rate {rate}: {converted_amount} {target}");

        self.history.append(ConversionRecord::now(
            base,
            target,
            rate,
            amount,
            converted_amount,
        ));
        if let Err(e) = self.file.save(&self.history) {
            self.history.withdraw_last();
            return Err(e);
        }

        Ok(converted_amount)
    }

    pub fn statistics(&self, base: &str, target: &str) -> Result<Statistics> {
        self.history.statistics(base, target)
    }
}

fn validate(base: &str, target: &str, amount: f64) -> Result<()> {
    if base.is_empty() || target.is_empty() {
        return Err(ExchangeError::InvalidInput(
            "Currency codes cannot be empty.".to_string(),
        ));
    }
    if base == target {
        return Err(ExchangeError::InvalidInput(
            "Base and target currencies cannot be the same.".to_string(),
        ));
    }
    if let Some(code) = [base, target]
        .into_iter()
        .find(|c| !c.chars().all(|ch| ch.is_ascii_alphanumeric()))
    {
        return Err(ExchangeError::InvalidInput(format!(
            "Invalid currency code: {code:?}"
        )));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ExchangeError::InvalidInput(format!(
            "Amount must be a positive number, got {amount}."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Quotes are "reference units per one unit of the other currency",
    // the way the price service reports them.
    struct MockRateProvider {
        quotes: HashMap<String, f64>,
        failing: Vec<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockRateProvider {
        fn new() -> Self {
            MockRateProvider {
                quotes: HashMap::new(),
                failing: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn add_quote(&mut self, currency: &str, price: f64) {
            self.quotes.insert(currency.to_string(), price);
        }

        fn add_failure(&mut self, currency: &str) {
            self.failing.push(currency.to_string());
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        async fn get_rate(&self, base: &str, target: &str) -> Result<f64> {
            self.calls
                .lock()
                .unwrap()
                .push((base.to_string(), target.to_string()));

            let (other, invert) = if base == "USDT" {
                (target, true)
            } else if target == "USDT" {
                (base, false)
            } else {
                return Err(ExchangeError::rate_unavailable(
                    base,
                    target,
                    RateFetchError::NotQuoted {
                        reference: "USDT".to_string(),
                    },
                ));
            };

            if self.failing.iter().any(|c| c == other) {
                return Err(ExchangeError::rate_unavailable(
                    base,
                    target,
                    RateFetchError::Status {
                        status: StatusCode::SERVICE_UNAVAILABLE,
                        symbol: format!("{other}USDT"),
                    },
                ));
            }
            let price = self.quotes.get(other).copied().ok_or_else(|| {
                ExchangeError::rate_unavailable(
                    base,
                    target,
                    RateFetchError::Status {
                        status: StatusCode::BAD_REQUEST,
                        symbol: format!("{other}USDT"),
                    },
                )
            })?;
            Ok(if invert { 1.0 / price } else { price })
        }

        fn reference_currency(&self) -> &str {
            "USDT"
        }
    }

    fn ledger_with(
        provider: MockRateProvider,
    ) -> (ConversionLedger, Arc<MockRateProvider>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let provider = Arc::new(provider);
        let file = HistoryFile::new(temp_dir.path().join("exchange_history.json"));
        let ledger = ConversionLedger::new(provider.clone(), file, History::new());
        (ledger, provider, temp_dir)
    }

    fn market() -> MockRateProvider {
        let mut provider = MockRateProvider::new();
        provider.add_quote("BTC", 50000.0);
        provider.add_quote("ETH", 2500.0);
        provider
    }

    #[tokio::test]
    async fn test_direct_pair_to_reference() {
        let (mut ledger, provider, _dir) = ledger_with(market());

        let converted = ledger.convert("BTC", "USDT", 2.0).await.unwrap();
        assert_eq!(converted, 100000.0);
        assert_eq!(provider.call_count(), 1);

        let record = &ledger.history().records()[0];
        assert_eq!(record.rate, 50000.0);
        assert_eq!(record.amount, 2.0);
        assert_eq!(record.converted_amount, 100000.0);
    }

    #[tokio::test]
    async fn test_direct_pair_from_reference_is_inverted() {
        let (mut ledger, provider, _dir) = ledger_with(market());

        let converted = ledger.convert("USDT", "BTC", 100000.0).await.unwrap();
        assert!((converted - 2.0).abs() < 1e-12);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(ledger.history().records()[0].rate, 1.0 / 50000.0);
    }

    #[tokio::test]
    async fn test_cross_pair_is_bridged_through_reference() {
        let (mut ledger, provider, _dir) = ledger_with(market());

        let converted = ledger.convert("ETH", "BTC", 10.0).await.unwrap();
        assert!((converted - 0.5).abs() < 1e-12);

        let rate = ledger.history().records()[0].rate;
        assert!((rate - 2500.0 * (1.0 / 50000.0)).abs() < 1e-15);
        assert!((rate - 0.05).abs() < 1e-12);

        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("ETH".to_string(), "USDT".to_string()),
                ("USDT".to_string(), "BTC".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_same_currency_is_rejected_before_lookup() {
        let (mut ledger, provider, _dir) = ledger_with(market());

        for amount in [1.0, 0.0, -5.0] {
            let result = ledger.convert("BTC", "BTC", amount).await;
            assert!(matches!(result, Err(ExchangeError::InvalidInput(_))));
        }
        assert_eq!(provider.call_count(), 0);
        assert!(ledger.history().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected_before_lookup() {
        let (mut ledger, provider, _dir) = ledger_with(market());

        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = ledger.convert("BTC", "USDT", amount).await;
            assert!(matches!(result, Err(ExchangeError::InvalidInput(_))));
        }
        let result = ledger.convert("", "USDT", 1.0).await;
        assert!(matches!(result, Err(ExchangeError::InvalidInput(_))));

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_overflowing_amount_is_rejected_and_history_survives() {
        let (mut ledger, _provider, dir) = ledger_with(market());
        ledger.convert("BTC", "USDT", 1.0).await.unwrap();

        let result = ledger.convert("BTC", "USDT", 1e305).await;
        assert!(matches!(result, Err(ExchangeError::InvalidInput(_))));
        assert_eq!(ledger.history().len(), 1);

        let path = dir.path().join("exchange_history.json");
        let (reopened, warning) =
            ConversionLedger::open(Arc::new(market()), HistoryFile::new(&path));
        assert!(warning.is_none());
        assert_eq!(reopened.history(), ledger.history());
    }

    #[tokio::test]
    async fn test_bridged_rate_out_of_range_is_rejected() {
        let mut provider = market();
        provider.add_quote("DUST", 1e-300);
        provider.add_quote("WHALE", 1e300);
        let (mut ledger, _provider, dir) = ledger_with(provider);

        // 1e300 * (1 / 1e-300) overflows
        let err = ledger.convert("WHALE", "DUST", 1.0).await.unwrap_err();
        match &err {
            ExchangeError::ConversionFailed(inner) => assert!(matches!(
                **inner,
                ExchangeError::RateUnavailable {
                    source: RateFetchError::OutOfRange { .. },
                    ..
                }
            )),
            other => panic!("Expected ConversionFailed, got {other:?}"),
        }
        assert!(ledger.history().is_empty());
        assert!(!dir.path().join("exchange_history.json").exists());
    }

    #[tokio::test]
    async fn test_codes_with_url_characters_are_rejected_before_lookup() {
        let (mut ledger, provider, _dir) = ledger_with(market());

        for (base, target) in [
            ("ETHBTC#", "USDT"),
            ("USDT", "BTC&symbol=ETH"),
            ("BT C", "USDT"),
            ("BTC?", "USDT"),
        ] {
            let result = ledger.convert(base, target, 1.0).await;
            assert!(
                matches!(result, Err(ExchangeError::InvalidInput(_))),
                "expected InvalidInput for {base:?} -> {target:?}"
            );
        }
        assert_eq!(provider.call_count(), 0);
        assert!(ledger.history().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_writes_nothing() {
        let mut provider = market();
        provider.add_failure("BTC");
        let (mut ledger, _provider, dir) = ledger_with(provider);

        let err = ledger.convert("ETH", "BTC", 1.0).await.unwrap_err();
        match &err {
            ExchangeError::ConversionFailed(inner) => {
                assert!(matches!(**inner, ExchangeError::RateUnavailable { .. }));
            }
            other => panic!("Expected ConversionFailed, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Conversion error: Error getting rate for USDT -> BTC: \
             HTTP error: 503 Service Unavailable for symbol: BTCUSDT"
        );
        assert!(ledger.history().is_empty());
        assert!(!dir.path().join("exchange_history.json").exists());
    }

    #[tokio::test]
    async fn test_history_grows_by_one_per_conversion() {
        let (mut ledger, _provider, dir) = ledger_with(market());

        ledger.convert("BTC", "USDT", 1.0).await.unwrap();
        let first = ledger.history().records()[0].clone();
        ledger.convert("USDT", "ETH", 10.0).await.unwrap();
        let _ = ledger.convert("BTC", "BTC", 1.0).await;
        ledger.convert("ETH", "BTC", 3.0).await.unwrap();

        assert_eq!(ledger.history().len(), 3);
        assert_eq!(ledger.history().records()[0], first);

        let on_disk = HistoryFile::new(dir.path().join("exchange_history.json"))
            .load()
            .unwrap();
        assert_eq!(&on_disk, ledger.history());
    }

    #[tokio::test]
    async fn test_statistics_after_conversions() {
        let (mut ledger, _provider, _dir) = ledger_with(market());
        ledger.convert("BTC", "USDT", 1.0).await.unwrap();
        ledger.convert("BTC", "USDT", 3.0).await.unwrap();

        let stats = ledger.statistics("BTC", "USDT").unwrap();
        assert_eq!(stats.max_rate, 50000.0);
        assert_eq!(stats.min_rate, 50000.0);
        assert_eq!(stats.avg_rate, 50000.0);
        assert_eq!(stats.count, 2);

        assert!(matches!(
            ledger.statistics("ETH", "USDT"),
            Err(ExchangeError::NoData { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_save_withdraws_record() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the write fail
        let path = temp_dir.path().join("history.json");
        std::fs::create_dir(&path).unwrap();

        let mut ledger =
            ConversionLedger::new(Arc::new(market()), HistoryFile::new(&path), History::new());
        let result = ledger.convert("BTC", "USDT", 1.0).await;
        assert!(matches!(
            result,
            Err(ExchangeError::HistorySaveFailed { .. })
        ));
        assert!(ledger.history().is_empty());
    }

    #[tokio::test]
    async fn test_open_with_corrupt_file_warns() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");
        std::fs::write(&path, "garbage").unwrap();

        let (mut ledger, warning) =
            ConversionLedger::open(Arc::new(market()), HistoryFile::new(&path));
        assert!(matches!(
            warning,
            Some(ExchangeError::HistoryLoadFailed { .. })
        ));
        assert!(ledger.history().is_empty());

        // Still usable, and the next save replaces the corrupt content
        ledger.convert("BTC", "USDT", 1.0).await.unwrap();
        assert_eq!(HistoryFile::new(&path).load().unwrap().len(), 1);
    }
}
