pub mod binance;

pub use binance::BinanceRateProvider;
