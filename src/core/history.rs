//! Historical OHLC candles
//!
//! Served by Kraken, which lists real fiat quotes. The requested market is
//! tried first, then the Kraken fallback quotes; a pair that returns no
//! candles counts as a failure.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::kraken::KrakenConnector;
use crate::adapters::traits::CandleSource;
use crate::adapters::types::{ExchangeId, FallbackPolicy, RawCandle, TradingPair};
use crate::adapters::LiveConnectors;
use crate::config::ExchangesConfig;
use crate::core::fetcher::normalize_symbol;
use crate::error::RateError;

/// Most candles Kraken returns for one OHLC request
pub const MAX_KRAKEN_CANDLES: usize = 720;

/// Candle count used when the caller has no preference
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Candle width
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 9] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1M",
        }
    }

    /// Kraken OHLC interval in minutes
    ///
    /// Kraken has no monthly interval; monthly is served from weekly candles.
    pub fn kraken_interval(&self) -> u32 {
        match self {
            Timeframe::OneMinute => 1,
            Timeframe::FiveMinutes => 5,
            Timeframe::FifteenMinutes => 15,
            Timeframe::ThirtyMinutes => 30,
            Timeframe::OneHour => 60,
            Timeframe::FourHours => 240,
            Timeframe::OneDay => 1440,
            Timeframe::OneWeek | Timeframe::OneMonth => 10080,
        }
    }

    /// Number of Kraken candles to keep for a requested `limit`
    pub fn kraken_limit(&self, limit: usize) -> usize {
        match self {
            Timeframe::OneMonth => limit.saturating_mul(4).min(MAX_KRAKEN_CANDLES),
            _ => limit,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = RateError;

    /// Case-sensitive: "1m" is one minute, "1M" is one month
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| {
                RateError::InvalidRequest(format!(
                    "unknown timeframe '{}', expected one of 1m, 5m, 15m, 30m, 1h, 4h, 1d, 1w, 1M",
                    s
                ))
            })
    }
}

/// One OHLC bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    /// UTC calendar day of the bucket open (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Bucket open time
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    fn from_raw(raw: &RawCandle) -> ExchangeResult<Self> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(raw.open_time_ms).ok_or_else(|| {
            ExchangeError::InvalidResponse(format!(
                "candle time out of range: {}ms",
                raw.open_time_ms
            ))
        })?;
        Ok(Self {
            date: timestamp.date_naive(),
            timestamp,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
        })
    }
}

/// Candles for the pair that actually answered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    /// Resolved pair, which may differ from the requested market
    pub pair: String,
    pub timeframe: Timeframe,
    /// Oldest first
    pub candles: Vec<Candle>,
}

/// Historical candle lookups against one candle source
pub struct HistoryService<S> {
    source: S,
    policy: FallbackPolicy,
    timeout: Duration,
}

impl HistoryService<KrakenConnector> {
    /// Service backed by the Kraken REST API
    pub fn live(config: &ExchangesConfig) -> Self {
        let source = LiveConnectors::from_config(config).kraken();
        Self::new(
            source,
            config.fallback_policy(ExchangeId::Kraken),
            config.request_timeout(),
        )
    }
}

impl<S: CandleSource> HistoryService<S> {
    pub fn new(source: S, policy: FallbackPolicy, timeout: Duration) -> Self {
        Self {
            source,
            policy,
            timeout,
        }
    }

    /// Fetch the most recent candles for `symbol`/`market`, oldest first
    ///
    /// The returned series names the pair that answered; a fallback quote
    /// replaces `market` when the requested pair has no candles.
    ///
    /// # Errors
    /// * `InvalidSymbol` - a symbol is empty or malformed
    /// * `InvalidRequest` - `limit` is zero
    /// * `Timeout` - the fallback chain did not finish in time
    /// * `RateUnavailable` - no candidate pair returned candles
    pub async fn fetch_history(
        &self,
        symbol: &str,
        market: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries, RateError> {
        let symbol = normalize_symbol(symbol)?;
        let market = normalize_symbol(market)?;
        if limit == 0 {
            return Err(RateError::InvalidRequest("limit must be at least 1".to_string()));
        }

        let fetch = self.fetch_with_fallback(&symbol, &market, timeframe, limit);
        match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    pair = %format!("{}/{}", symbol, market),
                    timeframe = %timeframe,
                    "Candle fetch timed out"
                );
                Err(RateError::Timeout {
                    exchange: ExchangeId::Kraken.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn fetch_with_fallback(
        &self,
        symbol: &str,
        market: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries, RateError> {
        let interval = timeframe.kraken_interval();
        let keep = timeframe.kraken_limit(limit);

        let mut attempted = Vec::new();
        let mut last_error = String::new();

        for quote in self.policy.candidates(market) {
            let pair = TradingPair::new(symbol, &quote);
            attempted.push(pair.to_string());

            match self.source.fetch_candles(&pair, interval).await {
                Ok(raw) if raw.is_empty() => {
                    debug!(pair = %pair, "No candles returned");
                    last_error = format!("no candles for {}", pair);
                }
                Ok(raw) => {
                    let skip = raw.len().saturating_sub(keep);
                    match raw[skip..]
                        .iter()
                        .map(Candle::from_raw)
                        .collect::<ExchangeResult<Vec<_>>>()
                    {
                        Ok(candles) => {
                            info!(
                                pair = %pair,
                                timeframe = %timeframe,
                                candles = candles.len(),
                                "Historical candles fetched"
                            );
                            return Ok(CandleSeries {
                                pair: pair.to_string(),
                                timeframe,
                                candles,
                            });
                        }
                        Err(e) => {
                            warn!(pair = %pair, error = %e, "Candle payload rejected");
                            last_error = e.to_string();
                        }
                    }
                }
                Err(e) => {
                    debug!(pair = %pair, error = %e, "Candle candidate failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(RateError::RateUnavailable {
            exchange: ExchangeId::Kraken.to_string(),
            requested: format!("{}/{}", symbol, market),
            attempted,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::types::ExchangeClass;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    const DAY_MS: i64 = 86_400_000;

    /// Serves a fixed candle series per pair
    #[derive(Default)]
    struct SeriesSource {
        series: HashMap<String, usize>,
        /// Pairs whose first candle carries an unrepresentable time
        corrupt: HashSet<String>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl CandleSource for SeriesSource {
        async fn fetch_candles(
            &self,
            pair: &TradingPair,
            interval_minutes: u32,
        ) -> ExchangeResult<Vec<RawCandle>> {
            self.calls
                .lock()
                .unwrap()
                .push((pair.to_string(), interval_minutes));
            let corrupt = self.corrupt.contains(&pair.to_string());
            match self.series.get(&pair.to_string()) {
                Some(count) => Ok((0..*count as i64)
                    .map(|i| RawCandle {
                        open_time_ms: if corrupt && i == 0 {
                            i64::MAX
                        } else {
                            1_704_067_200_000 + i * DAY_MS
                        },
                        open: i as f64,
                        high: i as f64 + 1.0,
                        low: i as f64 - 1.0,
                        close: i as f64 + 0.5,
                    })
                    .collect()),
                None => Err(ExchangeError::PairNotListed {
                    exchange: "kraken".to_string(),
                    pair: pair.to_string(),
                }),
            }
        }
    }

    fn service(series: &[(&str, usize)]) -> HistoryService<SeriesSource> {
        let source = SeriesSource {
            series: series.iter().map(|(p, n)| (p.to_string(), *n)).collect(),
            ..Default::default()
        };
        HistoryService::new(
            source,
            FallbackPolicy::for_class(ExchangeClass::FiatNative),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_timeframe_parsing_is_case_sensitive() {
        assert_eq!("1m".parse::<Timeframe>().unwrap(), Timeframe::OneMinute);
        assert_eq!("1M".parse::<Timeframe>().unwrap(), Timeframe::OneMonth);
        assert_eq!(" 4h ".parse::<Timeframe>().unwrap(), Timeframe::FourHours);
        assert!("1y".parse::<Timeframe>().is_err());
        assert!("1D".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_kraken_interval_mapping() {
        let minutes: Vec<u32> = Timeframe::ALL.iter().map(|t| t.kraken_interval()).collect();
        assert_eq!(minutes, vec![1, 5, 15, 30, 60, 240, 1440, 10080, 10080]);
    }

    #[test]
    fn test_monthly_limit_uses_four_weeks_capped() {
        assert_eq!(Timeframe::OneMonth.kraken_limit(12), 48);
        assert_eq!(Timeframe::OneMonth.kraken_limit(500), MAX_KRAKEN_CANDLES);
        assert_eq!(Timeframe::OneDay.kraken_limit(500), 500);
    }

    #[test]
    fn test_timeframe_serde_names() {
        assert_eq!(serde_json::to_string(&Timeframe::OneMonth).unwrap(), "\"1M\"");
        let tf: Timeframe = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(tf, Timeframe::FifteenMinutes);
    }

    #[tokio::test]
    async fn test_returns_last_candles_oldest_first() {
        let service = service(&[("BTC/USD", 10)]);
        let series = service
            .fetch_history("btc", "usd", Timeframe::OneDay, 3)
            .await
            .unwrap();

        assert_eq!(series.pair, "BTC/USD");
        assert_eq!(series.timeframe, Timeframe::OneDay);
        let candles = &series.candles;
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].open, 7.0);
        assert_eq!(candles[2].open, 9.0);
        assert_eq!(candles[0].date.to_string(), "2024-01-08");
        assert_eq!(
            *service.source.calls.lock().unwrap(),
            vec![("BTC/USD".to_string(), 1440)]
        );
    }

    #[tokio::test]
    async fn test_unlisted_market_falls_back() {
        let service = service(&[("ETH/USD", 0), ("ETH/EUR", 5)]);
        let series = service
            .fetch_history("ETH", "ARS", Timeframe::OneWeek, 100)
            .await
            .unwrap();

        assert_eq!(series.pair, "ETH/EUR");
        assert_eq!(series.candles.len(), 5);
        let calls: Vec<String> = service
            .source
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect();
        // ETH/USD returned zero candles and is treated as a failure
        assert_eq!(calls, vec!["ETH/ARS", "ETH/USD", "ETH/EUR"]);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let service = service(&[]);
        let err = service
            .fetch_history("FOO", "BRL", Timeframe::OneHour, 10)
            .await
            .unwrap_err();
        match err {
            RateError::RateUnavailable {
                exchange, attempted, ..
            } => {
                assert_eq!(exchange, "kraken");
                assert_eq!(attempted, vec!["FOO/BRL", "FOO/USD", "FOO/EUR"]);
            }
            other => panic!("Expected RateUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_candle_time_fails_candidate() {
        let mut service = service(&[("BTC/USD", 4), ("BTC/EUR", 4)]);
        service.source.corrupt.insert("BTC/USD".to_string());

        let series = service
            .fetch_history("BTC", "USD", Timeframe::OneDay, 10)
            .await
            .unwrap();

        // The whole BTC/USD payload is rejected, none of its candles leak through
        assert_eq!(series.pair, "BTC/EUR");
        assert_eq!(series.candles.len(), 4);
    }

    #[tokio::test]
    async fn test_out_of_range_candle_time_reported() {
        let mut service = service(&[("BTC/USD", 2), ("BTC/EUR", 2)]);
        service.source.corrupt.insert("BTC/USD".to_string());
        service.source.corrupt.insert("BTC/EUR".to_string());

        let err = service
            .fetch_history("BTC", "USD", Timeframe::OneDay, 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"), "{}", err);
    }

    #[test]
    fn test_series_serializes_pair_and_candles() {
        let series = CandleSeries {
            pair: "ETH/EUR".to_string(),
            timeframe: Timeframe::OneWeek,
            candles: Vec::new(),
        };
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["pair"], "ETH/EUR");
        assert_eq!(json["timeframe"], "1w");
        assert!(json["candles"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let service = service(&[("BTC/USD", 3)]);
        let err = service
            .fetch_history("BTC", "USD", Timeframe::OneDay, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RateError::InvalidRequest(_)));
        assert!(service.source.calls.lock().unwrap().is_empty());
    }
}
