//! JSON rate report
//!
//! Serializable view of an aggregation handed to downstream tool and UI
//! layers. Success and failure share the `success` flag so consumers can
//! branch on one field.

use serde::Serialize;

use crate::adapters::types::supported_exchanges;
use crate::core::aggregator::AggregateResult;
use crate::core::arbitrage::{ArbitrageClassifier, ArbitrageSignal};
use crate::error::{ExchangeFailure, RateError};

const USDT_NOTE: &str = "Prices shown in USDT (Tether stablecoin), pegged 1:1 to USD";

/// One exchange's line in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub exchange: String,
    pub pair: String,
    pub price: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    /// 24h change in percent
    #[serde(rename = "change24h")]
    pub change_24h: f64,
}

/// Best or worst price with a readable caption
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub exchange: String,
    pub price: f64,
    pub message: String,
}

/// Arbitrage signal plus its caption
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrageReport {
    #[serde(flatten)]
    pub signal: ArbitrageSignal,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessReport {
    pub success: bool,
    pub pair: String,
    pub prices: Vec<PriceLine>,
    pub best_price: PricePoint,
    pub worst_price: PricePoint,
    pub average_price: f64,
    /// `null` when the spread is within the threshold
    pub arbitrage_opportunity: Option<ArbitrageReport>,
    pub missing_exchanges: Vec<ExchangeFailure>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
    pub suggestion: String,
}

/// Report for one rate request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RateReport {
    Success(SuccessReport),
    Failure(FailureReport),
}

impl RateReport {
    pub fn from_aggregate(result: &AggregateResult, classifier: &ArbitrageClassifier) -> Self {
        let prices = result
            .quotes
            .iter()
            .map(|q| PriceLine {
                exchange: q.exchange.clone(),
                pair: q.pair.clone(),
                price: q.price,
                volume_24h: q.volume_24h,
                change_24h: q.change_percent_24h,
            })
            .collect();

        let arbitrage_opportunity = classifier.classify(result).map(|signal| ArbitrageReport {
            message: signal.message(),
            signal,
        });

        let note = result
            .quotes
            .iter()
            .any(|q| q.quote_currency() == "USDT")
            .then(|| USDT_NOTE.to_string());

        RateReport::Success(SuccessReport {
            success: true,
            pair: result.pair.clone(),
            prices,
            best_price: PricePoint {
                exchange: result.best_price.exchange.clone(),
                price: result.best_price.price,
                message: format!("Cheapest on {}", result.best_price.exchange),
            },
            worst_price: PricePoint {
                exchange: result.worst_price.exchange.clone(),
                price: result.worst_price.price,
                message: format!("Most expensive on {}", result.worst_price.exchange),
            },
            average_price: result.average_price,
            arbitrage_opportunity,
            missing_exchanges: result.failures.clone(),
            note,
        })
    }

    pub fn failure(error: &RateError) -> Self {
        RateReport::Failure(FailureReport {
            success: false,
            error: error.to_string(),
            suggestion: suggestion_for(error),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RateReport::Success(_))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn suggestion_for(error: &RateError) -> String {
    match error {
        RateError::UnsupportedExchange(_) | RateError::NoExchangesRequested => format!(
            "Use one of the supported exchanges: {}",
            supported_exchanges().join(", ")
        ),
        RateError::InvalidSymbol(_) => {
            "Check the cryptocurrency and fiat symbols (e.g., BTC, USD)".to_string()
        }
        RateError::InvalidRequest(_) => "Check the request parameters and try again".to_string(),
        RateError::Timeout { .. } => "The exchange is slow to respond; try again shortly".to_string(),
        _ => "Try a different currency pair or check the cryptocurrency symbol".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::summarize;
    use crate::core::quote::TickerQuote;
    use chrono::{DateTime, Utc};
    use serde_json::Value;

    fn quote(exchange: &str, pair: &str, price: f64) -> TickerQuote {
        TickerQuote {
            exchange: exchange.to_string(),
            pair: pair.to_string(),
            price,
            volume_24h: 12.5,
            high_24h: price,
            low_24h: price,
            change_24h: 1.0,
            change_percent_24h: 0.8,
            timestamp: DateTime::<Utc>::from_timestamp_millis(0).unwrap(),
            last_updated: "1970-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn report_json(quotes: Vec<TickerQuote>, failures: Vec<ExchangeFailure>) -> Value {
        let result = summarize("BTC/USD".to_string(), quotes, failures).unwrap();
        let report = RateReport::from_aggregate(&result, &ArbitrageClassifier::default());
        assert!(report.is_success());
        serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap()
    }

    #[test]
    fn test_success_report_shape() {
        let json = report_json(
            vec![
                quote("binance", "BTC/USDT", 100.0),
                quote("kraken", "BTC/USD", 101.0),
            ],
            vec![ExchangeFailure {
                exchange: "coinbase".to_string(),
                reason: "timeout".to_string(),
            }],
        );

        assert_eq!(json["success"], true);
        assert_eq!(json["pair"], "BTC/USD");
        assert_eq!(json["prices"].as_array().unwrap().len(), 2);
        assert_eq!(json["prices"][0]["volume24h"], 12.5);
        assert_eq!(json["prices"][0]["change24h"], 0.8);
        assert_eq!(json["bestPrice"]["exchange"], "binance");
        assert_eq!(json["bestPrice"]["message"], "Cheapest on binance");
        assert_eq!(json["worstPrice"]["message"], "Most expensive on kraken");
        assert_eq!(json["averagePrice"], 100.5);
        assert_eq!(json["arbitrageOpportunity"]["buyOn"], "binance");
        assert_eq!(json["arbitrageOpportunity"]["sellOn"], "kraken");
        assert!(json["arbitrageOpportunity"]["message"]
            .as_str()
            .unwrap()
            .contains("1.00% profit"));
        assert_eq!(json["missingExchanges"][0]["exchange"], "coinbase");
        assert_eq!(json["note"], USDT_NOTE);
    }

    #[test]
    fn test_no_arbitrage_and_no_note_serialize_as_null() {
        let json = report_json(
            vec![quote("kraken", "BTC/USD", 100.0), quote("coinbase", "BTC/USD", 100.05)],
            vec![],
        );
        assert!(json["arbitrageOpportunity"].is_null());
        assert!(json["note"].is_null());
        assert_eq!(json["missingExchanges"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_failure_report() {
        let report = RateReport::failure(&RateError::UnsupportedExchange("ftx".to_string()));
        assert!(!report.is_success());
        let json: Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Exchange 'ftx' is not supported");
        assert_eq!(
            json["suggestion"],
            "Use one of the supported exchanges: binance, coinbase, kraken"
        );
    }
}
