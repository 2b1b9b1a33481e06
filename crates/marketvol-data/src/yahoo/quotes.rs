//! Quote data fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::fetch::{BatchFetcher, FetchOptions};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

/// Name recorded as the snapshot source.
pub const SOURCE_NAME: &str = "yfinance";

/// Default number of per-symbol requests in flight within one batch.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
    concurrency: usize,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider with no pacing delay and the default concurrency.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP connector cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::ZERO)
    }

    /// Create a provider that pauses `rate_limit_delay` after every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP connector cannot be built.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    /// Set how many symbols of a batch are requested at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch OHLCV data for a single symbol.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "PETR4.SA")
    /// * `start` - Start date for the data
    /// * `end` - End date for the data
    /// * `options` - Interval and adjustment settings
    ///
    /// # Returns
    /// A Polars DataFrame with columns: symbol, date, open, high, low, close, volume.
    /// `close` holds the adjusted close when `options.adjusted` is set.
    pub async fn fetch_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        options: &FetchOptions,
    ) -> Result<DataFrame> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history_interval(symbol, start_time, end_time, &options.interval)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let dates: Vec<i64> = quotes.iter().map(|q| q.timestamp).collect();
        let opens: Vec<f64> = quotes.iter().map(|q| q.open).collect();
        let highs: Vec<f64> = quotes.iter().map(|q| q.high).collect();
        let lows: Vec<f64> = quotes.iter().map(|q| q.low).collect();
        let closes: Vec<f64> = quotes
            .iter()
            .map(|q| if options.adjusted { q.adjclose } else { q.close })
            .collect();
        let volumes: Vec<u64> = quotes.iter().map(|q| q.volume).collect();

        let mut df = DataFrame::new(vec![
            Series::new("timestamp".into(), dates).into(),
            Series::new("open".into(), opens).into(),
            Series::new("high".into(), highs).into(),
            Series::new("low".into(), lows).into(),
            Series::new("close".into(), closes).into(),
            Series::new("volume".into(), volumes).into(),
        ])?;

        let symbol_col: Column = Series::new("symbol".into(), vec![symbol; df.height()]).into();
        df.with_column(symbol_col)?;

        let df = df
            .lazy()
            .with_column(
                (col("timestamp") * lit(1_000_000_000))
                    .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .select(&[
                col("symbol"),
                col("date"),
                col("open"),
                col("high"),
                col("low"),
                col("close"),
                col("volume"),
            ])
            .collect()?;

        sleep(self.rate_limit_delay).await;

        Ok(df)
    }

    /// Fetch OHLCV data for multiple symbols, `concurrency` requests at a time.
    ///
    /// Symbols that fail are logged and left out of the result. The batch only
    /// fails when no symbol returned data.
    ///
    /// # Returns
    /// A long-format DataFrame with all symbols combined, in request order
    pub async fn fetch_quotes_batch(
        &self,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        options: &FetchOptions,
    ) -> Result<DataFrame> {
        let frames: Vec<Option<LazyFrame>> = stream::iter(symbols)
            .map(|symbol| async move {
                match self.fetch_quotes(symbol, start, end, options).await {
                    Ok(df) => {
                        debug!(%symbol, rows = df.height(), "fetched quotes");
                        Some(df.lazy())
                    }
                    Err(e) => {
                        warn!(%symbol, error = %e, "failed to fetch quotes");
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let dfs: Vec<LazyFrame> = frames.into_iter().flatten().collect();

        if dfs.is_empty() {
            return Err(DataError::MissingData {
                symbol: "batch".to_string(),
                reason: "No data fetched for any symbol".to_string(),
            });
        }

        let combined = concat(dfs, UnionArgs::default())?.collect()?;

        Ok(combined)
    }
}

impl BatchFetcher for YahooQuoteProvider {
    fn source(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_batch(&self, symbols: &[String], options: &FetchOptions) -> Result<DataFrame> {
        options.validate()?;
        let end = Utc::now();
        let start = end - ChronoDuration::days(i64::from(options.lookback_days));
        self.fetch_quotes_batch(symbols, start, end, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_date_range() {
        let provider = YahooQuoteProvider::new().unwrap();
        let start = Utc::now();
        let end = start - ChronoDuration::days(30);

        let result = provider
            .fetch_quotes("PETR4.SA", start, end, &FetchOptions::default())
            .await;
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooQuoteProvider::new().unwrap();
        let end = Utc::now();
        let start = end - ChronoDuration::days(30);

        let result = provider
            .fetch_quotes("", start, end, &FetchOptions::default())
            .await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn test_batch_rejects_zero_lookback() {
        let provider = YahooQuoteProvider::new().unwrap();
        let options = FetchOptions {
            lookback_days: 0,
            ..Default::default()
        };

        let result = provider
            .fetch_batch(&["PETR4.SA".to_string()], &options)
            .await;
        assert!(matches!(result, Err(DataError::InvalidLookback(0))));
    }

    #[test]
    fn test_concurrency_floor() {
        let provider = YahooQuoteProvider::new().unwrap().with_concurrency(0);
        assert_eq!(provider.concurrency, 1);
        assert_eq!(provider.source(), "yfinance");
    }
}
