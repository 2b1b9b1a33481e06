//! Batch fetch contract between a refresh run and a market-data provider.
//!
//! A provider receives an ordered batch of symbols and returns whatever table
//! it produces. The caller never trusts the shape: the table goes through
//! [`normalize_closes`](crate::close::normalize_closes) before any numbers are
//! read from it, and any error is treated as a failure of the whole batch.

use crate::error::{DataError, Result};
use polars::prelude::DataFrame;
use std::future::Future;

/// Default lookback in calendar days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 400;

/// Default sampling interval.
pub const DEFAULT_INTERVAL: &str = "1d";

/// Provider intervals with at most one bar per calendar date.
///
/// Close matrices are keyed by date, so intraday bars are not accepted.
pub const SUPPORTED_INTERVALS: [&str; 5] = ["1d", "5d", "1wk", "1mo", "3mo"];

/// Options forwarded to the provider for every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Calendar days of history to request, counted back from now
    pub lookback_days: u32,
    /// Provider sampling interval (e.g. "1d")
    pub interval: String,
    /// Report split/dividend adjusted closes instead of raw closes
    pub adjusted: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            interval: DEFAULT_INTERVAL.to_string(),
            adjusted: false,
        }
    }
}

impl FetchOptions {
    /// Lookback rendered the way snapshots record it (e.g. "400d").
    pub fn lookback_label(&self) -> String {
        format!("{}d", self.lookback_days)
    }

    /// Reject options no provider could satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidLookback`] for a zero lookback and
    /// [`DataError::InvalidInterval`] for an interval outside
    /// [`SUPPORTED_INTERVALS`], intraday ones included.
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days == 0 {
            return Err(DataError::InvalidLookback(self.lookback_days));
        }
        if !SUPPORTED_INTERVALS.contains(&self.interval.as_str()) {
            return Err(DataError::InvalidInterval(self.interval.clone()));
        }
        Ok(())
    }
}

/// A source of daily price tables for batches of symbols.
pub trait BatchFetcher {
    /// Provider name recorded in the snapshot metadata.
    fn source(&self) -> &str;

    /// Fetch price history for `symbols`.
    ///
    /// Implementations may return any table shape accepted by
    /// [`normalize_closes`](crate::close::normalize_closes). Symbols the
    /// provider could not serve may simply be absent from the result.
    fn fetch_batch(
        &self,
        symbols: &[String],
        options: &FetchOptions,
    ) -> impl Future<Output = Result<DataFrame>>;
}
