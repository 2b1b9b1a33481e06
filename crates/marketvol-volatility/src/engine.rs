//! Annualized volatility over trailing windows.
//!
//! For a window of `w` rows the engine takes the most recent `w` log-return
//! rows (all rows for [`VolatilityWindow::Annual`]), skips nulls and computes
//! the sample standard deviation (`ddof = 1`), scaled by `sqrt(trading_days)`:
//!
//! `σ_annual = std(log_returns, ddof = 1) × sqrt(trading_days)`
//!
//! Fewer than two valid returns in the window leave the figure null. Every
//! symbol and window is evaluated in a single polars query over the close
//! matrix; figures only become `Option<f64>` when read back.

use crate::returns::{last_price, log_returns};
use crate::window::VolatilityWindow;
use marketvol_data::CloseMatrix;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trading days per year used to annualize daily volatility.
pub const DEFAULT_TRADING_DAYS: u32 = 252;

/// Errors raised by the volatility engine.
#[derive(Debug, Error)]
pub enum VolatilityError {
    /// Annualization constant of zero
    #[error("Invalid trading days per year: {0}")]
    InvalidTradingDays(u32),

    /// Polars query failed
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Configuration for the [`VolatilityEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Annualization factor is `sqrt(trading_days)` (default: 252)
    pub trading_days: u32,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            trading_days: DEFAULT_TRADING_DAYS,
        }
    }
}

/// Annualized volatility of the last `window` entries of `returns`.
///
/// `window = None` uses the whole column. A history shorter than the window
/// uses whatever it has.
pub fn annualized_volatility(returns: Expr, window: Option<usize>, trading_days: u32) -> Expr {
    let returns = match window {
        Some(rows) => returns.tail(Some(rows)),
        None => returns,
    };
    returns.std(1) * lit(f64::from(trading_days).sqrt())
}

/// One volatility figure per [`VolatilityWindow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatilityFigures {
    /// Whole-history volatility
    pub annual: Option<f64>,
    /// 126-row volatility
    pub semiannual: Option<f64>,
    /// 63-row volatility
    pub quarterly: Option<f64>,
    /// 21-row volatility
    pub monthly: Option<f64>,
    /// 5-row volatility
    pub weekly: Option<f64>,
}

impl VolatilityFigures {
    /// All figures missing.
    pub const fn missing() -> Self {
        Self {
            annual: None,
            semiannual: None,
            quarterly: None,
            monthly: None,
            weekly: None,
        }
    }

    /// Figure for `window`.
    pub const fn get(&self, window: VolatilityWindow) -> Option<f64> {
        match window {
            VolatilityWindow::Annual => self.annual,
            VolatilityWindow::Semiannual => self.semiannual,
            VolatilityWindow::Quarterly => self.quarterly,
            VolatilityWindow::Monthly => self.monthly,
            VolatilityWindow::Weekly => self.weekly,
        }
    }

    /// Replace the figure for `window`.
    pub const fn set(&mut self, window: VolatilityWindow, value: Option<f64>) {
        match window {
            VolatilityWindow::Annual => self.annual = value,
            VolatilityWindow::Semiannual => self.semiannual = value,
            VolatilityWindow::Quarterly => self.quarterly = value,
            VolatilityWindow::Monthly => self.monthly = value,
            VolatilityWindow::Weekly => self.weekly = value,
        }
    }

    /// Apply `f` to every present figure.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            annual: self.annual.map(&f),
            semiannual: self.semiannual.map(&f),
            quarterly: self.quarterly.map(&f),
            monthly: self.monthly.map(&f),
            weekly: self.weekly.map(&f),
        }
    }
}

/// Last price and volatility figures for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolVolatility {
    /// Ticker symbol
    pub symbol: String,
    /// Last known close (forward-filled)
    pub last_price: Option<f64>,
    /// Annualized volatility per window
    pub figures: VolatilityFigures,
}

impl SymbolVolatility {
    /// No price and no figures for `symbol`.
    pub fn missing(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price: None,
            figures: VolatilityFigures::missing(),
        }
    }
}

/// Computes [`SymbolVolatility`] for every column of a [`CloseMatrix`].
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEngine {
    config: VolatilityConfig,
}

impl VolatilityEngine {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns [`VolatilityError::InvalidTradingDays`] when `trading_days` is zero.
    pub const fn new(config: VolatilityConfig) -> Result<Self, VolatilityError> {
        if config.trading_days == 0 {
            return Err(VolatilityError::InvalidTradingDays(config.trading_days));
        }
        Ok(Self { config })
    }

    /// Engine configuration.
    pub const fn config(&self) -> &VolatilityConfig {
        &self.config
    }

    /// Last price and per-window volatility for each symbol, in column order.
    ///
    /// # Errors
    ///
    /// Returns [`VolatilityError::Polars`] if the query cannot be evaluated.
    pub fn compute(&self, closes: &CloseMatrix) -> Result<Vec<SymbolVolatility>, VolatilityError> {
        if closes.is_empty() {
            return Ok(closes
                .symbols()
                .iter()
                .map(SymbolVolatility::missing)
                .collect());
        }

        let trading_days = self.config.trading_days;
        let mut exprs = Vec::with_capacity(closes.symbols().len() * 6);
        for (idx, symbol) in closes.symbols().iter().enumerate() {
            let close = col(symbol.as_str());
            exprs.push(last_price(close.clone()).alias(figure_name(idx, "price")));
            let returns = log_returns(close);
            for window in VolatilityWindow::all() {
                exprs.push(
                    annualized_volatility(returns.clone(), window.length(), trading_days)
                        .alias(figure_name(idx, window.field_name())),
                );
            }
        }
        let row = closes.lazy().select(exprs).collect()?;

        closes
            .symbols()
            .iter()
            .enumerate()
            .map(|(idx, symbol)| {
                let mut figures = VolatilityFigures::missing();
                for window in VolatilityWindow::all() {
                    figures.set(window, scalar(&row, &figure_name(idx, window.field_name()))?);
                }
                Ok(SymbolVolatility {
                    symbol: symbol.clone(),
                    last_price: scalar(&row, &figure_name(idx, "price"))?,
                    figures,
                })
            })
            .collect()
    }
}

impl Default for VolatilityEngine {
    fn default() -> Self {
        Self {
            config: VolatilityConfig::default(),
        }
    }
}

fn figure_name(idx: usize, field: &str) -> String {
    format!("{idx}_{field}")
}

/// First value of a one-row result column.
fn scalar(row: &DataFrame, name: &str) -> PolarsResult<Option<f64>> {
    let values = row
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(values.f64()?.get(0).filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn matrix(columns: Vec<(&str, Vec<Option<f64>>)>) -> CloseMatrix {
        let rows = columns.first().map_or(0, |(_, c)| c.len());
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..rows)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        CloseMatrix::from_columns(
            dates,
            columns
                .into_iter()
                .map(|(s, c)| (s.to_string(), c))
                .collect(),
        )
        .unwrap()
    }

    /// Evaluate a volatility expression over a single `returns` column.
    fn volatility(returns: &[Option<f64>], window: Option<usize>, trading_days: u32) -> Option<f64> {
        let df = DataFrame::new(vec![Series::new("returns".into(), returns.to_vec()).into()])
            .unwrap();
        let row = df
            .lazy()
            .select([annualized_volatility(col("returns"), window, trading_days).alias("vol")])
            .collect()
            .unwrap();
        scalar(&row, "vol").unwrap()
    }

    #[test]
    fn test_std_uses_bessel_correction() {
        // Values 1..=4: mean 2.5, squared deviations sum to 5, 5 / 3
        let returns = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        assert_relative_eq!(volatility(&returns, None, 1).unwrap(), (5.0_f64 / 3.0).sqrt());
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![Some(0.01)])]
    #[case(vec![None, Some(0.01), None])]
    fn test_needs_two_valid_returns(#[case] returns: Vec<Option<f64>>) {
        assert!(volatility(&returns, None, 252).is_none());
    }

    #[test]
    fn test_three_closes_weekly_window() {
        let closes = matrix(vec![("PETR4.SA", vec![Some(100.0), Some(102.0), Some(101.0)])]);
        let r1 = (102.0_f64 / 100.0).ln();
        let r2 = (101.0_f64 / 102.0).ln();
        let mean = (r1 + r2) / 2.0;
        let expected = ((r1 - mean).powi(2) + (r2 - mean).powi(2)).sqrt() * 252.0_f64.sqrt();

        let result = VolatilityEngine::default().compute(&closes).unwrap();
        assert_relative_eq!(result[0].figures.weekly.unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_window_takes_most_recent_rows() {
        // Only the last two rows are inside a 2-row window.
        let returns = [Some(0.5), Some(-0.5), Some(0.01), Some(0.03)];
        let vol = volatility(&returns, Some(2), 1).unwrap();
        assert_relative_eq!(vol, 0.0002_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_window_with_one_valid_return_is_missing() {
        let returns = [Some(0.01), Some(0.02), None, None, Some(0.03)];
        assert!(volatility(&returns, Some(3), 252).is_none());
        assert!(volatility(&returns, None, 252).is_some());
    }

    #[test]
    fn test_full_window_equals_whole_history() {
        let returns: Vec<Option<f64>> = (0..40)
            .map(|i| Some(((i * 7) % 11) as f64 / 100.0 - 0.05))
            .collect();
        let windowed = volatility(&returns, Some(returns.len()), 252).unwrap();
        let whole = volatility(&returns, None, 252).unwrap();
        assert_relative_eq!(windowed, whole);
    }

    #[test]
    fn test_engine_absent_symbol_is_all_missing() {
        let closes = matrix(vec![
            ("PETR4.SA", vec![Some(100.0), Some(102.0), Some(101.0)]),
            ("VALE3.SA", vec![None, None, None]),
        ]);
        let result = VolatilityEngine::default().compute(&closes).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].symbol, "PETR4.SA");
        assert_eq!(result[0].last_price, Some(101.0));
        assert!(result[0].figures.weekly.is_some());
        assert!(result[0].figures.annual.is_some());

        assert_eq!(result[1], SymbolVolatility::missing("VALE3.SA"));
    }

    #[test]
    fn test_engine_constant_prices_give_zero_not_missing() {
        let closes = matrix(vec![("ITUB4.SA", vec![Some(30.0); 10])]);
        let result = VolatilityEngine::default().compute(&closes).unwrap();
        assert_eq!(result[0].figures.weekly, Some(0.0));
    }

    #[test]
    fn test_engine_short_history_fills_longer_windows() {
        let closes = matrix(vec![(
            "WEGE3.SA",
            vec![Some(40.0), Some(41.0), Some(40.5), Some(42.0)],
        )]);
        let figures = VolatilityEngine::default().compute(&closes).unwrap()[0].figures;
        assert_eq!(figures.semiannual, figures.annual);
        assert_eq!(figures.quarterly, figures.annual);
        assert_eq!(figures.monthly, figures.annual);
        assert_eq!(figures.weekly, figures.annual);
    }

    #[test]
    fn test_engine_empty_matrix() {
        let result = VolatilityEngine::default().compute(&CloseMatrix::empty()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_zero_trading_days_rejected() {
        let result = VolatilityEngine::new(VolatilityConfig { trading_days: 0 });
        assert!(matches!(result, Err(VolatilityError::InvalidTradingDays(0))));
    }

    #[test]
    fn test_figures_map_skips_missing() {
        let figures = VolatilityFigures {
            annual: Some(0.25),
            ..VolatilityFigures::missing()
        };
        let doubled = figures.map(|v| v * 2.0);
        assert_eq!(doubled.annual, Some(0.5));
        assert_eq!(doubled.weekly, None);
    }
}
