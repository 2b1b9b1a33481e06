//! Integration tests for the volatility engine over close matrices.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use marketvol_data::CloseMatrix;
use marketvol_volatility::{
    VolatilityConfig, VolatilityEngine, VolatilityWindow, annualized_volatility, log_return_frame,
    log_returns,
};
use polars::prelude::*;

fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

#[test]
fn test_three_close_example() {
    let closes = CloseMatrix::from_columns(
        dates(3),
        vec![(
            "PETR4.SA".to_string(),
            vec![Some(100.0), Some(102.0), Some(101.0)],
        )],
    )
    .unwrap();

    let result = VolatilityEngine::default().compute(&closes).unwrap();
    let r1 = (102.0_f64 / 100.0).ln();
    let r2 = (101.0_f64 / 102.0).ln();
    let mean = (r1 + r2) / 2.0;
    let expected = ((r1 - mean).powi(2) + (r2 - mean).powi(2)).sqrt() * 252.0_f64.sqrt();

    assert_relative_eq!(result[0].figures.weekly.unwrap(), expected, epsilon = 1e-12);
    assert_relative_eq!(result[0].figures.annual.unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn test_last_price_forward_fill() {
    let closes = CloseMatrix::from_columns(
        dates(3),
        vec![
            ("BBAS3.SA".to_string(), vec![Some(100.0), None, None]),
            ("BBDC4.SA".to_string(), vec![None, None, None]),
        ],
    )
    .unwrap();

    let result = VolatilityEngine::default().compute(&closes).unwrap();
    assert_eq!(result[0].last_price, Some(100.0));
    assert_eq!(result[1].last_price, None);
    for window in VolatilityWindow::all() {
        assert!(result[0].figures.get(window).is_none(), "{window}");
        assert!(result[1].figures.get(window).is_none(), "{window}");
    }
}

#[test]
fn test_complete_history_window_round_trip() {
    let prices: Vec<Option<f64>> = (0..300)
        .map(|i| Some(50.0 + (i as f64 * 0.37).sin() * 3.0 + i as f64 * 0.01))
        .collect();
    let closes =
        CloseMatrix::from_columns(dates(prices.len()), vec![("VALE3.SA".to_string(), prices)])
            .unwrap();

    let engine = VolatilityEngine::new(VolatilityConfig::default()).unwrap();
    let annual = engine.compute(&closes).unwrap()[0].figures.annual.unwrap();

    let returns = log_return_frame(&closes).unwrap();
    let rows = returns.height();
    let windowed = returns
        .lazy()
        .select([annualized_volatility(col("VALE3.SA"), Some(rows), 252).alias("vol")])
        .collect()
        .unwrap();
    let windowed = windowed
        .column("vol")
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .get(0)
        .unwrap();
    assert_relative_eq!(annual, windowed, epsilon = 1e-12);
}

#[test]
fn test_custom_trading_days_scales_result() {
    let closes = CloseMatrix::from_columns(
        dates(4),
        vec![(
            "ABEV3.SA".to_string(),
            vec![Some(12.0), Some(12.3), Some(12.1), Some(12.6)],
        )],
    )
    .unwrap();

    let daily = VolatilityEngine::new(VolatilityConfig { trading_days: 1 })
        .unwrap()
        .compute(&closes)
        .unwrap()[0]
        .figures
        .annual
        .unwrap();
    let yearly = VolatilityEngine::default().compute(&closes).unwrap()[0]
        .figures
        .annual
        .unwrap();

    assert_relative_eq!(yearly, daily * 252.0_f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn test_empty_matrix_yields_nothing() {
    let result = VolatilityEngine::default().compute(&CloseMatrix::empty()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_return_column_matches_matrix_rows() {
    let closes = CloseMatrix::from_columns(
        dates(3),
        vec![("ITUB4.SA".to_string(), vec![Some(33.0), Some(33.33), Some(33.0)])],
    )
    .unwrap();

    let returns = closes
        .lazy()
        .select([log_returns(col("ITUB4.SA")).alias("r")])
        .collect()
        .unwrap();
    assert_eq!(returns.height(), closes.n_dates());
}
