//! Forward fill and log-returns as polars expressions over close columns.
//!
//! Forward fill only feeds the last-price figure. Returns are always taken
//! from the unfilled closes so that a gap never turns into a synthetic
//! zero return.

use marketvol_data::{CloseMatrix, DATE_COLUMN};
use polars::prelude::*;
use std::f64::consts::E;

/// Carry the last valid close forward across nulls.
///
/// Leading nulls stay null.
pub fn forward_fill(closes: Expr) -> Expr {
    closes.forward_fill(None)
}

/// Last known close, i.e. the final entry of the forward-filled column.
pub fn last_price(closes: Expr) -> Expr {
    forward_fill(closes).last()
}

/// `ln(close[t] / close[t-1])`, aligned with `close[t]`.
///
/// The first row is null, as is every row where either close is null or not
/// strictly positive.
pub fn log_returns(closes: Expr) -> Expr {
    let previous = closes.clone().shift(lit(1));
    when(
        closes
            .clone()
            .gt(lit(0.0))
            .and(previous.clone().gt(lit(0.0))),
    )
    .then((closes / previous).log(E))
    .otherwise(lit(NULL))
}

/// Log-returns for every column of a [`CloseMatrix`].
///
/// The frame has the matrix's date column followed by one return column per
/// symbol, and one row fewer than the matrix.
///
/// # Errors
///
/// Returns an error if polars fails to evaluate the query.
pub fn log_return_frame(closes: &CloseMatrix) -> PolarsResult<DataFrame> {
    if closes.is_empty() {
        return Ok(DataFrame::empty());
    }
    let mut exprs = vec![col(DATE_COLUMN)];
    exprs.extend(
        closes
            .symbols()
            .iter()
            .map(|symbol| log_returns(col(symbol.as_str())).alias(symbol.as_str())),
    );
    closes.lazy().select(exprs).slice(1, IdxSize::MAX).collect()
}
