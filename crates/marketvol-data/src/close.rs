//! Close-price matrix and normalization of provider tables.
//!
//! Providers hand back tables in several layouts. [`normalize_closes`] accepts
//! all of them and produces a [`CloseMatrix`] with ascending, duplicate-free
//! dates and exactly one column per requested symbol, in request order.
//!
//! Accepted layouts:
//! - long: `symbol`, `date`, `close` columns, one row per symbol and date
//! - single series: `date`, `close` with no `symbol` column (single-symbol batches only)
//! - wide, flat: `date` plus one column named after each symbol
//! - wide, hierarchical: `date` plus `<field>_<symbol>` columns such as `close_PETR4.SA`
//!
//! Column names are matched case-insensitively except for the symbol part.
//! Every layout is first rewritten to the long layout, then pivoted onto the
//! sorted set of observed dates with one left join per symbol.

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Prefix of close columns in hierarchical wide tables.
const CLOSE_PREFIX: &str = "close_";

/// Name of the date column in a [`CloseMatrix`] frame.
pub const DATE_COLUMN: &str = "date";

const SYMBOL_COLUMN: &str = "symbol";
const CLOSE_COLUMN: &str = "close";

/// Daily closes indexed by (date, symbol).
///
/// Backed by a [`DataFrame`] holding a [`DATE_COLUMN`] of type `Date`
/// followed by one `Float64` column per symbol. Dates are strictly ascending;
/// a null cell marks a missing close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseMatrix {
    frame: DataFrame,
    symbols: Vec<String>,
}

impl CloseMatrix {
    /// An explicitly empty matrix: no dates, no symbols.
    pub const fn empty() -> Self {
        Self {
            frame: DataFrame::empty(),
            symbols: Vec::new(),
        }
    }

    /// Build a matrix from dates and `(symbol, closes)` columns.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Shape`] if dates are not strictly ascending, a
    /// symbol repeats, or a column length differs from the number of dates.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(DataError::Shape(format!(
                "dates must be strictly ascending, found {} before {}",
                pair[0], pair[1]
            )));
        }

        let days: Vec<i32> = dates
            .iter()
            .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let mut frame_columns: Vec<Column> = vec![
            Series::new(DATE_COLUMN.into(), days)
                .cast(&DataType::Date)?
                .into(),
        ];
        let mut symbols: Vec<String> = Vec::with_capacity(columns.len());
        for (symbol, closes) in columns {
            if closes.len() != dates.len() {
                return Err(DataError::Shape(format!(
                    "column {symbol} has {} values for {} dates",
                    closes.len(),
                    dates.len()
                )));
            }
            if symbols.contains(&symbol) {
                return Err(DataError::Shape(format!("duplicate column {symbol}")));
            }
            frame_columns.push(Series::new(symbol.as_str().into(), closes).into());
            symbols.push(symbol);
        }

        Ok(Self {
            frame: DataFrame::new(frame_columns)?,
            symbols,
        })
    }

    /// True when the matrix has no dates.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// The backing frame: [`DATE_COLUMN`] then one column per symbol.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Lazy view of the backing frame.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Symbols in column order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of date rows.
    pub fn n_dates(&self) -> usize {
        self.frame.height()
    }

    /// Dates in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the date column cannot be read back as dates.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        Ok(date_values(&self.frame, DATE_COLUMN)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Closes for `symbol` in date order, if it has a column.
    pub fn closes(&self, symbol: &str) -> Option<Vec<Option<f64>>> {
        if !self.symbols.iter().any(|s| s == symbol) {
            return None;
        }
        let values = self.frame.column(symbol).ok()?.as_materialized_series();
        values.f64().ok().map(|ca| ca.into_iter().collect())
    }
}

/// Layout detected in a provider table.
#[derive(Debug, PartialEq, Eq)]
enum RawShape {
    Long {
        date: String,
        symbol: String,
        close: String,
    },
    Single {
        date: String,
        close: String,
        symbol: String,
    },
    /// `(column name, symbol)` pairs holding closes.
    Wide {
        date: String,
        columns: Vec<(String, String)>,
    },
    Unusable,
}

impl RawShape {
    fn detect(df: &DataFrame, requested: &[String]) -> Self {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str().to_string())
            .collect();
        let find = |wanted: &str| {
            names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(wanted))
                .cloned()
        };

        let Some(date) = find(DATE_COLUMN) else {
            return Self::Unusable;
        };

        match (find(SYMBOL_COLUMN), find(CLOSE_COLUMN), requested) {
            (Some(symbol), Some(close), _) => return Self::Long { date, symbol, close },
            (None, Some(close), [only]) => {
                return Self::Single {
                    date,
                    close,
                    symbol: only.clone(),
                };
            }
            (None, Some(_), _) => return Self::Unusable,
            _ => {}
        }

        let hierarchical: Vec<(String, String)> = names
            .iter()
            .filter_map(|name| {
                let symbol = name.get(CLOSE_PREFIX.len()..)?;
                let prefix = name.get(..CLOSE_PREFIX.len())?;
                (!symbol.is_empty() && prefix.eq_ignore_ascii_case(CLOSE_PREFIX))
                    .then(|| (name.clone(), symbol.to_string()))
            })
            .collect();
        if !hierarchical.is_empty() {
            return Self::Wide {
                date,
                columns: hierarchical,
            };
        }

        let flat: Vec<(String, String)> = names
            .iter()
            .filter(|name| requested.contains(name))
            .map(|name| (name.clone(), name.clone()))
            .collect();
        if flat.is_empty() {
            Self::Unusable
        } else {
            Self::Wide {
                date,
                columns: flat,
            }
        }
    }

    /// Rewrite the table as `date`, `symbol`, `close` rows.
    fn into_long(self, df: &DataFrame) -> Result<Option<LazyFrame>> {
        let long = match self {
            Self::Long {
                date,
                symbol,
                close,
            } => df.clone().lazy().select([
                date_expr(&date),
                col(symbol.as_str())
                    .cast(DataType::String)
                    .alias(SYMBOL_COLUMN),
                close_expr(&close),
            ]),
            Self::Single {
                date,
                close,
                symbol,
            } => df.clone().lazy().select([
                date_expr(&date),
                lit(symbol.as_str()).alias(SYMBOL_COLUMN),
                close_expr(&close),
            ]),
            Self::Wide { date, columns } => {
                let frames: Vec<LazyFrame> = columns
                    .iter()
                    .map(|(column, symbol)| {
                        df.clone().lazy().select([
                            date_expr(&date),
                            lit(symbol.as_str()).alias(SYMBOL_COLUMN),
                            close_expr(column),
                        ])
                    })
                    .collect();
                concat(frames, UnionArgs::default())?
            }
            Self::Unusable => return Ok(None),
        };
        Ok(Some(long))
    }
}

fn date_expr(name: &str) -> Expr {
    col(name).cast(DataType::Date).alias(DATE_COLUMN)
}

/// Close as `Float64`, with NaN and infinities turned into nulls.
fn close_expr(name: &str) -> Expr {
    let close = col(name).cast(DataType::Float64);
    when(close.clone().is_finite())
        .then(close)
        .otherwise(lit(NULL))
        .alias(CLOSE_COLUMN)
}

/// Pivot long rows onto ascending dates, one column per symbol.
///
/// Only rows of `symbols` count towards the dates. When a date repeats for a
/// symbol the last non-null close wins.
fn pivot_closes(long: LazyFrame, symbols: &[String]) -> Result<DataFrame> {
    let requested_rows = symbols
        .iter()
        .map(|symbol| col(SYMBOL_COLUMN).eq(lit(symbol.as_str())))
        .reduce(|acc, next| acc.or(next))
        .unwrap_or_else(|| lit(false));
    let long = long.filter(col(DATE_COLUMN).is_not_null().and(requested_rows));

    let mut wide = long
        .clone()
        .select([col(DATE_COLUMN)])
        .unique(None, UniqueKeepStrategy::Any);
    for symbol in symbols {
        let closes = long
            .clone()
            .filter(col(SYMBOL_COLUMN).eq(lit(symbol.as_str())))
            .group_by([col(DATE_COLUMN)])
            .agg([col(CLOSE_COLUMN).drop_nulls().last().alias(symbol.as_str())]);
        wide = wide.left_join(closes, col(DATE_COLUMN), col(DATE_COLUMN));
    }

    let mut selection = vec![col(DATE_COLUMN)];
    selection.extend(symbols.iter().map(|symbol| col(symbol.as_str())));
    Ok(wide
        .select(selection)
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .collect()?)
}

fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let days = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(epoch_days_to_date))
        .collect())
}

/// Reshape a provider table into a [`CloseMatrix`] for `requested`.
///
/// An absent table, a table with zero rows, or a table in none of the
/// accepted layouts yields [`CloseMatrix::empty`]. Otherwise the matrix has
/// one column per requested symbol, in request order (a repeated symbol
/// keeps its first position); symbols the table does not mention get an
/// all-missing column. Non-finite closes are missing.
///
/// # Errors
///
/// Returns an error if polars cannot evaluate the reshaping query.
pub fn normalize_closes(raw: Option<&DataFrame>, requested: &[String]) -> Result<CloseMatrix> {
    let Some(df) = raw else {
        return Ok(CloseMatrix::empty());
    };
    if df.height() == 0 || requested.is_empty() {
        return Ok(CloseMatrix::empty());
    }

    let Some(long) = RawShape::detect(df, requested).into_long(df)? else {
        return Ok(CloseMatrix::empty());
    };

    let mut symbols: Vec<String> = Vec::with_capacity(requested.len());
    for symbol in requested {
        if !symbols.contains(symbol) {
            symbols.push(symbol.clone());
        }
    }

    let frame = pivot_closes(long, &symbols)?;
    if frame.height() == 0 {
        return Ok(CloseMatrix::empty());
    }
    Ok(CloseMatrix { frame, symbols })
}
