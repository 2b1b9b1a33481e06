//! Per-symbol result records.

use marketvol_volatility::{VolatilityFigures, VolatilityWindow};
use serde::{Deserialize, Serialize};

/// Decimal places kept for prices.
pub const PRICE_DECIMALS: i32 = 6;

/// Decimal places kept for volatility figures.
pub const VOLATILITY_DECIMALS: i32 = 8;

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// One row of the snapshot.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    /// Ticker symbol.
    pub symbol: String,

    /// Display name from the registry, or the symbol itself.
    pub name: String,

    /// Last known close.
    pub price: Option<f64>,

    /// Whole-history annualized volatility.
    pub vol_annual: Option<f64>,

    /// 126-day annualized volatility.
    pub vol_semiannual: Option<f64>,

    /// 63-day annualized volatility.
    pub vol_quarterly: Option<f64>,

    /// 21-day annualized volatility.
    pub vol_monthly: Option<f64>,

    /// 5-day annualized volatility.
    pub vol_weekly: Option<f64>,
}

impl ResultRecord {
    /// Create a record, rounding the price and every present figure.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: Option<f64>,
        figures: VolatilityFigures,
    ) -> Self {
        let figures = figures.map(|v| round_to(v, VOLATILITY_DECIMALS));
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price: price.map(|p| round_to(p, PRICE_DECIMALS)),
            vol_annual: figures.annual,
            vol_semiannual: figures.semiannual,
            vol_quarterly: figures.quarterly,
            vol_monthly: figures.monthly,
            vol_weekly: figures.weekly,
        }
    }

    /// A record with every numeric field missing.
    pub fn missing(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(symbol, name, None, VolatilityFigures::missing())
    }

    /// Volatility figure for `window`.
    pub const fn volatility(&self, window: VolatilityWindow) -> Option<f64> {
        match window {
            VolatilityWindow::Annual => self.vol_annual,
            VolatilityWindow::Semiannual => self.vol_semiannual,
            VolatilityWindow::Quarterly => self.vol_quarterly,
            VolatilityWindow::Monthly => self.vol_monthly,
            VolatilityWindow::Weekly => self.vol_weekly,
        }
    }

    /// True when no numeric field is present.
    pub fn is_missing(&self) -> bool {
        self.price.is_none()
            && VolatilityWindow::all()
                .into_iter()
                .all(|window| self.volatility(window).is_none())
    }
}
