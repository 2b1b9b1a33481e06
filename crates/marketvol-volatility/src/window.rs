//! Trailing windows used for volatility figures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named trailing window of log-return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityWindow {
    /// Entire available history (not a fixed 252-row window)
    Annual,

    /// 126 trading days
    Semiannual,

    /// 63 trading days
    Quarterly,

    /// 21 trading days
    Monthly,

    /// 5 trading days
    Weekly,
}

impl VolatilityWindow {
    /// Returns all windows, longest first.
    pub const fn all() -> [Self; 5] {
        [
            Self::Annual,
            Self::Semiannual,
            Self::Quarterly,
            Self::Monthly,
            Self::Weekly,
        ]
    }

    /// Number of most recent rows in the window; `None` means all rows.
    pub const fn length(self) -> Option<usize> {
        match self {
            Self::Annual => None,
            Self::Semiannual => Some(126),
            Self::Quarterly => Some(63),
            Self::Monthly => Some(21),
            Self::Weekly => Some(5),
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Semiannual => "semiannual",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }

    /// Field name used in snapshot records.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Annual => "vol_annual",
            Self::Semiannual => "vol_semiannual",
            Self::Quarterly => "vol_quarterly",
            Self::Monthly => "vol_monthly",
            Self::Weekly => "vol_weekly",
        }
    }
}

impl fmt::Display for VolatilityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.length() {
            Some(rows) => write!(f, "{} ({rows}d)", self.name()),
            None => write!(f, "{} (full history)", self.name()),
        }
    }
}
