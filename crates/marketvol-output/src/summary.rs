//! Run summary.

use crate::record::ResultRecord;
use std::fmt;

/// Counts reported at the end of a refresh run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// Records written.
    pub total: usize,
    /// Records with a price.
    pub priced: usize,
    /// Records with whole-history volatility.
    pub with_volatility: usize,
    /// Batches that fell back to missing records.
    pub failed_batches: usize,
}

impl SnapshotSummary {
    /// Summarize `records`.
    pub fn from_records(records: &[ResultRecord], failed_batches: usize) -> Self {
        Self {
            total: records.len(),
            priced: records.iter().filter(|r| r.price.is_some()).count(),
            with_volatility: records.iter().filter(|r| r.vol_annual.is_some()).count(),
            failed_batches,
        }
    }
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tickers | prices OK: {} | vols OK: {} | failed batches: {}",
            self.total, self.priced, self.with_volatility, self.failed_batches
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketvol_volatility::VolatilityFigures;

    #[test]
    fn test_summary_counts() {
        let records = vec![
            ResultRecord::new(
                "PETR4.SA",
                "Petrobras (PN)",
                Some(38.5),
                VolatilityFigures {
                    annual: Some(0.3),
                    ..VolatilityFigures::missing()
                },
            ),
            ResultRecord::new("RAIZ4.SA", "Raízen", Some(2.1), VolatilityFigures::missing()),
            ResultRecord::missing("AXIA7.SA", "Axia"),
        ];

        let summary = SnapshotSummary::from_records(&records, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.priced, 2);
        assert_eq!(summary.with_volatility, 1);
        assert_eq!(
            summary.to_string(),
            "3 tickers | prices OK: 2 | vols OK: 1 | failed batches: 1"
        );
    }
}
