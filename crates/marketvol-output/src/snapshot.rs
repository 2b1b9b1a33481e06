//! Snapshot written at the end of a refresh run.

use crate::record::ResultRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Run metadata stored alongside the records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// When the run started.
    pub generated_at_utc: DateTime<Utc>,

    /// Market-data provider name.
    pub source: String,

    /// Sampling interval (e.g. "1d").
    pub interval: String,

    /// Lookback requested from the provider (e.g. "400d").
    pub lookback: String,

    /// Annualization constant.
    pub trading_days: u32,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
}

/// Snapshot of one refresh run.
///
/// Immutable once built; `count` is derived from the records, including when
/// a snapshot is read back from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredSnapshot")]
pub struct Snapshot {
    #[serde(serialize_with = "serialize_timestamp")]
    generated_at_utc: DateTime<Utc>,
    source: String,
    interval: String,
    lookback: String,
    trading_days: u32,
    count: usize,
    data: Vec<ResultRecord>,
}

/// Snapshot as found on disk. The stored `count` is ignored.
#[derive(Deserialize)]
struct StoredSnapshot {
    generated_at_utc: DateTime<Utc>,
    source: String,
    interval: String,
    lookback: String,
    trading_days: u32,
    data: Vec<ResultRecord>,
}

impl From<StoredSnapshot> for Snapshot {
    fn from(stored: StoredSnapshot) -> Self {
        Self::new(
            SnapshotMeta {
                generated_at_utc: stored.generated_at_utc,
                source: stored.source,
                interval: stored.interval,
                lookback: stored.lookback,
                trading_days: stored.trading_days,
            },
            stored.data,
        )
    }
}

impl Snapshot {
    /// Build a snapshot from run metadata and ordered records.
    pub fn new(meta: SnapshotMeta, data: Vec<ResultRecord>) -> Self {
        Self {
            generated_at_utc: meta.generated_at_utc,
            source: meta.source,
            interval: meta.interval,
            lookback: meta.lookback,
            trading_days: meta.trading_days,
            count: data.len(),
            data,
        }
    }

    /// When the run started.
    pub const fn generated_at_utc(&self) -> DateTime<Utc> {
        self.generated_at_utc
    }

    /// Provider name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sampling interval.
    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// Lookback label.
    pub fn lookback(&self) -> &str {
        &self.lookback
    }

    /// Annualization constant.
    pub const fn trading_days(&self) -> u32 {
        self.trading_days
    }

    /// Number of records.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Records in run order.
    pub fn records(&self) -> &[ResultRecord] {
        &self.data
    }
}
