#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/marketvol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod record;
pub mod snapshot;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter};
pub use record::{PRICE_DECIMALS, ResultRecord, VOLATILITY_DECIMALS, round_to};
pub use snapshot::{Snapshot, SnapshotMeta};
pub use summary::SnapshotSummary;
