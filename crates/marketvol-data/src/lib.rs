#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/marketvol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod close;
pub mod error;
pub mod fetch;
pub mod yahoo;

pub use close::{CloseMatrix, DATE_COLUMN, normalize_closes};
pub use error::{DataError, Result};
pub use fetch::{BatchFetcher, FetchOptions};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
