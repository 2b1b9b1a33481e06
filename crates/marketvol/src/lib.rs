#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/marketvol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assemble;
pub mod config;
pub mod pipeline;
pub mod universe;

// Re-export main types from sub-crates
pub use marketvol_data as data;
pub use marketvol_output as output;
pub use marketvol_volatility as volatility;

pub use config::SnapshotConfig;
pub use pipeline::{BatchOutcome, PipelineError, PipelineRun, SnapshotPipeline};
pub use universe::{B3Universe, Constituent, Universe};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
