//! Batched refresh pipeline.
//!
//! Symbols are processed sequentially in fixed-size batches. A batch whose
//! fetch fails, whose response holds no usable closes, or whose volatility
//! query fails is recorded as all-missing records and the run moves on;
//! nothing is retried. Only writing the snapshot can fail the run.

use crate::assemble::{assemble_batch, missing_batch};
use crate::config::SnapshotConfig;
use crate::universe::Universe;
use chrono::{DateTime, Utc};
use marketvol_data::{BatchFetcher, DataError, normalize_closes};
use marketvol_output::{
    ExportError, ExportFormat, Exporter, ResultRecord, Snapshot, SnapshotMeta, SnapshotSummary,
};
use marketvol_volatility::{VolatilityConfig, VolatilityEngine, VolatilityError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that stop a refresh run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Run settings rejected before any fetch
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid fetch options
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Volatility engine could not be configured
    #[error("Volatility error: {0}")]
    Volatility(#[from] VolatilityError),

    /// Snapshot could not be written
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// What happened to one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The provider answered with usable closes.
    Fetched {
        /// Zero-based batch index
        index: usize,
        /// Symbols in the batch
        symbols: usize,
        /// Symbols that ended up with a price
        priced: usize,
    },
    /// The batch fell back to all-missing records.
    Failed {
        /// Zero-based batch index
        index: usize,
        /// Symbols in the batch
        symbols: usize,
        /// Why the batch was dropped
        reason: String,
    },
}

impl BatchOutcome {
    /// Symbols in the batch.
    pub const fn symbols(&self) -> usize {
        match self {
            Self::Fetched { symbols, .. } | Self::Failed { symbols, .. } => *symbols,
        }
    }

    /// True for a batch that fell back to missing records.
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Assembled snapshot
    pub snapshot: Snapshot,
    /// One outcome per batch, in batch order
    pub outcomes: Vec<BatchOutcome>,
}

impl PipelineRun {
    /// Number of batches that fell back to missing records.
    pub fn failed_batches(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Counts for the closing report.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary::from_records(self.snapshot.records(), self.failed_batches())
    }
}

/// Drives fetch, normalization, volatility and assembly over a universe.
#[derive(Debug)]
pub struct SnapshotPipeline<'a, F, U> {
    fetcher: &'a F,
    universe: &'a U,
    config: &'a SnapshotConfig,
    engine: VolatilityEngine,
}

impl<'a, F: BatchFetcher, U: Universe> SnapshotPipeline<'a, F, U> {
    /// Create a pipeline after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(fetcher: &'a F, universe: &'a U, config: &'a SnapshotConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let engine = VolatilityEngine::new(VolatilityConfig {
            trading_days: config.trading_days,
        })?;
        Ok(Self {
            fetcher,
            universe,
            config,
            engine,
        })
    }

    /// Registry symbols split into batches, in registry order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.universe
            .symbols()
            .chunks(self.config.batch_size)
            .map(<[String]>::to_vec)
            .collect()
    }

    /// Fetch and evaluate one batch. Never fails: problems become missing records.
    pub async fn process_batch(
        &self,
        index: usize,
        batch: &[String],
    ) -> (Vec<ResultRecord>, BatchOutcome) {
        let fallback = |reason: String| {
            warn!(batch = index, symbols = batch.len(), %reason, "batch failed, recording nulls");
            (
                missing_batch(self.universe, batch),
                BatchOutcome::Failed {
                    index,
                    symbols: batch.len(),
                    reason,
                },
            )
        };

        let raw = match self.fetcher.fetch_batch(batch, &self.config.fetch).await {
            Ok(raw) => raw,
            Err(e) => return fallback(e.to_string()),
        };

        let closes = match normalize_closes(Some(&raw), batch) {
            Ok(closes) if !closes.is_empty() => closes,
            Ok(_) => return fallback("response held no close prices".to_string()),
            Err(e) => return fallback(e.to_string()),
        };

        let computed = match self.engine.compute(&closes) {
            Ok(computed) => computed,
            Err(e) => return fallback(e.to_string()),
        };
        let records = assemble_batch(self.universe, batch, &computed);
        let priced = records.iter().filter(|r| r.price.is_some()).count();
        debug!(
            batch = index,
            symbols = batch.len(),
            priced,
            dates = closes.n_dates(),
            "batch processed"
        );

        (
            records,
            BatchOutcome::Fetched {
                index,
                symbols: batch.len(),
                priced,
            },
        )
    }

    /// Process every batch and assemble the snapshot.
    ///
    /// `on_batch` is called after each batch, in order.
    pub async fn run(
        &self,
        generated_at_utc: DateTime<Utc>,
        mut on_batch: impl FnMut(&BatchOutcome),
    ) -> PipelineRun {
        let mut records = Vec::new();
        let mut outcomes = Vec::new();

        for (index, batch) in self.batches().iter().enumerate() {
            let (batch_records, outcome) = self.process_batch(index, batch).await;
            records.extend(batch_records);
            on_batch(&outcome);
            outcomes.push(outcome);
        }

        let meta = SnapshotMeta {
            generated_at_utc,
            source: self.fetcher.source().to_string(),
            interval: self.config.fetch.interval.clone(),
            lookback: self.config.fetch.lookback_label(),
            trading_days: self.config.trading_days,
        };

        PipelineRun {
            snapshot: Snapshot::new(meta, records),
            outcomes,
        }
    }

    /// Write the JSON snapshot and, when configured, the CSV mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be written.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), PipelineError> {
        write_snapshot(snapshot, self.config)
    }
}

/// Write `snapshot` to the paths in `config`.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn write_snapshot(snapshot: &Snapshot, config: &SnapshotConfig) -> Result<(), PipelineError> {
    snapshot.export_to_file(&config.output_path, ExportFormat::PrettyJson)?;
    info!(
        path = %config.output_path.display(),
        records = snapshot.count(),
        "wrote snapshot"
    );

    if let Some(csv_path) = &config.csv_path {
        snapshot.export_to_file(csv_path, ExportFormat::Csv)?;
        info!(path = %csv_path.display(), "wrote csv mirror");
    }

    Ok(())
}
