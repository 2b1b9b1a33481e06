//! Refresh run configuration.

use crate::pipeline::PipelineError;
use marketvol_data::FetchOptions;
use marketvol_volatility::DEFAULT_TRADING_DAYS;
use std::path::PathBuf;

/// Symbols per provider request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "data/marketdata.json";

/// Settings for one refresh run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Options forwarded to the batch fetcher
    pub fetch: FetchOptions,
    /// Annualization constant (default: 252)
    pub trading_days: u32,
    /// Symbols per batch (default: 100)
    pub batch_size: usize,
    /// JSON snapshot path
    pub output_path: PathBuf,
    /// Optional CSV mirror path; `None` disables the mirror
    pub csv_path: Option<PathBuf>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            trading_days: DEFAULT_TRADING_DAYS,
            batch_size: DEFAULT_BATCH_SIZE,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            csv_path: None,
        }
    }
}

impl SnapshotConfig {
    /// Reject settings that would make the run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for a zero batch size or zero
    /// trading days, and [`PipelineError::Data`] for invalid fetch options.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.trading_days == 0 {
            return Err(PipelineError::InvalidConfig(
                "trading days must be at least 1".to_string(),
            ));
        }
        self.fetch.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.trading_days, 252);
        assert_eq!(config.fetch.lookback_label(), "400d");
        assert_eq!(config.output_path, PathBuf::from("data/marketdata.json"));
        assert!(config.csv_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = SnapshotConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_fetch_options_rejected() {
        let mut config = SnapshotConfig::default();
        config.fetch.lookback_days = 0;
        assert!(matches!(config.validate(), Err(PipelineError::Data(_))));
    }
}
