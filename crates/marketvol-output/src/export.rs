//! Export functionality for snapshots.
//!
//! JSON is the primary output; the CSV mirror carries the same flat records
//! without the run metadata. Missing numbers are `null` in JSON and empty
//! cells in CSV.

use crate::record::ResultRecord;
use crate::snapshot::Snapshot;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, directory creation or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn records_to_csv(records: &[ResultRecord]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if records.is_empty() {
        wtr.write_record([
            "symbol",
            "name",
            "price",
            "vol_annual",
            "vol_semiannual",
            "vol_quarterly",
            "vol_monthly",
            "vol_weekly",
        ])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    let data = String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?)?;
    Ok(data)
}

impl Exporter for [ResultRecord] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Snapshot {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(self.records()),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotMeta;
    use chrono::{TimeZone, Utc};
    use marketvol_volatility::VolatilityFigures;

    fn records() -> Vec<ResultRecord> {
        vec![
            ResultRecord::new(
                "PETR4.SA",
                "Petrobras (PN)",
                Some(38.5),
                VolatilityFigures {
                    annual: Some(0.31),
                    semiannual: Some(0.29),
                    quarterly: Some(0.27),
                    monthly: Some(0.22),
                    weekly: Some(0.18),
                },
            ),
            ResultRecord::missing("PCAR3.SA", "Pão de Açúcar"),
        ]
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            SnapshotMeta {
                generated_at_utc: Utc.with_ymd_and_hms(2024, 6, 3, 21, 15, 0).unwrap(),
                source: "yfinance".to_string(),
                interval: "1d".to_string(),
                lookback: "400d".to_string(),
                trading_days: 252,
            },
            records(),
        )
    }

    #[test]
    fn test_records_export_csv() {
        let csv = records().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "symbol,name,price,vol_annual,vol_semiannual,vol_quarterly,vol_monthly,vol_weekly"
        );
        assert_eq!(
            lines.next().unwrap(),
            "PETR4.SA,Petrobras (PN),38.5,0.31,0.29,0.27,0.22,0.18"
        );
        assert_eq!(lines.next().unwrap(), "PCAR3.SA,Pão de Açúcar,,,,,,");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_records_csv_has_header() {
        let csv = Vec::<ResultRecord>::new()
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        assert!(csv.starts_with("symbol,name,price"));
    }

    #[test]
    fn test_snapshot_export_json() {
        let json = snapshot().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"count\":2"));
        assert!(json.contains("\"price\":null"));
        assert!(json.contains("Pão de Açúcar"));
    }

    #[test]
    fn test_snapshot_export_pretty_json() {
        let json = snapshot().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\n  \"source\": \"yahoo_finance\""));
    }

    #[test]
    fn test_snapshot_csv_omits_metadata() {
        let csv = snapshot().export_to_string(ExportFormat::Csv).unwrap();
        assert!(!csv.contains("yfinance"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_export_to_file_creates_directories() {
        let dir = std::env::temp_dir()
            .join(format!("marketvol-export-{}", std::process::id()))
            .join("data");
        let path = dir.join("marketdata.json");

        snapshot()
            .export_to_file(&path, ExportFormat::PrettyJson)
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["count"], 2);

        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
