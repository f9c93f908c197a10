use std::fs;
use std::path::{Path, PathBuf};
use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::errors::{HeatmapError, Result};
use crate::pipeline::HeatmapAnalysis;

/// Per-image summary written to the severity CSV and JSON reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub path: PathBuf,
    /// Label as given by the caller
    pub diagnosis: String,
    pub severity: f64,
    pub lesion_coverage: f64,
    pub leaf_coverage: f64,
    pub width: u32,
    pub height: u32,
}

impl ScanRecord {
    pub fn from_analysis(path: &Path, label: &str, analysis: &HeatmapAnalysis) -> Self {
        let (width, height) = analysis.working_image.dimensions();
        Self {
            path: path.to_path_buf(),
            diagnosis: label.to_string(),
            severity: analysis.severity,
            lesion_coverage: analysis.lesion_coverage,
            leaf_coverage: analysis.mask.coverage(),
            width,
            height,
        }
    }
}

/// Write one row per processed image to `<output_dir>/severity.csv`
pub fn write_severity_csv<P: AsRef<Path>>(records: &[ScanRecord], output_dir: P) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join("severity.csv");

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "Path",
        "Diagnosis",
        "Severity",
        "Lesion_Coverage",
        "Leaf_Coverage",
        "Width",
        "Height",
    ])?;

    for record in records {
        writer.write_record(&[
            record.path.display().to_string(),
            record.diagnosis.clone(),
            format!("{:.6}", record.severity),
            format!("{:.6}", record.lesion_coverage),
            format!("{:.6}", record.leaf_coverage),
            record.width.to_string(),
            record.height.to_string(),
        ])?;
    }

    writer.flush().map_err(|e| HeatmapError::CsvOutput(csv::Error::from(e)))?;

    Ok(output_path)
}

/// Write a pretty-printed JSON report to `<report_dir>/<filename>.json`
pub fn write_report_json<P: AsRef<Path>>(record: &ScanRecord, report_dir: P, filename: &str) -> Result<PathBuf> {
    let report_dir = report_dir.as_ref();
    fs::create_dir_all(report_dir)?;

    let output_path = report_dir.join(format!("{}.json", filename));
    let content = serde_json::to_string_pretty(record)?;
    fs::write(&output_path, content)?;

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_record(name: &str, severity: f64) -> ScanRecord {
        ScanRecord {
            path: PathBuf::from(format!("leaves/{}.png", name)),
            diagnosis: "Late Blight".to_string(),
            severity,
            lesion_coverage: 0.25,
            leaf_coverage: 0.6,
            width: 320,
            height: 240,
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let dir = tempdir().unwrap();
        let records = vec![sample_record("a", 0.5), sample_record("b", 0.125)];
        let path = write_severity_csv(&records, dir.path()).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Path,Diagnosis,Severity"));
        assert!(lines[2].contains("0.125000"));
    }

    #[test]
    fn json_report_reads_back() {
        let dir = tempdir().unwrap();
        let record = sample_record("leaf", 0.42);
        let path = write_report_json(&record, dir.path().join("reports"), "leaf").unwrap();

        let parsed: ScanRecord = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, record);
    }
}
