// paramcheck-core/src/infrastructure/report.rs

use crate::application::report::ValidationReport;
use crate::domain::project::ReportFormat;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use std::path::Path;
use tracing::info;

pub fn write_report(
    report: &ValidationReport,
    path: &Path,
    format: ReportFormat,
) -> Result<(), InfrastructureError> {
    atomic_write(path, report.render(format)?)?;
    info!(path = ?path, %format, findings = report.findings.len(), "Report written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::finding::ValidationError;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_report_formats_on_disk() -> Result<()> {
        let dir = tempdir()?;
        let report = ValidationReport {
            findings: vec![ValidationError::missing_data("NRDUCELL", "1-1")],
            ..ValidationReport::default()
        };

        let text = dir.path().join("out/report.txt");
        write_report(&report, &text, ReportFormat::Text)?;
        assert!(fs::read_to_string(&text)?.contains("[SYSTEM][missing-configuration][NRDUCELL/1-1]"));

        let json = dir.path().join("out/report.json");
        write_report(&report, &json, ReportFormat::Json)?;
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json)?)?;
        assert_eq!(value["findings"][0]["rule_id"], "SYSTEM");
        Ok(())
    }
}
