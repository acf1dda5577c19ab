// paramcheck-core/src/application/report.rs

use crate::application::executor::ExecutionOutcome;
use crate::domain::finding::{EngineDiagnostic, ValidationError};
use crate::domain::knowledge::CheckKind;
use crate::domain::project::ReportFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub instances: usize,
    pub groups: usize,
    pub rules_executed: usize,
    pub misconfigurations: usize,
    pub missing_configurations: usize,
    pub aborted_groups: usize,
}

/// Aggregated output of a validation run: findings and diagnostics on
/// separate channels.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub findings: Vec<ValidationError>,
    pub diagnostics: Vec<EngineDiagnostic>,
    pub stats: RunStats,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            findings: Vec::new(),
            diagnostics: Vec::new(),
            stats: RunStats::default(),
        }
    }
}

impl ValidationReport {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    pub(crate) fn absorb(&mut self, outcome: ExecutionOutcome) {
        let stats = &mut self.stats;
        stats.groups += 1;
        stats.rules_executed += outcome.rules_executed();
        if outcome.aborted {
            stats.aborted_groups += 1;
        }
        for finding in &outcome.findings {
            match finding.check_kind {
                CheckKind::Misconfiguration => stats.misconfigurations += 1,
                CheckKind::MissingConfiguration => stats.missing_configurations += 1,
            }
        }
        self.findings.extend(outcome.findings);
        self.diagnostics.extend(outcome.diagnostics);
    }

    /// One line per finding, fix commands indented below it, then diagnostics.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# paramcheck report ({})",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        for finding in &self.findings {
            let _ = writeln!(out, "{}", finding);
            for command in &finding.fix_commands {
                let _ = writeln!(out, "    {}", command);
            }
        }
        if !self.diagnostics.is_empty() {
            let _ = writeln!(out, "# diagnostics");
            for diag in &self.diagnostics {
                let _ = writeln!(out, "{}", diag);
            }
        }
        let _ = writeln!(
            out,
            "# {} instance(s), {} group(s), {} rule(s) executed, {} misconfiguration(s), {} missing configuration(s), {} aborted",
            self.stats.instances,
            self.stats.groups,
            self.stats.rules_executed,
            self.stats.misconfigurations,
            self.stats.missing_configurations,
            self.stats.aborted_groups
        );
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => self.to_json(),
        }
    }
}
