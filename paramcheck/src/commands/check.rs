// paramcheck/src/commands/check.rs
//
// USE CASE: Validate the exported MO data of a project.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use paramcheck_core::application::{ValidationDriver, ValidationReport, ValidationScope, lint_knowledge_base};
use paramcheck_core::domain::knowledge::CheckKind;
use paramcheck_core::domain::project::ReportFormat;
use paramcheck_core::infrastructure::data::CsvGroupSource;
use paramcheck_core::infrastructure::report::write_report;
use paramcheck_core::ports::GroupSource;

use super::load_project;

pub fn execute(
    project_dir: PathBuf,
    mo: Option<String>,
    instance: Option<String>,
    format: Option<ReportFormat>,
    strict: bool,
) -> anyhow::Result<()> {
    // A. Knowledge base
    println!("⚙️  Loading project...");
    let (project, kb) = load_project(&project_dir)?;
    println!(
        "   Project: {} ({} parameters, {} rules)",
        project.config.name,
        kb.parameter_count(),
        kb.rule_count()
    );
    let lint = lint_knowledge_base(&kb);
    if !lint.is_clean() {
        eprintln!(
            "⚠️  {} knowledge-base defect(s), affected rules will be reported as diagnostics. Run 'paramcheck lint'.",
            lint.defects.len()
        );
    }

    // B. MO data
    let data_dir = project.data_dir();
    let groups = CsvGroupSource::new(&data_dir, project.config.instance_keys.clone())
        .load_groups()
        .with_context(|| format!("Failed to read MO data from {:?}", data_dir))?;
    println!("   Data: {} MO instance row(s) in {}", groups.len(), data_dir.display());

    // C. Validation
    let scope = ValidationScope {
        instance_scope: project.config.instance_scope,
        mo,
        instance,
    };
    let report = ValidationDriver::new(&kb).validate_all(&groups, &scope);

    // D. Output
    let format = format.unwrap_or(project.config.report.format);
    let report_path = project.report_path();
    write_report(&report, &report_path, format)
        .with_context(|| format!("Failed to write report to {:?}", report_path))?;

    for finding in &report.findings {
        println!("   ❌ {}", finding);
        for command in &finding.fix_commands {
            println!("      ↳ {}", command);
        }
    }
    for diagnostic in &report.diagnostics {
        eprintln!("   ⚠️  {}", diagnostic);
    }
    println!("{}", summary_table(&report));
    println!("📄 Report ({}) saved to {}", format, report_path.display());

    if report.has_findings() {
        if strict || project.config.strict {
            eprintln!(
                "\n💥 strict mode: failing on {} finding(s).",
                report.findings.len()
            );
            std::process::exit(1);
        }
    } else {
        println!("✨ No findings.");
    }

    Ok(())
}

fn summary_table(report: &ValidationReport) -> Table {
    let mut per_mo: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for finding in &report.findings {
        let counts = per_mo.entry(finding.mo_name.as_str()).or_default();
        match finding.check_kind {
            CheckKind::Misconfiguration => counts.0 += 1,
            CheckKind::MissingConfiguration => counts.1 += 1,
        }
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["MO", "Misconfigurations", "Missing configurations"]);
    for (mo, (mis, missing)) in &per_mo {
        table.add_row(vec![
            Cell::new(mo),
            count_cell(*mis, Color::Red),
            count_cell(*missing, Color::Yellow),
        ]);
    }
    let stats = &report.stats;
    table.add_row(vec![
        Cell::new(format!(
            "TOTAL ({} instances, {} groups, {} rules run)",
            stats.instances, stats.groups, stats.rules_executed
        ))
        .add_attribute(Attribute::Bold),
        count_cell(stats.misconfigurations, Color::Red).add_attribute(Attribute::Bold),
        count_cell(stats.missing_configurations, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

fn count_cell(count: usize, color: Color) -> Cell {
    let cell = Cell::new(count).set_alignment(CellAlignment::Right);
    if count > 0 { cell.fg(color) } else { cell }
}
