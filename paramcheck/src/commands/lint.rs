// paramcheck/src/commands/lint.rs
//
// USE CASE: Knowledge-base self check, before any data is read.

use std::path::PathBuf;

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, Table};
use paramcheck_core::application::lint_knowledge_base;

use super::load_project;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    println!("🧪 Linting knowledge base...");
    let (project, kb) = load_project(&project_dir)?;
    let report = lint_knowledge_base(&kb);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec!["Project", "Parameters", "Rules", "Defects", "Warnings"]);
    table.add_row(vec![
        Cell::new(&project.config.name),
        Cell::new(report.parameters),
        Cell::new(report.rules),
        Cell::new(report.defects.len()).fg(if report.is_clean() { Color::Green } else { Color::Red }),
        Cell::new(report.warnings.len()),
    ]);
    println!("{table}");

    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }

    if report.is_clean() {
        println!("✅ No defects.");
        return Ok(());
    }

    for defect in &report.defects {
        eprintln!("\n❌ {}", defect);
        eprintln!("{:?}", miette::Report::new(defect.error.clone()));
    }
    eprintln!("\n💥 {} defect(s) found.", report.defects.len());
    std::process::exit(1);
}
