// paramcheck-core/src/infrastructure/knowledge/csv_tables.rs

use crate::domain::knowledge::{
    CheckKind, KnowledgeBase, LogicalRelation, ParameterDefinition, ParameterType, ValidationRule,
};
use crate::error::ParamCheckError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::table::{Column, ColumnIndex, Table, line_of};
use crate::ports::KnowledgeSource;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, instrument, warn};

const PARAMETER_COLUMNS: &[Column] = &[
    Column::required("mo_name", &["MO名称"]),
    Column::optional("mo_description", &["MO描述"]),
    Column::optional("scenario", &["场景类型"]),
    Column::required("parameter_name", &["参数名称"]),
    Column::optional("parameter_id", &["参数ID"]),
    Column::optional("parameter_type", &["参数类型"]),
    Column::optional("parameter_meaning", &["参数含义"]),
    Column::optional("value_description", &["值描述"]),
];

const RULE_COLUMNS: &[Column] = &[
    Column::required("rule_id", &["规则ID"]),
    Column::required("mo_name", &["MO名称"]),
    Column::required("check_kind", &["校验类型"]),
    Column::required("parameter_combination", &["参数组合"]),
    Column::optional("expected_value", &["期望值"]),
    Column::optional("filter_condition", &["筛选条件"]),
    Column::optional("logical_relation", &["逻辑关系"]),
    Column::optional("execution_order", &["执行顺序"]),
    Column::optional("subsequent_rule", &["后续规则"]),
    Column::optional("description", &["描述"]),
];

/// Knowledge base stored as two tables: parameter definitions and rules.
#[derive(Debug, Clone)]
pub struct CsvKnowledgeSource {
    pub parameters: PathBuf,
    pub rules: PathBuf,
}

impl CsvKnowledgeSource {
    pub fn new(parameters: impl Into<PathBuf>, rules: impl Into<PathBuf>) -> Self {
        Self {
            parameters: parameters.into(),
            rules: rules.into(),
        }
    }
}

impl KnowledgeSource for CsvKnowledgeSource {
    #[instrument(skip(self), fields(parameters = ?self.parameters, rules = ?self.rules))]
    fn load(&self) -> Result<KnowledgeBase, ParamCheckError> {
        let definitions = read_parameter_definitions(&self.parameters)?;
        let rules = read_validation_rules(&self.rules)?;
        info!(
            parameters = definitions.len(),
            rules = rules.len(),
            "Knowledge base loaded"
        );
        Ok(KnowledgeBase::new(definitions, rules)?)
    }
}

fn parse_cell<T: FromStr<Err = String>>(
    table: &Table,
    index: &ColumnIndex,
    record: &StringRecord,
    column: &str,
) -> Result<T, InfrastructureError> {
    T::from_str(index.cell(record, column).unwrap_or_default()).map_err(|reason| {
        InfrastructureError::InvalidCell {
            file: table.file.clone(),
            line: line_of(record),
            column: column.to_string(),
            reason,
        }
    })
}

pub fn read_parameter_definitions(path: &Path) -> Result<Vec<ParameterDefinition>, InfrastructureError> {
    let mut table = Table::open(path)?;
    let index = table.resolve(PARAMETER_COLUMNS)?;
    let records: Vec<StringRecord> = table.records().collect::<Result<_, _>>()?;

    let mut definitions = Vec::with_capacity(records.len());
    for record in &records {
        // Blank separator rows are common in hand-edited sheets.
        if index.cell(record, "mo_name").is_none() && index.cell(record, "parameter_name").is_none() {
            continue;
        }
        let parameter_type: ParameterType = parse_cell(&table, &index, record, "parameter_type")?;
        definitions.push(ParameterDefinition {
            mo_name: index.text(record, "mo_name"),
            mo_description: index.text(record, "mo_description"),
            scenario: index.text(record, "scenario"),
            parameter_name: index.text(record, "parameter_name"),
            parameter_id: index.text(record, "parameter_id"),
            parameter_type,
            parameter_meaning: index.text(record, "parameter_meaning"),
            value_description: index.text(record, "value_description"),
        });
    }
    Ok(definitions)
}

pub fn read_validation_rules(path: &Path) -> Result<Vec<ValidationRule>, InfrastructureError> {
    let mut table = Table::open(path)?;
    let index = table.resolve(RULE_COLUMNS)?;
    let records: Vec<StringRecord> = table.records().collect::<Result<_, _>>()?;

    let mut rules = Vec::with_capacity(records.len());
    for record in &records {
        let Some(rule_id) = index.cell(record, "rule_id") else {
            continue;
        };
        let check_kind: CheckKind = parse_cell(&table, &index, record, "check_kind")?;
        let logical_relation: LogicalRelation = parse_cell(&table, &index, record, "logical_relation")?;

        let execution_order = match index.cell(record, "execution_order") {
            None => 1,
            Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
                warn!(rule = rule_id, value = raw, "Invalid execution order, using 1");
                1
            }),
        };

        rules.push(ValidationRule {
            rule_id: rule_id.to_string(),
            mo_name: index.text(record, "mo_name"),
            check_kind,
            parameter_combination: index.text(record, "parameter_combination"),
            expected_value: index.text(record, "expected_value"),
            filter_condition: index.cell(record, "filter_condition").map(str::to_string),
            logical_relation,
            execution_order,
            subsequent_rule: index.cell(record, "subsequent_rule").map(str::to_string),
            description: index.text(record, "description"),
        });
    }
    Ok(rules)
}

// --- WRITERS ---
// Headers are written in the Chinese spelling used by the exported sheets.

pub fn write_parameter_definitions(
    path: &Path,
    definitions: &[ParameterDefinition],
) -> Result<(), InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PARAMETER_COLUMNS.iter().map(|c| c.aliases[0]))?;
    for d in definitions {
        writer.write_record([
            d.mo_name.as_str(),
            &d.mo_description,
            &d.scenario,
            &d.parameter_name,
            &d.parameter_id,
            d.parameter_type.as_str(),
            &d.parameter_meaning,
            &d.value_description,
        ])?;
    }
    finish(path, writer)
}

pub fn write_validation_rules(path: &Path, rules: &[ValidationRule]) -> Result<(), InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(RULE_COLUMNS.iter().map(|c| c.aliases[0]))?;
    for r in rules {
        writer.write_record([
            r.rule_id.as_str(),
            &r.mo_name,
            r.check_kind.as_str(),
            &r.parameter_combination,
            &r.expected_value,
            r.filter_condition.as_deref().unwrap_or_default(),
            &r.logical_relation.to_string(),
            &r.execution_order.to_string(),
            r.subsequent_rule.as_deref().unwrap_or_default(),
            &r.description,
        ])?;
    }
    finish(path, writer)
}

pub(crate) fn finish(path: &Path, writer: csv::Writer<Vec<u8>>) -> Result<(), InfrastructureError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| InfrastructureError::Io(e.into_error()))?;
    atomic_write(path, bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::sample;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sample_knowledge_survives_the_csv_files() -> Result<()> {
        let dir = tempdir()?;
        let (definitions, rules) = sample::knowledge();
        let params = dir.path().join("parameters.csv");
        let rule_file = dir.path().join("rules.csv");
        write_parameter_definitions(&params, &definitions)?;
        write_validation_rules(&rule_file, &rules)?;

        assert_eq!(read_parameter_definitions(&params)?, definitions);
        assert_eq!(read_validation_rules(&rule_file)?, rules);

        let kb = CsvKnowledgeSource::new(&params, &rule_file).load()?;
        assert_eq!(kb.rule_count(), 6);
        Ok(())
    }

    #[test]
    fn test_english_headers_and_lenient_cells() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rules.csv");
        fs::write(
            &path,
            "rule_id,mo_name,check_kind,parameter_combination,expected_value,execution_order,logical_relation\n\
             R1,NRDUCELL,错配,radius,8000,first,or\n\
             ,,,,,,\n\
             R2,NRDUCELL,missing,radius,,,\n",
        )?;
        let rules = read_validation_rules(&path)?;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].execution_order, 1);
        assert_eq!(rules[0].logical_relation, LogicalRelation::Or);
        assert_eq!(rules[0].filter_condition, None);
        assert_eq!(rules[1].check_kind, CheckKind::MissingConfiguration);
        assert_eq!(rules[1].logical_relation, LogicalRelation::And);
        Ok(())
    }

    #[test]
    fn test_unknown_check_kind_points_at_the_cell() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rules.csv");
        fs::write(
            &path,
            "规则ID,MO名称,校验类型,参数组合\nR1,NRDUCELL,whatever,radius\n",
        )?;
        match read_validation_rules(&path).unwrap_err() {
            InfrastructureError::InvalidCell { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "check_kind");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_missing_rule_columns() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rules.csv");
        fs::write(&path, "规则ID,MO名称\nR1,NRDUCELL\n")?;
        match read_validation_rules(&path).unwrap_err() {
            InfrastructureError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["check_kind", "parameter_combination"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }
}
