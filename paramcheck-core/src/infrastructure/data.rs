// paramcheck-core/src/infrastructure/data.rs

use crate::domain::group::MoGroup;
use crate::error::ParamCheckError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::knowledge::csv_tables::finish;
use crate::infrastructure::table::Table;
use crate::ports::GroupSource;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

/// Exported MO data: one CSV file per MO, named after it, anywhere under `root`.
#[derive(Debug, Clone)]
pub struct CsvGroupSource {
    pub root: PathBuf,
    pub instance_keys: Vec<String>,
}

impl CsvGroupSource {
    pub fn new(root: impl Into<PathBuf>, instance_keys: Vec<String>) -> Self {
        Self {
            root: root.into(),
            instance_keys,
        }
    }

    fn read_table(&self, path: &Path, mo_name: &str) -> Result<Vec<MoGroup>, InfrastructureError> {
        let mut table = Table::open(path)?;

        let mut key_positions = Vec::with_capacity(self.instance_keys.len());
        let mut missing = Vec::new();
        for key in &self.instance_keys {
            match table.position(key) {
                Some(i) => key_positions.push(i),
                None => missing.push(key.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(InfrastructureError::MissingColumns {
                file: table.file.clone(),
                columns: missing,
            });
        }

        let parameter_columns: Vec<(usize, String)> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, h)| !key_positions.contains(i) && !h.is_empty())
            .map(|(i, h)| (i, h.clone()))
            .collect();

        let records: Vec<StringRecord> = table.records().collect::<Result<_, _>>()?;
        let groups: Vec<MoGroup> = records
            .iter()
            .map(|record| {
                let instance_key = key_positions
                    .iter()
                    .map(|&i| record.get(i).unwrap_or_default().trim())
                    .collect::<Vec<_>>()
                    .join("-");
                parameter_columns
                    .iter()
                    .filter_map(|(i, name)| {
                        let raw = record.get(*i)?.trim();
                        (!raw.is_empty()).then_some((name, raw))
                    })
                    .fold(MoGroup::new(mo_name, instance_key), |group, (name, raw)| {
                        group.with(name.as_str(), raw)
                    })
            })
            .collect();

        debug!(mo = mo_name, rows = groups.len(), "MO table read");
        Ok(groups)
    }
}

impl GroupSource for CsvGroupSource {
    #[instrument(skip(self), fields(root = ?self.root))]
    fn load_groups(&self) -> Result<Vec<MoGroup>, ParamCheckError> {
        if !self.root.is_dir() {
            return Err(InfrastructureError::ConfigError(format!(
                "data directory {:?} does not exist",
                self.root
            ))
            .into());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
            .collect();
        files.sort();

        let mut groups = Vec::new();
        for path in &files {
            let Some(mo_name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            groups.extend(self.read_table(path, mo_name)?);
        }

        info!(tables = files.len(), groups = groups.len(), "MO data loaded");
        Ok(groups)
    }
}

/// Writes one MO table, used to lay out sample data.
pub fn write_mo_table(
    path: &Path,
    columns: &[&str],
    rows: &[&[&str]],
) -> Result<(), InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(*row)?;
    }
    finish(path, writer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn keys() -> Vec<String> {
        vec!["f_site_id".into(), "f_cell_id".into()]
    }

    #[test]
    fn test_rows_become_groups() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("cells"))?;
        write_mo_table(
            &dir.path().join("cells").join("NRDUCELL.csv"),
            &["f_site_id", "f_cell_id", "小区半径", "带宽"],
            &[&["1", "1", "8000", ""], &["1", "2", " 7000 ", "100"]],
        )?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let groups = CsvGroupSource::new(dir.path(), keys()).load_groups()?;
        assert_eq!(
            groups,
            vec![
                MoGroup::new("NRDUCELL", "1-1").with("小区半径", "8000"),
                MoGroup::new("NRDUCELL", "1-2").with("小区半径", "7000").with("带宽", "100"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_instance_key_column() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("NRDUCELL.csv"), "f_site_id,小区半径\n1,8000\n")?;

        let err = CsvGroupSource::new(dir.path(), keys()).load_groups().unwrap_err();
        match err {
            ParamCheckError::Infrastructure(InfrastructureError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["f_cell_id"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_missing_data_dir() {
        let source = CsvGroupSource::new("/nonexistent/paramcheck-data", keys());
        assert!(source.load_groups().is_err());
    }
}
