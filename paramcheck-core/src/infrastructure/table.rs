// paramcheck-core/src/infrastructure/table.rs
//
// Header-driven CSV access shared by the knowledge-base and MO-data readers.

use crate::infrastructure::error::InfrastructureError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// A known column and the header spellings accepted for it.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

impl Column {
    pub const fn required(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: false,
        }
    }

    fn matches(&self, header: &str) -> bool {
        header == self.name || self.aliases.contains(&header)
    }
}

/// An open CSV file with its headers resolved.
pub struct Table {
    pub file: String,
    pub headers: Vec<String>,
    reader: csv::Reader<File>,
}

impl Table {
    pub fn open(path: &Path) -> Result<Self, InfrastructureError> {
        let file = File::open(path).map_err(|e| InfrastructureError::file_access(path, e))?;
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Ok(Self {
            file: path.display().to_string(),
            headers,
            reader,
        })
    }

    pub fn position(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Maps each known column to its index; fails listing every required
    /// column that is absent.
    pub fn resolve(&self, columns: &[Column]) -> Result<ColumnIndex, InfrastructureError> {
        let mut index = HashMap::new();
        let mut missing = Vec::new();
        for column in columns {
            match self.headers.iter().position(|h| column.matches(h)) {
                Some(i) => {
                    index.insert(column.name, i);
                }
                None if column.required => missing.push(column.name.to_string()),
                None => {}
            }
        }
        if !missing.is_empty() {
            return Err(InfrastructureError::MissingColumns {
                file: self.file.clone(),
                columns: missing,
            });
        }
        Ok(ColumnIndex(index))
    }

    pub fn records(&mut self) -> impl Iterator<Item = Result<StringRecord, csv::Error>> + '_ {
        self.reader.records()
    }
}

pub struct ColumnIndex(HashMap<&'static str, usize>);

impl ColumnIndex {
    /// Trimmed cell content, `None` when the column is absent or the cell empty.
    pub fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let i = *self.0.get(column)?;
        record.get(i).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn text(&self, record: &StringRecord, column: &str) -> String {
        self.cell(record, column).unwrap_or_default().to_string()
    }
}

/// 1-based line of a record, header included.
pub fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    const COLUMNS: &[Column] = &[
        Column::required("mo_name", &["MO名称"]),
        Column::optional("description", &["描述"]),
    ];

    #[test]
    fn test_bom_and_aliases_are_resolved() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.csv");
        fs::write(&path, "\u{feff}MO名称, 描述 \n NRDUCELL ,\n")?;

        let mut table = Table::open(&path)?;
        let index = table.resolve(COLUMNS)?;
        let records: Vec<StringRecord> = table.records().collect::<Result<_, _>>()?;
        assert_eq!(index.cell(&records[0], "mo_name"), Some("NRDUCELL"));
        assert_eq!(index.cell(&records[0], "description"), None);
        assert_eq!(line_of(&records[0]), 2);
        Ok(())
    }

    #[test]
    fn test_missing_required_column() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.csv");
        fs::write(&path, "description\nx\n")?;

        let err = Table::open(&path)?.resolve(COLUMNS).err().unwrap();
        match err {
            InfrastructureError::MissingColumns { columns, .. } => assert_eq!(columns, vec!["mo_name"]),
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }
}
