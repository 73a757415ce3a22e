use regex::Regex;
use serde::{Deserialize, Serialize};

use std::error::Error;
use std::fs;
use std::path::Path;

/// Spreadsheet headers that map onto the canonical sample columns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnNames {
    pub test_time: String,
    pub force: String,
    pub deflection: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            test_time: "Prüfzeit".to_owned(),
            force: "Standardkraft".to_owned(),
            deflection: "Verformung".to_owned(),
        }
    }
}

/// How to read a bending-test workbook. The defaults mirror the testing
/// machine's export layout: a title row, the header on the second row, two
/// unit rows below it, sheets named like "A1"/"B12" per specimen.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderConfig {
    pub sheet_pattern: String,
    pub columns: ColumnNames,
    pub header_row: usize,
    pub skip_rows: Vec<usize>,
    pub decimal_comma: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            sheet_pattern: "^[A-Z]\\d+$".to_owned(),
            columns: ColumnNames::default(),
            header_row: 1,
            skip_rows: vec![2, 3],
            decimal_comma: true,
        }
    }
}

impl LoaderConfig {
    pub fn sheet_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&self.sheet_pattern)
    }

    pub fn is_data_row(&self, row_idx: usize) -> bool {
        row_idx > self.header_row && !self.skip_rows.contains(&row_idx)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        let parsed: Self = serde_json::from_str(&content)?;
        Ok(parsed)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
