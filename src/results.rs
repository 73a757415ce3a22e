use crate::fit::StiffnessFit;
use crate::selection::Selection;

use chrono::{DateTime, Local};
use csv::Writer;

use std::error::Error;
use std::fs::File;
use std::path::Path;

/// One confirmed sample's fit statistics, as exported.
#[derive(Clone, Debug)]
pub struct FitRecord {
    pub sample_id: String,
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
    pub r2: f64,
    pub se_slope: f64,
    pub se_intercept: f64,
    pub p_value: f64,
    pub n: usize,
    /// The producing index range, kept for plot export; not an exported
    /// column.
    pub selection: Selection,
}

impl FitRecord {
    pub fn from_fit(sample_id: &str, fit: &StiffnessFit) -> Self {
        Self {
            sample_id: sample_id.to_owned(),
            slope: fit.model.slope,
            intercept: fit.model.intercept,
            r: fit.r,
            r2: fit.r2,
            se_slope: fit.se_slope,
            se_intercept: fit.se_intercept,
            p_value: fit.p_value,
            n: fit.n,
            selection: fit.selection,
        }
    }
}

/// Append-only table of confirmed fits, at most one row per sample.
#[derive(Debug, Default)]
pub struct ResultsTable {
    rows: Vec<FitRecord>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn push(&mut self, record: FitRecord) {
        if self.contains_id(&record.sample_id) {
            eprintln!("Sample '{}' already has a fitted row, keeping the first", record.sample_id);
            return;
        }
        self.rows.push(record);
    }

    pub fn contains_id(&self, sample_id: &str) -> bool {
        self.rows.iter().any(|r| r.sample_id == sample_id)
    }

    pub fn rows(&self) -> &[FitRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let mut wtr = Writer::from_writer(File::create(path)?);

        wtr.write_record([
            "sample_id",
            "slope",
            "intercept",
            "r",
            "r2",
            "se_slope",
            "se_intercept",
            "p_value",
            "n",
        ])?;

        for row in &self.rows {
            wtr.write_record(&[
                row.sample_id.clone(),
                row.slope.to_string(),
                row.intercept.to_string(),
                row.r.to_string(),
                row.r2.to_string(),
                row.se_slope.to_string(),
                row.se_intercept.to_string(),
                row.p_value.to_string(),
                row.n.to_string(),
            ])?;
        }

        wtr.flush()?;
        println!("Results written to {}", path.display());
        Ok(())
    }
}

pub fn export_filename(now: DateTime<Local>) -> String {
    format!("stiffness_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

pub fn fitted_summary(fitted: usize, total: usize) -> String {
    format!("{} out of {} curves fitted", fitted, total)
}

#[cfg(test)]
mod tests {
    use super::{export_filename, fitted_summary, FitRecord, ResultsTable};
    use crate::fit::StiffnessFit;
    use crate::selection::Selection;

    use chrono::{Local, TimeZone};

    fn record(id: &str) -> FitRecord {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit =
            StiffnessFit::from_xy(&x, &y, Selection { start_idx: 0, end_idx: 4 }).unwrap();
        FitRecord::from_fit(id, &fit)
    }

    #[test]
    fn test_one_row_per_sample() {
        let mut table = ResultsTable::new();
        table.push(record("A1"));
        table.push(record("A1"));
        table.push(record("B2"));

        assert_eq!(table.len(), 2);
        assert!(table.contains_id("A1"));
        assert!(table.contains_id("B2"));
    }

    #[test]
    fn test_csv_row_count_matches_confirmed() {
        let mut table = ResultsTable::new();
        table.push(record("A1"));
        table.push(record("A2"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        table.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert!(lines[0].starts_with("sample_id,slope,intercept,r,r2"));
        assert!(lines[1].starts_with("A1,2,1,"));
    }

    #[test]
    fn test_export_filename_embeds_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 14, 30, 5).unwrap();
        assert_eq!(export_filename(now), "stiffness_20240307_143005.csv");
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(fitted_summary(2, 3), "2 out of 3 curves fitted");
    }
}
