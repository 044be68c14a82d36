// src/dataset/mod.rs

pub mod repository;
pub mod table;
pub mod utils;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub use repository::{AppendSummary, CsvDatasetRepository, DatasetRepository, UploadError};
pub use table::RawTable;

pub const YEAR_COLUMN: &str = "year";
pub const CODE_COLUMN: &str = "code";
pub const COURSE_NAME_COLUMN: &str = "coursename";
pub const ENROLLEES_COLUMN: &str = "num_of_enrollees";

/// Largest year magnitude a row may carry.
pub const MAX_YEAR: i64 = 9_999;
/// Largest enrollee count magnitude a row may carry. Keeps every per-year
/// or per-course sum exact in `i64` for any table that fits in memory.
pub const MAX_ENROLLEES: i64 = 1_000_000_000;

/// One cleaned row of the enrollment dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub year: i64,
    pub course_code: String,
    pub course_name: String,
    pub num_enrollees: i64,
}

impl EnrollmentRecord {
    pub fn new(year: i64, course_code: &str, course_name: &str, num_enrollees: i64) -> Self {
        Self {
            year,
            course_code: course_code.to_string(),
            course_name: course_name.to_string(),
            num_enrollees,
        }
    }
}

/// Coerce a raw table into records.
///
/// Rows whose year or enrollee count is not numeric, or lies outside
/// `MAX_YEAR` / `MAX_ENROLLEES`, are dropped. An empty
/// table gives no records; a non-empty table without the required columns is an error.
pub fn records_from_table(table: &RawTable) -> Result<Vec<EnrollmentRecord>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let mut idx = [0usize; 4];
    for (slot, name) in idx.iter_mut().zip([
        YEAR_COLUMN,
        CODE_COLUMN,
        COURSE_NAME_COLUMN,
        ENROLLEES_COLUMN,
    ]) {
        match table.column(name) {
            Some(i) => *slot = i,
            None => bail!("dataset is missing required column `{}`", name),
        }
    }
    let [year_i, code_i, name_i, count_i] = idx;

    fn cell(row: &[String], i: usize) -> &str {
        row.get(i).map(String::as_str).unwrap_or("")
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let year = utils::coerce_int(cell(row, year_i)).filter(|y| y.abs() <= MAX_YEAR);
        let count =
            utils::coerce_int(cell(row, count_i)).filter(|n| n.abs() <= MAX_ENROLLEES);
        if let (Some(year), Some(num_enrollees)) = (year, count) {
            records.push(EnrollmentRecord {
                year,
                course_code: utils::clean_str(cell(row, code_i)),
                course_name: utils::clean_str(cell(row, name_i)),
                num_enrollees,
            });
        }
    }

    let dropped = table.rows.len() - records.len();
    if dropped > 0 {
        debug!(dropped, kept = records.len(), "dropped rows with non-numeric or out-of-range year or count");
    }
    Ok(records)
}

/// Load and clean the dataset at `path`. A missing file is an empty dataset.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_records(path: &Path) -> Result<Vec<EnrollmentRecord>> {
    match RawTable::read(path)? {
        Some(table) => records_from_table(&table),
        None => {
            debug!("no dataset file yet");
            Ok(Vec::new())
        }
    }
}
