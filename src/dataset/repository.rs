// src/dataset/repository.rs

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use tracing::info;

use super::{load_records, utils::sanitize_filename, EnrollmentRecord, RawTable};

/// Storage of record for the enrollment dataset.
pub trait DatasetRepository: Send + Sync {
    /// Every cleaned record currently stored, in file order.
    fn load(&self) -> Result<Vec<EnrollmentRecord>>;

    /// Append an uploaded CSV batch onto the stored dataset.
    fn append_csv(&self, file_name: &str, contents: &[u8]) -> Result<AppendSummary>;
}

/// Outcome of a successful append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendSummary {
    /// Name the raw upload was saved under, inside the data directory.
    pub saved_as: String,
    pub rows_appended: usize,
    pub total_rows: usize,
}

/// Upload rejections a caller may want to tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The file name does not end in `.csv`.
    #[error("only CSV files are allowed, got `{0}`")]
    NotCsv(String),
    /// The bytes could not be read as a table with a header row.
    #[error("upload is not a readable CSV table: {0}")]
    Invalid(String),
}

/// Dataset kept as a single CSV file inside `data_dir`.
///
/// Appends rewrite the whole file (tmp + rename) under a single-writer lock.
/// Readers never lock and always see either the old or the new file.
pub struct CsvDatasetRepository {
    data_dir: PathBuf,
    master_path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvDatasetRepository {
    /// Construct a repository at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>, master_file: &str) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating data directory {:?}", &data_dir))?;
        let master_path = data_dir.join(master_file);
        Ok(Self {
            data_dir,
            master_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn master_path(&self) -> &Path {
        &self.master_path
    }

    /// Pick the name the raw upload is saved under; never the master file itself.
    fn upload_name(&self, file_name: &str) -> String {
        let name = sanitize_filename(file_name);
        let name = if name.is_empty() {
            "upload.csv".to_string()
        } else {
            name
        };
        let master = self
            .master_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name == master {
            format!("upload_{}", name)
        } else {
            name
        }
    }
}

impl DatasetRepository for CsvDatasetRepository {
    fn load(&self) -> Result<Vec<EnrollmentRecord>> {
        load_records(self.master_path())
    }

    fn append_csv(&self, file_name: &str, contents: &[u8]) -> Result<AppendSummary> {
        // 1) only `.csv` names are accepted
        if !file_name.ends_with(".csv") {
            return Err(UploadError::NotCsv(file_name.to_string()).into());
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("dataset write lock poisoned"))?;

        // 2) the upload must be a table with a header row
        let batch = RawTable::from_reader(contents)
            .map_err(|e| UploadError::Invalid(format!("{:#}", e)))?;
        if batch.is_empty() {
            return Err(UploadError::Invalid("no header row".to_string()).into());
        }
        let rows_appended = batch.rows.len();

        // 3) keep the raw upload next to the dataset
        let saved_as = self.upload_name(file_name);
        let saved_path = self.data_dir.join(&saved_as);
        fs::write(&saved_path, contents)
            .with_context(|| format!("saving upload to {}", saved_path.display()))?;

        // 4) concatenate onto the current master, if any
        let combined = match RawTable::read(&self.master_path)? {
            Some(master) if !master.is_empty() => master.concat(batch),
            _ => batch,
        };
        let total_rows = combined.rows.len();

        // 5) swap the new master into place
        combined.write_atomic(&self.master_path)?;

        info!(
            upload = %saved_as,
            rows_appended,
            total_rows,
            "appended upload to dataset"
        );
        Ok(AppendSummary {
            saved_as,
            rows_appended,
            total_rows,
        })
    }
}
