// src/dataset/table.rs

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Read},
    path::Path,
};

/// A delimited table kept as raw strings, exactly as it sits on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// One `Vec` per data row. Short rows are allowed; missing cells read as absent.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse a header row plus data rows from any reader.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr);

        let headers: Vec<String> = rdr
            .headers()
            .context("reading CSV header row")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // a zero-byte input yields a single empty header
        if headers.iter().all(String::is_empty) {
            return Ok(Self::default());
        }

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Read the table at `path`. A missing file is `Ok(None)`.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("opening dataset {}", path.display()))
            }
        };
        let table =
            Self::from_reader(file).with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(table))
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Index of the first column called `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Stack `other` beneath `self`.
    ///
    /// Columns are `self`'s followed by any of `other`'s not yet present.
    /// Cells missing on either side are left empty. Nothing is deduplicated.
    pub fn concat(self, other: RawTable) -> RawTable {
        let mut headers = self.headers;
        for h in &other.headers {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
        let width = headers.len();

        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        for mut row in self.rows {
            row.resize(width, String::new());
            rows.push(row);
        }

        // position of each output column within `other`
        let mapping: Vec<Option<usize>> = headers
            .iter()
            .map(|h| other.headers.iter().position(|o| o == h))
            .collect();
        for row in other.rows {
            rows.push(
                mapping
                    .iter()
                    .map(|m| m.and_then(|i| row.get(i).cloned()).unwrap_or_default())
                    .collect(),
            );
        }

        RawTable { headers, rows }
    }

    /// Write atomically: to a tmp file beside `path`, then rename over it.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("dataset.csv");
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("creating {}", tmp_path.display()))?;
            let mut wtr = WriterBuilder::new()
                .flexible(true)
                .from_writer(BufWriter::new(file));
            wtr.write_record(&self.headers)
                .context("writing CSV header row")?;
            for row in &self.rows {
                wtr.write_record(row).context("writing CSV row")?;
            }
            wtr.flush().context("flushing CSV writer")?;
        }

        fs::rename(&tmp_path, path).with_context(|| {
            format!("renaming {} -> {}", tmp_path.display(), path.display())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table(text: &str) -> RawTable {
        RawTable::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_headers_and_rows() {
        let t = table("year, code ,num_of_enrollees\n2021,BSIT,10\n2022,BSCS\n");
        assert_eq!(t.headers, vec!["year", "code", "num_of_enrollees"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1], vec!["2022", "BSCS"]);
        assert_eq!(t.column("code"), Some(1));
        assert_eq!(t.column("coursename"), None);
    }

    #[test]
    fn test_empty_input_is_empty_table() {
        let t = table("");
        assert!(t.is_empty());
        assert!(t.rows.is_empty());
    }

    #[test]
    fn test_concat_unions_columns() {
        let master = table("year,code,num_of_enrollees\n2021,BSIT,10\n");
        let upload = table("code,year,num_of_enrollees,campus\nBSCS,2022,20,Main\n");
        let merged = master.concat(upload);

        assert_eq!(
            merged.headers,
            vec!["year", "code", "num_of_enrollees", "campus"]
        );
        assert_eq!(merged.rows[0], vec!["2021", "BSIT", "10", ""]);
        assert_eq!(merged.rows[1], vec!["2022", "BSCS", "20", "Main"]);
    }

    #[test]
    fn test_concat_keeps_duplicates() {
        let a = table("year,code\n2021,BSIT\n");
        let b = table("year,code\n2021,BSIT\n");
        assert_eq!(a.concat(b).rows.len(), 2);
    }

    #[test]
    fn test_write_atomic_then_read() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("master_dataset.csv");
        let t = table("year,code,coursename\n2021,BSIT,\"Info, Tech\"\n");

        t.write_atomic(&path)?;
        let back = RawTable::read(&path)?.expect("file was just written");
        assert_eq!(back, t);

        // no tmp file left behind
        let leftovers: Vec<_> = fs::read_dir(dir.path())?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_missing_file() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(RawTable::read(&dir.path().join("nope.csv"))?, None);
        Ok(())
    }
}
