//! Line-list Loader Module
//! Loads the case table from a spreadsheet workbook (calamine) or a CSV export
//! (Polars), checks the column schema and hands the raw text frame to the
//! normalizer.

use crate::config::{ColumnSchema, DashboardConfig};
use crate::data::normalizer::Normalizer;
use crate::data::record::CaseTable;
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Workbook has no worksheet: {0}")]
    NoWorksheet(PathBuf),
    #[error("Missing expected column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: missing patient id")]
    MissingPatientId { row: usize },
    #[error("Row {row}: unparseable announcement date {value:?}")]
    InvalidDate { row: usize, value: String },
}

/// File extensions read as spreadsheet workbooks; anything else is CSV.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Loads the case table from the line-list workbook or its CSV export.
pub struct DataLoader {
    schema: ColumnSchema,
    normalizer: Normalizer,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl DataLoader {
    pub fn new(schema: ColumnSchema, normalizer: Normalizer) -> Self {
        Self { schema, normalizer }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            config.columns.clone(),
            Normalizer::new(&config.date_format, config.date_policy),
        )
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Load and normalize a workbook or CSV file. Any error aborts the whole load.
    pub fn load(&self, file_path: &Path) -> Result<CaseTable, LoadError> {
        let df = self.read_table(file_path)?;
        tracing::info!(
            "read {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        self.check_schema(&df)?;

        let table = self.normalizer.normalize_frame(&df, &self.schema)?;
        tracing::info!(
            "normalized {} records ({} coercion warnings)",
            table.len(),
            table.warnings().len()
        );
        Ok(table)
    }

    /// Pick the reader by file extension.
    pub fn read_table(&self, file_path: &Path) -> Result<DataFrame, LoadError> {
        if is_workbook(file_path) {
            Self::read_workbook(file_path, self.normalizer.date_format())
        } else {
            Self::read_csv(file_path)
        }
    }

    /// Read the first worksheet into an all-text frame. The first row is the
    /// header; empty cells become nulls and date cells are written back in
    /// `date_format` so the normalizer parses them like CSV text.
    pub fn read_workbook(file_path: &Path, date_format: &str) -> Result<DataFrame, LoadError> {
        if !file_path.is_file() {
            return Err(LoadError::NotFound(file_path.to_path_buf()));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoadError::NoWorksheet(file_path.to_path_buf()))??;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(DataFrame::empty());
        };
        let names: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell_text(cell, date_format) {
                Some(name) => name,
                None => format!("column_{}", i + 1),
            })
            .collect();

        let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for row in rows {
            for (i, column) in values.iter_mut().enumerate() {
                column.push(row.get(i).and_then(|cell| cell_text(cell, date_format)));
            }
        }

        let columns: Vec<Column> = names
            .iter()
            .zip(values)
            .map(|(name, column)| Column::new(name.as_str().into(), column))
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Read every column as text; coercion is left to the normalizer.
    pub fn read_csv(file_path: &Path) -> Result<DataFrame, LoadError> {
        if !file_path.is_file() {
            return Err(LoadError::NotFound(file_path.to_path_buf()));
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Fail on the first expected column absent from the frame.
    pub fn check_schema(&self, df: &DataFrame) -> Result<(), LoadError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        match self
            .schema
            .names()
            .into_iter()
            .find(|name| !present.iter().any(|p| p == *name))
        {
            Some(missing) => Err(LoadError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|w| w.eq_ignore_ascii_case(ext))
        })
}

/// Text of one worksheet cell, `None` for empty and error cells.
fn cell_text(cell: &Data, date_format: &str) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Some(value.format(date_format).to_string()),
            None => Some(dt.as_f64().to_string()),
        },
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Patient Number,Date Announced,Detected State,Age Bracket,Gender,Type of transmission,Current Status";

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", body).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_and_normalizes_rows() {
        let file = write_csv(&format!(
            "{HEADER}\n1,30/01/2020,Kerala,20,F,Imported,Recovered\n2,02/02/2020,,,,,Hospitalized\n"
        ));
        let table = DataLoader::default().load(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        let second = &table.records()[1];
        assert_eq!(second.detected_state, "NA");
        assert_eq!(second.gender, "NA");
        assert_eq!(second.transmission, "NA");
        assert_eq!(second.current_status, "Hospitalized");
    }

    #[test]
    fn extra_columns_are_ignored() {
        let file = write_csv(&format!(
            "State Patient Number,{HEADER},Notes\nKL-1,1,30/01/2020,Kerala,20,F,Imported,Recovered,travelled\n"
        ));
        let table = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].detected_state, "Kerala");
    }

    #[test]
    fn missing_column_is_fatal() {
        let file = write_csv("Patient Number,Date Announced\n1,30/01/2020\n");
        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Detected State"));
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::default()
            .load(&dir.path().join("nope.csv"))
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn bad_date_aborts_strict_load() {
        let file = write_csv(&format!(
            "{HEADER}\n1,30/01/2020,Kerala,20,F,Imported,Recovered\n2,31/02/2020,Delhi,45,M,Local,Recovered\n"
        ));
        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn workbook_extensions_pick_the_workbook_reader() {
        assert!(is_workbook(Path::new("covidIndia.xlsx")));
        assert!(is_workbook(Path::new("legacy.XLS")));
        assert!(!is_workbook(Path::new("covidIndia.csv")));
        assert!(!is_workbook(Path::new("no_extension")));
    }

    #[test]
    fn cells_become_text() {
        assert_eq!(cell_text(&Data::Empty, "%d/%m/%Y"), None);
        assert_eq!(cell_text(&Data::Float(20.0), "%d/%m/%Y").as_deref(), Some("20"));
        assert_eq!(cell_text(&Data::Int(7), "%d/%m/%Y").as_deref(), Some("7"));
        assert_eq!(
            cell_text(&Data::String("Kerala".into()), "%d/%m/%Y").as_deref(),
            Some("Kerala")
        );
    }

    #[test]
    fn corrupt_workbook_is_fatal() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        write!(file, "not a zip archive").unwrap();
        file.flush().unwrap();
        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Workbook(_)));
    }

    #[test]
    fn header_only_file_yields_empty_table() {
        let file = write_csv(&format!("{HEADER}\n"));
        let table = DataLoader::default().load(file.path()).unwrap();
        assert!(table.is_empty());
    }
}
