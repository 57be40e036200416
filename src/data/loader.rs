// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads the mobile price dataset from disk into a Table.
//
// Format expectations:
//   - first line is a header with the column names
//   - every other non-blank line has exactly one cell per column
//   - every cell is a number; an empty cell, `NA` or `nan`
//     is stored as NaN so the mode imputer can fill it later
//
// The dataset is purely numeric and never quoted, so the
// loader splits on commas directly.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::error::PipelineError;
use crate::domain::record::{FEATURE_NAMES, LABEL_COLUMN};
use crate::domain::table::Table;
use crate::domain::traits::RecordSource;

/// Loads the labelled training CSV.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvLoader {
    fn load_table(&self) -> Result<Table> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read dataset '{}'", self.path.display()))?;

        let table = parse_csv(&self.path, &text)?;

        // Every feature plus the label must be present
        table.require_columns(&FEATURE_NAMES)?;
        table.require_columns(&[LABEL_COLUMN])?;

        tracing::info!(
            "Loaded {} records ({} columns) from '{}'",
            table.num_rows(),
            table.num_columns(),
            self.path.display()
        );
        Ok(table)
    }
}

/// Parse CSV text into a Table. `path` is only used in error messages.
pub fn parse_csv(path: &Path, text: &str) -> Result<Table, PipelineError> {
    let parse_err = |line: usize, message: String| PipelineError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| parse_err(1, "file is empty".to_string()))?;

    // Strip a UTF-8 byte order mark left by spreadsheet exports
    let header = header.trim_start_matches('\u{FEFF}');
    let names: Vec<String> = header.split(',').map(|h| h.trim().to_string()).collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() != names.len() {
            return Err(parse_err(
                line_no,
                format!("expected {} fields, found {}", names.len(), cells.len()),
            ));
        }
        for (col, cell) in columns.iter_mut().zip(cells) {
            col.push(parse_cell(cell).map_err(|m| parse_err(line_no, m))?);
        }
    }

    Table::from_columns(names.into_iter().zip(columns))
}

fn parse_cell(cell: &str) -> Result<f64, String> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_)  => Err(format!("'{cell}' is not a finite number")),
        Err(_) => Err(format!("'{cell}' is not a number")),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parses_header_and_rows() {
        let t = parse_csv(Path::new("x.csv"), "a,b\n1,2.5\n3,4\n").unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.column("b").unwrap(), &[2.5, 4.0]);
    }

    #[test]
    fn test_blank_cells_become_nan() {
        let t = parse_csv(Path::new("x.csv"), "a,b\r\n1,\r\nNA,4\r\n\r\n").unwrap();
        assert!(t.column("b").unwrap()[0].is_nan());
        assert!(t.column("a").unwrap()[1].is_nan());
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn test_bad_cell_reports_line() {
        let err = parse_csv(Path::new("x.csv"), "a,b\n1,2\n3,oops\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_infinite_cells_rejected() {
        for cell in ["inf", "-inf", "Infinity"] {
            let err = parse_csv(Path::new("x.csv"), &format!("a,ram\n1,2\n3,{cell}\n")).unwrap_err();
            assert!(matches!(err, PipelineError::Parse { line: 3, .. }), "{cell}");
        }
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = parse_csv(Path::new("x.csv"), "a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_loader_requires_schema_columns() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "ram,price_range").unwrap();
        writeln!(f, "2549,1").unwrap();
        let err = CsvLoader::new(f.path()).load_table().unwrap_err();
        let missing = err.downcast_ref::<PipelineError>();
        assert!(matches!(missing, Some(PipelineError::MissingColumn(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let loader = CsvLoader::new("definitely/not/here.csv");
        assert!(loader.load_table().is_err());
    }
}
