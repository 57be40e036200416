// ============================================================
// Layer 4 — Cleaned CSV Writer
// ============================================================
// Writes a Table back to disk as CSV after cleaning, so the
// cleaned dataset can be inspected next to the model.
//
// Integral values are written without a decimal point (2549,
// not 2549.0) so the file diffs cleanly against the source.
// NaN is written as an empty cell, matching what the loader
// accepts.

use anyhow::{Context, Result};
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use crate::domain::table::Table;

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let file = fs::File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);

    let header: Vec<&str> = table.column_names().collect();
    writeln!(out, "{}", header.join(","))?;

    let columns = table.columns();
    for row in 0..table.num_rows() {
        let cells: Vec<String> = columns.iter().map(|c| format_cell(c.values[row])).collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()?;

    tracing::info!(
        "Wrote {} cleaned rows to '{}'",
        table.num_rows(),
        path.display()
    );
    Ok(())
}

fn format_cell(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    #[test]
    fn test_written_file_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/clean.csv");
        let t = Table::from_columns([("ram", vec![2549.0, f64::NAN]), ("m_dep", vec![0.6, 1.0])])
            .unwrap();

        write_csv(&t, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ram,m_dep\n2549,0.6\n,1\n");
        let back = parse_csv(&path, &text).unwrap();
        assert!(back.column("ram").unwrap()[1].is_nan());
    }
}
