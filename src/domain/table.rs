// ============================================================
// Layer 3 — Table
// ============================================================
// A minimal column-oriented numeric table. Every column has
// the same number of rows; missing cells are stored as NaN.

use crate::domain::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name:   String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    /// Fails if the columns do not all have the same length.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Vec<f64>)>,
    ) -> Result<Self, PipelineError> {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column, or replace it if the name already exists
    pub fn push_column(
        &mut self,
        name:   impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), PipelineError> {
        let name = name.into();
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(PipelineError::ColumnLengthMismatch {
                    column:   name,
                    expected: first.values.len(),
                    actual:   values.len(),
                });
            }
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<&[f64], PipelineError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Vec<f64>, PipelineError> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.values)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Fail on the first name that is not a column of this table
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<(), PipelineError> {
        for name in names {
            if !self.has_column(name.as_ref()) {
                return Err(PipelineError::MissingColumn(name.as_ref().to_string()));
            }
        }
        Ok(())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// New table containing the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name:   c.name.clone(),
                values: indices.iter().map(|&i| c.values[i]).collect(),
            })
            .collect();
        Table { columns }
    }

    /// Row-major `f32` matrix of the named columns, for the model.
    pub fn to_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f32>, PipelineError> {
        let cols: Vec<&[f64]> = names
            .iter()
            .map(|n| self.column(n.as_ref()))
            .collect::<Result<_, _>>()?;

        let rows = self.num_rows();
        let mut out = Vec::with_capacity(rows * cols.len());
        for r in 0..rows {
            out.extend(cols.iter().map(|c| c[r] as f32));
        }
        Ok(out)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns([("a", vec![1.0, 2.0, 3.0]), ("b", vec![4.0, 5.0, 6.0])]).unwrap()
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let t = sample();
        assert!(matches!(t.column("zzz"), Err(PipelineError::MissingColumn(n)) if n == "zzz"));
        assert!(t.require_columns(&["a", "c"]).is_err());
        assert!(t.require_columns(&["a", "b"]).is_ok());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut t = sample();
        let err = t.push_column("c", vec![1.0]).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnLengthMismatch { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn test_push_existing_column_replaces() {
        let mut t = sample();
        t.push_column("a", vec![9.0, 9.0, 9.0]).unwrap();
        assert_eq!(t.num_columns(), 2);
        assert_eq!(t.column("a").unwrap(), &[9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_matrix_is_row_major() {
        let t = sample();
        assert_eq!(t.to_matrix(&["b", "a"]).unwrap(), vec![4.0, 1.0, 5.0, 2.0, 6.0, 3.0]);
    }

    #[test]
    fn test_select_rows() {
        let t = sample().select_rows(&[2, 0]);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.column("a").unwrap(), &[3.0, 1.0]);
    }
}
