use crate::{Error, Result};
use indexmap::IndexMap;

/// In-memory tabular dataset of categorical columns.
///
/// Columns keep insertion order; a cell is `None` when the value is missing.
/// All columns must have the same length.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: IndexMap<String, Vec<Option<String>>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (0 for a dataset with no columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Adds a column. Every column after the first must match the row count.
    /// An existing column with the same name is replaced.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        cells: Vec<Option<String>>,
    ) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && cells.len() != self.row_count() {
            return Err(Error::ColumnLengthMismatch {
                name,
                len: cells.len(),
                expected: self.row_count(),
            });
        }
        self.columns.insert(name, cells);
        Ok(())
    }

    /// Convenience for columns where every cell is present.
    pub fn push_filled_column<I, S>(&mut self, name: impl Into<String>, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_column(
            name,
            cells.into_iter().map(|s| Some(s.into())).collect(),
        )
    }

    pub fn column(&self, name: &str) -> Result<&[Option<String>]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingColumn {
                name: name.to_string(),
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_keep_insertion_order() {
        let mut data = Dataset::new();
        data.push_filled_column("zeta", ["a", "b"]).unwrap();
        data.push_filled_column("alpha", ["c", "d"]).unwrap();
        let names: Vec<_> = data.column_names().collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(data.row_count(), 2);
    }

    #[test]
    fn mismatched_column_length_is_rejected() {
        let mut data = Dataset::new();
        data.push_filled_column("a", ["x", "y", "z"]).unwrap();
        let err = data.push_column("b", vec![Some("u".into())]).unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnLengthMismatch {
                len: 1,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn missing_column_lookup_fails() {
        let data = Dataset::new();
        assert!(matches!(
            data.column("nope").unwrap_err(),
            Error::MissingColumn { .. }
        ));
    }
}
