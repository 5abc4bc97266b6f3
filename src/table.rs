//! Cross-tabulation of phenotype categories against genotype categories
//!
//! Imagine the following table of 20 patients
//! ```text
//!                    || Allele count 0 | Allele count 1 |
//! =======================================================
//! HP:0012648 Yes     ||              9 |              1 |
//! HP:0012648 No      ||              1 |              9 |
//! ```
//! Rows are the categories of the phenotype classifier, columns the
//! categories of the genotype classifier. The cells are stored row-major.
use std::fmt::Display;

use crate::clf::PatientCategory;
use crate::{GpError, GpResult};

/// An `R x C` matrix of patient counts
///
/// # Examples
///
/// ```
/// use genophenocorr::ContingencyTable;
///
/// let table = ContingencyTable::from_rows(&[[2, 1, 0], [3, 0, 2]]).unwrap();
/// assert_eq!(table.dim(), (2, 3));
/// assert_eq!(table.get(1, 2), Some(2));
/// assert_eq!(table.row_sums(), vec![3, 5]);
/// assert_eq!(table.col_sums(), vec![5, 1, 2]);
/// assert_eq!(table.total(), 8);
///
/// for row in table.rows() {
///     assert_eq!(row.len(), 3);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyTable {
    row_name: String,
    col_name: String,
    row_categories: Vec<PatientCategory>,
    col_categories: Vec<PatientCategory>,
    data: Vec<u32>,
}

impl ContingencyTable {
    /// Constructs a table with all cells set to zero
    ///
    /// # Errors
    ///
    /// [`GpError::InvalidClassifier`] if there are no row or column categories
    pub fn new(
        row_name: &str,
        row_categories: Vec<PatientCategory>,
        col_name: &str,
        col_categories: Vec<PatientCategory>,
    ) -> GpResult<Self> {
        if row_categories.is_empty() || col_categories.is_empty() {
            return Err(GpError::InvalidClassifier(
                "a contingency table needs at least one row and one column category".to_string(),
            ));
        }
        let data = vec![0; row_categories.len() * col_categories.len()];
        Ok(Self {
            row_name: row_name.to_string(),
            col_name: col_name.to_string(),
            row_categories,
            col_categories,
            data,
        })
    }

    /// Constructs a table from raw counts
    ///
    /// Rows and columns get generic categories named after their index.
    ///
    /// # Errors
    ///
    /// - [`GpError::RaggedTable`] if the rows have different lengths
    /// - [`GpError::EmptyTable`] if there are no rows or no columns
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> GpResult<Self> {
        let n_cols = rows.first().map_or(0, |row| row.as_ref().len());
        if n_cols == 0 {
            return Err(GpError::EmptyTable);
        }
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(GpError::RaggedTable);
            }
            data.extend_from_slice(row);
        }
        let category = |idx: usize| PatientCategory::new(idx as u32, &idx.to_string(), None);
        Ok(Self {
            row_name: "rows".to_string(),
            col_name: "columns".to_string(),
            row_categories: (0..rows.len()).map(category).collect(),
            col_categories: (0..n_cols).map(category).collect(),
            data,
        })
    }

    /// Returns the number of rows and columns
    pub fn dim(&self) -> (usize, usize) {
        (self.row_categories.len(), self.col_categories.len())
    }

    /// The question of the phenotype classifier
    pub fn row_name(&self) -> &str {
        &self.row_name
    }

    /// The question of the genotype classifier
    pub fn col_name(&self) -> &str {
        &self.col_name
    }

    pub fn row_categories(&self) -> &[PatientCategory] {
        &self.row_categories
    }

    pub fn col_categories(&self) -> &[PatientCategory] {
        &self.col_categories
    }

    /// Returns the count at the given position
    ///
    /// Returns `None` if the position is outside of the table
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        let (n_rows, n_cols) = self.dim();
        if row >= n_rows || col >= n_cols {
            return None;
        }
        self.data.get(row * n_cols + col).copied()
    }

    /// Adds a single patient to the given cell
    pub(crate) fn increment(&mut self, row: usize, col: usize) {
        let n_cols = self.col_categories.len();
        self.data[row * n_cols + col] += 1;
    }

    /// All cells, row by row
    pub fn cells(&self) -> &[u32] {
        &self.data
    }

    /// The total number of patients in the table
    pub fn total(&self) -> u32 {
        self.data.iter().sum()
    }

    /// Returns `true` if no patient was counted
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|count| *count == 0)
    }

    pub fn row_sums(&self) -> Vec<u32> {
        self.rows().map(|row| row.iter().sum()).collect()
    }

    pub fn col_sums(&self) -> Vec<u32> {
        self.cols().map(Iterator::sum).collect()
    }

    /// Iterates the rows of the table
    pub fn rows(&self) -> std::slice::Chunks<'_, u32> {
        self.data.chunks(self.col_categories.len())
    }

    /// Iterates the columns of the table
    pub fn cols(&self) -> ColumnIterator<'_> {
        ColumnIterator::new(&self.data, self.col_categories.len())
    }

    /// Returns the values of a single column
    pub fn column(&self, col: usize) -> Option<Vec<u32>> {
        self.cols().nth(col).map(Iterator::collect)
    }
}

impl Display for ContingencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header: Vec<String> = self
            .col_categories
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(f, "{} \\ {}\t{}", self.row_name, self.col_name, header.join("\t"))?;
        for (category, row) in self.row_categories.iter().zip(self.rows()) {
            let counts: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "{category}\t{}", counts.join("\t"))?;
        }
        Ok(())
    }
}

/// Iterates the values of a single column
pub struct Column<'a> {
    iter: std::iter::StepBy<std::iter::Skip<std::slice::Iter<'a, u32>>>,
}

impl Iterator for Column<'_> {
    type Item = u32;
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().copied()
    }
}

/// Iterates through the columns, returning an Iterator over individual column values
pub struct ColumnIterator<'a> {
    data: &'a [u32],
    cols: usize,
    idx: usize,
}

impl<'a> ColumnIterator<'a> {
    fn new(data: &'a [u32], cols: usize) -> Self {
        Self { data, cols, idx: 0 }
    }
}

impl<'a> Iterator for ColumnIterator<'a> {
    type Item = Column<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.cols {
            return None;
        }
        let iter = self.data.iter().skip(self.idx).step_by(self.cols);
        self.idx += 1;
        Some(Column { iter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_iterator() {
        let table = ContingencyTable::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        let mut coliter = table.cols();

        let col: Vec<u32> = coliter.next().unwrap().collect();
        assert_eq!(col, vec![1, 4]);
        let col: Vec<u32> = coliter.next().unwrap().collect();
        assert_eq!(col, vec![2, 5]);
        let col: Vec<u32> = coliter.next().unwrap().collect();
        assert_eq!(col, vec![3, 6]);
        assert!(coliter.next().is_none());

        assert_eq!(table.column(1), Some(vec![2, 5]));
        assert!(table.column(3).is_none());
    }

    #[test]
    fn test_row_iterator_sums() {
        let table = ContingencyTable::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        assert_eq!(table.row_sums(), vec![6, 15]);
        assert_eq!(table.col_sums(), vec![5, 7, 9]);
        assert_eq!(table.total(), 21);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows: Vec<Vec<u32>> = vec![vec![1, 2, 3], vec![4, 5]];
        assert!(matches!(
            ContingencyTable::from_rows(&rows),
            Err(GpError::RaggedTable)
        ));
        let rows: Vec<Vec<u32>> = vec![];
        assert!(matches!(
            ContingencyTable::from_rows(&rows),
            Err(GpError::EmptyTable)
        ));
    }

    #[test]
    fn increment_and_get() {
        let mut table = ContingencyTable::new(
            "HP:0012648",
            vec![PatientCategory::yes(), PatientCategory::no()],
            "Sex",
            vec![
                PatientCategory::new(0, "FEMALE", None),
                PatientCategory::new(1, "MALE", None),
                PatientCategory::new(2, "OTHER", None),
            ],
        )
        .unwrap();
        assert!(table.is_empty());
        table.increment(1, 2);
        table.increment(1, 2);
        table.increment(0, 0);
        assert_eq!(table.get(1, 2), Some(2));
        assert_eq!(table.get(0, 0), Some(1));
        assert_eq!(table.get(2, 0), None);
        assert_eq!(table.cells(), &[1, 0, 0, 0, 0, 2]);
        assert!(!table.is_empty());
    }

    #[test]
    fn categories_are_required() {
        assert!(ContingencyTable::new("a", vec![], "b", vec![PatientCategory::yes()]).is_err());
    }

    #[test]
    fn display() {
        let table = ContingencyTable::from_rows(&[[9, 1], [1, 9]]).unwrap();
        let text = table.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().ends_with("9\t1"));
    }
}
