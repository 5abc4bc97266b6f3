//! Statistical tests for [`ContingencyTable`]s and multiple testing correction
//!
//! At the moment, `genophenocorr` provides Fisher's exact test for
//! `2 x 2` and `2 x 3` tables. The p-values of several tests can be
//! corrected with any [`MtcCorrection`].

use crate::{ContingencyTable, GpResult};

mod correction;
mod fisher;

pub use correction::MtcCorrection;
pub use fisher::FisherExactTest;

/// A statistical test that computes a p-value from a table of counts
///
/// Tests only support certain table shapes. Callers must check
/// [`CountStatistic::supports_shape`] before computing p-values.
pub trait CountStatistic: Send + Sync {
    /// The name of the test, e.g. `Fisher's exact test`
    fn name(&self) -> &str;

    /// Returns `true` if the test can handle tables with `(rows, columns)`
    fn supports_shape(&self, shape: (usize, usize)) -> bool;

    /// Computes the p-value of the table
    ///
    /// # Errors
    ///
    /// - [`GpError::UnsupportedShape`](crate::GpError::UnsupportedShape) if the shape is not supported
    /// - [`GpError::EmptyTable`](crate::GpError::EmptyTable) if the table does not contain any counts
    fn compute_pvalue(&self, table: &ContingencyTable) -> GpResult<f64>;
}
