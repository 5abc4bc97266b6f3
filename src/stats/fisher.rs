use statrs::distribution::{Discrete, Hypergeometric};
use statrs::function::factorial::ln_factorial;
use tracing::debug;

use crate::stats::CountStatistic;
use crate::{ContingencyTable, GpError, GpResult};

/// Tables whose probability exceeds the observed one by less than this
/// relative amount are treated as equally likely
const RELATIVE_TOLERANCE: f64 = 1e-7;

/// Two-sided Fisher's exact test
///
/// `2 x 2` tables use the hypergeometric distribution. `2 x 3` tables
/// are tested with the generalized (Freeman-Halton) exact test, which
/// enumerates all tables with the same marginal sums.
///
/// The p-value is the probability of all tables that are at most as
/// likely as the observed table.
///
/// # Examples
///
/// ```
/// use genophenocorr::ContingencyTable;
/// use genophenocorr::stats::{CountStatistic, FisherExactTest};
///
/// let table = ContingencyTable::from_rows(&[[9, 1], [1, 9]]).unwrap();
/// let pvalue = FisherExactTest.compute_pvalue(&table).unwrap();
/// assert!((pvalue - 0.001_093_333_910_671_377_4).abs() < 1e-12);
///
/// let table = ContingencyTable::from_rows(&[[2, 1, 0], [3, 0, 2]]).unwrap();
/// let pvalue = FisherExactTest.compute_pvalue(&table).unwrap();
/// assert!((pvalue - 0.642_857_142_857_143).abs() < 1e-9);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FisherExactTest;

impl CountStatistic for FisherExactTest {
    fn name(&self) -> &str {
        "Fisher's exact test"
    }

    fn supports_shape(&self, shape: (usize, usize)) -> bool {
        matches!(shape, (2, 2) | (2, 3))
    }

    fn compute_pvalue(&self, table: &ContingencyTable) -> GpResult<f64> {
        match table.dim() {
            (2, 2) => two_by_two(table),
            (2, 3) => exact_rxc(table),
            (rows, cols) => Err(GpError::UnsupportedShape {
                statistic: self.name().to_string(),
                rows,
                cols,
            }),
        }
    }
}

/// Fisher's exact test of a `2 x 2` table
///
/// ```text
///        | col 1 | col 2 |
/// row 1  |   a   |   b   |  n = a + b
/// row 2  |   c   |   d   |
///            K = a + c       N = a + b + c + d
/// ```
///
/// `a` follows the hypergeometric distribution with population `N`,
/// `K` successes and `n` draws.
fn two_by_two(table: &ContingencyTable) -> GpResult<f64> {
    let &[a, b, c, d] = table.cells() else {
        return Err(GpError::UnsupportedShape {
            statistic: FisherExactTest.name().to_string(),
            rows: table.dim().0,
            cols: table.dim().1,
        });
    };
    let population = u64::from(a) + u64::from(b) + u64::from(c) + u64::from(d);
    if population == 0 {
        return Err(GpError::EmptyTable);
    }
    let successes = u64::from(a) + u64::from(c);
    let draws = u64::from(a) + u64::from(b);

    let hyper = Hypergeometric::new(population, successes, draws)?;

    let lower = (draws + successes).saturating_sub(population);
    let upper = successes.min(draws);
    let ln_probabilities: Vec<f64> = (lower..=upper).map(|x| hyper.ln_pmf(x)).collect();

    let pvalue = sum_extreme(&ln_probabilities, hyper.ln_pmf(u64::from(a)));
    debug!(
        "2x2 exact test of [[{a}, {b}], [{c}, {d}]]: {} tables, p = {pvalue}",
        ln_probabilities.len()
    );
    Ok(pvalue)
}

/// Generalized exact test of an `R x C` table
///
/// All tables with the observed row and column sums are enumerated by a
/// depth-first search that fills the cells left-to-right, top-to-bottom.
/// The last cell of each row and the whole last row are determined by the
/// marginals; branches that would require negative counts are skipped.
///
/// The probability of a table is
/// `(prod(row_sums!) * prod(col_sums!)) / (n! * prod(cells!))`.
fn exact_rxc(table: &ContingencyTable) -> GpResult<f64> {
    let total = table.total();
    if total == 0 {
        return Err(GpError::EmptyTable);
    }
    let row_sums = table.row_sums();
    let mut col_rem = table.col_sums();

    let ln_marginals: f64 = row_sums
        .iter()
        .chain(col_rem.iter())
        .map(|sum| ln_factorial(u64::from(*sum)))
        .sum::<f64>()
        - ln_factorial(u64::from(total));

    let ln_observed = ln_marginals - sum_ln_factorials(table.cells());

    let mut search = TableSearch {
        row_sums: &row_sums,
        ln_probabilities: Vec::new(),
    };
    search.next_row(0, &mut col_rem, 0.0);
    let ln_probabilities: Vec<f64> = search
        .ln_probabilities
        .into_iter()
        .map(|ln_cells| ln_marginals - ln_cells)
        .collect();

    let pvalue = sum_extreme(&ln_probabilities, ln_observed);
    debug!(
        "{}x{} exact test: {} tables, p = {pvalue}",
        row_sums.len(),
        table.dim().1,
        ln_probabilities.len()
    );
    Ok(pvalue)
}

/// Depth-first enumeration of all tables with fixed marginals
///
/// Collects `sum(ln(cell!))` of every table.
struct TableSearch<'a> {
    row_sums: &'a [u32],
    ln_probabilities: Vec<f64>,
}

impl TableSearch<'_> {
    fn next_row(&mut self, row: usize, col_rem: &mut [u32], ln_cells: f64) {
        if row + 1 >= self.row_sums.len() {
            // the last row takes whatever is left in every column
            self.ln_probabilities
                .push(ln_cells + sum_ln_factorials(col_rem));
            return;
        }
        self.fill_cell(row, 0, self.row_sums[row], col_rem, ln_cells);
    }

    fn fill_cell(
        &mut self,
        row: usize,
        col: usize,
        row_rem: u32,
        col_rem: &mut [u32],
        ln_cells: f64,
    ) {
        if col + 1 == col_rem.len() {
            // the last column takes the rest of the row
            if row_rem > col_rem[col] {
                return;
            }
            col_rem[col] -= row_rem;
            self.next_row(row + 1, col_rem, ln_cells + ln_factorial(u64::from(row_rem)));
            col_rem[col] += row_rem;
            return;
        }
        for value in 0..=row_rem.min(col_rem[col]) {
            col_rem[col] -= value;
            self.fill_cell(
                row,
                col + 1,
                row_rem - value,
                col_rem,
                ln_cells + ln_factorial(u64::from(value)),
            );
            col_rem[col] += value;
        }
    }
}

fn sum_ln_factorials(counts: &[u32]) -> f64 {
    counts.iter().map(|c| ln_factorial(u64::from(*c))).sum()
}

/// Sums the probabilities of all tables that are at most as likely as the observed one
///
/// The sum is normalized by the probability mass of all tables, so
/// that rounding errors never lead to p-values above 1.
fn sum_extreme(ln_probabilities: &[f64], ln_observed: f64) -> f64 {
    let threshold = ln_observed + RELATIVE_TOLERANCE.ln_1p();
    let ln_max = ln_probabilities
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let mut extreme = 0.0;
    let mut total = 0.0;
    for ln_p in ln_probabilities {
        let p = (ln_p - ln_max).exp();
        total += p;
        if *ln_p <= threshold {
            extreme += p;
        }
    }
    if total == 0.0 {
        return 1.0;
    }
    (extreme / total).min(1.0)
}
