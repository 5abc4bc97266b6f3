use std::fmt::Display;
use std::str::FromStr;

use crate::{GpError, GpResult};

/// Multiple testing correction procedures
///
/// The adjusted p-values follow the conventions of `statsmodels`'
/// `multipletests`, so they can be compared directly against alpha.
///
/// # Examples
///
/// ```
/// use genophenocorr::stats::MtcCorrection;
///
/// let correction: MtcCorrection = "fdr_bh".parse().unwrap();
/// assert_eq!(correction, MtcCorrection::default());
///
/// let adjusted = correction.adjust(&[0.01, 0.04, 0.03, 0.005]).unwrap();
/// assert!((adjusted[0] - 0.02).abs() < 1e-12);
/// assert!((adjusted[1] - 0.04).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MtcCorrection {
    /// Multiplies each p-value by the number of tests
    Bonferroni,
    /// `1 - (1 - p)^m`
    Sidak,
    /// Step-down Bonferroni
    Holm,
    /// Step-down Sidak
    HolmSidak,
    /// Step-up Bonferroni (Hochberg)
    SimesHochberg,
    /// Benjamini-Hochberg false discovery rate
    #[default]
    FdrBh,
    /// Benjamini-Yekutieli false discovery rate, valid under arbitrary dependence
    FdrBy,
}

impl MtcCorrection {
    /// Returns the conventional name, e.g. `fdr_bh`
    pub fn as_str(&self) -> &'static str {
        match self {
            MtcCorrection::Bonferroni => "bonferroni",
            MtcCorrection::Sidak => "sidak",
            MtcCorrection::Holm => "holm",
            MtcCorrection::HolmSidak => "holm-sidak",
            MtcCorrection::SimesHochberg => "simes-hochberg",
            MtcCorrection::FdrBh => "fdr_bh",
            MtcCorrection::FdrBy => "fdr_by",
        }
    }

    /// Adjusts the p-values for multiple testing
    ///
    /// The adjusted values are returned in the order of `pvalues`.
    /// An empty input yields an empty output.
    ///
    /// # Errors
    ///
    /// [`GpError::InvalidPvalue`] if any p-value is not within `[0, 1]`
    pub fn adjust(&self, pvalues: &[f64]) -> GpResult<Vec<f64>> {
        for (index, value) in pvalues.iter().enumerate() {
            if !(0.0..=1.0).contains(value) {
                return Err(GpError::InvalidPvalue {
                    index,
                    value: *value,
                });
            }
        }
        if pvalues.is_empty() {
            return Ok(Vec::new());
        }

        let m = pvalues.len() as f64;
        match self {
            MtcCorrection::Bonferroni => Ok(pvalues.iter().map(|p| (p * m).min(1.0)).collect()),
            MtcCorrection::Sidak => Ok(pvalues.iter().map(|p| sidak(*p, m)).collect()),
            MtcCorrection::Holm => Ok(step_down(pvalues, |p, rank| p * (m - rank))),
            MtcCorrection::HolmSidak => Ok(step_down(pvalues, |p, rank| sidak(p, m - rank))),
            MtcCorrection::SimesHochberg => Ok(step_up(pvalues, |p, rank| p * (m - rank))),
            MtcCorrection::FdrBh => Ok(step_up(pvalues, |p, rank| p * m / (rank + 1.0))),
            MtcCorrection::FdrBy => {
                let harmonic: f64 = (1..=pvalues.len()).map(|k| 1.0 / k as f64).sum();
                Ok(step_up(pvalues, |p, rank| p * m * harmonic / (rank + 1.0)))
            }
        }
    }
}

impl Display for MtcCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MtcCorrection {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bonferroni" => Ok(MtcCorrection::Bonferroni),
            "sidak" => Ok(MtcCorrection::Sidak),
            "holm" => Ok(MtcCorrection::Holm),
            "holm-sidak" => Ok(MtcCorrection::HolmSidak),
            "simes-hochberg" => Ok(MtcCorrection::SimesHochberg),
            "fdr_bh" => Ok(MtcCorrection::FdrBh),
            "fdr_by" => Ok(MtcCorrection::FdrBy),
            _ => Err(GpError::UnknownCorrection(s.to_string())),
        }
    }
}

/// `1 - (1 - p)^n`, computed without loss of precision for small `p`
fn sidak(p: f64, n: f64) -> f64 {
    -(n * (-p).ln_1p()).exp_m1()
}

/// Indices of `pvalues`, sorted by ascending p-value
fn ascending_order(pvalues: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    order.sort_by(|a, b| pvalues[*a].total_cmp(&pvalues[*b]));
    order
}

/// Step-down procedure: the adjusted values never decrease with the rank
///
/// `adjust` receives the p-value and its 0-based rank.
fn step_down<F: Fn(f64, f64) -> f64>(pvalues: &[f64], adjust: F) -> Vec<f64> {
    let mut res = vec![0.0; pvalues.len()];
    let mut running_max: f64 = 0.0;
    for (rank, idx) in ascending_order(pvalues).into_iter().enumerate() {
        running_max = running_max.max(adjust(pvalues[idx], rank as f64));
        res[idx] = running_max.min(1.0);
    }
    res
}

/// Step-up procedure: starting from the largest p-value,
/// the adjusted values never increase with decreasing rank
fn step_up<F: Fn(f64, f64) -> f64>(pvalues: &[f64], adjust: F) -> Vec<f64> {
    let mut res = vec![0.0; pvalues.len()];
    let mut running_min = f64::INFINITY;
    for (rank, idx) in ascending_order(pvalues).into_iter().enumerate().rev() {
        running_min = running_min.min(adjust(pvalues[idx], rank as f64));
        res[idx] = running_min.min(1.0);
    }
    res
}

#[cfg(test)]
mod test {
    use super::*;

    const PVALUES: [f64; 4] = [0.01, 0.04, 0.03, 0.005];

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn names() {
        for name in [
            "bonferroni",
            "sidak",
            "holm",
            "holm-sidak",
            "simes-hochberg",
            "fdr_bh",
            "fdr_by",
        ] {
            let correction: MtcCorrection = name.parse().unwrap();
            assert_eq!(correction.to_string(), name);
        }
        assert!(matches!(
            "BH".parse::<MtcCorrection>(),
            Err(GpError::UnknownCorrection(_))
        ));
    }

    #[test]
    fn bonferroni() {
        let adjusted = MtcCorrection::Bonferroni.adjust(&PVALUES).unwrap();
        assert_all_close(&adjusted, &[0.04, 0.16, 0.12, 0.02]);
        let adjusted = MtcCorrection::Bonferroni.adjust(&[0.3, 0.5]).unwrap();
        assert_all_close(&adjusted, &[0.6, 1.0]);
    }

    #[test]
    fn sidak_correction() {
        let adjusted = MtcCorrection::Sidak.adjust(&[0.01, 0.5]).unwrap();
        assert_all_close(&adjusted, &[0.0199, 0.75]);
    }

    #[test]
    fn holm() {
        let adjusted = MtcCorrection::Holm.adjust(&PVALUES).unwrap();
        assert_all_close(&adjusted, &[0.03, 0.06, 0.06, 0.02]);
    }

    #[test]
    fn holm_sidak() {
        let adjusted = MtcCorrection::HolmSidak.adjust(&[0.01, 0.02]).unwrap();
        // 1 - 0.99^2 = 0.0199, max(0.0199, 0.02)
        assert_all_close(&adjusted, &[0.0199, 0.02]);
    }

    #[test]
    fn simes_hochberg() {
        let adjusted = MtcCorrection::SimesHochberg.adjust(&PVALUES).unwrap();
        assert_all_close(&adjusted, &[0.03, 0.04, 0.04, 0.02]);
    }

    #[test]
    fn benjamini_hochberg() {
        let adjusted = MtcCorrection::FdrBh.adjust(&PVALUES).unwrap();
        assert_all_close(&adjusted, &[0.02, 0.04, 0.04, 0.02]);
    }

    #[test]
    fn benjamini_yekutieli() {
        let c = 1.0 + 1.0 / 2.0 + 1.0 / 3.0 + 1.0 / 4.0;
        let adjusted = MtcCorrection::FdrBy.adjust(&PVALUES).unwrap();
        assert_all_close(&adjusted, &[0.02 * c, 0.04 * c, 0.04 * c, 0.02 * c]);
    }

    #[test]
    fn single_test_is_unchanged() {
        for correction in [
            MtcCorrection::Bonferroni,
            MtcCorrection::Sidak,
            MtcCorrection::Holm,
            MtcCorrection::HolmSidak,
            MtcCorrection::SimesHochberg,
            MtcCorrection::FdrBh,
            MtcCorrection::FdrBy,
        ] {
            let adjusted = correction.adjust(&[0.0123]).unwrap();
            assert_all_close(&adjusted, &[0.0123]);
        }
    }

    #[test]
    fn invalid_pvalues() {
        assert!(matches!(
            MtcCorrection::FdrBh.adjust(&[0.1, 1.5]),
            Err(GpError::InvalidPvalue { index: 1, .. })
        ));
        assert!(MtcCorrection::Holm.adjust(&[f64::NAN]).is_err());
        assert!(MtcCorrection::Holm.adjust(&[-0.1]).is_err());
        assert!(MtcCorrection::Holm.adjust(&[]).unwrap().is_empty());
    }
}
