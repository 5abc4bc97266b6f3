//! Genotype-phenotype association analysis
//!
//! [`PhenotypeAnalysis`] ties everything together: it counts the
//! patients, asks the MTC filter which phenotypes to test, computes the
//! p-values and corrects them for multiple testing.
use tracing::{debug, info, warn};

use crate::clf::{Categorized, GenotypeClassifier, PhenotypeClassifier};
use crate::model::Cohort;
use crate::mtc_filter::PhenotypeMtcFilter;
use crate::stats::{CountStatistic, MtcCorrection};
use crate::{GpError, GpResult};

mod counts;
mod result;

pub use counts::{build_contingency_tables, count_patients};
pub use result::{AnalysisResult, ClassifierSummary, PhenotypeSummary};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Tests a genotype classifier against many phenotype classifiers
///
/// The analysis is configured once and can be run on any number of
/// cohorts and classifiers.
///
/// ```mermaid
/// flowchart LR
///     COHORT[Cohort] --> COUNTS
///     GT[Genotype classifier] --> COUNTS
///     PH[Phenotype classifiers] --> COUNTS
///     COUNTS[build_contingency_tables] --> FILTER[PhenotypeMtcFilter]
///     FILTER -- Passed --> STAT[CountStatistic]
///     FILTER -- Failed --> RES
///     STAT --> MTC[MtcCorrection]
///     MTC --> RES[AnalysisResult]
/// ```
///
/// Defaults:
/// - correction: [`MtcCorrection::FdrBh`]
/// - alpha: `0.05`
///
/// # Examples
///
/// ```
/// use genophenocorr::analysis::PhenotypeAnalysis;
/// use genophenocorr::mtc_filter::UseAllTermsMtcFilter;
/// use genophenocorr::stats::{FisherExactTest, MtcCorrection};
///
/// let analysis = PhenotypeAnalysis::new(UseAllTermsMtcFilter, FisherExactTest)
///     .with_correction(Some(MtcCorrection::Bonferroni))
///     .with_alpha(0.01);
/// assert_eq!(analysis.correction(), Some(MtcCorrection::Bonferroni));
/// assert_eq!(analysis.alpha(), 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct PhenotypeAnalysis<F, S> {
    mtc_filter: F,
    statistic: S,
    correction: Option<MtcCorrection>,
    alpha: f64,
}

impl<F, S: CountStatistic> PhenotypeAnalysis<F, S> {
    pub const DEFAULT_ALPHA: f64 = 0.05;

    /// Constructs a new analysis with the default correction and alpha
    pub fn new(mtc_filter: F, statistic: S) -> Self {
        Self {
            mtc_filter,
            statistic,
            correction: Some(MtcCorrection::default()),
            alpha: Self::DEFAULT_ALPHA,
        }
    }

    /// Sets the multiple testing correction, `None` disables the correction
    #[must_use]
    pub fn with_correction(mut self, correction: Option<MtcCorrection>) -> Self {
        self.correction = correction;
        self
    }

    /// Sets the significance level that is reported with the results
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn correction(&self) -> Option<MtcCorrection> {
        self.correction
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn statistic(&self) -> &S {
        &self.statistic
    }

    pub fn mtc_filter(&self) -> &F {
        &self.mtc_filter
    }

    /// Tests the association of the genotype classifier with every phenotype classifier
    ///
    /// # Errors
    ///
    /// - [`GpError::NoPhenotypes`] if `pheno_clfs` is empty
    /// - [`GpError::UnsupportedShape`] if the statistic cannot handle the
    ///   tables of any phenotype
    /// - [`GpError::NothingToTest`] if no phenotype passed the MTC filter
    /// - [`GpError::MtcResultCount`] if the MTC filter did not return one
    ///   result per phenotype
    pub fn compare_genotype_vs_phenotypes<P, G, C>(
        &self,
        cohort: &Cohort,
        gt_clf: &G,
        pheno_clfs: &[C],
    ) -> GpResult<AnalysisResult<P>>
    where
        P: Clone,
        F: PhenotypeMtcFilter<P>,
        G: GenotypeClassifier + ?Sized,
        C: PhenotypeClassifier<P>,
    {
        if pheno_clfs.is_empty() {
            return Err(GpError::NoPhenotypes);
        }
        for pheno_clf in pheno_clfs {
            let shape = (pheno_clf.n_categorizations(), gt_clf.n_categorizations());
            if !self.statistic.supports_shape(shape) {
                return Err(GpError::UnsupportedShape {
                    statistic: self.statistic.name().to_string(),
                    rows: shape.0,
                    cols: shape.1,
                });
            }
        }
        info!(
            "Comparing `{}` against {} phenotypes in {} patients",
            gt_clf.question(),
            pheno_clfs.len(),
            cohort.len()
        );

        let (n_usable, all_counts) = build_contingency_tables(cohort, gt_clf, pheno_clfs)?;

        let mtc_filter_results = self.mtc_filter.filter(gt_clf, pheno_clfs, &all_counts)?;
        if mtc_filter_results.len() != pheno_clfs.len() {
            return Err(GpError::MtcResultCount {
                expected: pheno_clfs.len(),
                actual: mtc_filter_results.len(),
            });
        }

        let tested: Vec<usize> = mtc_filter_results
            .iter()
            .enumerate()
            .filter(|(_, result)| result.is_passed())
            .map(|(idx, _)| idx)
            .collect();
        if tested.is_empty() {
            warn!(
                "None of the {} phenotypes passed `{}`",
                pheno_clfs.len(),
                self.mtc_filter.name()
            );
            return Err(GpError::NothingToTest);
        }
        info!(
            "Testing {} of {} phenotypes with {}",
            tested.len(),
            pheno_clfs.len(),
            self.statistic.name()
        );

        let mut pvals = vec![f64::NAN; pheno_clfs.len()];
        for idx in &tested {
            let pvalue = self.statistic.compute_pvalue(&all_counts[*idx])?;
            debug!("{}: p = {pvalue}", pheno_clfs[*idx].variable_name());
            pvals[*idx] = pvalue;
        }

        let corrected_pvals = match self.correction {
            Some(correction) => {
                let nominal: Vec<f64> = tested.iter().map(|idx| pvals[*idx]).collect();
                let adjusted = correction.adjust(&nominal)?;
                let mut corrected = vec![f64::NAN; pheno_clfs.len()];
                for (idx, pvalue) in tested.iter().zip(adjusted) {
                    corrected[*idx] = pvalue;
                }
                Some(corrected)
            }
            None => None,
        };

        Ok(AnalysisResult {
            gt_clf: ClassifierSummary::from_classifier(gt_clf),
            statistic: self.statistic.name().to_string(),
            phenotypes: pheno_clfs
                .iter()
                .map(|clf| clf.phenotype().clone())
                .collect(),
            present_categories: pheno_clfs
                .iter()
                .map(|clf| clf.present_phenotype_categorization().category().clone())
                .collect(),
            n_usable,
            all_counts,
            pvals,
            corrected_pvals,
            mtc_filter_name: self.mtc_filter.name().to_string(),
            mtc_filter_results,
            correction: self.correction,
            alpha: self.alpha,
        })
    }
}
