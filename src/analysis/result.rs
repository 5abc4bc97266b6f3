use std::collections::BTreeMap;

use crate::clf::{Categorized, Classifier, PatientCategory};
use crate::mtc_filter::PhenotypeMtcResult;
use crate::stats::MtcCorrection;
use crate::ContingencyTable;

/// A detached description of a classifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifierSummary {
    name: String,
    description: String,
    variable_name: String,
    question: String,
    categories: Vec<PatientCategory>,
}

impl ClassifierSummary {
    pub(crate) fn from_classifier<C: Classifier + ?Sized>(clf: &C) -> Self {
        Self {
            name: clf.name().to_string(),
            description: clf.description().to_string(),
            variable_name: clf.variable_name().to_string(),
            question: clf.question().to_string(),
            categories: clf
                .categorizations()
                .iter()
                .map(|c| c.category().clone())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn categories(&self) -> &[PatientCategory] {
        &self.categories
    }
}

/// The outcome of comparing one genotype classifier against several phenotypes
///
/// All per-phenotype vectors have the same length and order as the
/// phenotype classifiers of the analysis. Phenotypes that did not pass
/// the MTC filter have `NaN` p-values.
#[derive(Clone, Debug)]
pub struct AnalysisResult<P> {
    pub(super) gt_clf: ClassifierSummary,
    pub(super) statistic: String,
    pub(super) phenotypes: Vec<P>,
    pub(super) present_categories: Vec<PatientCategory>,
    pub(super) n_usable: Vec<usize>,
    pub(super) all_counts: Vec<ContingencyTable>,
    pub(super) pvals: Vec<f64>,
    pub(super) corrected_pvals: Option<Vec<f64>>,
    pub(super) mtc_filter_name: String,
    pub(super) mtc_filter_results: Vec<PhenotypeMtcResult>,
    pub(super) correction: Option<MtcCorrection>,
    pub(super) alpha: f64,
}

impl<P> AnalysisResult<P> {
    /// The genotype classifier that defined the columns of all tables
    pub fn gt_clf(&self) -> &ClassifierSummary {
        &self.gt_clf
    }

    /// The name of the statistical test
    pub fn statistic(&self) -> &str {
        &self.statistic
    }

    pub fn phenotypes(&self) -> &[P] {
        &self.phenotypes
    }

    /// The category that means "phenotype is present", per phenotype
    pub fn present_categories(&self) -> &[PatientCategory] {
        &self.present_categories
    }

    /// The number of patients that were classified by both classifiers, per phenotype
    pub fn n_usable(&self) -> &[usize] {
        &self.n_usable
    }

    pub fn all_counts(&self) -> &[ContingencyTable] {
        &self.all_counts
    }

    /// Nominal p-values, `NaN` for phenotypes that were not tested
    pub fn pvals(&self) -> &[f64] {
        &self.pvals
    }

    /// Corrected p-values, `NaN` for phenotypes that were not tested
    ///
    /// `None` if the analysis ran without multiple testing correction
    pub fn corrected_pvals(&self) -> Option<&[f64]> {
        self.corrected_pvals.as_deref()
    }

    pub fn mtc_filter_name(&self) -> &str {
        &self.mtc_filter_name
    }

    pub fn mtc_filter_results(&self) -> &[PhenotypeMtcResult] {
        &self.mtc_filter_results
    }

    pub fn correction(&self) -> Option<MtcCorrection> {
        self.correction
    }

    /// The significance level of the analysis
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The number of phenotypes that were tested
    pub fn total_tests(&self) -> usize {
        self.mtc_filter_results
            .iter()
            .filter(|result| result.is_passed())
            .count()
    }

    /// The corrected p-values if available, the nominal ones otherwise
    fn effective_pvals(&self) -> &[f64] {
        self.corrected_pvals.as_deref().unwrap_or(&self.pvals)
    }

    /// Returns the indices of all tested phenotypes with a p-value below `alpha`
    ///
    /// Corrected p-values are used if available. The indices are sorted
    /// by ascending p-value.
    pub fn significant_phenotype_indices(&self, alpha: f64) -> Vec<usize> {
        let pvals = self.effective_pvals();
        let mut indices: Vec<usize> = pvals
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_nan() && **p < alpha)
            .map(|(idx, _)| idx)
            .collect();
        indices.sort_by(|a, b| pvals[*a].total_cmp(&pvals[*b]));
        indices
    }

    /// The number of tested phenotypes with a p-value below `alpha`
    pub fn n_significant_for_alpha(&self, alpha: f64) -> usize {
        self.significant_phenotype_indices(alpha).len()
    }

    /// Counts how many phenotypes failed the MTC filter for each reason
    pub fn mtc_filter_report(&self) -> BTreeMap<&'static str, usize> {
        let mut report = BTreeMap::new();
        for issue in self
            .mtc_filter_results
            .iter()
            .filter_map(PhenotypeMtcResult::reason)
        {
            *report.entry(issue.label()).or_default() += 1;
        }
        report
    }

    fn summary_at(&self, idx: usize) -> PhenotypeSummary<'_, P> {
        PhenotypeSummary {
            phenotype: &self.phenotypes[idx],
            present_category: &self.present_categories[idx],
            n_usable: self.n_usable[idx],
            counts: &self.all_counts[idx],
            pvalue: self.pvals[idx],
            corrected_pvalue: self.corrected_pvals.as_ref().map(|pvals| pvals[idx]),
            mtc_result: &self.mtc_filter_results[idx],
        }
    }

    /// Iterates the summaries of all phenotypes, in the order of the analysis
    pub fn summaries(&self) -> impl Iterator<Item = PhenotypeSummary<'_, P>> {
        (0..self.phenotypes.len()).map(|idx| self.summary_at(idx))
    }
}

impl<P: PartialEq> AnalysisResult<P> {
    /// The position of the phenotype in the analysis
    pub fn phenotype_index(&self, phenotype: &P) -> Option<usize> {
        self.phenotypes.iter().position(|p| p == phenotype)
    }

    /// Returns all results of a single phenotype
    ///
    /// Returns `None` if the phenotype was not part of the analysis
    pub fn summary(&self, phenotype: &P) -> Option<PhenotypeSummary<'_, P>> {
        self.phenotype_index(phenotype)
            .map(|idx| self.summary_at(idx))
    }
}

/// All results of a single phenotype
#[derive(Debug)]
pub struct PhenotypeSummary<'a, P> {
    phenotype: &'a P,
    present_category: &'a PatientCategory,
    n_usable: usize,
    counts: &'a ContingencyTable,
    pvalue: f64,
    corrected_pvalue: Option<f64>,
    mtc_result: &'a PhenotypeMtcResult,
}

impl<'a, P> PhenotypeSummary<'a, P> {
    pub fn phenotype(&self) -> &'a P {
        self.phenotype
    }

    pub fn present_category(&self) -> &'a PatientCategory {
        self.present_category
    }

    pub fn n_usable(&self) -> usize {
        self.n_usable
    }

    pub fn counts(&self) -> &'a ContingencyTable {
        self.counts
    }

    /// The nominal p-value, `NaN` if the phenotype was not tested
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    pub fn corrected_pvalue(&self) -> Option<f64> {
        self.corrected_pvalue
    }

    pub fn mtc_result(&self) -> &'a PhenotypeMtcResult {
        self.mtc_result
    }

    /// Returns `true` if the phenotype passed the MTC filter and was tested
    pub fn is_tested(&self) -> bool {
        self.mtc_result.is_passed()
    }
}
