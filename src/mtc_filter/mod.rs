//! Pre-filters that decide which phenotypes are worth testing
//!
//! Every tested phenotype increases the burden of the multiple testing
//! correction. Phenotypes that are too general, too rare or that cannot
//! reach significance with the given counts are removed before the
//! statistical test. Only phenotypes that [`PhenotypeMtcResult::Passed`]
//! are tested and corrected for.
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use crate::clf::{GenotypeClassifier, PhenotypeClassifier};
use crate::{ContingencyTable, GpError, GpResult};

mod hpo;

pub use hpo::HpoMtcFilter;

/// The reason why a phenotype was not tested
#[derive(Clone, Debug, PartialEq)]
pub enum MtcIssue {
    /// The term is too general to be of interest
    GeneralTerm,
    /// The term is not a phenotypic abnormality, e.g. a mode of inheritance
    NonPhenotypeTerm,
    /// No genotype group has the phenotype frequently enough
    BelowFrequencyThreshold { max_frequency: f64, threshold: f64 },
    /// A `2 x 2` table with too few observations to reach significance
    NotPowered { total: u32 },
    /// No genotype group has more than one patient with the phenotype
    TooFewPresentObservations,
    /// All genotype groups have the same proportion of patients with the phenotype
    SameProportions,
    /// At least one genotype group has no observations
    EmptyGenotypeGroup,
    /// The phenotype is not part of the user-specified phenotypes
    NonSpecifiedTerm,
}

impl MtcIssue {
    /// A short description without any details, used to group issues
    pub fn label(&self) -> &'static str {
        match self {
            MtcIssue::GeneralTerm => "Skipping general term",
            MtcIssue::NonPhenotypeTerm => "Skipping non phenotype term",
            MtcIssue::BelowFrequencyThreshold { .. } => {
                "Skipping term with maximum frequency below threshold"
            }
            MtcIssue::NotPowered { .. } => "Skipping term with too few observations for 2x2",
            MtcIssue::TooFewPresentObservations => {
                "Skipping term because no genotype has more than one observed HPO count"
            }
            MtcIssue::SameProportions => {
                "Skipping term because all genotypes have same HPO observed proportions"
            }
            MtcIssue::EmptyGenotypeGroup => {
                "Skipping term because one genotype had zero observations"
            }
            MtcIssue::NonSpecifiedTerm => "Non-specified term",
        }
    }
}

impl Display for MtcIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtcIssue::BelowFrequencyThreshold {
                max_frequency,
                threshold,
            } => write!(
                f,
                "{} ({max_frequency:.3} < {threshold:.3})",
                self.label()
            ),
            MtcIssue::NotPowered { total } => write!(f, "{} ({total} observations)", self.label()),
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// The verdict of a [`PhenotypeMtcFilter`] for a single phenotype
#[derive(Clone, Debug, PartialEq)]
pub enum PhenotypeMtcResult {
    /// The phenotype will be tested
    Passed,
    /// The phenotype will not be tested
    Failed(MtcIssue),
}

impl PhenotypeMtcResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, PhenotypeMtcResult::Passed)
    }

    /// The reason why the phenotype failed, `None` if it passed
    pub fn reason(&self) -> Option<&MtcIssue> {
        match self {
            PhenotypeMtcResult::Passed => None,
            PhenotypeMtcResult::Failed(issue) => Some(issue),
        }
    }
}

impl Display for PhenotypeMtcResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhenotypeMtcResult::Passed => write!(f, "Passed"),
            PhenotypeMtcResult::Failed(issue) => write!(f, "Failed: {issue}"),
        }
    }
}

/// Decides which phenotypes `P` are tested
pub trait PhenotypeMtcFilter<P> {
    fn name(&self) -> &str;

    /// Returns one verdict per phenotype classifier, in the same order
    ///
    /// `counts` contains the contingency table of each phenotype classifier.
    ///
    /// # Errors
    ///
    /// [`GpError::TableCountMismatch`] if the number of tables does not
    /// match the number of phenotype classifiers
    fn filter<G, C>(
        &self,
        gt_clf: &G,
        pheno_clfs: &[C],
        counts: &[ContingencyTable],
    ) -> GpResult<Vec<PhenotypeMtcResult>>
    where
        G: GenotypeClassifier + ?Sized,
        C: PhenotypeClassifier<P>;
}

pub(crate) fn check_table_count(classifiers: usize, tables: usize) -> GpResult<()> {
    if classifiers == tables {
        Ok(())
    } else {
        Err(GpError::TableCountMismatch {
            classifiers,
            tables,
        })
    }
}

/// Tests every phenotype
#[derive(Debug, Default, Clone, Copy)]
pub struct UseAllTermsMtcFilter;

impl<P> PhenotypeMtcFilter<P> for UseAllTermsMtcFilter {
    fn name(&self) -> &str {
        "All HPO terms"
    }

    fn filter<G, C>(
        &self,
        _gt_clf: &G,
        pheno_clfs: &[C],
        counts: &[ContingencyTable],
    ) -> GpResult<Vec<PhenotypeMtcResult>>
    where
        G: GenotypeClassifier + ?Sized,
        C: PhenotypeClassifier<P>,
    {
        check_table_count(pheno_clfs.len(), counts.len())?;
        Ok(vec![PhenotypeMtcResult::Passed; pheno_clfs.len()])
    }
}

/// Tests only the phenotypes that were selected by the user
///
/// # Examples
///
/// ```
/// use genophenocorr::clf::{DiseasePresencePredicate, SexClassifier};
/// use genophenocorr::model::DiseaseId;
/// use genophenocorr::mtc_filter::{PhenotypeMtcFilter, SpecifiedTermsMtcFilter};
/// use genophenocorr::ContingencyTable;
///
/// let leigh = DiseaseId::try_from("OMIM:256000").unwrap();
/// let other = DiseaseId::try_from("OMIM:220110").unwrap();
/// let pheno_clfs = vec![
///     DiseasePresencePredicate::new(leigh.clone()),
///     DiseasePresencePredicate::new(other),
/// ];
/// let counts = vec![
///     ContingencyTable::from_rows(&[[3, 1], [1, 3]]).unwrap(),
///     ContingencyTable::from_rows(&[[3, 1], [1, 3]]).unwrap(),
/// ];
///
/// let filter = SpecifiedTermsMtcFilter::new([leigh]);
/// let results = filter.filter(&SexClassifier::default(), &pheno_clfs, &counts).unwrap();
/// assert!(results[0].is_passed());
/// assert!(!results[1].is_passed());
/// ```
#[derive(Debug, Clone)]
pub struct SpecifiedTermsMtcFilter<P> {
    terms: HashSet<P>,
}

impl<P: Eq + Hash> SpecifiedTermsMtcFilter<P> {
    pub fn new<I: IntoIterator<Item = P>>(terms: I) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }
}

impl<P: Eq + Hash> PhenotypeMtcFilter<P> for SpecifiedTermsMtcFilter<P> {
    fn name(&self) -> &str {
        "Specified terms"
    }

    fn filter<G, C>(
        &self,
        _gt_clf: &G,
        pheno_clfs: &[C],
        counts: &[ContingencyTable],
    ) -> GpResult<Vec<PhenotypeMtcResult>>
    where
        G: GenotypeClassifier + ?Sized,
        C: PhenotypeClassifier<P>,
    {
        check_table_count(pheno_clfs.len(), counts.len())?;
        Ok(pheno_clfs
            .iter()
            .map(|clf| {
                if self.terms.contains(clf.phenotype()) {
                    PhenotypeMtcResult::Passed
                } else {
                    PhenotypeMtcResult::Failed(MtcIssue::NonSpecifiedTerm)
                }
            })
            .collect())
    }
}
