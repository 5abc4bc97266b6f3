//! `genophenocorr` tests whether genotype groups are statistically
//! associated with phenotype groups across a cohort of patients.
//!
//! The typical workflow is:
//!
//! 1. Describe the genotype groups with a [`GenotypeClassifier`](clf::GenotypeClassifier),
//!    e.g. the number of alleles matching a variant predicate
//!    ([`allele_count`](clf::allele_count)) or mono-/bi-allelic
//!    genotypes ([`biallelic_classifier`](clf::biallelic_classifier)).
//! 2. Describe the phenotypes to test with [`PhenotypeClassifier`](clf::PhenotypeClassifier)s,
//!    e.g. one [`HpoPredicate`](clf::HpoPredicate) per HPO term of interest.
//! 3. Run a [`PhenotypeAnalysis`](analysis::PhenotypeAnalysis). It tallies
//!    the patients into [`ContingencyTable`]s, removes phenotypes that are
//!    not worth testing with a [`PhenotypeMtcFilter`](mtc_filter::PhenotypeMtcFilter),
//!    computes exact p-values and corrects them for multiple testing.
//!
//! # Examples
//!
//! ```
//! use genophenocorr::analysis::PhenotypeAnalysis;
//! use genophenocorr::clf::{allele_count, AlleleCounter, DiseasePresencePredicate};
//! use genophenocorr::clf::predicates::GenePredicate;
//! use genophenocorr::model::{Cohort, Disease, DiseaseId, Genotype, Patient, Sex, Variant};
//! use genophenocorr::mtc_filter::UseAllTermsMtcFilter;
//! use genophenocorr::stats::FisherExactTest;
//!
//! let disease = DiseaseId::try_from("OMIM:256000").unwrap();
//!
//! let mut cohort = Cohort::default();
//! for idx in 0..24 {
//!     let mut patient = Patient::new(&format!("patient {idx}"), Sex::Unknown);
//!     let (genotype, diagnosed) = match idx % 3 {
//!         0 => (Genotype::HomozygousAlternate, true),
//!         1 => (Genotype::Heterozygous, idx % 2 == 0),
//!         _ => (Genotype::HomozygousReference, false),
//!     };
//!     patient.add_variant(Variant::new("1_1000_A_G", genotype).with_gene("ABC1"));
//!     patient.add_disease(Disease::new(disease.clone(), "Leigh syndrome", diagnosed));
//!     cohort.add_patient(patient);
//! }
//!
//! // 0, 1 or 2 alternate alleles in ABC1
//! let counter = AlleleCounter::new(GenePredicate::new("ABC1"));
//! let gt_clf = allele_count(counter, vec![vec![0], vec![1], vec![2]]).unwrap();
//! let pheno_clfs = vec![DiseasePresencePredicate::new(disease.clone())];
//!
//! let analysis = PhenotypeAnalysis::new(UseAllTermsMtcFilter, FisherExactTest);
//! let result = analysis
//!     .compare_genotype_vs_phenotypes(&cohort, &gt_clf, &pheno_clfs)
//!     .unwrap();
//!
//! let summary = result.summary(&disease).unwrap();
//! assert_eq!(summary.n_usable(), 24);
//! assert_eq!(summary.counts().row_sums(), vec![12, 12]);
//! assert!(summary.pvalue() < 0.05);
//! ```
use std::num::ParseIntError;

use thiserror::Error;

pub mod analysis;
pub mod clf;
pub mod model;
pub mod mtc_filter;
mod ontology;
pub mod stats;
mod table;
pub mod term;

#[cfg(test)]
mod fixtures;

pub use ontology::{Ontology, OntologyGraph};
pub use table::ContingencyTable;
pub use term::{HpoGroup, HpoTermId};

/// The root term of HPO, `HP:0000001`
pub const ROOT_TERM: u32 = 1;
/// The root of all phenotypic abnormalities, `HP:0000118`
pub const PHENOTYPIC_ABNORMALITY: u32 = 118;

/// Main Error type for this crate
#[derive(Error, Debug)]
pub enum GpError {
    /// The term is not part of the ontology
    #[error("term {0} does not exist in the ontology")]
    DoesNotExist(HpoTermId),
    #[error("unable to parse Integer")]
    ParseIntError,
    /// A term or disease identifier is malformed
    #[error("invalid identifier `{0}`, expected a CURIE like `HP:0000118` or `OMIM:256000`")]
    InvalidId(String),
    /// Two categories of one classifier share an id
    #[error("category id {0} is used more than once, category ids must be unique within a classifier")]
    DuplicateCategoryId(u32),
    /// Groups of a partition overlap or do not cover all outcomes
    #[error("invalid partition: {0}")]
    InvalidPartition(String),
    #[error("invalid classifier: {0}")]
    InvalidClassifier(String),
    /// The statistic cannot handle tables of this shape
    #[error("{statistic} does not support {rows}x{cols} contingency tables")]
    UnsupportedShape {
        statistic: String,
        rows: usize,
        cols: usize,
    },
    #[error("contingency table must contain at least one observation")]
    EmptyTable,
    #[error("all rows of a contingency table must have the same number of columns")]
    RaggedTable,
    #[error("p-value {value} at index {index} is not within [0, 1]")]
    InvalidPvalue { index: usize, value: f64 },
    #[error("unknown multiple testing correction `{0}`, use one of bonferroni, sidak, holm, holm-sidak, simes-hochberg, fdr_bh, fdr_by")]
    UnknownCorrection(String),
    /// The analysis was started without phenotype classifiers
    #[error("at least one phenotype classifier is required")]
    NoPhenotypes,
    /// The MTC filter removed every phenotype
    #[error("no phenotype passed the MTC filter, there is nothing to test. Consider relaxing the filter")]
    NothingToTest,
    /// Every phenotype classifier needs exactly one contingency table
    #[error("got {tables} contingency tables for {classifiers} phenotype classifiers")]
    TableCountMismatch { classifiers: usize, tables: usize },
    #[error("term frequency threshold {0} is not within [0, 1]")]
    InvalidThreshold(f64),
    /// The MTC filter returned the wrong number of results
    #[error("the MTC filter returned {actual} results for {expected} phenotypes")]
    MtcResultCount { expected: usize, actual: usize },
    /// The MTC filter did not decide on a phenotype
    #[error("the MTC filter did not assign a result to phenotype #{0}")]
    MtcVerdictMissing(usize),
    #[error("statistics error: {0}")]
    Statistics(String),
}

impl From<ParseIntError> for GpError {
    fn from(_: ParseIntError) -> Self {
        GpError::ParseIntError
    }
}

impl From<statrs::StatsError> for GpError {
    fn from(err: statrs::StatsError) -> Self {
        GpError::Statistics(err.to_string())
    }
}

/// Shortcut for `Result<T, GpError>`
pub type GpResult<T> = Result<T, GpError>;
