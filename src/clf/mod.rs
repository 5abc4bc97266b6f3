//! Classifiers assign patients to mutually exclusive categories
//!
//! Every classifier has a fixed set of categorizations, known upfront.
//! [`Classifier::test`] either returns one of them or `None` if the
//! patient cannot be classified (e.g. the sex is unknown or a phenotype
//! was never investigated). Classifying a patient never fails.
//!
//! Genotype classifiers (e.g. [`allele_count`], [`biallelic_classifier`])
//! define the columns of a [`ContingencyTable`](crate::ContingencyTable),
//! phenotype classifiers (e.g. [`HpoPredicate`]) define its rows.
use std::collections::HashSet;
use std::fmt::Display;

use crate::model::Patient;
use crate::{GpError, GpResult};

mod genotype;
mod phenotype;
pub mod predicates;

pub use genotype::{
    allele_count, biallelic_classifier, diagnosis_classifier, monoallelic_classifier,
    AlleleCountClassifier, AlleleCounter, BiallelicClassifier, DiagnosisClassifier,
    MonoallelicClassifier, SexClassifier,
};
pub use phenotype::{
    prepare_classifiers_for_terms_of_interest, prepare_hpo_terms_of_interest,
    DiseasePresencePredicate, HpoPredicate,
};

/// A single category of a classifier, e.g. `Yes`, `MALE` or `A/B`
///
/// Two categories are equal if id, name and description are equal.
///
/// # Examples
///
/// ```
/// use genophenocorr::clf::PatientCategory;
///
/// let yes = PatientCategory::yes();
/// assert_eq!(yes.cat_id(), 0);
/// assert_eq!(yes.name(), "Yes");
/// assert_ne!(yes, PatientCategory::no());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatientCategory {
    cat_id: u32,
    name: String,
    description: Option<String>,
}

impl PatientCategory {
    pub fn new(cat_id: u32, name: &str, description: Option<&str>) -> Self {
        Self {
            cat_id,
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    /// The patient has the feature
    pub fn yes() -> Self {
        Self::new(0, "Yes", Some("The patient belongs to the group."))
    }

    /// The patient does not have the feature
    pub fn no() -> Self {
        Self::new(1, "No", Some("The patient does not belong to the group."))
    }

    /// The id of the category, unique within a classifier
    pub fn cat_id(&self) -> u32 {
        self.cat_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Display for PatientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Anything that wraps a [`PatientCategory`]
pub trait Categorized {
    fn category(&self) -> &PatientCategory;
}

/// The outcome of a genotype classifier
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Categorization {
    category: PatientCategory,
}

impl Categorization {
    pub fn new(category: PatientCategory) -> Self {
        Self { category }
    }
}

impl Categorized for Categorization {
    fn category(&self) -> &PatientCategory {
        &self.category
    }
}

/// The outcome of a phenotype classifier
///
/// The categorization carries the phenotype it was made for, so that
/// the `Yes` of one term is not equal to the `Yes` of another.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhenotypeCategorization<P> {
    category: PatientCategory,
    phenotype: P,
}

impl<P> PhenotypeCategorization<P> {
    pub fn new(category: PatientCategory, phenotype: P) -> Self {
        Self {
            category,
            phenotype,
        }
    }

    pub fn phenotype(&self) -> &P {
        &self.phenotype
    }
}

impl<P> Categorized for PhenotypeCategorization<P> {
    fn category(&self) -> &PatientCategory {
        &self.category
    }
}

/// Assigns a [`Patient`] to one of a fixed set of categories
///
/// Implementors must guarantee that
/// - [`Classifier::categorizations`] never changes after construction
/// - the category ids of all categorizations are unique
/// - [`Classifier::test`] only returns references into [`Classifier::categorizations`]
pub trait Classifier: Send + Sync {
    type Output: Categorized;

    /// A short name, e.g. `Sex Classifier`
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// The name of the variable that the classifier captures
    fn variable_name(&self) -> &str;

    /// The question that the classifier answers, used to label tables
    fn question(&self) -> &str;

    /// All possible outcomes
    fn categorizations(&self) -> &[Self::Output];

    /// Classifies the patient
    ///
    /// Returns `None` if the patient cannot be assigned to any category
    fn test(&self, patient: &Patient) -> Option<&Self::Output>;

    fn n_categorizations(&self) -> usize {
        self.categorizations().len()
    }

    /// Returns the position of the categorization in [`Classifier::categorizations`]
    fn category_index(&self, categorization: &Self::Output) -> Option<usize> {
        let cat_id = categorization.category().cat_id();
        self.categorizations()
            .iter()
            .position(|c| c.category().cat_id() == cat_id)
    }

    /// Returns all categories, in the order of [`Classifier::categorizations`]
    fn categories(&self) -> Vec<PatientCategory> {
        self.categorizations()
            .iter()
            .map(|c| c.category().clone())
            .collect()
    }
}

/// A classifier of the genotype, its categories are the columns of a contingency table
pub trait GenotypeClassifier: Classifier<Output = Categorization> {}

impl<T: Classifier<Output = Categorization> + ?Sized> GenotypeClassifier for T {}

/// A classifier for presence or absence of a phenotype `P`
///
/// Its categories are the rows of a contingency table.
pub trait PhenotypeClassifier<P>: Classifier<Output = PhenotypeCategorization<P>> {
    /// The phenotype that is tested, e.g. an [`HpoTermId`](crate::HpoTermId)
    fn phenotype(&self) -> &P;

    /// The categorization meaning "the phenotype is present"
    fn present_phenotype_categorization(&self) -> &Self::Output;
}

/// Ensures that a classifier has at least one category and that all ids are unique
pub(crate) fn validate_categories<'a, I>(categories: I) -> GpResult<()>
where
    I: IntoIterator<Item = &'a PatientCategory>,
{
    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category.cat_id()) {
            return Err(GpError::DuplicateCategoryId(category.cat_id()));
        }
    }
    if seen.is_empty() {
        return Err(GpError::InvalidClassifier(
            "a classifier needs at least one category".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn category_equality() {
        let a = PatientCategory::new(0, "A", None);
        assert_eq!(a, PatientCategory::new(0, "A", None));
        assert_ne!(a, PatientCategory::new(0, "A", Some("with description")));
        assert_ne!(a, PatientCategory::new(1, "A", None));
        assert_eq!(a.to_string(), "A");
    }

    #[test]
    fn phenotype_categorizations_differ_by_phenotype() {
        let a = PhenotypeCategorization::new(PatientCategory::yes(), 12648u32);
        let b = PhenotypeCategorization::new(PatientCategory::yes(), 2011u32);
        assert_ne!(a, b);
        assert_eq!(a.category(), b.category());
    }

    #[test]
    fn duplicate_ids() {
        let categories = [
            PatientCategory::new(0, "A", None),
            PatientCategory::new(1, "B", None),
            PatientCategory::new(0, "C", None),
        ];
        assert!(matches!(
            validate_categories(&categories),
            Err(GpError::DuplicateCategoryId(0))
        ));
        assert!(validate_categories(&categories[..2]).is_ok());
        assert!(validate_categories(&categories[..0]).is_err());
    }
}
