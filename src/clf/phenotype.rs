use std::collections::HashMap;
use std::fmt::Debug;

use tracing::debug;

use crate::clf::{Classifier, PatientCategory, PhenotypeCategorization, PhenotypeClassifier};
use crate::model::{Cohort, DiseaseId, Patient};
use crate::{GpError, GpResult, HpoGroup, HpoTermId, OntologyGraph};

/// Tests if a patient has an HPO term or one of its descendants
///
/// Annotations are propagated along the ontology: a patient with
/// `Abnormal hypothalamus physiology` also has
/// `Abnormality of the nervous system`. Excluded annotations propagate
/// the other way round: if a patient does not have
/// `Abnormality of the nervous system`, the patient does not have
/// `Abnormal hypothalamus physiology` either.
///
/// The classification of a patient follows these rules, first match wins:
///
/// 1. Patients without any phenotype annotation are not classified
/// 2. `Yes` if any present annotation is the query term or a descendant of it
/// 3. `No` if `missing_implies_phenotype_excluded` is set
/// 4. `No` if any excluded annotation is the query term or an ancestor of it
/// 5. otherwise the patient is not classified
///
/// # Examples
///
/// ```
/// use genophenocorr::{Ontology, OntologyGraph};
/// use genophenocorr::clf::{Categorized, Classifier, HpoPredicate};
/// use genophenocorr::model::{Patient, Phenotype, Sex};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("All".into(), 1u32);
/// ontology.insert_term("Phenotypic abnormality".into(), 118u32);
/// ontology.insert_term("Abnormality of the nervous system".into(), 707u32);
/// ontology.add_parent(1u32, 118u32).unwrap();
/// ontology.add_parent(118u32, 707u32).unwrap();
/// ontology.create_cache();
///
/// let predicate = HpoPredicate::new(&ontology, 118u32.into(), false).unwrap();
///
/// let mut patient = Patient::new("Subject A", Sex::Female);
/// assert!(predicate.test(&patient).is_none());
///
/// patient.add_phenotype(Phenotype::present(707u32.into()));
/// assert_eq!(predicate.test(&patient).unwrap().category().name(), "Yes");
/// ```
pub struct HpoPredicate<'a> {
    ontology: &'a dyn OntologyGraph,
    query: HpoTermId,
    missing_implies_phenotype_excluded: bool,
    variable_name: String,
    description: String,
    question: String,
    categorizations: Vec<PhenotypeCategorization<HpoTermId>>,
}

impl<'a> HpoPredicate<'a> {
    /// Constructs a predicate for the presence of `query`
    ///
    /// # Errors
    ///
    /// [`GpError::DoesNotExist`] if `query` is not part of the ontology
    pub fn new(
        ontology: &'a dyn OntologyGraph,
        query: HpoTermId,
        missing_implies_phenotype_excluded: bool,
    ) -> GpResult<Self> {
        let label = ontology.name(query).ok_or(GpError::DoesNotExist(query))?;
        Ok(Self {
            ontology,
            query,
            missing_implies_phenotype_excluded,
            variable_name: query.to_string(),
            description: format!("Test for presence of {label} [{query}]"),
            question: format!("Is {label} present in the patient?"),
            categorizations: vec![
                PhenotypeCategorization::new(PatientCategory::yes(), query),
                PhenotypeCategorization::new(PatientCategory::no(), query),
            ],
        })
    }

    pub fn query(&self) -> HpoTermId {
        self.query
    }

    fn is_present(&self, patient: &Patient) -> bool {
        patient.present_phenotypes().any(|phenotype| {
            phenotype.term_id() == self.query
                || self.ontology.is_descendant_of(phenotype.term_id(), self.query)
        })
    }

    fn is_excluded(&self, patient: &Patient) -> bool {
        patient.excluded_phenotypes().any(|phenotype| {
            phenotype.term_id() == self.query
                || self.ontology.is_ancestor_of(phenotype.term_id(), self.query)
        })
    }
}

impl Debug for HpoPredicate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpoPredicate({})", self.query)
    }
}

impl Classifier for HpoPredicate<'_> {
    type Output = PhenotypeCategorization<HpoTermId>;

    fn name(&self) -> &str {
        "HPO Predicate"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn variable_name(&self) -> &str {
        &self.variable_name
    }

    fn question(&self) -> &str {
        &self.question
    }

    fn categorizations(&self) -> &[Self::Output] {
        &self.categorizations
    }

    fn test(&self, patient: &Patient) -> Option<&Self::Output> {
        if patient.phenotypes().is_empty() {
            return None;
        }
        if self.is_present(patient) {
            return self.categorizations.first();
        }
        if self.missing_implies_phenotype_excluded || self.is_excluded(patient) {
            return self.categorizations.get(1);
        }
        None
    }
}

impl PhenotypeClassifier<HpoTermId> for HpoPredicate<'_> {
    fn phenotype(&self) -> &HpoTermId {
        &self.query
    }

    fn present_phenotype_categorization(&self) -> &Self::Output {
        &self.categorizations[0]
    }
}

/// Tests if a patient was diagnosed with a disease
///
/// Every patient is classified: `Yes` if the disease is present,
/// `No` otherwise.
#[derive(Debug, Clone)]
pub struct DiseasePresencePredicate {
    disease: DiseaseId,
    description: String,
    question: String,
    categorizations: Vec<PhenotypeCategorization<DiseaseId>>,
}

impl DiseasePresencePredicate {
    pub fn new(disease: DiseaseId) -> Self {
        Self {
            description: format!("Test for diagnosis of {disease}"),
            question: format!("Was {disease} diagnosed?"),
            categorizations: vec![
                PhenotypeCategorization::new(PatientCategory::yes(), disease.clone()),
                PhenotypeCategorization::new(PatientCategory::no(), disease.clone()),
            ],
            disease,
        }
    }
}

impl Classifier for DiseasePresencePredicate {
    type Output = PhenotypeCategorization<DiseaseId>;

    fn name(&self) -> &str {
        "Disease Predicate"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn variable_name(&self) -> &str {
        self.disease.as_str()
    }

    fn question(&self) -> &str {
        &self.question
    }

    fn categorizations(&self) -> &[Self::Output] {
        &self.categorizations
    }

    fn test(&self, patient: &Patient) -> Option<&Self::Output> {
        let diagnosed = patient
            .diseases()
            .iter()
            .any(|disease| disease.is_present() && disease.id() == &self.disease);
        if diagnosed {
            self.categorizations.first()
        } else {
            self.categorizations.get(1)
        }
    }
}

impl PhenotypeClassifier<DiseaseId> for DiseasePresencePredicate {
    fn phenotype(&self) -> &DiseaseId {
        &self.disease
    }

    fn present_phenotype_categorization(&self) -> &Self::Output {
        &self.categorizations[0]
    }
}

/// Collects all HPO terms that are present in at least `min_n_of_patients` patients
///
/// Present annotations are propagated to all their ancestors. The
/// root term of the ontology is never part of the result. Annotations
/// with terms that are not part of the ontology are ignored.
pub fn prepare_hpo_terms_of_interest(
    ontology: &dyn OntologyGraph,
    cohort: &Cohort,
    min_n_of_patients: usize,
) -> HpoGroup {
    let root = ontology.root();
    let mut counts: HashMap<HpoTermId, usize> = HashMap::new();
    for patient in cohort {
        let mut terms = HpoGroup::new();
        for phenotype in patient.present_phenotypes() {
            if !ontology.contains(phenotype.term_id()) {
                debug!(
                    "Ignoring unknown term {} of {}",
                    phenotype.term_id(),
                    patient.id()
                );
                continue;
            }
            terms.extend(&ontology.ancestors(phenotype.term_id(), true));
        }
        for term in &terms {
            if term != root {
                *counts.entry(term).or_default() += 1;
            }
        }
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n >= min_n_of_patients)
        .map(|(term, _)| term)
        .collect()
}

/// Constructs one [`HpoPredicate`] for every HPO term that is present in the cohort
///
/// The terms are sorted by their id.
///
/// # Errors
///
/// [`GpError::DoesNotExist`] if a term is not part of the ontology
pub fn prepare_classifiers_for_terms_of_interest<'a>(
    ontology: &'a dyn OntologyGraph,
    cohort: &Cohort,
    missing_implies_phenotype_excluded: bool,
) -> GpResult<Vec<HpoPredicate<'a>>> {
    let terms = prepare_hpo_terms_of_interest(ontology, cohort, 1);
    debug!("Preparing {} HPO predicates", terms.len());
    terms
        .iter()
        .map(|term| HpoPredicate::new(ontology, term, missing_implies_phenotype_excluded))
        .collect()
}
