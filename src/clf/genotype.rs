use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use crate::clf::predicates::{InvertedPredicate, VariantPredicate};
use crate::clf::{validate_categories, Categorization, Classifier, PatientCategory};
use crate::model::{DiseaseId, Genotype, Patient, Sex};
use crate::{GpError, GpResult};

/// Sums the number of alleles of all variants that match a predicate
///
/// Homozygous alternate variants count as 2 alleles, heterozygous and
/// hemizygous variants as 1, everything else as 0.
///
/// # Examples
///
/// ```
/// use genophenocorr::clf::AlleleCounter;
/// use genophenocorr::clf::predicates::GenePredicate;
/// use genophenocorr::model::{Genotype, Patient, Sex, Variant};
///
/// let mut patient = Patient::new("Subject A", Sex::Male);
/// patient.add_variant(Variant::new("1_1000_A_G", Genotype::Heterozygous).with_gene("ABC1"));
/// patient.add_variant(Variant::new("1_2000_C_T", Genotype::HomozygousAlternate).with_gene("ABC1"));
/// patient.add_variant(Variant::new("2_3000_G_A", Genotype::HomozygousAlternate).with_gene("XYZ"));
///
/// let counter = AlleleCounter::new(GenePredicate::new("ABC1"));
/// assert_eq!(counter.count(&patient), 3);
/// assert_eq!(counter.inverted().count(&patient), 2);
/// ```
#[derive(Clone)]
pub struct AlleleCounter {
    predicate: Arc<dyn VariantPredicate>,
}

impl AlleleCounter {
    pub fn new<P: VariantPredicate + 'static>(predicate: P) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// A counter for all variants that do not match this counter's predicate
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            predicate: Arc::new(InvertedPredicate::new(Arc::clone(&self.predicate))),
        }
    }

    pub fn name(&self) -> &str {
        self.predicate.name()
    }

    pub fn description(&self) -> &str {
        self.predicate.description()
    }

    /// Returns the number of matching alleles of the patient
    pub fn count(&self, patient: &Patient) -> u32 {
        patient
            .variants()
            .iter()
            .filter(|variant| self.predicate.test(variant))
            .map(|variant| match variant.genotype() {
                Genotype::HomozygousAlternate => 2,
                Genotype::Heterozygous | Genotype::Hemizygous => 1,
                Genotype::HomozygousReference | Genotype::NoCall => 0,
            })
            .sum()
    }
}

impl Debug for AlleleCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AlleleCounter({})", self.predicate.description())
    }
}

/// Assigns patients to `FEMALE` or `MALE`
///
/// Patients with unknown sex are not classified.
#[derive(Debug, Clone)]
pub struct SexClassifier {
    categorizations: Vec<Categorization>,
}

impl SexClassifier {
    pub fn new() -> Self {
        Self {
            categorizations: vec![
                Categorization::new(PatientCategory::new(0, "FEMALE", Some("Female"))),
                Categorization::new(PatientCategory::new(1, "MALE", Some("Male"))),
            ],
        }
    }
}

impl Default for SexClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for SexClassifier {
    type Output = Categorization;

    fn name(&self) -> &str {
        "Sex Classifier"
    }

    fn description(&self) -> &str {
        "Classify the individual by sex"
    }

    fn variable_name(&self) -> &str {
        "Sex"
    }

    fn question(&self) -> &str {
        "Sex of the individual"
    }

    fn categorizations(&self) -> &[Categorization] {
        &self.categorizations
    }

    fn test(&self, patient: &Patient) -> Option<&Categorization> {
        match patient.sex() {
            Sex::Female => self.categorizations.first(),
            Sex::Male => self.categorizations.get(1),
            Sex::Unknown => None,
        }
    }
}

/// Assigns patients to the one disease they were diagnosed with
///
/// See [`diagnosis_classifier`]
#[derive(Debug, Clone)]
pub struct DiagnosisClassifier {
    diagnoses: Vec<DiseaseId>,
    categorizations: Vec<Categorization>,
}

/// Constructs a classifier that assigns a patient to exactly one of the diagnoses
///
/// Patients with none or more than one of the diagnoses are not classified.
/// The category names default to the disease ids.
///
/// # Errors
///
/// [`GpError::InvalidClassifier`] if less than two distinct diagnoses
/// are provided or if the number of labels does not match
///
/// # Examples
///
/// ```
/// use genophenocorr::clf::{diagnosis_classifier, Categorized, Classifier};
/// use genophenocorr::model::{Disease, DiseaseId, Patient, Sex};
///
/// let leigh = DiseaseId::try_from("OMIM:256000").unwrap();
/// let mitochondrial = DiseaseId::try_from("OMIM:220110").unwrap();
///
/// let clf = diagnosis_classifier(
///     &[leigh.clone(), mitochondrial.clone()],
///     Some(&["Leigh", "Complex IV deficiency"]),
/// ).unwrap();
///
/// let mut patient = Patient::new("Subject A", Sex::Female);
/// patient.add_disease(Disease::new(leigh, "Leigh syndrome", true));
/// assert_eq!(clf.test(&patient).unwrap().category().name(), "Leigh");
///
/// patient.add_disease(Disease::new(mitochondrial, "Complex IV deficiency", true));
/// assert!(clf.test(&patient).is_none());
/// ```
pub fn diagnosis_classifier(
    diagnoses: &[DiseaseId],
    labels: Option<&[&str]>,
) -> GpResult<DiagnosisClassifier> {
    let unique: HashSet<&DiseaseId> = diagnoses.iter().collect();
    if unique.len() != diagnoses.len() || unique.len() < 2 {
        return Err(GpError::InvalidClassifier(
            "at least two distinct diagnoses are required".to_string(),
        ));
    }
    if let Some(labels) = labels {
        if labels.len() != diagnoses.len() {
            return Err(GpError::InvalidClassifier(format!(
                "got {} labels for {} diagnoses",
                labels.len(),
                diagnoses.len()
            )));
        }
    }

    let categorizations: Vec<Categorization> = diagnoses
        .iter()
        .enumerate()
        .map(|(idx, disease)| {
            let name = labels
                .and_then(|labels| labels.get(idx).copied())
                .map_or_else(|| disease.to_string(), str::to_string);
            Categorization::new(PatientCategory::new(
                idx as u32,
                &name,
                Some(disease.as_str()),
            ))
        })
        .collect();
    validate_categories(categorizations.iter().map(|c| &c.category))?;

    Ok(DiagnosisClassifier {
        diagnoses: diagnoses.to_vec(),
        categorizations,
    })
}

impl Classifier for DiagnosisClassifier {
    type Output = Categorization;

    fn name(&self) -> &str {
        "Diagnosis Classifier"
    }

    fn description(&self) -> &str {
        "Classify the individual by the diagnosed disease"
    }

    fn variable_name(&self) -> &str {
        "Diagnosis"
    }

    fn question(&self) -> &str {
        "What disease was diagnosed"
    }

    fn categorizations(&self) -> &[Categorization] {
        &self.categorizations
    }

    fn test(&self, patient: &Patient) -> Option<&Categorization> {
        let mut found = self.diagnoses.iter().enumerate().filter(|(_, diagnosis)| {
            patient
                .diseases()
                .iter()
                .any(|disease| disease.is_present() && disease.id() == *diagnosis)
        });
        match (found.next(), found.next()) {
            (Some((idx, _)), None) => self.categorizations.get(idx),
            _ => None,
        }
    }
}

/// Assigns patients to groups of allele counts
///
/// See [`allele_count`]
#[derive(Debug, Clone)]
pub struct AlleleCountClassifier {
    counter: AlleleCounter,
    groups: Vec<Vec<u32>>,
    question: String,
    categorizations: Vec<Categorization>,
}

/// Constructs a classifier that groups patients by their allele count
///
/// Each group of `counts` becomes one category, e.g. `[[0], [1], [2]]`
/// or `[[0], [1, 2]]`. Patients whose allele count is not part of any
/// group are not classified.
///
/// # Errors
///
/// [`GpError::InvalidPartition`] if less than two groups are provided,
/// a group is empty, or a count is part of more than one group
///
/// # Examples
///
/// ```
/// use genophenocorr::clf::{allele_count, AlleleCounter, Categorized, Classifier};
/// use genophenocorr::clf::predicates::GenePredicate;
/// use genophenocorr::model::{Genotype, Patient, Sex, Variant};
///
/// let counter = AlleleCounter::new(GenePredicate::new("ABC1"));
/// let clf = allele_count(counter, vec![vec![0], vec![1, 2]]).unwrap();
///
/// let mut patient = Patient::new("Subject A", Sex::Male);
/// patient.add_variant(Variant::new("1_1000_A_G", Genotype::HomozygousAlternate).with_gene("ABC1"));
/// assert_eq!(clf.test(&patient).unwrap().category().name(), "1 OR 2");
/// ```
pub fn allele_count(counter: AlleleCounter, counts: Vec<Vec<u32>>) -> GpResult<AlleleCountClassifier> {
    if counts.len() < 2 {
        return Err(GpError::InvalidPartition(
            "at least two groups of allele counts are required".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for group in &counts {
        if group.is_empty() {
            return Err(GpError::InvalidPartition(
                "groups of allele counts must not be empty".to_string(),
            ));
        }
        for count in group {
            if !seen.insert(*count) {
                return Err(GpError::InvalidPartition(format!(
                    "allele count {count} is part of more than one group"
                )));
            }
        }
    }

    let categorizations: Vec<Categorization> = counts
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            let name = group
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(" OR ");
            Categorization::new(PatientCategory::new(idx as u32, &name, None))
        })
        .collect();
    validate_categories(categorizations.iter().map(|c| &c.category))?;

    Ok(AlleleCountClassifier {
        question: format!("Allele count of {}", counter.description()),
        counter,
        groups: counts,
        categorizations,
    })
}

impl Classifier for AlleleCountClassifier {
    type Output = Categorization;

    fn name(&self) -> &str {
        "Allele Count"
    }

    fn description(&self) -> &str {
        "Assign the individual into a group based on the allele count"
    }

    fn variable_name(&self) -> &str {
        self.counter.name()
    }

    fn question(&self) -> &str {
        &self.question
    }

    fn categorizations(&self) -> &[Categorization] {
        &self.categorizations
    }

    fn test(&self, patient: &Patient) -> Option<&Categorization> {
        let count = self.counter.count(patient);
        self.groups
            .iter()
            .position(|group| group.contains(&count))
            .and_then(|idx| self.categorizations.get(idx))
    }
}

/// Compares patients with one allele of `A` to patients with one allele of `B`
///
/// See [`monoallelic_classifier`]
#[derive(Debug, Clone)]
pub struct MonoallelicClassifier {
    a: AlleleCounter,
    b: AlleleCounter,
    question: String,
    categorizations: Vec<Categorization>,
}

/// Constructs a classifier for patients with exactly one allele of `A` or `B`
///
/// - `(1, 0)` alleles are assigned to `A`
/// - `(0, 1)` alleles are assigned to `B`
/// - all other patients are not classified
///
/// `b` defaults to all variants that do not match `a`.
///
/// # Errors
///
/// [`GpError::InvalidClassifier`] if both labels are identical
pub fn monoallelic_classifier(
    a: AlleleCounter,
    b: Option<AlleleCounter>,
    a_label: &str,
    b_label: &str,
) -> GpResult<MonoallelicClassifier> {
    if a_label == b_label {
        return Err(GpError::InvalidClassifier(format!(
            "the labels of A and B must differ, got `{a_label}` twice"
        )));
    }
    let b = b.unwrap_or_else(|| a.inverted());
    let categorizations = vec![
        Categorization::new(PatientCategory::new(
            0,
            a_label,
            Some("The patient has one allele of A"),
        )),
        Categorization::new(PatientCategory::new(
            1,
            b_label,
            Some("The patient has one allele of B"),
        )),
    ];
    Ok(MonoallelicClassifier {
        question: format!("Allele group: {a_label} vs. {b_label}"),
        a,
        b,
        categorizations,
    })
}

impl Classifier for MonoallelicClassifier {
    type Output = Categorization;

    fn name(&self) -> &str {
        "Monoallelic Classifier"
    }

    fn description(&self) -> &str {
        "Classify the individual into A or B based on single alleles"
    }

    fn variable_name(&self) -> &str {
        "Allele group"
    }

    fn question(&self) -> &str {
        &self.question
    }

    fn categorizations(&self) -> &[Categorization] {
        &self.categorizations
    }

    fn test(&self, patient: &Patient) -> Option<&Categorization> {
        match (self.a.count(patient), self.b.count(patient)) {
            (1, 0) => self.categorizations.first(),
            (0, 1) => self.categorizations.get(1),
            _ => None,
        }
    }
}

/// Compares patients by the combination of their two alleles
///
/// See [`biallelic_classifier`]
#[derive(Debug, Clone)]
pub struct BiallelicClassifier {
    a: AlleleCounter,
    b: AlleleCounter,
    /// category index of `A/A`, `A/B` and `B/B`
    outcome_to_category: [usize; 3],
    question: String,
    categorizations: Vec<Categorization>,
}

/// Constructs a classifier for patients with two alleles of `A` and/or `B`
///
/// - `(2, 0)` alleles are `A/A` (outcome 0)
/// - `(1, 1)` alleles are `A/B` (outcome 1)
/// - `(0, 2)` alleles are `B/B` (outcome 2)
/// - all other patients are not classified
///
/// `b` defaults to all variants that do not match `a`. The outcomes can be
/// merged with `partitions`, e.g. `[[0], [1, 2]]` compares `A/A` against
/// patients with at least one `B` allele. By default, every outcome is
/// its own category.
///
/// # Errors
///
/// [`GpError::InvalidPartition`] if the partitions do not contain each
/// outcome exactly once
///
/// # Examples
///
/// ```
/// use genophenocorr::clf::{biallelic_classifier, AlleleCounter, Categorized, Classifier};
/// use genophenocorr::clf::predicates::GenePredicate;
/// use genophenocorr::model::{Genotype, Patient, Sex, Variant};
///
/// let counter = AlleleCounter::new(GenePredicate::new("ABC1"));
/// let clf = biallelic_classifier(counter, None, "LoF", "Missense", Some(vec![vec![0], vec![1, 2]])).unwrap();
/// let names: Vec<&str> = clf.categorizations().iter().map(|c| c.category().name()).collect();
/// assert_eq!(names, vec!["LoF/LoF", "LoF/Missense OR Missense/Missense"]);
///
/// let mut patient = Patient::new("Subject A", Sex::Male);
/// patient.add_variant(Variant::new("1_1000_A_G", Genotype::Heterozygous).with_gene("ABC1"));
/// patient.add_variant(Variant::new("1_2000_C_T", Genotype::Heterozygous).with_gene("XYZ"));
/// assert_eq!(clf.test(&patient).unwrap().category().cat_id(), 1);
/// ```
pub fn biallelic_classifier(
    a: AlleleCounter,
    b: Option<AlleleCounter>,
    a_label: &str,
    b_label: &str,
    partitions: Option<Vec<Vec<usize>>>,
) -> GpResult<BiallelicClassifier> {
    if a_label == b_label {
        return Err(GpError::InvalidClassifier(format!(
            "the labels of A and B must differ, got `{a_label}` twice"
        )));
    }
    let partitions = partitions.unwrap_or_else(|| vec![vec![0], vec![1], vec![2]]);
    let outcome_to_category = outcome_lookup(&partitions)?;

    let outcomes = [
        format!("{a_label}/{a_label}"),
        format!("{a_label}/{b_label}"),
        format!("{b_label}/{b_label}"),
    ];
    let categorizations: Vec<Categorization> = partitions
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            let name = group
                .iter()
                .map(|outcome| outcomes[*outcome].as_str())
                .collect::<Vec<&str>>()
                .join(" OR ");
            Categorization::new(PatientCategory::new(idx as u32, &name, None))
        })
        .collect();
    validate_categories(categorizations.iter().map(|c| &c.category))?;

    let b = b.unwrap_or_else(|| a.inverted());
    Ok(BiallelicClassifier {
        question: format!("Allele group: {a_label} vs. {b_label}"),
        a,
        b,
        outcome_to_category,
        categorizations,
    })
}

/// Maps every bi-allelic outcome to the index of its partition
fn outcome_lookup(partitions: &[Vec<usize>]) -> GpResult<[usize; 3]> {
    let mut lookup: [Option<usize>; 3] = [None; 3];
    for (idx, group) in partitions.iter().enumerate() {
        if group.is_empty() {
            return Err(GpError::InvalidPartition(
                "partitions must not be empty".to_string(),
            ));
        }
        for outcome in group {
            let slot = lookup.get_mut(*outcome).ok_or_else(|| {
                GpError::InvalidPartition(format!(
                    "outcome {outcome} does not exist, use 0 (A/A), 1 (A/B) or 2 (B/B)"
                ))
            })?;
            if slot.is_some() {
                return Err(GpError::InvalidPartition(format!(
                    "outcome {outcome} is part of more than one partition"
                )));
            }
            *slot = Some(idx);
        }
    }
    match lookup {
        [Some(aa), Some(ab), Some(bb)] => Ok([aa, ab, bb]),
        _ => Err(GpError::InvalidPartition(
            "partitions must contain each of the outcomes 0, 1 and 2".to_string(),
        )),
    }
}

impl Classifier for BiallelicClassifier {
    type Output = Categorization;

    fn name(&self) -> &str {
        "Biallelic Classifier"
    }

    fn description(&self) -> &str {
        "Classify the individual by the combination of two alleles"
    }

    fn variable_name(&self) -> &str {
        "Allele group"
    }

    fn question(&self) -> &str {
        &self.question
    }

    fn categorizations(&self) -> &[Categorization] {
        &self.categorizations
    }

    fn test(&self, patient: &Patient) -> Option<&Categorization> {
        let outcome = match (self.a.count(patient), self.b.count(patient)) {
            (2, 0) => 0,
            (1, 1) => 1,
            (0, 2) => 2,
            _ => return None,
        };
        self.categorizations.get(self.outcome_to_category[outcome])
    }
}
