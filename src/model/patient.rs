use crate::model::{Disease, Variant};
use crate::HpoTermId;

/// The sex of a patient
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Sex {
    Female,
    Male,
    #[default]
    Unknown,
}

/// An HPO term annotated to a patient
///
/// A phenotype is either observed (present) or was explicitly
/// investigated and excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Phenotype {
    term_id: HpoTermId,
    is_present: bool,
}

impl Phenotype {
    /// An observed phenotype
    pub fn present(term_id: HpoTermId) -> Self {
        Self {
            term_id,
            is_present: true,
        }
    }

    /// A phenotype that was investigated and excluded
    pub fn excluded(term_id: HpoTermId) -> Self {
        Self {
            term_id,
            is_present: false,
        }
    }

    pub fn term_id(&self) -> HpoTermId {
        self.term_id
    }

    pub fn is_present(&self) -> bool {
        self.is_present
    }
}

/// A single individual of a [`Cohort`]
///
/// The analysis never modifies patients.
///
/// # Examples
///
/// ```
/// use genophenocorr::model::{Genotype, Patient, Phenotype, Sex, Variant};
///
/// let mut patient = Patient::new("Subject A", Sex::Female);
/// patient.add_phenotype(Phenotype::present(12648u32.into()));
/// patient.add_phenotype(Phenotype::excluded(2011u32.into()));
/// patient.add_variant(Variant::new("1_1000_A_G", Genotype::Heterozygous));
///
/// assert_eq!(patient.present_phenotypes().count(), 1);
/// assert_eq!(patient.excluded_phenotypes().count(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Patient {
    id: String,
    sex: Sex,
    phenotypes: Vec<Phenotype>,
    diseases: Vec<Disease>,
    variants: Vec<Variant>,
}

impl Patient {
    /// Constructs a new patient without any annotations
    pub fn new(id: &str, sex: Sex) -> Self {
        Self {
            id: id.to_string(),
            sex,
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn phenotypes(&self) -> &[Phenotype] {
        &self.phenotypes
    }

    /// Iterates all phenotypes that were observed in the patient
    pub fn present_phenotypes(&self) -> impl Iterator<Item = &Phenotype> {
        self.phenotypes.iter().filter(|p| p.is_present())
    }

    /// Iterates all phenotypes that were explicitly excluded
    pub fn excluded_phenotypes(&self) -> impl Iterator<Item = &Phenotype> {
        self.phenotypes.iter().filter(|p| !p.is_present())
    }

    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn add_phenotype(&mut self, phenotype: Phenotype) {
        self.phenotypes.push(phenotype);
    }

    pub fn add_disease(&mut self, disease: Disease) {
        self.diseases.push(disease);
    }

    pub fn add_variant(&mut self, variant: Variant) {
        self.variants.push(variant);
    }
}

/// A group of patients that are analyzed together
#[derive(Clone, Debug, Default)]
pub struct Cohort {
    patients: Vec<Patient>,
}

impl Cohort {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self { patients }
    }

    /// Returns the number of patients in the cohort
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Returns `true` if the cohort has no patients
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Patient> {
        self.patients.iter()
    }

    pub fn add_patient(&mut self, patient: Patient) {
        self.patients.push(patient);
    }
}

impl FromIterator<Patient> for Cohort {
    fn from_iter<T: IntoIterator<Item = Patient>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Cohort {
    type Item = &'a Patient;
    type IntoIter = std::slice::Iter<'a, Patient>;

    fn into_iter(self) -> Self::IntoIter {
        self.patients.iter()
    }
}
