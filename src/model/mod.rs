//! The individuals that are analyzed
//!
//! A [`Cohort`] consists of [`Patient`]s. Each patient carries
//! [`Phenotype`] annotations (HPO terms, observed or excluded),
//! [`Disease`] diagnoses and [`Variant`]s with the patient's
//! [`Genotype`]. Classifiers only ever read this data.

mod disease;
mod patient;
mod variant;

pub use disease::{Disease, DiseaseId};
pub use patient::{Cohort, Patient, Phenotype, Sex};
pub use variant::{Genotype, Variant, VariantEffect};
