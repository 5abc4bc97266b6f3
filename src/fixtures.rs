//! Shared test data
//!
//! The ontology is a small 26-term subset of HPO:
//!
//! ```text
//! HP:0000001 All
//! ├── HP:0000005 Mode of inheritance
//! │   └── HP:0034345 Mendelian inheritance
//! │       └── HP:0000007 Autosomal recessive inheritance
//! ├── HP:0000118 Phenotypic abnormality
//! │   ├── HP:0000707 Abnormality of the nervous system
//! │   │   ├── HP:0012638 Abnormal nervous system physiology
//! │   │   │   └── HP:0012285 Abnormal hypothalamus physiology
//! │   │   └── HP:0012639 Abnormal nervous system morphology
//! │   │       └── HP:0002011 Morphological central nervous system abnormality
//! │   │           └── HP:0012443 Abnormality of brain morphology
//! │   │               └── HP:0100547 Abnormal forebrain morphology
//! │   │                   └── HP:0010662 Abnormality of the diencephalon
//! │   │                       └── HP:0012285 Abnormal hypothalamus physiology
//! │   ├── HP:0000818 Abnormality of the endocrine system
//! │   │   └── HP:0000864 Abnormality of the hypothalamus-pituitary axis
//! │   │       └── HP:0012285 Abnormal hypothalamus physiology
//! │   ├── HP:0001939 Abnormality of metabolism/homeostasis
//! │   │   ├── HP:0011017 Abnormal cellular physiology
//! │   │   └── HP:0025454 Abnormal CSF metabolite concentration
//! │   └── HP:0002715 Abnormality of the immune system
//! │       └── HP:0010978 Abnormality of immune system physiology
//! │           └── HP:0012647 Abnormal inflammatory response
//! │               └── HP:0012648 Decreased inflammatory response
//! └── HP:0012823 Clinical modifier
//!     └── HP:0031797 Clinical course
//!         └── HP:0003674 Onset
//!             └── HP:0003581 Adult onset
//! ```
use crate::model::{Genotype, Patient, Phenotype, Sex, Variant};
use crate::Ontology;

const TERMS: [(u32, &str); 26] = [
    (1, "All"),
    (5, "Mode of inheritance"),
    (7, "Autosomal recessive inheritance"),
    (118, "Phenotypic abnormality"),
    (707, "Abnormality of the nervous system"),
    (818, "Abnormality of the endocrine system"),
    (864, "Abnormality of the hypothalamus-pituitary axis"),
    (1939, "Abnormality of metabolism/homeostasis"),
    (2011, "Morphological central nervous system abnormality"),
    (2715, "Abnormality of the immune system"),
    (3581, "Adult onset"),
    (3674, "Onset"),
    (10662, "Abnormality of the diencephalon"),
    (10978, "Abnormality of immune system physiology"),
    (11017, "Abnormal cellular physiology"),
    (12285, "Abnormal hypothalamus physiology"),
    (12443, "Abnormality of brain morphology"),
    (12638, "Abnormal nervous system physiology"),
    (12639, "Abnormal nervous system morphology"),
    (12647, "Abnormal inflammatory response"),
    (12648, "Decreased inflammatory response"),
    (12823, "Clinical modifier"),
    (25454, "Abnormal CSF metabolite concentration"),
    (31797, "Clinical course"),
    (34345, "Mendelian inheritance"),
    (100547, "Abnormal forebrain morphology"),
];

/// (parent, child)
const EDGES: [(u32, u32); 27] = [
    (1, 5),
    (1, 118),
    (1, 12823),
    (5, 34345),
    (34345, 7),
    (118, 707),
    (118, 818),
    (118, 1939),
    (118, 2715),
    (707, 12638),
    (707, 12639),
    (12638, 12285),
    (12639, 2011),
    (2011, 12443),
    (12443, 100547),
    (100547, 10662),
    (10662, 12285),
    (818, 864),
    (864, 12285),
    (1939, 11017),
    (1939, 25454),
    (2715, 10978),
    (10978, 12647),
    (12647, 12648),
    (12823, 31797),
    (31797, 3674),
    (3674, 3581),
];

pub(crate) fn example_ontology() -> Ontology {
    let mut ontology = Ontology::default();
    for (id, name) in TERMS {
        ontology.insert_term(name.to_string(), id);
    }
    for (parent, child) in EDGES {
        ontology
            .add_parent(parent, child)
            .expect("fixture terms must exist");
    }
    ontology.create_cache();
    ontology
}

/// A patient with a single variant of the given genotype and
/// the given present and excluded phenotypes
pub(crate) fn patient(
    id: &str,
    genotype: Genotype,
    present: &[u32],
    excluded: &[u32],
) -> Patient {
    let mut patient = Patient::new(id, Sex::Unknown);
    patient.add_variant(Variant::new("1_1000_A_G", genotype).with_gene("ABC1"));
    for term in present {
        patient.add_phenotype(Phenotype::present((*term).into()));
    }
    for term in excluded {
        patient.add_phenotype(Phenotype::excluded((*term).into()));
    }
    patient
}
