use genophenocorr::analysis::PhenotypeAnalysis;
use genophenocorr::clf::predicates::GenePredicate;
use genophenocorr::clf::{
    allele_count, prepare_classifiers_for_terms_of_interest, AlleleCounter, HpoPredicate,
};
use genophenocorr::model::{Cohort, Genotype, Patient, Phenotype, Sex, Variant};
use genophenocorr::mtc_filter::{HpoMtcFilter, MtcIssue, UseAllTermsMtcFilter};
use genophenocorr::stats::{FisherExactTest, MtcCorrection};
use genophenocorr::{HpoTermId, Ontology};

fn ontology() -> Ontology {
    let mut ontology = Ontology::default();
    for (id, name) in [
        (1u32, "All"),
        (118, "Phenotypic abnormality"),
        (707, "Abnormality of the nervous system"),
        (1250, "Seizure"),
        (2715, "Abnormality of the immune system"),
        (12648, "Decreased inflammatory response"),
    ] {
        ontology.insert_term(name.to_string(), id);
    }
    for (parent, child) in [(1u32, 118u32), (118, 707), (707, 1250), (118, 2715), (2715, 12648)] {
        ontology.add_parent(parent, child).unwrap();
    }
    ontology.create_cache();
    ontology
}

/// 10 carriers of which 9 have seizures, 10 non-carriers of which 1 has seizures.
/// Everybody has a decreased inflammatory response.
fn cohort() -> Cohort {
    let mut cohort = Cohort::default();
    for idx in 0..20 {
        let carrier = idx < 10;
        let genotype = if carrier {
            Genotype::Heterozygous
        } else {
            Genotype::HomozygousReference
        };
        let mut patient = Patient::new(&format!("P{idx}"), Sex::Unknown);
        patient.add_variant(Variant::new("1_1000_A_G", genotype).with_gene("ABC1"));

        let seizure = if carrier { idx != 0 } else { idx == 10 };
        patient.add_phenotype(if seizure {
            Phenotype::present(1250u32.into())
        } else {
            Phenotype::excluded(1250u32.into())
        });
        patient.add_phenotype(Phenotype::present(12648u32.into()));
        cohort.add_patient(patient);
    }
    cohort
}

fn carrier_classifier() -> genophenocorr::clf::AlleleCountClassifier {
    allele_count(
        AlleleCounter::new(GenePredicate::new("ABC1")),
        vec![vec![1], vec![0]],
    )
    .unwrap()
}

#[test]
fn single_phenotype_association() {
    let ontology = ontology();
    let cohort = cohort();
    let pheno_clfs = vec![HpoPredicate::new(&ontology, 1250u32.into(), false).unwrap()];

    let analysis = PhenotypeAnalysis::new(UseAllTermsMtcFilter, FisherExactTest);
    let result = analysis
        .compare_genotype_vs_phenotypes(&cohort, &carrier_classifier(), &pheno_clfs)
        .unwrap();

    let summary = result.summary(&HpoTermId::from(1250u32)).unwrap();
    assert_eq!(summary.counts().cells(), &[9, 1, 1, 9]);
    assert_eq!(summary.n_usable(), 20);
    assert!(summary.pvalue() < 0.01);

    // a single test is not changed by the Benjamini-Hochberg correction
    assert_eq!(summary.corrected_pvalue(), Some(summary.pvalue()));
    assert_eq!(result.correction(), Some(MtcCorrection::FdrBh));
    assert_eq!(result.n_significant_for_alpha(0.05), 1);
}

#[test]
fn terms_of_interest_with_hpo_filter() {
    let ontology = ontology();
    let cohort = cohort();
    let pheno_clfs = prepare_classifiers_for_terms_of_interest(&ontology, &cohort, false).unwrap();

    // 1250, 12648 and all their ancestors except the root
    let terms: Vec<HpoTermId> = pheno_clfs.iter().map(HpoPredicate::query).collect();
    assert_eq!(terms.len(), 5);
    assert!(!terms.contains(&HpoTermId::from(1u32)));

    let filter = HpoMtcFilter::default_filter(&ontology, 0.4).unwrap();
    let analysis = PhenotypeAnalysis::new(filter, FisherExactTest)
        .with_correction(Some(MtcCorrection::Bonferroni));
    let result = analysis
        .compare_genotype_vs_phenotypes(&cohort, &carrier_classifier(), &pheno_clfs)
        .unwrap();

    assert_eq!(result.total_tests(), 1);
    let seizure = result.summary(&HpoTermId::from(1250u32)).unwrap();
    assert!(seizure.is_tested());
    assert_eq!(seizure.corrected_pvalue(), Some(seizure.pvalue()));

    let inflammation = result.summary(&HpoTermId::from(12648u32)).unwrap();
    assert!(!inflammation.is_tested());
    assert_eq!(
        inflammation.mtc_result().reason(),
        Some(&MtcIssue::SameProportions)
    );
    assert!(inflammation.pvalue().is_nan());

    let report = result.mtc_filter_report();
    assert_eq!(report[MtcIssue::GeneralTerm.label()], 3);
    assert_eq!(report[MtcIssue::SameProportions.label()], 1);
}
