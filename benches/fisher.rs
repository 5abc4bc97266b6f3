use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rayon::prelude::*;

use genophenocorr::analysis::count_patients;
use genophenocorr::clf::predicates::GenePredicate;
use genophenocorr::clf::{allele_count, AlleleCountClassifier, AlleleCounter, HpoPredicate};
use genophenocorr::model::{Cohort, Genotype, Patient, Phenotype, Sex, Variant};
use genophenocorr::stats::{CountStatistic, FisherExactTest};
use genophenocorr::{ContingencyTable, Ontology};

const N_TERMS: u32 = 200;

/// A flat ontology with `N_TERMS` leaves below `Phenotypic abnormality`
fn ontology() -> Ontology {
    let mut ontology = Ontology::default();
    ontology.insert_term("All".to_string(), 1u32);
    ontology.insert_term("Phenotypic abnormality".to_string(), 118u32);
    ontology.add_parent(1u32, 118u32).unwrap();
    for id in 1000..1000 + N_TERMS {
        ontology.insert_term(format!("Term {id}"), id);
        ontology.add_parent(118u32, id).unwrap();
    }
    ontology.create_cache();
    ontology
}

fn cohort(size: u32) -> Cohort {
    (0..size)
        .map(|idx| {
            let genotype = match idx % 3 {
                0 => Genotype::HomozygousReference,
                1 => Genotype::Heterozygous,
                _ => Genotype::HomozygousAlternate,
            };
            let mut patient = Patient::new(&format!("P{idx}"), Sex::Unknown);
            patient.add_variant(Variant::new("1_1000_A_G", genotype).with_gene("ABC1"));
            for term in (1000..1000 + N_TERMS).filter(|term| (term + idx) % 4 == 0) {
                patient.add_phenotype(Phenotype::present(term.into()));
            }
            for term in (1000..1000 + N_TERMS).filter(|term| (term + idx) % 4 == 1) {
                patient.add_phenotype(Phenotype::excluded(term.into()));
            }
            patient
        })
        .collect()
}

fn classifier() -> AlleleCountClassifier {
    allele_count(
        AlleleCounter::new(GenePredicate::new("ABC1")),
        vec![vec![0], vec![1], vec![2]],
    )
    .unwrap()
}

fn count_sequential(cohort: &Cohort, gt_clf: &AlleleCountClassifier, pheno_clfs: &[HpoPredicate]) -> usize {
    pheno_clfs
        .iter()
        .map(|clf| count_patients(cohort, gt_clf, clf).unwrap().0)
        .sum()
}

fn count_parallel(cohort: &Cohort, gt_clf: &AlleleCountClassifier, pheno_clfs: &[HpoPredicate]) -> usize {
    pheno_clfs
        .par_iter()
        .map(|clf| count_patients(cohort, gt_clf, clf).unwrap().0)
        .sum()
}

fn exact_test_benchmark(c: &mut Criterion) {
    let small = ContingencyTable::from_rows(&[[9, 1], [1, 9]]).unwrap();
    let large = ContingencyTable::from_rows(&[[120, 80], [75, 130]]).unwrap();
    let wide = ContingencyTable::from_rows(&[[12, 20, 5], [8, 6, 19]]).unwrap();

    c.bench_function("fisher 2x2 small", |b| {
        b.iter(|| FisherExactTest.compute_pvalue(black_box(&small)).unwrap())
    });
    c.bench_function("fisher 2x2 large", |b| {
        b.iter(|| FisherExactTest.compute_pvalue(black_box(&large)).unwrap())
    });
    c.bench_function("fisher 2x3", |b| {
        b.iter(|| FisherExactTest.compute_pvalue(black_box(&wide)).unwrap())
    });
}

fn counting_benchmark(c: &mut Criterion) {
    let ontology = ontology();
    let cohort = cohort(500);
    let gt_clf = classifier();
    let pheno_clfs: Vec<HpoPredicate> = (1000..1000 + N_TERMS)
        .map(|term| HpoPredicate::new(&ontology, term.into(), false).unwrap())
        .collect();

    c.bench_function("count sequential", |b| {
        b.iter(|| count_sequential(black_box(&cohort), &gt_clf, &pheno_clfs))
    });
    c.bench_function("count parallel", |b| {
        b.iter(|| count_parallel(black_box(&cohort), &gt_clf, &pheno_clfs))
    });
}

criterion_group!(fisher, exact_test_benchmark, counting_benchmark);
criterion_main!(fisher);
