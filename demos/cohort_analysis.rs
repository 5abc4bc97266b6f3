//! Compares missense against frameshift variants in a small synthetic cohort
//!
//! Run with `RUST_LOG=debug` to see the decisions of the MTC filter.
use std::process;

use genophenocorr::analysis::PhenotypeAnalysis;
use genophenocorr::clf::predicates::EffectPredicate;
use genophenocorr::clf::{monoallelic_classifier, prepare_classifiers_for_terms_of_interest, AlleleCounter};
use genophenocorr::model::{Cohort, Genotype, Patient, Phenotype, Sex, Variant, VariantEffect};
use genophenocorr::mtc_filter::HpoMtcFilter;
use genophenocorr::stats::{FisherExactTest, MtcCorrection};
use genophenocorr::{GpResult, Ontology};

const TERMS: [(u32, &str); 8] = [
    (1, "All"),
    (118, "Phenotypic abnormality"),
    (707, "Abnormality of the nervous system"),
    (1250, "Seizure"),
    (1263, "Global developmental delay"),
    (2715, "Abnormality of the immune system"),
    (12648, "Decreased inflammatory response"),
    (3581, "Adult onset"),
];

const EDGES: [(u32, u32); 7] = [
    (1, 118),
    (1, 3581),
    (118, 707),
    (118, 2715),
    (707, 1250),
    (707, 1263),
    (2715, 12648),
];

fn ontology() -> GpResult<Ontology> {
    let mut ontology = Ontology::default();
    for (id, name) in TERMS {
        ontology.insert_term(name.to_string(), id);
    }
    for (parent, child) in EDGES {
        ontology.add_parent(parent, child)?;
    }
    ontology.create_cache();
    Ok(ontology)
}

/// Missense carriers mostly have seizures, frameshift carriers mostly
/// have a developmental delay
fn cohort() -> Cohort {
    let mut cohort = Cohort::default();
    for idx in 0..30u32 {
        let missense = idx % 2 == 0;
        let sex = if idx % 3 == 0 { Sex::Female } else { Sex::Male };
        let mut patient = Patient::new(&format!("Subject {idx}"), sex);
        let effect = if missense {
            VariantEffect::MissenseVariant
        } else {
            VariantEffect::FrameshiftVariant
        };
        patient.add_variant(
            Variant::new(&format!("1_{}_C_T", 1000 + idx), Genotype::Heterozygous)
                .with_gene("SCN2A")
                .with_effect(effect),
        );

        let seizure = if missense { idx % 5 != 0 } else { idx % 5 == 0 };
        let delay = if missense { idx % 4 == 0 } else { idx % 7 != 0 };
        for (term, present) in [(1250u32, seizure), (1263, delay)] {
            patient.add_phenotype(if present {
                Phenotype::present(term.into())
            } else {
                Phenotype::excluded(term.into())
            });
        }
        patient.add_phenotype(Phenotype::present(3581u32.into()));
        cohort.add_patient(patient);
    }
    cohort
}

fn run() -> GpResult<()> {
    let ontology = ontology()?;
    let cohort = cohort();

    let gt_clf = monoallelic_classifier(
        AlleleCounter::new(EffectPredicate::new(VariantEffect::MissenseVariant)),
        Some(AlleleCounter::new(EffectPredicate::new(
            VariantEffect::FrameshiftVariant,
        ))),
        "Missense",
        "Frameshift",
    )?;
    let pheno_clfs = prepare_classifiers_for_terms_of_interest(&ontology, &cohort, false)?;

    let filter = HpoMtcFilter::default_filter(&ontology, HpoMtcFilter::DEFAULT_TERM_FREQUENCY_THRESHOLD)?;
    let analysis = PhenotypeAnalysis::new(filter, FisherExactTest)
        .with_correction(Some(MtcCorrection::FdrBh));
    let result = analysis.compare_genotype_vs_phenotypes(&cohort, &gt_clf, &pheno_clfs)?;

    println!("{}", result.gt_clf().question());
    println!(
        "{} of {} phenotypes tested with {}",
        result.total_tests(),
        result.phenotypes().len(),
        result.statistic()
    );
    for (reason, count) in result.mtc_filter_report() {
        println!("  {count}x {reason}");
    }
    println!();

    for summary in result.summaries().filter(|s| s.is_tested()) {
        let name = ontology_name(&ontology, summary.phenotype().as_u32());
        println!(
            "{}\t{name}\tp={:.3e}\tcorrected={:.3e}",
            summary.phenotype(),
            summary.pvalue(),
            summary.corrected_pvalue().unwrap_or(f64::NAN)
        );
        println!("{}", summary.counts());
    }

    let significant = result.significant_phenotype_indices(result.alpha());
    println!("{} significant at alpha={}", significant.len(), result.alpha());
    Ok(())
}

fn ontology_name(ontology: &Ontology, id: u32) -> &str {
    use genophenocorr::OntologyGraph;
    ontology.name(id.into()).unwrap_or("Unknown term")
}

fn main() {
    if let Err(err) = simple_logger::init_with_env() {
        eprintln!("Unable to initialize logging: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        process::exit(1);
    }
}
