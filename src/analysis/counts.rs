use tracing::{debug, warn};

use crate::clf::{GenotypeClassifier, PhenotypeClassifier};
use crate::model::Cohort;
use crate::{ContingencyTable, GpResult};

/// Tallies the patients of the cohort into one contingency table per phenotype classifier
///
/// Returns the number of usable patients and the table of every
/// phenotype classifier, in the order of `pheno_clfs`. A patient is
/// usable for a phenotype if both the genotype and the phenotype
/// classifier assign it to a category. Other patients are silently
/// skipped.
///
/// # Errors
///
/// [`GpError::InvalidClassifier`](crate::GpError::InvalidClassifier) if a
/// classifier does not have any categories
///
/// # Examples
///
/// ```
/// use genophenocorr::analysis::build_contingency_tables;
/// use genophenocorr::clf::{DiseasePresencePredicate, SexClassifier};
/// use genophenocorr::model::{Cohort, Disease, DiseaseId, Patient, Sex};
///
/// let leigh = DiseaseId::try_from("OMIM:256000").unwrap();
/// let mut cohort = Cohort::default();
/// for (idx, sex) in [Sex::Female, Sex::Male, Sex::Male, Sex::Unknown].into_iter().enumerate() {
///     let mut patient = Patient::new(&format!("Subject {idx}"), sex);
///     patient.add_disease(Disease::new(leigh.clone(), "Leigh syndrome", idx > 0));
///     cohort.add_patient(patient);
/// }
///
/// let pheno_clfs = vec![DiseasePresencePredicate::new(leigh)];
/// let (n_usable, tables) = build_contingency_tables(&cohort, &SexClassifier::default(), &pheno_clfs).unwrap();
///
/// // the patient with unknown sex is not usable
/// assert_eq!(n_usable, vec![3]);
/// assert_eq!(tables[0].cells(), &[0, 2, 1, 0]);
/// ```
pub fn build_contingency_tables<P, G, C>(
    cohort: &Cohort,
    gt_clf: &G,
    pheno_clfs: &[C],
) -> GpResult<(Vec<usize>, Vec<ContingencyTable>)>
where
    G: GenotypeClassifier + ?Sized,
    C: PhenotypeClassifier<P>,
{
    let columns = genotype_columns(cohort, gt_clf);
    let n_classified = columns.iter().filter(|col| col.is_some()).count();
    if n_classified == 0 && !cohort.is_empty() {
        warn!(
            "`{}` did not classify any of the {} patients",
            gt_clf.name(),
            cohort.len()
        );
    } else {
        debug!(
            "`{}` classified {n_classified} of {} patients",
            gt_clf.name(),
            cohort.len()
        );
    }

    let mut n_usable = Vec::with_capacity(pheno_clfs.len());
    let mut tables = Vec::with_capacity(pheno_clfs.len());
    for pheno_clf in pheno_clfs {
        let (n, table) = tally(cohort, gt_clf, &columns, pheno_clf)?;
        n_usable.push(n);
        tables.push(table);
    }
    Ok((n_usable, tables))
}

/// Tallies the patients of the cohort for a single phenotype classifier
///
/// This is the unit of work of [`build_contingency_tables`] and can be used
/// to distribute the counting over several threads.
///
/// # Errors
///
/// [`GpError::InvalidClassifier`](crate::GpError::InvalidClassifier) if a
/// classifier does not have any categories
pub fn count_patients<P, G, C>(
    cohort: &Cohort,
    gt_clf: &G,
    pheno_clf: &C,
) -> GpResult<(usize, ContingencyTable)>
where
    G: GenotypeClassifier + ?Sized,
    C: PhenotypeClassifier<P>,
{
    let columns = genotype_columns(cohort, gt_clf);
    tally(cohort, gt_clf, &columns, pheno_clf)
}

/// The genotype column of every patient, `None` if the patient is not classified
fn genotype_columns<G: GenotypeClassifier + ?Sized>(cohort: &Cohort, gt_clf: &G) -> Vec<Option<usize>> {
    cohort
        .iter()
        .map(|patient| {
            gt_clf
                .test(patient)
                .and_then(|categorization| gt_clf.category_index(categorization))
        })
        .collect()
}

fn tally<P, G, C>(
    cohort: &Cohort,
    gt_clf: &G,
    columns: &[Option<usize>],
    pheno_clf: &C,
) -> GpResult<(usize, ContingencyTable)>
where
    G: GenotypeClassifier + ?Sized,
    C: PhenotypeClassifier<P>,
{
    let mut table = ContingencyTable::new(
        pheno_clf.question(),
        pheno_clf.categories(),
        gt_clf.question(),
        gt_clf.categories(),
    )?;
    let mut n_usable = 0;
    for (patient, col) in cohort.iter().zip(columns) {
        let Some(col) = col else {
            continue;
        };
        let Some(row) = pheno_clf
            .test(patient)
            .and_then(|categorization| pheno_clf.category_index(categorization))
        else {
            continue;
        };
        table.increment(row, *col);
        n_usable += 1;
    }
    Ok((n_usable, table))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clf::{allele_count, AlleleCounter, Classifier, HpoPredicate, SexClassifier};
    use crate::clf::predicates::GenePredicate;
    use crate::fixtures::{example_ontology, patient};
    use crate::model::{Genotype, Sex};

    #[test]
    fn tables_follow_classifier_order() {
        let ontology = example_ontology();
        let cohort: Cohort = vec![
            patient("A", Genotype::Heterozygous, &[12648], &[]),
            patient("B", Genotype::Heterozygous, &[12648], &[]),
            patient("C", Genotype::HomozygousReference, &[], &[12648]),
            patient("D", Genotype::HomozygousReference, &[2011], &[12648]),
            // not classified by the HPO predicate
            patient("E", Genotype::HomozygousReference, &[], &[]),
            // not classified by the genotype classifier
            patient("F", Genotype::HomozygousAlternate, &[12648], &[]),
        ]
        .into_iter()
        .collect();

        let gt_clf = allele_count(
            AlleleCounter::new(GenePredicate::new("ABC1")),
            vec![vec![0], vec![1]],
        )
        .unwrap();
        let pheno_clfs = vec![
            HpoPredicate::new(&ontology, 12648u32.into(), false).unwrap(),
            HpoPredicate::new(&ontology, 2011u32.into(), false).unwrap(),
        ];

        let (n_usable, tables) = build_contingency_tables(&cohort, &gt_clf, &pheno_clfs).unwrap();
        assert_eq!(n_usable, vec![4, 1]);
        assert_eq!(tables[0].cells(), &[0, 2, 2, 0]);
        assert_eq!(tables[1].cells(), &[1, 0, 0, 0]);

        assert_eq!(tables[0].row_name(), pheno_clfs[0].question());
        assert_eq!(tables[0].col_name(), gt_clf.question());
        assert_eq!(tables[0].col_categories()[1].name(), "1");

        for (n, table) in n_usable.iter().zip(&tables) {
            assert_eq!(*n as u32, table.total());
        }

        let (n, table) = count_patients(&cohort, &gt_clf, &pheno_clfs[0]).unwrap();
        assert_eq!(n, 4);
        assert_eq!(table, tables[0]);
    }

    #[test]
    fn unclassified_cohort() {
        let ontology = example_ontology();
        let cohort: Cohort = (0..5)
            .map(|idx| patient(&idx.to_string(), Genotype::Heterozygous, &[12648], &[]))
            .collect();
        assert!(cohort.iter().all(|p| p.sex() == Sex::Unknown));

        let pheno_clfs = vec![HpoPredicate::new(&ontology, 12648u32.into(), false).unwrap()];
        let (n_usable, tables) =
            build_contingency_tables(&cohort, &SexClassifier::default(), &pheno_clfs).unwrap();
        assert_eq!(n_usable, vec![0]);
        assert!(tables[0].is_empty());
    }
}
