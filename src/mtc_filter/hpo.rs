use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::clf::{GenotypeClassifier, PhenotypeClassifier};
use crate::mtc_filter::{check_table_count, MtcIssue, PhenotypeMtcFilter, PhenotypeMtcResult};
use crate::{
    ContingencyTable, GpError, GpResult, HpoGroup, HpoTermId, OntologyGraph,
    PHENOTYPIC_ABNORMALITY,
};

/// Tables with fewer observations cannot reach significance
const MIN_OBSERVATIONS_2X2: u32 = 7;

/// Maximum difference of two proportions that are considered equal
const PROPORTION_TOLERANCE: f64 = 5e-4;

/// Filters HPO terms based on the ontology structure and the observed counts
///
/// Each term is checked against the following rules, the first failing
/// rule determines the [`MtcIssue`]:
///
/// 1. The term is a general term, e.g. `Phenotypic abnormality` or
///    `Abnormality of the nervous system`
/// 2. The term is not a descendant of `Phenotypic abnormality`
/// 3. No genotype group has the phenotype in at least
///    `term_frequency_threshold` of its patients
/// 4. The table is `2 x 2` and has less than 7 observations
/// 5. No genotype group has more than one patient with the phenotype
/// 6. All genotype groups have the same proportion of patients with the phenotype
/// 7. A genotype group has no observations
///
/// Terms are visited from the leaves towards the root of the ontology.
///
/// # Examples
///
/// ```
/// use genophenocorr::{ContingencyTable, Ontology};
/// use genophenocorr::clf::{HpoPredicate, SexClassifier};
/// use genophenocorr::mtc_filter::{HpoMtcFilter, MtcIssue, PhenotypeMtcFilter, PhenotypeMtcResult};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("All".into(), 1u32);
/// ontology.insert_term("Phenotypic abnormality".into(), 118u32);
/// ontology.insert_term("Abnormality of the nervous system".into(), 707u32);
/// ontology.insert_term("Seizure".into(), 1250u32);
/// ontology.add_parent(1u32, 118u32).unwrap();
/// ontology.add_parent(118u32, 707u32).unwrap();
/// ontology.add_parent(707u32, 1250u32).unwrap();
/// ontology.create_cache();
///
/// let filter = HpoMtcFilter::default_filter(&ontology, 0.4).unwrap();
///
/// let pheno_clfs = vec![
///     HpoPredicate::new(&ontology, 707u32.into(), false).unwrap(),
///     HpoPredicate::new(&ontology, 1250u32.into(), false).unwrap(),
/// ];
/// let counts = vec![
///     ContingencyTable::from_rows(&[[9, 1], [1, 9]]).unwrap(),
///     ContingencyTable::from_rows(&[[9, 1], [1, 9]]).unwrap(),
/// ];
/// let results = filter.filter(&SexClassifier::default(), &pheno_clfs, &counts).unwrap();
///
/// assert_eq!(results[0], PhenotypeMtcResult::Failed(MtcIssue::GeneralTerm));
/// assert!(results[1].is_passed());
/// ```
pub struct HpoMtcFilter<'a> {
    ontology: &'a dyn OntologyGraph,
    phenotype_root: HpoTermId,
    general_terms: HpoGroup,
    term_frequency_threshold: f64,
}

impl<'a> HpoMtcFilter<'a> {
    pub const DEFAULT_TERM_FREQUENCY_THRESHOLD: f64 = 0.4;

    /// Constructs the filter with the default set of general terms
    ///
    /// General terms are
    /// - `Phenotypic abnormality` and its ancestors
    /// - the direct children of `Phenotypic abnormality`
    /// - grandchildren and great-grandchildren of `Phenotypic abnormality`
    ///   whose name starts with `Abnormal`
    ///
    /// # Errors
    ///
    /// [`GpError::InvalidThreshold`] if `term_frequency_threshold` is not within `[0, 1]`
    pub fn default_filter(
        ontology: &'a dyn OntologyGraph,
        term_frequency_threshold: f64,
    ) -> GpResult<Self> {
        let phenotype_root = HpoTermId::from(PHENOTYPIC_ABNORMALITY);
        let general_terms = general_hpo_terms(ontology, phenotype_root);
        Self::new(
            ontology,
            phenotype_root,
            general_terms,
            term_frequency_threshold,
        )
    }

    /// Constructs the filter with a custom set of general terms
    ///
    /// # Errors
    ///
    /// [`GpError::InvalidThreshold`] if `term_frequency_threshold` is not within `[0, 1]`
    pub fn new(
        ontology: &'a dyn OntologyGraph,
        phenotype_root: HpoTermId,
        general_terms: HpoGroup,
        term_frequency_threshold: f64,
    ) -> GpResult<Self> {
        if !(0.0..=1.0).contains(&term_frequency_threshold) {
            return Err(GpError::InvalidThreshold(term_frequency_threshold));
        }
        Ok(Self {
            ontology,
            phenotype_root,
            general_terms,
            term_frequency_threshold,
        })
    }

    pub fn general_terms(&self) -> &HpoGroup {
        &self.general_terms
    }

    pub fn term_frequency_threshold(&self) -> f64 {
        self.term_frequency_threshold
    }

    /// Orders the terms and all their ancestors from the leaves to the root
    ///
    /// A term is only listed after all of its children within the set.
    /// The root of the ontology is not part of the order.
    pub fn leaves_to_root<I: IntoIterator<Item = HpoTermId>>(&self, terms: I) -> Vec<HpoTermId> {
        let mut all_terms = HpoGroup::new();
        for term in terms {
            all_terms.extend(&self.ontology.ancestors(term, true));
        }
        all_terms.remove(&self.ontology.root());

        let mut unvisited_children: HashMap<HpoTermId, usize> = all_terms
            .iter()
            .map(|term| {
                let n = self
                    .ontology
                    .children(term)
                    .iter()
                    .filter(|child| all_terms.contains(child))
                    .count();
                (term, n)
            })
            .collect();

        let mut queue: VecDeque<HpoTermId> = all_terms
            .iter()
            .filter(|term| unvisited_children.get(term) == Some(&0))
            .collect();

        let mut order = Vec::with_capacity(all_terms.len());
        while let Some(term) = queue.pop_front() {
            order.push(term);
            for parent in &self.ontology.parents(term) {
                if let Some(n) = unvisited_children.get_mut(&parent) {
                    *n -= 1;
                    if *n == 0 {
                        queue.push_back(parent);
                    }
                }
            }
        }
        order
    }

    fn check<C: PhenotypeClassifier<HpoTermId>>(
        &self,
        clf: &C,
        table: &ContingencyTable,
    ) -> GpResult<PhenotypeMtcResult> {
        let term = *clf.phenotype();
        if self.general_terms.contains(&term) {
            return Ok(PhenotypeMtcResult::Failed(MtcIssue::GeneralTerm));
        }
        if !self.ontology.is_descendant_of(term, self.phenotype_root) {
            return Ok(PhenotypeMtcResult::Failed(MtcIssue::NonPhenotypeTerm));
        }

        let present_row = clf
            .category_index(clf.present_phenotype_categorization())
            .ok_or_else(|| {
                GpError::InvalidClassifier(format!(
                    "the present categorization of {term} is not one of its categorizations"
                ))
            })?;
        let present: Vec<u32> = table
            .rows()
            .nth(present_row)
            .map(<[u32]>::to_vec)
            .unwrap_or_default();
        let totals = table.col_sums();

        let max_frequency = present
            .iter()
            .zip(&totals)
            .filter(|(_, total)| **total > 0)
            .map(|(p, total)| f64::from(*p) / f64::from(*total))
            .fold(0.0, f64::max);
        if max_frequency < self.term_frequency_threshold {
            return Ok(PhenotypeMtcResult::Failed(
                MtcIssue::BelowFrequencyThreshold {
                    max_frequency,
                    threshold: self.term_frequency_threshold,
                },
            ));
        }

        if table.dim() == (2, 2) && table.total() < MIN_OBSERVATIONS_2X2 {
            return Ok(PhenotypeMtcResult::Failed(MtcIssue::NotPowered {
                total: table.total(),
            }));
        }

        if !present.iter().any(|count| *count > 1) {
            return Ok(PhenotypeMtcResult::Failed(
                MtcIssue::TooFewPresentObservations,
            ));
        }

        let has_empty_group = totals.iter().any(|total| *total == 0);
        if !has_empty_group && same_proportions(&present, &totals) {
            return Ok(PhenotypeMtcResult::Failed(MtcIssue::SameProportions));
        }
        if has_empty_group {
            return Ok(PhenotypeMtcResult::Failed(MtcIssue::EmptyGenotypeGroup));
        }

        Ok(PhenotypeMtcResult::Passed)
    }
}

impl PhenotypeMtcFilter<HpoTermId> for HpoMtcFilter<'_> {
    fn name(&self) -> &str {
        "HPO MTC filter"
    }

    fn filter<G, C>(
        &self,
        gt_clf: &G,
        pheno_clfs: &[C],
        counts: &[ContingencyTable],
    ) -> GpResult<Vec<PhenotypeMtcResult>>
    where
        G: GenotypeClassifier + ?Sized,
        C: PhenotypeClassifier<HpoTermId>,
    {
        check_table_count(pheno_clfs.len(), counts.len())?;
        debug!(
            "Filtering {} HPO terms for `{}`",
            pheno_clfs.len(),
            gt_clf.question()
        );

        let mut positions: HashMap<HpoTermId, Vec<usize>> = HashMap::new();
        for (idx, clf) in pheno_clfs.iter().enumerate() {
            positions.entry(*clf.phenotype()).or_default().push(idx);
        }

        let ordered_terms = self.leaves_to_root(pheno_clfs.iter().map(|clf| *clf.phenotype()));
        let mut visit: Vec<usize> = ordered_terms
            .iter()
            .filter_map(|term| positions.get(term))
            .flatten()
            .copied()
            .collect();
        // terms outside of the ordered hierarchy (e.g. the root) come last
        let ordered_terms: HpoGroup = ordered_terms.into_iter().collect();
        visit.extend(
            (0..pheno_clfs.len()).filter(|idx| !ordered_terms.contains(pheno_clfs[*idx].phenotype())),
        );

        let mut results: Vec<Option<PhenotypeMtcResult>> = vec![None; pheno_clfs.len()];
        for idx in visit {
            let result = self.check(&pheno_clfs[idx], &counts[idx])?;
            debug!("{}: {result}", pheno_clfs[idx].phenotype());
            results[idx] = Some(result);
        }

        results
            .into_iter()
            .enumerate()
            .map(|(idx, result)| result.ok_or(GpError::MtcVerdictMissing(idx)))
            .collect()
    }
}

/// Returns `true` if all genotype groups have the same proportion of present phenotypes
fn same_proportions(present: &[u32], totals: &[u32]) -> bool {
    let mut ratios = present
        .iter()
        .zip(totals)
        .map(|(p, total)| f64::from(*p) / f64::from(*total));
    let Some(first) = ratios.next() else {
        return true;
    };
    ratios.all(|ratio| (ratio - first).abs() < PROPORTION_TOLERANCE)
}

fn starts_with_abnormal(ontology: &dyn OntologyGraph, term: HpoTermId) -> bool {
    ontology
        .name(term)
        .map_or(false, |name| name.starts_with("Abnormal"))
}

/// Collects the terms that are too general to be tested
fn general_hpo_terms(ontology: &dyn OntologyGraph, phenotype_root: HpoTermId) -> HpoGroup {
    let mut general = ontology.ancestors(phenotype_root, true);
    let children = ontology.children(phenotype_root);
    general.extend(&children);
    for child in &children {
        for grandchild in &ontology.children(child) {
            if starts_with_abnormal(ontology, grandchild) {
                general.insert(grandchild);
            }
            for great_grandchild in &ontology.children(grandchild) {
                if starts_with_abnormal(ontology, great_grandchild) {
                    general.insert(great_grandchild);
                }
            }
        }
    }
    general
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clf::{HpoPredicate, SexClassifier};
    use crate::fixtures::example_ontology;
    use crate::Ontology;

    fn verdict(ontology: &Ontology, term: u32, rows: &[&[u32]]) -> PhenotypeMtcResult {
        let filter = HpoMtcFilter::default_filter(ontology, 0.4).unwrap();
        let clfs = vec![HpoPredicate::new(ontology, term.into(), false).unwrap()];
        let counts = vec![ContingencyTable::from_rows(rows).unwrap()];
        filter
            .filter(&SexClassifier::default(), &clfs, &counts)
            .unwrap()
            .remove(0)
    }

    fn failed(issue: MtcIssue) -> PhenotypeMtcResult {
        PhenotypeMtcResult::Failed(issue)
    }

    #[test]
    fn general_terms_of_example_ontology() {
        let ontology = example_ontology();
        let filter = HpoMtcFilter::default_filter(&ontology, 0.4).unwrap();
        let expected: HpoGroup = [
            1u32, 118, 707, 818, 1939, 2715, 12638, 12639, 864, 11017, 25454, 10978, 12285, 12647,
        ]
        .into_iter()
        .map(HpoTermId::from)
        .collect();
        assert_eq!(filter.general_terms(), &expected);
    }

    #[test]
    fn invalid_threshold() {
        let ontology = example_ontology();
        assert!(matches!(
            HpoMtcFilter::default_filter(&ontology, 1.5),
            Err(GpError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn leaves_come_first() {
        let ontology = example_ontology();
        let filter = HpoMtcFilter::default_filter(&ontology, 0.4).unwrap();
        let order = filter.leaves_to_root([HpoTermId::from(12285u32), HpoTermId::from(12648u32)]);

        // all ancestors except the root
        assert_eq!(order.len(), 11 + 4);
        assert!(!order.contains(&HpoTermId::from(1u32)));
        assert_eq!(order.last(), Some(&HpoTermId::from(118u32)));

        let position = |id: u32| {
            order
                .iter()
                .position(|t| *t == HpoTermId::from(id))
                .unwrap()
        };
        for term in &order {
            for child in &ontology.children(*term) {
                if order.contains(&child) {
                    assert!(position(child.as_u32()) < position(term.as_u32()));
                }
            }
        }
    }

    #[test]
    fn general_and_non_phenotype_terms() {
        let ontology = example_ontology();
        let rows: &[&[u32]] = &[&[9, 1], &[1, 9]];
        assert_eq!(verdict(&ontology, 707, rows), failed(MtcIssue::GeneralTerm));
        assert_eq!(verdict(&ontology, 1, rows), failed(MtcIssue::GeneralTerm));
        assert_eq!(
            verdict(&ontology, 3581, rows),
            failed(MtcIssue::NonPhenotypeTerm)
        );
        assert_eq!(verdict(&ontology, 12648, rows), PhenotypeMtcResult::Passed);
    }

    #[test]
    fn frequency_threshold() {
        let ontology = example_ontology();
        let result = verdict(&ontology, 12648, &[&[1, 1], &[9, 9]]);
        assert_eq!(
            result,
            failed(MtcIssue::BelowFrequencyThreshold {
                max_frequency: 0.1,
                threshold: 0.4
            })
        );
        // empty genotype groups are ignored
        let result = verdict(&ontology, 12648, &[&[0, 1, 0], &[0, 9, 0]]);
        assert!(matches!(
            result.reason(),
            Some(MtcIssue::BelowFrequencyThreshold { .. })
        ));
        // no observations at all
        let result = verdict(&ontology, 12648, &[&[0, 0], &[0, 0]]);
        assert!(matches!(
            result.reason(),
            Some(MtcIssue::BelowFrequencyThreshold { max_frequency, .. }) if *max_frequency == 0.0
        ));
    }

    #[test]
    fn not_powered() {
        let ontology = example_ontology();
        assert_eq!(
            verdict(&ontology, 2011, &[&[2, 2], &[1, 1]]),
            failed(MtcIssue::NotPowered { total: 6 })
        );
        // 2x3 tables are not checked for power
        assert_ne!(
            verdict(&ontology, 2011, &[&[2, 2, 0], &[1, 0, 1]]),
            failed(MtcIssue::NotPowered { total: 6 })
        );
    }

    #[test]
    fn too_few_present_observations() {
        let ontology = example_ontology();
        assert_eq!(
            verdict(&ontology, 2011, &[&[1, 1, 1], &[0, 0, 1]]),
            failed(MtcIssue::TooFewPresentObservations)
        );
    }

    #[test]
    fn same_proportions_are_skipped() {
        let ontology = example_ontology();
        assert_eq!(
            verdict(&ontology, 2011, &[&[4, 4], &[4, 4]]),
            failed(MtcIssue::SameProportions)
        );
        assert_eq!(
            verdict(&ontology, 2011, &[&[4, 2, 6], &[4, 2, 6]]),
            failed(MtcIssue::SameProportions)
        );
    }

    #[test]
    fn empty_genotype_group() {
        let ontology = example_ontology();
        assert_eq!(
            verdict(&ontology, 12443, &[&[4, 2, 0], &[4, 2, 0]]),
            failed(MtcIssue::EmptyGenotypeGroup)
        );
    }

    #[test]
    fn results_keep_input_order() {
        let ontology = example_ontology();
        let filter = HpoMtcFilter::default_filter(&ontology, 0.4).unwrap();
        let terms = [1u32, 12648, 707, 3581, 100547];
        let clfs: Vec<HpoPredicate> = terms
            .iter()
            .map(|t| HpoPredicate::new(&ontology, (*t).into(), false).unwrap())
            .collect();
        let counts: Vec<ContingencyTable> = terms
            .iter()
            .map(|_| ContingencyTable::from_rows(&[[9, 1], [1, 9]]).unwrap())
            .collect();
        let results = filter
            .filter(&SexClassifier::default(), &clfs, &counts)
            .unwrap();
        assert_eq!(
            results,
            vec![
                failed(MtcIssue::GeneralTerm),
                PhenotypeMtcResult::Passed,
                failed(MtcIssue::GeneralTerm),
                failed(MtcIssue::NonPhenotypeTerm),
                PhenotypeMtcResult::Passed,
            ]
        );
    }
}
