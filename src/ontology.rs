use core::fmt::Debug;

use tracing::debug;

use crate::{GpError, GpResult, HpoGroup, HpoTermId, ROOT_TERM};

mod termarena;
use termarena::{Arena, TermNode};

/// Read-only access to an ontology graph
///
/// This is everything the classifiers and the [`HpoMtcFilter`](crate::mtc_filter::HpoMtcFilter)
/// need to know about the ontology. [`Ontology`] is the in-memory
/// implementation shipped with this crate, but any other graph
/// representation can be plugged in.
///
/// All relations follow the `is_a` direction of the ontology:
/// ancestors are more general, descendants more specific.
pub trait OntologyGraph: Send + Sync {
    /// The root term of the ontology (`HP:0000001` for HPO)
    fn root(&self) -> HpoTermId;

    /// Returns `true` if the term is part of the ontology
    fn contains(&self, term: HpoTermId) -> bool;

    /// The label of the term, e.g. `Phenotypic abnormality`
    fn name(&self, term: HpoTermId) -> Option<&str>;

    /// The direct parents of the term
    fn parents(&self, term: HpoTermId) -> HpoGroup;

    /// The direct children of the term
    fn children(&self, term: HpoTermId) -> HpoGroup;

    /// All direct and indirect parents of the term
    fn ancestors(&self, term: HpoTermId, include_source: bool) -> HpoGroup;

    /// All direct and indirect children of the term
    fn descendants(&self, term: HpoTermId, include_source: bool) -> HpoGroup;

    /// Returns `true` if `ancestor` is a (direct or indirect) parent of `term`
    fn is_ancestor_of(&self, ancestor: HpoTermId, term: HpoTermId) -> bool {
        self.ancestors(term, false).contains(&ancestor)
    }

    /// Returns `true` if `term` is a (direct or indirect) child of `ancestor`
    fn is_descendant_of(&self, term: HpoTermId, ancestor: HpoTermId) -> bool {
        self.is_ancestor_of(ancestor, term)
    }
}

/// In-memory ontology graph
///
/// The ontology is built by hand:
///
/// 1. construct an empty Ontology [`Ontology::default`]
/// 2. Add all terms [`Ontology::insert_term`]
/// 3. Connect terms to their parents [`Ontology::add_parent`]
/// 4. Cache all parent and grandparent connections [`Ontology::create_cache`]
///
/// # Examples
///
/// ```
/// use genophenocorr::{Ontology, OntologyGraph};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("All".into(), 1u32);
/// ontology.insert_term("Phenotypic abnormality".into(), 118u32);
/// ontology.insert_term("Abnormality of the nervous system".into(), 707u32);
///
/// ontology.add_parent(1u32, 118u32).unwrap();
/// ontology.add_parent(118u32, 707u32).unwrap();
/// ontology.create_cache();
///
/// assert!(ontology.is_ancestor_of(1u32.into(), 707u32.into()));
/// assert_eq!(ontology.descendants(1u32.into(), false).len(), 2);
/// assert_eq!(ontology.name(118u32.into()), Some("Phenotypic abnormality"));
/// ```
#[derive(Default)]
pub struct Ontology {
    hpo_terms: Arena,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ontology with {} terms", self.hpo_terms.len())
    }
}

impl Ontology {
    /// Returns the number of terms in the Ontology
    pub fn len(&self) -> usize {
        self.hpo_terms.len()
    }

    /// Returns `true` if the Ontology does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.hpo_terms.len() == 0
    }

    /// Creates and inserts a new term into the ontology
    ///
    /// This method does not link the term to its parents.
    /// Inserting an id twice replaces the previous term.
    pub fn insert_term<I: Into<HpoTermId>>(&mut self, name: String, id: I) {
        self.hpo_terms.insert(TermNode::new(name, id.into()));
    }

    /// Adds a connection from a term to its parent
    ///
    /// # Errors
    ///
    /// [`GpError::DoesNotExist`] if either term is not present in the Ontology
    pub fn add_parent<I: Into<HpoTermId>, J: Into<HpoTermId>>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) -> GpResult<()> {
        let parent_id = parent_id.into();
        let child_id = child_id.into();
        if !self.hpo_terms.contains(child_id) {
            return Err(GpError::DoesNotExist(child_id));
        }
        self.hpo_terms
            .get_mut(parent_id)
            .ok_or(GpError::DoesNotExist(parent_id))?
            .add_child(child_id);
        self.hpo_terms
            .get_mut(child_id)
            .ok_or(GpError::DoesNotExist(child_id))?
            .add_parent(parent_id);
        Ok(())
    }

    /// Creates and caches the `all_parents` values for every term
    ///
    /// This method must be called after all terms and parent
    /// connections are added. Ancestor lookups rely on the cache.
    pub fn create_cache(&mut self) {
        let term_ids = self.hpo_terms.keys();
        debug!("Caching ancestors of {} terms", term_ids.len());
        for id in term_ids {
            self.create_cache_of_grandparents(id);
        }
    }

    /// Returns the cached ancestors of the term, caching them first if needed
    fn all_grandparents(&mut self, term_id: HpoTermId) -> Option<&HpoGroup> {
        if !self.hpo_terms.get(term_id)?.parents_cached() {
            self.create_cache_of_grandparents(term_id);
        }
        self.hpo_terms.get(term_id).map(TermNode::all_parents)
    }

    /// Recursively collects the parents of all parents
    ///
    /// The recursion bubbles up to the root and caches the ancestors
    /// of every visited term on the way back down. It stops at terms
    /// that already have a cache.
    fn create_cache_of_grandparents(&mut self, term_id: HpoTermId) {
        let Some(parents) = self.hpo_terms.get(term_id).map(|t| t.parents().clone()) else {
            return;
        };
        let mut res = HpoGroup::default();
        for parent in &parents {
            if let Some(grandparents) = self.all_grandparents(parent) {
                for gp in grandparents {
                    res.insert(gp);
                }
            }
        }
        if let Some(term) = self.hpo_terms.get_mut(term_id) {
            *term.all_parents_mut() = &res | &parents;
        }
    }
}

impl OntologyGraph for Ontology {
    fn root(&self) -> HpoTermId {
        ROOT_TERM.into()
    }

    fn contains(&self, term: HpoTermId) -> bool {
        self.hpo_terms.contains(term)
    }

    fn name(&self, term: HpoTermId) -> Option<&str> {
        self.hpo_terms.get(term).map(TermNode::name)
    }

    fn parents(&self, term: HpoTermId) -> HpoGroup {
        self.hpo_terms
            .get(term)
            .map(|t| t.parents().clone())
            .unwrap_or_default()
    }

    fn children(&self, term: HpoTermId) -> HpoGroup {
        self.hpo_terms
            .get(term)
            .map(|t| t.children().clone())
            .unwrap_or_default()
    }

    fn ancestors(&self, term: HpoTermId, include_source: bool) -> HpoGroup {
        match self.hpo_terms.get(term) {
            Some(node) => {
                let mut res = node.all_parents().clone();
                if include_source {
                    res.insert(term);
                }
                res
            }
            None => HpoGroup::default(),
        }
    }

    fn descendants(&self, term: HpoTermId, include_source: bool) -> HpoGroup {
        let mut res = HpoGroup::default();
        let Some(node) = self.hpo_terms.get(term) else {
            return res;
        };
        let mut queue: Vec<HpoTermId> = node.children().iter().collect();
        while let Some(id) = queue.pop() {
            if res.insert(id) {
                if let Some(child) = self.hpo_terms.get(id) {
                    queue.extend(child.children().iter());
                }
            }
        }
        if include_source {
            res.insert(term);
        }
        res
    }

    fn is_ancestor_of(&self, ancestor: HpoTermId, term: HpoTermId) -> bool {
        self.hpo_terms
            .get(term)
            .map_or(false, |node| node.all_parents().contains(&ancestor))
    }
}
