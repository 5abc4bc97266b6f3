use std::collections::HashMap;

use crate::{HpoGroup, HpoTermId};

const DEFAULT_NUM_PARENTS: usize = 10;
const DEFAULT_NUM_ALL_PARENTS: usize = 30;

/// A single node of the [`Ontology`](crate::Ontology) graph
#[derive(Debug)]
pub(crate) struct TermNode {
    id: HpoTermId,
    name: String,
    parents: HpoGroup,
    all_parents: HpoGroup,
    children: HpoGroup,
}

impl TermNode {
    pub fn new(name: String, id: HpoTermId) -> TermNode {
        TermNode {
            id,
            name,
            parents: HpoGroup::with_capacity(DEFAULT_NUM_PARENTS),
            all_parents: HpoGroup::with_capacity(DEFAULT_NUM_ALL_PARENTS),
            children: HpoGroup::with_capacity(DEFAULT_NUM_PARENTS),
        }
    }

    pub fn id(&self) -> HpoTermId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &HpoGroup {
        &self.parents
    }

    pub fn children(&self) -> &HpoGroup {
        &self.children
    }

    pub fn all_parents(&self) -> &HpoGroup {
        &self.all_parents
    }

    pub fn all_parents_mut(&mut self) -> &mut HpoGroup {
        &mut self.all_parents
    }

    /// A term without parents (the root) never needs a cache
    pub fn parents_cached(&self) -> bool {
        if self.parents.is_empty() {
            true
        } else {
            !self.all_parents.is_empty()
        }
    }

    pub fn add_parent(&mut self, parent_id: HpoTermId) {
        self.parents.insert(parent_id);
    }

    pub fn add_child(&mut self, child_id: HpoTermId) {
        self.children.insert(child_id);
    }
}

#[derive(Default)]
pub(crate) struct Arena {
    terms: HashMap<HpoTermId, TermNode>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn insert(&mut self, term: TermNode) {
        self.terms.insert(term.id(), term);
    }

    pub fn get(&self, id: HpoTermId) -> Option<&TermNode> {
        self.terms.get(&id)
    }

    pub fn get_mut(&mut self, id: HpoTermId) -> Option<&mut TermNode> {
        self.terms.get_mut(&id)
    }

    pub fn contains(&self, id: HpoTermId) -> bool {
        self.terms.contains_key(&id)
    }

    pub fn keys(&self) -> Vec<HpoTermId> {
        self.terms.keys().copied().collect()
    }
}
