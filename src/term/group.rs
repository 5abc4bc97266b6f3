use std::ops::{BitAnd, BitOr};

use smallvec::SmallVec;

use crate::HpoTermId;

/// A set of [`HpoTermId`]s representing a group of HPO terms
///
/// Each term can occur only once in the group and the ids are
/// kept sorted, so membership checks are binary searches.
///
/// The group is used for the parents, children, ancestors and
/// descendants of a term and for the set of general terms of the
/// [`HpoMtcFilter`](crate::mtc_filter::HpoMtcFilter).
///
/// # Examples
///
/// ```
/// use genophenocorr::HpoGroup;
///
/// let mut group = HpoGroup::new();
/// assert!(group.insert(118u32.into()));
/// assert!(!group.insert(118u32.into()));
/// group.insert(1u32.into());
///
/// let ids: Vec<u32> = group.iter().map(|id| id.as_u32()).collect();
/// assert_eq!(ids, vec![1, 118]);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HpoGroup {
    ids: SmallVec<[HpoTermId; 30]>,
}

impl HpoGroup {
    /// Constructs a new, empty [`HpoGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`HpoGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: SmallVec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`HpoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`HpoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`HpoTermId`] to the group
    ///
    /// Returns whether the `HpoTermId` was newly inserted.
    pub fn insert(&mut self, id: HpoTermId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Removes the [`HpoTermId`] from the group
    ///
    /// Returns whether the `HpoTermId` was present.
    pub fn remove(&mut self, id: &HpoTermId) -> bool {
        match self.ids.binary_search(id) {
            Ok(idx) => {
                self.ids.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns `true` if the group contains the [`HpoTermId`]
    pub fn contains(&self, id: &HpoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`HpoTermId`]s inside the group
    pub fn iter(&self) -> HpoTermIds<'_> {
        HpoTermIds::new(self.ids.iter())
    }
}

impl FromIterator<HpoTermId> for HpoGroup {
    fn from_iter<T: IntoIterator<Item = HpoTermId>>(iter: T) -> Self {
        let mut group = HpoGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl Extend<HpoTermId> for HpoGroup {
    fn extend<T: IntoIterator<Item = HpoTermId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a HpoGroup {
    type Item = HpoTermId;
    type IntoIter = HpoTermIds<'a>;

    fn into_iter(self) -> HpoTermIds<'a> {
        HpoTermIds::new(self.ids.iter())
    }
}

/// An iterator over [`HpoTermId`]s
pub struct HpoTermIds<'a> {
    inner: std::slice::Iter<'a, HpoTermId>,
}

impl<'a> HpoTermIds<'a> {
    fn new(inner: std::slice::Iter<'a, HpoTermId>) -> Self {
        Self { inner }
    }
}

impl Iterator for HpoTermIds<'_> {
    type Item = HpoTermId;
    fn next(&mut self) -> Option<HpoTermId> {
        self.inner.next().copied()
    }
}

impl BitOr for &HpoGroup {
    type Output = HpoGroup;

    fn bitor(self, rhs: &HpoGroup) -> HpoGroup {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut group = large.clone();
        for id in small {
            group.insert(id);
        }
        group
    }
}

impl BitAnd for &HpoGroup {
    type Output = HpoGroup;

    fn bitand(self, rhs: &HpoGroup) -> HpoGroup {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut group = HpoGroup::with_capacity(small.len());
        for id in small {
            if large.contains(&id) {
                // `small` is sorted, so pushing keeps the order
                group.ids.push(id);
            }
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[u32]) -> HpoGroup {
        ids.iter().map(|id| HpoTermId::from(*id)).collect()
    }

    #[test]
    fn test_hpogroup_iter() {
        let group = group(&[3, 1, 2]);

        let ids: Vec<HpoTermId> = group.iter().collect();
        assert_eq!(
            ids,
            vec![HpoTermId::from(1u32), HpoTermId::from(2u32), HpoTermId::from(3u32)]
        );

        let mut again = Vec::new();
        for id in &group {
            again.push(id);
        }
        assert_eq!(again.len(), 3);
    }

    #[test]
    fn test_remove() {
        let mut group = group(&[1, 2, 3]);
        assert!(group.remove(&2u32.into()));
        assert!(!group.remove(&2u32.into()));
        assert_eq!(group.len(), 2);
        assert!(!group.contains(&2u32.into()));
    }

    #[test]
    fn test_bitor() {
        let result = &group(&[1, 2, 3]) | &group(&[2, 4]);
        assert_eq!(result, group(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_bitand() {
        let result = &group(&[1, 2, 3]) & &group(&[2, 4, 5, 1]);
        assert_eq!(result, group(&[1, 2]));
        assert!((&group(&[1, 2]) & &group(&[3])).is_empty());
    }
}
