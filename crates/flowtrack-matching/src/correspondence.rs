use std::collections::BTreeMap;

use flowtrack_core::{Point2d, Velocity};

/// Resolved matches from indices of observation A to indices of observation B.
///
/// Every A index maps to at most one B index. Unmatched indices are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correspondences(BTreeMap<usize, usize>);

impl Correspondences {
    /// Create an empty set of correspondences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` in A matches `target` in B, replacing any previous match.
    pub fn insert(&mut self, source: usize, target: usize) -> Option<usize> {
        self.0.insert(source, target)
    }

    /// The B index matched to `source`, if any.
    pub fn get(&self, source: usize) -> Option<usize> {
        self.0.get(&source).copied()
    }

    /// Check if `source` has a match.
    pub fn contains(&self, source: usize) -> bool {
        self.0.contains_key(&source)
    }

    /// Get the number of matched A indices.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing was matched.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the `(source, target)` pairs in ascending source order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&a, &b)| (a, b))
    }

    /// Check that no two sources share a target.
    pub fn is_one_to_one(&self) -> bool {
        let mut targets: Vec<usize> = self.0.values().copied().collect();
        targets.sort_unstable();
        targets.windows(2).all(|w| w[0] != w[1])
    }

    /// Displacement of every matched point, as `(origin in A, velocity)`.
    ///
    /// Pairs referencing an index outside either point slice are skipped.
    pub fn motion_vectors(&self, points_a: &[Point2d], points_b: &[Point2d]) -> Vec<(Point2d, Velocity)> {
        self.iter()
            .filter_map(|(a, b)| {
                let p = points_a.get(a)?;
                let q = points_b.get(b)?;
                Some((*p, [q[0] - p[0], q[1] - p[1]]))
            })
            .collect()
    }
}

impl FromIterator<(usize, usize)> for Correspondences {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Correspondences {
    type Item = (usize, usize);
    type IntoIter = std::collections::btree_map::IntoIter<usize, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
