use flowtrack_core::point::euclidean_distance;
use flowtrack_core::{Point2d, PointSet};

use crate::disjoint_set::DisjointSet;
use crate::error::ClusterError;

/// How points are linked into clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Linkage {
    /// Seeded scan: each pass grows one cluster and tests every remaining point
    /// once against the members gathered so far. Points tested before their
    /// neighbours joined are left for later clusters, so the result depends on
    /// the input order.
    #[default]
    Fast,
    /// Exact connected components over all pairs within the edge length,
    /// independent of the input order.
    Strict,
}

/// Partition a point set into clusters connected by edges of at most `max_edge_length`.
///
/// Every input point ends up in exactly one cluster and no cluster is empty.
///
/// # Arguments
///
/// * `points` - The point set to decompose.
/// * `max_edge_length` - The longest distance at which two points are linked.
/// * `linkage` - The linkage mode.
///
/// # Errors
///
/// Returns [`ClusterError::EmptyInput`] if the set is empty and
/// [`ClusterError::InvalidThreshold`] if the edge length is negative.
pub fn decompose(
    points: &PointSet,
    max_edge_length: f64,
    linkage: Linkage,
) -> Result<Vec<PointSet>, ClusterError> {
    if max_edge_length.is_nan() || max_edge_length < 0.0 {
        return Err(ClusterError::InvalidThreshold(max_edge_length));
    }
    if points.is_empty() {
        return Err(ClusterError::EmptyInput);
    }

    let clusters = match linkage {
        Linkage::Fast => decompose_fast(points.points(), max_edge_length),
        Linkage::Strict => decompose_strict(points.points(), max_edge_length),
    };

    log::debug!(
        "Decomposed {} points into {} clusters ({:?})",
        points.len(),
        clusters.len(),
        linkage
    );

    Ok(clusters)
}

fn decompose_fast(points: &[Point2d], max_edge_length: f64) -> Vec<PointSet> {
    let mut clusters = Vec::new();
    let mut pool = points.to_vec();

    while let Some(seed) = pool.pop() {
        let mut members = vec![seed];
        let mut deferred = Vec::with_capacity(pool.len());

        while let Some(p) = pool.pop() {
            let linked = members
                .iter()
                .any(|q| euclidean_distance(&p, q) <= max_edge_length);
            if linked {
                members.push(p);
            } else {
                deferred.push(p);
            }
        }

        clusters.push(PointSet::new(members));
        pool = deferred;
    }

    clusters
}

fn decompose_strict(points: &[Point2d], max_edge_length: f64) -> Vec<PointSet> {
    let mut forest = DisjointSet::new(points.len());
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if euclidean_distance(&points[i], &points[j]) <= max_edge_length {
                forest.union(i, j);
            }
        }
    }

    forest
        .groups()
        .into_iter()
        .map(|group| group.into_iter().map(|i| points[i]).collect())
        .collect()
}
