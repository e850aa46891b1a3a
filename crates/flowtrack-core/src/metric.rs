use std::f64::consts::PI;

use crate::point::{euclidean_distance, Point2d};

/// Spatial distance between two points.
///
/// Implementations must be pure and return a non-negative value. Any closure
/// `Fn(&Point2d, &Point2d) -> f64` is a valid distance.
pub trait Distance {
    /// Compute the distance between `a` and `b`.
    fn distance(&self, a: &Point2d, b: &Point2d) -> f64;
}

impl<F> Distance for F
where
    F: Fn(&Point2d, &Point2d) -> f64,
{
    fn distance(&self, a: &Point2d, b: &Point2d) -> f64 {
        self(a, b)
    }
}

/// The L2 distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Distance for Euclidean {
    #[inline]
    fn distance(&self, a: &Point2d, b: &Point2d) -> f64 {
        euclidean_distance(a, b)
    }
}

/// The L1 distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Distance for Manhattan {
    #[inline]
    fn distance(&self, a: &Point2d, b: &Point2d) -> f64 {
        (a[0] - b[0]).abs() + (a[1] - b[1]).abs()
    }
}

/// Appearance similarity between two descriptors.
///
/// Returns `None` when the similarity is undefined for the pair, e.g. a
/// zero-magnitude descriptor. Any closure `Fn(&[f64], &[f64]) -> Option<f64>`
/// is a valid similarity.
pub trait Similarity {
    /// Compute the similarity between descriptors `a` and `b`.
    fn similarity(&self, a: &[f64], b: &[f64]) -> Option<f64>;
}

impl<F> Similarity for F
where
    F: Fn(&[f64], &[f64]) -> Option<f64>,
{
    fn similarity(&self, a: &[f64], b: &[f64]) -> Option<f64> {
        self(a, b)
    }
}

/// Cosine similarity of two descriptors.
///
/// Returns `None` if the descriptors differ in length or either has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    let (dot, mag_a, mag_b) = a
        .iter()
        .zip(b.iter())
        .fold((0.0, 0.0, 0.0), |(dot, ma, mb), (&x, &y)| {
            (dot + x * y, ma + x * x, mb + y * y)
        });

    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    Some((dot / denom).clamp(-1.0, 1.0))
}

/// Angular similarity `0.5 * (pi - acos(cos)) / pi`.
///
/// Opposite descriptors score 0, orthogonal ones 0.25 and parallel ones 0.5.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngularSimilarity;

impl Similarity for AngularSimilarity {
    fn similarity(&self, a: &[f64], b: &[f64]) -> Option<f64> {
        let cos = cosine_similarity(a, b)?;
        Some(0.5 * (PI - cos.acos()) / PI)
    }
}
