use crate::error::CoreError;

/// A 2D point with continuous coordinates `[x, y]`.
pub type Point2d = [f64; 2];

/// A 2D velocity vector `[vx, vy]`.
pub type Velocity = [f64; 2];

/// An integer cell of a discretized grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    /// The column of the cell.
    pub x: usize,
    /// The row of the cell.
    pub y: usize,
}

impl GridCell {
    /// Create a new grid cell from its column and row.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between the centers of two cells.
    pub fn distance(&self, other: &GridCell) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx.hypot(dy)
    }

    /// The cell center as a continuous point.
    pub fn to_point(&self) -> Point2d {
        [self.x as f64, self.y as f64]
    }
}

impl From<(usize, usize)> for GridCell {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn euclidean_distance(a: &Point2d, b: &Point2d) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// An ordered collection of 2D points captured in a single observation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSet {
    // The points of the set, in capture order.
    points: Vec<Point2d>,
}

impl PointSet {
    /// Create a new point set taking ownership of the points.
    pub fn new(points: Vec<Point2d>) -> Self {
        Self { points }
    }

    /// Get the number of points in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points of the set.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// Consume the set and return its points.
    pub fn into_points(self) -> Vec<Point2d> {
        self.points
    }

    /// Compute the mean of the points.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyInput`] if the set has no points.
    pub fn centroid(&self) -> Result<Point2d, CoreError> {
        if self.points.is_empty() {
            return Err(CoreError::EmptyInput);
        }

        let n = self.points.len() as f64;
        let (sum_x, sum_y) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));

        Ok([sum_x / n, sum_y / n])
    }

    /// Smallest Euclidean distance from `point` to any member of the set.
    ///
    /// Returns `None` if the set is empty.
    pub fn min_distance_to(&self, point: &Point2d) -> Option<f64> {
        self.points
            .iter()
            .map(|q| euclidean_distance(point, q))
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl From<Vec<Point2d>> for PointSet {
    fn from(points: Vec<Point2d>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Point2d> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point2d>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
