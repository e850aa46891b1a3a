use faer::Mat;
use flowtrack_assignment::HungarianSolver;
use flowtrack_core::metric::{AngularSimilarity, Distance, Euclidean, Similarity};
use flowtrack_core::Point2d;

use crate::correspondence::Correspondences;
use crate::error::MatchingError;
use crate::observer::ScoreObserver;

/// Parameters of the candidate matcher.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Pairs farther apart than this distance are not candidates and score 0.
    pub max_distance: f64,
    /// Minimum score a pair needs to be considered as a match.
    pub significance_threshold: f64,
    /// Pairs closer than this distance are co-located and score 1.
    pub coincidence_epsilon: f64,
    /// Target index that can never be accepted as a match.
    ///
    /// `None` accepts every target. `Some(0)` keeps the convention where the
    /// first target slot is reserved.
    pub reserved_target: Option<usize>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_distance: 20.0,
            significance_threshold: 1e-10,
            coincidence_epsilon: 1e-30,
            reserved_target: None,
        }
    }
}

impl MatcherConfig {
    /// Check that every threshold is a non-negative number and that the
    /// coincidence radius is strictly positive.
    pub fn validate(&self) -> Result<(), MatchingError> {
        let thresholds = [
            ("max_distance", self.max_distance),
            ("significance_threshold", self.significance_threshold),
            ("coincidence_epsilon", self.coincidence_epsilon),
        ];
        for (name, value) in thresholds {
            if value.is_nan() || value < 0.0 {
                return Err(MatchingError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        // scores divide by the distance of every pair outside this radius
        if self.coincidence_epsilon == 0.0 || self.coincidence_epsilon.is_infinite() {
            return Err(MatchingError::InvalidConfig(format!(
                "coincidence_epsilon must be positive and finite, got {}",
                self.coincidence_epsilon
            )));
        }
        Ok(())
    }
}

/// A candidate target for a source point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index of the target in observation B.
    pub index: usize,
    /// Score of the pair.
    pub score: f64,
}

/// Result of matching two observations.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Score matrix of shape (|A|, |B|), zero marks pairs that are not candidates.
    pub scores: Mat<f64>,
    /// The resolved matches.
    pub correspondences: Correspondences,
}

/// Scores pairs of points by proximity and descriptor similarity and resolves matches.
#[derive(Debug, Clone)]
pub struct CandidateMatcher<D = Euclidean, S = AngularSimilarity> {
    config: MatcherConfig,
    distance: D,
    similarity: S,
}

impl Default for CandidateMatcher {
    fn default() -> Self {
        Self {
            config: MatcherConfig::default(),
            distance: Euclidean,
            similarity: AngularSimilarity,
        }
    }
}

impl<D: Distance, S: Similarity> CandidateMatcher<D, S> {
    /// Create a new matcher with the given distance and similarity strategies.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidConfig`] if a threshold is negative.
    pub fn new(config: MatcherConfig, distance: D, similarity: S) -> Result<Self, MatchingError> {
        config.validate()?;
        Ok(Self {
            config,
            distance,
            similarity,
        })
    }

    /// Get the matcher configuration.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Score a single pair given its distance and descriptors.
    ///
    /// Out of range pairs score exactly 0, co-located pairs score exactly 1
    /// and pairs with a degenerate similarity score 0.
    pub fn score_pair(&self, distance: f64, desc_a: &[f64], desc_b: &[f64]) -> f64 {
        if distance > self.config.max_distance {
            return 0.0;
        }
        if distance < self.config.coincidence_epsilon {
            return 1.0;
        }
        match self.similarity.similarity(desc_a, desc_b) {
            Some(similarity) => similarity / distance,
            None => 0.0,
        }
    }

    /// Compute the score matrix between observation A and observation B.
    ///
    /// # Arguments
    ///
    /// * `points_a` - Points of observation A.
    /// * `desc_a` - One descriptor per point of A.
    /// * `points_b` - Points of observation B.
    /// * `desc_b` - One descriptor per point of B.
    ///
    /// # Returns
    ///
    /// A matrix of shape (|A|, |B|).
    pub fn score_matrix<P: AsRef<[f64]>>(
        &self,
        points_a: &[Point2d],
        desc_a: &[P],
        points_b: &[Point2d],
        desc_b: &[P],
    ) -> Result<Mat<f64>, MatchingError> {
        self.score_matrix_observed(points_a, desc_a, points_b, desc_b, &mut ())
    }

    /// Same as [`Self::score_matrix`], reporting every non-zero score to `observer`.
    pub fn score_matrix_observed<P: AsRef<[f64]>>(
        &self,
        points_a: &[Point2d],
        desc_a: &[P],
        points_b: &[Point2d],
        desc_b: &[P],
        observer: &mut impl ScoreObserver,
    ) -> Result<Mat<f64>, MatchingError> {
        validate_inputs(points_a, desc_a, points_b, desc_b)?;

        let mut scores = Mat::<f64>::zeros(points_a.len(), points_b.len());
        for (i, (p, da)) in points_a.iter().zip(desc_a.iter()).enumerate() {
            for (j, (q, db)) in points_b.iter().zip(desc_b.iter()).enumerate() {
                let d = self.distance.distance(p, q);
                let score = self.score_pair(d, da.as_ref(), db.as_ref());
                if score != 0.0 {
                    scores.write(i, j, score);
                    observer.observe(i, j, score);
                }
            }
        }

        Ok(scores)
    }

    /// Significant candidates of `row`, best first.
    ///
    /// Equal scores keep the lower target index first.
    pub fn ranked_candidates(&self, scores: &Mat<f64>, row: usize) -> Vec<Candidate> {
        if row >= scores.nrows() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = (0..scores.ncols())
            .map(|index| Candidate {
                index,
                score: scores.read(row, index),
            })
            .filter(|c| c.score > self.config.significance_threshold)
            .collect();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Resolve every row to its best candidate.
    ///
    /// The top candidate is dropped, not replaced, when it is the reserved
    /// target. Two rows may resolve to the same target.
    pub fn select_greedy(&self, scores: &Mat<f64>) -> Correspondences {
        let mut correspondences = Correspondences::new();
        for row in 0..scores.nrows() {
            let Some(best) = self.ranked_candidates(scores, row).first().copied() else {
                continue;
            };
            if self.is_reserved(best.index) {
                continue;
            }
            correspondences.insert(row, best.index);
        }
        correspondences
    }

    /// Resolve a conflict-free matching with the most significant pairs,
    /// breaking ties by the largest product of scores.
    ///
    /// Scores are compared on a log scale, `log2(max_score) - log2(score)`, so
    /// a single huge score does not flatten the others. Non-candidates, the
    /// reserved target and non-finite scores cost more than any set of
    /// candidates together and are removed from the result.
    pub fn select_optimal(
        &self,
        scores: &Mat<f64>,
        solver: &HungarianSolver,
    ) -> Result<Correspondences, MatchingError> {
        let eligible = |i: usize, j: usize| {
            let score = scores.read(i, j);
            score.is_finite() && score > self.config.significance_threshold && !self.is_reserved(j)
        };

        let mut max_score = 0.0_f64;
        let mut min_score = f64::INFINITY;
        for i in 0..scores.nrows() {
            for j in 0..scores.ncols() {
                if eligible(i, j) {
                    max_score = max_score.max(scores.read(i, j));
                    min_score = min_score.min(scores.read(i, j));
                }
            }
        }
        if max_score == 0.0 {
            return Ok(Correspondences::new());
        }

        let max_log = max_score.log2();
        let spread = max_log - min_score.log2();
        let max_pairs = scores.nrows().min(scores.ncols()) as f64;
        let unmatched_cost = (spread + 1.0) * max_pairs;

        let cost = Mat::<f64>::from_fn(scores.nrows(), scores.ncols(), |i, j| {
            if eligible(i, j) {
                (max_log - scores.read(i, j).log2()).max(0.0)
            } else {
                unmatched_cost
            }
        });

        let assignment = solver.solve(&cost)?;
        Ok(assignment
            .pairs
            .into_iter()
            .filter(|&(i, j)| eligible(i, j))
            .collect())
    }

    /// Score both observations and resolve each source to its best candidate.
    pub fn match_greedy<P: AsRef<[f64]>>(
        &self,
        points_a: &[Point2d],
        desc_a: &[P],
        points_b: &[Point2d],
        desc_b: &[P],
    ) -> Result<MatchResult, MatchingError> {
        self.match_greedy_observed(points_a, desc_a, points_b, desc_b, &mut ())
    }

    /// Same as [`Self::match_greedy`], reporting every non-zero score to `observer`.
    pub fn match_greedy_observed<P: AsRef<[f64]>>(
        &self,
        points_a: &[Point2d],
        desc_a: &[P],
        points_b: &[Point2d],
        desc_b: &[P],
        observer: &mut impl ScoreObserver,
    ) -> Result<MatchResult, MatchingError> {
        let scores = self.score_matrix_observed(points_a, desc_a, points_b, desc_b, observer)?;
        let correspondences = self.select_greedy(&scores);

        log::debug!(
            "Greedy matching: {} of {} sources matched",
            correspondences.len(),
            points_a.len()
        );

        Ok(MatchResult {
            scores,
            correspondences,
        })
    }

    /// Score both observations and resolve a globally optimal one-to-one matching.
    pub fn match_optimal<P: AsRef<[f64]>>(
        &self,
        points_a: &[Point2d],
        desc_a: &[P],
        points_b: &[Point2d],
        desc_b: &[P],
        solver: &HungarianSolver,
    ) -> Result<MatchResult, MatchingError> {
        let scores = self.score_matrix(points_a, desc_a, points_b, desc_b)?;
        let correspondences = self.select_optimal(&scores, solver)?;

        log::debug!(
            "Optimal matching: {} of {} sources matched",
            correspondences.len(),
            points_a.len()
        );

        Ok(MatchResult {
            scores,
            correspondences,
        })
    }

    fn is_reserved(&self, target: usize) -> bool {
        self.config.reserved_target == Some(target)
    }
}

fn validate_inputs<P: AsRef<[f64]>>(
    points_a: &[Point2d],
    desc_a: &[P],
    points_b: &[Point2d],
    desc_b: &[P],
) -> Result<(), MatchingError> {
    if points_a.len() != desc_a.len() {
        return Err(MatchingError::LengthMismatch(points_a.len(), desc_a.len()));
    }
    if points_b.len() != desc_b.len() {
        return Err(MatchingError::LengthMismatch(points_b.len(), desc_b.len()));
    }

    // the first descriptor fixes the length for the whole call
    let Some(expected) = desc_a.iter().chain(desc_b.iter()).map(|d| d.as_ref().len()).next() else {
        return Ok(());
    };
    for d in desc_a.iter().chain(desc_b.iter()) {
        let found = d.as_ref().len();
        if found != expected {
            return Err(MatchingError::DescriptorLength { expected, found });
        }
    }
    Ok(())
}
