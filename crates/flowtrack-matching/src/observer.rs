/// Receives every non-zero score computed while building a score matrix.
///
/// Observers are for diagnostics only, they cannot change the scores.
pub trait ScoreObserver {
    /// Called once per computed non-zero score.
    fn observe(&mut self, row: usize, col: usize, score: f64);
}

/// The no-op observer.
impl ScoreObserver for () {
    #[inline]
    fn observe(&mut self, _row: usize, _col: usize, _score: f64) {}
}

/// Collects the score population for later distribution analysis.
#[derive(Debug, Clone, Default)]
pub struct ScorePopulation {
    scores: Vec<f64>,
}

impl ScorePopulation {
    /// Create an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get as reference the recorded scores, in observation order.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Get the number of recorded scores.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if no score was recorded.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Smallest recorded score.
    pub fn min(&self) -> Option<f64> {
        self.scores.iter().copied().min_by(|a, b| a.total_cmp(b))
    }

    /// Largest recorded score.
    pub fn max(&self) -> Option<f64> {
        self.scores.iter().copied().max_by(|a, b| a.total_cmp(b))
    }

    /// Mean of the recorded scores.
    pub fn mean(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        Some(self.scores.iter().sum::<f64>() / self.scores.len() as f64)
    }

    /// Drop all recorded scores.
    pub fn clear(&mut self) {
        self.scores.clear();
    }
}

impl ScoreObserver for ScorePopulation {
    fn observe(&mut self, _row: usize, _col: usize, score: f64) {
        self.scores.push(score);
    }
}
