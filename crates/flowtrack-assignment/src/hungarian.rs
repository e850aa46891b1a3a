use faer::Mat;

use crate::error::AssignmentError;

/// Default maximum number of cover/adjust rounds.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Parameters of the Hungarian solver.
#[derive(Debug, Clone)]
pub struct AssignmentConfig {
    /// Maximum number of rounds that add zeros to the reduced matrix before
    /// the solver gives up with [`AssignmentError::Unconverged`].
    pub max_iterations: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Result of the assignment solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Assigned `(row, col)` pairs sorted by row.
    pub pairs: Vec<(usize, usize)>,
    /// Sum of the original costs of the assigned pairs.
    pub total_cost: f64,
    /// The number of adjustment rounds performed until a full cover was found.
    pub num_iterations: usize,
}

/// Kuhn-Munkres solver for rectangular cost matrices.
#[derive(Debug, Clone, Default)]
pub struct HungarianSolver {
    config: AssignmentConfig,
}

// Rows and columns covered by the minimum set of lines.
struct Cover {
    rows: Vec<bool>,
    cols: Vec<bool>,
}

impl HungarianSolver {
    /// Create a new solver.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::InvalidConfig`] if `max_iterations` is zero.
    pub fn new(config: AssignmentConfig) -> Result<Self, AssignmentError> {
        if config.max_iterations == 0 {
            return Err(AssignmentError::InvalidConfig(
                "max_iterations must be greater than zero".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Get the solver configuration.
    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Find the minimum-cost assignment of rows to columns.
    ///
    /// The matrix may be rectangular, in which case `min(rows, cols)` pairs are
    /// returned. The input is never modified, the solver works on a padded copy.
    ///
    /// # Arguments
    ///
    /// * `cost` - The cost matrix with finite, non-negative entries.
    ///
    /// # Returns
    ///
    /// The optimal assignment, or [`AssignmentError::Unconverged`] if the
    /// iteration cap is reached first.
    pub fn solve(&self, cost: &Mat<f64>) -> Result<Assignment, AssignmentError> {
        let (rows, cols) = (cost.nrows(), cost.ncols());
        validate_costs(cost)?;

        if rows == 0 || cols == 0 {
            return Ok(Assignment {
                pairs: Vec::new(),
                total_cost: 0.0,
                num_iterations: 0,
            });
        }

        // pad to a square matrix, dummy rows/cols cost nothing
        let n = rows.max(cols);
        let mut work = Mat::<f64>::from_fn(n, n, |i, j| {
            if i < rows && j < cols {
                cost.read(i, j)
            } else {
                0.0
            }
        });

        reduce_rows(&mut work);
        reduce_cols(&mut work);

        let mut num_iterations = 0;
        loop {
            let row_to_col = max_zero_matching(&work);
            let cover = cover_zeros(&work, &row_to_col);
            let num_lines = cover.rows.iter().chain(cover.cols.iter()).filter(|&&c| c).count();

            log::debug!(
                "Iteration: {}, cover lines: {}/{}",
                num_iterations,
                num_lines,
                n
            );

            if num_lines == n {
                let mut pairs = Vec::with_capacity(rows.min(cols));
                let mut total_cost = 0.0;
                for (row, col) in row_to_col.iter().enumerate().take(rows) {
                    if let Some(col) = *col {
                        if col < cols {
                            pairs.push((row, col));
                            total_cost += cost.read(row, col);
                        }
                    }
                }

                return Ok(Assignment {
                    pairs,
                    total_cost,
                    num_iterations,
                });
            }

            if num_iterations >= self.config.max_iterations {
                return Err(AssignmentError::Unconverged {
                    iterations: num_iterations,
                });
            }

            create_additional_zeros(&mut work, &cover);
            num_iterations += 1;
        }
    }
}

/// Cost of the row-wise greedy assignment.
///
/// Each row, in order, takes its cheapest column not already taken. Rows
/// left without a free column are skipped. Ties go to the lower column.
pub fn row_greedy_cost(cost: &Mat<f64>) -> f64 {
    let mut taken = vec![false; cost.ncols()];
    let mut total = 0.0;
    for i in 0..cost.nrows() {
        let best = (0..cost.ncols())
            .filter(|&j| !taken[j])
            .min_by(|&a, &b| cost.read(i, a).total_cmp(&cost.read(i, b)));
        if let Some(j) = best {
            taken[j] = true;
            total += cost.read(i, j);
        }
    }
    total
}

fn validate_costs(cost: &Mat<f64>) -> Result<(), AssignmentError> {
    for row in 0..cost.nrows() {
        for col in 0..cost.ncols() {
            let value = cost.read(row, col);
            if !value.is_finite() || value < 0.0 {
                return Err(AssignmentError::InvalidCost { row, col, value });
            }
        }
    }
    Ok(())
}

fn reduce_rows(m: &mut Mat<f64>) {
    for i in 0..m.nrows() {
        let min = (0..m.ncols())
            .map(|j| m.read(i, j))
            .fold(f64::INFINITY, f64::min);
        for j in 0..m.ncols() {
            m.write(i, j, m.read(i, j) - min);
        }
    }
}

fn reduce_cols(m: &mut Mat<f64>) {
    for j in 0..m.ncols() {
        let min = (0..m.nrows())
            .map(|i| m.read(i, j))
            .fold(f64::INFINITY, f64::min);
        for i in 0..m.nrows() {
            m.write(i, j, m.read(i, j) - min);
        }
    }
}

// Maximum matching restricted to zero entries. Rows first take their first
// free zero column in row-major order, augmenting paths only serve the rows
// left unmatched so ties keep the first encountered zero.
fn max_zero_matching(m: &Mat<f64>) -> Vec<Option<usize>> {
    let n = m.nrows();
    let mut row_to_col = vec![None; n];
    let mut col_to_row = vec![None; m.ncols()];

    for row in 0..n {
        if let Some(col) = first_free_zero(m, row, &col_to_row) {
            row_to_col[row] = Some(col);
            col_to_row[col] = Some(row);
        }
    }

    for row in 0..n {
        if row_to_col[row].is_none() {
            let mut visited = vec![false; m.ncols()];
            augment(m, row, &mut visited, &mut row_to_col, &mut col_to_row);
        }
    }

    row_to_col
}

fn first_free_zero(m: &Mat<f64>, row: usize, col_to_row: &[Option<usize>]) -> Option<usize> {
    (0..m.ncols()).find(|&col| m.read(row, col) == 0.0 && col_to_row[col].is_none())
}

fn augment(
    m: &Mat<f64>,
    row: usize,
    visited: &mut [bool],
    row_to_col: &mut [Option<usize>],
    col_to_row: &mut [Option<usize>],
) -> bool {
    if let Some(col) = first_free_zero(m, row, col_to_row) {
        row_to_col[row] = Some(col);
        col_to_row[col] = Some(row);
        return true;
    }

    for col in 0..m.ncols() {
        if m.read(row, col) != 0.0 || visited[col] {
            continue;
        }
        visited[col] = true;

        let Some(other) = col_to_row[col] else {
            continue;
        };
        if augment(m, other, visited, row_to_col, col_to_row) {
            row_to_col[row] = Some(col);
            col_to_row[col] = Some(row);
            return true;
        }
    }
    false
}

// Minimum line cover of all zeros from a maximum zero matching (Konig).
// Rows reachable from an unmatched row through alternating paths stay
// uncovered, the columns they reach are covered.
fn cover_zeros(m: &Mat<f64>, row_to_col: &[Option<usize>]) -> Cover {
    let n = m.nrows();
    let mut col_to_row = vec![None; m.ncols()];
    for (row, col) in row_to_col.iter().enumerate() {
        if let Some(col) = *col {
            col_to_row[col] = Some(row);
        }
    }

    let mut marked_rows = vec![false; n];
    let mut marked_cols = vec![false; m.ncols()];
    let mut stack: Vec<usize> = (0..n).filter(|&r| row_to_col[r].is_none()).collect();
    for &row in &stack {
        marked_rows[row] = true;
    }

    while let Some(row) = stack.pop() {
        for col in 0..m.ncols() {
            if marked_cols[col] || m.read(row, col) != 0.0 {
                continue;
            }
            marked_cols[col] = true;
            if let Some(next) = col_to_row[col] {
                if !marked_rows[next] {
                    marked_rows[next] = true;
                    stack.push(next);
                }
            }
        }
    }

    Cover {
        rows: marked_rows.iter().map(|&marked| !marked).collect(),
        cols: marked_cols,
    }
}

// Subtract the smallest uncovered value from every uncovered entry and add it
// to every entry covered twice.
fn create_additional_zeros(m: &mut Mat<f64>, cover: &Cover) {
    let mut min = f64::INFINITY;
    for i in 0..m.nrows() {
        if cover.rows[i] {
            continue;
        }
        for j in 0..m.ncols() {
            if !cover.cols[j] {
                min = min.min(m.read(i, j));
            }
        }
    }

    if !min.is_finite() {
        return;
    }

    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            match (cover.rows[i], cover.cols[j]) {
                (false, false) => m.write(i, j, m.read(i, j) - min),
                (true, true) => m.write(i, j, m.read(i, j) + min),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};

    fn mat_from_rows(rows: &[&[f64]]) -> Mat<f64> {
        let ncols = rows.first().map_or(0, |r| r.len());
        Mat::from_fn(rows.len(), ncols, |i, j| rows[i][j])
    }

    // exhaustive minimum over all injective row->col (or col->row) mappings
    fn brute_force_min(cost: &Mat<f64>) -> f64 {
        fn search(cost: &Mat<f64>, row: usize, used: &mut Vec<bool>, transposed: bool) -> f64 {
            let (rows, cols) = if transposed {
                (cost.ncols(), cost.nrows())
            } else {
                (cost.nrows(), cost.ncols())
            };
            if row == rows {
                return 0.0;
            }
            let mut best = f64::INFINITY;
            for col in 0..cols {
                if used[col] {
                    continue;
                }
                used[col] = true;
                let c = if transposed {
                    cost.read(col, row)
                } else {
                    cost.read(row, col)
                };
                best = best.min(c + search(cost, row + 1, used, transposed));
                used[col] = false;
            }
            best
        }

        let transposed = cost.nrows() > cost.ncols();
        let cols = cost.nrows().max(cost.ncols());
        search(cost, 0, &mut vec![false; cols], transposed)
    }

    fn assert_one_to_one(assignment: &Assignment, rows: usize, cols: usize) {
        let mut used_rows = vec![false; rows];
        let mut used_cols = vec![false; cols];
        for &(r, c) in &assignment.pairs {
            assert!(!used_rows[r], "row {r} assigned twice");
            assert!(!used_cols[c], "col {c} assigned twice");
            used_rows[r] = true;
            used_cols[c] = true;
        }
        assert_eq!(assignment.pairs.len(), rows.min(cols));
    }

    #[test]
    fn test_diagonal_preferred() -> Result<(), AssignmentError> {
        let cost = mat_from_rows(&[&[1.0, 2.0], &[2.0, 1.0]]);
        let result = HungarianSolver::default().solve(&cost)?;
        assert_eq!(result.pairs, vec![(0, 0), (1, 1)]);
        assert_relative_eq!(result.total_cost, 2.0);
        Ok(())
    }

    #[test]
    fn test_square_3x3() -> Result<(), AssignmentError> {
        let cost = mat_from_rows(&[&[4.0, 1.0, 3.0], &[2.0, 0.0, 5.0], &[3.0, 2.0, 2.0]]);
        let result = HungarianSolver::default().solve(&cost)?;
        assert_eq!(result.pairs, vec![(0, 1), (1, 0), (2, 2)]);
        assert_relative_eq!(result.total_cost, 5.0);
        Ok(())
    }

    #[test]
    fn test_needs_adjustment() -> Result<(), AssignmentError> {
        // after reduction rows 0 and 2 only have a zero in the first column
        let cost = mat_from_rows(&[&[1.0, 4.0, 5.0], &[5.0, 7.0, 6.0], &[5.0, 8.0, 8.0]]);
        let result = HungarianSolver::default().solve(&cost)?;
        assert_one_to_one(&result, 3, 3);
        assert_relative_eq!(result.total_cost, brute_force_min(&cost));
        assert!(result.num_iterations > 0);
        Ok(())
    }

    #[test]
    fn test_unconverged() {
        // needs two adjustment rounds
        let cost = mat_from_rows(&[
            &[5.0, 1.0, 3.0, 7.0],
            &[1.0, 8.0, 7.0, 7.0],
            &[1.0, 0.0, 7.0, 4.0],
            &[2.0, 6.0, 2.0, 2.0],
        ]);
        let result = HungarianSolver::default().solve(&cost).expect("converges");
        assert_eq!(result.num_iterations, 2);
        assert_relative_eq!(result.total_cost, 6.0);

        let solver = HungarianSolver::new(AssignmentConfig { max_iterations: 1 })
            .expect("valid config");
        let err = solver.solve(&cost).expect_err("one round is not enough");
        assert_eq!(err, AssignmentError::Unconverged { iterations: 1 });
    }

    #[test]
    fn test_rectangular() -> Result<(), AssignmentError> {
        let solver = HungarianSolver::default();

        let wide = mat_from_rows(&[&[5.0, 1.0, 9.0], &[2.0, 8.0, 0.5]]);
        let result = solver.solve(&wide)?;
        assert_eq!(result.pairs, vec![(0, 1), (1, 2)]);
        assert_relative_eq!(result.total_cost, 1.5);

        let tall = mat_from_rows(&[&[5.0, 1.0], &[2.0, 8.0], &[0.5, 7.0]]);
        let result = solver.solve(&tall)?;
        assert_eq!(result.pairs, vec![(0, 1), (2, 0)]);
        assert_relative_eq!(result.total_cost, 1.5);
        Ok(())
    }

    #[test]
    fn test_zero_rows_and_ties() -> Result<(), AssignmentError> {
        let solver = HungarianSolver::default();

        let zeros = Mat::<f64>::zeros(3, 3);
        let result = solver.solve(&zeros)?;
        assert_eq!(result.pairs, vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(result.num_iterations, 0);

        let empty = Mat::<f64>::zeros(0, 4);
        let result = solver.solve(&empty)?;
        assert!(result.pairs.is_empty());
        Ok(())
    }

    #[test]
    fn test_ties_keep_first_zero() -> Result<(), AssignmentError> {
        let solver = HungarianSolver::default();

        let cost = mat_from_rows(&[&[0.0, 0.0, 1.0], &[0.0, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
        let result = solver.solve(&cost)?;
        assert_eq!(result.pairs, vec![(0, 0), (1, 1), (2, 2)]);

        // row 1 only has a zero where row 0 went first, row 0 moves on
        let cost = mat_from_rows(&[&[0.0, 0.0, 3.0], &[0.0, 2.0, 2.0], &[4.0, 4.0, 0.0]]);
        let result = solver.solve(&cost)?;
        assert_eq!(result.pairs, vec![(0, 1), (1, 0), (2, 2)]);

        let wide = Mat::<f64>::zeros(2, 4);
        let result = solver.solve(&wide)?;
        assert_eq!(result.pairs, vec![(0, 0), (1, 1)]);
        Ok(())
    }

    #[test]
    fn test_input_not_mutated() -> Result<(), AssignmentError> {
        let cost = mat_from_rows(&[&[4.0, 1.0, 3.0], &[2.0, 0.0, 5.0], &[3.0, 2.0, 2.0]]);
        let copy = cost.clone();
        HungarianSolver::default().solve(&cost)?;
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(cost.read(i, j), copy.read(i, j));
            }
        }
        Ok(())
    }

    #[test]
    fn test_invalid_input() {
        let solver = HungarianSolver::default();

        let negative = mat_from_rows(&[&[1.0, -2.0]]);
        assert!(matches!(
            solver.solve(&negative),
            Err(AssignmentError::InvalidCost { row: 0, col: 1, .. })
        ));

        let nan = mat_from_rows(&[&[1.0], &[f64::NAN]]);
        assert!(matches!(
            solver.solve(&nan),
            Err(AssignmentError::InvalidCost { row: 1, col: 0, .. })
        ));

        assert!(HungarianSolver::new(AssignmentConfig { max_iterations: 0 }).is_err());
    }

    #[test]
    fn test_random_matrices_are_optimal() -> Result<(), AssignmentError> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let solver = HungarianSolver::default();

        for _ in 0..200 {
            let rows = rng.random_range(1..=6);
            let cols = rng.random_range(1..=6);
            let values: Vec<f64> = (0..rows * cols)
                .map(|_| rng.random_range(0..20) as f64)
                .collect();
            let cost = Mat::<f64>::from_fn(rows, cols, |i, j| values[i * cols + j]);

            let result = solver.solve(&cost)?;
            assert_one_to_one(&result, rows, cols);
            assert_relative_eq!(result.total_cost, brute_force_min(&cost), epsilon = 1e-9);
            assert!(result.total_cost <= row_greedy_cost(&cost) + 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<(), AssignmentError> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let values: Vec<f64> = (0..64).map(|_| rng.random::<f64>()).collect();
        let cost = Mat::<f64>::from_fn(8, 8, |i, j| values[i * 8 + j]);
        let solver = HungarianSolver::default();
        let first = solver.solve(&cost)?;
        for _ in 0..5 {
            assert_eq!(solver.solve(&cost)?.pairs, first.pairs);
        }
        Ok(())
    }

    #[test]
    fn test_row_greedy_cost() {
        let cost = mat_from_rows(&[&[1.0, 2.0], &[1.0, 10.0]]);
        assert_relative_eq!(row_greedy_cost(&cost), 11.0);
    }
}
