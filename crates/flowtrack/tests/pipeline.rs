use approx::assert_relative_eq;
use faer::Mat;
use rand::{Rng, SeedableRng};

use flowtrack::assignment::{AssignmentConfig, AssignmentError, HungarianSolver};
use flowtrack::cluster::{decompose, Linkage};
use flowtrack::field::{FieldConfig, InfluenceField, InverseDistance};
use flowtrack::geometry::metric::{AngularSimilarity, Euclidean};
use flowtrack::geometry::{GridCell, Point2d, PointSet};
use flowtrack::matching::{CandidateMatcher, MatcherConfig, MatchingError};

fn grid_scene(rows: usize, cols: usize, spacing: f64, origin: Point2d) -> Vec<Point2d> {
    let mut points = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            points.push([origin[0] + c as f64 * spacing, origin[1] + r as f64 * spacing]);
        }
    }
    points
}

fn shifted(points: &[Point2d], shift: [f64; 2]) -> Vec<Point2d> {
    points.iter().map(|p| [p[0] + shift[0], p[1] + shift[1]]).collect()
}

fn random_descriptors(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..8).map(|_| rng.random_range(0.1..1.0)).collect())
        .collect()
}

#[test]
fn identical_observations_match_pairwise() -> Result<(), MatchingError> {
    let points = vec![[2.0, 3.0], [12.0, 3.0], [7.0, 15.0]];
    let desc = vec![vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0], vec![0.0, 1.0, 0.0]];

    let config = MatcherConfig {
        reserved_target: Some(0),
        ..Default::default()
    };
    let matcher = CandidateMatcher::new(config, Euclidean, AngularSimilarity)?;
    let result = matcher.match_greedy(&points, &desc, &points, &desc)?;

    assert_eq!(result.correspondences.get(0), None);
    for i in 1..3 {
        assert_eq!(result.correspondences.get(i), Some(i));
        assert_eq!(result.scores.read(i, i), 1.0);
    }
    Ok(())
}

#[test]
fn solver_prefers_cheaper_diagonal() -> Result<(), AssignmentError> {
    let cost = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 2.0 });
    let result = HungarianSolver::default().solve(&cost)?;
    assert_eq!(result.pairs, vec![(0, 0), (1, 1)]);
    assert_relative_eq!(result.total_cost, 2.0);
    Ok(())
}

#[test]
fn shifted_scene_drives_velocity_field() -> Result<(), Box<dyn std::error::Error>> {
    let frame_a = grid_scene(4, 5, 10.0, [5.0, 5.0]);
    let frame_b = shifted(&frame_a, [2.0, 1.0]);
    let desc = random_descriptors(frame_a.len(), 17);

    let config = MatcherConfig {
        max_distance: 5.0,
        ..Default::default()
    };
    let matcher = CandidateMatcher::new(config, Euclidean, AngularSimilarity)?;
    let result = matcher.match_optimal(&frame_a, &desc, &frame_b, &desc, &HungarianSolver::default())?;

    assert_eq!(result.correspondences.len(), frame_a.len());
    assert!(result.correspondences.iter().all(|(i, j)| i == j));

    let motion = result.correspondences.motion_vectors(&frame_a, &frame_b);
    for (_, v) in &motion {
        assert_relative_eq!(v[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(v[1], 1.0, epsilon = 1e-12);
    }

    let mut field = InfluenceField::new(
        FieldConfig {
            width: 64,
            height: 48,
            max_distance: 3.0,
            gravity_threshold: 0.0,
        },
        InverseDistance,
    )?;
    assert_eq!(field.set_anchors_from_motion(&motion), frame_a.len());

    let estimates = field.compute_velocity(&[GridCell::new(5, 5), GridCell::new(35, 25)])?;
    for (_, v) in estimates {
        assert_relative_eq!(v[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(v[1], 1.0, epsilon = 1e-12);
    }

    // one cell away from an anchor the kernel weight is 1
    let near = field.compute_velocity(&[GridCell::new(6, 5)])?;
    assert_relative_eq!(near[0].1[0], 2.0, epsilon = 1e-12);

    field.synthesise();
    field.neutralise(false);
    assert_eq!(field.compute_velocity(&[GridCell::new(5, 5)])?[0].1, [0.0, 0.0]);
    Ok(())
}

#[test]
fn clusters_are_matched_independently() -> Result<(), Box<dyn std::error::Error>> {
    let mut frame_a = grid_scene(3, 3, 2.0, [0.0, 0.0]);
    frame_a.extend(grid_scene(2, 2, 2.0, [50.0, 50.0]));
    let clusters = decompose(&PointSet::new(frame_a), 2.5, Linkage::Strict)?;
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].len(), 9);
    assert_eq!(clusters[1].len(), 4);

    let matcher = CandidateMatcher::new(
        MatcherConfig {
            max_distance: 1.0,
            ..Default::default()
        },
        Euclidean,
        AngularSimilarity,
    )?;
    let solver = HungarianSolver::default();

    for (k, cluster) in clusters.iter().enumerate() {
        let a = cluster.points();
        let b = shifted(a, [0.5, 0.0]);
        let desc = random_descriptors(a.len(), k as u64);
        let result = matcher.match_optimal(a, &desc, &b, &desc, &solver)?;
        assert_eq!(result.correspondences.len(), a.len());
        assert!(result.correspondences.is_one_to_one());

        let centroid_a = cluster.centroid()?;
        let centroid_b = PointSet::new(b).centroid()?;
        assert_relative_eq!(centroid_b[0] - centroid_a[0], 0.5, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn unconverged_solver_falls_back_to_greedy() -> Result<(), MatchingError> {
    // halving scores map onto costs 0..8 that need two adjustment rounds
    let cost = [[5, 1, 3, 7], [1, 8, 7, 7], [1, 0, 7, 4], [2, 6, 2, 2]];
    let scores = Mat::from_fn(4, 4, |i, j| 0.5_f64.powi(cost[i][j]));

    let matcher: CandidateMatcher = CandidateMatcher::default();
    let strict_solver = HungarianSolver::new(AssignmentConfig { max_iterations: 1 })?;

    let err = matcher.select_optimal(&scores, &strict_solver);
    assert_eq!(
        err.err(),
        Some(MatchingError::Assignment(AssignmentError::Unconverged { iterations: 1 }))
    );

    let greedy = matcher.select_greedy(&scores);
    assert_eq!(greedy.len(), 4);
    assert_eq!(greedy.get(2), Some(1));

    let optimal = matcher.select_optimal(&scores, &HungarianSolver::default())?;
    assert!(optimal.is_one_to_one());
    assert_eq!(optimal.len(), 4);
    Ok(())
}
