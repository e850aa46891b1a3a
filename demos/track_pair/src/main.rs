use argh::FromArgs;
use rand::{Rng, SeedableRng};

use flowtrack::assignment::{AssignmentError, HungarianSolver};
use flowtrack::cluster::{decompose, Linkage};
use flowtrack::field::{FieldConfig, FieldSink, InfluenceField, InverseDistance};
use flowtrack::geometry::metric::{AngularSimilarity, Euclidean};
use flowtrack::geometry::{GridCell, Point2d, PointSet, Velocity};
use flowtrack::matching::{CandidateMatcher, MatcherConfig, MatchingError, ScorePopulation};

#[derive(FromArgs)]
/// Match a synthetic pair of observations and estimate their motion field
struct Args {
    /// number of points per observation
    #[argh(option, default = "40")]
    num_points: usize,

    /// maximum matching distance
    #[argh(option, default = "6.0")]
    max_distance: f64,

    /// maximum edge length used to split the first observation into clusters
    #[argh(option, default = "12.0")]
    edge_length: f64,

    /// seed of the synthetic scene
    #[argh(option, default = "0")]
    seed: u64,

    /// resolve matches with the assignment solver instead of greedily
    #[argh(switch)]
    optimal: bool,

    /// log the scene and the velocity field to rerun
    #[argh(switch)]
    visualize: bool,
}

const GRID_SIZE: usize = 128;

struct RerunSink {
    rec: rerun::RecordingStream,
}

impl FieldSink for RerunSink {
    type Error = rerun::RecordingStreamError;

    fn render(
        &mut self,
        name: &str,
        _width: usize,
        _height: usize,
        samples: &[(GridCell, Velocity)],
    ) -> Result<(), Self::Error> {
        let origins = samples
            .iter()
            .map(|(c, _)| [c.x as f32, c.y as f32])
            .collect::<Vec<_>>();
        let vectors = samples
            .iter()
            .map(|(_, v)| [v[0] as f32, v[1] as f32])
            .collect::<Vec<_>>();
        self.rec.log(
            name,
            &rerun::Arrows2D::from_vectors(vectors).with_origins(origins),
        )
    }
}

// a slow swirl around the grid center plus a little jitter
fn synthetic_scene(args: &Args) -> (Vec<Point2d>, Vec<Point2d>, Vec<Vec<f64>>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
    let center = GRID_SIZE as f64 / 2.0;
    let margin = 10.0;

    let frame_a: Vec<Point2d> = (0..args.num_points)
        .map(|_| {
            [
                rng.random_range(margin..GRID_SIZE as f64 - margin),
                rng.random_range(margin..GRID_SIZE as f64 - margin),
            ]
        })
        .collect();

    let frame_b: Vec<Point2d> = frame_a
        .iter()
        .map(|p| {
            let (dx, dy) = (p[0] - center, p[1] - center);
            [
                p[0] - 0.05 * dy + rng.random_range(-0.2..0.2),
                p[1] + 0.05 * dx + rng.random_range(-0.2..0.2),
            ]
        })
        .collect();

    let descriptors: Vec<Vec<f64>> = (0..args.num_points)
        .map(|_| (0..16).map(|_| rng.random_range(0.0..1.0)).collect())
        .collect();

    (frame_a, frame_b, descriptors)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let (frame_a, frame_b, descriptors) = synthetic_scene(&args);
    println!("Observations: #{} points each", frame_a.len());

    let clusters = decompose(&PointSet::new(frame_a.clone()), args.edge_length, Linkage::Strict)?;
    println!("Clusters in the first observation: {}", clusters.len());

    let matcher = CandidateMatcher::new(
        MatcherConfig {
            max_distance: args.max_distance,
            ..Default::default()
        },
        Euclidean,
        AngularSimilarity,
    )?;

    let mut population = ScorePopulation::new();
    let greedy =
        matcher.match_greedy_observed(&frame_a, &descriptors, &frame_b, &descriptors, &mut population)?;
    if let (Some(min), Some(max), Some(mean)) = (population.min(), population.max(), population.mean()) {
        println!(
            "Scores: #{} candidates, min {:.4} max {:.4} mean {:.4}",
            population.len(),
            min,
            max,
            mean
        );
    }

    let correspondences = if args.optimal {
        match matcher.select_optimal(&greedy.scores, &HungarianSolver::default()) {
            Ok(correspondences) => correspondences,
            Err(MatchingError::Assignment(AssignmentError::Unconverged { iterations })) => {
                log::warn!("Solver gave up after {iterations} iterations, keeping greedy matches");
                greedy.correspondences
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        greedy.correspondences
    };

    let correct = correspondences.iter().filter(|(i, j)| i == j).count();
    println!(
        "Matched {} of {} points ({} correct)",
        correspondences.len(),
        frame_a.len(),
        correct
    );

    let motion = correspondences.motion_vectors(&frame_a, &frame_b);
    let mut field = InfluenceField::new(
        FieldConfig {
            width: GRID_SIZE,
            height: GRID_SIZE,
            max_distance: 16.0,
            gravity_threshold: 0.05,
        },
        InverseDistance,
    )?;
    let num_anchors = field.set_anchors_from_motion(&motion);
    let num_cells = field.synthesise();
    println!("Field: {} anchors reached {} cells", num_anchors, num_cells);

    let probes = [
        GridCell::new(GRID_SIZE / 4, GRID_SIZE / 2),
        GridCell::new(GRID_SIZE / 2, GRID_SIZE / 4),
        GridCell::new(3 * GRID_SIZE / 4, GRID_SIZE / 2),
    ];
    for (cell, v) in field.compute_velocity(&probes)? {
        println!("Velocity at ({}, {}): [{:.3}, {:.3}]", cell.x, cell.y, v[0], v[1]);
    }

    if args.visualize {
        let rec = rerun::RecordingStreamBuilder::new("flowtrack").spawn()?;
        rec.log("scene/frame_a", &rerun::Points2D::new(to_f32(&frame_a)))?;
        rec.log("scene/frame_b", &rerun::Points2D::new(to_f32(&frame_b)))?;

        let samples: Vec<(GridCell, Velocity)> = (0..GRID_SIZE)
            .step_by(4)
            .flat_map(|y| (0..GRID_SIZE).step_by(4).map(move |x| GridCell::new(x, y)))
            .filter_map(|cell| Some((cell, field.velocity_at(cell)?)))
            .filter(|(_, v)| v[0] != 0.0 || v[1] != 0.0)
            .collect();

        let mut sink = RerunSink { rec };
        field.render_velocity_map(&mut sink, "field/velocity", &samples);
    }

    Ok(())
}

fn to_f32(points: &[Point2d]) -> Vec<[f32; 2]> {
    points.iter().map(|p| [p[0] as f32, p[1] as f32]).collect()
}
