use faer::Mat;
use flowtrack_core::{GridCell, Point2d, Velocity};

use crate::error::FieldError;
use crate::gravity::{Gravity, Newton};
use crate::sink::FieldSink;

/// Parameters of the influence field.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Number of grid columns.
    pub width: usize,
    /// Number of grid rows.
    pub height: usize,
    /// Farthest distance, in cells, at which an anchor has an effect.
    pub max_distance: f64,
    /// Contributions with a gravity magnitude below this value are dropped.
    pub gravity_threshold: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            max_distance: 10.0,
            gravity_threshold: 0.0,
        }
    }
}

impl FieldConfig {
    /// Check the grid is not empty and the thresholds are non-negative.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.width == 0 || self.height == 0 {
            return Err(FieldError::InvalidConfig(format!(
                "grid size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_distance.is_nan() || self.max_distance < 0.0 {
            return Err(FieldError::InvalidConfig(format!(
                "max_distance must be non-negative, got {}",
                self.max_distance
            )));
        }
        if self.gravity_threshold.is_nan() || self.gravity_threshold < 0.0 {
            return Err(FieldError::InvalidConfig(format!(
                "gravity_threshold must be non-negative, got {}",
                self.gravity_threshold
            )));
        }
        Ok(())
    }
}

/// A grid cell with a known velocity acting as a source of influence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// The anchor cell.
    pub cell: GridCell,
    /// The velocity at the anchor.
    pub velocity: Velocity,
}

/// Velocity field over a grid, driven by anchors and a decay kernel.
///
/// The x and y grids are allocated once and reused across update cycles:
/// set anchors, query, then [`InfluenceField::neutralise`] before the next
/// observation pair.
#[derive(Debug, Clone)]
pub struct InfluenceField<G = Newton> {
    config: FieldConfig,
    gravity: G,
    anchors: Vec<Anchor>,
    velocity_x: Mat<f64>,
    velocity_y: Mat<f64>,
}

impl<G: Gravity> InfluenceField<G> {
    /// Create a zeroed field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: FieldConfig, gravity: G) -> Result<Self, FieldError> {
        config.validate()?;
        let velocity_x = Mat::<f64>::zeros(config.height, config.width);
        let velocity_y = Mat::<f64>::zeros(config.height, config.width);
        Ok(Self {
            config,
            gravity,
            anchors: Vec::new(),
            velocity_x,
            velocity_y,
        })
    }

    /// Get the field configuration.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// The grid size as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    /// Get as reference the active anchors.
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// The x component grid, shape (height, width).
    pub fn velocity_x(&self) -> &Mat<f64> {
        &self.velocity_x
    }

    /// The y component grid, shape (height, width).
    pub fn velocity_y(&self) -> &Mat<f64> {
        &self.velocity_y
    }

    /// The stored velocity at `cell`, `None` outside the grid.
    pub fn velocity_at(&self, cell: GridCell) -> Option<Velocity> {
        if !self.contains(cell) {
            return None;
        }
        Some([
            self.velocity_x.read(cell.y, cell.x),
            self.velocity_y.read(cell.y, cell.x),
        ])
    }

    /// Check if `cell` lies on the grid.
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x < self.config.width && cell.y < self.config.height
    }

    /// Record `velocity` at `cell` and register the cell as an anchor.
    pub fn set_anchor(&mut self, cell: GridCell, velocity: Velocity) -> Result<(), FieldError> {
        self.check_bounds(cell)?;
        self.write(cell, velocity);
        self.anchors.push(Anchor { cell, velocity });
        Ok(())
    }

    /// Register one anchor per motion vector, at the cell nearest to its origin.
    ///
    /// Origins that round to a cell outside the grid are skipped. Returns the
    /// number of anchors set.
    pub fn set_anchors_from_motion(&mut self, motion: &[(Point2d, Velocity)]) -> usize {
        let mut count = 0;
        for &(origin, velocity) in motion {
            let (x, y) = (origin[0].round(), origin[1].round());
            if !(x >= 0.0 && y >= 0.0) {
                continue;
            }
            let cell = GridCell::new(x as usize, y as usize);
            if self.set_anchor(cell, velocity).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Reset the field and drop every anchor.
    ///
    /// A quick reset only zeroes the anchor cells and leaves values synthesised
    /// by earlier queries in place. A full reset zeroes both grids.
    pub fn neutralise(&mut self, quick: bool) {
        if quick {
            let cells: Vec<GridCell> = self.anchors.iter().map(|a| a.cell).collect();
            for cell in cells {
                self.write(cell, [0.0, 0.0]);
            }
        } else {
            zero_fill(&mut self.velocity_x);
            zero_fill(&mut self.velocity_y);
        }
        self.anchors.clear();
    }

    /// Sum of the anchor contributions at `cell`, without touching the grids.
    ///
    /// Each anchor within `max_distance` contributes its velocity scaled by the
    /// gravity magnitude, unless the magnitude is below the gravity threshold.
    pub fn influence_at(&self, cell: GridCell) -> Velocity {
        let mut velocity = [0.0, 0.0];
        for anchor in &self.anchors {
            let d = anchor.cell.distance(&cell);
            if d > self.config.max_distance {
                continue;
            }

            let speed = anchor.velocity[0].hypot(anchor.velocity[1]);
            let weight = self.gravity.magnitude(d, speed);
            // NaN weights fail this comparison as well
            if !(weight >= self.config.gravity_threshold) {
                continue;
            }

            velocity[0] += anchor.velocity[0] * weight;
            velocity[1] += anchor.velocity[1] * weight;
        }
        velocity
    }

    /// Estimate the velocity at each query cell from the active anchors.
    ///
    /// The estimates are also stored in the grids at the query cells.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::OutOfBounds`] if any query lies outside the grid,
    /// in which case nothing is written.
    pub fn compute_velocity(
        &mut self,
        queries: &[GridCell],
    ) -> Result<Vec<(GridCell, Velocity)>, FieldError> {
        for &cell in queries {
            self.check_bounds(cell)?;
        }

        let estimates: Vec<(GridCell, Velocity)> = queries
            .iter()
            .map(|&cell| (cell, self.influence_at(cell)))
            .collect();

        for &(cell, velocity) in &estimates {
            self.write(cell, velocity);
        }

        log::debug!(
            "Computed velocity at {} cells from {} anchors",
            estimates.len(),
            self.anchors.len()
        );

        Ok(estimates)
    }

    /// Compute the velocity at every cell within `max_distance` of an anchor.
    ///
    /// Cells out of reach of all anchors keep their current value. Returns the
    /// number of cells written.
    pub fn synthesise(&mut self) -> usize {
        let (width, height) = self.size();
        let reach = if self.config.max_distance.is_finite() {
            self.config.max_distance.floor() as usize
        } else {
            usize::MAX
        };

        let mut reached = vec![false; width * height];
        for anchor in &self.anchors {
            let (ax, ay) = (anchor.cell.x, anchor.cell.y);
            let x_end = ax.saturating_add(reach).min(width - 1);
            let y_end = ay.saturating_add(reach).min(height - 1);
            for y in ay.saturating_sub(reach)..=y_end {
                for x in ax.saturating_sub(reach)..=x_end {
                    if anchor.cell.distance(&GridCell::new(x, y)) <= self.config.max_distance {
                        reached[y * width + x] = true;
                    }
                }
            }
        }

        let cells: Vec<GridCell> = reached
            .iter()
            .enumerate()
            .filter(|(_, reached)| **reached)
            .map(|(i, _)| GridCell::new(i % width, i / width))
            .collect();

        for &cell in &cells {
            let velocity = self.influence_at(cell);
            self.write(cell, velocity);
        }

        log::debug!("Synthesised {} cells from {} anchors", cells.len(), self.anchors.len());
        cells.len()
    }

    /// Hand `samples` to a visualisation sink.
    ///
    /// A sink failure is logged and otherwise ignored.
    pub fn render_velocity_map<S: FieldSink>(
        &self,
        sink: &mut S,
        name: &str,
        samples: &[(GridCell, Velocity)],
    ) {
        let (width, height) = self.size();
        if let Err(e) = sink.render(name, width, height, samples) {
            log::warn!("Failed to render velocity map {name}: {e}");
        }
    }

    fn check_bounds(&self, cell: GridCell) -> Result<(), FieldError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(FieldError::OutOfBounds {
                cell,
                width: self.config.width,
                height: self.config.height,
            })
        }
    }

    fn write(&mut self, cell: GridCell, velocity: Velocity) {
        self.velocity_x.write(cell.y, cell.x, velocity[0]);
        self.velocity_y.write(cell.y, cell.x, velocity[1]);
    }
}

fn zero_fill(m: &mut Mat<f64>) {
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            m.write(i, j, 0.0);
        }
    }
}
