/// Maps the distance to an anchor and the anchor speed to an influence weight.
///
/// Implementations must be pure and non-increasing in `distance`. Any closure
/// `Fn(f64, f64) -> f64` is a valid kernel.
pub trait Gravity {
    /// Weight of an anchor moving at speed `velocity` seen from `distance` away.
    fn magnitude(&self, distance: f64, velocity: f64) -> f64;
}

impl<F> Gravity for F
where
    F: Fn(f64, f64) -> f64,
{
    fn magnitude(&self, distance: f64, velocity: f64) -> f64 {
        self(distance, velocity)
    }
}

/// `1 / d`, and 1 at the anchor itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseDistance;

impl Gravity for InverseDistance {
    #[inline]
    fn magnitude(&self, distance: f64, _velocity: f64) -> f64 {
        if distance == 0.0 {
            1.0
        } else {
            1.0 / distance
        }
    }
}

/// `v / d^2`, and 1 at the anchor itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Newton;

impl Gravity for Newton {
    #[inline]
    fn magnitude(&self, distance: f64, velocity: f64) -> f64 {
        if distance == 0.0 {
            1.0
        } else {
            velocity / (distance * distance)
        }
    }
}
