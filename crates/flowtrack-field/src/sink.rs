use flowtrack_core::{GridCell, Velocity};

/// A display or recorder for velocity maps.
///
/// Sinks only receive already computed values. A failing sink never affects
/// the field it renders.
pub trait FieldSink {
    /// Error reported by the sink.
    type Error: std::error::Error;

    /// Render the velocity `samples` of a `width` x `height` grid under `name`.
    fn render(
        &mut self,
        name: &str,
        width: usize,
        height: usize,
        samples: &[(GridCell, Velocity)],
    ) -> Result<(), Self::Error>;
}

/// A sink that keeps the last rendered samples in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Name of the last rendered map.
    pub name: String,
    /// Samples of the last rendered map.
    pub samples: Vec<(GridCell, Velocity)>,
}

impl FieldSink for RecordingSink {
    type Error = std::convert::Infallible;

    fn render(
        &mut self,
        name: &str,
        _width: usize,
        _height: usize,
        samples: &[(GridCell, Velocity)],
    ) -> Result<(), Self::Error> {
        self.name = name.to_string();
        self.samples = samples.to_vec();
        Ok(())
    }
}
