use flowtrack_core::GridCell;

/// Errors that can occur when working with an influence field.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FieldError {
    /// The field configuration is not valid.
    #[error("Invalid field configuration: {0}")]
    InvalidConfig(String),

    /// The cell lies outside the grid.
    #[error("Cell ({}, {}) is outside the {width}x{height} grid", .cell.x, .cell.y)]
    OutOfBounds {
        /// The offending cell.
        cell: GridCell,
        /// Width of the grid.
        width: usize,
        /// Height of the grid.
        height: usize,
    },
}
