use thiserror::Error;

/// Rejected configuration. Raised before any frame is rendered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least 3x3, got {width}x{height}")]
    GridTooSmall { width: usize, height: usize },

    #[error("start cell ({x}, {y}) is not an interior cell")]
    InvalidStart { x: i64, y: i64 },

    #[error("start position ({x:.2}, {y:.2}) lies on a blocked cell")]
    StartBlocked { x: f32, y: f32 },

    #[error("border cell ({x}, {y}) is free")]
    BorderOpen { x: usize, y: usize },

    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown layout character {ch:?} at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },

    #[error("screen size {width}x{height} has no pixels")]
    EmptyScreen { width: usize, height: usize },

    #[error("field of view must be within (0, 180) degrees, got {0}")]
    InvalidFov(f32),

    #[error("turn step must be positive and finite, move step must be in (0, 1) cells")]
    InvalidStep,
}

/// A ray left the grid without meeting a blocked cell.
///
/// Grids built through [`crate::grid::Grid`] reject open borders, so this only
/// surfaces when that invariant was broken.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CastError {
    #[error("ray at angle {angle:.4} rad escaped the grid")]
    NoHitFound { angle: f32 },
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),

    #[error("texture has no pixels")]
    Empty,
}
