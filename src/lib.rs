//! First-person raycaster over a 2D occupancy grid.
//!
//! Each frame sweeps one ray per screen column across the field of view, finds
//! the nearest wall on the grid and paints a sky / wall / floor strip sized by
//! the perpendicular wall distance. Levels are either a fixed layout or a
//! perfect maze carved by a seeded depth-first walk.

pub mod camera;
pub mod config;
pub mod error;
pub mod grid;
pub mod maze;
pub mod raycast;
pub mod renderer;
pub mod scaler;
pub mod texture;
