use std::f32::consts::TAU;

use crate::{error::ConfigError, grid::Grid};

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(a: f32) -> f32 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if r >= TAU { 0.0 } else { r }
}

/// Viewer pose. `Copy` so a frame can snapshot it before casting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pos: [f32; 2], // (x, y) in grid cells
    pub yaw: f32,      // radians in [0, 2π), counter-clockwise from +X
}

impl Camera {
    pub fn new(pos: [f32; 2], yaw: f32) -> Self {
        Self {
            pos,
            yaw: normalize_angle(yaw),
        }
    }

    /// Check that this pose may be used on `grid`.
    pub fn placed_on(self, grid: &Grid) -> Result<Self, ConfigError> {
        let [x, y] = self.pos;
        if grid.is_free_at(x, y) {
            Ok(self)
        } else {
            Err(ConfigError::StartBlocked { x, y })
        }
    }

    /// Unit vector along the heading.
    #[inline]
    pub fn forward(&self) -> [f32; 2] {
        let (s, c) = self.yaw.sin_cos();
        [c, s]
    }
}

/// Discrete input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    RotateLeft,
    RotateRight,
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    Quit,
}

/// Step sizes applied per command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveParams {
    pub move_step: f32, // cells, below 1 so a step cannot cross a wall cell
    pub turn_step: f32, // radians
}

impl Default for MoveParams {
    fn default() -> Self {
        Self {
            move_step: 0.2,
            turn_step: 0.1,
        }
    }
}

/// Pure pose update.
///
/// Translation is resolved per axis: the X move is kept if the cell it lands in
/// is free, then the Y move is tested from the resulting X. A blocked axis keeps
/// its old coordinate, which lets the viewer slide along walls.
pub fn apply_movement(camera: Camera, grid: &Grid, command: Command, params: &MoveParams) -> Camera {
    let [fx, fy] = camera.forward();
    // left of the heading in a Y-up frame
    let left = [-fy, fx];

    let delta = match command {
        Command::RotateLeft => {
            return Camera::new(camera.pos, camera.yaw + params.turn_step);
        }
        Command::RotateRight => {
            return Camera::new(camera.pos, camera.yaw - params.turn_step);
        }
        Command::Quit => return camera,
        Command::Forward => [fx, fy],
        Command::Backward => [-fx, -fy],
        Command::StrafeLeft => left,
        Command::StrafeRight => [-left[0], -left[1]],
    };

    let [mut x, mut y] = camera.pos;
    let nx = x + delta[0] * params.move_step;
    if grid.is_free_at(nx, y) {
        x = nx;
    }
    let ny = y + delta[1] * params.move_step;
    if grid.is_free_at(x, ny) {
        y = ny;
    }

    Camera { pos: [x, y], ..camera }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    fn room() -> Grid {
        Grid::from_layout(&["#####", "#   #", "#   #", "#   #", "#####"]).unwrap()
    }

    #[test]
    fn angles_wrap_into_range() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-6);
        assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-6);
        assert!(normalize_angle(-1e-9) < TAU);
    }

    #[test]
    fn rotation_wraps() {
        let grid = room();
        let params = MoveParams::default();
        let cam = Camera::new([2.5, 2.5], 0.05);
        let right = apply_movement(cam, &grid, Command::RotateRight, &params);
        assert!((right.yaw - (TAU - 0.05)).abs() < 1e-5);
        let back = apply_movement(right, &grid, Command::RotateLeft, &params);
        assert!((back.yaw - 0.05).abs() < 1e-5);
        assert_eq!(back.pos, cam.pos);
    }

    #[test]
    fn forward_moves_along_heading() {
        let grid = room();
        let cam = Camera::new([2.0, 2.0], 0.0);
        let moved = apply_movement(cam, &grid, Command::Forward, &MoveParams::default());
        assert!((moved.pos[0] - 2.2).abs() < 1e-6);
        assert!((moved.pos[1] - 2.0).abs() < 1e-6);

        let back = apply_movement(moved, &grid, Command::Backward, &MoveParams::default());
        assert!((back.pos[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn strafe_is_perpendicular() {
        let grid = room();
        let cam = Camera::new([2.0, 2.0], 0.0);
        let left = apply_movement(cam, &grid, Command::StrafeLeft, &MoveParams::default());
        assert!((left.pos[0] - 2.0).abs() < 1e-6);
        assert!((left.pos[1] - 2.2).abs() < 1e-6);
        let right = apply_movement(cam, &grid, Command::StrafeRight, &MoveParams::default());
        assert!((right.pos[1] - 1.8).abs() < 1e-6);
    }

    #[test]
    fn blocked_axis_is_kept_while_other_slides() {
        let grid = room();
        let params = MoveParams {
            move_step: 1.0,
            turn_step: 0.1,
        };
        // heading down-right towards the wall row at y = 0
        let cam = Camera::new([1.5, 1.5], -PI / 4.0);
        let moved = apply_movement(cam, &grid, Command::Forward, &params);
        assert_eq!(moved.pos[1], 1.5);
        assert!(moved.pos[0] > 1.5);
        assert!(grid.is_free_at(moved.pos[0], moved.pos[1]));
    }

    #[test]
    fn quit_is_a_no_op() {
        let grid = room();
        let cam = Camera::new([2.5, 2.5], 1.0);
        assert_eq!(apply_movement(cam, &grid, Command::Quit, &MoveParams::default()), cam);
    }

    #[test]
    fn placement_on_wall_is_rejected() {
        let grid = room();
        assert!(Camera::new([2.5, 2.5], 0.0).placed_on(&grid).is_ok());
        assert_eq!(
            Camera::new([0.5, 2.5], 0.0).placed_on(&grid).unwrap_err(),
            ConfigError::StartBlocked { x: 0.5, y: 2.5 }
        );
    }
}
