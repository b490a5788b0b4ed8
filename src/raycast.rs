use std::f32::consts::{FRAC_PI_2, PI};

use crate::{
    camera::{Camera, normalize_angle},
    error::CastError,
    grid::Grid,
};

/// Below this, a ray counts as parallel to a family of grid lines.
const PARALLEL_EPS: f32 = 1e-6;
/// Floor for the corrected distance, keeps strip heights finite when the
/// viewer touches a wall.
const MIN_DISTANCE: f32 = 1e-4;

/// Which family of grid lines the winning hit was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `x` = const lines, east/west faces.
    Vertical,
    /// `y` = const lines, north/south faces.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub point: [f32; 2],
    /// Euclidean length from the viewer to `point`.
    pub ray_length: f32,
    /// `ray_length` projected on the view direction.
    pub distance: f32,
    pub axis: Axis,
}

impl Hit {
    /// Unclipped height in pixels of the wall strip for this hit.
    #[inline]
    pub fn wall_height(&self, screen_height: usize) -> usize {
        // saturating float to int cast
        (screen_height as f32 / self.distance) as usize
    }

    /// Horizontal texture coordinate in `[0, 1)`, taken along the face that was hit.
    #[inline]
    pub fn texture_u(&self) -> f32 {
        let c = match self.axis {
            Axis::Vertical => self.point[1],
            Axis::Horizontal => self.point[0],
        };
        c - c.floor()
    }
}

/// Cast one ray from `camera` at `angle` and return the nearest wall hit.
///
/// Two marches run independently: one over the `x` = const lines, one over the
/// `y` = const lines. Each stops at the first line whose far-side cell is
/// blocked. The closer candidate wins and its length is multiplied by
/// `cos(angle - yaw)` to remove the fisheye effect.
pub fn cast(grid: &Grid, camera: &Camera, angle: f32) -> Result<Hit, CastError> {
    let angle = normalize_angle(angle);
    let (sin, cos) = angle.sin_cos();
    let origin = camera.pos;

    let step_x = if angle > FRAC_PI_2 && angle < 3.0 * FRAC_PI_2 { -1 } else { 1 };
    let step_y = if angle > PI { -1 } else { 1 };

    let vertical = if cos.abs() < PARALLEL_EPS {
        None
    } else {
        march_vertical(grid, origin, [step_x, step_y], sin / cos)
    };
    let horizontal = if sin.abs() < PARALLEL_EPS {
        None
    } else {
        march_horizontal(grid, origin, [step_x, step_y], cos / sin)
    };

    let candidate = |p: [f32; 2], axis: Axis| {
        let dx = p[0] - origin[0];
        let dy = p[1] - origin[1];
        (p, dx * dx + dy * dy, axis)
    };

    let best = match (
        vertical.map(|p| candidate(p, Axis::Vertical)),
        horizontal.map(|p| candidate(p, Axis::Horizontal)),
    ) {
        (Some(v), Some(h)) => {
            if v.1 < h.1 {
                v
            } else {
                h
            }
        }
        (Some(v), None) => v,
        (None, Some(h)) => h,
        (None, None) => return Err(CastError::NoHitFound { angle }),
    };

    let (point, dist_sq, axis) = best;
    let ray_length = dist_sq.sqrt();
    let distance = (ray_length * (angle - camera.yaw).cos()).max(MIN_DISTANCE);

    Ok(Hit {
        point,
        ray_length,
        distance,
        axis,
    })
}

/// Cell index along a line for a crossing at `c`. A crossing exactly on a grid
/// corner belongs to the cell the ray moves into, so a cell touched only at that
/// corner is never reported as hit.
#[inline]
fn crossing_cell(c: f32, step: i64) -> i64 {
    let f = c.floor();
    if step < 0 && c == f {
        f as i64 - 1
    } else {
        f as i64
    }
}

/// Walk the `x` = const lines. `None` when the ray leaves the grid first.
fn march_vertical(grid: &Grid, origin: [f32; 2], steps: [i64; 2], slope: f32) -> Option<[f32; 2]> {
    let [px, py] = origin;
    let [step, step_y] = steps;
    let mut line = px.floor() as i64 + i64::from(step > 0);

    for _ in 0..=grid.width() {
        let y = py + (line as f32 - px) * slope;
        if !y.is_finite() {
            return None;
        }
        let cell_x = line - i64::from(step < 0);
        let cell_y = crossing_cell(y, step_y);
        if !grid.contains(cell_x, cell_y) {
            return None;
        }
        if grid.is_blocked(cell_x, cell_y) {
            return Some([line as f32, y]);
        }
        line += step;
    }
    None
}

/// Walk the `y` = const lines, solving for `x` with the inverse slope.
fn march_horizontal(
    grid: &Grid,
    origin: [f32; 2],
    steps: [i64; 2],
    inv_slope: f32,
) -> Option<[f32; 2]> {
    let [px, py] = origin;
    let [step_x, step] = steps;
    let mut line = py.floor() as i64 + i64::from(step > 0);

    for _ in 0..=grid.height() {
        let x = px + (line as f32 - py) * inv_slope;
        if !x.is_finite() {
            return None;
        }
        let cell_x = crossing_cell(x, step_x);
        let cell_y = line - i64::from(step < 0);
        if !grid.contains(cell_x, cell_y) {
            return None;
        }
        if grid.is_blocked(cell_x, cell_y) {
            return Some([x, line as f32]);
        }
        line += step;
    }
    None
}
