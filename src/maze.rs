use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    error::ConfigError,
    grid::{Cell, Grid},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// One level of the depth-first walk: a carved cell and the directions it still
/// has to try, already shuffled.
struct Frame {
    x: i64,
    y: i64,
    dirs: [Direction; 4],
    next: usize,
}

impl Frame {
    fn new(x: i64, y: i64, rng: &mut StdRng) -> Self {
        let mut dirs = Direction::ALL;
        dirs.shuffle(rng);
        Self {
            x,
            y,
            dirs,
            next: 0,
        }
    }
}

/// Carve a perfect maze with a randomized depth-first walk.
///
/// Every cell starts blocked. From the current junction the walk tries the four
/// directions in random order. A direction is taken only when the junction two
/// cells ahead is interior and still blocked; then both the corridor cell and
/// that junction are opened and the walk continues from the junction. Branches
/// never merge and the outer ring stays intact. The walk uses an explicit stack,
/// so its memory is bounded by the grid size rather than the call stack.
pub fn generate(
    width: usize,
    height: usize,
    start_x: i64,
    start_y: i64,
    seed: u64,
) -> Result<Grid, ConfigError> {
    let mut grid = Grid::solid(width, height)?;
    if !grid.is_interior(start_x, start_y) {
        return Err(ConfigError::InvalidStart {
            x: start_x,
            y: start_y,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    carve(&mut grid, start_x, start_y, &mut rng);

    debug_assert!(grid.check_border().is_ok());
    Ok(grid)
}

/// Run the walk from `(x, y)`. Returns the number of loop iterations, at most
/// five per junction (four tries and a pop).
fn carve(grid: &mut Grid, x: i64, y: i64, rng: &mut StdRng) -> usize {
    grid.set(x as usize, y as usize, Cell::Free);
    let mut stack = vec![Frame::new(x, y, rng)];
    let mut iterations = 0;

    while let Some(top) = stack.last_mut() {
        iterations += 1;
        if top.next == top.dirs.len() {
            stack.pop();
            continue;
        }
        let (dx, dy) = top.dirs[top.next].offset();
        top.next += 1;

        let (x, y) = (top.x, top.y);
        let (ahead_x, ahead_y) = (x + 2 * dx, y + 2 * dy);
        if !grid.is_interior(ahead_x, ahead_y) || !grid.is_blocked(ahead_x, ahead_y) {
            continue;
        }

        grid.set((x + dx) as usize, (y + dy) as usize, Cell::Free);
        grid.set(ahead_x as usize, ahead_y as usize, Cell::Free);
        stack.push(Frame::new(ahead_x, ahead_y, rng));
    }

    iterations
}
