use std::fmt;

use crate::error::ConfigError;

/// Hand-authored level: `#` is a wall, space is open floor.
pub const DEFAULT_LAYOUT: &[&str] = &[
    "###############",
    "#             #",
    "#   #    ######",
    "#####      #  #",
    "#      #      #",
    "#    ###   #  #",
    "#          #  #",
    "#####         #",
    "#        #    #",
    "###############",
];

const WALL_CHAR: char = '#';
const FLOOR_CHAR: char = ' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Free,
    Blocked,
}

/// Occupancy field, row-major, `y` grows with the row index.
///
/// Every constructor guarantees that the outer ring of cells is blocked, which is
/// what keeps ray marches bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// All cells blocked. Starting point for the maze carver.
    pub(crate) fn solid(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width < 3 || height < 3 {
            return Err(ConfigError::GridTooSmall { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Blocked; width * height],
        })
    }

    /// Parse a layout made of `#` and space rows. Row 0 is `y = 0`.
    pub fn from_layout(rows: &[&str]) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut grid = Self::solid(width, height)?;

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedLayout {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = match ch {
                    WALL_CHAR => Cell::Blocked,
                    FLOOR_CHAR => Cell::Free,
                    _ => return Err(ConfigError::UnknownCell { ch, x, y }),
                };
                grid.set(x, y, cell);
            }
        }

        grid.check_border()?;
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cells outside the grid count as blocked.
    #[inline]
    pub fn is_blocked(&self, x: i64, y: i64) -> bool {
        if !self.contains(x, y) {
            return true;
        }
        self.cells[y as usize * self.width + x as usize] == Cell::Blocked
    }

    /// Whether a continuous position falls on a free cell.
    #[inline]
    pub fn is_free_at(&self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        !self.is_blocked(x.floor() as i64, y.floor() as i64)
    }

    /// Interior cells are the ones not on the outer ring.
    pub fn is_interior(&self, x: i64, y: i64) -> bool {
        x >= 1 && y >= 1 && x <= self.width as i64 - 2 && y <= self.height as i64 - 2
    }

    pub fn free_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Free)
            .map(|(i, _)| (i % self.width, i / self.width))
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }

    pub(crate) fn check_border(&self) -> Result<(), ConfigError> {
        let (w, h) = (self.width, self.height);
        let ring = (0..w)
            .flat_map(|x| [(x, 0), (x, h - 1)])
            .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]));
        for (x, y) in ring {
            if self.cells[y * w + x] == Cell::Free {
                return Err(ConfigError::BorderOpen { x, y });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for cell in row {
                let ch = match cell {
                    Cell::Free => FLOOR_CHAR,
                    Cell::Blocked => WALL_CHAR,
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
