use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{
    camera::{Camera, MoveParams},
    error::ConfigError,
    grid::{DEFAULT_LAYOUT, Grid},
    maze,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MapSource {
    /// Built-in hand-authored level.
    Fixed,
    /// Randomized depth-first maze.
    Maze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleKind {
    Flat,
    Textured,
}

/// `maze_caster` - first-person raycaster over a grid level or a generated maze.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Internal frame buffer width in pixels.
    #[arg(long, env = "CASTER_WIDTH", default_value_t = 640)]
    pub width: usize,

    /// Internal frame buffer height in pixels.
    #[arg(long, env = "CASTER_HEIGHT", default_value_t = 480)]
    pub height: usize,

    /// Horizontal field of view in degrees.
    #[arg(long, env = "CASTER_FOV", default_value_t = 60.0)]
    pub fov: f32,

    /// Where the level comes from.
    #[arg(long, env = "CASTER_MAP", value_enum, default_value_t = MapSource::Fixed)]
    pub map: MapSource,

    #[arg(long, env = "CASTER_MAZE_WIDTH", default_value_t = 21)]
    pub maze_width: usize,

    #[arg(long, env = "CASTER_MAZE_HEIGHT", default_value_t = 15)]
    pub maze_height: usize,

    /// Maze seed. Taken from the clock when absent.
    #[arg(long, env = "CASTER_SEED")]
    pub seed: Option<u64>,

    #[arg(long, env = "CASTER_START_X", default_value_t = 1.5)]
    pub start_x: f32,

    #[arg(long, env = "CASTER_START_Y", default_value_t = 1.5)]
    pub start_y: f32,

    /// Starting heading in degrees, counter-clockwise from +X.
    #[arg(long, env = "CASTER_HEADING", default_value_t = 0.0)]
    pub heading: f32,

    #[arg(long, env = "CASTER_STYLE", value_enum, default_value_t = StyleKind::Flat)]
    pub style: StyleKind,

    /// PNG used for textured walls. A brick pattern is generated when absent.
    #[arg(long, env = "CASTER_TEXTURE")]
    pub texture: Option<PathBuf>,

    /// Distance covered by one move command, in cells. Must stay below one cell,
    /// otherwise a single step could hop over a one-cell wall.
    #[arg(long, env = "CASTER_MOVE_STEP", default_value_t = 0.2)]
    pub move_step: f32,

    /// Angle covered by one turn command, in radians.
    #[arg(long, env = "CASTER_TURN_STEP", default_value_t = 0.1)]
    pub turn_step: f32,
}

/// Validated view parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub screen_width: usize,
    pub screen_height: usize,
    pub fov: f32, // radians
    pub moves: MoveParams,
}

impl Config {
    pub fn view(&self) -> Result<ViewSettings, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyScreen {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigError::InvalidFov(self.fov));
        }
        let steps_ok = |s: f32| s.is_finite() && s > 0.0;
        if !steps_ok(self.move_step) || self.move_step >= 1.0 || !steps_ok(self.turn_step) {
            return Err(ConfigError::InvalidStep);
        }
        Ok(ViewSettings {
            screen_width: self.width,
            screen_height: self.height,
            fov: self.fov.to_radians(),
            moves: MoveParams {
                move_step: self.move_step,
                turn_step: self.turn_step,
            },
        })
    }

    /// Cell holding the starting position; the maze is carved from there.
    pub fn start_cell(&self) -> (i64, i64) {
        (self.start_x.floor() as i64, self.start_y.floor() as i64)
    }

    pub fn build_grid(&self, seed: u64) -> Result<Grid, ConfigError> {
        match self.map {
            MapSource::Fixed => Grid::from_layout(DEFAULT_LAYOUT),
            MapSource::Maze => {
                let (x, y) = self.start_cell();
                maze::generate(self.maze_width, self.maze_height, x, y, seed)
            }
        }
    }

    /// Starting pose, checked against `grid`.
    pub fn camera(&self, grid: &Grid) -> Result<Camera, ConfigError> {
        Camera::new([self.start_x, self.start_y], self.heading.to_radians()).placed_on(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let argv = std::iter::once("maze_caster").chain(args.iter().copied());
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_the_classic_setup() {
        let cfg = parse(&[]);
        let view = cfg.view().unwrap();
        assert_eq!((view.screen_width, view.screen_height), (640, 480));
        assert!((view.fov - 60f32.to_radians()).abs() < 1e-6);
        assert_eq!(cfg.map, MapSource::Fixed);
        assert_eq!(cfg.style, StyleKind::Flat);
        assert_eq!(view.moves, MoveParams::default());

        let grid = cfg.build_grid(0).unwrap();
        let cam = cfg.camera(&grid).unwrap();
        assert_eq!(cam.pos, [1.5, 1.5]);
    }

    #[test]
    fn maze_mode_uses_the_seed() {
        let cfg = parse(&["--map", "maze", "--maze-width", "11", "--maze-height", "9"]);
        let a = cfg.build_grid(5).unwrap();
        let b = cfg.build_grid(5).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.width(), a.height()), (11, 9));
        assert!(cfg.camera(&a).is_ok());
    }

    #[test]
    fn bad_fov_is_rejected() {
        assert_eq!(
            parse(&["--fov", "180"]).view().unwrap_err(),
            ConfigError::InvalidFov(180.0)
        );
        assert!(parse(&["--fov", "0"]).view().is_err());
    }

    #[test]
    fn zero_screen_is_rejected() {
        assert!(matches!(
            parse(&["--width", "0"]).view(),
            Err(ConfigError::EmptyScreen { width: 0, .. })
        ));
    }

    #[test]
    fn non_positive_steps_are_rejected() {
        assert_eq!(
            parse(&["--move-step", "0"]).view().unwrap_err(),
            ConfigError::InvalidStep
        );
    }

    #[test]
    fn whole_cell_moves_are_rejected() {
        for step in ["1.0", "2.5"] {
            assert_eq!(
                parse(&["--move-step", step]).view().unwrap_err(),
                ConfigError::InvalidStep
            );
        }
        assert!(parse(&["--move-step", "0.99"]).view().is_ok());
    }

    #[test]
    fn maze_start_on_border_is_rejected() {
        let cfg = parse(&["--map", "maze", "--start-x", "0.5"]);
        assert_eq!(
            cfg.build_grid(1).unwrap_err(),
            ConfigError::InvalidStart { x: 0, y: 1 }
        );
    }

    #[test]
    fn start_inside_a_wall_is_rejected() {
        let cfg = parse(&["--start-x", "4.5", "--start-y", "2.5"]);
        let grid = cfg.build_grid(0).unwrap();
        assert!(matches!(
            cfg.camera(&grid),
            Err(ConfigError::StartBlocked { .. })
        ));
    }
}
