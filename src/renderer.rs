use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::{
    camera::Camera,
    error::{CastError, ConfigError},
    grid::Grid,
    raycast::{Axis, Hit, cast},
    texture::Texture,
};

/// How much the floor darkens between the horizon and the bottom row.
const FLOOR_FADE: f32 = 0.6;
/// Brightness of textured faces found on `y` = const lines.
const HORIZONTAL_FACE_SHADE: f32 = 0.75;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
fn unpack_rgb(c: u32) -> [f32; 3] {
    [
        ((c >> 16) & 0xFF) as f32,
        ((c >> 8) & 0xFF) as f32,
        (c & 0xFF) as f32,
    ]
}

#[inline]
fn shade(c: u32, k: f32) -> u32 {
    let [r, g, b] = unpack_rgb(c);
    pack_rgb((r * k) as u8, (g * k) as u8, (b * k) as u8)
}

#[inline]
fn lerp_rgb(a: u32, b: u32, t: f32) -> u32 {
    let [ar, ag, ab] = unpack_rgb(a);
    let [br, bg, bb] = unpack_rgb(b);
    let mix = |x: f32, y: f32| (x + (y - x) * t).round() as u8;
    pack_rgb(mix(ar, br), mix(ag, bg), mix(ab, bb))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub sky_top: u32,
    pub sky_horizon: u32,
    pub floor: u32,
    pub wall_vertical: u32,
    pub wall_horizontal: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sky_top: pack_rgb(0x10, 0x10, 0x48),
            sky_horizon: pack_rgb(0x30, 0x30, 0xAA),
            floor: pack_rgb(0x10, 0x80, 0x50),
            wall_vertical: pack_rgb(0x50, 0x50, 0x50),
            wall_horizontal: pack_rgb(0x20, 0x10, 0x20),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WallStyle {
    /// One color per face orientation.
    Flat,
    Textured(Texture),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub walls: WallStyle,
    pub palette: Palette,
}

impl Style {
    pub fn flat() -> Self {
        Self {
            walls: WallStyle::Flat,
            palette: Palette::default(),
        }
    }

    pub fn textured(texture: Texture) -> Self {
        Self {
            walls: WallStyle::Textured(texture),
            palette: Palette::default(),
        }
    }
}

#[inline]
fn sky_at(palette: &Palette, y: usize, horizon: usize) -> u32 {
    let t = y as f32 / horizon.max(1) as f32;
    lerp_rgb(palette.sky_top, palette.sky_horizon, t)
}

#[inline]
fn floor_at(palette: &Palette, y: usize, horizon: usize, height: usize) -> u32 {
    let span = (height - horizon).max(1) as f32;
    let t = (y.saturating_sub(horizon)) as f32 / span;
    shade(palette.floor, 1.0 - FLOOR_FADE * t)
}

/// Fill one screen column, top to bottom: sky, wall strip, floor.
///
/// `column` holds exactly the column's pixels, row 0 first. The strip is
/// `H / distance` rows tall, centred on the horizon and clipped to the screen;
/// when clipped, texture rows start past the hidden top part so the visible
/// slice stays centred on the texture.
pub fn render_column(column: &mut [u32], hit: &Hit, style: &Style) {
    let height = column.len();
    if height == 0 {
        return;
    }
    let palette = &style.palette;
    let horizon = height / 2;

    let wall_h = hit.wall_height(height);
    let visible = wall_h.min(height);
    let top = (height - visible) / 2;
    let bottom = top + visible;
    let clipped = (wall_h - visible) / 2;

    let (sky, rest) = column.split_at_mut(top);
    let (wall, floor) = rest.split_at_mut(visible);

    for (y, px) in sky.iter_mut().enumerate() {
        *px = sky_at(palette, y, horizon);
    }

    match &style.walls {
        WallStyle::Flat => {
            let c = match hit.axis {
                Axis::Vertical => palette.wall_vertical,
                Axis::Horizontal => palette.wall_horizontal,
            };
            wall.fill(c);
        }
        WallStyle::Textured(tex) => {
            let u = hit.texture_u();
            let inv_h = 1.0 / wall_h as f32;
            for (i, px) in wall.iter_mut().enumerate() {
                let v = (clipped + i) as f32 * inv_h;
                let c = tex.sample(u, v);
                *px = match hit.axis {
                    Axis::Vertical => c,
                    Axis::Horizontal => shade(c, HORIZONTAL_FACE_SHADE),
                };
            }
        }
    }

    for (i, px) in floor.iter_mut().enumerate() {
        *px = floor_at(palette, bottom + i, horizon, height);
    }
}

/// Packed `0RGB` frame plus a column-major scratch buffer the columns render into.
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    columns: Vec<u32>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyScreen { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; width * height],
            columns: vec![0; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixels, row 0 at the top.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }
}

/// Angle of the ray for `column`; column 0 is the leftmost, most counter-clockwise ray.
#[inline]
pub fn column_angle(camera: &Camera, fov: f32, width: usize, column: usize) -> f32 {
    camera.yaw + 0.5 * fov - column as f32 * (fov / width as f32)
}

/// Render one frame.
///
/// `camera` is taken by value: the frame works on that snapshot even if the
/// caller's pose changes meanwhile. Columns render in parallel, each into its
/// own contiguous slice of the scratch buffer, then rows are gathered into the
/// row-major output.
pub fn render_frame(
    grid: &Grid,
    camera: Camera,
    fov: f32,
    style: &Style,
    frame: &mut Frame,
) -> Result<(), CastError> {
    let Frame {
        width,
        height,
        pixels,
        columns,
    } = frame;
    let (width, height) = (*width, *height);

    columns
        .par_chunks_mut(height)
        .enumerate()
        .try_for_each(|(x, column)| {
            let angle = column_angle(&camera, fov, width, x);
            let hit = cast(grid, &camera, angle)?;
            render_column(column, &hit, style);
            Ok::<(), CastError>(())
        })?;

    let columns = &*columns;
    pixels.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            *px = columns[x * height + y];
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    fn hit(distance: f32, axis: Axis) -> Hit {
        Hit {
            point: [4.0, 2.25],
            ray_length: distance,
            distance,
            axis,
        }
    }

    fn room5() -> Grid {
        Grid::from_layout(&["#####", "#   #", "#   #", "#   #", "#####"]).unwrap()
    }

    #[test]
    fn flat_column_layout() {
        let style = Style::flat();
        let mut column = vec![0xDEADBEEF; 100];
        render_column(&mut column, &hit(2.0, Axis::Vertical), &style);

        // 50 rows of wall centred on the horizon
        assert_eq!(column[0], style.palette.sky_top);
        assert_ne!(column[24], style.palette.wall_vertical);
        assert!(column[25..75].iter().all(|&c| c == style.palette.wall_vertical));
        assert_ne!(column[75], style.palette.wall_vertical);
        assert!(!column.contains(&0xDEADBEEF));
    }

    #[test]
    fn flat_faces_differ_by_axis() {
        let style = Style::flat();
        let mut a = vec![0; 64];
        let mut b = vec![0; 64];
        render_column(&mut a, &hit(1.0, Axis::Vertical), &style);
        render_column(&mut b, &hit(1.0, Axis::Horizontal), &style);
        assert!(a.iter().all(|&c| c == style.palette.wall_vertical));
        assert!(b.iter().all(|&c| c == style.palette.wall_horizontal));
    }

    #[test]
    fn floor_darkens_towards_the_bottom() {
        let style = Style::flat();
        let mut column = vec![0; 100];
        render_column(&mut column, &hit(10.0, Axis::Vertical), &style);
        let near_horizon = unpack_rgb(column[56]);
        let bottom = unpack_rgb(column[99]);
        assert!(bottom[1] < near_horizon[1]);
    }

    #[test]
    fn sky_brightens_towards_the_horizon() {
        let style = Style::flat();
        let mut column = vec![0; 100];
        render_column(&mut column, &hit(10.0, Axis::Vertical), &style);
        assert!(unpack_rgb(column[40])[2] > unpack_rgb(column[0])[2]);
    }

    #[test]
    fn textured_strip_samples_whole_texture() {
        // 1 wide, 4 tall gradient
        let tex = Texture::from_pixels(1, 4, vec![10, 20, 30, 40]).unwrap();
        let style = Style::textured(tex);
        let mut column = vec![0; 80];
        render_column(&mut column, &hit(2.0, Axis::Vertical), &style);
        // strip covers rows 20..60, 10 rows per texel
        assert_eq!(column[20], 10);
        assert_eq!(column[35], 20);
        assert_eq!(column[45], 30);
        assert_eq!(column[59], 40);
    }

    #[test]
    fn clipped_strip_starts_mid_texture() {
        let tex = Texture::from_pixels(1, 4, vec![10, 20, 30, 40]).unwrap();
        let style = Style::textured(tex);
        let mut column = vec![0; 80];
        // 160 rows tall, only the middle half is visible
        render_column(&mut column, &hit(0.5, Axis::Vertical), &style);
        assert_eq!(column[0], 20);
        assert_eq!(column[39], 20);
        assert_eq!(column[40], 30);
        assert_eq!(column[79], 30);
    }

    #[test]
    fn textured_horizontal_faces_are_darker() {
        let white = pack_rgb(200, 200, 200);
        let tex = Texture::from_pixels(1, 1, vec![white]).unwrap();
        let style = Style::textured(tex);
        let mut column = vec![0; 10];
        render_column(&mut column, &hit(1.0, Axis::Horizontal), &style);
        assert_eq!(column[5], pack_rgb(150, 150, 150));
    }

    #[test]
    fn leftmost_column_is_most_counter_clockwise() {
        let cam = Camera::new([2.5, 2.5], 1.0);
        let fov = PI / 3.0;
        assert!((column_angle(&cam, fov, 640, 0) - (1.0 + fov / 2.0)).abs() < 1e-6);
        assert!(column_angle(&cam, fov, 640, 639) < column_angle(&cam, fov, 640, 0));
        assert!((column_angle(&cam, fov, 640, 320) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn frame_matches_per_column_render() {
        let grid = room5();
        let cam = Camera::new([2.2, 2.7], 0.4);
        let fov = PI / 3.0;
        let style = Style::flat();
        let mut frame = Frame::new(32, 24).unwrap();
        render_frame(&grid, cam, fov, &style, &mut frame).unwrap();

        for x in [0, 7, 16, 31] {
            let angle = column_angle(&cam, fov, 32, x);
            let mut column = vec![0; 24];
            render_column(&mut column, &cast(&grid, &cam, angle).unwrap(), &style);
            for (y, &c) in column.iter().enumerate() {
                assert_eq!(frame.pixel(x, y), Some(c), "column {x} row {y}");
            }
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        let grid = room5();
        let cam = Camera::new([1.6, 3.1], 5.0);
        let style = Style::textured(Texture::brick(64));
        let mut frame = Frame::new(48, 32).unwrap();
        render_frame(&grid, cam, 1.0, &style, &mut frame).unwrap();
        let first = frame.pixels().to_vec();
        render_frame(&grid, cam, 1.0, &style, &mut frame).unwrap();
        assert_eq!(frame.pixels(), &first[..]);
    }

    #[test]
    fn pixel_outside_the_frame_is_none() {
        let frame = Frame::new(4, 3).unwrap();
        assert_eq!(frame.pixel(3, 2), Some(0));
        assert_eq!(frame.pixel(4, 0), None);
        assert_eq!(frame.pixel(0, 3), None);
    }

    #[test]
    fn empty_frame_is_rejected() {
        assert!(matches!(
            Frame::new(0, 10),
            Err(ConfigError::EmptyScreen { width: 0, height: 10 })
        ));
    }
}
