use std::path::Path;

use crate::{error::TextureError, renderer::pack_rgb};

/// Read-only wall image, pixels packed like the frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(TextureError::Empty);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Load a PNG. Alpha is dropped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let img = image::open(path.as_ref())?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| pack_rgb(p[0], p[1], p[2])).collect();
        Self::from_pixels(width as usize, height as usize, pixels)
    }

    /// Procedural running-bond brick pattern.
    pub fn brick(size: usize) -> Self {
        let size = size.max(8);
        let brick_w = size / 4;
        let brick_h = size / 8;
        let mortar = pack_rgb(40, 38, 35);

        let mut pixels = Vec::with_capacity(size * size);
        for y in 0..size {
            let row = y / brick_h;
            let offset = if row % 2 == 0 { 0 } else { brick_w / 2 };
            for x in 0..size {
                let bx = (x + offset) % brick_w;
                let by = y % brick_h;
                if bx == 0 || by == 0 {
                    pixels.push(mortar);
                    continue;
                }
                // per-brick shade so the wall does not look flat
                let id = (row * 13 + ((x + offset) / brick_w) * 29) & 0x3F;
                let v = 130 + id as u32;
                let r = v.min(255) as u8;
                let g = (v as f32 * 0.75) as u8;
                let b = (v as f32 * 0.55) as u8;
                pixels.push(pack_rgb(r, g, b));
            }
        }

        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest sample at `(u, v)`; coordinates wrap outside `[0, 1)`.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let tx = ((u - u.floor()) * self.width as f32) as usize;
        let ty = ((v - v.floor()) * self.height as f32) as usize;
        // u - floor(u) can round to 1.0
        let tx = tx.min(self.width - 1);
        let ty = ty.min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }
}
