use glam::Vec2;
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

#[inline]
fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    #[inline]
    pub fn pack(self) -> u32 {
        pack_rgb(self.r, self.g, self.b)
    }
}

/// Drawing surface the scene renders into. Coordinates are canvas pixels,
/// the same units as emitter and segment positions.
pub trait Canvas {
    fn clear(&mut self, color: Rgba);
    fn draw_line(&mut self, a: Vec2, b: Vec2, color: Rgba, width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
}

#[inline]
fn lerp_color_u32(a: u32, b: u32, w256: u32) -> u32 {
    // w256 in [0, 256]; inv = 256 - w256
    let inv = 256 - w256;
    // R and B together (00RR00BB), G separately (0000GG00)
    let rb = (((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8) & 0x00FF00FF;
    let g = (((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8) & 0x0000FF00;
    rb | g
}

/// Inclusive pixel range whose centers lie within `half` of `center`,
/// clamped to `0..limit`. Always covers at least the nearest pixel.
fn pixel_span(center: f32, half: f32, limit: usize) -> Option<(usize, usize)> {
    let mut lo = (center - half).ceil();
    let mut hi = (center + half).floor();
    if lo > hi {
        lo = center.round();
        hi = lo;
    }
    let lo = lo.max(0.0);
    let hi = hi.min(limit as f32 - 1.0);
    if lo > hi {
        None
    } else {
        Some((lo as usize, hi as usize))
    }
}

/// CPU framebuffer in softbuffer's `0x00RRGGBB` layout.
pub struct FrameBuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        let idx = y * self.width + x;
        match color.a {
            255 => self.pixels[idx] = color.pack(),
            0 => {}
            a => {
                let weight = (a as u32 * 256 + 127) / 255;
                self.pixels[idx] = lerp_color_u32(self.pixels[idx], color.pack(), weight);
            }
        }
    }

    /// Copy the canvas into a `dst_w` x `dst_h` surface buffer, top-left
    /// aligned. Pixels outside the canvas are cleared.
    pub fn present(&self, dst: &mut [u32], dst_w: usize, dst_h: usize) {
        let copy_w = self.width.min(dst_w);
        dst[..dst_w * dst_h]
            .par_chunks_mut(dst_w)
            .enumerate()
            .for_each(|(y, dst_row)| {
                if y < self.height {
                    let row = y * self.width;
                    dst_row[..copy_w].copy_from_slice(&self.pixels[row..row + copy_w]);
                    dst_row[copy_w..].fill(0);
                } else {
                    dst_row.fill(0);
                }
            });
    }
}

impl Canvas for FrameBuffer {
    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color.pack());
    }

    /// Steps the major axis one pixel at a time and fills the minor-axis span
    /// covered by the line's thickness at that column (or row).
    fn draw_line(&mut self, a: Vec2, b: Vec2, color: Rgba, width: f32) {
        let d = b - a;
        let half = 0.5 * width.max(1.0);

        if d.x == 0.0 && d.y == 0.0 {
            self.fill_circle(a, half, color);
            return;
        }

        let x_major = d.x.abs() >= d.y.abs();
        let (major_len, minor_len) = if x_major {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        let (a_major, a_minor, d_major, d_minor) = if x_major {
            (a.x, a.y, d.x, d.y)
        } else {
            (a.y, a.x, d.y, d.x)
        };

        let slope = d_minor / d_major;
        // perpendicular half-width measured along the minor axis
        let span = half * (1.0 + slope * slope).sqrt();

        let (from, to) = if d_major > 0.0 {
            (a_major, a_major + d_major)
        } else {
            (a_major + d_major, a_major)
        };
        let mid = 0.5 * (from + to);
        let Some((start, end)) = pixel_span(mid, to - mid, major_len) else {
            return;
        };

        for m in start..=end {
            let center = a_minor + (m as f32 - a_major) * slope;
            let Some((lo, hi)) = pixel_span(center, span, minor_len) else {
                continue;
            };
            for n in lo..=hi {
                if x_major {
                    self.blend(m, n, color);
                } else {
                    self.blend(n, m, color);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let Some((y0, y1)) = pixel_span(center.y, radius, self.height) else {
            return;
        };
        let r2 = radius * radius;

        for y in y0..=y1 {
            let dy = y as f32 - center.y;
            let rem = r2 - dy * dy;
            if rem < 0.0 {
                continue;
            }
            let Some((x0, x1)) = pixel_span(center.x, rem.sqrt(), self.width) else {
                continue;
            };
            for x in x0..=x1 {
                self.blend(x, y, color);
            }
        }
    }
}
