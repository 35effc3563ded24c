//! Software raster [`Canvas`].
//!
//! Each layer paints into its own `Surface`. Pixels are stored as straight
//! alpha `f32` RGBA in an [`image::Rgba32FImage`], so repeated low-alpha
//! trail fades accumulate without the banding an 8-bit buffer would show.
//! Shapes are antialiased by analytic coverage: a pixel's coverage is how far
//! its centre lies inside the shape edge, clamped to one pixel.

use std::path::Path;

use glam::Vec2;
use image::{ImageFormat, Rgba, Rgba32FImage, RgbaImage};

use crate::canvas::Canvas;
use crate::error::ExportError;
use crate::visuals::Color;

/// An RGBA raster the size of the viewport.
#[derive(Debug, Clone)]
pub struct Surface {
    image: Rgba32FImage,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            image: Rgba32FImage::from_pixel(width, height, Rgba(color.to_array())),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &Rgba32FImage {
        &self.image
    }

    /// Reallocate at the new size. Like a resized HTML canvas, the content
    /// is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width(), self.height()) {
            self.image = Rgba32FImage::new(width, height);
        }
    }

    pub fn clear(&mut self, color: Color) {
        let px = Rgba(color.to_array());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    /// Color at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| Color::new(p[0], p[1], p[2], p[3]))
    }

    /// Quantize to 8-bit RGBA for export.
    pub fn to_rgba8(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            let p = self.image.get_pixel(x, y);
            Rgba(Color::new(p[0], p[1], p[2], p[3]).to_rgba8())
        })
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        self.to_rgba8().save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Blend `src` over this surface with an extra layer `opacity`.
    ///
    /// Only the overlapping region is touched when the sizes differ.
    pub fn composite_over(&mut self, src: &Surface, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        let w = self.width().min(src.width());
        let h = self.height().min(src.height());
        for y in 0..h {
            for x in 0..w {
                let s = src.image.get_pixel(x, y);
                if s[3] <= 0.0 {
                    continue;
                }
                let color = Color::new(s[0], s[1], s[2], s[3] * opacity);
                blend(self.image.get_pixel_mut(x, y), color, 1.0);
            }
        }
    }

    /// Run `coverage` over every pixel centre in the clipped box and blend
    /// `color` by the result.
    fn cover<F>(&mut self, min: Vec2, max: Vec2, color: Color, coverage: F)
    where
        F: Fn(Vec2) -> f32,
    {
        if color.a <= 0.0 || !min.is_finite() || !max.is_finite() {
            return;
        }
        let Some((x0, x1)) = clip(min.x, max.x, self.width()) else {
            return;
        };
        let Some((y0, y1)) = clip(min.y, max.y, self.height()) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let c = coverage(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if c > 0.0 {
                    blend(self.image.get_pixel_mut(x, y), color, c.min(1.0));
                }
            }
        }
    }
}

impl Canvas for Surface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fade(&mut self, color: Color) {
        if color.a <= 0.0 {
            return;
        }
        for p in self.image.pixels_mut() {
            blend(p, color, 1.0);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius > 0.0) {
            return;
        }
        let reach = Vec2::splat(radius + 1.0);
        self.cover(center - reach, center + reach, color, |p| {
            radius + 0.5 - p.distance(center)
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        if !(radius > 0.0) || !(width > 0.0) {
            return;
        }
        let half = width * 0.5;
        let reach = Vec2::splat(radius + half + 1.0);
        self.cover(center - reach, center + reach, color, |p| {
            half + 0.5 - (p.distance(center) - radius).abs()
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        if !(width > 0.0) {
            return;
        }
        let half = width * 0.5;
        let pad = Vec2::splat(half + 1.0);
        self.cover(from.min(to) - pad, from.max(to) + pad, color, |p| {
            half + 0.5 - segment_distance(p, from, to)
        });
    }

    /// The raster surface has no font; the renderer's marker stands in for
    /// the text.
    fn label(&mut self, _anchor: Vec2, _text: &str, _color: Color) {}
}

/// Pixel range `[lo, hi)` covering `min..=max`, clipped to `0..limit`.
fn clip(min: f32, max: f32, limit: u32) -> Option<(u32, u32)> {
    let lo = min.floor().max(0.0);
    let hi = (max.ceil() + 1.0).min(limit as f32);
    if hi <= lo {
        None
    } else {
        Some((lo as u32, hi as u32))
    }
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Straight-alpha source-over.
#[inline]
fn blend(dst: &mut Rgba<f32>, src: Color, coverage: f32) {
    let sa = (src.a * coverage).clamp(0.0, 1.0);
    let da = dst[3];
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0.0; 4]);
        return;
    }
    let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
    *dst = Rgba([
        mix(src.r, dst[0]),
        mix(src.g, dst[1]),
        mix(src.b, dst[2]),
        out_a,
    ]);
}
