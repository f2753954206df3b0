//! Pixel surface backed by a tiny-skia pixmap.
//!
//! Used for interactive preview (device pixel ratio) and raster export
//! (pixel ratio forced to 1). Drawing happens in logical pixels; the pixel
//! ratio is applied as a single root transform.

use image::RgbaImage;
use resvg::tiny_skia::{
    FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use super::vector::text_document;
use super::{Shape, Surface, TextRun};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::raster::{pixmap_to_rgba_image, rgba_image_to_pixmap};
use crate::request::LogoImage;
use crate::style::Color;
use crate::text::TextEngine;

/// Bezier control-point distance approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

// ============================================================================
// RasterImage
// ============================================================================

/// Finished pixels of a canvas render.
#[derive(Clone)]
pub struct RasterImage {
    pixmap: Pixmap,
    pixel_ratio: f32,
}

impl RasterImage {
    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA copy of the pixels.
    pub fn to_rgba_image(&self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("pixel_ratio", &self.pixel_ratio)
            .finish()
    }
}

// ============================================================================
// CanvasSurface
// ============================================================================

/// A resizable pixel surface.
pub struct CanvasSurface<'a> {
    pixmap: Pixmap,
    pixel_ratio: f32,
    logical_width: f32,
    logical_height: f32,
    transform: Transform,
    text: &'a TextEngine,
}

impl<'a> CanvasSurface<'a> {
    /// Allocates a transparent surface of `width x height` logical pixels.
    pub fn new(width: f32, height: f32, pixel_ratio: f32, text: &'a TextEngine) -> Result<Self> {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let device_width = (width * pixel_ratio).ceil().max(0.0) as u32;
        let device_height = (height * pixel_ratio).ceil().max(0.0) as u32;

        let pixmap = Pixmap::new(device_width, device_height).ok_or(Error::SurfaceUnavailable {
            width: device_width,
            height: device_height,
        })?;

        Ok(Self {
            pixmap,
            pixel_ratio,
            logical_width: width,
            logical_height: height,
            transform: Transform::from_scale(pixel_ratio, pixel_ratio),
            text,
        })
    }

    pub fn finish(self) -> RasterImage {
        RasterImage {
            pixmap: self.pixmap,
            pixel_ratio: self.pixel_ratio,
        }
    }

    fn paint(color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        paint
    }

    fn fill_path(&mut self, path: &Path, color: Color, rule: FillRule) {
        self.pixmap
            .fill_path(path, &Self::paint(color), rule, self.transform, None);
    }
}

impl Surface for CanvasSurface<'_> {
    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn snaps_to_pixels(&self) -> bool {
        true
    }

    fn fill(&mut self, shape: &Shape, color: Color) {
        if let Some(path) = shape_path(shape) {
            self.fill_path(&path, color, FillRule::Winding);
        }
    }

    fn stroke(&mut self, shape: &Shape, width: f32, color: Color) {
        let Some(path) = shape_path(shape) else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &Self::paint(color), &stroke, self.transform, None);
    }

    fn fill_ring(&mut self, outer: &Shape, hole: &Shape, color: Color) {
        let mut pb = PathBuilder::new();
        push_shape(&mut pb, outer);
        push_shape(&mut pb, hole);
        if let Some(path) = pb.finish() {
            self.fill_path(&path, color, FillRule::EvenOdd);
        }
    }

    fn draw_image(&mut self, image: &LogoImage, bounds: Rect) {
        let pixels = image.pixels();
        if pixels.width() == 0 || pixels.height() == 0 {
            return;
        }
        let Some(logo) = rgba_image_to_pixmap(pixels) else {
            return;
        };

        let transform = self
            .transform
            .pre_translate(bounds.x, bounds.y)
            .pre_scale(
                bounds.width / pixels.width() as f32,
                bounds.height / pixels.height() as f32,
            );
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, logo.as_ref(), &paint, transform, None);
    }

    fn draw_text(&mut self, run: &TextRun) {
        if !self.text.has_fonts() {
            tracing::warn!(text = %run.text, "no fonts loaded, caption text not drawn");
            return;
        }
        let svg = text_document(self.logical_width, self.logical_height, run);
        let mut target = self.pixmap.as_mut();
        self.text.render_svg_onto(&svg, &mut target, self.transform);
    }
}

// ============================================================================
// Paths
// ============================================================================

fn shape_path(shape: &Shape) -> Option<Path> {
    let mut pb = PathBuilder::new();
    push_shape(&mut pb, shape);
    pb.finish()
}

fn push_shape(pb: &mut PathBuilder, shape: &Shape) {
    match *shape {
        Shape::Rect(rect) => {
            if let Some(r) = to_skia_rect(rect) {
                pb.push_rect(r);
            }
        }
        Shape::RoundedRect { rect, radius } => push_rounded_rect(pb, rect, radius),
        Shape::Circle { cx, cy, radius } => pb.push_circle(cx, cy, radius),
    }
}

fn to_skia_rect(rect: Rect) -> Option<resvg::tiny_skia::Rect> {
    resvg::tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

/// Appends a closed rounded rectangle using cubic quarter arcs.
fn push_rounded_rect(pb: &mut PathBuilder, rect: Rect, radius: f32) {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    let (x, y, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    let k = r * KAPPA;

    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
}
