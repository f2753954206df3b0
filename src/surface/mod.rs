//! Drawing primitives shared by the pixel and vector adapters.
//!
//! Layers describe what to draw as [`Shape`]s and [`TextRun`]s and hand them
//! to a [`Surface`]. Only the surface knows whether that ends up as pixels
//! or as SVG markup.

pub mod canvas;
pub mod vector;

pub use canvas::{CanvasSurface, RasterImage};
pub use vector::VectorSurface;

use crate::geometry::Rect;
use crate::request::LogoImage;
use crate::style::Color;
use crate::text::FontSpec;

// ============================================================================
// Shape
// ============================================================================

/// A filled or stroked primitive in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect(Rect),
    RoundedRect { rect: Rect, radius: f32 },
    Circle { cx: f32, cy: f32, radius: f32 },
}

impl Shape {
    /// A rectangle with corner radius; a zero radius yields a plain rect.
    pub fn rounded(rect: Rect, radius: f32) -> Self {
        let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        if radius > 0.0 {
            Self::RoundedRect { rect, radius }
        } else {
            Self::Rect(rect)
        }
    }

    /// Circle inscribed in a square.
    pub fn circle_in(rect: Rect) -> Self {
        let (cx, cy) = rect.center();
        Self::Circle {
            cx,
            cy,
            radius: rect.width.min(rect.height) / 2.0,
        }
    }

    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Rect(rect) | Self::RoundedRect { rect, .. } => rect,
            Self::Circle { cx, cy, radius } => {
                Rect::square(cx - radius, cy - radius, radius * 2.0)
            }
        }
    }

    /// Snaps rectangle edges to device pixels. Circles are left untouched.
    pub fn snapped(&self, pixel_ratio: f32) -> Self {
        match *self {
            Self::Rect(rect) => Self::Rect(rect.snapped(pixel_ratio)),
            Self::RoundedRect { rect, radius } => Self::rounded(rect.snapped(pixel_ratio), radius),
            circle @ Self::Circle { .. } => circle,
        }
    }
}

// ============================================================================
// Text
// ============================================================================

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// A single line of caption text positioned on its alphabetic baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub anchor: TextAnchor,
    pub font: FontSpec,
    pub color: Color,
}

// ============================================================================
// Surface
// ============================================================================

/// Drawing target implemented once for pixels and once for SVG markup.
pub trait Surface {
    /// Device pixels per logical pixel. Vector output reports `1.0`.
    fn pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Whether module edges should be snapped to whole device pixels.
    fn snaps_to_pixels(&self) -> bool {
        false
    }

    fn fill(&mut self, shape: &Shape, color: Color);

    /// Strokes the outline of `shape`, centered on its edge.
    fn stroke(&mut self, shape: &Shape, width: f32, color: Color);

    /// Fills `outer` minus `hole`.
    fn fill_ring(&mut self, outer: &Shape, hole: &Shape, color: Color);

    /// Draws `image` stretched into `bounds`.
    fn draw_image(&mut self, image: &LogoImage, bounds: Rect);

    fn draw_text(&mut self, run: &TextRun);

    /// Starts a named group of related primitives.
    fn begin_group(&mut self, _name: &str) {}

    fn end_group(&mut self) {}
}
