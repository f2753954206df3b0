//! Geometry shared by the canvas and vector adapters.
//!
//! Every function here is pure arithmetic over the matrix size and target
//! pixel size, so preview and export layouts differ only by scale.

use crate::request::LogoSpec;
use crate::style::StyleId;

/// Quiet zone width, in modules, on every side of the symbol.
pub const QUIET_ZONE: usize = 4;

/// Side length of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// Minimum safe-zone padding in pixels.
const MIN_SAFE_ZONE_PADDING: f32 = 8.0;

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, size, size)
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the interiors overlap. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Shrinks the rectangle around its center so each side is `scale` times
    /// its original length.
    pub fn scaled_about_center(&self, scale: f32) -> Self {
        let width = self.width * scale;
        let height = self.height * scale;
        Self::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Snaps to whole device pixels for a surface drawn at `pixel_ratio`.
    ///
    /// Both edges are rounded independently, so a module's right edge lands
    /// on exactly the same pixel as its neighbour's left edge.
    pub fn snapped(&self, pixel_ratio: f32) -> Self {
        let ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let x = (self.x * ratio).round();
        let y = (self.y * ratio).round();
        let width = ((self.right() * ratio).round() - x).max(1.0);
        let height = ((self.bottom() * ratio).round() - y).max(1.0);
        Self::new(x / ratio, y / ratio, width / ratio, height / ratio)
    }
}

// ============================================================================
// Module geometry
// ============================================================================

/// Module pixel size and quiet-zone offset for a matrix drawn at a pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleGeometry {
    pub matrix_size: usize,
    pub pixel_size: f32,
    pub module_size: f32,
    pub offset: f32,
}

impl ModuleGeometry {
    /// Reserves a fixed four-module quiet zone on all sides.
    pub fn compute(matrix_size: usize, pixel_size: f32) -> Self {
        let module_size = pixel_size / (matrix_size + 2 * QUIET_ZONE) as f32;
        Self {
            matrix_size,
            pixel_size,
            module_size,
            offset: module_size * QUIET_ZONE as f32,
        }
    }

    /// Pixel extent of the module matrix, quiet zone excluded.
    pub fn matrix_extent(&self) -> f32 {
        self.matrix_size as f32 * self.module_size
    }

    /// Bottom edge of the last module row.
    pub fn matrix_bottom(&self) -> f32 {
        self.offset + self.matrix_extent()
    }

    /// Pixel rectangle of the module at column `x`, row `y`.
    pub fn module_rect(&self, x: usize, y: usize) -> Rect {
        Rect::square(
            self.offset + x as f32 * self.module_size,
            self.offset + y as f32 * self.module_size,
            self.module_size,
        )
    }

    /// Top-left module coordinates of the three finder patterns.
    pub fn finder_origins(&self) -> [(usize, usize); 3] {
        let far = self.matrix_size.saturating_sub(FINDER_SIZE);
        [(0, 0), (far, 0), (0, far)]
    }
}

/// True when `(x, y)` lies inside one of the three 7x7 finder corners.
pub fn is_finder_module(x: usize, y: usize, size: usize) -> bool {
    let near = |v: usize| v < FINDER_SIZE;
    let far = |v: usize| v + FINDER_SIZE >= size;
    (near(x) && near(y)) || (far(x) && near(y)) || (near(x) && far(y))
}

/// Corner radius of a finder pattern's outer square for a style.
pub fn finder_radius(style: StyleId, outer_size: f32) -> f32 {
    match style {
        StyleId::Dots => outer_size / 2.0,
        StyleId::Rounded => outer_size * 0.2,
        StyleId::Pills => outer_size * 0.25,
        StyleId::Classic | StyleId::Outline => 0.0,
    }
}

// ============================================================================
// Logo clip
// ============================================================================

/// Square region reserved for a logo, centered on the drawable area.
///
/// `size == content_size + 2 * padding`; `padding` is zero without a safe zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoClip {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub content_size: f32,
    pub padding: f32,
}

impl LogoClip {
    /// Computes the clip, or `None` without a logo or with a non-positive size.
    ///
    /// The logo size is a percentage of the matrix extent, not of the canvas.
    pub fn compute(
        matrix_size: usize,
        module_size: f32,
        logo: Option<&LogoSpec>,
        pixel_size: f32,
    ) -> Option<Self> {
        let logo = logo?;
        if logo.size_percent <= 0.0 {
            return None;
        }

        let content_size = matrix_size as f32 * module_size * logo.size_percent / 100.0;
        let padding = if logo.safe_zone {
            (1.5 * module_size).max(MIN_SAFE_ZONE_PADDING)
        } else {
            0.0
        };
        let size = content_size + 2.0 * padding;
        let start = pixel_size / 2.0 - size / 2.0;

        Some(Self {
            x: start,
            y: start,
            size,
            content_size,
            padding,
        })
    }

    /// The full padded square; modules overlapping it are not drawn.
    pub fn bounds(&self) -> Rect {
        Rect::square(self.x, self.y, self.size)
    }

    /// The inner square the logo image is fitted into.
    pub fn content_bounds(&self) -> Rect {
        Rect::square(self.x + self.padding, self.y + self.padding, self.content_size)
    }
}
