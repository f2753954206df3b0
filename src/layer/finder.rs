//! Finder patterns drawn as dedicated nested squares.

use super::{LayerEffect, RenderContext};
use crate::geometry::{FINDER_SIZE, ModuleGeometry, Rect, finder_radius};
use crate::style::StyleId;
use crate::surface::{Shape, Surface};

/// The three concentric shapes of one finder pattern: outer 7x7, middle
/// 5x5 and inner 3x3 modules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    pub outer: Shape,
    pub middle: Shape,
    pub inner: Shape,
}

impl FinderPattern {
    /// The pattern whose top-left module is `origin`.
    pub fn at(geometry: &ModuleGeometry, origin: (usize, usize), style: StyleId) -> Self {
        let ms = geometry.module_size;
        let corner = geometry.module_rect(origin.0, origin.1);
        let outer_size = ms * FINDER_SIZE as f32;
        let radius = finder_radius(style, outer_size);

        let square = |inset: f32, scale: f32| {
            let rect = Rect::square(corner.x + inset * ms, corner.y + inset * ms, outer_size - 2.0 * inset * ms);
            Shape::rounded(rect, radius * scale)
        };

        Self {
            outer: square(0.0, 1.0),
            middle: square(1.0, 5.0 / 7.0),
            inner: square(2.0, 3.0 / 7.0),
        }
    }
}

/// The three finder patterns: top-left, top-right, bottom-left.
pub fn finder_patterns(ctx: &RenderContext) -> [FinderPattern; 3] {
    ctx.geometry
        .finder_origins()
        .map(|origin| FinderPattern::at(&ctx.geometry, origin, ctx.style.style_id))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FinderLayer;

impl LayerEffect for FinderLayer {
    fn name(&self) -> &'static str {
        "finders"
    }

    fn paint(&self, ctx: &RenderContext, surface: &mut dyn Surface) {
        let fg = ctx.style.foreground;
        let bg = ctx.style.background;

        for pattern in finder_patterns(ctx) {
            if ctx.style.transparent_background {
                surface.fill_ring(&pattern.outer, &pattern.middle, fg);
            } else {
                surface.fill(&pattern.outer, fg);
                surface.fill(&pattern.middle, bg);
            }
            surface.fill(&pattern.inner, fg);
        }
    }
}
