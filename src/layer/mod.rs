//! Layer pipeline for QR rendering.
//!
//! Every render derives a [`RenderContext`] once and paints it through a
//! fixed sequence of layers onto a [`Surface`]. Layers never draw pixels
//! directly; they produce shapes and text runs, so the canvas and vector
//! adapters receive exactly the same drawing calls.
//!
//! # Architecture
//!
//! ```text
//! RenderRequest
//!     │  prepare (matrix, geometry, logo clip, label layout)
//!     ▼
//! RenderContext
//!     │
//!     ▼
//! ┌────────────┐
//! │ Background │ ◄── skipped when transparent
//! ├────────────┤
//! │  Modules   │ ◄── finder corners and logo clip excluded
//! ├────────────┤
//! │  Finders   │ ◄── dedicated 7x7 geometry
//! ├────────────┤
//! │    Logo    │ ◄── safe-zone backing, then image
//! ├────────────┤
//! │  Caption   │ ◄── below the code
//! └────────────┘
//! ```

pub mod caption;
pub mod finder;
pub mod logo;
pub mod modules;

pub use caption::{CaptionLayer, CaptionLine, caption_lines};
pub use finder::{FinderLayer, FinderPattern, finder_patterns};
pub use logo::{LogoLayer, LogoPlacement};
pub use modules::{ModuleLayer, ModulePaint, Run, merge_runs, module_shapes};

use crate::error::Result;
use crate::geometry::{LogoClip, ModuleGeometry, Rect};
use crate::label::{LabelLayout, LabelSpec};
use crate::matrix::ModuleMatrix;
use crate::request::{LogoSpec, RenderRequest};
use crate::style::StyleParameters;
use crate::surface::{Shape, Surface};
use crate::text::TextMeasure;

// ============================================================================
// Render Context
// ============================================================================

/// Everything derived from a [`RenderRequest`] before drawing starts.
///
/// Computed once per request and shared read-only by every layer.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub matrix: ModuleMatrix,
    pub geometry: ModuleGeometry,
    pub style: StyleParameters,
    pub logo: Option<LogoSpec>,
    pub logo_clip: Option<LogoClip>,
    pub label: Option<LabelSpec>,
    pub label_layout: LabelLayout,
    /// Logical canvas width, equal to the requested size.
    pub width: f32,
    /// Logical canvas height: the code plus the caption band.
    pub height: f32,
}

impl RenderContext {
    /// Builds the matrix and derives geometry and layout for `request`.
    pub fn prepare(request: &RenderRequest, measure: &dyn TextMeasure) -> Result<Self> {
        let matrix = ModuleMatrix::build(&request.payload, request.has_logo())?;
        Ok(Self::from_matrix(matrix, request, measure))
    }

    /// Derives geometry and layout around an existing matrix.
    pub fn from_matrix(matrix: ModuleMatrix, request: &RenderRequest, measure: &dyn TextMeasure) -> Self {
        let size = request.size as f32;
        let geometry = ModuleGeometry::compute(matrix.size(), size);
        let logo_clip = LogoClip::compute(
            matrix.size(),
            geometry.module_size,
            request.logo.as_ref(),
            size,
        );
        let label = request.label().cloned();
        let label_layout = LabelLayout::compute(label.as_ref(), size, measure);
        let height = size + label_layout.height;

        Self {
            matrix,
            geometry,
            style: request.style,
            logo: request.logo.clone(),
            logo_clip,
            label,
            label_layout,
            width: size,
            height,
        }
    }

    /// The full logical canvas.
    pub fn canvas_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

// ============================================================================
// Layer Trait
// ============================================================================

/// A self-contained drawing step.
pub trait LayerEffect {
    /// Group name used in vector output.
    fn name(&self) -> &'static str;

    /// Whether this layer draws anything for `ctx`.
    fn is_active(&self, _ctx: &RenderContext) -> bool {
        true
    }

    fn paint(&self, ctx: &RenderContext, surface: &mut dyn Surface);
}

// ============================================================================
// Background
// ============================================================================

/// Opaque fill of the whole canvas, caption band included.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundLayer;

impl LayerEffect for BackgroundLayer {
    fn name(&self) -> &'static str {
        "background"
    }

    fn is_active(&self, ctx: &RenderContext) -> bool {
        !ctx.style.transparent_background
    }

    fn paint(&self, ctx: &RenderContext, surface: &mut dyn Surface) {
        surface.fill(&Shape::Rect(ctx.canvas_bounds()), ctx.style.background);
    }
}

// ============================================================================
// Layer Pipeline
// ============================================================================

/// The fixed drawing order shared by every surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerPipeline {
    pub background: BackgroundLayer,
    pub modules: ModuleLayer,
    pub finders: FinderLayer,
    pub logo: LogoLayer,
    pub caption: CaptionLayer,
}

impl LayerPipeline {
    /// Layers in paint order: the logo sits above the modules and the
    /// caption occupies its own band below both.
    pub fn layers(&self) -> [&dyn LayerEffect; 5] {
        [
            &self.background,
            &self.modules,
            &self.finders,
            &self.logo,
            &self.caption,
        ]
    }

    pub fn paint(&self, ctx: &RenderContext, surface: &mut dyn Surface) {
        for layer in self.layers() {
            if !layer.is_active(ctx) {
                continue;
            }
            surface.begin_group(layer.name());
            layer.paint(ctx, surface);
            surface.end_group();
        }
    }
}

// ============================================================================
// Test support
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::matrix::EcStrength;
    use crate::request::LogoImage;
    use crate::style::Color;
    use crate::surface::TextRun;
    use crate::text::HeuristicMeasure;

    /// A drawing call captured by [`RecordingSurface`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Fill(Shape, Color),
        Stroke(Shape, f32, Color),
        Ring(Shape, Shape, Color),
        Image(Rect),
        Text(TextRun),
        Group(String),
        EndGroup,
    }

    /// Records drawing calls instead of producing output.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<DrawOp>,
        pub snap_ratio: Option<f32>,
    }

    impl RecordingSurface {
        pub fn snapping(ratio: f32) -> Self {
            Self {
                ops: Vec::new(),
                snap_ratio: Some(ratio),
            }
        }

        /// Operations inside the named group.
        pub fn group(&self, name: &str) -> Vec<DrawOp> {
            let Some(start) = self
                .ops
                .iter()
                .position(|op| *op == DrawOp::Group(name.to_owned()))
            else {
                return Vec::new();
            };
            self.ops[start + 1..]
                .iter()
                .take_while(|op| **op != DrawOp::EndGroup)
                .cloned()
                .collect()
        }

        pub fn group_names(&self) -> Vec<String> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Group(name) => Some(name.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn pixel_ratio(&self) -> f32 {
            self.snap_ratio.unwrap_or(1.0)
        }

        fn snaps_to_pixels(&self) -> bool {
            self.snap_ratio.is_some()
        }

        fn fill(&mut self, shape: &Shape, color: Color) {
            self.ops.push(DrawOp::Fill(*shape, color));
        }

        fn stroke(&mut self, shape: &Shape, width: f32, color: Color) {
            self.ops.push(DrawOp::Stroke(*shape, width, color));
        }

        fn fill_ring(&mut self, outer: &Shape, hole: &Shape, color: Color) {
            self.ops.push(DrawOp::Ring(*outer, *hole, color));
        }

        fn draw_image(&mut self, _image: &LogoImage, bounds: Rect) {
            self.ops.push(DrawOp::Image(bounds));
        }

        fn draw_text(&mut self, run: &TextRun) {
            self.ops.push(DrawOp::Text(run.clone()));
        }

        fn begin_group(&mut self, name: &str) {
            self.ops.push(DrawOp::Group(name.to_owned()));
        }

        fn end_group(&mut self) {
            self.ops.push(DrawOp::EndGroup);
        }
    }

    pub fn context(request: &RenderRequest) -> RenderContext {
        RenderContext::prepare(request, &HeuristicMeasure).unwrap()
    }

    /// A context around a hand-made matrix of `size` with the given dark cells.
    pub fn context_with_cells(size: usize, dark: &[(usize, usize)], request: &RenderRequest) -> RenderContext {
        let mut rows = vec![vec![false; size]; size];
        for &(x, y) in dark {
            rows[y][x] = true;
        }
        let matrix = ModuleMatrix::from_rows(rows, EcStrength::Quartile).unwrap();
        RenderContext::from_matrix(matrix, request, &HeuristicMeasure)
    }
}
