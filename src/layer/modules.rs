//! Per-module shapes, the styling core.
//!
//! Every dark module outside the finder corners and the logo clip becomes
//! one shape, except for the pills style, which merges horizontal runs into
//! a single bar per run.

use super::{LayerEffect, RenderContext};
use crate::geometry::{LogoClip, ModuleGeometry, Rect, is_finder_module};
use crate::style::StyleId;
use crate::surface::{Shape, Surface};

/// Corner radius of a rounded module, as a fraction of its drawn size.
const ROUNDED_CORNER: f32 = 0.35;

/// Outline stroke width, as a fraction of the drawn size.
const OUTLINE_STROKE: f32 = 0.3;

/// How a module shape is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModulePaint {
    Fill(Shape),
    Stroke { shape: Shape, width: f32 },
}

impl ModulePaint {
    pub fn shape(&self) -> &Shape {
        match self {
            Self::Fill(shape) | Self::Stroke { shape, .. } => shape,
        }
    }

    fn snapped(self, pixel_ratio: f32) -> Self {
        match self {
            Self::Fill(shape) => Self::Fill(shape.snapped(pixel_ratio)),
            Self::Stroke { shape, width } => Self::Stroke {
                shape: shape.snapped(pixel_ratio),
                width,
            },
        }
    }
}

// ============================================================================
// Run merging
// ============================================================================

/// A horizontal run of consecutive drawable modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy)]
enum RunState {
    NoRun,
    InRun { start: usize },
}

/// Folds a row of drawable flags into maximal runs.
pub fn merge_runs(cells: impl IntoIterator<Item = bool>) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut state = RunState::NoRun;
    let mut end = 0;

    for (x, drawable) in cells.into_iter().enumerate() {
        end = x + 1;
        state = match (state, drawable) {
            (RunState::NoRun, true) => RunState::InRun { start: x },
            (RunState::NoRun, false) => RunState::NoRun,
            (RunState::InRun { start }, true) => RunState::InRun { start },
            (RunState::InRun { start }, false) => {
                runs.push(Run { start, len: x - start });
                RunState::NoRun
            }
        };
    }

    if let RunState::InRun { start } = state {
        runs.push(Run { start, len: end - start });
    }
    runs
}

// ============================================================================
// Shapes
// ============================================================================

/// True when the module's pixel square overlaps the padded logo clip.
pub fn is_clipped(geometry: &ModuleGeometry, clip: Option<&LogoClip>, x: usize, y: usize) -> bool {
    clip.is_some_and(|clip| geometry.module_rect(x, y).intersects(&clip.bounds()))
}

fn is_drawable(ctx: &RenderContext, x: usize, y: usize) -> bool {
    let size = ctx.matrix.size();
    ctx.matrix.is_dark(x, y)
        && !is_finder_module(x, y, size)
        && !is_clipped(&ctx.geometry, ctx.logo_clip.as_ref(), x, y)
}

/// Shapes for every drawable module, in row-major order.
///
/// With `snap` set, rectangle edges are rounded to device pixels at that
/// pixel ratio.
pub fn module_shapes(ctx: &RenderContext, snap: Option<f32>) -> Vec<ModulePaint> {
    let style = ctx.style.style_id;
    let size = ctx.matrix.size();
    let mut shapes = Vec::new();

    for y in 0..size {
        if style == StyleId::Pills {
            let row = (0..size).map(|x| is_drawable(ctx, x, y));
            shapes.extend(
                merge_runs(row)
                    .into_iter()
                    .map(|run| ModulePaint::Fill(pill_shape(&ctx.geometry, run, y))),
            );
            continue;
        }

        for x in 0..size {
            if is_drawable(ctx, x, y) {
                shapes.push(module_shape(style, ctx.geometry.module_rect(x, y)));
            }
        }
    }

    match snap {
        Some(ratio) => shapes.into_iter().map(|s| s.snapped(ratio)).collect(),
        None => shapes,
    }
}

fn module_shape(style: StyleId, cell: Rect) -> ModulePaint {
    let drawn = cell.scaled_about_center(style.shape_scale());
    match style {
        StyleId::Classic | StyleId::Pills => ModulePaint::Fill(Shape::Rect(drawn)),
        StyleId::Rounded => ModulePaint::Fill(Shape::rounded(drawn, drawn.width * ROUNDED_CORNER)),
        StyleId::Dots => ModulePaint::Fill(Shape::circle_in(drawn)),
        StyleId::Outline => ModulePaint::Stroke {
            shape: Shape::Rect(drawn),
            width: (drawn.width * OUTLINE_STROKE).max(1.0),
        },
    }
}

/// One bar spanning `run`, inset like a single pill module on every side.
fn pill_shape(geometry: &ModuleGeometry, run: Run, y: usize) -> Shape {
    let first = geometry.module_rect(run.start, y);
    let last = geometry.module_rect(run.start + run.len - 1, y);
    let inset = geometry.module_size * (1.0 - StyleId::Pills.shape_scale()) / 2.0;
    let bar = Rect::new(
        first.x + inset,
        first.y + inset,
        last.right() - first.x - 2.0 * inset,
        first.height - 2.0 * inset,
    );
    Shape::rounded(bar, bar.height / 2.0)
}

// ============================================================================
// ModuleLayer
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleLayer;

impl LayerEffect for ModuleLayer {
    fn name(&self) -> &'static str {
        "modules"
    }

    fn paint(&self, ctx: &RenderContext, surface: &mut dyn Surface) {
        let snap = surface
            .snaps_to_pixels()
            .then(|| surface.pixel_ratio());
        let color = ctx.style.foreground;

        for paint in module_shapes(ctx, snap) {
            match paint {
                ModulePaint::Fill(shape) => surface.fill(&shape, color),
                ModulePaint::Stroke { shape, width } => surface.stroke(&shape, width, color),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FINDER_SIZE;
    use crate::layer::testing::{context, context_with_cells};
    use crate::request::{LogoSpec, RenderRequest};
    use crate::style::StyleParameters;

    fn request(style: StyleId) -> RenderRequest {
        RenderRequest::new("https://example.com", 330).with_style(StyleParameters::new(style))
    }

    fn finder_areas(ctx: &RenderContext) -> Vec<Rect> {
        let side = ctx.geometry.module_size * FINDER_SIZE as f32;
        ctx.geometry
            .finder_origins()
            .iter()
            .map(|&(x, y)| {
                let origin = ctx.geometry.module_rect(x, y);
                Rect::square(origin.x, origin.y, side)
            })
            .collect()
    }

    #[test]
    fn run_merging_state_machine() {
        assert_eq!(merge_runs(Vec::new()), vec![]);
        assert_eq!(merge_runs([false, false]), vec![]);
        assert_eq!(merge_runs([true, true, true]), vec![Run { start: 0, len: 3 }]);
        assert_eq!(
            merge_runs([true, true, false, true, false, false, true]),
            vec![
                Run { start: 0, len: 2 },
                Run { start: 3, len: 1 },
                Run { start: 6, len: 1 },
            ]
        );
    }

    #[test]
    fn finder_corners_never_get_module_shapes() {
        for style in StyleId::ALL {
            let ctx = context(&request(style));
            let areas = finder_areas(&ctx);
            let shapes = module_shapes(&ctx, None);
            assert!(!shapes.is_empty());
            for paint in &shapes {
                let bounds = paint.shape().bounds();
                assert!(
                    areas.iter().all(|area| !area.intersects(&bounds)),
                    "{style} drew {bounds:?} inside a finder"
                );
            }
        }
    }

    #[test]
    fn classic_draws_one_square_per_dark_module() {
        let ctx = context(&request(StyleId::Classic));
        let size = ctx.matrix.size();
        let expected = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .filter(|&(x, y)| ctx.matrix.is_dark(x, y) && !is_finder_module(x, y, size))
            .count();
        let shapes = module_shapes(&ctx, None);
        assert_eq!(shapes.len(), expected);
        assert!(shapes.iter().all(|p| matches!(p, ModulePaint::Fill(Shape::Rect(_)))));
    }

    #[test]
    fn pills_merge_a_run_into_one_bar() {
        let dark: Vec<_> = (8..13).map(|x| (x, 10)).collect();
        let ctx = context_with_cells(21, &dark, &request(StyleId::Pills));
        let shapes = module_shapes(&ctx, None);
        assert_eq!(shapes.len(), 1);

        let ms = ctx.geometry.module_size;
        let ModulePaint::Fill(Shape::RoundedRect { rect, radius }) = shapes[0] else {
            panic!("expected a rounded bar, got {:?}", shapes[0]);
        };
        let inset = ms * (1.0 - 0.72) / 2.0;
        assert!((rect.x - (ctx.geometry.module_rect(8, 10).x + inset)).abs() < 1e-3);
        assert!((rect.width - (5.0 * ms - 2.0 * inset)).abs() < 1e-3);
        assert!((radius - rect.height / 2.0).abs() < 1e-4);
    }

    #[test]
    fn pills_runs_break_at_gaps_and_finders() {
        // Row 3 crosses both top finders; cells 0..7 and 14..21 are finder modules.
        let dark: Vec<_> = (0..21).filter(|&x| x != 10).map(|x| (x, 3)).collect();
        let ctx = context_with_cells(21, &dark, &request(StyleId::Pills));
        let shapes = module_shapes(&ctx, None);
        // 7..10 and 11..14
        assert_eq!(shapes.len(), 2);
    }

    #[test]
    fn other_styles_draw_per_module() {
        let dark: Vec<_> = (8..13).map(|x| (x, 10)).collect();
        for style in [StyleId::Classic, StyleId::Rounded, StyleId::Dots, StyleId::Outline] {
            let ctx = context_with_cells(21, &dark, &request(style));
            assert_eq!(module_shapes(&ctx, None).len(), 5, "{style}");
        }
    }

    #[test]
    fn style_shapes() {
        let cell = Rect::square(0.0, 0.0, 10.0);
        assert_eq!(module_shape(StyleId::Classic, cell), ModulePaint::Fill(Shape::Rect(cell)));
        let ModulePaint::Fill(Shape::Circle { cx, cy, radius }) = module_shape(StyleId::Dots, cell) else {
            panic!("dots style must produce a circle");
        };
        assert!((cx - 5.0).abs() < 1e-4 && (cy - 5.0).abs() < 1e-4);
        assert!((radius - 2.9).abs() < 1e-4);
        let ModulePaint::Fill(Shape::RoundedRect { rect, radius }) = module_shape(StyleId::Rounded, cell) else {
            panic!("rounded style must produce a rounded rect");
        };
        assert!((rect.width - 7.8).abs() < 1e-4);
        assert!((radius - 7.8 * 0.35).abs() < 1e-4);
        let ModulePaint::Stroke { shape, width } = module_shape(StyleId::Outline, cell) else {
            panic!("outline style must stroke");
        };
        assert!((shape.bounds().width - 6.0).abs() < 1e-4);
        assert!((width - 1.8).abs() < 1e-4);

        let tiny = module_shape(StyleId::Outline, Rect::square(0.0, 0.0, 2.0));
        assert!(matches!(tiny, ModulePaint::Stroke { width, .. } if width == 1.0));
    }

    #[test]
    fn logo_clip_removes_overlapping_modules() {
        let logo = LogoSpec::new(25.0, true);
        let req = request(StyleId::Classic).with_logo(logo);
        let ctx = context(&req);
        let clip = ctx.logo_clip.unwrap().bounds();
        let shapes = module_shapes(&ctx, None);
        assert!(shapes.iter().all(|p| !p.shape().bounds().intersects(&clip)));

        let clipped = (0..ctx.matrix.size())
            .flat_map(|y| (0..ctx.matrix.size()).map(move |x| (x, y)))
            .filter(|&(x, y)| is_clipped(&ctx.geometry, ctx.logo_clip.as_ref(), x, y))
            .count();
        assert!(clipped > 0);
    }

    #[test]
    fn snapped_shapes_land_on_pixels() {
        let ctx = context(&request(StyleId::Classic));
        for paint in module_shapes(&ctx, Some(2.0)) {
            let rect = paint.shape().bounds();
            assert_eq!(rect.x * 2.0, (rect.x * 2.0).round());
            assert_eq!(rect.right() * 2.0, (rect.right() * 2.0).round());
        }
    }
}
