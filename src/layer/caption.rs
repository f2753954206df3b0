//! Caption lines under the code, optionally on inverted bars.

use super::{LayerEffect, RenderContext};
use crate::geometry::Rect;
use crate::label::{LABEL_PADDING, LabelAlign};
use crate::surface::{Shape, Surface, TextAnchor, TextRun};

/// Maximum horizontal padding of an inverted bar around its text.
const BAR_MAX_PAD_X: f32 = 16.0;

/// One positioned caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub run: TextRun,
    /// Backing bar in the foreground color, present when inverted.
    pub bar: Option<Shape>,
}

/// Positions every wrapped caption line.
///
/// The band starts half a quiet zone above the bottom of the code square so
/// the caption sits right under the matrix.
pub fn caption_lines(ctx: &RenderContext) -> Vec<CaptionLine> {
    let layout = &ctx.label_layout;
    let Some(label) = ctx.label.as_ref() else {
        return Vec::new();
    };

    let fs = layout.font.size;
    let lh = layout.line_height;
    let leading = lh - fs;
    let band_top = ctx.geometry.pixel_size - ctx.geometry.offset / 2.0;

    let (anchor, x) = match label.align {
        LabelAlign::Left => (TextAnchor::Start, LABEL_PADDING),
        LabelAlign::Center => (TextAnchor::Middle, ctx.width / 2.0),
        LabelAlign::Right => (TextAnchor::End, ctx.width - LABEL_PADDING),
    };
    let text_color = if label.invert {
        ctx.style.background
    } else {
        ctx.style.foreground
    };

    layout
        .lines
        .iter()
        .zip(&layout.line_widths)
        .enumerate()
        .map(|(i, (line, &width))| {
            let top = band_top + i as f32 * lh;
            let run = TextRun {
                text: line.clone(),
                x,
                baseline: top + leading / 2.0 + fs * 0.8,
                anchor,
                font: layout.font,
                color: text_color,
            };

            let bar = label.invert.then(|| {
                let pad_x = (fs * 0.4).min(BAR_MAX_PAD_X);
                let bar_width = width + 2.0 * pad_x;
                let bar_height = fs + leading * 0.8;
                let bar_x = match anchor {
                    TextAnchor::Start => x - pad_x,
                    TextAnchor::Middle => x - bar_width / 2.0,
                    TextAnchor::End => x - width - pad_x,
                };
                let rect = Rect::new(bar_x, top + leading * 0.1, bar_width, bar_height);
                Shape::rounded(rect, bar_height * 0.4)
            });

            CaptionLine { run, bar }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionLayer;

impl LayerEffect for CaptionLayer {
    fn name(&self) -> &'static str {
        "caption"
    }

    fn is_active(&self, ctx: &RenderContext) -> bool {
        !ctx.label_layout.is_empty()
    }

    fn paint(&self, ctx: &RenderContext, surface: &mut dyn Surface) {
        for line in caption_lines(ctx) {
            if let Some(bar) = &line.bar {
                surface.fill(bar, ctx.style.foreground);
            }
            surface.draw_text(&line.run);
        }
    }
}
