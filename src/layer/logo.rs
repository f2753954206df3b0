//! Centered logo with an optional safe-zone backing.

use super::{LayerEffect, RenderContext};
use crate::geometry::{LogoClip, Rect};
use crate::surface::{Shape, Surface};

/// Backing corner radius as a fraction of the clip size.
const BACKING_RADIUS: f32 = 0.15;

/// Where the logo and its backing go inside the clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    /// Rounded square covering the whole padded clip.
    pub backing: Option<Shape>,
    /// The image, fitted into the content square with its aspect preserved.
    pub image_bounds: Rect,
}

impl LogoPlacement {
    pub fn compute(clip: &LogoClip, safe_zone: bool, aspect_ratio: f32) -> Self {
        let backing = (safe_zone && clip.padding > 0.0)
            .then(|| Shape::rounded(clip.bounds(), clip.size * BACKING_RADIUS));

        Self {
            backing,
            image_bounds: fit_centered(clip.content_bounds(), aspect_ratio),
        }
    }
}

/// Largest rectangle of `aspect_ratio` centered in `bounds`.
fn fit_centered(bounds: Rect, aspect_ratio: f32) -> Rect {
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return bounds;
    }
    let (width, height) = if aspect_ratio >= bounds.width / bounds.height {
        (bounds.width, bounds.width / aspect_ratio)
    } else {
        (bounds.height * aspect_ratio, bounds.height)
    };
    Rect::new(
        bounds.x + (bounds.width - width) / 2.0,
        bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    )
}

/// Draws nothing while the logo image is unavailable; the module layer has
/// already left the clip region blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogoLayer;

impl LayerEffect for LogoLayer {
    fn name(&self) -> &'static str {
        "logo"
    }

    fn is_active(&self, ctx: &RenderContext) -> bool {
        ctx.logo_clip.is_some() && ctx.logo.as_ref().is_some_and(|logo| logo.image.is_some())
    }

    fn paint(&self, ctx: &RenderContext, surface: &mut dyn Surface) {
        let (Some(clip), Some(logo)) = (ctx.logo_clip.as_ref(), ctx.logo.as_ref()) else {
            return;
        };
        let Some(image) = logo.image.as_deref() else {
            return;
        };

        let placement = LogoPlacement::compute(clip, logo.safe_zone, image.aspect_ratio());
        if let Some(backing) = placement.backing {
            surface.fill(&backing, ctx.style.background.opaque());
        }
        surface.draw_image(image, placement.image_bounds);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::layer::LayerPipeline;
    use crate::layer::testing::{DrawOp, RecordingSurface, context};
    use crate::request::{LogoImage, LogoSpec, RenderRequest};
    use crate::style::{Color, StyleParameters};

    fn logo_image(width: u32, height: u32) -> Arc<LogoImage> {
        Arc::new(LogoImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba([200, 0, 0, 255]))).unwrap())
    }

    #[test]
    fn safe_zone_backing_spans_clip() {
        let clip = LogoClip {
            x: 125.0,
            y: 125.0,
            size: 80.0,
            content_size: 50.0,
            padding: 15.0,
        };
        let placement = LogoPlacement::compute(&clip, true, 1.0);
        assert_eq!(
            placement.backing,
            Some(Shape::RoundedRect {
                rect: Rect::square(125.0, 125.0, 80.0),
                radius: 12.0,
            })
        );
        assert_eq!(placement.image_bounds, Rect::square(140.0, 140.0, 50.0));
    }

    #[test]
    fn no_backing_without_padding() {
        let clip = LogoClip {
            x: 10.0,
            y: 10.0,
            size: 40.0,
            content_size: 40.0,
            padding: 0.0,
        };
        assert!(LogoPlacement::compute(&clip, true, 1.0).backing.is_none());
        assert!(LogoPlacement::compute(&clip, false, 1.0).backing.is_none());
    }

    #[test]
    fn wide_logo_is_letterboxed() {
        let fitted = fit_centered(Rect::square(0.0, 0.0, 40.0), 2.0);
        assert_eq!(fitted, Rect::new(0.0, 10.0, 40.0, 20.0));
        let tall = fit_centered(Rect::square(0.0, 0.0, 40.0), 0.5);
        assert_eq!(tall, Rect::new(10.0, 0.0, 20.0, 40.0));
    }

    #[test]
    fn pending_logo_draws_nothing() {
        let request = RenderRequest::new("hello", 300).with_logo(LogoSpec::new(20.0, true));
        let ctx = context(&request);
        assert!(ctx.logo_clip.is_some());
        let mut surface = RecordingSurface::default();
        LayerPipeline::default().paint(&ctx, &mut surface);
        assert!(!surface.group_names().contains(&"logo".to_owned()));
    }

    #[test]
    fn loaded_logo_draws_backing_then_image() {
        let style = StyleParameters::default()
            .with_colors(Color::BLACK, Color::rgb(240, 240, 200))
            .with_transparency(true);
        let request = RenderRequest::new("hello", 300)
            .with_style(style)
            .with_logo(LogoSpec::new(20.0, true).with_image(logo_image(4, 4)));
        let ctx = context(&request);
        let mut surface = RecordingSurface::default();
        LayerPipeline::default().paint(&ctx, &mut surface);

        let ops = surface.group("logo");
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::Fill(Shape::RoundedRect { .. }, c) if c == Color::rgb(240, 240, 200)));
        assert_eq!(ops[1], DrawOp::Image(ctx.logo_clip.unwrap().content_bounds()));
    }
}
