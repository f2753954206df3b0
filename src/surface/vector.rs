//! SVG markup surface.
//!
//! Emits a self-contained document: modules and finders as `<rect>`,
//! `<circle>` and `<path>`, the logo as a base64 `<image>`, captions as
//! `<text>`. Coordinates are logical pixels with no snapping.

use std::fmt::Write as _;

use super::{Shape, Surface, TextRun};
use crate::geometry::Rect;
use crate::request::LogoImage;
use crate::style::Color;
use crate::text::{FONT_FAMILY, escape_xml};

/// Builds an SVG document in memory.
#[derive(Debug, Clone)]
pub struct VectorSurface {
    width: f32,
    height: f32,
    body: String,
    depth: usize,
}

impl VectorSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            depth: 0,
        }
    }

    /// Closes any open groups and returns the complete document.
    pub fn finish(mut self) -> String {
        while self.depth > 0 {
            self.end_group();
        }
        let (w, h) = (num(self.width), num(self.height));
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{}</svg>"#,
            self.body
        )
    }

    fn push(&mut self, element: &str) {
        self.body.push_str(element);
    }
}

impl Surface for VectorSurface {
    fn fill(&mut self, shape: &Shape, color: Color) {
        let paint = fill_attrs(color);
        let element = shape_element(shape, &paint);
        self.push(&element);
    }

    fn stroke(&mut self, shape: &Shape, width: f32, color: Color) {
        let mut paint = format!(r#"fill="none" stroke="{}" stroke-width="{}""#, color.to_hex(), num(width));
        if !color.is_opaque() {
            let _ = write!(paint, r#" stroke-opacity="{}""#, opacity(color));
        }
        let element = shape_element(shape, &paint);
        self.push(&element);
    }

    fn fill_ring(&mut self, outer: &Shape, hole: &Shape, color: Color) {
        let element = format!(
            r#"<path d="{}{}" fill-rule="evenodd" {}/>"#,
            path_data(outer),
            path_data(hole),
            fill_attrs(color)
        );
        self.push(&element);
    }

    fn draw_image(&mut self, image: &LogoImage, bounds: Rect) {
        let element = format!(
            r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" href="{}"/>"#,
            num(bounds.x),
            num(bounds.y),
            num(bounds.width),
            num(bounds.height),
            image.data_uri()
        );
        self.push(&element);
    }

    fn draw_text(&mut self, run: &TextRun) {
        let element = text_element(run);
        self.push(&element);
    }

    fn begin_group(&mut self, name: &str) {
        let element = format!(r#"<g id="{}">"#, escape_xml(name));
        self.push(&element);
        self.depth += 1;
    }

    fn end_group(&mut self) {
        if self.depth > 0 {
            self.push("</g>");
            self.depth -= 1;
        }
    }
}

// ============================================================================
// Markup helpers
// ============================================================================

/// A `<text>` element for one caption line.
pub(crate) fn text_element(run: &TextRun) -> String {
    let mut out = format!(
        r#"<text x="{}" y="{}" text-anchor="{}" font-family="{}" font-size="{}" font-weight="{}" {}"#,
        num(run.x),
        num(run.baseline),
        run.anchor.as_svg(),
        FONT_FAMILY,
        num(run.font.size),
        run.font.css_weight(),
        fill_attrs(run.color),
    );
    let _ = write!(out, r#" xml:space="preserve">{}</text>"#, escape_xml(&run.text));
    out
}

/// A transparent document holding a single text run, for raster text.
pub(crate) fn text_document(width: f32, height: f32, run: &TextRun) -> String {
    let (w, h) = (num(width), num(height));
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{}</svg>"#,
        text_element(run)
    )
}

fn fill_attrs(color: Color) -> String {
    if color.is_opaque() {
        format!(r#"fill="{}""#, color.to_hex())
    } else {
        format!(r#"fill="{}" fill-opacity="{}""#, color.to_hex(), opacity(color))
    }
}

fn opacity(color: Color) -> String {
    num(color.a as f32 / 255.0)
}

fn shape_element(shape: &Shape, paint: &str) -> String {
    match *shape {
        Shape::Rect(r) => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" {paint}/>"#,
            num(r.x),
            num(r.y),
            num(r.width),
            num(r.height)
        ),
        Shape::RoundedRect { rect: r, radius } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" {paint}/>"#,
            num(r.x),
            num(r.y),
            num(r.width),
            num(r.height),
            num(radius)
        ),
        Shape::Circle { cx, cy, radius } => format!(
            r#"<circle cx="{}" cy="{}" r="{}" {paint}/>"#,
            num(cx),
            num(cy),
            num(radius)
        ),
    }
}

/// Closed path data for a shape, used for even-odd rings.
fn path_data(shape: &Shape) -> String {
    match *shape {
        Shape::Rect(r) => format!(
            "M{} {}H{}V{}H{}Z",
            num(r.x),
            num(r.y),
            num(r.right()),
            num(r.bottom()),
            num(r.x)
        ),
        Shape::RoundedRect { rect: r, radius } => {
            let rad = num(radius);
            format!(
                "M{} {}H{}A{rad} {rad} 0 0 1 {} {}V{}A{rad} {rad} 0 0 1 {} {}H{}A{rad} {rad} 0 0 1 {} {}V{}A{rad} {rad} 0 0 1 {} {}Z",
                num(r.x + radius),
                num(r.y),
                num(r.right() - radius),
                num(r.right()),
                num(r.y + radius),
                num(r.bottom() - radius),
                num(r.right() - radius),
                num(r.bottom()),
                num(r.x + radius),
                num(r.x),
                num(r.bottom() - radius),
                num(r.y + radius),
                num(r.x + radius),
                num(r.y),
            )
        }
        Shape::Circle { cx, cy, radius } => {
            let rad = num(radius);
            format!(
                "M{} {}A{rad} {rad} 0 1 1 {} {}A{rad} {rad} 0 1 1 {} {}Z",
                num(cx - radius),
                num(cy),
                num(cx + radius),
                num(cy),
                num(cx - radius),
                num(cy),
            )
        }
    }
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
fn num(value: f32) -> String {
    let mut s = format!("{value:.3}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_owned();
    }
    s
}
