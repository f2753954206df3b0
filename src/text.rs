//! Text measurement and raster text drawing.
//!
//! Label text is laid out as SVG `<text>` and handed to usvg, so the raster
//! canvas draws glyphs from exactly the markup the vector adapter emits.
//! When no font resolves, widths fall back to a per-glyph heuristic.

use std::sync::Arc;

use resvg::tiny_skia::{PixmapMut, Transform};
use resvg::usvg::{Options, Tree, fontdb};

/// Average glyph width as a fraction of the font size.
const HEURISTIC_GLYPH_WIDTH: f32 = 0.45;

/// Font family requested for every caption.
pub const FONT_FAMILY: &str = "sans-serif";

/// Font parameters for one caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn css_weight(&self) -> u16 {
        if self.bold { 700 } else { 400 }
    }
}

/// Measures the advance width of a single line of text.
pub trait TextMeasure {
    /// Returns `None` when the text cannot be measured.
    fn measure(&self, text: &str, font: &FontSpec) -> Option<f32>;

    /// Measured width, or the heuristic estimate when measurement fails.
    fn width(&self, text: &str, font: &FontSpec) -> f32 {
        self.measure(text, font)
            .unwrap_or_else(|| heuristic_width(text, font.size))
    }
}

/// Estimated width assuming every glyph is `0.45 * font_size` wide.
pub fn heuristic_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * HEURISTIC_GLYPH_WIDTH * font_size
}

/// Measurement that always uses the glyph-width heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasure;

impl TextMeasure for HeuristicMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> Option<f32> {
        Some(heuristic_width(text, font.size))
    }
}

// ============================================================================
// TextEngine
// ============================================================================

/// Public domain sans-serif face shipped with the crate.
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/Tuffy.ttf");

/// Font-backed text measurement and rendering.
///
/// Loading system fonts is slow; build one engine and share it between
/// renders.
pub struct TextEngine {
    options: Options<'static>,
}

impl TextEngine {
    /// An engine with only the bundled font. Output does not depend on the
    /// host.
    pub fn bundled() -> Self {
        let mut db = fontdb::Database::new();
        load_bundled(&mut db);
        Self::from_database(db)
    }

    /// An engine with every font installed on the host, plus the bundled
    /// font as a fallback.
    pub fn with_system_fonts() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        load_bundled(&mut db);
        Self::from_database(db)
    }

    /// An engine using only the given font file data.
    pub fn with_font_data(data: Vec<u8>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_font_data(data);
        if db.is_empty() {
            tracing::warn!("font data contained no usable faces");
        }
        Self::from_database(db)
    }

    /// An engine with no fonts at all. Widths are heuristic and no glyphs
    /// are ever drawn.
    #[cfg(test)]
    pub(crate) fn without_fonts() -> Self {
        Self::from_database(fontdb::Database::new())
    }

    fn from_database(mut db: fontdb::Database) -> Self {
        resolve_generic_families(&mut db);
        let mut options = Options::default();
        options.fontdb = Arc::new(db);
        options.font_family = FONT_FAMILY.to_owned();
        Self { options }
    }

    pub fn has_fonts(&self) -> bool {
        !self.options.fontdb.is_empty()
    }

    /// Renders an SVG document onto `target`, blending over existing pixels.
    ///
    /// Returns `false` if the markup could not be parsed.
    pub fn render_svg_onto(&self, svg: &str, target: &mut PixmapMut<'_>, transform: Transform) -> bool {
        match Tree::from_str(svg, &self.options) {
            Ok(tree) => {
                resvg::render(&tree, transform, target);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "failed to parse text markup");
                false
            }
        }
    }
}

/// Family name of [`BUNDLED_FONT`].
const BUNDLED_FAMILY: &str = "Tuffy";

fn load_bundled(db: &mut fontdb::Database) {
    db.load_font_source(fontdb::Source::Binary(Arc::new(BUNDLED_FONT)));
}

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(family, _)| family == name))
}

/// Points the generic `sans-serif` and `serif` families at a loaded face
/// when the defaults ("Arial", "Times New Roman") are not installed.
fn resolve_generic_families(db: &mut fontdb::Database) {
    let fallback = if has_family(db, BUNDLED_FAMILY) {
        Some(BUNDLED_FAMILY.to_owned())
    } else {
        db.faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
    };
    let Some(fallback) = fallback else {
        return;
    };

    let sans_missing = !has_family(db, db.family_name(&fontdb::Family::SansSerif));
    let serif_missing = !has_family(db, db.family_name(&fontdb::Family::Serif));
    if sans_missing {
        db.set_sans_serif_family(fallback.clone());
    }
    if serif_missing {
        db.set_serif_family(fallback);
    }
}

impl TextMeasure for TextEngine {
    fn measure(&self, text: &str, font: &FontSpec) -> Option<f32> {
        if !self.has_fonts() || text.is_empty() {
            return None;
        }

        let estimate = heuristic_width(text, font.size).max(1.0);
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><text x="0" y="{y}" font-family="{family}" font-size="{size}" font-weight="{weight}" xml:space="preserve">{text}</text></svg>"#,
            w = estimate * 4.0,
            h = font.size * 2.0,
            y = font.size * 1.5,
            family = FONT_FAMILY,
            size = font.size,
            weight = font.css_weight(),
            text = escape_xml(text),
        );

        let tree = Tree::from_str(&svg, &self.options).ok()?;
        if !tree.root().has_children() {
            return None;
        }
        Some(tree.root().bounding_box().width())
    }
}

/// Escapes text for use in XML content and attribute values.
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
