//! Caption layout: greedy word wrapping into at most three lines.
//!
//! Font size is proportional to the render width, so captions keep their
//! proportions between a small preview and a large export.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::text::{FontSpec, TextMeasure};

/// Maximum number of caption lines. Words past the last line are dropped.
pub const MAX_LINES: usize = 3;

/// Horizontal padding on each side of the caption.
pub const LABEL_PADDING: f32 = 16.0;

/// Minimum gap between consecutive lines.
const MIN_LINE_GAP: f32 = 8.0;

/// Caption size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum LabelSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl LabelSize {
    /// Font size as a fraction of the target width.
    pub fn width_fraction(self) -> f32 {
        match self {
            Self::Sm => 0.045,
            Self::Md => 0.055,
            Self::Lg => 0.07,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum LabelWeight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum LabelAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A caption printed below the code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct LabelSpec {
    pub text: String,
    #[serde(default)]
    pub size: LabelSize,
    #[serde(default)]
    pub weight: LabelWeight,
    #[serde(default)]
    pub align: LabelAlign,
    /// Draw light text on foreground-colored bars.
    #[serde(default)]
    pub invert: bool,
}

impl LabelSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: LabelSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_weight(mut self, weight: LabelWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_align(mut self, align: LabelAlign) -> Self {
        self.align = align;
        self
    }

    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Whitespace-only captions count as no caption.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Font for this caption at a render width.
    pub fn font(&self, target_width: f32) -> FontSpec {
        FontSpec {
            size: self.size.width_fraction() * target_width,
            bold: self.weight == LabelWeight::Bold,
        }
    }
}

/// Wrapped caption lines and the vertical space they need.
///
/// `lines.is_empty()` exactly when `height == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub lines: Vec<String>,
    pub line_widths: Vec<f32>,
    pub height: f32,
    pub line_height: f32,
    pub font: FontSpec,
}

impl LabelLayout {
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            line_widths: Vec::new(),
            height: 0.0,
            line_height: 0.0,
            font: FontSpec {
                size: 0.0,
                bold: false,
            },
        }
    }

    /// Wraps the caption to `target_width`. Missing and blank captions
    /// produce an empty layout.
    pub fn compute(label: Option<&LabelSpec>, target_width: f32, measure: &dyn TextMeasure) -> Self {
        let Some(label) = label.filter(|l| !l.is_blank()) else {
            return Self::empty();
        };

        let font = label.font(target_width);
        let max_width = target_width - 2.0 * LABEL_PADDING;
        let lines = wrap_words(&label.text, max_width, &font, measure);
        if lines.is_empty() {
            return Self::empty();
        }

        let line_widths = lines.iter().map(|line| measure.width(line, &font)).collect();
        let line_height = line_height(font.size);
        let height = lines.len() as f32 * line_height + font.size * 0.5;

        Self {
            lines,
            line_widths,
            height,
            line_height,
            font,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// `font_size` plus a gap of at least eight pixels.
pub fn line_height(font_size: f32) -> f32 {
    font_size + MIN_LINE_GAP.max(font_size * 0.12)
}

/// Greedy word wrap. A word wider than `max_width` still gets its own line.
fn wrap_words(text: &str, max_width: f32, font: &FontSpec, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if measure.width(&candidate, font) <= max_width {
            current = candidate;
            continue;
        }

        lines.push(mem::take(&mut current));
        if lines.len() == MAX_LINES {
            return lines;
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::HeuristicMeasure;

    fn layout(text: &str, size: LabelSize, width: f32) -> LabelLayout {
        LabelLayout::compute(Some(&LabelSpec::new(text).with_size(size)), width, &HeuristicMeasure)
    }

    #[test]
    fn short_caption_fits_one_line() {
        let l = layout("Scan me", LabelSize::Sm, 360.0);
        assert_eq!(l.lines, vec!["Scan me".to_string()]);
        assert!(l.line_widths[0] <= 360.0 - 32.0);
        assert!(l.height > 0.0);
    }

    #[test]
    fn blank_captions_are_empty_for_every_variant() {
        for text in ["", "   ", "\n\t "] {
            for size in [LabelSize::Sm, LabelSize::Md, LabelSize::Lg] {
                for weight in [LabelWeight::Regular, LabelWeight::Bold] {
                    for align in [LabelAlign::Left, LabelAlign::Center, LabelAlign::Right] {
                        let spec = LabelSpec::new(text)
                            .with_size(size)
                            .with_weight(weight)
                            .with_align(align);
                        let l = LabelLayout::compute(Some(&spec), 360.0, &HeuristicMeasure);
                        assert!(l.lines.is_empty());
                        assert_eq!(l.height, 0.0);
                    }
                }
            }
        }
        assert_eq!(LabelLayout::compute(None, 360.0, &HeuristicMeasure), LabelLayout::empty());
    }

    #[test]
    fn wraps_greedily_within_width() {
        let text = "the quick brown fox jumps over the lazy dog";
        let l = layout(text, LabelSize::Lg, 300.0);
        assert!(l.lines.len() > 1);
        let max = 300.0 - 2.0 * LABEL_PADDING;
        for (line, width) in l.lines.iter().zip(&l.line_widths) {
            if line.contains(' ') {
                assert!(*width <= max, "{line} is {width}px wide");
            }
        }
        assert_eq!(l.lines.join(" "), text);
    }

    #[test]
    fn caps_at_three_lines_and_drops_the_rest() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let l = layout(text, LabelSize::Lg, 100.0);
        assert_eq!(l.lines.len(), MAX_LINES);
        assert!(!l.lines.join(" ").contains("twelve"));
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let l = layout("a supercalifragilisticexpialidocious b", LabelSize::Lg, 100.0);
        assert_eq!(l.lines, vec!["a", "supercalifragilisticexpialidocious", "b"]);
    }

    #[test]
    fn font_scales_with_resolution() {
        let preview = layout("Scan me", LabelSize::Md, 300.0);
        let export = layout("Scan me", LabelSize::Md, 1200.0);
        assert_eq!(preview.lines, export.lines);
        assert!((export.font.size - preview.font.size * 4.0).abs() < 1e-3);
        assert!(export.line_height > preview.line_height);
    }

    #[test]
    fn line_height_has_minimum_gap() {
        assert_eq!(line_height(10.0), 18.0);
        assert_eq!(line_height(100.0), 112.0);
    }

    #[test]
    fn bold_weight_sets_font() {
        let spec = LabelSpec::new("x").with_weight(LabelWeight::Bold).with_size(LabelSize::Md);
        let font = spec.font(200.0);
        assert!(font.bold);
        assert!((font.size - 11.0).abs() < 1e-4);
    }
}
