//! Visual style: module shapes and palette.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Color
// ============================================================================

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let rgb: Srgb<u8> = Srgb::from_str(hex.trim()).ok()?;
        Some(Self::rgb(rgb.red, rgb.green, rgb.blue))
    }

    /// `#rrggbb`, dropping alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// The same color with full opacity.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {hex}")))
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for Color {
    fn schema_name() -> String {
        "Color".to_owned()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <String as schemars::JsonSchema>::json_schema(generator)
    }
}

// ============================================================================
// StyleId
// ============================================================================

/// Module shape variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum StyleId {
    /// Full square modules.
    #[default]
    Classic,
    /// Inset squares with rounded corners.
    Rounded,
    /// Circles.
    Dots,
    /// Horizontal runs merged into pill-shaped bars.
    Pills,
    /// Stroke-only inset squares.
    Outline,
}

impl StyleId {
    pub const ALL: [StyleId; 5] = [
        Self::Classic,
        Self::Rounded,
        Self::Dots,
        Self::Pills,
        Self::Outline,
    ];

    /// Fraction of a module's side occupied by the drawn shape.
    pub fn shape_scale(self) -> f32 {
        match self {
            Self::Classic => 1.0,
            Self::Rounded => 0.78,
            Self::Dots => 0.58,
            Self::Pills => 0.72,
            Self::Outline => 0.6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Rounded => "rounded",
            Self::Dots => "dots",
            Self::Pills => "pills",
            Self::Outline => "outline",
        }
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown style: {s}"))
    }
}

// ============================================================================
// StyleParameters
// ============================================================================

/// Shape style and palette for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct StyleParameters {
    pub style_id: StyleId,
    pub foreground: Color,
    pub background: Color,
    #[serde(default)]
    pub transparent_background: bool,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            style_id: StyleId::Classic,
            foreground: Color::BLACK,
            background: Color::WHITE,
            transparent_background: false,
        }
    }
}

impl StyleParameters {
    pub fn new(style_id: StyleId) -> Self {
        Self {
            style_id,
            ..Self::default()
        }
    }

    pub fn with_colors(mut self, foreground: Color, background: Color) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent_background = transparent;
        self
    }
}
