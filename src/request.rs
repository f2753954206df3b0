//! Render request: the single argument threaded through every component.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};
use crate::label::LabelSpec;
use crate::raster::render_svg;
use crate::style::StyleParameters;

/// Allowed logo size range, as a percentage of the matrix extent.
pub const LOGO_PERCENT_RANGE: (f32, f32) = (10.0, 40.0);

/// Raster resolution used when an SVG logo is drawn onto a pixel surface.
const SVG_LOGO_RASTER_SIZE: u32 = 512;

// ============================================================================
// LogoImage
// ============================================================================

/// A decoded logo, shared read-only between renders.
///
/// Keeps the decoded pixels for raster surfaces and the original encoded
/// bytes for embedding into vector output.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoImage {
    pixels: RgbaImage,
    mime_type: &'static str,
    encoded: Vec<u8>,
}

impl LogoImage {
    /// Decodes SVG or any raster format `image` understands.
    ///
    /// PNG, JPEG, GIF and WEBP keep their original bytes for embedding;
    /// other raster formats are re-encoded as PNG.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if looks_like_svg(bytes) {
            let svg = std::str::from_utf8(bytes).map_err(|e| Error::LogoDecode(e.to_string()))?;
            let pixels = render_svg(svg, SVG_LOGO_RASTER_SIZE)
                .ok_or_else(|| Error::LogoDecode("unreadable SVG".to_owned()))?;
            return Ok(Self {
                pixels,
                mime_type: "image/svg+xml",
                encoded: bytes.to_vec(),
            });
        }

        let format = image::guess_format(bytes).map_err(|e| Error::LogoDecode(e.to_string()))?;
        let pixels = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| Error::LogoDecode(e.to_string()))?
            .to_rgba8();
        tracing::debug!(?format, width = pixels.width(), height = pixels.height(), "decoded logo");

        match embeddable_mime(format) {
            Some(mime_type) => Ok(Self {
                pixels,
                mime_type,
                encoded: bytes.to_vec(),
            }),
            None => Self::from_rgba(pixels),
        }
    }

    /// Wraps already-decoded pixels, re-encoding them as PNG for embedding.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        let mut encoded = Cursor::new(Vec::new());
        pixels
            .write_to(&mut encoded, ImageFormat::Png)
            .map_err(|e| Error::BlobEncode {
                format: "png",
                reason: e.to_string(),
            })?;
        Ok(Self {
            pixels,
            mime_type: "image/png",
            encoded: encoded.into_inner(),
        })
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// `width / height` of the decoded image.
    pub fn aspect_ratio(&self) -> f32 {
        self.pixels.width() as f32 / self.pixels.height().max(1) as f32
    }

    /// Base64 data URI of the original bytes.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.encoded))
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    head.starts_with("<svg") || head.starts_with("<?xml")
}

/// MIME type for formats browsers display inside an SVG `<image>`.
fn embeddable_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

// ============================================================================
// LogoSpec
// ============================================================================

/// A centered logo overlay.
///
/// `image` is `None` while the logo is still loading or after it failed to
/// decode; the clip region is reserved either way.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoSpec {
    pub image: Option<Arc<LogoImage>>,
    /// Percentage of the matrix extent, clamped to 10..=40. Zero or less
    /// means no clip is reserved.
    pub size_percent: f32,
    /// Draw a solid backing square with padding around the logo.
    pub safe_zone: bool,
}

impl LogoSpec {
    pub fn new(size_percent: f32, safe_zone: bool) -> Self {
        let (min, max) = LOGO_PERCENT_RANGE;
        let size_percent = if size_percent > 0.0 {
            size_percent.clamp(min, max)
        } else {
            0.0
        };
        Self {
            image: None,
            size_percent,
            safe_zone,
        }
    }

    pub fn with_image(mut self, image: Arc<LogoImage>) -> Self {
        self.image = Some(image);
        self
    }
}

// ============================================================================
// RenderRequest
// ============================================================================

/// Everything needed to draw one QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub payload: String,
    /// Side length of the square code area in logical pixels.
    pub size: u32,
    pub style: StyleParameters,
    pub logo: Option<LogoSpec>,
    pub label: Option<LabelSpec>,
    /// Forces the pixel ratio of raster output; exports pass `1.0`.
    pub pixel_ratio: Option<f32>,
}

impl RenderRequest {
    pub fn new(payload: impl Into<String>, size: u32) -> Self {
        Self {
            payload: payload.into(),
            size,
            style: StyleParameters::default(),
            logo: None,
            label: None,
            pixel_ratio: None,
        }
    }

    pub fn with_style(mut self, style: StyleParameters) -> Self {
        self.style = style;
        self
    }

    pub fn with_logo(mut self, logo: LogoSpec) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Sets the caption; blank text is stored as no caption.
    pub fn with_label(mut self, label: LabelSpec) -> Self {
        self.label = (!label.is_blank()).then_some(label);
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = Some(ratio);
        self
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// The caption, if it has visible text.
    pub fn label(&self) -> Option<&LabelSpec> {
        self.label.as_ref().filter(|l| !l.is_blank())
    }
}
