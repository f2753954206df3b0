//! Export coordinator: format dispatch, byte encoding and filenames.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use chrono::NaiveDateTime;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::renderer::Renderer;
use crate::request::RenderRequest;
use crate::style::StyleId;

/// Longest content slug kept in a filename.
const MAX_SLUG_LEN: usize = 40;

/// Slug used when the payload has no usable characters.
const FALLBACK_SLUG: &str = "qr";

// ============================================================================
// ExportFormat
// ============================================================================

/// A downloadable encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
    Svg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Png, Self::Jpeg, Self::Webp, Self::Svg];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }

    /// JPEG has no alpha channel; everything else keeps transparency.
    pub fn supports_transparency(self) -> bool {
        self != Self::Jpeg
    }

    pub fn is_vector(self) -> bool {
        self == Self::Svg
    }

    /// Lossy quality factor in `0..=1`, `None` for lossless formats.
    ///
    /// WEBP is written losslessly.
    pub fn quality(self) -> Option<f32> {
        match self {
            Self::Jpeg => Some(0.92),
            Self::Webp | Self::Png | Self::Svg => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "svg" => Ok(Self::Svg),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// An encoded file ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The request actually rendered for `format`.
///
/// Formats without alpha get an opaque background whatever the caller
/// asked for, and raster output is always drawn at pixel ratio 1.
pub fn effective_request(format: ExportFormat, request: &RenderRequest) -> RenderRequest {
    let mut effective = request.clone();
    if !format.supports_transparency() {
        effective.style.transparent_background = false;
    }
    if !format.is_vector() {
        effective.pixel_ratio = Some(1.0);
    }
    effective
}

/// Renders `request` through the canvas adapter and encodes it.
pub fn export_raster(renderer: &Renderer, format: ExportFormat, request: &RenderRequest) -> Result<Vec<u8>> {
    if format.is_vector() {
        return Err(Error::BlobEncode {
            format: format.as_str(),
            reason: "not a raster format".to_owned(),
        });
    }

    let effective = effective_request(format, request);
    let image = renderer.render_raster(&effective, 1.0)?.to_rgba_image();

    let bytes = encode_raster(format, image).map_err(|e| Error::BlobEncode {
        format: format.as_str(),
        reason: e.to_string(),
    })?;
    if bytes.is_empty() {
        return Err(Error::BlobEncode {
            format: format.as_str(),
            reason: "encoder produced no data".to_owned(),
        });
    }

    tracing::debug!(format = format.as_str(), bytes = bytes.len(), "encoded export");
    Ok(bytes)
}

/// Renders `request` through the vector adapter. Transparency is kept.
pub fn export_vector(renderer: &Renderer, request: &RenderRequest) -> Result<String> {
    let svg = renderer.render_vector(request)?;
    tracing::debug!(format = "svg", bytes = svg.len(), "encoded export");
    Ok(svg)
}

/// Renders, encodes and names one export.
pub fn export(
    renderer: &Renderer,
    format: ExportFormat,
    request: &RenderRequest,
    timestamp: NaiveDateTime,
) -> Result<ExportArtifact> {
    let bytes = if format.is_vector() {
        export_vector(renderer, request)?.into_bytes()
    } else {
        export_raster(renderer, format, request)?
    };

    Ok(ExportArtifact {
        format,
        filename: export_filename(&request.payload, request.style.style_id, timestamp, format),
        mime_type: format.mime_type(),
        bytes,
    })
}

fn encode_raster(format: ExportFormat, image: RgbaImage) -> image::ImageResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut out = Cursor::new(Vec::new());

    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut out).write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)?;
        }
        ExportFormat::Jpeg => {
            let quality = format.quality().map_or(92, |q| (q * 100.0).round() as u8);
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, quality).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ExportFormat::Webp => {
            WebPEncoder::new_lossless(&mut out).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Svg => {}
    }

    Ok(out.into_inner())
}

// ============================================================================
// Filenames
// ============================================================================

/// Lowercase ASCII letters and digits joined by single hyphens, at most 40
/// characters, or `"qr"` when nothing is left.
pub fn content_slug(payload: &str) -> String {
    let mut slug = String::with_capacity(MAX_SLUG_LEN);
    for c in payload.chars() {
        if slug.len() == MAX_SLUG_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug.to_owned()
    }
}

/// `qr-<slug>-<style>-<YYYYMMDDHHmmss>.<ext>`
pub fn export_filename(payload: &str, style: StyleId, timestamp: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "qr-{}-{}-{}.{}",
        content_slug(payload),
        style,
        timestamp.format("%Y%m%d%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::label::LabelSpec;
    use crate::style::StyleParameters;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap()
    }

    fn transparent_request() -> RenderRequest {
        RenderRequest::new("https://example.com", 240)
            .with_style(StyleParameters::new(StyleId::Rounded).with_transparency(true))
    }

    #[test]
    fn parses_formats() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!("jpg".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert_eq!(" webp ".parse::<ExportFormat>(), Ok(ExportFormat::Webp));
        assert!("gif".parse::<ExportFormat>().is_err());
        for format in ExportFormat::ALL {
            assert_eq!(format.as_str().parse::<ExportFormat>(), Ok(format));
        }
    }

    #[test]
    fn format_properties() {
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::Svg.mime_type(), "image/svg+xml");
        assert!(!ExportFormat::Jpeg.supports_transparency());
        assert!(ExportFormat::Webp.supports_transparency());
        assert_eq!(ExportFormat::Jpeg.quality(), Some(0.92));
        assert_eq!(ExportFormat::Png.quality(), None);
        assert_eq!(ExportFormat::Webp.quality(), None);
    }

    #[test]
    fn jpeg_forces_an_opaque_background() {
        let request = transparent_request();
        let effective = effective_request(ExportFormat::Jpeg, &request);
        assert!(!effective.style.transparent_background);
        assert_eq!(effective.pixel_ratio, Some(1.0));
        assert!(request.style.transparent_background);

        let bytes = export_raster(&Renderer::headless(), ExportFormat::Jpeg, &request).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (240, 240));
        let corner = decoded.get_pixel(1, 1).0;
        assert!(corner.iter().take(3).all(|&c| c > 240), "{corner:?}");
        assert_eq!(corner[3], 255);
    }

    #[test]
    fn png_keeps_transparency() {
        let request = transparent_request();
        let effective = effective_request(ExportFormat::Png, &request);
        assert!(effective.style.transparent_background);

        let bytes = export_raster(&Renderer::headless(), ExportFormat::Png, &request).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(1, 1).0[3], 0);
    }

    #[test]
    fn raster_export_ignores_device_ratio() {
        let request = RenderRequest::new("hello", 200).with_pixel_ratio(3.0);
        let bytes = export_raster(&Renderer::headless(), ExportFormat::Webp, &request).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    #[test]
    fn caption_adds_height_to_export() {
        let request = RenderRequest::new("hello", 300).with_label(LabelSpec::new("Scan me"));
        let bytes = export_raster(&Renderer::headless(), ExportFormat::Png, &request).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 300);
        assert!(decoded.height() > 300);
    }

    #[test]
    fn default_renderer_draws_caption_text() {
        let renderer = Renderer::default();
        let request = RenderRequest::new("hello", 300).with_label(LabelSpec::new("Scan me"));
        // Only the caption is drawn below the last module row.
        let band_top = renderer.prepare(&request).unwrap().geometry.matrix_bottom().ceil() as u32 + 1;

        let bytes = export_raster(&renderer, ExportFormat::Png, &request).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        let dark = (band_top..decoded.height())
            .flat_map(|y| (0..decoded.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| decoded.get_pixel(x, y).0[0] < 128)
            .count();
        assert!(dark > 30, "caption band has {dark} dark pixels");
    }

    #[test]
    fn svg_is_not_a_raster_format() {
        let result = export_raster(&Renderer::headless(), ExportFormat::Svg, &transparent_request());
        assert!(matches!(result, Err(Error::BlobEncode { format: "svg", .. })));
    }

    #[test]
    fn vector_export_keeps_transparency() {
        let artifact = export(
            &Renderer::headless(),
            ExportFormat::Svg,
            &transparent_request(),
            timestamp(),
        )
        .unwrap();
        let svg = String::from_utf8(artifact.bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains(r#"<g id="background">"#));
        assert_eq!(artifact.mime_type, "image/svg+xml");
        assert_eq!(artifact.filename, "qr-https-example-com-rounded-20240305140709.svg");
    }

    #[test]
    fn export_artifact_for_raster() {
        let request = RenderRequest::new("Hello, World!", 120);
        let artifact = export(&Renderer::headless(), ExportFormat::Jpeg, &request, timestamp()).unwrap();
        assert_eq!(artifact.format, ExportFormat::Jpeg);
        assert_eq!(artifact.mime_type, "image/jpeg");
        assert_eq!(artifact.filename, "qr-hello-world-classic-20240305140709.jpg");
        assert!(!artifact.bytes.is_empty());
    }

    #[test]
    fn encoding_errors_propagate() {
        let request = RenderRequest::new("x".repeat(8000), 100);
        let result = export(&Renderer::headless(), ExportFormat::Png, &request, timestamp());
        assert!(matches!(result, Err(Error::Encoding(_))));
    }

    #[test]
    fn slugs() {
        assert_eq!(content_slug("https://example.com"), "https-example-com");
        assert_eq!(content_slug("  Hello,   World!  "), "hello-world");
        assert_eq!(content_slug("!!!"), "qr");
        assert_eq!(content_slug("日本語"), "qr");
        assert_eq!(content_slug(""), "qr");

        let long = content_slug(&"ab-".repeat(30));
        assert!(long.len() <= 40);
        assert!(!long.ends_with('-'));
        assert!(long.starts_with("ab-ab"));
    }

    #[test]
    fn filename_is_deterministic() {
        let name = export_filename("WIFI:S:home;", StyleId::Dots, timestamp(), ExportFormat::Png);
        assert_eq!(name, "qr-wifi-s-home-dots-20240305140709.png");
        assert_eq!(
            name,
            export_filename("WIFI:S:home;", StyleId::Dots, timestamp(), ExportFormat::Png)
        );
    }
}
