//! Serializable render profile.
//!
//! A [`RenderProfile`] captures every setting of a [`RenderRequest`] except
//! the logo image itself, in a JSON form that can be stored or sent between
//! processes.
//!
//! # Example
//!
//! ```
//! use qrstyle_renderer::{LabelSpec, RenderProfile, RenderRequest, StyleId, StyleParameters};
//!
//! let request = RenderRequest::new("https://example.com", 512)
//!     .with_style(StyleParameters::new(StyleId::Dots))
//!     .with_label(LabelSpec::new("Scan me"));
//!
//! let json = RenderProfile::from(&request).to_json().unwrap();
//! let restored = RenderProfile::from_json(&json).unwrap().to_request(None);
//! assert_eq!(restored, request);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::label::LabelSpec;
use crate::request::{LogoImage, LogoSpec, RenderRequest};
use crate::style::StyleParameters;

/// Logo settings without the image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct LogoSettings {
    /// Percentage of the matrix extent (10-40).
    pub size_percent: f32,

    #[serde(default = "default_true")]
    pub safe_zone: bool,
}

fn default_true() -> bool {
    true
}

fn default_size() -> u32 {
    512
}

/// A serializable render configuration.
///
/// # JSON Format
///
/// ```json
/// {
///   "payload": "https://example.com",
///   "size": 512,
///   "style": {
///     "styleId": "pills",
///     "foreground": "#000000",
///     "background": "#ffffff",
///     "transparentBackground": false
///   },
///   "logo": { "sizePercent": 20.0, "safeZone": true },
///   "label": { "text": "Scan me", "size": "md", "weight": "bold", "align": "center", "invert": false }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RenderProfile {
    pub payload: String,

    /// Side length of the code in pixels.
    #[serde(default = "default_size")]
    pub size: u32,

    #[serde(default)]
    pub style: StyleParameters,

    /// `None` means no logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoSettings>,

    /// `None` means no caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelSpec>,
}

impl RenderProfile {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            size: default_size(),
            style: StyleParameters::default(),
            logo: None,
            label: None,
        }
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds a request, attaching `image` to the logo settings if any.
    ///
    /// The logo clip is reserved even when `image` is `None`.
    pub fn to_request(&self, image: Option<Arc<LogoImage>>) -> RenderRequest {
        let mut request = RenderRequest::new(self.payload.clone(), self.size).with_style(self.style);

        if let Some(settings) = self.logo {
            let mut logo = LogoSpec::new(settings.size_percent, settings.safe_zone);
            logo.image = image;
            request = request.with_logo(logo);
        }
        if let Some(label) = &self.label {
            request = request.with_label(label.clone());
        }
        request
    }
}

impl From<&RenderRequest> for RenderProfile {
    fn from(request: &RenderRequest) -> Self {
        Self {
            payload: request.payload.clone(),
            size: request.size,
            style: request.style,
            logo: request.logo.as_ref().map(|logo| LogoSettings {
                size_percent: logo.size_percent,
                safe_zone: logo.safe_zone,
            }),
            label: request.label().cloned(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
