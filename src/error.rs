//! Error kinds surfaced by rendering and export.
//!
//! Geometry and layout are plain arithmetic and never fail. Only symbol
//! encoding, surface allocation, logo decoding and byte encoding do.

use thiserror::Error;

/// Errors produced while rendering or exporting a QR code.
#[derive(Debug, Error)]
pub enum Error {
    /// The payload was empty after trimming.
    #[error("payload is empty")]
    EmptyPayload,

    /// The payload cannot be represented as a QR symbol.
    #[error("payload cannot be encoded as a QR code: {0}")]
    Encoding(String),

    /// The pixel surface could not be allocated.
    #[error("drawing surface of {width}x{height} pixels is unavailable")]
    SurfaceUnavailable { width: u32, height: u32 },

    /// The logo bytes could not be decoded into an image.
    #[error("failed to decode logo: {0}")]
    LogoDecode(String),

    /// Raster encoding produced no data.
    #[error("failed to encode {format} image: {reason}")]
    BlobEncode { format: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
