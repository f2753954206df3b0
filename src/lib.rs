//! qrstyle-renderer: styled QR code rendering for preview and export
//!
//! This crate turns a payload string and a set of styling parameters into a
//! QR code drawn either as pixels or as an SVG document. Both outputs are
//! painted from the same derived layout, so a small on-screen preview and a
//! large export look the same.
//!
//! # Example
//!
//! ```
//! use qrstyle_renderer::{
//!     ExportFormat, LabelSpec, RenderRequest, Renderer, StyleId, StyleParameters,
//! };
//!
//! let renderer = Renderer::headless();
//! let request = RenderRequest::new("https://example.com", 360)
//!     .with_style(StyleParameters::new(StyleId::Rounded))
//!     .with_label(LabelSpec::new("Scan me"));
//!
//! // Preview at the device pixel ratio
//! let preview = renderer.render_raster(&request, 2.0).unwrap();
//! assert_eq!(preview.width(), 720);
//!
//! // Export as a file
//! let png = qrstyle_renderer::export_raster(&renderer, ExportFormat::Png, &request).unwrap();
//! assert!(!png.is_empty());
//! let svg = qrstyle_renderer::export_vector(&renderer, &request).unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! # Previews
//!
//! Rapid style changes supersede each other. Take a ticket from a
//! [`PreviewSlot`] per preview; results of older tickets are discarded:
//!
//! ```
//! use qrstyle_renderer::{PreviewSlot, RenderRequest, Renderer};
//!
//! let renderer = Renderer::headless();
//! let slot = PreviewSlot::new();
//!
//! let stale = slot.begin();
//! let latest = slot.begin();
//! let request = RenderRequest::new("hello", 200);
//!
//! assert!(renderer.render_preview(&slot, stale, &request, 1.0).unwrap().is_none());
//! assert!(renderer.render_preview(&slot, latest, &request, 1.0).unwrap().is_some());
//! ```

mod error;
mod export;
mod geometry;
mod label;
mod layer;
mod matrix;
mod profile;
mod raster;
mod renderer;
mod request;
mod style;
mod surface;
mod text;

pub use error::{Error, Result};
pub use export::{
    ExportArtifact, ExportFormat, content_slug, effective_request, export, export_filename,
    export_raster, export_vector,
};
pub use geometry::{
    FINDER_SIZE, LogoClip, ModuleGeometry, QUIET_ZONE, Rect, finder_radius, is_finder_module,
};
pub use label::{LabelAlign, LabelLayout, LabelSize, LabelSpec, LabelWeight, MAX_LINES};
pub use layer::{
    BackgroundLayer, CaptionLayer, CaptionLine, FinderLayer, FinderPattern, LayerEffect,
    LayerPipeline, LogoLayer, LogoPlacement, ModuleLayer, ModulePaint, RenderContext, Run,
    caption_lines, finder_patterns, merge_runs, module_shapes,
};
pub use matrix::{EcStrength, ModuleMatrix};
pub use profile::{LogoSettings, RenderProfile};
pub use raster::render_svg;
pub use renderer::{PreviewSlot, PreviewTicket, RenderPhase, Renderer};
pub use request::{LOGO_PERCENT_RANGE, LogoImage, LogoSpec, RenderRequest};
pub use style::{Color, StyleId, StyleParameters};
pub use surface::{CanvasSurface, RasterImage, Shape, Surface, TextAnchor, TextRun, VectorSurface};
pub use text::{FontSpec, HeuristicMeasure, TextEngine, TextMeasure};
