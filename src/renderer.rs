//! Render orchestration: state machine, surfaces and preview cancellation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::layer::{LayerPipeline, RenderContext};
use crate::request::RenderRequest;
use crate::surface::{CanvasSurface, RasterImage, Surface, VectorSurface};
use crate::text::TextEngine;

// ============================================================================
// RenderPhase
// ============================================================================

/// Progress of one render call.
///
/// `Idle → Preparing → Drawing → Done`, or `Idle → Preparing → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    /// Building the matrix, layout and surface.
    Preparing,
    Drawing,
    Done,
    Failed,
}

impl RenderPhase {
    pub fn can_advance_to(self, next: RenderPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Preparing)
                | (Self::Preparing, Self::Drawing)
                | (Self::Preparing, Self::Failed)
                | (Self::Drawing, Self::Done)
        )
    }
}

impl fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks and logs the phase of a single render.
#[derive(Debug)]
struct PhaseTracker {
    phase: RenderPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: RenderPhase::Idle,
        }
    }

    fn advance(&mut self, next: RenderPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "invalid render transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!(from = %self.phase, to = %next, "render phase");
        self.phase = next;
    }

    fn fail(&mut self, err: Error) -> Error {
        tracing::debug!(%err, "render failed");
        self.advance(RenderPhase::Failed);
        err
    }
}

// ============================================================================
// Preview cancellation
// ============================================================================

/// Generation counter implementing "last request wins" for previews.
///
/// Every preview takes a ticket; only the newest ticket may publish.
#[derive(Debug, Default)]
pub struct PreviewSlot {
    generation: AtomicU64,
}

/// Identifies one preview request issued by a [`PreviewSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket(u64);

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new preview, superseding every earlier ticket.
    pub fn begin(&self) -> PreviewTicket {
        PreviewTicket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: PreviewTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    /// Passes `value` through only if `ticket` is still the newest.
    pub fn settle<T>(&self, ticket: PreviewTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "discarding superseded preview");
            None
        }
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Draws render requests onto pixel or vector surfaces.
///
/// Holds only read-only state, so one renderer can serve concurrent renders;
/// each call allocates its own surface.
#[derive(Clone)]
pub struct Renderer {
    text: Arc<TextEngine>,
    pipeline: LayerPipeline,
}

impl Renderer {
    pub fn new(text: Arc<TextEngine>) -> Self {
        Self {
            text,
            pipeline: LayerPipeline::default(),
        }
    }

    /// A renderer using the fonts installed on the host, falling back to the
    /// bundled font.
    pub fn with_system_fonts() -> Self {
        Self::new(Arc::new(TextEngine::with_system_fonts()))
    }

    /// A renderer that ignores host fonts and draws captions with the
    /// bundled font, so output is identical on every host.
    pub fn headless() -> Self {
        Self::new(Arc::new(TextEngine::bundled()))
    }

    pub fn text_engine(&self) -> &TextEngine {
        &self.text
    }

    /// Builds the matrix and derives geometry and layout for `request`.
    pub fn prepare(&self, request: &RenderRequest) -> Result<RenderContext> {
        RenderContext::prepare(request, self.text.as_ref())
    }

    /// Renders to pixels.
    ///
    /// `request.pixel_ratio` overrides `device_pixel_ratio`; exports force
    /// it to 1.
    pub fn render_raster(&self, request: &RenderRequest, device_pixel_ratio: f32) -> Result<RasterImage> {
        let ratio = request.pixel_ratio.unwrap_or(device_pixel_ratio);
        let mut tracker = PhaseTracker::new();
        let surface = self.draw(request, &mut tracker, |ctx| {
            CanvasSurface::new(ctx.width, ctx.height, ratio, &self.text)
        })?;
        Ok(surface.finish())
    }

    /// Renders to a self-contained SVG document.
    pub fn render_vector(&self, request: &RenderRequest) -> Result<String> {
        let mut tracker = PhaseTracker::new();
        let surface = self.draw(request, &mut tracker, |ctx| Ok(VectorSurface::new(ctx.width, ctx.height)))?;
        Ok(surface.finish())
    }

    /// Renders an interactive preview for `ticket`.
    ///
    /// Returns `Ok(None)` when a newer preview started before this one
    /// finished; the superseded result, including any error, is discarded.
    pub fn render_preview(
        &self,
        slot: &PreviewSlot,
        ticket: PreviewTicket,
        request: &RenderRequest,
        device_pixel_ratio: f32,
    ) -> Result<Option<RasterImage>> {
        if !slot.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, "skipping superseded preview");
            return Ok(None);
        }

        match self.render_raster(request, device_pixel_ratio) {
            Ok(image) => Ok(slot.settle(ticket, image)),
            Err(err) => match slot.settle(ticket, err) {
                Some(err) => Err(err),
                None => Ok(None),
            },
        }
    }

    fn draw<S: Surface>(
        &self,
        request: &RenderRequest,
        tracker: &mut PhaseTracker,
        allocate: impl FnOnce(&RenderContext) -> Result<S>,
    ) -> Result<S> {
        tracker.advance(RenderPhase::Preparing);
        let ctx = self.prepare(request).map_err(|e| tracker.fail(e))?;
        let mut surface = allocate(&ctx).map_err(|e| tracker.fail(e))?;

        tracker.advance(RenderPhase::Drawing);
        self.pipeline.paint(&ctx, &mut surface);

        tracker.advance(RenderPhase::Done);
        tracing::debug!(
            width = ctx.width,
            height = ctx.height,
            style = %ctx.style.style_id,
            "rendered"
        );
        Ok(surface)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::headless()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("has_fonts", &self.text.has_fonts())
            .finish()
    }
}
