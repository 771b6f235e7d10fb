//! Drawing backend abstraction
//!
//! Components never talk to a windowing server directly. Every draw and
//! event call receives a [`DrawSurface`], which hands out opaque handles
//! (targets, drawing contexts, resolved colors) and performs the actual
//! primitives. Backends live in [`crate::backend`]; tests use
//! [`crate::testing::RecordingSurface`].

use std::fmt;

use crate::error::SurfaceError;
use crate::geometry::{Point, Rect};

/// Parameters for a new drawing context
///
/// The context's initial foreground is the backend's default black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcStyle {
    pub line_width: u32,
}

impl Default for GcStyle {
    fn default() -> Self {
        Self {
            line_width: 1,
        }
    }
}

/// A 2D drawing backend
///
/// Implementations own the connection to whatever actually shows pixels.
/// Handles returned from one surface must only be passed back to the same
/// surface.
pub trait DrawSurface {
    /// Something that can be drawn on (a window, the terminal screen)
    type Target: Copy + fmt::Debug;
    /// Drawing context created for a target
    type Gc: fmt::Debug;
    /// A resolved color
    type Color: Copy + fmt::Debug + PartialEq;

    /// Create a drawing context bound to `target`.
    fn create_gc(&mut self, target: Self::Target, style: GcStyle)
        -> Result<Self::Gc, SurfaceError>;

    /// Release a drawing context.
    fn free_gc(&mut self, gc: Self::Gc);

    /// Resolve a symbolic color name (`"black"`, `"yellow"`, ...).
    fn resolve_color(&mut self, name: &str) -> Result<Self::Color, SurfaceError>;

    /// Outline `rect` with the context's line style.
    fn draw_rect(
        &mut self,
        target: Self::Target,
        gc: &Self::Gc,
        color: Self::Color,
        rect: Rect,
    ) -> Result<(), SurfaceError>;

    /// Fill `rect`.
    fn fill_rect(
        &mut self,
        target: Self::Target,
        gc: &Self::Gc,
        color: Self::Color,
        rect: Rect,
    ) -> Result<(), SurfaceError>;

    /// Draw `text` with its baseline starting at `origin`.
    fn draw_text(
        &mut self,
        target: Self::Target,
        gc: &Self::Gc,
        color: Self::Color,
        origin: Point,
        text: &str,
    ) -> Result<(), SurfaceError>;

    /// Rendered width of `text` in `font`, in pixels.
    fn text_width(&mut self, font: &str, text: &str) -> Result<u32, SurfaceError>;

    /// Push everything drawn so far to the screen.
    fn flush(&mut self) -> Result<(), SurfaceError>;

    /// The drawable area changed size (in the backend's native units).
    #[allow(unused_variables)]
    fn resized(&mut self, width: u32, height: u32) {}
}
