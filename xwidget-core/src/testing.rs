//! Test utilities for xwidget applications
//!
//! This module provides helpers for testing components without a display:
//!
//! - [`RecordingSurface`]: a [`DrawSurface`] that records every call as a [`DrawOp`]
//! - [`LoggingComponent`] and [`CallLog`]: a component that logs what the container did to it
//! - [`ScriptedEvents`]: an [`EventSource`] that replays a fixed list of raw events
//! - [`pointer_move`], [`press`], [`release`]: event constructors
//! - [`buffer_to_string_plain`]: terminal canvas snapshots
//!
//! # Example
//!
//! ```
//! use xwidget_core::testing::{pointer_move, RecordingSurface, DrawOp};
//! use xwidget_core::DrawSurface;
//!
//! let mut surface = RecordingSurface::new();
//! let black = surface.resolve_color("black").unwrap();
//! assert_eq!(black, 0x000000);
//! assert_eq!(surface.ops(), &[DrawOp::ResolveColor { name: "black".into() }]);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use ratatui::buffer::Buffer;

use crate::bus::{EventSource, RawEvent};
use crate::component::{Component, EventOutcome, Signal};
use crate::error::{DrawError, SurfaceError};
use crate::event::EventKind;
use crate::geometry::{Point, Rect};
use crate::surface::{DrawSurface, GcStyle};

/// Pixel advance of the `fixed` font.
pub const FIXED_ADVANCE: u32 = 6;

/// Create a `PointerMove` event.
pub fn pointer_move(x: i32, y: i32) -> EventKind {
    EventKind::PointerMove(Point::new(x, y))
}

/// Create a `ButtonPress` event.
pub fn press(x: i32, y: i32) -> EventKind {
    EventKind::ButtonPress(Point::new(x, y))
}

/// Create a `ButtonRelease` event.
pub fn release(x: i32, y: i32) -> EventKind {
    EventKind::ButtonRelease(Point::new(x, y))
}

/// Target handle of a [`RecordingSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordedTarget(pub u32);

/// Drawing context handle of a [`RecordingSurface`]
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedGc(pub u32);

/// One call made against a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    CreateGc {
        target: RecordedTarget,
        gc: u32,
        style: GcStyle,
    },
    FreeGc {
        gc: u32,
    },
    ResolveColor {
        name: String,
    },
    DrawRect {
        gc: u32,
        color: u32,
        rect: Rect,
    },
    FillRect {
        gc: u32,
        color: u32,
        rect: Rect,
    },
    DrawText {
        gc: u32,
        color: u32,
        origin: Point,
        text: String,
    },
    MeasureText {
        font: String,
        text: String,
    },
    Flush,
}

/// A drawing surface that records calls instead of drawing
///
/// Colors resolve to `0xRRGGBB` values from a small X11-style palette and
/// text width is `chars * advance` for known fonts (`fixed` at 6px by
/// default). Colors, fonts and context creation can be made to fail to
/// exercise error paths.
#[derive(Debug)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    palette: HashMap<String, u32>,
    fonts: HashMap<String, u32>,
    next_gc: u32,
    fail_gc: bool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// The only target this surface hands out.
    pub const WINDOW: RecordedTarget = RecordedTarget(1);

    pub fn new() -> Self {
        let palette = [
            ("black", 0x000000),
            ("white", 0xffffff),
            ("blue", 0x0000ff),
            ("yellow", 0xffff00),
            ("red", 0xff0000),
            ("green", 0x00ff00),
            ("gray", 0xbebebe),
        ]
        .into_iter()
        .map(|(name, pixel)| (name.to_string(), pixel))
        .collect();

        Self {
            ops: Vec::new(),
            palette,
            fonts: HashMap::from([("fixed".to_string(), FIXED_ADVANCE)]),
            next_gc: 1,
            fail_gc: false,
        }
    }

    /// Make `name` unresolvable.
    pub fn without_color(mut self, name: &str) -> Self {
        self.palette.remove(name);
        self
    }

    /// Make `font` unavailable for measurement.
    pub fn without_font(mut self, font: &str) -> Self {
        self.fonts.remove(font);
        self
    }

    /// Register a font with a fixed per-character advance.
    pub fn with_font(mut self, font: &str, advance: u32) -> Self {
        self.fonts.insert(font.to_string(), advance);
        self
    }

    /// Make `create_gc` fail (or succeed again).
    pub fn set_fail_gc(&mut self, fail: bool) {
        self.fail_gc = fail;
    }

    /// Remove or restore a palette entry after construction.
    pub fn set_color(&mut self, name: &str, pixel: Option<u32>) {
        match pixel {
            Some(pixel) => {
                self.palette.insert(name.to_string(), pixel);
            }
            None => {
                self.palette.remove(name);
            }
        }
    }

    /// Every recorded call, oldest first.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded calls.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// How many drawing contexts were created.
    pub fn gc_creations(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::CreateGc { .. }))
    }

    /// Contexts created and not yet freed.
    pub fn live_gcs(&self) -> usize {
        self.gc_creations() - self.count(|op| matches!(op, DrawOp::FreeGc { .. }))
    }

    /// Labels drawn, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Count recorded calls matching a predicate.
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl DrawSurface for RecordingSurface {
    type Target = RecordedTarget;
    type Gc = RecordedGc;
    type Color = u32;

    fn create_gc(
        &mut self,
        target: RecordedTarget,
        style: GcStyle,
    ) -> Result<RecordedGc, SurfaceError> {
        if self.fail_gc {
            return Err(SurfaceError::ContextUnavailable("recording surface set to fail".into()));
        }
        let gc = self.next_gc;
        self.next_gc += 1;
        self.ops.push(DrawOp::CreateGc { target, gc, style });
        Ok(RecordedGc(gc))
    }

    fn free_gc(&mut self, gc: RecordedGc) {
        self.ops.push(DrawOp::FreeGc { gc: gc.0 });
    }

    fn resolve_color(&mut self, name: &str) -> Result<u32, SurfaceError> {
        self.ops.push(DrawOp::ResolveColor {
            name: name.to_string(),
        });
        self.palette
            .get(name)
            .copied()
            .ok_or_else(|| SurfaceError::UnknownColor(name.to_string()))
    }

    fn draw_rect(
        &mut self,
        _target: RecordedTarget,
        gc: &RecordedGc,
        color: u32,
        rect: Rect,
    ) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::DrawRect {
            gc: gc.0,
            color,
            rect,
        });
        Ok(())
    }

    fn fill_rect(
        &mut self,
        _target: RecordedTarget,
        gc: &RecordedGc,
        color: u32,
        rect: Rect,
    ) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::FillRect {
            gc: gc.0,
            color,
            rect,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        _target: RecordedTarget,
        gc: &RecordedGc,
        color: u32,
        origin: Point,
        text: &str,
    ) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::DrawText {
            gc: gc.0,
            color,
            origin,
            text: text.to_string(),
        });
        Ok(())
    }

    fn text_width(&mut self, font: &str, text: &str) -> Result<u32, SurfaceError> {
        self.ops.push(DrawOp::MeasureText {
            font: font.to_string(),
            text: text.to_string(),
        });
        let advance = self
            .fonts
            .get(font)
            .ok_or_else(|| SurfaceError::FontUnavailable(font.to_string()))?;
        Ok(text.chars().count() as u32 * advance)
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::Flush);
        Ok(())
    }
}

/// Shared, append-only log of `"<name>:<call>"` entries
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// A component that records every call into a [`CallLog`]
///
/// It emits `Signal::Pressed(name)` for presses inside its bounds and can be
/// told to fail realization.
#[derive(Debug)]
pub struct LoggingComponent {
    name: String,
    bounds: Rect,
    log: CallLog,
    realized: bool,
    fail: bool,
}

impl LoggingComponent {
    pub fn new(name: impl Into<String>, bounds: Rect, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            bounds,
            log: log.clone(),
            realized: false,
            fail: false,
        }
    }

    /// Make every `realize` call fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn record(&self, call: &str) {
        self.log.push(format!("{}:{}", self.name, call));
    }
}

impl<S: DrawSurface> Component<S> for LoggingComponent {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn realize(&mut self, _surface: &mut S, _target: S::Target) -> Result<(), DrawError> {
        self.record("realize");
        if self.fail {
            return Err(DrawError::ResourceInit(SurfaceError::ContextUnavailable(
                "component set to fail".into(),
            )));
        }
        self.realized = true;
        Ok(())
    }

    fn is_realized(&self) -> bool {
        self.realized
    }

    fn draw(&mut self, _surface: &mut S, _target: S::Target) -> Result<(), DrawError> {
        self.record("draw");
        Ok(())
    }

    fn handle_event(&mut self, event: &EventKind, _surface: &mut S) -> EventOutcome {
        self.record(event.name());
        match event {
            EventKind::ButtonPress(p) if self.bounds.contains_inclusive(*p) => {
                Signal::Pressed(self.name.clone()).into()
            }
            _ => EventOutcome::ignored(),
        }
    }

    fn release(&mut self, _surface: &mut S) {
        self.record("release");
    }
}

/// An event source that replays a fixed list, then reports nothing
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<RawEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn poll_event(&mut self, _timeout: Duration) -> Result<Option<RawEvent>, SurfaceError> {
        Ok(self.events.pop_front())
    }
}

/// Render a buffer as plain text, one line per row.
pub fn buffer_to_string_plain(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buffer[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            out.push('\n');
        }
    }
    out
}
