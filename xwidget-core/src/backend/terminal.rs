//! Terminal backend
//!
//! The terminal screen stands in for a window. Every character cell covers
//! a `CELL_WIDTH` x `CELL_HEIGHT` pixel block (the metrics of the X `fixed`
//! font), so components keep working in pixel coordinates. Drawing goes to
//! an in-memory canvas that persists between frames the way window contents
//! do; `flush` presents the canvas through ratatui.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Style};
use ratatui::Terminal;
use tracing::debug;

use crate::bus::{EventSource, RawEvent};
use crate::error::SurfaceError;
use crate::geometry::{Point, Rect};
use crate::surface::{DrawSurface, GcStyle};

/// Pixel width of one character cell
pub const CELL_WIDTH: u32 = 6;
/// Pixel height of one character cell
pub const CELL_HEIGHT: u32 = 13;

/// The terminal screen as a drawing target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen;

/// Drawing context handle; cells carry their own style, so this is just an id
#[derive(Debug, PartialEq, Eq)]
pub struct CellGc(u32);

/// Drawing surface backed by a ratatui terminal
pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    canvas: Buffer,
    next_gc: u32,
}

impl<B: Backend> TerminalSurface<B> {
    /// Wrap a terminal, sizing the canvas to its current size
    pub fn new(terminal: Terminal<B>) -> Result<Self, SurfaceError> {
        let size = terminal.size()?;
        Ok(Self {
            terminal,
            canvas: Buffer::empty(CellRect::new(0, 0, size.width, size.height)),
            next_gc: 1,
        })
    }

    /// The persistent canvas components draw into
    pub fn canvas(&self) -> &Buffer {
        &self.canvas
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Give the terminal back for teardown
    pub fn into_terminal(self) -> Terminal<B> {
        self.terminal
    }

    /// Cells covered by a pixel rectangle, clipped to the canvas
    fn cells(&self, rect: Rect) -> Option<CellRect> {
        let area = self.canvas.area;
        let (left, right) = cell_span(rect.x, rect.width, CELL_WIDTH, area.right())?;
        let (top, bottom) = cell_span(rect.y, rect.height, CELL_HEIGHT, area.bottom())?;
        Some(CellRect::new(left, top, right - left, bottom - top))
    }
}

/// Half-open cell range `[first, end)` covering `len` pixels from `start`
fn cell_span(start: i32, len: u32, cell: u32, limit: u16) -> Option<(u16, u16)> {
    if len == 0 {
        return None;
    }
    let cell = i64::from(cell);
    let start = i64::from(start);
    let end = start + i64::from(len);
    let first = start.div_euclid(cell).max(0);
    let last = ((end + cell - 1).div_euclid(cell)).min(i64::from(limit));
    (first < last).then(|| (first as u16, last as u16))
}

/// Pixel at the center of a cell
pub fn cell_center(column: u16, row: u16) -> Point {
    let (w, h) = (CELL_WIDTH as i32, CELL_HEIGHT as i32);
    Point::new(i32::from(column) * w + w / 2, i32::from(row) * h + h / 2)
}

/// Resolve a color name (`"yellow"`, `"dark gray"`, `"#ff8800"`) to a terminal color
pub fn named_color(name: &str) -> Result<Color, SurfaceError> {
    name.parse::<Color>()
        .map_err(|_| SurfaceError::UnknownColor(name.to_string()))
}

impl<B: Backend> DrawSurface for TerminalSurface<B> {
    type Target = Screen;
    type Gc = CellGc;
    type Color = Color;

    fn create_gc(&mut self, _target: Screen, _style: GcStyle) -> Result<CellGc, SurfaceError> {
        let gc = CellGc(self.next_gc);
        self.next_gc += 1;
        Ok(gc)
    }

    fn free_gc(&mut self, _gc: CellGc) {}

    fn resolve_color(&mut self, name: &str) -> Result<Color, SurfaceError> {
        named_color(name)
    }

    /// Cells have no sub-cell lines: the outline recolors the perimeter cells.
    fn draw_rect(
        &mut self,
        _target: Screen,
        _gc: &CellGc,
        color: Color,
        rect: Rect,
    ) -> Result<(), SurfaceError> {
        let Some(cells) = self.cells(rect) else {
            return Ok(());
        };
        for y in cells.top()..cells.bottom() {
            for x in cells.left()..cells.right() {
                let edge = y == cells.top()
                    || y + 1 == cells.bottom()
                    || x == cells.left()
                    || x + 1 == cells.right();
                if edge {
                    self.canvas[(x, y)].set_fg(color);
                }
            }
        }
        Ok(())
    }

    fn fill_rect(
        &mut self,
        _target: Screen,
        _gc: &CellGc,
        color: Color,
        rect: Rect,
    ) -> Result<(), SurfaceError> {
        let Some(cells) = self.cells(rect) else {
            return Ok(());
        };
        for y in cells.top()..cells.bottom() {
            for x in cells.left()..cells.right() {
                self.canvas[(x, y)].set_symbol(" ").set_bg(color);
            }
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        _target: Screen,
        _gc: &CellGc,
        color: Color,
        origin: Point,
        text: &str,
    ) -> Result<(), SurfaceError> {
        // The baseline sits under the glyphs, so the text occupies the cell
        // holding the pixel just above it.
        let column = i64::from(origin.x).div_euclid(i64::from(CELL_WIDTH));
        let row = (i64::from(origin.y) - 1).div_euclid(i64::from(CELL_HEIGHT));
        let area = self.canvas.area;
        if column < 0
            || row < 0
            || column >= i64::from(area.right())
            || row >= i64::from(area.bottom())
        {
            return Ok(());
        }
        let (column, row) = (column as u16, row as u16);
        let max_width = usize::from(area.right() - column);
        self.canvas
            .set_stringn(column, row, text, max_width, Style::default().fg(color));
        Ok(())
    }

    fn text_width(&mut self, _font: &str, text: &str) -> Result<u32, SurfaceError> {
        Ok(text.chars().count() as u32 * CELL_WIDTH)
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        let canvas = &self.canvas;
        self.terminal.draw(|frame| {
            let area = frame.area().intersection(canvas.area);
            let buf = frame.buffer_mut();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    buf[(x, y)] = canvas[(x, y)].clone();
                }
            }
        })?;
        Ok(())
    }

    fn resized(&mut self, width: u32, height: u32) {
        let clamp = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
        debug!(width, height, "Terminal resized, resetting canvas");
        self.canvas = Buffer::empty(CellRect::new(0, 0, clamp(width), clamp(height)));
    }
}

/// Translate a crossterm event; mouse cells become the pixel at their center
///
/// `q`, `Esc` and `Ctrl-C` request close. Scroll and unrelated events are
/// dropped.
pub fn translate_terminal_event(event: Event) -> Option<RawEvent> {
    match event {
        Event::Mouse(mouse) => {
            let Point { x, y } = cell_center(mouse.column, mouse.row);
            match mouse.kind {
                MouseEventKind::Down(_) => Some(RawEvent::ButtonPress { x, y }),
                MouseEventKind::Up(_) => Some(RawEvent::ButtonRelease { x, y }),
                MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(RawEvent::Motion { x, y }),
                _ => None,
            }
        }
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(RawEvent::CloseRequested),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(RawEvent::CloseRequested)
            }
            _ => None,
        },
        Event::Resize(width, height) => Some(RawEvent::Resize {
            width: width.into(),
            height: height.into(),
        }),
        _ => None,
    }
}

/// Crossterm input as an [`EventSource`]
///
/// A terminal never sends an expose, so the first poll reports one to get
/// the initial frame drawn.
#[derive(Debug, Default)]
pub struct TerminalEvents {
    exposed: bool,
}

impl TerminalEvents {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSource for TerminalEvents {
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>, SurfaceError> {
        if !self.exposed {
            self.exposed = true;
            return Ok(Some(RawEvent::Expose));
        }
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(translate_terminal_event(event::read()?))
    }
}
