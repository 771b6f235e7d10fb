//! X11 backend built on x11rb
//!
//! [`open_window`] connects to the display and creates the top-level window;
//! the returned [`X11Surface`] draws into it and [`X11Events`] feeds the
//! event poller. Both share the connection, which x11rb allows to be used
//! from several tasks at once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    self, AtomEnum, ChangeGCAux, Char2b, ConnectionExt as _, CreateGCAux, CreateWindowAux,
    PropMode, Rectangle, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::bus::{EventSource, RawEvent};
use crate::config::WindowConfig;
use crate::error::{StartupError, SurfaceError};
use crate::event::EventMask;
use crate::geometry::{Point, Rect};
use crate::surface::{DrawSurface, GcStyle};

fn connection_error(err: impl std::fmt::Display) -> SurfaceError {
    SurfaceError::Connection(err.to_string())
}

/// Handles identifying the top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X11Window {
    pub id: xproto::Window,
    wm_protocols: xproto::Atom,
    wm_delete_window: xproto::Atom,
}

/// Drawing surface on an X11 connection
pub struct X11Surface {
    conn: Arc<RustConnection>,
    colormap: xproto::Colormap,
    black_pixel: u32,
    colors: HashMap<String, u32>,
    fonts: HashMap<String, xproto::Font>,
}

/// Connect to `display` (or `$DISPLAY`), create and map the top-level window.
pub fn open_window(
    display: Option<&str>,
    config: &WindowConfig,
) -> Result<(X11Surface, X11Window, X11Events), StartupError> {
    let (conn, screen_num) =
        x11rb::connect(display).map_err(|e| StartupError::Display(e.to_string()))?;
    let conn = Arc::new(conn);
    let screen = &conn.setup().roots[screen_num];
    let (root, black_pixel, white_pixel, colormap) = (
        screen.root,
        screen.black_pixel,
        screen.white_pixel,
        screen.default_colormap,
    );

    let window = create_window(&conn, root, black_pixel, white_pixel, config)
        .map_err(StartupError::Window)?;
    info!(
        window = window.id,
        width = config.width,
        height = config.height,
        "X11 window mapped"
    );

    let surface = X11Surface {
        conn: Arc::clone(&conn),
        colormap,
        black_pixel,
        colors: HashMap::new(),
        fonts: HashMap::new(),
    };
    let events = X11Events { conn, window };
    Ok((surface, window, events))
}

fn create_window(
    conn: &RustConnection,
    root: xproto::Window,
    black_pixel: u32,
    white_pixel: u32,
    config: &WindowConfig,
) -> Result<X11Window, SurfaceError> {
    let id = conn.generate_id().map_err(connection_error)?;
    let aux = CreateWindowAux::new()
        .background_pixel(white_pixel)
        .border_pixel(black_pixel)
        .event_mask(x_event_mask(EventMask::INTERACTIVE));
    conn.create_window(
        x11rb::COPY_DEPTH_FROM_PARENT,
        id,
        root,
        0,
        0,
        clamp_u16(config.width),
        clamp_u16(config.height),
        clamp_u16(config.border_width),
        WindowClass::INPUT_OUTPUT,
        x11rb::COPY_FROM_PARENT,
        &aux,
    )
    .map_err(connection_error)?;

    let wm_protocols = intern(conn, b"WM_PROTOCOLS")?;
    let wm_delete_window = intern(conn, b"WM_DELETE_WINDOW")?;
    conn.change_property32(
        PropMode::REPLACE,
        id,
        wm_protocols,
        AtomEnum::ATOM,
        &[wm_delete_window],
    )
    .map_err(connection_error)?;
    conn.change_property8(
        PropMode::REPLACE,
        id,
        AtomEnum::WM_NAME,
        AtomEnum::STRING,
        config.title.as_bytes(),
    )
    .map_err(connection_error)?;

    conn.map_window(id).map_err(connection_error)?;
    conn.flush().map_err(connection_error)?;

    Ok(X11Window {
        id,
        wm_protocols,
        wm_delete_window,
    })
}

fn intern(conn: &RustConnection, name: &[u8]) -> Result<xproto::Atom, SurfaceError> {
    Ok(conn
        .intern_atom(false, name)
        .map_err(connection_error)?
        .reply()
        .map_err(connection_error)?
        .atom)
}

/// Map the toolkit's input selection onto X11 event mask bits
pub fn x_event_mask(mask: EventMask) -> xproto::EventMask {
    let pairs = [
        (EventMask::EXPOSURE, xproto::EventMask::EXPOSURE),
        (EventMask::KEY_PRESS, xproto::EventMask::KEY_PRESS),
        (EventMask::BUTTON_PRESS, xproto::EventMask::BUTTON_PRESS),
        (EventMask::BUTTON_RELEASE, xproto::EventMask::BUTTON_RELEASE),
        (EventMask::POINTER_MOTION, xproto::EventMask::POINTER_MOTION),
        (EventMask::STRUCTURE, xproto::EventMask::STRUCTURE_NOTIFY),
    ];
    let mut x_mask = xproto::EventMask::NO_EVENT;
    for (ours, theirs) in pairs {
        if mask.contains(ours) {
            x_mask |= theirs;
        }
    }
    x_mask
}

fn clamp_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn x_rectangle(rect: Rect) -> Rectangle {
    Rectangle {
        x: clamp_i16(rect.x),
        y: clamp_i16(rect.y),
        width: clamp_u16(rect.width),
        height: clamp_u16(rect.height),
    }
}

/// Encode a Latin-1 string as PolyText8 items (at most 254 bytes each)
fn text_items(text: &[u8]) -> Vec<u8> {
    let mut items = Vec::with_capacity(text.len() + 2 * (text.len() / 254 + 1));
    for chunk in text.chunks(254) {
        items.push(chunk.len() as u8);
        items.push(0);
        items.extend_from_slice(chunk);
    }
    items
}

impl X11Surface {
    fn set_foreground(&self, gc: xproto::Gcontext, color: u32) -> Result<(), SurfaceError> {
        self.conn
            .change_gc(gc, &ChangeGCAux::new().foreground(color))
            .map_err(connection_error)?;
        Ok(())
    }

    fn font(&mut self, name: &str) -> Result<xproto::Font, SurfaceError> {
        if let Some(&font) = self.fonts.get(name) {
            return Ok(font);
        }
        let font = self.conn.generate_id().map_err(connection_error)?;
        self.conn
            .open_font(font, name.as_bytes())
            .map_err(connection_error)?
            .check()
            .map_err(|_| SurfaceError::FontUnavailable(name.to_string()))?;
        debug!(font = name, "Font opened");
        self.fonts.insert(name.to_string(), font);
        Ok(font)
    }
}

impl Drop for X11Surface {
    fn drop(&mut self) {
        for (_, font) in self.fonts.drain() {
            let _ = self.conn.close_font(font);
        }
        let _ = self.conn.flush();
    }
}

impl DrawSurface for X11Surface {
    type Target = xproto::Window;
    type Gc = xproto::Gcontext;
    type Color = u32;

    fn create_gc(
        &mut self,
        target: xproto::Window,
        style: GcStyle,
    ) -> Result<xproto::Gcontext, SurfaceError> {
        let gc = self
            .conn
            .generate_id()
            .map_err(|e| SurfaceError::ContextUnavailable(e.to_string()))?;
        self.conn
            .create_gc(
                gc,
                target,
                &CreateGCAux::new()
                    .foreground(self.black_pixel)
                    .line_width(style.line_width)
                    .line_style(xproto::LineStyle::SOLID),
            )
            .map_err(|e| SurfaceError::ContextUnavailable(e.to_string()))?;
        Ok(gc)
    }

    fn free_gc(&mut self, gc: xproto::Gcontext) {
        if let Err(err) = self.conn.free_gc(gc) {
            warn!(error = %err, "Failed to free graphics context");
        }
    }

    fn resolve_color(&mut self, name: &str) -> Result<u32, SurfaceError> {
        if let Some(&pixel) = self.colors.get(name) {
            return Ok(pixel);
        }
        let pixel = self
            .conn
            .alloc_named_color(self.colormap, name.as_bytes())
            .map_err(connection_error)?
            .reply()
            .map_err(|_| SurfaceError::UnknownColor(name.to_string()))?
            .pixel;
        self.colors.insert(name.to_string(), pixel);
        Ok(pixel)
    }

    fn draw_rect(
        &mut self,
        target: xproto::Window,
        gc: &xproto::Gcontext,
        color: u32,
        rect: Rect,
    ) -> Result<(), SurfaceError> {
        self.set_foreground(*gc, color)?;
        self.conn
            .poly_rectangle(target, *gc, &[x_rectangle(rect)])
            .map_err(connection_error)?;
        Ok(())
    }

    fn fill_rect(
        &mut self,
        target: xproto::Window,
        gc: &xproto::Gcontext,
        color: u32,
        rect: Rect,
    ) -> Result<(), SurfaceError> {
        self.set_foreground(*gc, color)?;
        self.conn
            .poly_fill_rectangle(target, *gc, &[x_rectangle(rect)])
            .map_err(connection_error)?;
        Ok(())
    }

    fn draw_text(
        &mut self,
        target: xproto::Window,
        gc: &xproto::Gcontext,
        color: u32,
        origin: Point,
        text: &str,
    ) -> Result<(), SurfaceError> {
        self.set_foreground(*gc, color)?;
        self.conn
            .poly_text8(
                target,
                *gc,
                clamp_i16(origin.x),
                clamp_i16(origin.y),
                &text_items(text.as_bytes()),
            )
            .map_err(connection_error)?;
        Ok(())
    }

    fn text_width(&mut self, font: &str, text: &str) -> Result<u32, SurfaceError> {
        let font_id = self.font(font)?;
        let chars: Vec<Char2b> = text
            .bytes()
            .map(|byte2| Char2b { byte1: 0, byte2 })
            .collect();
        let extents = self
            .conn
            .query_text_extents(font_id, &chars)
            .map_err(connection_error)?
            .reply()
            .map_err(|_| SurfaceError::FontUnavailable(font.to_string()))?;
        Ok(extents.overall_width.max(0) as u32)
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        self.conn.flush().map_err(connection_error)
    }
}

/// X11 input as an [`EventSource`]
pub struct X11Events {
    conn: Arc<RustConnection>,
    window: X11Window,
}

impl EventSource for X11Events {
    fn poll_event(&mut self, _timeout: Duration) -> Result<Option<RawEvent>, SurfaceError> {
        while let Some(event) = self.conn.poll_for_event().map_err(connection_error)? {
            if let Some(raw) = translate_x11_event(&event, &self.window) {
                return Ok(Some(raw));
            }
        }
        Ok(None)
    }
}

/// Classify an X11 event for the toolkit
///
/// Exposes are coalesced: only the last of a series (`count == 0`) asks for
/// a redraw.
pub fn translate_x11_event(event: &Event, window: &X11Window) -> Option<RawEvent> {
    match event {
        Event::Expose(e) if e.count == 0 => Some(RawEvent::Expose),
        Event::ButtonPress(e) => Some(RawEvent::ButtonPress {
            x: e.event_x.into(),
            y: e.event_y.into(),
        }),
        Event::ButtonRelease(e) => Some(RawEvent::ButtonRelease {
            x: e.event_x.into(),
            y: e.event_y.into(),
        }),
        Event::MotionNotify(e) => Some(RawEvent::Motion {
            x: e.event_x.into(),
            y: e.event_y.into(),
        }),
        Event::ConfigureNotify(e) if e.window == window.id => Some(RawEvent::Resize {
            width: e.width.into(),
            height: e.height.into(),
        }),
        Event::ClientMessage(e)
            if e.type_ == window.wm_protocols
                && e.format == 32
                && e.data.as_data32()[0] == window.wm_delete_window =>
        {
            Some(RawEvent::CloseRequested)
        }
        _ => None,
    }
}
