//! Drawing backends
//!
//! - [`terminal`]: renders into a ratatui buffer; no display server needed
//! - `x11`: draws into a real X11 window (feature `x11`)

pub mod terminal;
#[cfg(feature = "x11")]
pub mod x11;

pub use terminal::{TerminalEvents, TerminalSurface};
#[cfg(feature = "x11")]
pub use x11::{open_window, X11Events, X11Surface, X11Window};
