//! Core traits and types for xwidget
//!
//! This crate provides the abstractions for building small pointer-driven
//! widget windows: components draw themselves onto a [`DrawSurface`] and
//! react to classified input events, while an [`AppWindow`] fans the events
//! out and a [`Runtime`] drives the loop.
//!
//! # Core Concepts
//!
//! - **DrawSurface**: Backend that owns the display connection and draws
//! - **Component**: Element with bounds that draws and handles events
//! - **AppWindow**: Ordered collection of components
//! - **Runtime**: Channel-fed event loop with cancellation
//!
//! # Basic Example
//!
//! ```
//! use xwidget_core::prelude::*;
//! use xwidget_core::testing::{CallLog, LoggingComponent, RecordingSurface};
//!
//! let log = CallLog::default();
//! let mut window = AppWindow::new();
//! window.add_component(LoggingComponent::new("widget", Rect::new(0, 0, 10, 10), &log));
//!
//! let mut runtime = Runtime::new(window, RecordingSurface::new(), RecordingSurface::WINDOW);
//! let _ = runtime.dispatch(RawEvent::Expose);
//! runtime.render_if_needed();
//!
//! assert_eq!(log.take(), vec!["widget:realize", "widget:draw"]);
//! ```
//!
//! Events are handled one at a time, to completion, on the loop's task. A
//! component is free to mutate its own state in `handle_event` and the
//! next event sees the result.

pub mod backend;
pub mod bus;
pub mod component;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod runtime;
pub mod surface;
pub mod testing;
pub mod window;

// Core trait exports
pub use component::{Component, EventOutcome, HitRegion, Signal};
pub use surface::{DrawSurface, GcStyle};

// Geometry and event exports
pub use event::{EventKind, EventMask};
pub use geometry::{Point, Rect};

// Event system exports
pub use bus::{process_raw_event, spawn_event_poller, EventSource, RawEvent};
pub use runtime::{PollerConfig, Runtime};
pub use window::{AppWindow, DrawReport};

// Configuration and errors
pub use config::{ButtonBarConfig, ToolkitConfig, WindowConfig};
pub use error::{ConfigError, DrawError, StartupError, SurfaceError};

// Testing exports
pub use testing::{buffer_to_string_plain, RecordingSurface};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bus::{process_raw_event, spawn_event_poller, EventSource, RawEvent};
    pub use crate::component::{Component, EventOutcome, HitRegion, Signal};
    pub use crate::config::{ButtonBarConfig, ToolkitConfig, WindowConfig};
    pub use crate::error::{ConfigError, DrawError, StartupError, SurfaceError};
    pub use crate::event::{EventKind, EventMask};
    pub use crate::geometry::{Point, Rect};
    pub use crate::runtime::{PollerConfig, Runtime};
    pub use crate::surface::{DrawSurface, GcStyle};
    pub use crate::window::{AppWindow, DrawReport};
}
