//! xwidget: a minimal widget toolkit for X11 and terminals
//!
//! Components draw through a [`DrawSurface`] and receive classified pointer
//! events from a single-threaded loop. The same components run on a real X11
//! window or inside a terminal.
//!
//! # Example
//! ```no_run
//! use xwidget::prelude::*;
//! use xwidget::backend::terminal::{TerminalEvents, TerminalSurface};
//! use ratatui::{backend::CrosstermBackend, Terminal};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
//! let surface = TerminalSurface::new(terminal)?;
//! let window = button_bar(&ButtonBarConfig::default());
//!
//! Runtime::new(window, surface, Screen).run(TerminalEvents::new()).await;
//! # Ok(())
//! # }
//! ```

// Re-export everything from core
pub use xwidget_core::*;

// Re-export components
pub use xwidget_components::{
    button_bar, Button, ButtonVisualState, ColorScheme, SchemeNames, HORIZONTAL_MARGIN,
};

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use xwidget_core::{Component, DrawSurface, EventSource};

    // Events
    pub use xwidget_core::{
        process_raw_event, spawn_event_poller, EventKind, EventMask, EventOutcome, RawEvent, Signal,
    };

    // Window and loop
    pub use xwidget_core::{AppWindow, DrawReport, PollerConfig, Runtime};

    // Geometry and drawing
    pub use xwidget_core::{GcStyle, HitRegion, Point, Rect};

    // Configuration and errors
    pub use xwidget_core::{
        ButtonBarConfig, ConfigError, DrawError, StartupError, SurfaceError, ToolkitConfig,
        WindowConfig,
    };

    // Terminal backend target
    pub use xwidget_core::backend::terminal::Screen;

    // Components
    pub use xwidget_components::{button_bar, Button, ButtonVisualState, ColorScheme};
}
