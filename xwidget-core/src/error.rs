//! Error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a drawing backend.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The backend has no color with this name.
    #[error("unknown color name: {0:?}")]
    UnknownColor(String),

    /// The font could not be opened or queried.
    #[error("font not available: {0:?}")]
    FontUnavailable(String),

    /// A drawing context could not be created.
    #[error("cannot create drawing context: {0}")]
    ContextUnavailable(String),

    /// The connection to the windowing server failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Terminal or stream I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure while drawing a single component.
///
/// These never escape the container: `AppWindow` logs them and skips the
/// component for the current cycle.
#[derive(Error, Debug)]
pub enum DrawError {
    /// Drawing context or color scheme could not be set up.
    #[error("resource initialization failed")]
    ResourceInit(#[source] SurfaceError),

    /// Label width could not be measured.
    #[error("text measurement failed")]
    Measurement(#[source] SurfaceError),

    /// A drawing primitive or the final flush failed.
    #[error("render failed")]
    Render(#[source] SurfaceError),
}

/// Failure to load a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fatal failure before the event loop starts.
#[derive(Error, Debug)]
pub enum StartupError {
    /// The windowing server could not be reached.
    #[error("cannot open display: {0}")]
    Display(String),

    /// The window could not be created or configured.
    #[error("cannot create window")]
    Window(#[source] SurfaceError),

    /// The terminal could not be put into drawing mode.
    #[error("terminal setup failed")]
    Terminal(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_draw_error_keeps_source() {
        let err = DrawError::ResourceInit(SurfaceError::UnknownColor("mauve".into()));

        assert_eq!(err.to_string(), "resource initialization failed");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("unknown color name: \"mauve\"".to_string())
        );
    }

    #[test]
    fn test_io_converts_into_surface_error() {
        let err: SurfaceError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, SurfaceError::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }
}
