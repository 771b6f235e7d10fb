//! Component trait for drawable, interactive UI elements

use serde::{Deserialize, Serialize};

use crate::error::DrawError;
use crate::event::EventKind;
use crate::geometry::Rect;
use crate::surface::DrawSurface;

/// A visual unit with a fixed screen rectangle
///
/// Components follow these rules:
/// 1. `handle_event` mutates only the component's own state and never blocks
/// 2. `draw` is idempotent: drawing twice without a state change paints the same pixels
/// 3. backend resources are created in `realize` and freed in `release`
///
/// The surface is passed into every call. A component may keep handles the
/// surface gave it (a drawing context, resolved colors) but never the
/// surface itself.
///
/// # Lifecycle
///
/// The owning [`AppWindow`](crate::AppWindow) calls `realize` before a
/// component's first draw, `draw` on every redraw, `handle_event` for every
/// input event, and `release` once when the window closes. `realize` must be
/// idempotent so a component drawn outside a window still initializes only
/// once.
///
/// # Example
///
/// ```ignore
/// use xwidget_core::{Component, DrawError, DrawSurface, EventKind, EventOutcome, Rect};
///
/// struct Spacer(Rect);
///
/// impl<S: DrawSurface> Component<S> for Spacer {
///     fn bounds(&self) -> Rect {
///         self.0
///     }
///
///     fn draw(&mut self, _surface: &mut S, _target: S::Target) -> Result<(), DrawError> {
///         Ok(())
///     }
///
///     fn handle_event(&mut self, _event: &EventKind, _surface: &mut S) -> EventOutcome {
///         EventOutcome::ignored()
///     }
/// }
/// ```
pub trait Component<S: DrawSurface> {
    /// The component's nominal rectangle in window space
    fn bounds(&self) -> Rect;

    /// Short name for log fields
    fn name(&self) -> &str {
        "component"
    }

    /// Create backend resources. Calling it again once it succeeded is a no-op.
    #[allow(unused_variables)]
    fn realize(&mut self, surface: &mut S, target: S::Target) -> Result<(), DrawError> {
        Ok(())
    }

    /// Whether `realize` has succeeded
    fn is_realized(&self) -> bool {
        true
    }

    /// Paint the current visual state onto `target`
    fn draw(&mut self, surface: &mut S, target: S::Target) -> Result<(), DrawError>;

    /// React to one classified input event
    fn handle_event(&mut self, event: &EventKind, surface: &mut S) -> EventOutcome;

    /// Free backend resources at the end of the component's life
    #[allow(unused_variables)]
    fn release(&mut self, surface: &mut S) {}
}

/// Which rectangle a component hit-tests against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitRegion {
    /// The rectangle the component was constructed with
    #[default]
    Nominal,
    /// The rectangle actually painted by the last draw
    Rendered,
}

/// Something a component wants the outside world to know about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A pointer button went down inside the component
    Pressed(String),
    /// A pointer button went up inside the component
    Released(String),
    /// The pointer entered the component
    Hovered(String),
}

/// Result of handling an event: emitted signals plus a redraw hint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Signals emitted while handling the event
    pub signals: Vec<Signal>,
    /// Whether the component's appearance changed
    pub needs_render: bool,
}

impl EventOutcome {
    /// No signals and no render.
    pub fn ignored() -> Self {
        Self::default()
    }

    /// No signals, but request a render.
    pub fn needs_render() -> Self {
        Self {
            signals: Vec::new(),
            needs_render: true,
        }
    }

    /// Wrap a single signal.
    pub fn signal(signal: Signal) -> Self {
        Self {
            signals: vec![signal],
            needs_render: false,
        }
    }

    /// Mark that a render is needed.
    pub fn with_render(mut self) -> Self {
        self.needs_render = true;
        self
    }

    /// Fold another outcome into this one.
    pub fn merge(&mut self, other: EventOutcome) {
        self.signals.extend(other.signals);
        self.needs_render |= other.needs_render;
    }
}

impl From<Signal> for EventOutcome {
    fn from(signal: Signal) -> Self {
        Self::signal(signal)
    }
}

impl From<Option<Signal>> for EventOutcome {
    fn from(signal: Option<Signal>) -> Self {
        match signal {
            Some(signal) => Self::signal(signal),
            None => Self::ignored(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_accumulates() {
        let mut outcome = EventOutcome::ignored();
        outcome.merge(EventOutcome::signal(Signal::Pressed("File".into())));
        outcome.merge(EventOutcome::needs_render());
        outcome.merge(EventOutcome::from(None::<Signal>));

        assert_eq!(outcome.signals, vec![Signal::Pressed("File".into())]);
        assert!(outcome.needs_render);
    }

    #[test]
    fn test_hit_region_serde_names() {
        let parsed: HitRegion = serde_json::from_str("\"rendered\"").unwrap();
        assert_eq!(parsed, HitRegion::Rendered);
        assert_eq!(serde_json::to_string(&HitRegion::Nominal).unwrap(), "\"nominal\"");
    }
}
