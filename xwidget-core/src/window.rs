//! Container that owns components and fans out draw and event calls

use std::fmt;

use tracing::{debug, warn};

use crate::component::{Component, EventOutcome};
use crate::event::EventKind;
use crate::surface::DrawSurface;

/// What happened during one `draw_components` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawReport {
    /// Components that drew successfully
    pub drawn: usize,
    /// Components skipped because realize or draw failed
    pub skipped: usize,
}

/// An ordered, append-only collection of components
///
/// Insertion order is draw order and event-dispatch order. Every component
/// sees every event; hit-testing is each component's own business.
///
/// Components hold backend resources, so a window should be finished with
/// [`AppWindow::close`] rather than dropped.
pub struct AppWindow<S: DrawSurface> {
    components: Vec<Box<dyn Component<S>>>,
}

impl<S: DrawSurface> fmt::Debug for AppWindow<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppWindow")
            .field("components", &self.components.len())
            .finish()
    }
}

impl<S: DrawSurface> Default for AppWindow<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DrawSurface> AppWindow<S> {
    /// Create an empty window
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Take ownership of a component and append it
    pub fn add_component<C>(&mut self, component: C)
    where
        C: Component<S> + 'static,
    {
        self.add_boxed(Box::new(component));
    }

    /// Append an already boxed component
    pub fn add_boxed(&mut self, component: Box<dyn Component<S>>) {
        debug!(
            component = component.name(),
            index = self.components.len(),
            "Component added"
        );
        self.components.push(component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components in insertion order
    pub fn components(&self) -> impl Iterator<Item = &dyn Component<S>> + '_ {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Realize (first time only) and draw every component in insertion order
    ///
    /// A component whose realize or draw fails is logged and skipped; the
    /// remaining components still draw.
    pub fn draw_components(&mut self, surface: &mut S, target: S::Target) -> DrawReport {
        let mut report = DrawReport::default();

        for component in &mut self.components {
            let result = if component.is_realized() {
                component.draw(surface, target)
            } else {
                component
                    .realize(surface, target)
                    .and_then(|()| component.draw(surface, target))
            };

            match result {
                Ok(()) => report.drawn += 1,
                Err(err) => {
                    warn!(
                        component = component.name(),
                        error = %err,
                        cause = ?std::error::Error::source(&err).map(|s| s.to_string()),
                        "Draw skipped"
                    );
                    report.skipped += 1;
                }
            }
        }

        report
    }

    /// Deliver one event to every component in insertion order
    ///
    /// There is no consumption: a component handling the event does not stop
    /// it from reaching the rest.
    pub fn handle_component_event(&mut self, surface: &mut S, event: &EventKind) -> EventOutcome {
        let mut outcome = EventOutcome::ignored();
        for component in &mut self.components {
            outcome.merge(component.handle_event(event, surface));
        }
        outcome
    }

    /// Release every component's resources and drop them
    pub fn close(mut self, surface: &mut S) {
        debug!(components = self.components.len(), "Closing window");
        for component in &mut self.components {
            component.release(surface);
        }
        self.components.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::testing::{pointer_move, press, CallLog, LoggingComponent, RecordingSurface};

    fn window_with_loggers(log: &CallLog, names: &[&str]) -> AppWindow<RecordingSurface> {
        let mut window = AppWindow::new();
        for (i, name) in names.iter().enumerate() {
            let x = i as i32 * 10;
            window.add_component(LoggingComponent::new(*name, Rect::new(x, 0, 5, 5), log));
        }
        window
    }

    #[test]
    fn test_draw_visits_in_insertion_order() {
        let log = CallLog::default();
        let mut window = window_with_loggers(&log, &["a", "b", "c"]);
        let mut surface = RecordingSurface::new();

        let report = window.draw_components(&mut surface, RecordingSurface::WINDOW);

        assert_eq!(report, DrawReport { drawn: 3, skipped: 0 });
        assert_eq!(
            log.take(),
            vec![
                "a:realize",
                "a:draw",
                "b:realize",
                "b:draw",
                "c:realize",
                "c:draw",
            ]
        );

        window.draw_components(&mut surface, RecordingSurface::WINDOW);
        assert_eq!(log.take(), vec!["a:draw", "b:draw", "c:draw"]);
    }

    #[test]
    fn test_events_reach_every_component_regardless_of_hit() {
        let log = CallLog::default();
        let mut window = window_with_loggers(&log, &["a", "b", "c"]);
        let mut surface = RecordingSurface::new();

        // Only "a" contains this point, everyone still sees it.
        window.handle_component_event(&mut surface, &pointer_move(1, 1));
        window.handle_component_event(&mut surface, &press(500, 500));

        assert_eq!(
            log.take(),
            vec![
                "a:PointerMove",
                "b:PointerMove",
                "c:PointerMove",
                "a:ButtonPress",
                "b:ButtonPress",
                "c:ButtonPress",
            ]
        );
    }

    #[test]
    fn test_outcomes_are_merged() {
        let log = CallLog::default();
        let mut window = window_with_loggers(&log, &["a", "b"]);
        let mut surface = RecordingSurface::new();

        let outcome = window.handle_component_event(&mut surface, &press(1, 1));

        assert_eq!(outcome.signals.len(), 1);
        assert!(!outcome.needs_render);
    }

    #[test]
    fn test_failed_component_does_not_stop_others() {
        let log = CallLog::default();
        let mut window = AppWindow::new();
        window.add_component(LoggingComponent::new("a", Rect::new(0, 0, 1, 1), &log));
        window.add_component(LoggingComponent::new("bad", Rect::new(0, 0, 1, 1), &log).failing());
        window.add_component(LoggingComponent::new("c", Rect::new(0, 0, 1, 1), &log));
        let mut surface = RecordingSurface::new();

        let report = window.draw_components(&mut surface, RecordingSurface::WINDOW);

        assert_eq!(report, DrawReport { drawn: 2, skipped: 1 });
        assert!(log.take().contains(&"c:draw".to_string()));
    }

    #[test]
    fn test_close_releases_in_order() {
        let log = CallLog::default();
        let window = window_with_loggers(&log, &["a", "b"]);
        let mut surface = RecordingSurface::new();

        window.close(&mut surface);

        assert_eq!(log.take(), vec!["a:release", "b:release"]);
    }

    #[test]
    fn test_empty_window() {
        let mut window: AppWindow<RecordingSurface> = AppWindow::new();
        let mut surface = RecordingSurface::new();

        assert!(window.is_empty());
        assert_eq!(
            window.draw_components(&mut surface, RecordingSurface::WINDOW),
            DrawReport::default()
        );
        let outcome =
            window.handle_component_event(&mut surface, &EventKind::PointerMove(Point::new(0, 0)));
        assert_eq!(outcome, EventOutcome::ignored());
    }
}
