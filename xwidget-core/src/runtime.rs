//! Event loop driver
//!
//! The runtime owns the window, its components and the drawing surface.
//! A poller task reads the backend and sends [`RawEvent`]s over a channel;
//! the loop handles each one to completion before taking the next, so
//! component state has a single owner and is never touched concurrently.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::bus::{process_raw_event, spawn_event_poller, EventSource, RawEvent};
use crate::component::Signal;
use crate::event::EventKind;
use crate::surface::DrawSurface;
use crate::window::{AppWindow, DrawReport};

/// Configuration for the event poller.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Timeout passed to each `EventSource::poll_event` call.
    pub poll_timeout: Duration,
    /// Sleep between poll cycles.
    pub loop_sleep: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(10),
            loop_sleep: Duration::from_millis(16),
        }
    }
}

/// Runtime helper wiring a window, a surface and an event source together.
pub struct Runtime<S: DrawSurface> {
    window: AppWindow<S>,
    surface: S,
    target: S::Target,
    poller_config: PollerConfig,
    cancel_token: CancellationToken,
    should_render: bool,
}

impl<S: DrawSurface> Runtime<S> {
    /// Create a runtime drawing `window` onto `target`.
    ///
    /// Nothing is drawn until the backend reports an expose.
    pub fn new(window: AppWindow<S>, surface: S, target: S::Target) -> Self {
        Self {
            window,
            surface,
            target,
            poller_config: PollerConfig::default(),
            cancel_token: CancellationToken::new(),
            should_render: false,
        }
    }

    /// Configure event polling behavior.
    pub fn with_event_poller(mut self, config: PollerConfig) -> Self {
        self.poller_config = config;
        self
    }

    /// Token that stops the loop when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn window(&self) -> &AppWindow<S> {
        &self.window
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Whether a redraw is pending.
    pub fn should_render(&self) -> bool {
        self.should_render
    }

    /// Handle one raw event to completion.
    ///
    /// Expose and resize schedule a redraw; pointer events go to every
    /// component; a close request breaks the loop.
    pub fn dispatch(&mut self, raw: RawEvent) -> ControlFlow<()> {
        trace!(event = ?raw, "Dispatching raw event");
        match raw {
            RawEvent::CloseRequested => {
                info!("Close requested");
                return ControlFlow::Break(());
            }
            RawEvent::Resize { width, height } => {
                self.surface.resized(width, height);
                self.should_render = true;
            }
            other => match process_raw_event(other) {
                Some(EventKind::Expose) => self.should_render = true,
                Some(event) => {
                    let outcome = self.window.handle_component_event(&mut self.surface, &event);
                    for signal in &outcome.signals {
                        match signal {
                            Signal::Pressed(label) => debug!(label = %label, "Signal: pressed"),
                            Signal::Released(label) => debug!(label = %label, "Signal: released"),
                            Signal::Hovered(label) => trace!(label = %label, "Signal: hovered"),
                        }
                    }
                    self.should_render |= outcome.needs_render;
                }
                None => {}
            },
        }
        ControlFlow::Continue(())
    }

    /// Draw every component if a redraw is pending.
    pub fn render_if_needed(&mut self) -> Option<DrawReport> {
        if !self.should_render {
            return None;
        }
        self.should_render = false;
        let report = self.window.draw_components(&mut self.surface, self.target);
        debug!(drawn = report.drawn, skipped = report.skipped, "Window drawn");
        Some(report)
    }

    /// Run the event loop until a close request or cancellation.
    ///
    /// Releases every component's resources before returning the surface,
    /// so the caller can tear the backend down (restore the terminal, close
    /// the connection).
    pub async fn run<E: EventSource>(mut self, source: E) -> S {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RawEvent>();
        let poller_token = self.cancel_token.child_token();
        let _handle = spawn_event_poller(
            source,
            event_tx,
            self.poller_config,
            poller_token.clone(),
        );

        info!(components = self.window.len(), "Event loop started");

        loop {
            self.render_if_needed();

            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("Event loop cancelled");
                    break;
                }
                raw = event_rx.recv() => {
                    let Some(raw) = raw else {
                        debug!("Event channel closed");
                        break;
                    };
                    if self.dispatch(raw).is_break() {
                        break;
                    }
                }
            }
        }

        poller_token.cancel();
        self.shutdown()
    }

    /// Release the window and hand back the surface.
    pub fn shutdown(self) -> S {
        let Self {
            window,
            mut surface,
            ..
        } = self;
        window.close(&mut surface);
        info!("Event loop stopped");
        surface
    }
}
