//! Raw backend events, their translation, and the polling task feeding the loop

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::SurfaceError;
use crate::event::EventKind;
use crate::geometry::Point;
use crate::runtime::PollerConfig;

/// Event as reported by a backend, before classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// Window contents need repainting
    Expose,
    ButtonPress { x: i32, y: i32 },
    ButtonRelease { x: i32, y: i32 },
    Motion { x: i32, y: i32 },
    /// Drawable area changed size, in the backend's native units
    Resize { width: u32, height: u32 },
    /// The user or window manager asked the window to close
    CloseRequested,
}

/// Something the event poller can pull raw events from
///
/// `poll_event` may block for up to `timeout` and returns `Ok(None)` when
/// nothing is pending.
pub trait EventSource: Send + 'static {
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>, SurfaceError>;
}

/// Spawn the event polling task with cancellation support
///
/// This spawns an async task that polls `source` and sends raw events
/// through the provided channel. The task ends when the token is cancelled,
/// the channel closes, or the source fails (after sending `CloseRequested`).
///
/// # Arguments
/// * `source` - Backend event source
/// * `tx` - Channel to send raw events
/// * `config` - Poll timeout and sleep between poll cycles
/// * `cancel_token` - Token to cancel the polling task
pub fn spawn_event_poller<E: EventSource>(
    mut source: E,
    tx: mpsc::UnboundedSender<RawEvent>,
    config: PollerConfig,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        const MAX_EVENTS_PER_BATCH: usize = 20;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("Event poller cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.loop_sleep) => {
                    for _ in 0..MAX_EVENTS_PER_BATCH {
                        match source.poll_event(config.poll_timeout) {
                            Ok(Some(raw)) => {
                                if tx.send(raw).is_err() {
                                    debug!("Event channel closed, stopping poller");
                                    return;
                                }
                            }
                            Ok(None) => break,
                            Err(err) => {
                                error!(error = %err, "Event source failed, requesting close");
                                let _ = tx.send(RawEvent::CloseRequested);
                                return;
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Classify a raw event into the kind components receive
///
/// Returns `None` for events the runtime handles itself (`Resize`,
/// `CloseRequested`).
pub fn process_raw_event(raw: RawEvent) -> Option<EventKind> {
    match raw {
        RawEvent::Expose => Some(EventKind::Expose),
        RawEvent::ButtonPress { x, y } => Some(EventKind::ButtonPress(Point::new(x, y))),
        RawEvent::ButtonRelease { x, y } => Some(EventKind::ButtonRelease(Point::new(x, y))),
        RawEvent::Motion { x, y } => Some(EventKind::PointerMove(Point::new(x, y))),
        RawEvent::Resize { .. } | RawEvent::CloseRequested => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedEvents;

    #[test]
    fn test_process_raw_event_pointer() {
        assert_eq!(
            process_raw_event(RawEvent::Motion { x: 5, y: 7 }),
            Some(EventKind::PointerMove(Point::new(5, 7)))
        );
        assert_eq!(
            process_raw_event(RawEvent::ButtonPress { x: 1, y: 2 }),
            Some(EventKind::ButtonPress(Point::new(1, 2)))
        );
        assert_eq!(
            process_raw_event(RawEvent::ButtonRelease { x: 3, y: 4 }),
            Some(EventKind::ButtonRelease(Point::new(3, 4)))
        );
    }

    #[test]
    fn test_process_raw_event_runtime_only() {
        assert_eq!(process_raw_event(RawEvent::Expose), Some(EventKind::Expose));
        assert_eq!(process_raw_event(RawEvent::CloseRequested), None);
        assert_eq!(
            process_raw_event(RawEvent::Resize {
                width: 80,
                height: 24
            }),
            None
        );
    }

    struct FailingSource;

    impl EventSource for FailingSource {
        fn poll_event(&mut self, _timeout: Duration) -> Result<Option<RawEvent>, SurfaceError> {
            Err(SurfaceError::Connection("server went away".into()))
        }
    }

    fn fast() -> PollerConfig {
        PollerConfig {
            poll_timeout: Duration::ZERO,
            loop_sleep: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_poller_forwards_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let source = ScriptedEvents::new([
            RawEvent::Expose,
            RawEvent::Motion { x: 1, y: 1 },
            RawEvent::CloseRequested,
        ]);

        let handle = spawn_event_poller(source, tx, fast(), cancel.clone());

        assert_eq!(rx.recv().await, Some(RawEvent::Expose));
        assert_eq!(rx.recv().await, Some(RawEvent::Motion { x: 1, y: 1 }));
        assert_eq!(rx.recv().await, Some(RawEvent::CloseRequested));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_poller_reports_source_failure_as_close() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_event_poller(FailingSource, tx, fast(), CancellationToken::new());

        assert_eq!(rx.recv().await, Some(RawEvent::CloseRequested));
        handle.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }
}
