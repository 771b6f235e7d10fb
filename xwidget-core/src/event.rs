//! Classified input events delivered to components

use bitflags::bitflags;

use crate::geometry::Point;

bitflags! {
    /// Input selection for a window, independent of the windowing backend
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const EXPOSURE = 1 << 0;
        const KEY_PRESS = 1 << 1;
        const BUTTON_PRESS = 1 << 2;
        const BUTTON_RELEASE = 1 << 3;
        const POINTER_MOTION = 1 << 4;
        const STRUCTURE = 1 << 5;

        /// Everything an interactive toolkit window selects
        const INTERACTIVE = Self::EXPOSURE.bits()
            | Self::KEY_PRESS.bits()
            | Self::BUTTON_PRESS.bits()
            | Self::BUTTON_RELEASE.bits()
            | Self::POINTER_MOTION.bits()
            | Self::STRUCTURE.bits();
    }
}

/// The event payload, with coordinates in window space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Redraw request (no coordinates)
    Expose,
    /// Pointer button pressed at a position
    ButtonPress(Point),
    /// Pointer button released at a position
    ButtonRelease(Point),
    /// Pointer moved to a position
    PointerMove(Point),
}

impl EventKind {
    /// Pointer position carried by the event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            EventKind::Expose => None,
            EventKind::ButtonPress(p) | EventKind::ButtonRelease(p) | EventKind::PointerMove(p) => {
                Some(*p)
            }
        }
    }

    /// Stable name used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Expose => "Expose",
            EventKind::ButtonPress(_) => "ButtonPress",
            EventKind::ButtonRelease(_) => "ButtonRelease",
            EventKind::PointerMove(_) => "PointerMove",
        }
    }
}
