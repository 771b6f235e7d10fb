//! Pre-built widgets for xwidget
//!
//! Components implement [`Component<S>`](xwidget_core::Component) for any
//! [`DrawSurface`] and report interaction through returned signals.
//!
//! # Components
//!
//! - [`Button`] - Labelled push button with hover highlighting
//!
//! # Example
//!
//! ```
//! use xwidget_components::{button_bar, Button};
//! use xwidget_core::testing::RecordingSurface;
//! use xwidget_core::ButtonBarConfig;
//!
//! let mut surface = RecordingSurface::new();
//! let mut window = button_bar::<RecordingSurface>(&ButtonBarConfig::default());
//! window.draw_components(&mut surface, RecordingSurface::WINDOW);
//!
//! assert_eq!(surface.texts(), vec!["File", "Edit", "Help", "About"]);
//! ```

mod button;

pub use button::{
    Button, ButtonVisualState, ColorScheme, SchemeNames, DEFAULT_FONT, DEFAULT_VERTICAL_MARGIN,
    HORIZONTAL_MARGIN,
};

use tracing::debug;
use xwidget_core::{AppWindow, ButtonBarConfig, DrawSurface};

/// Build a window holding one [`Button`] per configured label
///
/// Button `i` sits at `(i * spacing, y)` with the configured nominal size,
/// margin, font and hit region. The default config keeps
/// [`HitRegion::Nominal`](xwidget_core::HitRegion::Nominal), under which the
/// stock width-0 buttons are only hit on their left edge.
pub fn button_bar<S>(config: &ButtonBarConfig) -> AppWindow<S>
where
    S: DrawSurface + 'static,
{
    let mut window = AppWindow::new();
    for (label, x) in config.placements() {
        let button = Button::new(x, config.y, config.width, config.height, label)
            .with_vertical_margin(config.vertical_margin)
            .with_font(config.font.as_str())
            .with_hit_region(config.hit_region);
        window.add_component(button);
    }
    debug!(buttons = window.len(), hit_region = ?config.hit_region, "Button bar assembled");
    window
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{button_bar, Button, ButtonVisualState, ColorScheme};
}

#[cfg(test)]
mod tests {
    use super::*;
    use xwidget_core::testing::{pointer_move, RecordingSurface};
    use xwidget_core::{HitRegion, Signal};

    #[test]
    fn test_button_bar_layout() {
        let window = button_bar::<RecordingSurface>(&ButtonBarConfig::default());
        let layout: Vec<_> = window
            .components()
            .map(|c| (c.name().to_string(), c.bounds()))
            .collect();

        assert_eq!(
            layout,
            vec![
                ("File".to_string(), xwidget_core::Rect::new(0, 0, 0, 24)),
                ("Edit".to_string(), xwidget_core::Rect::new(37, 0, 0, 24)),
                ("Help".to_string(), xwidget_core::Rect::new(74, 0, 0, 24)),
                ("About".to_string(), xwidget_core::Rect::new(111, 0, 0, 24)),
            ]
        );
    }

    #[test]
    fn test_default_button_bar_misses_pointer_inside_labels() {
        let mut surface = RecordingSurface::new();
        let mut window = button_bar::<RecordingSurface>(&ButtonBarConfig::default());
        window.draw_components(&mut surface, RecordingSurface::WINDOW);

        let outcome = window.handle_component_event(&mut surface, &pointer_move(5, 5));
        assert!(outcome.signals.is_empty());
        assert!(!outcome.needs_render);

        let outcome = window.handle_component_event(&mut surface, &pointer_move(37, 5));
        assert_eq!(outcome.signals, vec![Signal::Hovered("Edit".into())]);
    }

    #[test]
    fn test_button_bar_hover_reaches_first_button_only() {
        let config = ButtonBarConfig {
            hit_region: HitRegion::Rendered,
            ..ButtonBarConfig::default()
        };
        let mut surface = RecordingSurface::new();
        let mut window = button_bar::<RecordingSurface>(&config);
        window.draw_components(&mut surface, RecordingSurface::WINDOW);

        let outcome = window.handle_component_event(&mut surface, &pointer_move(5, 5));

        assert_eq!(outcome.signals, vec![Signal::Hovered("File".into())]);
        assert!(outcome.needs_render);
    }
}
