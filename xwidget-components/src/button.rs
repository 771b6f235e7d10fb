//! Push button with hover highlighting

use std::fmt;

use tracing::{debug, info, trace, warn};
use xwidget_core::{
    Component, DrawError, DrawSurface, EventKind, EventOutcome, GcStyle, HitRegion, Point, Rect,
    Signal, SurfaceError,
};

/// Space added around the label, split evenly left and right
pub const HORIZONTAL_MARGIN: u32 = 12;
/// Extra height below the nominal height unless configured otherwise
pub const DEFAULT_VERTICAL_MARGIN: u32 = 0;
/// Font used to measure labels
pub const DEFAULT_FONT: &str = "fixed";
/// Baseline distance below the vertical center
const BASELINE_OFFSET: i32 = 5;

/// Appearance mode of a [`Button`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ButtonVisualState {
    /// Idle
    #[default]
    Primary,
    /// Pointer is over the button
    Secondary,
    /// Only reachable through [`Button::set_visual_state`]
    Tertiary,
}

impl ButtonVisualState {
    /// Symbolic color names for this state
    pub fn scheme_names(self) -> SchemeNames {
        match self {
            Self::Primary | Self::Tertiary => SchemeNames {
                text: "black",
                background: "white",
            },
            Self::Secondary => SchemeNames {
                text: "blue",
                background: "yellow",
            },
        }
    }
}

/// Color names before resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeNames {
    pub text: &'static str,
    pub background: &'static str,
}

/// Resolved text and background colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme<C> {
    pub text: C,
    pub background: C,
}

impl<C> ColorScheme<C> {
    /// Resolve the color pair for `state` on `surface`.
    pub fn resolve<S>(surface: &mut S, state: ButtonVisualState) -> Result<Self, SurfaceError>
    where
        S: DrawSurface<Color = C>,
    {
        let names = state.scheme_names();
        Ok(Self {
            text: surface.resolve_color(names.text)?,
            background: surface.resolve_color(names.background)?,
        })
    }
}

struct ButtonResources<S: DrawSurface> {
    gc: S::Gc,
    scheme: ColorScheme<S::Color>,
    /// State `scheme` was resolved for
    scheme_state: ButtonVisualState,
}

/// A labelled button
///
/// The button is painted as a bordered box sized to its label. Moving the
/// pointer over it switches to the `Secondary` scheme; pressing and
/// releasing inside it is reported as a [`Signal`] but leaves the visual
/// state alone.
///
/// # Hit testing
///
/// With [`HitRegion::Nominal`] (the default) the button tests against the
/// rectangle it was built with. A button built with width 0 is then only
/// hit on the vertical line at its `x`. [`HitRegion::Rendered`] tests
/// against the painted box once the label has been measured.
pub struct Button<S: DrawSurface> {
    bounds: Rect,
    text: String,
    visual_state: ButtonVisualState,
    vertical_margin: u32,
    font: String,
    hit_region: HitRegion,
    resources: Option<ButtonResources<S>>,
    measured_width: Option<u32>,
}

impl<S: DrawSurface> fmt::Debug for Button<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("bounds", &self.bounds)
            .field("text", &self.text)
            .field("visual_state", &self.visual_state)
            .field("hit_region", &self.hit_region)
            .field("resources_ready", &self.resources_ready())
            .field("measured_width", &self.measured_width)
            .finish()
    }
}

impl<S: DrawSurface> Button<S> {
    pub fn new(x: i32, y: i32, width: u32, height: u32, text: impl Into<String>) -> Self {
        Self::from_rect(Rect::new(x, y, width, height), text)
    }

    pub fn from_rect(bounds: Rect, text: impl Into<String>) -> Self {
        Self {
            bounds,
            text: text.into(),
            visual_state: ButtonVisualState::default(),
            vertical_margin: DEFAULT_VERTICAL_MARGIN,
            font: DEFAULT_FONT.to_string(),
            hit_region: HitRegion::default(),
            resources: None,
            measured_width: None,
        }
    }

    pub fn with_vertical_margin(mut self, margin: u32) -> Self {
        self.vertical_margin = margin;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_hit_region(mut self, hit_region: HitRegion) -> Self {
        self.hit_region = hit_region;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn visual_state(&self) -> ButtonVisualState {
        self.visual_state
    }

    /// Colors in use, once realized
    pub fn color_scheme(&self) -> Option<ColorScheme<S::Color>> {
        self.resources.as_ref().map(|r| r.scheme)
    }

    /// Whether the drawing context and color scheme exist
    pub fn resources_ready(&self) -> bool {
        self.resources.is_some()
    }

    /// Label width from the most recent draw
    pub fn measured_width(&self) -> Option<u32> {
        self.measured_width
    }

    /// The filled box painted by the last draw
    pub fn rendered_rect(&self) -> Option<Rect> {
        self.measured_width.map(|width| {
            Rect::new(
                self.bounds.x,
                self.bounds.y,
                width.saturating_add(HORIZONTAL_MARGIN),
                self.bounds.height.saturating_add(self.vertical_margin),
            )
        })
    }

    /// Rectangle pointer events are tested against
    pub fn hit_rect(&self) -> Rect {
        match self.hit_region {
            HitRegion::Nominal => self.bounds,
            HitRegion::Rendered => self.rendered_rect().unwrap_or(self.bounds),
        }
    }

    /// Inclusive containment test against [`Button::hit_rect`]
    pub fn hit_test(&self, point: Point) -> bool {
        self.hit_rect().contains_inclusive(point)
    }

    /// Switch visual state, re-resolving the color scheme if realized.
    ///
    /// Returns whether the state changed. If the new colors cannot be
    /// resolved the previous scheme stays in use until a later draw
    /// resolves them.
    pub fn set_visual_state(&mut self, surface: &mut S, state: ButtonVisualState) -> bool {
        if state == self.visual_state {
            return false;
        }
        debug!(label = %self.text, from = ?self.visual_state, to = ?state, "Visual state changed");
        self.visual_state = state;
        self.sync_scheme(surface);
        true
    }

    /// Bring the scheme in line with the visual state, if realized and stale.
    fn sync_scheme(&mut self, surface: &mut S) {
        let state = self.visual_state;
        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        if resources.scheme_state == state {
            return;
        }
        match ColorScheme::resolve(surface, state) {
            Ok(scheme) => {
                resources.scheme = scheme;
                resources.scheme_state = state;
            }
            Err(err) => warn!(
                label = %self.text,
                state = ?state,
                error = %err,
                "Color scheme unavailable, keeping previous colors"
            ),
        }
    }

    fn measure_label(&self, surface: &mut S) -> u32 {
        match surface
            .text_width(&self.font, &self.text)
            .map_err(DrawError::Measurement)
        {
            Ok(width) => width,
            Err(err) => {
                warn!(
                    label = %self.text,
                    font = %self.font,
                    error = %err,
                    cause = ?std::error::Error::source(&err).map(|s| s.to_string()),
                    "Using zero label width"
                );
                0
            }
        }
    }
}

impl<S: DrawSurface> Component<S> for Button<S> {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn name(&self) -> &str {
        &self.text
    }

    fn realize(&mut self, surface: &mut S, target: S::Target) -> Result<(), DrawError> {
        if self.resources.is_some() {
            return Ok(());
        }

        let gc = surface
            .create_gc(target, GcStyle::default())
            .map_err(DrawError::ResourceInit)?;
        let scheme = match ColorScheme::resolve(surface, self.visual_state) {
            Ok(scheme) => scheme,
            Err(err) => {
                surface.free_gc(gc);
                return Err(DrawError::ResourceInit(err));
            }
        };

        debug!(label = %self.text, "Button resources created");
        self.resources = Some(ButtonResources {
            gc,
            scheme,
            scheme_state: self.visual_state,
        });
        Ok(())
    }

    fn is_realized(&self) -> bool {
        self.resources_ready()
    }

    fn draw(&mut self, surface: &mut S, target: S::Target) -> Result<(), DrawError> {
        self.realize(surface, target)?;
        self.sync_scheme(surface);

        let text_width = self.measure_label(surface);
        self.measured_width = Some(text_width);

        let Some(resources) = self.resources.as_ref() else {
            return Err(DrawError::ResourceInit(SurfaceError::ContextUnavailable(
                "button resources missing after realize".into(),
            )));
        };
        let ColorScheme { text, background } = resources.scheme;
        let Rect {
            x,
            y,
            width: _,
            height,
        } = self.bounds;
        let box_width = text_width.saturating_add(HORIZONTAL_MARGIN);
        let box_height = height.saturating_add(self.vertical_margin);

        let border = Rect::new(
            x.saturating_sub(1),
            y.saturating_sub(1),
            box_width.saturating_add(1),
            box_height.saturating_add(1),
        );
        let fill = Rect::new(x, y, box_width, box_height);
        let baseline = Point::new(
            x.saturating_add((HORIZONTAL_MARGIN / 2) as i32),
            y.saturating_add((height / 2) as i32).saturating_add(BASELINE_OFFSET),
        );

        surface
            .draw_rect(target, &resources.gc, text, border)
            .and_then(|()| surface.fill_rect(target, &resources.gc, background, fill))
            .and_then(|()| surface.draw_text(target, &resources.gc, text, baseline, &self.text))
            .and_then(|()| surface.flush())
            .map_err(DrawError::Render)?;

        trace!(label = %self.text, width = box_width, state = ?self.visual_state, "Button drawn");
        Ok(())
    }

    fn handle_event(&mut self, event: &EventKind, surface: &mut S) -> EventOutcome {
        match *event {
            EventKind::ButtonPress(point) if self.hit_test(point) => {
                info!(label = %self.text, x = point.x, y = point.y, "Button pressed");
                Signal::Pressed(self.text.clone()).into()
            }
            EventKind::ButtonRelease(point) if self.hit_test(point) => {
                info!(label = %self.text, x = point.x, y = point.y, "Button released");
                Signal::Released(self.text.clone()).into()
            }
            EventKind::PointerMove(point) => {
                let next = if self.hit_test(point) {
                    ButtonVisualState::Secondary
                } else {
                    ButtonVisualState::Primary
                };
                if !self.set_visual_state(surface, next) {
                    return EventOutcome::ignored();
                }
                if next == ButtonVisualState::Secondary {
                    trace!(label = %self.text, x = point.x, y = point.y, "Pointer entered");
                    EventOutcome::signal(Signal::Hovered(self.text.clone())).with_render()
                } else {
                    EventOutcome::needs_render()
                }
            }
            _ => EventOutcome::ignored(),
        }
    }

    fn release(&mut self, surface: &mut S) {
        if let Some(resources) = self.resources.take() {
            surface.free_gc(resources.gc);
            debug!(label = %self.text, "Button resources released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xwidget_core::testing::{pointer_move, press, release, DrawOp, RecordingSurface};

    const WINDOW: xwidget_core::testing::RecordedTarget = RecordingSurface::WINDOW;

    fn button(x: i32, y: i32, width: u32, height: u32, text: &str) -> Button<RecordingSurface> {
        Button::new(x, y, width, height, text)
    }

    fn scheme(text: u32, background: u32) -> Option<ColorScheme<u32>> {
        Some(ColorScheme { text, background })
    }

    #[test]
    fn test_context_created_once_across_draws() {
        let mut surface = RecordingSurface::new();
        let mut file = button(0, 0, 0, 24, "File");

        for _ in 0..5 {
            file.draw(&mut surface, WINDOW).unwrap();
        }

        assert_eq!(surface.gc_creations(), 1);
        assert_eq!(surface.count(|op| matches!(op, DrawOp::Flush)), 5);
        assert_eq!(surface.texts(), vec!["File"; 5]);
        assert!(file.resources_ready());
    }

    #[test]
    fn test_realize_is_idempotent() {
        let mut surface = RecordingSurface::new();
        let mut file = button(0, 0, 0, 24, "File");

        file.realize(&mut surface, WINDOW).unwrap();
        file.realize(&mut surface, WINDOW).unwrap();
        file.draw(&mut surface, WINDOW).unwrap();

        assert_eq!(surface.gc_creations(), 1);
    }

    #[test]
    fn test_draw_geometry() {
        let mut surface = RecordingSurface::new();
        let mut edit = button(37, 0, 0, 24, "Edit");
        edit.draw(&mut surface, WINDOW).unwrap();

        let ops: Vec<_> = surface
            .take_ops()
            .into_iter()
            .filter(|op| {
                matches!(
                    op,
                    DrawOp::DrawRect { .. } | DrawOp::FillRect { .. } | DrawOp::DrawText { .. }
                )
            })
            .collect();

        assert_eq!(
            ops,
            vec![
                DrawOp::DrawRect {
                    gc: 1,
                    color: 0x000000,
                    rect: Rect::new(36, -1, 37, 25),
                },
                DrawOp::FillRect {
                    gc: 1,
                    color: 0xffffff,
                    rect: Rect::new(37, 0, 36, 24),
                },
                DrawOp::DrawText {
                    gc: 1,
                    color: 0x000000,
                    origin: Point::new(43, 17),
                    text: "Edit".into(),
                },
            ]
        );
        assert_eq!(edit.measured_width(), Some(24));
        assert_eq!(edit.rendered_rect(), Some(Rect::new(37, 0, 36, 24)));
    }

    #[test]
    fn test_vertical_margin_extends_box() {
        let mut surface = RecordingSurface::new();
        let mut help = button(0, 0, 0, 24, "Help").with_vertical_margin(4);
        help.draw(&mut surface, WINDOW).unwrap();

        assert_eq!(
            surface.count(|op| matches!(
                op,
                DrawOp::FillRect { rect, .. } if *rect == Rect::new(0, 0, 36, 28)
            )),
            1
        );
    }

    #[test]
    fn test_consecutive_draws_are_identical() {
        let mut surface = RecordingSurface::new();
        let mut about = button(111, 0, 0, 24, "About");

        about.draw(&mut surface, WINDOW).unwrap();
        surface.take_ops();

        about.draw(&mut surface, WINDOW).unwrap();
        let first = surface.take_ops();
        let first_scheme = about.color_scheme();
        let first_width = about.measured_width();

        about.draw(&mut surface, WINDOW).unwrap();
        let second = surface.take_ops();

        assert_eq!(first, second);
        assert_eq!(about.color_scheme(), first_scheme);
        assert_eq!(about.measured_width(), first_width);
    }

    #[test]
    fn test_hit_test_inclusive_bounds() {
        let b = button(10, 10, 50, 24, "x");

        assert!(b.hit_test(Point::new(10, 10)));
        assert!(b.hit_test(Point::new(60, 34)));
        assert!(!b.hit_test(Point::new(9, 10)));
        assert!(!b.hit_test(Point::new(61, 10)));
    }

    #[test]
    fn test_pointer_move_switches_scheme() {
        let mut surface = RecordingSurface::new();
        let mut b = button(10, 10, 50, 24, "x");
        b.draw(&mut surface, WINDOW).unwrap();
        assert_eq!(b.color_scheme(), scheme(0x000000, 0xffffff));

        let outcome = b.handle_event(&pointer_move(10, 10), &mut surface);
        assert_eq!(b.visual_state(), ButtonVisualState::Secondary);
        assert_eq!(b.color_scheme(), scheme(0x0000ff, 0xffff00));
        assert!(outcome.needs_render);
        assert_eq!(outcome.signals, vec![Signal::Hovered("x".into())]);

        let outcome = b.handle_event(&pointer_move(61, 10), &mut surface);
        assert_eq!(b.visual_state(), ButtonVisualState::Primary);
        assert_eq!(b.color_scheme(), scheme(0x000000, 0xffffff));
        assert!(outcome.needs_render);
        assert!(outcome.signals.is_empty());

        let outcome = b.handle_event(&pointer_move(200, 200), &mut surface);
        assert_eq!(outcome, EventOutcome::ignored());
    }

    #[test]
    fn test_state_change_before_realize_defers_colors() {
        let mut surface = RecordingSurface::new();
        let mut b = button(0, 0, 10, 10, "x");

        b.handle_event(&pointer_move(5, 5), &mut surface);
        assert_eq!(b.visual_state(), ButtonVisualState::Secondary);
        assert_eq!(b.color_scheme(), None);

        b.draw(&mut surface, WINDOW).unwrap();
        assert_eq!(b.color_scheme(), scheme(0x0000ff, 0xffff00));
    }

    #[test]
    fn test_press_and_release_report_without_state_change() {
        let mut surface = RecordingSurface::new();
        let mut b = button(0, 0, 40, 24, "File");

        let pressed = b.handle_event(&press(20, 12), &mut surface);
        let released = b.handle_event(&release(20, 12), &mut surface);
        let elsewhere = b.handle_event(&press(100, 12), &mut surface);

        assert_eq!(pressed.signals, vec![Signal::Pressed("File".into())]);
        assert_eq!(released.signals, vec![Signal::Released("File".into())]);
        assert!(!pressed.needs_render && !released.needs_render);
        assert_eq!(elsewhere, EventOutcome::ignored());
        assert_eq!(b.visual_state(), ButtonVisualState::Primary);
    }

    #[test]
    fn test_nominal_zero_width_region_is_a_vertical_line() {
        // Buttons are assembled with width 0; the nominal region is the line x == 0.
        let mut surface = RecordingSurface::new();
        let mut file = button(0, 0, 0, 24, "File");
        file.draw(&mut surface, WINDOW).unwrap();

        assert!(file.hit_test(Point::new(0, 5)));
        assert!(!file.hit_test(Point::new(5, 5)));

        file.handle_event(&pointer_move(5, 5), &mut surface);
        assert_eq!(file.visual_state(), ButtonVisualState::Primary);
    }

    #[test]
    fn test_rendered_region_follows_painted_box() {
        let mut surface = RecordingSurface::new();
        let mut file = button(0, 0, 0, 24, "File").with_hit_region(HitRegion::Rendered);

        // No measurement yet: falls back to the nominal rectangle.
        assert!(!file.hit_test(Point::new(5, 5)));

        file.draw(&mut surface, WINDOW).unwrap();
        assert_eq!(file.hit_rect(), Rect::new(0, 0, 36, 24));
        assert!(file.hit_test(Point::new(5, 5)));
        assert!(file.hit_test(Point::new(36, 24)));
        assert!(!file.hit_test(Point::new(37, 5)));

        file.handle_event(&pointer_move(5, 5), &mut surface);
        assert_eq!(file.visual_state(), ButtonVisualState::Secondary);
    }

    #[test]
    fn test_measurement_failure_uses_zero_width() {
        let mut surface = RecordingSurface::new().without_font("fixed");
        let mut b = button(0, 0, 0, 24, "File");

        b.draw(&mut surface, WINDOW).unwrap();

        assert_eq!(b.measured_width(), Some(0));
        assert_eq!(
            surface.count(|op| matches!(
                op,
                DrawOp::FillRect { rect, .. } if *rect == Rect::new(0, 0, 12, 24)
            )),
            1
        );
        assert_eq!(surface.texts(), vec!["File"]);
    }

    #[test]
    fn test_custom_font_is_measured() {
        let mut surface = RecordingSurface::new().with_font("9x15", 9);
        let mut b = button(0, 0, 0, 24, "Help").with_font("9x15");

        b.draw(&mut surface, WINDOW).unwrap();

        assert_eq!(b.measured_width(), Some(36));
    }

    #[test]
    fn test_unresolvable_hover_colors_keep_previous_scheme() {
        let mut surface = RecordingSurface::new();
        let mut b = button(0, 0, 10, 10, "x");
        b.draw(&mut surface, WINDOW).unwrap();
        surface.set_color("blue", None);

        let outcome = b.handle_event(&pointer_move(5, 5), &mut surface);

        assert_eq!(b.visual_state(), ButtonVisualState::Secondary);
        assert_eq!(b.color_scheme(), scheme(0x000000, 0xffffff));
        assert!(outcome.needs_render);
        b.draw(&mut surface, WINDOW).unwrap();
    }

    #[test]
    fn test_stale_scheme_is_resolved_on_next_draw() {
        let mut surface = RecordingSurface::new();
        let mut b = button(0, 0, 10, 10, "x");
        b.draw(&mut surface, WINDOW).unwrap();

        surface.set_color("blue", None);
        b.handle_event(&pointer_move(5, 5), &mut surface);
        surface.set_color("blue", Some(0x0000ff));
        let outcome = b.handle_event(&pointer_move(6, 6), &mut surface);

        assert_eq!(outcome, EventOutcome::ignored());
        assert_eq!(b.color_scheme(), scheme(0x000000, 0xffffff));

        b.draw(&mut surface, WINDOW).unwrap();

        assert_eq!(b.visual_state(), ButtonVisualState::Secondary);
        assert_eq!(b.color_scheme(), scheme(0x0000ff, 0xffff00));
        assert_eq!(
            surface.count(|op| matches!(op, DrawOp::FillRect { color: 0xffff00, .. })),
            1
        );
    }

    #[test]
    fn test_context_failure_is_retried_on_next_draw() {
        let mut surface = RecordingSurface::new();
        surface.set_fail_gc(true);
        let mut b = button(0, 0, 0, 24, "File");

        let err = b.draw(&mut surface, WINDOW).unwrap_err();
        assert!(matches!(err, DrawError::ResourceInit(_)));
        assert!(!b.resources_ready());
        assert!(surface.texts().is_empty());

        surface.set_fail_gc(false);
        b.draw(&mut surface, WINDOW).unwrap();
        assert!(b.resources_ready());
        assert_eq!(surface.gc_creations(), 1);
    }

    #[test]
    fn test_color_failure_during_realize_frees_context() {
        let mut surface = RecordingSurface::new().without_color("white");
        let mut b = button(0, 0, 0, 24, "File");

        let err = b.realize(&mut surface, WINDOW).unwrap_err();
        assert!(matches!(
            err,
            DrawError::ResourceInit(SurfaceError::UnknownColor(ref name)) if name == "white"
        ));
        assert_eq!(surface.live_gcs(), 0);

        surface.set_color("white", Some(0xffffff));
        b.draw(&mut surface, WINDOW).unwrap();
        assert_eq!(surface.live_gcs(), 1);
    }

    #[test]
    fn test_tertiary_only_through_setter() {
        let mut surface = RecordingSurface::new();
        let mut b = button(0, 0, 10, 10, "x");
        b.draw(&mut surface, WINDOW).unwrap();

        for event in [
            press(5, 5),
            pointer_move(5, 5),
            release(5, 5),
            pointer_move(50, 50),
        ] {
            b.handle_event(&event, &mut surface);
            assert_ne!(b.visual_state(), ButtonVisualState::Tertiary);
        }

        assert!(b.set_visual_state(&mut surface, ButtonVisualState::Tertiary));
        assert!(!b.set_visual_state(&mut surface, ButtonVisualState::Tertiary));
        assert_eq!(b.color_scheme(), scheme(0x000000, 0xffffff));

        b.handle_event(&pointer_move(50, 50), &mut surface);
        assert_eq!(b.visual_state(), ButtonVisualState::Primary);
    }

    #[test]
    fn test_release_frees_context_once() {
        let mut surface = RecordingSurface::new();
        let mut b = button(0, 0, 0, 24, "File");
        b.draw(&mut surface, WINDOW).unwrap();

        b.release(&mut surface);
        b.release(&mut surface);

        assert_eq!(surface.live_gcs(), 0);
        assert_eq!(surface.count(|op| matches!(op, DrawOp::FreeGc { .. })), 1);
        assert!(!b.resources_ready());
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!(
            ButtonVisualState::Secondary.scheme_names(),
            SchemeNames {
                text: "blue",
                background: "yellow"
            }
        );
        assert_eq!(
            ButtonVisualState::Tertiary.scheme_names(),
            ButtonVisualState::Primary.scheme_names()
        );
    }
}
