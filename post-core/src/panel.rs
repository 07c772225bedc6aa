//! Floating panels that can be dragged by their header and resized from the
//! bottom-right corner.
//!
//! A [`Panel`] is a small gesture state machine:
//!
//! ```text
//!            down on header              up / touch end
//!   Idle ─────────────────────▶ Dragging ───────────────▶ Idle
//!   Idle ─────────────────────▶ Resizing ───────────────▶ Idle
//!            down on resize handle
//! ```
//!
//! Presses whose target path contains an interactive element never leave
//! `Idle`, so buttons and inputs inside the header keep working. Every move
//! during a gesture commits the new geometry and notifies listeners
//! immediately; consumers wanting only final values must debounce.

use crate::event::{InputEvent, PointerEvent, PointerPhase, PointerTarget, TouchEvent, TouchPhase};
use crate::geometry::{clamp_to_range, PanelGeometry, Point, Size, Viewport};

/// Side length of the square resize handle in the bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f32 = 16.0;

/// Default header (drag handle) height.
pub const DEFAULT_HEADER_HEIGHT: f32 = 28.0;

/// Configuration for a floating panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Position on mount.
    pub initial_position: Point,
    /// Size on mount.
    pub initial_size: Size,
    /// Resizing never goes below this.
    pub min_size: Size,
    /// Keep the header inside the viewport while dragging and the far edge
    /// inside it while resizing.
    pub constrain_to_viewport: bool,
    /// Height of the drag handle strip at the top of the panel.
    pub header_height: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            initial_position: Point::new(0.0, 0.0),
            initial_size: Size::new(320.0, 400.0),
            min_size: Size::new(200.0, 150.0),
            constrain_to_viewport: true,
            header_height: DEFAULT_HEADER_HEIGHT,
        }
    }
}

/// Part of the panel under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// The header strip; starts a drag.
    Header,
    /// The corner handle; starts a resize.
    ResizeHandle,
    /// Panel content.
    Body,
    /// Not on the panel.
    Outside,
}

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// No gesture in progress.
    Idle,
    /// Moving the panel.
    Dragging {
        /// Pointer position relative to the panel origin at gesture start.
        offset: Point,
    },
    /// Resizing the panel.
    Resizing {
        /// Pointer position at gesture start.
        origin: Point,
        /// Panel size at gesture start.
        start_size: Size,
    },
}

/// What a single event did to the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelChange {
    /// Nothing committed.
    None,
    /// New position committed.
    Moved(Point),
    /// New size committed.
    Resized(Size),
}

type PositionListener = Box<dyn FnMut(Point)>;
type SizeListener = Box<dyn FnMut(Size)>;

/// A draggable, resizable floating panel.
pub struct Panel {
    config: PanelConfig,
    geometry: PanelGeometry,
    viewport: Viewport,
    gesture: GestureState,
    on_position: Option<PositionListener>,
    on_size: Option<SizeListener>,
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("config", &self.config)
            .field("geometry", &self.geometry)
            .field("viewport", &self.viewport)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

impl Panel {
    /// Mount a panel at its configured initial geometry.
    #[must_use]
    pub fn new(config: PanelConfig, viewport: Viewport) -> Self {
        let geometry = PanelGeometry {
            position: config.initial_position,
            size: config.initial_size,
        };
        Self {
            config,
            geometry,
            viewport,
            gesture: GestureState::Idle,
            on_position: None,
            on_size: None,
        }
    }

    /// Register a listener called on every committed position.
    #[must_use]
    pub fn on_position_change(mut self, listener: impl FnMut(Point) + 'static) -> Self {
        self.on_position = Some(Box::new(listener));
        self
    }

    /// Register a listener called on every committed size.
    #[must_use]
    pub fn on_size_change(mut self, listener: impl FnMut(Size) + 'static) -> Self {
        self.on_size = Some(Box::new(listener));
        self
    }

    /// Current geometry.
    #[must_use]
    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.geometry.position
    }

    /// Current size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.geometry.size
    }

    /// Current gesture.
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Viewport the panel is constrained to.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Panel configuration.
    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Which part of the panel is under `point`.
    #[must_use]
    pub fn region_at(&self, point: Point) -> HitRegion {
        if !self.geometry.contains(point) {
            return HitRegion::Outside;
        }
        let PanelGeometry { position, size } = self.geometry;
        let right = position.x + size.width;
        let bottom = position.y + size.height;
        if point.x >= right - RESIZE_HANDLE_SIZE && point.y >= bottom - RESIZE_HANDLE_SIZE {
            HitRegion::ResizeHandle
        } else if point.y <= position.y + self.config.header_height {
            HitRegion::Header
        } else {
            HitRegion::Body
        }
    }

    /// Dispatch one input event.
    pub fn handle_event(&mut self, event: &InputEvent) -> PanelChange {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer),
            InputEvent::Touch(touch) => self.handle_touch(touch),
        }
    }

    /// Handle a mouse event. Only the primary button starts gestures.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> PanelChange {
        match event.phase {
            PointerPhase::Down if event.button == 0 => {
                self.begin(event.point(), &event.target);
                PanelChange::None
            }
            PointerPhase::Down => PanelChange::None,
            PointerPhase::Move => self.update(event.point()),
            PointerPhase::Up => {
                self.end();
                PanelChange::None
            }
        }
    }

    /// Handle a touch event. Multi-touch events are ignored; end and cancel
    /// always finish the gesture.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> PanelChange {
        match event.phase {
            TouchPhase::End | TouchPhase::Cancel => {
                self.end();
                PanelChange::None
            }
            _ if event.is_multi_touch() => {
                tracing::trace!("Ignoring multi-touch event ({} contacts)", event.touches.len());
                PanelChange::None
            }
            TouchPhase::Start => {
                if let Some(touch) = event.primary_touch() {
                    self.begin(Point::new(touch.x, touch.y), &event.target);
                }
                PanelChange::None
            }
            TouchPhase::Move => event
                .primary_touch()
                .map_or(PanelChange::None, |touch| {
                    self.update(Point::new(touch.x, touch.y))
                }),
        }
    }

    /// React to a window resize. Re-applies the viewport constraint and
    /// notifies listeners only for values that actually changed.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if !self.config.constrain_to_viewport {
            return;
        }

        let position = self.constrain_position(self.geometry.position);
        if position != self.geometry.position {
            self.commit_position(position);
        }
        let size = self.constrain_size(self.geometry.size);
        if size != self.geometry.size {
            self.commit_size(size);
        }
    }

    fn begin(&mut self, point: Point, target: &PointerTarget) {
        if self.gesture != GestureState::Idle {
            return;
        }
        if target.is_interactive() {
            tracing::debug!("Press on interactive element, not starting a gesture");
            return;
        }

        match self.region_at(point) {
            HitRegion::Header => {
                let offset = point.sub(self.geometry.position);
                tracing::debug!("Drag start at ({}, {})", point.x, point.y);
                self.gesture = GestureState::Dragging { offset };
            }
            HitRegion::ResizeHandle => {
                tracing::debug!("Resize start at ({}, {})", point.x, point.y);
                self.gesture = GestureState::Resizing {
                    origin: point,
                    start_size: self.geometry.size,
                };
            }
            HitRegion::Body | HitRegion::Outside => {}
        }
    }

    fn update(&mut self, point: Point) -> PanelChange {
        match self.gesture {
            GestureState::Idle => PanelChange::None,
            GestureState::Dragging { offset } => {
                let position = self.constrain_position(point.sub(offset));
                self.commit_position(position);
                PanelChange::Moved(position)
            }
            GestureState::Resizing { origin, start_size } => {
                let delta = point.sub(origin);
                let size = self.constrain_size(Size::new(
                    start_size.width + delta.x,
                    start_size.height + delta.y,
                ));
                self.commit_size(size);
                PanelChange::Resized(size)
            }
        }
    }

    fn end(&mut self) {
        if self.gesture != GestureState::Idle {
            tracing::debug!(
                "Gesture end at ({}, {}) size {}x{}",
                self.geometry.position.x,
                self.geometry.position.y,
                self.geometry.size.width,
                self.geometry.size.height
            );
        }
        self.gesture = GestureState::Idle;
    }

    fn constrain_position(&self, position: Point) -> Point {
        if !self.config.constrain_to_viewport {
            return position;
        }
        Point::new(
            clamp_to_range(position.x, self.viewport.width - self.geometry.size.width),
            clamp_to_range(position.y, self.viewport.height - self.config.header_height),
        )
    }

    fn constrain_size(&self, size: Size) -> Size {
        let (mut width, mut height) = (size.width, size.height);
        if self.config.constrain_to_viewport {
            width = width.min(self.viewport.width - self.geometry.position.x);
            height = height.min(self.viewport.height - self.geometry.position.y);
        }
        // Minimum wins over the viewport cap
        Size::new(
            width.max(self.config.min_size.width),
            height.max(self.config.min_size.height),
        )
    }

    fn commit_position(&mut self, position: Point) {
        tracing::trace!("Panel moved to ({}, {})", position.x, position.y);
        self.geometry.position = position;
        if let Some(listener) = self.on_position.as_mut() {
            listener(position);
        }
    }

    fn commit_size(&mut self, size: Size) {
        tracing::trace!("Panel resized to {}x{}", size.width, size.height);
        self.geometry.size = size;
        if let Some(listener) = self.on_size.as_mut() {
            listener(size);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::event::{TargetKind, TouchPoint};

    fn panel_at(x: f32, y: f32) -> Panel {
        Panel::new(
            PanelConfig {
                initial_position: Point::new(x, y),
                initial_size: Size::new(300.0, 200.0),
                ..Default::default()
            },
            Viewport::new(1000.0, 800.0),
        )
    }

    #[test]
    fn test_region_at() {
        let panel = panel_at(100.0, 100.0);
        assert_eq!(panel.region_at(Point::new(150.0, 110.0)), HitRegion::Header);
        assert_eq!(panel.region_at(Point::new(150.0, 200.0)), HitRegion::Body);
        assert_eq!(
            panel.region_at(Point::new(395.0, 295.0)),
            HitRegion::ResizeHandle
        );
        assert_eq!(panel.region_at(Point::new(50.0, 50.0)), HitRegion::Outside);
    }

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut panel = panel_at(100.0, 100.0);
        panel.handle_pointer(&PointerEvent::down(120.0, 110.0));
        assert!(matches!(panel.gesture(), GestureState::Dragging { .. }));

        let change = panel.handle_pointer(&PointerEvent::moved(170.0, 140.0));
        assert_eq!(change, PanelChange::Moved(Point::new(150.0, 130.0)));

        panel.handle_pointer(&PointerEvent::up(170.0, 140.0));
        assert_eq!(panel.gesture(), GestureState::Idle);

        // Moves after release do nothing
        assert_eq!(
            panel.handle_pointer(&PointerEvent::moved(500.0, 500.0)),
            PanelChange::None
        );
        assert_eq!(panel.position(), Point::new(150.0, 130.0));
    }

    #[test]
    fn test_body_press_does_not_drag() {
        let mut panel = panel_at(100.0, 100.0);
        panel.handle_pointer(&PointerEvent::down(150.0, 200.0));
        panel.handle_pointer(&PointerEvent::moved(250.0, 300.0));
        assert_eq!(panel.position(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut panel = panel_at(100.0, 100.0);
        let mut press = PointerEvent::down(120.0, 110.0);
        press.button = 2;
        panel.handle_pointer(&press);
        assert_eq!(panel.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_clamped_drag_stays_in_viewport() {
        let mut panel = panel_at(100.0, 100.0);
        panel.handle_pointer(&PointerEvent::down(110.0, 105.0));
        panel.handle_pointer(&PointerEvent::moved(-500.0, -500.0));
        assert_eq!(panel.position(), Point::new(0.0, 0.0));

        panel.handle_pointer(&PointerEvent::moved(5000.0, 5000.0));
        assert_eq!(
            panel.position(),
            Point::new(1000.0 - 300.0, 800.0 - DEFAULT_HEADER_HEIGHT)
        );
    }

    #[test]
    fn test_unclamped_drag_follows_pointer() {
        let mut panel = Panel::new(
            PanelConfig {
                constrain_to_viewport: false,
                ..Default::default()
            },
            Viewport::new(100.0, 100.0),
        );
        panel.handle_pointer(&PointerEvent::down(5.0, 5.0));
        panel.handle_pointer(&PointerEvent::moved(-95.0, 2005.0));
        assert_eq!(panel.position(), Point::new(-100.0, 2000.0));
    }

    #[test]
    fn test_resize_respects_minimum() {
        let mut panel = panel_at(100.0, 100.0);
        panel.handle_pointer(&PointerEvent::down(395.0, 295.0));
        assert!(matches!(panel.gesture(), GestureState::Resizing { .. }));

        panel.handle_pointer(&PointerEvent::moved(0.0, 0.0));
        assert_eq!(panel.size(), Size::new(200.0, 150.0));

        panel.handle_pointer(&PointerEvent::moved(445.0, 345.0));
        assert_eq!(panel.size(), Size::new(350.0, 250.0));
    }

    #[test]
    fn test_resize_capped_by_viewport() {
        let mut panel = panel_at(100.0, 100.0);
        panel.handle_pointer(&PointerEvent::down(395.0, 295.0));
        panel.handle_pointer(&PointerEvent::moved(5000.0, 5000.0));
        assert_eq!(panel.size(), Size::new(900.0, 700.0));
    }

    #[test]
    fn test_interactive_target_ignored() {
        let mut panel = panel_at(100.0, 100.0);
        let press = PointerEvent::down(120.0, 110.0).on(PointerTarget::element(TargetKind::Button));
        panel.handle_pointer(&press);
        panel.handle_pointer(&PointerEvent::moved(300.0, 300.0));
        assert_eq!(panel.gesture(), GestureState::Idle);
        assert_eq!(panel.position(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_touch_drag_and_multi_touch() {
        let mut panel = panel_at(100.0, 100.0);
        panel.handle_touch(&TouchEvent::single(TouchPhase::Start, 120.0, 110.0));
        panel.handle_touch(&TouchEvent::single(TouchPhase::Move, 140.0, 120.0));
        assert_eq!(panel.position(), Point::new(120.0, 110.0));

        // Second finger: ignored, no movement
        let pinch = TouchEvent::new(
            TouchPhase::Move,
            vec![
                TouchPoint::new(0, 400.0, 400.0),
                TouchPoint::new(1, 500.0, 500.0),
            ],
        );
        assert_eq!(panel.handle_touch(&pinch), PanelChange::None);
        assert_eq!(panel.position(), Point::new(120.0, 110.0));

        panel.handle_touch(&TouchEvent::new(TouchPhase::End, Vec::new()));
        assert_eq!(panel.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_multi_touch_start_ignored() {
        let mut panel = panel_at(100.0, 100.0);
        let start = TouchEvent::new(
            TouchPhase::Start,
            vec![
                TouchPoint::new(0, 120.0, 110.0),
                TouchPoint::new(1, 130.0, 110.0),
            ],
        );
        panel.handle_touch(&start);
        assert_eq!(panel.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_listeners_fire_on_every_move() {
        let positions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&positions);
        let mut panel =
            panel_at(100.0, 100.0).on_position_change(move |p| sink.borrow_mut().push(p));

        panel.handle_pointer(&PointerEvent::down(110.0, 110.0));
        panel.handle_pointer(&PointerEvent::moved(120.0, 110.0));
        panel.handle_pointer(&PointerEvent::moved(130.0, 110.0));
        panel.handle_pointer(&PointerEvent::up(130.0, 110.0));

        assert_eq!(
            *positions.borrow(),
            vec![Point::new(110.0, 100.0), Point::new(120.0, 100.0)]
        );
    }

    #[test]
    fn test_viewport_shrink_reclamps() {
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sizes);
        let mut panel = panel_at(600.0, 500.0).on_size_change(move |s| sink.borrow_mut().push(s));

        panel.set_viewport(Viewport::new(700.0, 600.0));
        assert_eq!(panel.position(), Point::new(400.0, 500.0));
        assert_eq!(panel.size(), Size::new(300.0, 150.0));
        assert_eq!(sizes.borrow().len(), 1);

        // Growing the window changes nothing
        panel.set_viewport(Viewport::new(1400.0, 900.0));
        assert_eq!(sizes.borrow().len(), 1);
    }
}
