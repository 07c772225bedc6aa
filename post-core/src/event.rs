//! Input events for panel interaction.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Kind of element a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A push button.
    Button,
    /// A single-line input (text field, checkbox, ...).
    Input,
    /// A link.
    Anchor,
    /// A dropdown.
    Select,
    /// A multi-line text area.
    TextArea,
    /// Any other, non-interactive element.
    Other,
}

/// One element on the path from the pointer target up to the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetNode {
    /// Element kind.
    pub kind: TargetKind,
    /// Semantic role attribute, if the element exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl TargetNode {
    /// Create a node without a role.
    #[must_use]
    pub fn new(kind: TargetKind) -> Self {
        Self { kind, role: None }
    }

    /// Create a generic element exposing a semantic role.
    #[must_use]
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Other,
            role: Some(role.into()),
        }
    }

    /// Whether clicks on this element belong to the element, not the panel.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.kind != TargetKind::Other || self.role.is_some()
    }
}

/// Path from the innermost hit element outwards.
///
/// An empty path means the pointer landed on the panel chrome itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerTarget {
    /// Innermost element first.
    pub path: Vec<TargetNode>,
}

impl PointerTarget {
    /// Target on the panel chrome itself.
    #[must_use]
    pub fn chrome() -> Self {
        Self::default()
    }

    /// Target directly on an element of the given kind.
    #[must_use]
    pub fn element(kind: TargetKind) -> Self {
        Self {
            path: vec![TargetNode::new(kind)],
        }
    }

    /// Wrap the current path in an enclosing ancestor.
    #[must_use]
    pub fn within(mut self, ancestor: TargetNode) -> Self {
        self.path.push(ancestor);
        self
    }

    /// True if the target or any of its ancestors is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.path.iter().any(TargetNode::is_interactive)
    }
}

/// Phase of a mouse pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// A mouse pointer event in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Mouse button (0 = left, 1 = middle, 2 = right).
    pub button: u8,
    /// What the pointer is over.
    #[serde(default)]
    pub target: PointerTarget,
}

impl PointerEvent {
    /// Primary-button press on the panel chrome.
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self::with_phase(PointerPhase::Down, x, y)
    }

    /// Pointer move.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::with_phase(PointerPhase::Move, x, y)
    }

    /// Primary-button release.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::with_phase(PointerPhase::Up, x, y)
    }

    fn with_phase(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            button: 0,
            target: PointerTarget::chrome(),
        }
    }

    /// Set the hit target.
    #[must_use]
    pub fn on(mut self, target: PointerTarget) -> Self {
        self.target = target;
        self
    }

    /// Event position.
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in viewport coordinates.
    pub x: f32,
    /// Y position in viewport coordinates.
    pub y: f32,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// A touch event with one or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
    /// What the primary touch is over.
    #[serde(default)]
    pub target: PointerTarget,
}

impl TouchEvent {
    /// Create a new touch event on the panel chrome.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self {
            phase,
            touches,
            target: PointerTarget::chrome(),
        }
    }

    /// Single-contact touch event.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::new(phase, vec![TouchPoint::new(0, x, y)])
    }

    /// Set the hit target.
    #[must_use]
    pub fn on(mut self, target: PointerTarget) -> Self {
        self.target = target;
        self
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// All input events a panel can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Mouse pointer event.
    Pointer(PointerEvent),
    /// Raw touch event.
    Touch(TouchEvent),
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<TouchEvent> for InputEvent {
    fn from(event: TouchEvent) -> Self {
        Self::Touch(event)
    }
}
