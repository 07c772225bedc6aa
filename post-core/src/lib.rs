//! # Postmock Core
//!
//! Model layer for social post mockups: floating editor panels, the
//! renderable document model, the view sanitizer, and saved post history.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 post-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Panels          │  Export model            │
//! │  - Geometry      │  - Document (typed tree) │
//! │  - Input events  │  - View + Sanitizer      │
//! │  - Gesture FSM   │  - Stage (scoped attach) │
//! ├─────────────────────────────────────────────┤
//! │  Posts: drafts, styles, history             │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod panel;
pub mod post;
pub mod sanitize;
pub mod stage;
pub mod view;

pub use document::{
    BoxStyle, Container, Document, FontWeight, ImageBlock, Layout, Node, ObjectFit, TextBlock,
    TextStyle, WhiteSpace,
};
pub use error::{PostError, PostResult};
pub use event::{
    InputEvent, PointerEvent, PointerPhase, PointerTarget, TargetKind, TargetNode, TouchEvent,
    TouchPhase, TouchPoint,
};
pub use geometry::{PanelGeometry, Point, Size, Viewport};
pub use history::{HistoryError, PostHistory};
pub use panel::{GestureState, HitRegion, Panel, PanelChange, PanelConfig};
pub use post::{Post, PostDraft, PostStyle, MAX_IMAGES, PLACEHOLDER_TEXT};
pub use sanitize::{SanitizeConfig, Sanitizer};
pub use stage::{Placement, Stage, StageId, StagedDocument};
pub use view::ViewNode;

/// Postmock core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
