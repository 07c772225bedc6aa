//! The stage: the shared render tree documents are attached to for layout
//! and painting.
//!
//! Export clones are attached off-screen through [`Stage::attach_offscreen`],
//! which hands back a [`StagedDocument`] guard. Dropping the guard detaches
//! the clone, so every attach is balanced by a detach on success, on error
//! and on unwind alike.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;
use crate::geometry::Point;

/// X coordinate export clones are parked at.
pub const OFFSCREEN_X: f32 = -9999.0;

/// Unique identifier for a staged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageId(Uuid);

impl StageId {
    /// Create a new unique stage ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a staged document sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// Painted for the user at this origin.
    Visible(Point),
    /// Laid out but outside any visible area.
    Offscreen(Point),
}

impl Placement {
    /// Whether the user can see the document.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }
}

#[derive(Debug)]
struct Entry {
    id: StageId,
    placement: Placement,
    document: Document,
}

/// The shared render tree.
#[derive(Debug, Default)]
pub struct Stage {
    entries: Vec<Entry>,
}

impl Stage {
    /// Create an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a document visibly at `origin`. The caller owns detaching it.
    pub fn attach(&mut self, document: Document, origin: Point) -> StageId {
        let id = StageId::new();
        self.entries.push(Entry {
            id,
            placement: Placement::Visible(origin),
            document,
        });
        id
    }

    /// Attach a document off-screen for the lifetime of the returned guard.
    pub fn attach_offscreen(&mut self, document: Document) -> StagedDocument<'_> {
        let id = StageId::new();
        self.entries.push(Entry {
            id,
            placement: Placement::Offscreen(Point::new(OFFSCREEN_X, 0.0)),
            document,
        });
        let index = self.entries.len() - 1;
        tracing::debug!("Staged export clone {id} off-screen");
        StagedDocument {
            stage: self,
            index,
            id,
        }
    }

    /// Detach a document, returning it if it was attached.
    pub fn detach(&mut self, id: StageId) -> Option<Document> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).document)
    }

    /// Whether a document with this ID is attached.
    #[must_use]
    pub fn contains(&self, id: StageId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Placement of an attached document.
    #[must_use]
    pub fn placement(&self, id: StageId) -> Option<Placement> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.placement)
    }

    /// Documents the user can see, in attach order.
    pub fn visible_documents(&self) -> impl Iterator<Item = (StageId, &Document)> {
        self.entries
            .iter()
            .filter(|e| e.placement.is_visible())
            .map(|e| (e.id, &e.document))
    }

    /// Number of attached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An off-screen document attached to a [`Stage`]; detached on drop.
///
/// The guard borrows the stage exclusively, so the entry cannot move or be
/// removed by anyone else while it is alive.
#[derive(Debug)]
pub struct StagedDocument<'a> {
    stage: &'a mut Stage,
    index: usize,
    id: StageId,
}

impl StagedDocument<'_> {
    /// ID of the staged clone.
    #[must_use]
    pub fn id(&self) -> StageId {
        self.id
    }

    /// The staged clone.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.stage.entries[self.index].document
    }

    /// Where the clone sits; always off-screen.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.stage.entries[self.index].placement
    }

    /// Whether the clone is still attached to the stage.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.stage.contains(self.id)
    }
}

impl Drop for StagedDocument<'_> {
    fn drop(&mut self) {
        if self.stage.entries.get(self.index).map(|e| e.id) == Some(self.id) {
            self.stage.entries.remove(self.index);
        } else {
            self.stage.detach(self.id);
        }
        tracing::debug!("Unstaged export clone {}", self.id);
    }
}
