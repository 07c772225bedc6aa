//! Block layout of a [`Document`] into positioned paint items.
//!
//! Positions are in CSS pixels with the document's top-left corner at the
//! origin. Items are emitted in paint order: a container's box comes before
//! its children.

use post_core::{BoxStyle, Container, Document, ImageBlock, Layout, Node, TextStyle};

use crate::image::probe_dimensions;
use crate::text::{self, TextMeasure};

/// Images shown by a grid before the rest are dropped.
pub const GRID_MAX_CELLS: usize = 4;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A positioned paint item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A container's background, border and shadow.
    Box {
        /// Border box.
        rect: Rect,
        /// Box appearance.
        style: BoxStyle,
    },
    /// Wrapped text lines.
    Text {
        /// Text box; lines start at its top-left corner.
        rect: Rect,
        /// Lines after wrapping.
        lines: Vec<String>,
        /// Text appearance.
        style: TextStyle,
    },
    /// An image filling its rectangle.
    Image {
        /// Image box.
        rect: Rect,
        /// Image source and fit.
        image: ImageBlock,
    },
}

/// A laid-out document.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOut {
    /// Content width in CSS pixels.
    pub width: f32,
    /// Content height in CSS pixels.
    pub height: f32,
    /// Paint items in order.
    pub items: Vec<Item>,
}

/// Lay out a document at the given width, breaking text with `measure`.
#[must_use]
pub fn layout(document: &Document, width: f32, measure: &dyn TextMeasure) -> LaidOut {
    let mut flow = Flow {
        measure,
        items: Vec::new(),
    };
    let height = flow.container(&document.root, 0.0, 0.0, width);
    LaidOut {
        width,
        height,
        items: flow.items,
    }
}

fn has_box(style: &BoxStyle) -> bool {
    style.background.is_some()
        || (style.border_width > 0.0 && style.border_color.is_some())
        || style.shadow
}

/// Height of an image scaled to `width`, square when dimensions are unknown.
#[allow(clippy::cast_precision_loss)]
fn natural_height(image: &ImageBlock, width: f32) -> f32 {
    match probe_dimensions(&image.src) {
        Some((w, h)) => width * h as f32 / w as f32,
        None => width,
    }
}

/// Paint items collected in flow order.
struct Flow<'a> {
    measure: &'a dyn TextMeasure,
    items: Vec<Item>,
}

impl Flow<'_> {
    /// Returns the container's height.
    fn container(&mut self, container: &Container, x: f32, y: f32, available: f32) -> f32 {
        let style = &container.style;
        let width = style.width.map_or(available, |w| w.min(available)).max(0.0);
        let padding = style.padding.max(0.0);
        let inner_x = x + padding;
        let inner_y = y + padding;
        let inner_width = (width - 2.0 * padding).max(0.0);

        // Reserve the box slot so it paints beneath the children
        let box_index = has_box(style).then(|| {
            self.items.push(Item::Box {
                rect: Rect::new(x, y, width, 0.0),
                style: style.clone(),
            });
            self.items.len() - 1
        });

        let children = &container.children;
        let content_height = match container.layout {
            Layout::Column { gap } => self.column(children, inner_x, inner_y, inner_width, gap),
            Layout::Row { gap } => self.row(children, inner_x, inner_y, inner_width, gap),
            Layout::ImageGrid { gap } => self.grid(children, inner_x, inner_y, inner_width, gap),
        };
        let height = content_height + 2.0 * padding;

        if let Some(Item::Box { rect, .. }) = box_index.and_then(|i| self.items.get_mut(i)) {
            rect.height = height;
        }
        height
    }

    /// Lay out a node in flow. Returns its height.
    fn node(&mut self, node: &Node, x: f32, y: f32, width: f32) -> f32 {
        match node {
            Node::Container(container) => self.container(container, x, y, width),
            Node::Text(block) => {
                let lines = text::wrap(&block.content, &block.style, width, self.measure);
                #[allow(clippy::cast_precision_loss)]
                let height = lines.len() as f32 * block.style.line_advance();
                self.items.push(Item::Text {
                    rect: Rect::new(x, y, width, height),
                    lines,
                    style: block.style.clone(),
                });
                height
            }
            Node::Image(image) => {
                let height = natural_height(image, width);
                self.items.push(Item::Image {
                    rect: Rect::new(x, y, width, height),
                    image: image.clone(),
                });
                height
            }
        }
    }

    fn column(&mut self, children: &[Node], x: f32, y: f32, width: f32, gap: f32) -> f32 {
        let mut cursor = y;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                cursor += gap;
            }
            cursor += self.node(child, x, cursor, width);
        }
        cursor - y
    }

    #[allow(clippy::cast_precision_loss)]
    fn row(&mut self, children: &[Node], x: f32, y: f32, width: f32, gap: f32) -> f32 {
        if children.is_empty() {
            return 0.0;
        }
        let count = children.len() as f32;
        let cell = ((width - gap * (count - 1.0)) / count).max(0.0);
        let mut height: f32 = 0.0;
        for (i, child) in children.iter().enumerate() {
            let cell_x = x + i as f32 * (cell + gap);
            height = height.max(self.node(child, cell_x, y, cell));
        }
        height
    }

    fn grid(&mut self, children: &[Node], x: f32, y: f32, width: f32, gap: f32) -> f32 {
        let single_height = match children.first() {
            Some(Node::Image(image)) => natural_height(image, width),
            _ => width,
        };
        let cells = grid_cells(children.len(), width, gap, single_height);
        if children.len() > cells.len() {
            tracing::debug!(
                "Image grid shows {} of {} children",
                cells.len(),
                children.len()
            );
        }

        let mut bottom: f32 = 0.0;
        for (child, cell) in children.iter().zip(&cells) {
            let rect = Rect::new(x + cell.x, y + cell.y, cell.width, cell.height);
            match child {
                Node::Image(image) => self.items.push(Item::Image {
                    rect,
                    image: image.clone(),
                }),
                other => {
                    self.node(other, rect.x, rect.y, rect.width);
                }
            }
            bottom = bottom.max(cell.bottom());
        }
        bottom
    }
}

/// Grid cells for `count` items in a `width`-wide grid.
///
/// One item keeps its natural height (`single_height`); two sit side by
/// side; three put a tall cell on the left; four form a 2x2 square grid.
#[must_use]
pub fn grid_cells(count: usize, width: f32, gap: f32, single_height: f32) -> Vec<Rect> {
    let half = ((width - gap) / 2.0).max(0.0);
    let right = half + gap;
    match count.min(GRID_MAX_CELLS) {
        0 => Vec::new(),
        1 => vec![Rect::new(0.0, 0.0, width, single_height)],
        2 => vec![
            Rect::new(0.0, 0.0, half, half),
            Rect::new(right, 0.0, half, half),
        ],
        3 => vec![
            Rect::new(0.0, 0.0, half, 2.0 * half + gap),
            Rect::new(right, 0.0, half, half),
            Rect::new(right, half + gap, half, half),
        ],
        _ => vec![
            Rect::new(0.0, 0.0, half, half),
            Rect::new(right, 0.0, half, half),
            Rect::new(0.0, half + gap, half, half),
            Rect::new(right, half + gap, half, half),
        ],
    }
}
