//! Renderable document model - the building blocks of exported posts.
//!
//! A [`Document`] is a static tree of typed nodes. It carries only content
//! (text and images) and box styling; editor chrome such as buttons never
//! appears here.

use serde::{Deserialize, Serialize};

/// Font weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular text.
    #[default]
    Normal,
    /// Bold text.
    Bold,
}

/// How text lines are broken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    /// Keep explicit newlines and wrap long lines at word boundaries.
    #[default]
    PreWrap,
    /// Collapse newlines into spaces, then wrap.
    Normal,
}

/// Text appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// CSS font family list.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Text color as hex.
    pub color: String,
    /// Font weight.
    #[serde(default)]
    pub weight: FontWeight,
    /// Line breaking.
    #[serde(default)]
    pub white_space: WhiteSpace,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 16.0,
            line_height: 1.5,
            color: "#000000".to_string(),
            weight: FontWeight::Normal,
            white_space: WhiteSpace::PreWrap,
        }
    }
}

impl TextStyle {
    /// Same style at a different size.
    #[must_use]
    pub fn sized(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Same style in a different color.
    #[must_use]
    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Same style in bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    /// Distance between baselines in pixels.
    #[must_use]
    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }
}

/// A run of static text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text content; newlines are meaningful under [`WhiteSpace::PreWrap`].
    pub content: String,
    /// Text appearance.
    pub style: TextStyle,
}

impl TextBlock {
    /// Create a text block.
    #[must_use]
    pub fn new(content: impl Into<String>, style: TextStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }
}

/// How an image fills its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    /// Fill the box, cropping overflow.
    #[default]
    Cover,
    /// Fit inside the box, letterboxing.
    Contain,
}

/// An embedded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Image source: a `data:` URI or a remote URL.
    pub src: String,
    /// Alternative text.
    #[serde(default)]
    pub alt: String,
    /// Fill mode.
    #[serde(default)]
    pub fit: ObjectFit,
    /// Corner radius in pixels.
    #[serde(default)]
    pub corner_radius: f32,
}

impl ImageBlock {
    /// Create an image block with cover fit and square corners.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: String::new(),
            fit: ObjectFit::Cover,
            corner_radius: 0.0,
        }
    }

    /// Set the alternative text.
    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    /// Set the corner radius.
    #[must_use]
    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Whether the image data is embedded rather than fetched.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.src.starts_with("data:")
    }
}

/// Arrangement of a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layout {
    /// Stack children vertically.
    Column {
        /// Vertical gap between children.
        gap: f32,
    },
    /// Place children side by side with equal widths.
    Row {
        /// Horizontal gap between children.
        gap: f32,
    },
    /// Social-post image grid (1 to 4 images).
    ImageGrid {
        /// Gap between cells.
        gap: f32,
    },
}

impl Default for Layout {
    fn default() -> Self {
        Self::Column { gap: 0.0 }
    }
}

/// Box appearance of a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxStyle {
    /// Fixed width; `None` fills the parent.
    #[serde(default)]
    pub width: Option<f32>,
    /// Inner padding on all sides.
    #[serde(default)]
    pub padding: f32,
    /// Background color as hex; `None` is transparent.
    #[serde(default)]
    pub background: Option<String>,
    /// Corner radius.
    #[serde(default)]
    pub border_radius: f32,
    /// Border width (drawn in `border_color`).
    #[serde(default)]
    pub border_width: f32,
    /// Border color as hex.
    #[serde(default)]
    pub border_color: Option<String>,
    /// Whether a drop shadow is drawn.
    #[serde(default)]
    pub shadow: bool,
}

/// A group of child nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Child nodes in paint order.
    pub children: Vec<Node>,
    /// Arrangement.
    #[serde(default)]
    pub layout: Layout,
    /// Box appearance.
    #[serde(default)]
    pub style: BoxStyle,
}

impl Container {
    /// Empty column container.
    #[must_use]
    pub fn column(gap: f32) -> Self {
        Self {
            layout: Layout::Column { gap },
            ..Default::default()
        }
    }

    /// Empty row container.
    #[must_use]
    pub fn row(gap: f32) -> Self {
        Self {
            layout: Layout::Row { gap },
            ..Default::default()
        }
    }

    /// Set the box style.
    #[must_use]
    pub fn with_style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    /// Append a child.
    #[must_use]
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append a child in place.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }
}

/// A document node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Node {
    /// Static text.
    Text(TextBlock),
    /// An image.
    Image(ImageBlock),
    /// A nested container.
    Container(Container),
}

impl From<TextBlock> for Node {
    fn from(block: TextBlock) -> Self {
        Self::Text(block)
    }
}

impl From<ImageBlock> for Node {
    fn from(block: ImageBlock) -> Self {
        Self::Image(block)
    }
}

impl From<Container> for Node {
    fn from(container: Container) -> Self {
        Self::Container(container)
    }
}

/// A complete exportable document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The root container.
    pub root: Container,
}

impl Document {
    /// Wrap a root container.
    #[must_use]
    pub fn new(root: Container) -> Self {
        Self { root }
    }

    /// Visit every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        fn walk_children<'a>(container: &'a Container, visit: &mut impl FnMut(&'a Node)) {
            for node in &container.children {
                visit(node);
                if let Node::Container(inner) = node {
                    walk_children(inner, visit);
                }
            }
        }
        walk_children(&self.root, visit);
    }

    /// All text blocks in document order.
    #[must_use]
    pub fn text_blocks(&self) -> Vec<&TextBlock> {
        let mut blocks = Vec::new();
        self.walk(&mut |node| {
            if let Node::Text(block) = node {
                blocks.push(block);
            }
        });
        blocks
    }

    /// All image blocks in document order.
    #[must_use]
    pub fn images(&self) -> Vec<&ImageBlock> {
        let mut images = Vec::new();
        self.walk(&mut |node| {
            if let Node::Image(image) = node {
                images.push(image);
            }
        });
        images
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::PostResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> crate::PostResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
