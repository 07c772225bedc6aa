//! Snapshot sanitizer: editor view in, export-safe document out.
//!
//! The sanitizer works on a deep copy and never touches the live view. Text
//! controls become static text carrying their current value, controls are
//! dropped, and the root box is normalized so the export does not depend on
//! the surrounding page.

use crate::document::{
    BoxStyle, Container, Document, ImageBlock, Node, ObjectFit, TextBlock, TextStyle, WhiteSpace,
};
use crate::error::{PostError, PostResult};
use crate::view::ViewNode;

/// Export width used by the post editor.
pub const DEFAULT_EXPORT_WIDTH: f32 = 600.0;

/// Configuration for [`Sanitizer`].
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Fixed root width in CSS pixels.
    pub width: f32,
    /// Root padding.
    pub padding: f32,
    /// Opaque root background.
    pub background: String,
    /// Applied to substituted text controls whose own style is unusable.
    pub fallback_text_style: TextStyle,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_EXPORT_WIDTH,
            padding: 20.0,
            background: "#ffffff".to_string(),
            fallback_text_style: TextStyle::default(),
        }
    }
}

/// Builds export-safe documents from editor views.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    config: SanitizeConfig,
}

impl Sanitizer {
    /// Create a sanitizer with the given configuration.
    #[must_use]
    pub fn new(config: SanitizeConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SanitizeConfig {
        &self.config
    }

    /// Produce a detached, normalized document from `view`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidConfig`] for a non-finite or non-positive
    /// width, and [`PostError::InvalidNode`] for images without a source.
    pub fn sanitize(&self, view: &ViewNode) -> PostResult<Document> {
        let width = self.config.width;
        if !width.is_finite() || width <= 0.0 {
            return Err(PostError::InvalidConfig(format!("export width {width}")));
        }
        if !self.config.padding.is_finite() || self.config.padding < 0.0 {
            return Err(PostError::InvalidConfig(format!(
                "export padding {}",
                self.config.padding
            )));
        }

        let mut root = match self.convert(view)? {
            Some(Node::Container(container)) => container,
            Some(node) => Container::column(0.0).child(node),
            None => Container::column(0.0),
        };

        root.style = BoxStyle {
            width: Some(width),
            padding: self.config.padding,
            background: Some(self.config.background.clone()),
            border_radius: 0.0,
            border_width: 0.0,
            border_color: None,
            shadow: false,
        };

        let document = Document::new(root);
        tracing::debug!(
            "Sanitized view: {} text blocks, {} images",
            document.text_blocks().len(),
            document.images().len()
        );
        Ok(document)
    }

    fn convert(&self, view: &ViewNode) -> PostResult<Option<Node>> {
        let node = match view {
            ViewNode::Container {
                layout,
                style,
                children,
            } => {
                let mut converted = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(node) = self.convert(child)? {
                        converted.push(node);
                    }
                }
                // A box that only held controls has nothing left to paint
                if converted.is_empty() && !children.is_empty() {
                    return Ok(None);
                }
                Node::Container(Container {
                    children: converted,
                    layout: *layout,
                    style: style.clone(),
                })
            }
            ViewNode::Text { content, style } => {
                Node::Text(TextBlock::new(content.clone(), style.clone()))
            }
            ViewNode::TextArea { value, style, .. } | ViewNode::TextField { value, style } => {
                Node::Text(TextBlock::new(value.clone(), self.static_text_style(style)))
            }
            ViewNode::Image {
                src,
                alt,
                corner_radius,
                ..
            } => {
                if src.trim().is_empty() {
                    return Err(PostError::InvalidNode(
                        "image without a source".to_string(),
                    ));
                }
                Node::Image(ImageBlock {
                    src: src.clone(),
                    alt: alt.clone(),
                    fit: ObjectFit::Cover,
                    corner_radius: *corner_radius,
                })
            }
            ViewNode::Button { .. } | ViewNode::Checkbox { .. } | ViewNode::UploadPrompt { .. } => {
                return Ok(None);
            }
        };
        Ok(Some(node))
    }

    /// Static equivalent of a text control's style: same font, wrapping
    /// preserved.
    fn static_text_style(&self, style: &TextStyle) -> TextStyle {
        let usable = style.font_size.is_finite()
            && style.font_size > 0.0
            && style.line_height.is_finite()
            && style.line_height > 0.0;
        let mut out = if usable {
            style.clone()
        } else {
            self.config.fallback_text_style.clone()
        };
        out.white_space = WhiteSpace::PreWrap;
        out
    }
}
