//! The live editor view tree.
//!
//! This is what the user sees and edits: content mixed with controls.
//! [`crate::sanitize`] turns it into an export-safe [`crate::Document`].

use serde::{Deserialize, Serialize};

use crate::document::{BoxStyle, Layout, ObjectFit, TextStyle};

/// One node of the editor view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewNode {
    /// A layout box.
    Container {
        /// Arrangement.
        #[serde(default)]
        layout: Layout,
        /// Box appearance.
        #[serde(default)]
        style: BoxStyle,
        /// Children in paint order.
        #[serde(default)]
        children: Vec<ViewNode>,
    },
    /// Static text.
    Text {
        /// Displayed text.
        content: String,
        /// Appearance.
        #[serde(default)]
        style: TextStyle,
    },
    /// Multi-line text entry.
    TextArea {
        /// Current value.
        value: String,
        /// Hint shown while empty.
        #[serde(default)]
        placeholder: String,
        /// Appearance.
        #[serde(default)]
        style: TextStyle,
    },
    /// Single-line text entry used for editable labels.
    TextField {
        /// Current value.
        value: String,
        /// Appearance.
        #[serde(default)]
        style: TextStyle,
    },
    /// An image.
    Image {
        /// Image source.
        src: String,
        /// Alternative text.
        #[serde(default)]
        alt: String,
        /// Fill mode.
        #[serde(default)]
        fit: ObjectFit,
        /// Corner radius.
        #[serde(default)]
        corner_radius: f32,
    },
    /// A push button.
    Button {
        /// Button label.
        label: String,
    },
    /// A toggle with its label.
    Checkbox {
        /// Toggle state.
        checked: bool,
        /// Label text.
        label: String,
    },
    /// Drop zone asking the user to pick images.
    UploadPrompt {
        /// Prompt text.
        label: String,
    },
}

impl ViewNode {
    /// Column container with the given children.
    #[must_use]
    pub fn column(gap: f32, children: Vec<ViewNode>) -> Self {
        Self::Container {
            layout: Layout::Column { gap },
            style: BoxStyle::default(),
            children,
        }
    }

    /// Text area with the default editor style.
    #[must_use]
    pub fn text_area(value: impl Into<String>) -> Self {
        Self::TextArea {
            value: value.into(),
            placeholder: String::new(),
            style: TextStyle::default(),
        }
    }

    /// Button with a label.
    #[must_use]
    pub fn button(label: impl Into<String>) -> Self {
        Self::Button {
            label: label.into(),
        }
    }

    /// Image with cover fit.
    #[must_use]
    pub fn image(src: impl Into<String>) -> Self {
        Self::Image {
            src: src.into(),
            alt: String::new(),
            fit: ObjectFit::Cover,
            corner_radius: 0.0,
        }
    }

    /// Whether this node is an editable text control.
    #[must_use]
    pub fn is_text_entry(&self) -> bool {
        matches!(self, Self::TextArea { .. } | Self::TextField { .. })
    }

    /// Whether this node is an operator affordance rather than content.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::Button { .. } | Self::Checkbox { .. } | Self::UploadPrompt { .. }
        )
    }

    /// Count nodes matching a predicate, this node included.
    #[must_use]
    pub fn count(&self, predicate: &impl Fn(&ViewNode) -> bool) -> usize {
        let own = usize::from(predicate(self));
        match self {
            Self::Container { children, .. } => {
                own + children.iter().map(|c| c.count(predicate)).sum::<usize>()
            }
            _ => own,
        }
    }
}
