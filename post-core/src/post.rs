//! Posts, the editable draft behind the editor, and the social styles a post
//! is exported in.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{BoxStyle, Container, Document, ImageBlock, Layout, TextBlock, TextStyle};
use crate::error::{PostError, PostResult};
use crate::sanitize::DEFAULT_EXPORT_WIDTH;
use crate::view::ViewNode;

/// Text shown in a fresh draft.
pub const PLACEHOLDER_TEXT: &str = "O que você está pensando?";

/// A post holds at most this many images.
pub const MAX_IMAGES: usize = 4;

/// Display name used when a post has none.
pub const DEFAULT_DISPLAY_NAME: &str = "Usuário";

/// Handle used when a post has none.
pub const DEFAULT_USER_NAME: &str = "usuario";

const POST_FONT: &str = "Helvetica, Arial, sans-serif";

/// Current time in milliseconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Social network look of an exported post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStyle {
    /// Facebook-style card.
    #[default]
    Facebook,
    /// Twitter-style card.
    Twitter,
}

impl std::str::FromStr for PostStyle {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "facebook" | "fb" => Ok(Self::Facebook),
            "twitter" | "x" => Ok(Self::Twitter),
            other => Err(PostError::InvalidConfig(format!("unknown post style: {other}"))),
        }
    }
}

impl std::fmt::Display for PostStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Facebook => write!(f, "facebook"),
            Self::Twitter => write!(f, "twitter"),
        }
    }
}

/// A saved post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier.
    pub id: Uuid,
    /// Post text.
    pub text: String,
    /// Image sources, at most [`MAX_IMAGES`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Handle without the `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Verified badge.
    #[serde(default)]
    pub verified: bool,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at_ms: u64,
}

impl Post {
    /// Create a post stamped with the current time. Images beyond
    /// [`MAX_IMAGES`] are dropped.
    #[must_use]
    pub fn new(text: impl Into<String>, mut images: Vec<String>) -> Self {
        images.truncate(MAX_IMAGES);
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            images,
            user_name: None,
            display_name: None,
            verified: false,
            created_at_ms: now_ms(),
        }
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(
        mut self,
        display_name: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        self.display_name = Some(display_name.into());
        self.user_name = Some(user_name.into());
        self
    }

    /// Set the verified badge.
    #[must_use]
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Set the creation time.
    #[must_use]
    pub fn with_created_at(mut self, created_at_ms: u64) -> Self {
        self.created_at_ms = created_at_ms;
        self
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.created_at_ms)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// File name used when exporting this post from the history.
    ///
    /// The timestamp is the creation time in UTC, not local time, so the
    /// name does not depend on the machine's time zone.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        match self.created_at() {
            Some(at) => format!("post-{}.png", at.format("%Y-%m-%d-%H-%M")),
            None => format!("post-{}.png", self.id),
        }
    }

    fn date_label(&self) -> String {
        self.created_at()
            .map(|at| at.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_default()
    }

    /// Build the export document for this post directly from its state.
    #[must_use]
    pub fn to_document(&self, style: PostStyle) -> Document {
        let display_name = self.display_name.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME);
        let user_name = self.user_name.as_deref().unwrap_or(DEFAULT_USER_NAME);
        let badge = if self.verified { " ✓" } else { "" };

        let base = TextStyle {
            font_family: POST_FONT.to_string(),
            ..TextStyle::default()
        };

        let (header, body_style, image_radius) = match style {
            PostStyle::Facebook => (
                Container::column(2.0)
                    .child(TextBlock::new(
                        format!("{display_name}{badge}"),
                        base.clone().sized(15.0).colored("#050505").bold(),
                    ))
                    .child(TextBlock::new(
                        self.date_label(),
                        base.clone().sized(13.0).colored("#65676b"),
                    )),
                base.clone().sized(16.0).colored("#050505"),
                8.0,
            ),
            PostStyle::Twitter => {
                let date = self.date_label();
                let handle = if date.is_empty() {
                    format!("@{user_name}")
                } else {
                    format!("@{user_name} · {date}")
                };
                (
                    Container::column(2.0)
                        .child(TextBlock::new(
                            format!("{display_name}{badge}"),
                            base.clone().sized(15.0).colored("#0f1419").bold(),
                        ))
                        .child(TextBlock::new(
                            handle,
                            base.clone().sized(15.0).colored("#536471"),
                        )),
                    base.clone().sized(15.0).colored("#0f1419"),
                    16.0,
                )
            }
        };

        let mut root = Container::column(12.0).with_style(BoxStyle {
            width: Some(DEFAULT_EXPORT_WIDTH),
            padding: 16.0,
            background: Some("#ffffff".to_string()),
            ..Default::default()
        });
        root.push(header);
        root.push(TextBlock::new(self.text.clone(), body_style));
        if !self.images.is_empty() {
            root.push(image_grid(&self.images, image_radius));
        }
        Document::new(root)
    }
}

/// Grid container for up to [`MAX_IMAGES`] images.
#[must_use]
pub fn image_grid(images: &[String], corner_radius: f32) -> Container {
    let mut grid = Container {
        layout: Layout::ImageGrid { gap: 4.0 },
        ..Default::default()
    };
    for (index, src) in images.iter().take(MAX_IMAGES).enumerate() {
        grid.push(
            ImageBlock::new(src.clone())
                .with_alt(format!("Imagem {} do post", index + 1))
                .with_corner_radius(corner_radius),
        );
    }
    grid
}

/// Editable post state behind the editor view.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    text: String,
    images: Vec<String>,
    /// Display name shown in the header.
    pub display_name: Option<String>,
    /// Handle shown in the header.
    pub user_name: Option<String>,
    /// Verified badge.
    pub verified: bool,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PostDraft {
    /// Fresh draft showing the placeholder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: PLACEHOLDER_TEXT.to_string(),
            images: Vec::new(),
            display_name: None,
            user_name: None,
            verified: false,
        }
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current images.
    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Whether the text is still the untouched placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.text == PLACEHOLDER_TEXT
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Editing starts: clear the placeholder.
    pub fn focus(&mut self) {
        if self.is_placeholder() {
            self.text.clear();
        }
    }

    /// Editing ends: restore the placeholder over blank text.
    pub fn blur(&mut self) {
        if self.text.trim().is_empty() {
            self.text = PLACEHOLDER_TEXT.to_string();
        }
    }

    /// Free image slots.
    #[must_use]
    pub fn remaining_slots(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.images.len())
    }

    /// Append images, dropping any beyond [`MAX_IMAGES`]. Returns how many
    /// were accepted.
    pub fn add_images(&mut self, images: impl IntoIterator<Item = String>) -> usize {
        let before = self.images.len();
        let mut dropped = 0usize;
        for image in images {
            if self.images.len() < MAX_IMAGES {
                self.images.push(image);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!("Draft image limit reached, dropped {dropped} image(s)");
        }
        self.images.len() - before
    }

    /// Remove the image at `index`.
    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// The live editor view for this draft.
    #[must_use]
    pub fn view(&self) -> ViewNode {
        let mut children = vec![ViewNode::TextArea {
            value: self.text.clone(),
            placeholder: PLACEHOLDER_TEXT.to_string(),
            style: TextStyle::default(),
        }];

        if self.images.is_empty() {
            children.push(ViewNode::UploadPrompt {
                label: "Arraste uma imagem ou clique para selecionar".to_string(),
            });
        } else {
            let radius = if self.images.len() == 1 { 12.0 } else { 6.0 };
            children.push(ViewNode::Container {
                layout: Layout::ImageGrid { gap: 4.0 },
                style: BoxStyle::default(),
                children: self
                    .images
                    .iter()
                    .map(|src| ViewNode::Image {
                        src: src.clone(),
                        alt: "Imagem do post".to_string(),
                        fit: crate::document::ObjectFit::Cover,
                        corner_radius: radius,
                    })
                    .collect(),
            });
            children.push(ViewNode::Container {
                layout: Layout::Row { gap: 8.0 },
                style: BoxStyle::default(),
                children: self.images.iter().map(|_| ViewNode::button("✕")).collect(),
            });
        }

        ViewNode::Container {
            layout: Layout::Column { gap: 16.0 },
            style: BoxStyle {
                padding: 16.0,
                background: Some("#ffffff".to_string()),
                border_radius: 12.0,
                shadow: true,
                ..Default::default()
            },
            children,
        }
    }

    /// Turn the draft into a post ready for the history.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidDraft`] while the text is blank or still
    /// the placeholder.
    pub fn to_post(&self) -> PostResult<Post> {
        if self.is_placeholder() || self.text.trim().is_empty() {
            return Err(PostError::InvalidDraft(
                "add some text before saving".to_string(),
            ));
        }
        let mut post =
            Post::new(self.text.clone(), self.images.clone()).with_verified(self.verified);
        post.display_name.clone_from(&self.display_name);
        post.user_name.clone_from(&self.user_name);
        Ok(post)
    }
}
