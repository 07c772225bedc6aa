//! # Postmock CLI
//!
//! Command-line host for Postmock. Renders posts to PNG in Facebook or
//! Twitter style and manages the saved post history.
//!
//! ## Usage
//!
//! ```bash
//! postmock render --text "Olá mundo" --image foto.jpg --style twitter
//! postmock history add --text "Primeiro post"
//! postmock history export <id>
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ExportConfig` - Built from `RenderArgs`; drives the export pipeline
//! - `build_post` - Turns `PostArgs` into a validated `Post`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use post_core::post::{DEFAULT_DISPLAY_NAME, DEFAULT_USER_NAME};
use post_core::{Post, PostDraft, PostStyle};
use post_renderer::{file_to_data_uri, ExportConfig};
use uuid::Uuid;

/// Log filter used when `RUST_LOG` is unset: every workspace crate at info.
pub const DEFAULT_LOG_FILTER: &str =
    "postmock=info,post_cli=info,post_renderer=info,post_core=info";

/// Command-line arguments for postmock.
#[derive(Debug, Clone, Parser)]
#[command(name = "postmock")]
#[command(about = "Render social post mockups to PNG")]
#[command(version)]
pub struct CliArgs {
    /// Directory exported PNGs are written to
    #[arg(long, global = true, env = "POSTMOCK_OUT_DIR", default_value = ".")]
    pub out: PathBuf,

    /// Directory holding post-history.json
    #[arg(long, global = true, env = "POSTMOCK_DATA_DIR", default_value = ".postmock")]
    pub data_dir: PathBuf,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a post to PNG
    Render(RenderArgs),
    /// Manage saved posts
    #[command(subcommand)]
    History(HistoryCommand),
}

/// Post history commands.
#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    /// List saved posts, newest first
    List {
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a new post
    Add(PostArgs),
    /// Delete a saved post
    Delete {
        /// Post ID
        id: Uuid,
    },
    /// Delete every saved post
    Clear,
    /// Render a saved post to PNG
    Export {
        /// Post ID
        id: Uuid,
        /// Card style
        #[arg(long, default_value_t = PostStyle::Facebook)]
        style: PostStyle,
        /// Output file name (default: post-<date>.png)
        #[arg(long)]
        file_name: Option<String>,
    },
}

/// Content and author of a post.
#[derive(Debug, Clone, Args)]
pub struct PostArgs {
    /// Post text; `\n` starts a new line
    #[arg(long)]
    pub text: String,

    /// Image file to attach (up to four)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// Author display name
    #[arg(long)]
    pub name: Option<String>,

    /// Author handle, without the @
    #[arg(long)]
    pub handle: Option<String>,

    /// Show the verified badge
    #[arg(long)]
    pub verified: bool,
}

/// Options for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Post content
    #[command(flatten)]
    pub post: PostArgs,

    /// Card style
    #[arg(long, default_value_t = PostStyle::Facebook)]
    pub style: PostStyle,

    /// Output file name
    #[arg(long, default_value = post_renderer::DEFAULT_FILE_NAME)]
    pub file_name: String,

    /// Canvas width in CSS pixels
    #[arg(long)]
    pub width: Option<f32>,

    /// Canvas height in CSS pixels (default: fit content)
    #[arg(long)]
    pub height: Option<f32>,

    /// Device pixels per CSS pixel
    #[arg(long, default_value_t = post_renderer::export::DEFAULT_SCALE)]
    pub scale: f32,

    /// Print the PNG as a data URI instead of writing a file
    #[arg(long)]
    pub data_uri: bool,
}

impl From<&RenderArgs> for ExportConfig {
    fn from(args: &RenderArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            scale: args.scale,
            ..Self::default()
        }
    }
}

/// Build a validated post, reading attached images into data URIs.
///
/// # Errors
///
/// Returns an error if an image cannot be read or the text is blank.
pub fn build_post(args: &PostArgs) -> anyhow::Result<Post> {
    let mut draft = PostDraft::new();
    draft.focus();
    draft.set_text(args.text.replace("\\n", "\n"));

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let uri = file_to_data_uri(path)
            .with_context(|| format!("reading image {}", path.display()))?;
        images.push(uri);
    }
    let accepted = draft.add_images(images);
    if accepted < args.images.len() {
        tracing::warn!(
            "Only {accepted} of {} images attached; a post holds at most {}",
            args.images.len(),
            post_core::MAX_IMAGES
        );
    }

    if args.name.is_some() || args.handle.is_some() {
        let name = args.name.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME);
        let handle = args.handle.as_deref().unwrap_or(DEFAULT_USER_NAME);
        draft.display_name = Some(name.to_string());
        draft.user_name = Some(handle.to_string());
    }
    draft.verified = args.verified;

    Ok(draft.to_post()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let args = CliArgs::try_parse_from([
            "postmock",
            "render",
            "--text",
            "Hello",
            "--style",
            "twitter",
            "--height",
            "300",
        ])
        .expect("parse");

        let Command::Render(render) = &args.command else {
            panic!("expected render");
        };
        assert_eq!(render.style, PostStyle::Twitter);
        assert_eq!(render.file_name, "meu-post.png");

        let config = ExportConfig::from(render);
        assert_eq!(config.height, Some(300.0));
        assert!((config.scale - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_history_delete() {
        let id = Uuid::new_v4();
        let id_arg = id.to_string();
        let args = CliArgs::try_parse_from([
            "postmock",
            "history",
            "delete",
            id_arg.as_str(),
            "--data-dir",
            "/tmp/posts",
        ])
        .expect("parse");

        assert_eq!(args.data_dir, PathBuf::from("/tmp/posts"));
        assert!(matches!(
            args.command,
            Command::History(HistoryCommand::Delete { id: parsed }) if parsed == id
        ));
    }

    #[test]
    fn test_default_log_filter_covers_workspace() {
        for target in ["postmock", "post_cli", "post_renderer", "post_core"] {
            assert!(
                DEFAULT_LOG_FILTER.contains(&format!("{target}=info")),
                "{target} missing from the default filter"
            );
        }
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_build_post() {
        let post = build_post(&PostArgs {
            text: "Hello\\nWorld".to_string(),
            images: Vec::new(),
            name: Some("Ana".to_string()),
            handle: None,
            verified: true,
        })
        .expect("post");

        assert_eq!(post.text, "Hello\nWorld");
        assert_eq!(post.display_name.as_deref(), Some("Ana"));
        assert_eq!(post.user_name.as_deref(), Some(DEFAULT_USER_NAME));
        assert!(post.verified);
    }

    #[test]
    fn test_build_post_rejects_blank_text() {
        let args = PostArgs {
            text: "   ".to_string(),
            images: Vec::new(),
            name: None,
            handle: None,
            verified: false,
        };
        assert!(build_post(&args).is_err());
    }

    #[test]
    fn test_build_post_missing_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = PostArgs {
            text: "Hello".to_string(),
            images: vec![dir.path().join("missing.png")],
            name: None,
            handle: None,
            verified: false,
        };
        let err = build_post(&args).unwrap_err();
        assert!(err.to_string().contains("missing.png"));
    }
}
