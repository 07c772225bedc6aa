//! The export pipeline: sanitize, stage, rasterize, deliver.
//!
//! A live editor view is first turned into an export-safe [`Document`] by the
//! [`Sanitizer`]. The clone is attached off-screen to the caller's [`Stage`]
//! for the duration of rasterization and detached again whatever the
//! outcome. The PNG then goes to a [`DownloadSink`].

use post_core::{Document, SanitizeConfig, Sanitizer, Stage, ViewNode};

use crate::error::{RenderError, RenderResult};
use crate::raster::{RasterImage, Rasterizer, ResvgRasterizer};
use crate::sink::{Download, DownloadSink};

/// File name used when the caller does not pick one.
pub const DEFAULT_FILE_NAME: &str = "meu-post.png";

/// Device pixels per CSS pixel for exports.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Largest bitmap an export may allocate.
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

/// Configuration for exports.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Canvas width in CSS pixels (default: the document's own width).
    pub width: Option<f32>,
    /// Canvas height in CSS pixels (default: content height).
    pub height: Option<f32>,
    /// Scale factor (2.0 for retina-quality output).
    pub scale: f32,
    /// Background color as RGBA bytes.
    pub background: [u8; 4],
    /// Upper bound on output pixels.
    pub max_pixels: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            scale: DEFAULT_SCALE,
            background: [255, 255, 255, 255],
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl ExportConfig {
    /// Check that the configuration can produce an image.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite or non-positive dimensions or scale.
    pub fn validate(&self) -> RenderResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RenderError::Config(format!("scale {} must be positive", self.scale)));
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(RenderError::Config(format!("{name} {v} must be positive")));
                }
            }
        }
        Ok(())
    }
}

/// Turns editor views and documents into downloaded PNGs.
#[derive(Debug, Clone)]
pub struct ExportPipeline<R = ResvgRasterizer> {
    sanitizer: Sanitizer,
    rasterizer: R,
    config: ExportConfig,
}

impl ExportPipeline<ResvgRasterizer> {
    /// Create a pipeline rendering through resvg with system fonts.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self::with_rasterizer(config, ResvgRasterizer::new())
    }
}

impl<R: Rasterizer> ExportPipeline<R> {
    /// Create a pipeline with a custom rasterizer.
    ///
    /// A fixed export width also becomes the sanitizer's root width.
    #[must_use]
    pub fn with_rasterizer(config: ExportConfig, rasterizer: R) -> Self {
        let mut sanitize = SanitizeConfig::default();
        if let Some(width) = config.width {
            sanitize.width = width;
        }
        Self {
            sanitizer: Sanitizer::new(sanitize),
            rasterizer,
            config,
        }
    }

    /// Replace the sanitizer settings.
    #[must_use]
    pub fn with_sanitizer(mut self, config: SanitizeConfig) -> Self {
        self.sanitizer = Sanitizer::new(config);
        self
    }

    /// Export settings.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The rasterizer in use.
    #[must_use]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Export a live editor view.
    ///
    /// Returns `Ok(None)` when rasterization or delivery failed; the failure
    /// is logged and the stage is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be sanitized.
    pub fn export(
        &self,
        stage: &mut Stage,
        view: &ViewNode,
        file_name: &str,
        sink: &mut impl DownloadSink,
    ) -> RenderResult<Option<Download>> {
        let document = self.sanitizer.sanitize(view)?;
        Ok(self.export_document(stage, document, file_name, sink))
    }

    /// Export a document that is already export-safe.
    ///
    /// Failures are logged and yield `None`.
    pub fn export_document(
        &self,
        stage: &mut Stage,
        document: Document,
        file_name: &str,
        sink: &mut impl DownloadSink,
    ) -> Option<Download> {
        let image = match self.render(stage, document) {
            Ok(image) => image,
            Err(e) => {
                tracing::error!("Error generating image: {e}");
                return None;
            }
        };

        match sink.deliver(file_name, &image) {
            Ok(download) => {
                tracing::info!(
                    "Exported {} ({}x{})",
                    download.file_name,
                    image.width,
                    image.height
                );
                Some(download)
            }
            Err(e) => {
                tracing::error!("Error generating image: {}", RenderError::from(e));
                None
            }
        }
    }

    /// Rasterize a document through an off-screen stage attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or rasterization
    /// fails. The clone is detached in every case.
    pub fn render(&self, stage: &mut Stage, document: Document) -> RenderResult<RasterImage> {
        self.config.validate()?;
        let staged = stage.attach_offscreen(document);
        self.rasterizer.rasterize(&staged, &self.config)
    }
}
