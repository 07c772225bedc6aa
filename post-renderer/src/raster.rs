//! Rasterization of staged documents into PNG images.

use std::sync::Arc;

use base64::Engine;
use post_core::{Document, StagedDocument};
use usvg::fontdb;

use crate::error::{RenderError, RenderResult};
use crate::export::ExportConfig;
use crate::layout::layout;
use crate::svg::{compose, Canvas};
use crate::text::{FontMeasure, TextMeasure};

/// Families tried, in order, for the generic `sans-serif` font.
const SANS_SERIF_CANDIDATES: &[&str] = &[
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
];

/// An encoded PNG with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl RasterImage {
    /// The PNG as a `data:image/png;base64,...` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.png);
        format!("data:image/png;base64,{encoded}")
    }
}

/// Turns a staged document into a bitmap.
pub trait Rasterizer {
    /// Rasterize the staged clone.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be painted or encoded.
    fn rasterize(
        &self,
        staged: &StagedDocument<'_>,
        config: &ExportConfig,
    ) -> RenderResult<RasterImage>;
}

/// Lay out a document and compose its SVG for the given export settings.
///
/// Text is broken into lines with `measure`. The canvas is `config.width`
/// wide when set, else the root container's width, else the default export
/// width. Height follows the content unless `config.height` fixes it.
#[must_use]
pub fn document_to_svg(
    document: &Document,
    config: &ExportConfig,
    measure: &dyn TextMeasure,
) -> (String, Canvas) {
    let width = config
        .width
        .or(document.root.style.width)
        .unwrap_or(post_core::sanitize::DEFAULT_EXPORT_WIDTH);
    let laid = layout(document, width, measure);
    let canvas = Canvas {
        width,
        height: config.height.unwrap_or(laid.height).max(1.0),
        scale: config.scale,
        background: config.background,
    };
    (compose(&laid, &canvas), canvas)
}

/// Rasterizer backed by usvg, resvg and tiny-skia.
#[derive(Debug, Clone)]
pub struct ResvgRasterizer {
    fontdb: Arc<fontdb::Database>,
    measure: FontMeasure,
}

impl ResvgRasterizer {
    /// Create a rasterizer using the system fonts.
    #[must_use]
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        if let Some(family) = SANS_SERIF_CANDIDATES
            .iter()
            .find(|name| has_family(&db, name))
        {
            db.set_sans_serif_family(*family);
        }
        tracing::debug!("Loaded {} font faces", db.len());

        Self::with_fontdb(Arc::new(db))
    }

    /// Create a rasterizer with a prepared font database.
    #[must_use]
    pub fn with_fontdb(fontdb: Arc<fontdb::Database>) -> Self {
        Self {
            measure: FontMeasure::new(Arc::clone(&fontdb)),
            fontdb,
        }
    }

    /// Measurer that breaks lines with this rasterizer's fonts.
    #[must_use]
    pub fn text_measure(&self) -> &FontMeasure {
        &self.measure
    }

    /// The SVG this rasterizer paints for a document.
    #[must_use]
    pub fn svg(&self, document: &Document, config: &ExportConfig) -> (String, Canvas) {
        document_to_svg(document, config, &self.measure)
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(family, _)| family == name))
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(
        &self,
        staged: &StagedDocument<'_>,
        config: &ExportConfig,
    ) -> RenderResult<RasterImage> {
        let (svg, canvas) = self.svg(staged.document(), config);
        let (width, height) = canvas.pixel_size();

        let pixels = u64::from(width) * u64::from(height);
        if pixels > config.max_pixels {
            return Err(RenderError::Raster(format!(
                "{width}x{height} exceeds the {} pixel limit",
                config.max_pixels
            )));
        }

        let opt = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::Raster(format!("SVG parsing failed: {e}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Raster(format!("Failed to create {width}x{height} pixmap"))
        })?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;

        tracing::debug!("Rasterized {width}x{height} ({} bytes)", png.len());
        Ok(RasterImage { width, height, png })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use post_core::{Container, Stage, TextBlock, TextStyle};

    use crate::text::ColumnMeasure;

    fn doc() -> Document {
        Document::new(
            Container::column(0.0).child(TextBlock::new("Hello\nWorld", TextStyle::default())),
        )
    }

    #[test]
    fn test_canvas_width_sources() {
        let config = ExportConfig::default();
        let (_, canvas) = document_to_svg(&doc(), &config, &ColumnMeasure);
        assert!((canvas.width - 600.0).abs() < f32::EPSILON);

        let mut fixed = doc();
        fixed.root.style.width = Some(400.0);
        let (_, canvas) = document_to_svg(&fixed, &config, &ColumnMeasure);
        assert!((canvas.width - 400.0).abs() < f32::EPSILON);

        let config = ExportConfig {
            width: Some(300.0),
            ..ExportConfig::default()
        };
        let (_, canvas) = document_to_svg(&fixed, &config, &ColumnMeasure);
        assert!((canvas.width - 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_height_follows_content() {
        let (svg, canvas) = document_to_svg(&doc(), &ExportConfig::default(), &ColumnMeasure);
        assert!((canvas.height - 48.0).abs() < 0.01);
        assert!(svg.contains(">Hello</tspan>"));
        assert!(svg.contains(">World</tspan>"));
    }

    #[test]
    fn test_rasterize_png() {
        let rasterizer = ResvgRasterizer::with_fontdb(Arc::new(fontdb::Database::new()));
        let mut stage = Stage::new();
        let staged = stage.attach_offscreen(doc());
        let image = rasterizer
            .rasterize(&staged, &ExportConfig::default())
            .expect("rasterize");
        assert_eq!((image.width, image.height), (1200, 96));
        assert_eq!(&image.png[0..4], &[137, 80, 78, 71]);
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_pixel_limit() {
        let rasterizer = ResvgRasterizer::with_fontdb(Arc::new(fontdb::Database::new()));
        let mut stage = Stage::new();
        let staged = stage.attach_offscreen(doc());
        let config = ExportConfig {
            max_pixels: 100,
            ..ExportConfig::default()
        };
        let err = rasterizer.rasterize(&staged, &config).unwrap_err();
        assert!(matches!(err, RenderError::Raster(_)));
    }
}
