//! Integration tests for the export pipeline (post-renderer).
//!
//! Covers staging cleanup on every exit path, textarea fidelity, text
//! painted with system fonts, output determinism, sizing, and delivery.

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use post_core::{
    BoxStyle, Container, Document, Post, PostDraft, PostStyle, Stage, StageId, StagedDocument,
    TextBlock, TextStyle, ViewNode,
};
use post_renderer::{
    DirectorySink, Download, DownloadSink, ExportConfig, ExportPipeline, RasterImage, Rasterizer,
    RenderError, RenderResult, ResvgRasterizer, DEFAULT_FILE_NAME,
};
use post_renderer::sink::MemorySink;
use usvg::fontdb;

const PNG_1X1: &str = concat!(
    "data:image/png;base64,",
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0g",
    "AAAABJRU5ErkJggg=="
);

fn rasterizer() -> ResvgRasterizer {
    ResvgRasterizer::with_fontdb(Arc::new(fontdb::Database::new()))
}

fn pipeline(config: ExportConfig) -> ExportPipeline {
    ExportPipeline::with_rasterizer(config, rasterizer())
}

/// An editor view shaped like the post card: text area, images, controls.
fn editor_view(text: &str) -> ViewNode {
    let mut draft = PostDraft::new();
    draft.focus();
    draft.set_text(text);
    draft.add_images([PNG_1X1.to_string()]);
    draft.view()
}

/// Records the staged id, then fails.
#[derive(Default)]
struct FailingRasterizer {
    seen: Cell<Option<StageId>>,
}

impl Rasterizer for FailingRasterizer {
    fn rasterize(
        &self,
        staged: &StagedDocument<'_>,
        _config: &ExportConfig,
    ) -> RenderResult<RasterImage> {
        assert!(staged.is_attached());
        assert!(!staged.placement().is_visible());
        self.seen.set(Some(staged.id()));
        Err(RenderError::Raster("forced failure".to_string()))
    }
}

struct PanickingRasterizer;

impl Rasterizer for PanickingRasterizer {
    fn rasterize(
        &self,
        _staged: &StagedDocument<'_>,
        _config: &ExportConfig,
    ) -> RenderResult<RasterImage> {
        panic!("rasterizer crashed");
    }
}

struct BrokenSink;

impl DownloadSink for BrokenSink {
    fn deliver(&mut self, _file_name: &str, _image: &RasterImage) -> std::io::Result<Download> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
    }
}

// ==========================================================================
// Staging cleanup
// ==========================================================================

#[test]
fn test_clone_detached_after_raster_failure() {
    let pipeline =
        ExportPipeline::with_rasterizer(ExportConfig::default(), FailingRasterizer::default());
    let mut stage = Stage::new();
    let mut sink = MemorySink::new();

    let result = pipeline
        .export(&mut stage, &editor_view("Hello"), DEFAULT_FILE_NAME, &mut sink)
        .expect("sanitize succeeds");

    assert!(result.is_none());
    let id = pipeline.rasterizer().seen.get().expect("rasterizer ran");
    assert!(!stage.contains(id));
    assert!(stage.is_empty());
    assert!(sink.downloads().is_empty());
}

#[test]
fn test_clone_detached_after_panic() {
    let pipeline = ExportPipeline::with_rasterizer(ExportConfig::default(), PanickingRasterizer);
    let mut stage = Stage::new();
    let mut sink = MemorySink::new();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pipeline.export(&mut stage, &editor_view("Hello"), DEFAULT_FILE_NAME, &mut sink)
    }));

    assert!(outcome.is_err());
    assert!(stage.is_empty());
}

#[test]
fn test_sanitize_error_propagates_without_staging() {
    let pipeline = pipeline(ExportConfig::default());
    let mut stage = Stage::new();
    let mut sink = MemorySink::new();
    let view = ViewNode::column(0.0, vec![ViewNode::image("")]);

    let err = pipeline
        .export(&mut stage, &view, DEFAULT_FILE_NAME, &mut sink)
        .unwrap_err();
    assert!(matches!(err, RenderError::Sanitize(_)));
    assert!(stage.is_empty());
}

#[test]
fn test_delivery_failure_is_swallowed() {
    let pipeline = pipeline(ExportConfig::default());
    let mut stage = Stage::new();

    let result = pipeline
        .export(&mut stage, &editor_view("Hello"), DEFAULT_FILE_NAME, &mut BrokenSink)
        .expect("sanitize succeeds");
    assert!(result.is_none());
    assert!(stage.is_empty());
}

#[test]
fn test_live_documents_untouched() {
    let pipeline = pipeline(ExportConfig::default());
    let mut stage = Stage::new();
    let live = Document::new(
        Container::column(0.0).child(TextBlock::new("on screen", TextStyle::default())),
    );
    let live_id = stage.attach(live.clone(), post_core::Point::new(0.0, 0.0));
    let mut sink = MemorySink::new();

    pipeline
        .export(&mut stage, &editor_view("Hello"), DEFAULT_FILE_NAME, &mut sink)
        .expect("sanitize")
        .expect("download");

    assert_eq!(stage.len(), 1);
    let visible: Vec<_> = stage.visible_documents().collect();
    assert_eq!(visible, vec![(live_id, &live)]);
}

// ==========================================================================
// Fidelity
// ==========================================================================

#[test]
fn test_textarea_value_rendered_with_line_breaks() {
    let config = ExportConfig::default();
    let pipeline = pipeline(config.clone());
    let view = editor_view("Hello\nWorld");

    let document = post_core::Sanitizer::default().sanitize(&view).expect("sanitize");
    let (svg, _) = pipeline.rasterizer().svg(&document, pipeline.config());
    assert!(svg.contains(">Hello</tspan>"));
    assert!(svg.contains(">World</tspan>"));
    // Editor chrome never reaches the export
    assert!(!svg.contains("✕"));

    let mut stage = Stage::new();
    let mut sink = MemorySink::new();
    let download = pipeline
        .export(&mut stage, &view, DEFAULT_FILE_NAME, &mut sink)
        .expect("sanitize")
        .expect("download");
    assert_eq!(&download.image.png[0..4], &[137, 80, 78, 71]);
}

/// Column range of the dark pixels in a decoded PNG.
fn dark_columns(png: &[u8]) -> Option<(u32, u32)> {
    let pixels = image::load_from_memory(png).expect("decode png").to_rgba8();
    pixels
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] < 128 && p[1] < 128 && p[2] < 128)
        .fold(None, |range, (x, _, _)| match range {
            None => Some((x, x)),
            Some((min, max)) => Some((min.min(x), max.max(x))),
        })
}

#[test]
fn test_system_font_text_stays_inside_content_box() {
    let rasterizer = ResvgRasterizer::new();
    let style = TextStyle::default();
    if !rasterizer.text_measure().resolves(&style) {
        eprintln!("no system font matches {:?}; skipping", style.font_family);
        return;
    }

    let pipeline = ExportPipeline::with_rasterizer(
        ExportConfig {
            scale: 1.0,
            ..ExportConfig::default()
        },
        rasterizer,
    );
    let padding = 16.0;
    let document = Document::new(
        Container::column(8.0)
            .with_style(BoxStyle {
                width: Some(600.0),
                padding,
                ..BoxStyle::default()
            })
            .child(TextBlock::new("W".repeat(200), style.clone()))
            .child(TextBlock::new("PUBLICAÇÃO EM MAIÚSCULAS ".repeat(10), style)),
    );
    let mut stage = Stage::new();

    let first = pipeline.render(&mut stage, document.clone()).expect("render");
    assert_eq!(first.width, 600);
    let (left, right) = dark_columns(&first.png).expect("glyphs were painted");
    // Glyph outlines may overhang their advance by a pixel or two
    assert!(left >= 14, "text starts at x={left}");
    assert!(right <= 586, "text runs to x={right}, past the content box");

    let second = pipeline.render(&mut stage, document).expect("render");
    assert_eq!(first.png, second.png);
    assert!(stage.is_empty());
}

// ==========================================================================
// Determinism and sizing
// ==========================================================================

#[test]
fn test_export_is_idempotent() {
    let pipeline = pipeline(ExportConfig::default());
    let mut stage = Stage::new();
    let mut sink = MemorySink::new();
    let view = editor_view("Same post\ntwice");

    let first = pipeline
        .export(&mut stage, &view, "a.png", &mut sink)
        .expect("sanitize")
        .expect("first");
    let second = pipeline
        .export(&mut stage, &view, "b.png", &mut sink)
        .expect("sanitize")
        .expect("second");

    assert_eq!(
        (first.image.width, first.image.height),
        (second.image.width, second.image.height)
    );
    assert_eq!(first.image.png, second.image.png);
    assert!(stage.is_empty());
}

#[test]
fn test_default_scale_doubles_width() {
    let pipeline = pipeline(ExportConfig::default());
    let mut stage = Stage::new();
    let mut sink = MemorySink::new();

    let download = pipeline
        .export(&mut stage, &editor_view("Hello"), DEFAULT_FILE_NAME, &mut sink)
        .expect("sanitize")
        .expect("download");
    assert_eq!(download.image.width, 1200);
}

#[test]
fn test_fixed_height() {
    let pipeline = pipeline(ExportConfig {
        width: Some(400.0),
        height: Some(300.0),
        scale: 1.0,
        ..ExportConfig::default()
    });
    let mut stage = Stage::new();
    let mut sink = MemorySink::new();

    let download = pipeline
        .export(&mut stage, &editor_view("Hello"), DEFAULT_FILE_NAME, &mut sink)
        .expect("sanitize")
        .expect("download");
    assert_eq!((download.image.width, download.image.height), (400, 300));
}

#[test]
fn test_oversize_export_rejected() {
    let pipeline = pipeline(ExportConfig {
        height: Some(100_000.0),
        ..ExportConfig::default()
    });
    let mut stage = Stage::new();
    let mut sink = MemorySink::new();

    let result = pipeline
        .export(&mut stage, &editor_view("Hello"), DEFAULT_FILE_NAME, &mut sink)
        .expect("sanitize");
    assert!(result.is_none());
    assert!(stage.is_empty());
}

// ==========================================================================
// Posts and delivery
// ==========================================================================

#[test]
fn test_post_document_to_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let post = Post::new("Olá mundo", vec![PNG_1X1.to_string(), PNG_1X1.to_string()])
        .with_created_at(1_709_647_620_000);
    let pipeline = pipeline(ExportConfig::default());
    let mut stage = Stage::new();
    let mut sink = DirectorySink::new(dir.path());

    for style in [PostStyle::Facebook, PostStyle::Twitter] {
        let download = pipeline
            .export_document(
                &mut stage,
                post.to_document(style),
                &post.export_file_name(),
                &mut sink,
            )
            .expect("download");
        let path = download.location.expect("written to disk");
        assert_eq!(path, dir.path().join("post-2024-03-05-14-07.png"));
        let bytes = std::fs::read(&path).expect("read png");
        assert_eq!(bytes, download.image.png);
    }
    assert!(stage.is_empty());
}

#[test]
fn test_data_uri_output() {
    let pipeline = pipeline(ExportConfig::default());
    let mut stage = Stage::new();
    let document = Post::new("uri", Vec::new()).to_document(PostStyle::Twitter);

    let image = pipeline.render(&mut stage, document).expect("render");
    assert!(image.data_uri().starts_with("data:image/png;base64,iVBORw0KGgo"));
}
