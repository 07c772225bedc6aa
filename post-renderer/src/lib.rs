//! # Postmock Renderer
//!
//! Export pipeline turning post documents into PNG downloads.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────┐   ┌─────────┐   ┌──────────┐
//! │ ViewNode │──▶│ Sanitizer │──▶│ Stage  │──▶│ Layout  │──▶│ SVG      │
//! └──────────┘   └───────────┘   │(guard) │   │ + text  │   │ compose  │
//!                                └────────┘   └─────────┘   └────┬─────┘
//!                 ┌──────────────┐   ┌─────────────────────┐     │
//!                 │ DownloadSink │◀──│ resvg / tiny-skia   │◀────┘
//!                 └──────────────┘   │ PNG encode          │
//!                                    └─────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod layout;
pub mod raster;
pub mod sink;
pub mod svg;
pub mod text;

pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportPipeline, DEFAULT_FILE_NAME};
pub use crate::image::{file_to_data_uri, probe_dimensions, ImageFormat};
pub use layout::{layout, Item, LaidOut, Rect};
pub use raster::{document_to_svg, RasterImage, Rasterizer, ResvgRasterizer};
pub use sink::{DirectorySink, Download, DownloadSink, MemorySink};
pub use svg::Canvas;
pub use text::{ColumnMeasure, FontMeasure, TextMeasure};
