//! Download sinks: where finished PNGs are delivered.

use std::path::{Path, PathBuf};

use crate::export::DEFAULT_FILE_NAME;
use crate::raster::RasterImage;

/// A delivered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// File name the image was offered under.
    pub file_name: String,
    /// Where it was written, if it touched the filesystem.
    pub location: Option<PathBuf>,
    /// The image.
    pub image: RasterImage,
}

/// Receives finished images.
pub trait DownloadSink {
    /// Deliver an image under `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be stored.
    fn deliver(&mut self, file_name: &str, image: &RasterImage) -> std::io::Result<Download>;
}

/// Make a user-supplied name safe to use as a single file name ending in
/// `.png`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return DEFAULT_FILE_NAME.to_string();
    }
    if Path::new(cleaned)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    {
        cleaned.to_string()
    } else {
        format!("{cleaned}.png")
    }
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Deliver into `dir`, creating it on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, image: &RasterImage) -> std::io::Result<Download> {
        std::fs::create_dir_all(&self.dir)?;
        let file_name = sanitize_file_name(file_name);
        let path = self.dir.join(&file_name);
        std::fs::write(&path, &image.png)?;
        tracing::info!("Saved {} ({}x{})", path.display(), image.width, image.height);
        Ok(Download {
            file_name,
            location: Some(path),
            image: image.clone(),
        })
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Vec<Download>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    #[must_use]
    pub fn downloads(&self) -> &[Download] {
        &self.downloads
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, file_name: &str, image: &RasterImage) -> std::io::Result<Download> {
        let download = Download {
            file_name: sanitize_file_name(file_name),
            location: None,
            image: image.clone(),
        };
        self.downloads.push(download.clone());
        Ok(download)
    }
}
