//! Text measurement and line breaking.
//!
//! Lines are broken against a [`TextMeasure`]. [`FontMeasure`] reads glyph
//! advances from the same font database the rasterizer paints with, so a
//! wrapped line never runs past its box. [`ColumnMeasure`] estimates widths
//! from Unicode display columns and is used wherever no font resolves:
//! wide (CJK) characters take two columns, combining marks none.

use std::sync::Arc;

use post_core::{FontWeight, TextStyle, WhiteSpace};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;
use usvg::fontdb;

/// Average glyph advance as a fraction of the font size.
pub const AVERAGE_ADVANCE: f32 = 0.55;

/// Extra advance applied to bold text.
const BOLD_FACTOR: f32 = 1.05;

/// Slack allowed when comparing summed advances against the line width.
const FIT_EPSILON: f32 = 0.01;

/// Measures the rendered width of a run of text.
pub trait TextMeasure {
    /// Width in pixels of `text` drawn in `style`, on a single line.
    fn measure(&self, text: &str, style: &TextStyle) -> f32;
}

/// Width estimate from display columns, independent of installed fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMeasure;

impl TextMeasure for ColumnMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        measure_line(text, style)
    }
}

/// Width from real glyph advances in a font database.
///
/// The face is resolved from the style's family list and weight the same
/// way usvg resolves it. Graphemes the face has no glyph for, and styles no
/// face matches, fall back to the column estimate.
#[derive(Debug, Clone)]
pub struct FontMeasure {
    fontdb: Arc<fontdb::Database>,
}

impl FontMeasure {
    /// Measure with the faces in `fontdb`.
    #[must_use]
    pub fn new(fontdb: Arc<fontdb::Database>) -> Self {
        Self { fontdb }
    }

    /// Check whether some face matches the style.
    #[must_use]
    pub fn resolves(&self, style: &TextStyle) -> bool {
        self.resolve(style).is_some()
    }

    fn resolve(&self, style: &TextStyle) -> Option<fontdb::ID> {
        let families = parse_families(&style.font_family);
        let weight = match style.weight {
            FontWeight::Normal => fontdb::Weight::NORMAL,
            FontWeight::Bold => fontdb::Weight::BOLD,
        };
        self.fontdb.query(&fontdb::Query {
            families: &families,
            weight,
            ..fontdb::Query::default()
        })
    }
}

impl TextMeasure for FontMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        let Some(id) = self.resolve(style) else {
            return measure_line(text, style);
        };
        self.fontdb
            .with_face_data(id, |data, index| {
                let face = ttf_parser::Face::parse(data, index).ok()?;
                let scale = style.font_size / f32::from(face.units_per_em());
                let fallback = column_advance(style);
                Some(
                    text.graphemes(true)
                        .map(|g| grapheme_advance(&face, g, scale, fallback))
                        .sum(),
                )
            })
            .flatten()
            .unwrap_or_else(|| measure_line(text, style))
    }
}

/// Split a CSS font family list into fontdb families.
fn parse_families(list: &str) -> Vec<fontdb::Family<'_>> {
    let mut families: Vec<_> = list
        .split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .map(|name| match name {
            "serif" => fontdb::Family::Serif,
            "sans-serif" => fontdb::Family::SansSerif,
            "monospace" => fontdb::Family::Monospace,
            "cursive" => fontdb::Family::Cursive,
            "fantasy" => fontdb::Family::Fantasy,
            other => fontdb::Family::Name(other),
        })
        .collect();
    if families.is_empty() {
        families.push(fontdb::Family::SansSerif);
    }
    families
}

fn grapheme_advance(face: &ttf_parser::Face<'_>, grapheme: &str, scale: f32, column: f32) -> f32 {
    let mut width = 0.0;
    for ch in grapheme.chars() {
        let Some(advance) = face.glyph_index(ch).and_then(|g| face.glyph_hor_advance(g)) else {
            #[allow(clippy::cast_precision_loss)]
            let columns = grapheme_columns(grapheme) as f32;
            return columns * column;
        };
        width += f32::from(advance) * scale;
    }
    width
}

/// Horizontal advance of one display column for a style.
#[must_use]
pub fn column_advance(style: &TextStyle) -> f32 {
    let advance = style.font_size * AVERAGE_ADVANCE;
    match style.weight {
        FontWeight::Normal => advance,
        FontWeight::Bold => advance * BOLD_FACTOR,
    }
}

/// Display columns of a grapheme cluster.
fn grapheme_columns(grapheme: &str) -> usize {
    grapheme.width()
}

/// Column-estimated width of a single line in pixels.
#[must_use]
pub fn measure_line(text: &str, style: &TextStyle) -> f32 {
    let columns: usize = text.graphemes(true).map(grapheme_columns).sum();
    #[allow(clippy::cast_precision_loss)]
    let columns = columns as f32;
    columns * column_advance(style)
}

/// Break text into lines no wider than `max_width` pixels.
///
/// Under [`WhiteSpace::PreWrap`] every `\n` is a hard break and runs of
/// spaces are kept. Under [`WhiteSpace::Normal`] all whitespace collapses
/// to single spaces first. Empty text produces no lines. A line always
/// holds at least one grapheme, however narrow `max_width` is.
#[must_use]
pub fn wrap(
    text: &str,
    style: &TextStyle,
    max_width: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let breaker = LineBreaker {
        style,
        measure,
        max_width: if max_width.is_finite() {
            max_width.max(0.0) + FIT_EPSILON
        } else {
            f32::INFINITY
        },
    };

    let mut lines = Vec::new();
    match style.white_space {
        WhiteSpace::PreWrap => {
            for raw_line in text.split('\n') {
                breaker.wrap_line(raw_line.trim_end_matches('\r'), &mut lines);
            }
        }
        WhiteSpace::Normal => {
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if collapsed.is_empty() {
                return Vec::new();
            }
            breaker.wrap_line(&collapsed, &mut lines);
        }
    }
    lines
}

struct LineBreaker<'a> {
    style: &'a TextStyle,
    measure: &'a dyn TextMeasure,
    max_width: f32,
}

impl LineBreaker<'_> {
    fn width(&self, text: &str) -> f32 {
        self.measure.measure(text, self.style)
    }

    /// Wrap one hard line at word boundaries.
    fn wrap_line(&self, line: &str, lines: &mut Vec<String>) {
        let mut current = String::new();
        let mut current_width = 0.0;

        for segment in line.split_word_bounds() {
            let seg_width = self.width(segment);

            if current_width + seg_width > self.max_width {
                if !current.is_empty() {
                    lines.push(current.trim_end().to_string());
                    current.clear();
                    current_width = 0.0;
                }

                if seg_width > self.max_width {
                    self.break_graphemes(segment, lines, &mut current, &mut current_width);
                    continue;
                }

                // Whitespace that caused the break does not start the next line.
                if segment.chars().all(char::is_whitespace) {
                    continue;
                }
            }

            current.push_str(segment);
            current_width += seg_width;
        }

        lines.push(current);
    }

    /// Split a word wider than the line by grapheme clusters.
    fn break_graphemes(
        &self,
        segment: &str,
        lines: &mut Vec<String>,
        current: &mut String,
        current_width: &mut f32,
    ) {
        for grapheme in segment.graphemes(true) {
            let width = self.width(grapheme);
            if *current_width + width > self.max_width && !current.is_empty() {
                lines.push(std::mem::take(current));
                *current_width = 0.0;
            }
            current.push_str(grapheme);
            *current_width += width;
        }
    }
}
