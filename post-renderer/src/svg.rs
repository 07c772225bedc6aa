//! SVG composition of laid-out documents.
//!
//! The SVG is the intermediate form handed to resvg. Its pixel size is the
//! CSS size multiplied by the export scale while the `viewBox` stays in CSS
//! pixels, so every coordinate below is written unscaled.

use std::fmt::Write;

use post_core::{FontWeight, ImageBlock, ObjectFit, TextStyle};

use crate::layout::{Item, LaidOut, Rect};

/// Offset and color of the drop shadow drawn under boxes.
const SHADOW_OFFSET: f32 = 2.0;
const SHADOW_FILL: &str = "rgba(0,0,0,0.1)";

/// Fraction of the font size between the em box top and the baseline.
const ASCENT: f32 = 0.8;

/// Canvas the document is painted on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    /// Width in CSS pixels.
    pub width: f32,
    /// Height in CSS pixels.
    pub height: f32,
    /// Device pixels per CSS pixel.
    pub scale: f32,
    /// Background as RGBA bytes.
    pub background: [u8; 4],
}

impl Canvas {
    /// Output size in device pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.width * self.scale).round().max(1.0) as u32;
        let h = (self.height * self.scale).round().max(1.0) as u32;
        (w, h)
    }
}

/// Compose a laid-out document into an SVG string.
#[must_use]
pub fn compose(laid: &LaidOut, canvas: &Canvas) -> String {
    let (out_w, out_h) = canvas.pixel_size();
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\">",
        canvas.width, canvas.height,
    );

    let bg = &canvas.background;
    let bg_alpha = f32::from(bg[3]) / 255.0;
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"rgba({},{},{},{})\"/>",
        bg[0], bg[1], bg[2], bg_alpha,
    );

    // Clip ids come from a counter so identical documents give identical SVG
    let mut clip_ids = 0usize;
    for item in &laid.items {
        match item {
            Item::Box { rect, style } => {
                let radius = style.border_radius.max(0.0);
                if style.shadow {
                    let _ = write!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" fill=\"{SHADOW_FILL}\"/>",
                        rect.x,
                        rect.y + SHADOW_OFFSET,
                        rect.width,
                        rect.height,
                    );
                }
                let fill = style
                    .background
                    .as_deref()
                    .map_or_else(|| "none".to_string(), escape_xml);
                let _ = write!(
                    svg,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" fill=\"{fill}\"",
                    rect.x, rect.y, rect.width, rect.height,
                );
                if let (Some(color), true) = (&style.border_color, style.border_width > 0.0) {
                    let _ = write!(
                        svg,
                        " stroke=\"{}\" stroke-width=\"{}\"",
                        escape_xml(color),
                        style.border_width,
                    );
                }
                svg.push_str("/>");
            }
            Item::Text { rect, lines, style } => write_text(&mut svg, rect, lines, style),
            Item::Image { rect, image } => {
                if image.is_embedded() {
                    write_image(&mut svg, rect, image, &mut clip_ids);
                } else {
                    // Remote sources are never fetched; the space stays blank
                    tracing::warn!("Skipping non-embedded image {}", image.src);
                }
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn write_text(svg: &mut String, rect: &Rect, lines: &[String], style: &TextStyle) {
    if lines.is_empty() {
        return;
    }
    let font_size = style.font_size;
    let advance = style.line_advance();
    let weight = match style.weight {
        FontWeight::Normal => "normal",
        FontWeight::Bold => "bold",
    };
    let _ = write!(
        svg,
        "<text xml:space=\"preserve\" font-family=\"{}\" font-size=\"{font_size}\" font-weight=\"{weight}\" fill=\"{}\">",
        escape_xml(&style.font_family),
        escape_xml(&style.color),
    );
    for (i, line) in lines.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let top = rect.y + i as f32 * advance;
        let baseline = top + (advance - font_size) / 2.0 + ASCENT * font_size;
        let _ = write!(
            svg,
            "<tspan x=\"{}\" y=\"{baseline}\">{}</tspan>",
            rect.x,
            escape_xml(line),
        );
    }
    svg.push_str("</text>");
}

fn write_image(svg: &mut String, rect: &Rect, image: &ImageBlock, clip_ids: &mut usize) {
    let aspect = match image.fit {
        ObjectFit::Cover => "xMidYMid slice",
        ObjectFit::Contain => "xMidYMid meet",
    };
    let clip_id = format!("clip-{clip_ids}");
    *clip_ids += 1;
    let radius = image.corner_radius.max(0.0);
    let _ = write!(
        svg,
        "<defs><clipPath id=\"{clip_id}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\"/></clipPath></defs>",
        rect.x, rect.y, rect.width, rect.height,
    );
    let _ = write!(
        svg,
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"{aspect}\" clip-path=\"url(#{clip_id})\" xlink:href=\"{}\"/>",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        escape_xml(&image.src),
    );
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use post_core::{BoxStyle, Container, Document, TextBlock};

    use crate::layout::layout;
    use crate::text::ColumnMeasure;

    fn canvas(width: f32, height: f32, scale: f32) -> Canvas {
        Canvas {
            width,
            height,
            scale,
            background: [255, 255, 255, 255],
        }
    }

    fn text_doc(content: &str) -> Document {
        Document::new(
            Container::column(0.0).child(TextBlock::new(content, TextStyle::default())),
        )
    }

    #[test]
    fn test_scale_factor() {
        let laid = layout(&text_doc("hi"), 100.0, &ColumnMeasure);
        let svg = compose(&laid, &canvas(100.0, 50.0, 2.0));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"200\""));
        assert!(svg.contains("height=\"100\""));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
    }

    #[test]
    fn test_text_lines_become_tspans() {
        let laid = layout(&text_doc("Hello\nWorld"), 600.0, &ColumnMeasure);
        let svg = compose(&laid, &canvas(600.0, laid.height, 1.0));
        assert!(svg.contains("xml:space=\"preserve\""));
        assert!(svg.contains(">Hello</tspan>"));
        assert!(svg.contains(">World</tspan>"));
    }

    #[test]
    fn test_xml_escaping() {
        let laid = layout(&text_doc("A < B & C > D"), 600.0, &ColumnMeasure);
        let svg = compose(&laid, &canvas(600.0, 24.0, 1.0));
        assert!(svg.contains("A &lt; B &amp; C &gt; D"));
    }

    #[test]
    fn test_remote_images_are_not_embedded() {
        let doc = Document::new(
            Container::column(0.0).child(post_core::ImageBlock::new("https://example.com/a.png")),
        );
        let laid = layout(&doc, 100.0, &ColumnMeasure);
        let svg = compose(&laid, &canvas(100.0, laid.height, 1.0));
        assert!(!svg.contains("<image"));
        assert!(!svg.contains("example.com"));
    }

    #[test]
    fn test_embedded_image_clip_ids_are_stable() {
        let src = "data:image/png;base64,AAAA";
        let doc = Document::new(
            Container::row(0.0)
                .child(post_core::ImageBlock::new(src).with_corner_radius(8.0))
                .child(post_core::ImageBlock::new(src)),
        );
        let laid = layout(&doc, 200.0, &ColumnMeasure);
        let first = compose(&laid, &canvas(200.0, laid.height, 1.0));
        let second = compose(&laid, &canvas(200.0, laid.height, 1.0));
        assert_eq!(first, second);
        assert!(first.contains("clip-0"));
        assert!(first.contains("clip-1"));
        assert!(first.contains("rx=\"8\""));
    }

    #[test]
    fn test_box_shadow_and_border() {
        let doc = Document::new(Container::column(0.0).with_style(BoxStyle {
            padding: 10.0,
            background: Some("#f0f2f5".to_string()),
            border_width: 1.0,
            border_color: Some("#dddfe2".to_string()),
            shadow: true,
            ..Default::default()
        }));
        let laid = layout(&doc, 100.0, &ColumnMeasure);
        let svg = compose(&laid, &canvas(100.0, laid.height, 1.0));
        assert!(svg.contains(SHADOW_FILL));
        assert!(svg.contains("fill=\"#f0f2f5\""));
        assert!(svg.contains("stroke=\"#dddfe2\""));
    }
}
