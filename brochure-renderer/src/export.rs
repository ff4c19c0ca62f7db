//! Print export.
//!
//! Pages are exported from the same read-only render the preview uses: the
//! exporter draws each page onto a [`RetainedCanvas`] and serializes the
//! resulting paint list to SVG. With the `export` feature the SVG is further
//! rasterized to PNG through resvg/tiny-skia and bundled into a PDF with
//! printpdf.

use std::collections::HashMap;
use std::fmt::Write;

use brochure_core::{Color, Document, Page};

use crate::canvas::HostCanvas;
use crate::error::{RenderError, RenderResult};
use crate::object::{ObjectPaint, PaintFill, ShapePaint, StrokePaint, TextOrigin};
use crate::render::{render, RenderOptions};
use crate::retained::RetainedCanvas;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// SVG markup as UTF-8 bytes.
    Svg,
    /// PNG image. Requires the `export` feature.
    Png,
    /// PDF document. Requires the `export` feature.
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

/// Configuration for page export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output pixels per page pixel (e.g. 2.0 for retina).
    pub scale: f32,
    /// Extend the output by the bleed on every side.
    pub include_bleed: bool,
    /// Bleed width in page pixels.
    pub bleed: f32,
    /// DPI for print export.
    pub dpi: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            include_bleed: false,
            bleed: 0.0,
            dpi: 96.0,
        }
    }
}

/// Serializes pages for print.
#[derive(Debug, Clone, Default)]
pub struct PageExporter {
    config: ExportConfig,
    natural_sizes: HashMap<String, (f32, f32)>,
}

impl PageExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            natural_sizes: HashMap::new(),
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Register the natural size of an image so fit modes resolve.
    #[must_use]
    pub fn with_natural_size(mut self, src: impl Into<String>, width: f32, height: f32) -> Self {
        self.natural_sizes.insert(src.into(), (width, height));
        self
    }

    /// The export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export one page to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be rendered or encoded, or if the
    /// format needs the `export` feature and it is disabled.
    pub fn export(&self, page: &Page, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Svg => Ok(self.render_svg(page)?.into_bytes()),
            ExportFormat::Png => self.png_bytes(page),
            ExportFormat::Pdf => self.pdf_bytes(std::slice::from_ref(page)),
        }
    }

    /// Export every page of a document to SVG, in page order.
    ///
    /// The bleed comes from the document settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be rendered.
    pub fn export_document(&self, document: &Document) -> RenderResult<Vec<String>> {
        let exporter = self.for_document(document);
        document
            .pages
            .iter()
            .map(|page| exporter.render_svg(page))
            .collect()
    }

    /// Export a whole document as one multi-page PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails, or if the `export`
    /// feature is disabled.
    pub fn export_document_pdf(&self, document: &Document) -> RenderResult<Vec<u8>> {
        self.for_document(document).pdf_bytes(&document.pages)
    }

    fn for_document(&self, document: &Document) -> Self {
        let mut exporter = self.clone();
        exporter.config.bleed = document.settings.bleed;
        exporter
    }

    /// Export a page to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSize` for a non-positive scale or page size.
    pub fn render_svg(&self, page: &Page) -> RenderResult<String> {
        let (out_w, out_h) = self.output_dimensions(page)?;
        let bleed = if self.config.include_bleed {
            self.config.bleed.max(0.0)
        } else {
            0.0
        };
        let view_x = -bleed;
        let view_y = -bleed;
        let view_w = page.width + 2.0 * bleed;
        let view_h = page.height + 2.0 * bleed;

        let mut canvas = RetainedCanvas::new();
        for (src, (w, h)) in &self.natural_sizes {
            canvas.set_natural_size(src.clone(), *w, *h);
        }
        render(&mut canvas, page, &RenderOptions::read_only(page));

        let mut writer = SvgWriter::default();
        for (_, object) in canvas.objects() {
            writer.paint(object.paint());
        }

        let mut svg = String::with_capacity(4096 + writer.body.len());
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"{view_x} {view_y} {view_w} {view_h}\">",
        );
        if !writer.defs.is_empty() {
            let _ = write!(svg, "<defs>{}</defs>", writer.defs);
        }
        let _ = write!(
            svg,
            "<rect x=\"{view_x}\" y=\"{view_y}\" width=\"{view_w}\" height=\"{view_h}\"{}/>",
            fill_attrs("fill", canvas.background()),
        );
        svg.push_str(&writer.body);
        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Output dimensions (width, height) in pixels.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn output_dimensions(&self, page: &Page) -> RenderResult<(u32, u32)> {
        let scale = self.config.scale;
        let valid = scale.is_finite()
            && scale > 0.0
            && page.width.is_finite()
            && page.height.is_finite()
            && page.width > 0.0
            && page.height > 0.0;
        if !valid {
            return Err(RenderError::InvalidSize {
                width: page.width * scale,
                height: page.height * scale,
            });
        }
        let bleed = if self.config.include_bleed {
            2.0 * self.config.bleed.max(0.0)
        } else {
            0.0
        };
        let out_w = ((page.width + bleed) * scale).round() as u32;
        let out_h = ((page.height + bleed) * scale).round() as u32;
        Ok((out_w.max(1), out_h.max(1)))
    }

    #[cfg(feature = "export")]
    fn png_bytes(&self, page: &Page) -> RenderResult<Vec<u8>> {
        self.render_png(page)
    }

    #[cfg(not(feature = "export"))]
    #[allow(clippy::unused_self)]
    fn png_bytes(&self, _page: &Page) -> RenderResult<Vec<u8>> {
        Err(feature_disabled("PNG"))
    }

    #[cfg(feature = "export")]
    fn pdf_bytes(&self, pages: &[Page]) -> RenderResult<Vec<u8>> {
        self.render_pdf(pages)
    }

    #[cfg(not(feature = "export"))]
    #[allow(clippy::unused_self)]
    fn pdf_bytes(&self, _pages: &[Page]) -> RenderResult<Vec<u8>> {
        Err(feature_disabled("PDF"))
    }
}

#[cfg(not(feature = "export"))]
fn feature_disabled(format: &str) -> RenderError {
    RenderError::Export(format!("{format} export requires the `export` feature"))
}

#[cfg(feature = "export")]
impl PageExporter {
    /// Export a page to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_png(&self, page: &Page) -> RenderResult<Vec<u8>> {
        let svg = self.render_svg(page)?;
        let pixmap = Self::rasterize_svg(&svg)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export pages to one PDF, one raster page per page.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no pages or rendering fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn render_pdf(&self, pages: &[Page]) -> RenderResult<Vec<u8>> {
        let Some(first) = pages.first() else {
            return Err(RenderError::Export("Nothing to export".to_string()));
        };
        let dpi = self.config.dpi * self.config.scale;
        let size_mm = |page: &Page| -> RenderResult<(f32, f32)> {
            let (w, h) = self.output_dimensions(page)?;
            Ok((w as f32 / dpi * 25.4, h as f32 / dpi * 25.4))
        };

        let (w, h) = size_mm(first)?;
        let (doc, page1, layer1) = printpdf::PdfDocument::new(
            "Brochure Export",
            printpdf::Mm(w),
            printpdf::Mm(h),
            "Page 1",
        );
        let mut targets = vec![(page1, layer1)];
        for (index, page) in pages.iter().enumerate().skip(1) {
            let (w, h) = size_mm(page)?;
            targets.push(doc.add_page(
                printpdf::Mm(w),
                printpdf::Mm(h),
                format!("Page {}", index + 1),
            ));
        }

        for (page, (pdf_page, layer)) in pages.iter().zip(targets) {
            let png = self.render_png(page)?;
            // Decode PNG using printpdf's bundled image crate for compatibility
            let dynamic_image = printpdf::image_crate::load_from_memory(&png)
                .map_err(|e| RenderError::Export(format!("Failed to decode PNG for PDF: {e}")))?;
            let image = printpdf::Image::from_dynamic_image(&dynamic_image);
            let current_layer = doc.get_page(pdf_page).get_layer(layer);
            image.add_to_layer(
                current_layer,
                printpdf::ImageTransform {
                    translate_x: Some(printpdf::Mm(0.0)),
                    translate_y: Some(printpdf::Mm(0.0)),
                    dpi: Some(dpi),
                    ..Default::default()
                },
            );
        }

        doc.save_to_bytes()
            .map_err(|e| RenderError::Export(format!("PDF save failed: {e}")))
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(svg: &str) -> RenderResult<tiny_skia::Pixmap> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().ceil() as u32;
        let px_h = tree.size().height().ceil() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Accumulates SVG markup and the definitions it references.
#[derive(Default)]
struct SvgWriter {
    body: String,
    defs: String,
    next_def: usize,
}

impl SvgWriter {
    fn def_id(&mut self, prefix: &str) -> String {
        self.next_def += 1;
        format!("{prefix}{}", self.next_def)
    }

    fn paint(&mut self, paint: &ObjectPaint) {
        if !paint.visible {
            return;
        }
        let _ = write!(self.body, "<g transform=\"translate({},{})", paint.left, paint.top);
        if paint.angle.abs() > f32::EPSILON {
            let _ = write!(
                self.body,
                " rotate({},{},{})",
                paint.angle,
                paint.width / 2.0,
                paint.height / 2.0
            );
        }
        self.body.push('"');
        if paint.opacity < 1.0 {
            let _ = write!(self.body, " opacity=\"{}\"", paint.opacity.max(0.0));
        }
        self.body.push('>');

        match &paint.shape {
            ShapePaint::Text { .. } => self.text(paint),
            ShapePaint::Rect { fill, stroke, rx } => {
                let fill = self.fill(fill);
                let _ = write!(
                    self.body,
                    "<rect width=\"{}\" height=\"{}\"",
                    paint.width, paint.height
                );
                if *rx > 0.0 {
                    let _ = write!(self.body, " rx=\"{rx}\"");
                }
                let _ = write!(self.body, "{fill}{}/>", stroke_attrs(stroke.as_ref()));
            }
            ShapePaint::Circle {
                fill,
                stroke,
                radius,
            } => {
                let fill = self.fill(fill);
                let _ = write!(
                    self.body,
                    "<circle cx=\"{}\" cy=\"{}\" r=\"{radius}\"{fill}{}/>",
                    paint.width / 2.0,
                    paint.height / 2.0,
                    stroke_attrs(stroke.as_ref()),
                );
            }
            ShapePaint::Image {
                src,
                draw,
                clip: region,
                ..
            } => {
                let clip = self.def_id("clip");
                // clip rect lives in the object's local space
                let _ = write!(
                    self.defs,
                    "<clipPath id=\"{clip}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath>",
                    region.x, region.y, region.width, region.height
                );
                let _ = write!(
                    self.body,
                    "<g clip-path=\"url(#{clip})\"><image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/></g>",
                    draw.x,
                    draw.y,
                    draw.width,
                    draw.height,
                    escape_xml(src),
                );
            }
            ShapePaint::Group { children } => {
                for child in children {
                    self.paint(child);
                }
            }
        }
        self.body.push_str("</g>");
    }

    fn text(&mut self, paint: &ObjectPaint) {
        let ShapePaint::Text {
            content,
            font_family,
            font_size,
            font_weight,
            italic,
            underline,
            fill,
            line_height,
            char_spacing,
            origin,
            origin_x,
            ..
        } = &paint.shape
        else {
            return;
        };
        let anchor = match origin {
            TextOrigin::Left => "start",
            TextOrigin::Center => "middle",
            TextOrigin::Right => "end",
        };
        let _ = write!(
            self.body,
            "<text font-family=\"{}\" font-size=\"{font_size}\" font-weight=\"{font_weight}\" text-anchor=\"{anchor}\"{}",
            escape_xml(font_family),
            fill_attrs("fill", *fill),
        );
        if *italic {
            self.body.push_str(" font-style=\"italic\"");
        }
        if *underline {
            self.body.push_str(" text-decoration=\"underline\"");
        }
        if char_spacing.abs() > f32::EPSILON {
            let _ = write!(
                self.body,
                " letter-spacing=\"{}\"",
                char_spacing * font_size / 1000.0
            );
        }
        self.body.push('>');
        let advance = font_size * line_height;
        for (index, line) in content.split('\n').enumerate() {
            let dy = if index == 0 { *font_size } else { advance };
            let _ = write!(
                self.body,
                "<tspan x=\"{origin_x}\" dy=\"{dy}\">{}</tspan>",
                escape_xml(line)
            );
        }
        self.body.push_str("</text>");
    }

    fn fill(&mut self, fill: &PaintFill) -> String {
        match fill {
            PaintFill::Solid { color } => fill_attrs("fill", *color),
            PaintFill::Linear {
                x1,
                y1,
                x2,
                y2,
                stops,
            } => {
                let id = self.def_id("grad");
                let _ = write!(
                    self.defs,
                    "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\">",
                );
                for stop in stops {
                    let _ = write!(
                        self.defs,
                        "<stop offset=\"{}\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
                        stop.offset,
                        stop.color.to_hex(),
                        stop.color.a
                    );
                }
                self.defs.push_str("</linearGradient>");
                format!(" fill=\"url(#{id})\"")
            }
        }
    }
}

fn fill_attrs(attr: &str, color: Color) -> String {
    if color.is_transparent() {
        return format!(" {attr}=\"none\"");
    }
    let mut out = format!(" {attr}=\"{}\"", color.to_hex());
    if color.a < 1.0 {
        let _ = write!(out, " {attr}-opacity=\"{}\"", color.a);
    }
    out
}

fn stroke_attrs(stroke: Option<&StrokePaint>) -> String {
    match stroke {
        Some(stroke) if stroke.width > 0.0 && !stroke.color.is_transparent() => {
            format!("{} stroke-width=\"{}\"", fill_attrs("stroke", stroke.color), stroke.width)
        }
        _ => String::new(),
    }
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
