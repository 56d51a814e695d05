//! Single-page A4 report drawing.
//!
//! All coordinates here are PDF points with the origin at the bottom-left
//! corner of the page. printpdf takes millimetres, so every call goes through
//! [`mm`] at the edge.

use std::f32::consts::PI;
use std::io::BufWriter;
use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

use crate::analysis::AnalysisResult;

use super::layout::{
    stack_region_cards, text_width, PlacedCard, ReportFont, CARD_TEXT_INSET_LEFT,
    DESCRIPTION_LINE, DESCRIPTION_SIZE, SUBTITLE_LINE, SUBTITLE_SIZE, TITLE_LINE, TITLE_SIZE,
};
use super::palette::*;
use super::ReportError;

const PAGE_WIDTH: f32 = 595.2756;
const PAGE_HEIGHT: f32 = 841.8898;
const MARGIN: f32 = 30.0;

const HEADER_HEIGHT: f32 = 90.0;
const FOOTER_RULE_Y: f32 = 62.0;

const IMAGE_CARD_WIDTH: f32 = 145.0;
const IMAGE_CARD_HEIGHT: f32 = 183.0;
const IMAGE_CARD_GAP: f32 = 52.0;
const IMAGE_BOX_WIDTH: f32 = 115.0;
const IMAGE_BOX_HEIGHT: f32 = 145.0;

const SECTION_SIZE: f32 = 11.0;

const DOCUMENT_TITLE: &str = "GlowMetrics Análise Facial";
const DISCLAIMER: &str =
    "*Análise realizada por Inteligência Artificial. Não substitui avaliação médica profissional.";

/// Points to printpdf millimetres.
fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn point(x: f32, y: f32) -> (Point, bool) {
    (Point::new(mm(x), mm(y)), false)
}

/// Render the report for one before/after pair and return the PDF bytes.
///
/// Both images are decoded up front so an unreadable file fails before any
/// drawing starts.
pub fn render_report(
    before: &Path,
    after: &Path,
    result: &AnalysisResult,
) -> Result<Vec<u8>, ReportError> {
    let _span = tracing::info_span!("render_report").entered();

    let before_img = load_image(before)?;
    let after_img = load_image(after)?;

    let (doc, page1, layer1) =
        PdfDocument::new(DOCUMENT_TITLE, Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?,
        oblique: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?,
    };
    let page = Page { layer, fonts };

    page.draw_background();
    page.draw_header(&chrono::Local::now().format("%d/%m/%Y às %H:%M").to_string());

    let section_y = PAGE_HEIGHT - 118.0;
    page.draw_section_title(MARGIN, section_y, "Sua Transformação");
    let cards_bottom = page.draw_image_pair(&before_img, &after_img, section_y - 22.0);

    let regions_y = cards_bottom - 28.0;
    page.draw_section_title(MARGIN, regions_y, "Análise por Região");

    let cards = stack_region_cards(&result.areas, PAGE_WIDTH - 2.0 * MARGIN, regions_y - 18.0);
    for card in &cards {
        page.draw_region_card(MARGIN, PAGE_WIDTH - 2.0 * MARGIN, card);
    }

    page.draw_footer();

    tracing::debug!(regions = cards.len(), "Report drawn");

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
}

/// Render the report and write it to `out`.
pub fn write_report(
    before: &Path,
    after: &Path,
    result: &AnalysisResult,
    out: &Path,
) -> Result<(), ReportError> {
    let bytes = render_report(before, after, result)?;
    std::fs::write(out, bytes)?;
    Ok(())
}

/// Decode by content, not extension: downloaded files are always `.jpg`.
fn load_image(path: &Path) -> Result<::image::DynamicImage, ReportError> {
    let to_err = |reason: String| ReportError::Image {
        path: path.to_path_buf(),
        reason,
    };
    let decoded = ::image::io::Reader::open(path)
        .map_err(|e| to_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| to_err(e.to_string()))?
        .decode()
        .map_err(|e| to_err(e.to_string()))?;

    // Alpha channels are flattened; the page background is opaque anyway.
    Ok(::image::DynamicImage::ImageRgb8(decoded.to_rgb8()))
}

// ═══════════════════════════════════════════════════════════
// Drawing
// ═══════════════════════════════════════════════════════════

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: ReportFont) -> &IndirectFontRef {
        match font {
            ReportFont::Regular => &self.regular,
            ReportFont::Bold => &self.bold,
            ReportFont::Oblique => &self.oblique,
        }
    }
}

struct Page {
    layer: PdfLayerReference,
    fonts: Fonts,
}

enum Align {
    Left,
    Center,
    Right,
}

impl Page {
    // ─── Primitives ───

    fn text(&self, x: f32, y: f32, text: &str, font: ReportFont, size: f32, color: Rgb8, align: Align) {
        let x = match align {
            Align::Left => x,
            Align::Center => x - text_width(text, font, size) / 2.0,
            Align::Right => x - text_width(text, font, size),
        };
        self.layer.set_fill_color(color.to_pdf());
        self.layer.use_text(text, size, mm(x), mm(y), self.fonts.get(font));
    }

    fn line(&self, from: (f32, f32), to: (f32, f32), color: Rgb8, thickness: f32) {
        self.layer.set_outline_color(color.to_pdf());
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![point(from.0, from.1), point(to.0, to.1)],
            is_closed: false,
        });
    }

    fn shape(&self, points: Vec<(Point, bool)>, fill: Option<Rgb8>, stroke: Option<(Rgb8, f32)>) {
        let mode = match (fill, stroke) {
            (Some(_), Some(_)) => PaintMode::FillStroke,
            (Some(_), None) => PaintMode::Fill,
            (None, Some(_)) => PaintMode::Stroke,
            (None, None) => return,
        };
        if let Some(color) = fill {
            self.layer.set_fill_color(color.to_pdf());
        }
        if let Some((color, thickness)) = stroke {
            self.layer.set_outline_color(color.to_pdf());
            self.layer.set_outline_thickness(thickness);
        }
        self.layer.add_polygon(Polygon {
            rings: vec![points],
            mode,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn rect(&self, x: f32, y: f32, w: f32, h: f32, fill: Rgb8) {
        let points = vec![point(x, y), point(x + w, y), point(x + w, y + h), point(x, y + h)];
        self.shape(points, Some(fill), None);
    }

    fn rounded_rect(
        &self,
        (x, y, w, h): (f32, f32, f32, f32),
        radius: f32,
        fill: Option<Rgb8>,
        stroke: Option<(Rgb8, f32)>,
    ) {
        self.shape(rounded_rect_points(x, y, w, h, radius), fill, stroke);
    }

    fn circle(&self, cx: f32, cy: f32, r: f32, fill: Option<Rgb8>, stroke: Option<(Rgb8, f32)>) {
        let points = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let a = 2.0 * PI * i as f32 / CIRCLE_SEGMENTS as f32;
                point(cx + r * a.cos(), cy + r * a.sin())
            })
            .collect();
        self.shape(points, fill, stroke);
    }

    // ─── Sections ───

    fn draw_background(&self) {
        self.rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, BG_MAIN);
        let tint = ROSE_LIGHT.over(BG_MAIN, 0.3);
        self.circle(PAGE_WIDTH + 50.0, PAGE_HEIGHT - 100.0, 200.0, Some(tint), None);
        self.circle(-80.0, 150.0, 180.0, Some(tint), None);
    }

    fn draw_header(&self, timestamp: &str) {
        let base = PAGE_HEIGHT - HEADER_HEIGHT;
        self.rect(0.0, base, PAGE_WIDTH, HEADER_HEIGHT, WHITE);
        self.line((MARGIN, base), (PAGE_WIDTH - MARGIN, base), GOLD, 2.0);

        self.text(MARGIN, PAGE_HEIGHT - 45.0, "Análise Facial", ReportFont::Bold, 24.0, TEXT_DARK, Align::Left);
        self.text(
            MARGIN,
            PAGE_HEIGHT - 65.0,
            "Relatório de Resultados Estéticos",
            ReportFont::Regular,
            11.0,
            ROSE_DARK,
            Align::Left,
        );

        // Logo mark and wordmark
        let logo_x = PAGE_WIDTH - 145.0;
        let mark_y = PAGE_HEIGHT - 45.0;
        self.circle(logo_x + 12.0, mark_y, 20.0, Some(GOLD.over(WHITE, 0.15)), None);
        self.circle(logo_x + 12.0, mark_y, 12.0, None, Some((ROSE, 2.0)));
        self.circle(logo_x + 12.0, mark_y, 5.0, Some(ROSE), None);
        self.text(logo_x + 32.0, PAGE_HEIGHT - 40.0, "Glow", ReportFont::Bold, 14.0, ROSE_DARK, Align::Left);
        let metrics_x = logo_x + 32.0 + text_width("Glow", ReportFont::Bold, 14.0);
        self.text(metrics_x, PAGE_HEIGHT - 40.0, "Metrics", ReportFont::Regular, 14.0, TEXT_DARK, Align::Left);
        self.text(
            logo_x + 32.0,
            PAGE_HEIGHT - 52.0,
            "Análise de Beleza Inteligente",
            ReportFont::Regular,
            7.0,
            TEXT_LIGHT,
            Align::Left,
        );

        self.text(
            PAGE_WIDTH - MARGIN,
            PAGE_HEIGHT - 78.0,
            timestamp,
            ReportFont::Regular,
            8.0,
            TEXT_LIGHT,
            Align::Right,
        );
    }

    fn draw_section_title(&self, x: f32, y: f32, title: &str) {
        self.text(x, y, title, ReportFont::Bold, SECTION_SIZE, ROSE_DARK, Align::Left);
        let rule_start = x + text_width(title, ReportFont::Bold, SECTION_SIZE) + 8.0;
        self.line((rule_start, y + 4.0), (rule_start + 55.0, y + 4.0), GOLD, 1.0);
    }

    /// Draws the two photo cards hanging from `top` and returns their bottom edge.
    fn draw_image_pair(&self, before: &::image::DynamicImage, after: &::image::DynamicImage, top: f32) -> f32 {
        let card_y = top - IMAGE_CARD_HEIGHT;
        let before_x = MARGIN;
        let after_x = before_x + IMAGE_CARD_WIDTH + IMAGE_CARD_GAP;

        self.rounded_rect(
            (before_x, card_y, IMAGE_CARD_WIDTH, IMAGE_CARD_HEIGHT),
            12.0,
            Some(WHITE),
            Some((BORDER, 1.0)),
        );
        self.text(
            before_x + IMAGE_CARD_WIDTH / 2.0,
            card_y + IMAGE_CARD_HEIGHT - 18.0,
            "Antes",
            ReportFont::Regular,
            9.0,
            TEXT_LIGHT,
            Align::Center,
        );
        self.image_fit(before, before_x, card_y);

        // Arrow between the cards
        let arrow_x = before_x + IMAGE_CARD_WIDTH + 12.0;
        let arrow_y = card_y + IMAGE_CARD_HEIGHT / 2.0;
        self.line((arrow_x, arrow_y), (arrow_x + 28.0, arrow_y), ROSE, 1.5);
        self.line((arrow_x + 22.0, arrow_y + 5.0), (arrow_x + 28.0, arrow_y), ROSE, 1.5);
        self.line((arrow_x + 22.0, arrow_y - 5.0), (arrow_x + 28.0, arrow_y), ROSE, 1.5);

        self.rounded_rect(
            (after_x, card_y, IMAGE_CARD_WIDTH, IMAGE_CARD_HEIGHT),
            12.0,
            Some(WHITE),
            Some((ROSE, 2.0)),
        );
        self.text(
            after_x + IMAGE_CARD_WIDTH / 2.0,
            card_y + IMAGE_CARD_HEIGHT - 18.0,
            "Depois",
            ReportFont::Bold,
            9.0,
            ROSE_DARK,
            Align::Center,
        );
        self.image_fit(after, after_x, card_y);

        card_y
    }

    /// Places `img` in the card's image box, scaled to fit and centered.
    fn image_fit(&self, img: &::image::DynamicImage, card_x: f32, card_y: f32) {
        let (px_w, px_h) = (img.width() as f32, img.height() as f32);
        if px_w == 0.0 || px_h == 0.0 {
            return;
        }
        let (w, h) = fit_within(px_w, px_h, IMAGE_BOX_WIDTH, IMAGE_BOX_HEIGHT);
        let box_x = card_x + (IMAGE_CARD_WIDTH - IMAGE_BOX_WIDTH) / 2.0;
        let box_y = card_y + 10.0;

        // At 72 dpi one pixel is one point, so the scale is target / pixels.
        Image::from_dynamic_image(img).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(mm(box_x + (IMAGE_BOX_WIDTH - w) / 2.0)),
                translate_y: Some(mm(box_y + (IMAGE_BOX_HEIGHT - h) / 2.0)),
                scale_x: Some(w / px_w),
                scale_y: Some(h / px_h),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
    }

    fn draw_region_card(&self, x: f32, width: f32, card: &PlacedCard) {
        let layout = &card.layout;
        let bottom = card.top - layout.height;

        self.rounded_rect((x, bottom, width, layout.height), 10.0, Some(WHITE), Some((BORDER, 0.8)));
        self.rounded_rect(
            (x, bottom + 8.0, 4.0, layout.height - 16.0),
            2.0,
            Some(card.style.accent),
            None,
        );

        let grade = grade_style(layout.grade);
        self.text(
            x + width - 18.0,
            card.top - 18.0,
            grade.label,
            ReportFont::Bold,
            8.0,
            grade.color,
            Align::Right,
        );

        let text_x = x + CARD_TEXT_INSET_LEFT;
        let mut y = card.top - 18.0;
        for line in &layout.title_lines {
            self.text(text_x, y, line, ReportFont::Bold, TITLE_SIZE, TEXT_DARK, Align::Left);
            y -= TITLE_LINE;
        }
        y -= 4.0;
        for line in &layout.description_lines {
            self.text(text_x, y, line, ReportFont::Oblique, DESCRIPTION_SIZE, TEXT_MEDIUM, Align::Left);
            y -= DESCRIPTION_LINE;
        }
        y -= 4.0;
        for line in &layout.subtitle_lines {
            self.text(text_x, y, line, ReportFont::Regular, SUBTITLE_SIZE, TEXT_LIGHT, Align::Left);
            y -= SUBTITLE_LINE;
        }
    }

    fn draw_footer(&self) {
        self.line((MARGIN, FOOTER_RULE_Y), (PAGE_WIDTH - MARGIN, FOOTER_RULE_Y), GOLD, 0.8);
        self.text(PAGE_WIDTH / 2.0, 48.0, DISCLAIMER, ReportFont::Regular, 7.0, TEXT_LIGHT, Align::Center);
        self.text(MARGIN, 28.0, "GlowMetrics", ReportFont::Bold, 9.0, ROSE_DARK, Align::Left);
        let tagline_x = MARGIN + text_width("GlowMetrics", ReportFont::Bold, 9.0) + 6.0;
        self.text(tagline_x, 28.0, "• Análise de Beleza Inteligente", ReportFont::Regular, 8.0, TEXT_LIGHT, Align::Left);
        self.text(PAGE_WIDTH - MARGIN, 28.0, "v2.0 Clinic Edition", ReportFont::Regular, 7.0, TEXT_LIGHT, Align::Right);
    }
}

const CIRCLE_SEGMENTS: usize = 48;
const CORNER_SEGMENTS: usize = 6;

/// Largest size with the source aspect ratio that fits the box.
fn fit_within(src_w: f32, src_h: f32, box_w: f32, box_h: f32) -> (f32, f32) {
    let scale = (box_w / src_w).min(box_h / src_h);
    (src_w * scale, src_h * scale)
}

/// Outline of a rectangle with arc corners, counter-clockwise from bottom-left.
fn rounded_rect_points(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Vec<(Point, bool)> {
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    // Corner centers with the start angle of each quarter arc.
    let corners = [
        (x + w - r, y + r, -PI / 2.0),
        (x + w - r, y + h - r, 0.0),
        (x + r, y + h - r, PI / 2.0),
        (x + r, y + r, PI),
    ];
    corners
        .iter()
        .flat_map(|&(cx, cy, start)| {
            (0..=CORNER_SEGMENTS).map(move |i| {
                let a = start + (PI / 2.0) * i as f32 / CORNER_SEGMENTS as f32;
                point(cx + r * a.cos(), cy + r * a.sin())
            })
        })
        .collect()
}
