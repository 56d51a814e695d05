//! Text measurement, word wrapping and region card sizing.
//!
//! Widths come from the Adobe AFM metrics of the standard Helvetica faces,
//! the same faces the PDF embeds as built-in fonts, so measured and rendered
//! widths agree.

use crate::analysis::{AreaResults, Grade, RegionAnalysis, DEFAULT_DESCRIPTION};

use super::palette::{region_style, RegionStyle};

/// Built-in PDF faces used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFont {
    Regular,
    Bold,
    Oblique,
}

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Width used for characters with no table entry.
const FALLBACK_WIDTH: u16 = 556;
const BULLET_WIDTH: u16 = 350;

/// Unaccented letter for the Latin-1 accented letters Portuguese uses.
/// Helvetica gives them the width of their base letter.
fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        _ => return None,
    };
    Some(base)
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: ReportFont, size: f32) -> f32 {
    let table = match font {
        ReportFont::Bold => &HELVETICA_BOLD_WIDTHS,
        ReportFont::Regular | ReportFont::Oblique => &HELVETICA_WIDTHS,
    };
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = base_letter(c).unwrap_or(c) as u32;
            if (32..=126).contains(&code) {
                u32::from(table[(code - 32) as usize])
            } else if c == '•' {
                u32::from(BULLET_WIDTH)
            } else {
                u32::from(FALLBACK_WIDTH)
            }
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap.
///
/// Words are added to the current line while the joined line stays within
/// `max_width`. A word wider than the column goes alone on its own line and
/// is never split. Blank text yields no lines.
pub fn wrap_text(text: &str, max_width: f32, font: ReportFont, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            lines.push(word.to_string());
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ═══════════════════════════════════════════════════════════
// Region cards
// ═══════════════════════════════════════════════════════════

/// Text column starts this far from the card's left edge (accent bar side).
pub const CARD_TEXT_INSET_LEFT: f32 = 60.0;
/// Space kept free at the right edge for the grade label.
pub const CARD_TEXT_INSET_RIGHT: f32 = 50.0;
pub const CARD_MIN_HEIGHT: f32 = 68.0;
pub const CARD_SPACING: f32 = 10.0;

pub const TITLE_SIZE: f32 = 11.0;
pub const TITLE_LINE: f32 = 13.0;
pub const DESCRIPTION_SIZE: f32 = 9.0;
pub const DESCRIPTION_LINE: f32 = 11.0;
pub const SUBTITLE_SIZE: f32 = 7.0;
pub const SUBTITLE_LINE: f32 = 9.0;
/// Gaps between the three text blocks plus their bottom margin.
const TEXT_BLOCK_GAPS: f32 = 12.0;
const CARD_PADDING: f32 = 20.0;

/// A region card with its text wrapped and its height resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub grade: Grade,
    pub title_lines: Vec<String>,
    pub description_lines: Vec<String>,
    pub subtitle_lines: Vec<String>,
    pub height: f32,
}

/// Wrap a card's three text blocks to the card's text column and size it.
pub fn layout_card(
    card_width: f32,
    title: &str,
    description: &str,
    subtitle: &str,
    grade: Grade,
) -> CardLayout {
    let column = card_width - CARD_TEXT_INSET_LEFT - CARD_TEXT_INSET_RIGHT;

    let title_lines = wrap_text(title, column, ReportFont::Bold, TITLE_SIZE);
    let description_lines = wrap_text(description, column, ReportFont::Oblique, DESCRIPTION_SIZE);
    let subtitle_lines = wrap_text(subtitle, column, ReportFont::Regular, SUBTITLE_SIZE);

    let text_height = title_lines.len() as f32 * TITLE_LINE
        + description_lines.len() as f32 * DESCRIPTION_LINE
        + subtitle_lines.len() as f32 * SUBTITLE_LINE
        + TEXT_BLOCK_GAPS;

    CardLayout {
        grade,
        title_lines,
        description_lines,
        subtitle_lines,
        height: CARD_MIN_HEIGHT.max(text_height + CARD_PADDING),
    }
}

/// Grade and description to display for a region.
///
/// Both come straight from the result when present. If either is missing the
/// grade is derived from the overall score (or, when that is 0, the mean of
/// the region's supplied metrics) and a missing description is replaced by
/// the region's canned phrase for that grade. A blank description counts as
/// missing.
pub fn resolve_card_text(analysis: &dyn RegionAnalysis, style: &RegionStyle) -> (Grade, String) {
    let given = analysis.description().filter(|d| !d.trim().is_empty());
    if let (Some(grade), Some(description)) = (analysis.grade(), given) {
        return (grade, description.to_string());
    }

    let mut basis = analysis.overall_score();
    if basis == 0.0 {
        let metrics = analysis.metrics();
        let values: Vec<f64> = style
            .metric_labels
            .iter()
            .filter_map(|(key, _)| metrics.iter().find(|(k, _)| k == key).map(|(_, v)| *v))
            .collect();
        if !values.is_empty() {
            basis = values.iter().sum::<f64>() / values.len() as f64;
        }
    }

    let grade = Grade::from_overall_score(basis);
    let description = match given {
        Some(d) => d.to_string(),
        None => style.phrase(grade).unwrap_or(DEFAULT_DESCRIPTION).to_string(),
    };
    (grade, description)
}

/// A region card positioned on the page; `top` is its upper edge in points.
#[derive(Debug, Clone)]
pub struct PlacedCard {
    pub style: &'static RegionStyle,
    pub top: f32,
    pub layout: CardLayout,
}

/// Lay out the present regions in report order, each card starting below
/// the previous one's computed height plus spacing.
pub fn stack_region_cards(areas: &AreaResults, card_width: f32, top: f32) -> Vec<PlacedCard> {
    let mut y = top;
    areas
        .present()
        .into_iter()
        .map(|analysis| {
            let style = region_style(analysis.region());
            let (grade, description) = resolve_card_text(analysis, style);
            let layout = layout_card(card_width, style.name, &description, style.subtitle, grade);
            let placed = PlacedCard {
                style,
                top: y,
                layout,
            };
            y -= placed.layout.height + CARD_SPACING;
            placed
        })
        .collect()
}
