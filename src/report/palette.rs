//! Report colors and the static per-region / per-grade display tables.

use crate::analysis::{Grade, Region};

/// sRGB color with 0-255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub fn to_pdf(self) -> printpdf::Color {
        printpdf::Color::Rgb(printpdf::Rgb::new(
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
            None,
        ))
    }

    /// Composite `self` at `alpha` over an opaque `background`.
    pub fn over(self, background: Rgb8, alpha: f32) -> Rgb8 {
        let mix = |fg: u8, bg: u8| -> u8 {
            (f32::from(fg) * alpha + f32::from(bg) * (1.0 - alpha)).round() as u8
        };
        Rgb8(
            mix(self.0, background.0),
            mix(self.1, background.1),
            mix(self.2, background.2),
        )
    }
}

pub const BG_MAIN: Rgb8 = Rgb8(0xFD, 0xF8, 0xF6);
pub const WHITE: Rgb8 = Rgb8(0xFF, 0xFF, 0xFF);
pub const ROSE: Rgb8 = Rgb8(0xD4, 0xA5, 0xA5);
pub const ROSE_DARK: Rgb8 = Rgb8(0xC4, 0x8B, 0x8B);
pub const ROSE_LIGHT: Rgb8 = Rgb8(0xF5, 0xE1, 0xDE);
pub const GOLD: Rgb8 = Rgb8(0xC9, 0xA9, 0x62);
pub const TAUPE: Rgb8 = Rgb8(0x9D, 0x8B, 0x7A);
pub const CORAL: Rgb8 = Rgb8(0xE0, 0x7A, 0x5F);
pub const SUCCESS: Rgb8 = Rgb8(0x7F, 0xB6, 0x85);
pub const TEXT_DARK: Rgb8 = Rgb8(0x3D, 0x3D, 0x3D);
pub const TEXT_MEDIUM: Rgb8 = Rgb8(0x6B, 0x6B, 0x6B);
pub const TEXT_LIGHT: Rgb8 = Rgb8(0x9A, 0x9A, 0x9A);
pub const BORDER: Rgb8 = Rgb8(0xE8, 0xE0, 0xDC);

// ═══════════════════════════════════════════════════════════
// Grade display
// ═══════════════════════════════════════════════════════════

/// Display label and color for a grade, independent of the raw letter.
#[derive(Debug, Clone, Copy)]
pub struct GradeStyle {
    pub grade: Grade,
    pub label: &'static str,
    pub color: Rgb8,
}

pub const GRADE_STYLES: [GradeStyle; 6] = [
    GradeStyle { grade: Grade::A, label: "Excelente", color: SUCCESS },
    GradeStyle { grade: Grade::B, label: "Muito Bom", color: SUCCESS },
    GradeStyle { grade: Grade::C, label: "Bom", color: GOLD },
    GradeStyle { grade: Grade::D, label: "Estável", color: TEXT_LIGHT },
    GradeStyle { grade: Grade::E, label: "Atenção", color: CORAL },
    GradeStyle { grade: Grade::F, label: "Verificar", color: CORAL },
];

pub fn grade_style(grade: Grade) -> &'static GradeStyle {
    GRADE_STYLES
        .iter()
        .find(|s| s.grade == grade)
        .unwrap_or(&GRADE_STYLES[3])
}

// ═══════════════════════════════════════════════════════════
// Region cards
// ═══════════════════════════════════════════════════════════

/// Static presentation of one region card.
#[derive(Debug)]
pub struct RegionStyle {
    pub region: Region,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub accent: Rgb8,
    /// Metric keys with their display labels.
    pub metric_labels: &'static [(&'static str, &'static str)],
    /// Canned descriptions used when the result carries none.
    pub phrases: &'static [(Grade, &'static str)],
}

impl RegionStyle {
    pub fn phrase(&self, grade: Grade) -> Option<&'static str> {
        self.phrases
            .iter()
            .find(|(g, _)| *g == grade)
            .map(|(_, phrase)| *phrase)
    }
}

pub static REGION_STYLES: [RegionStyle; 3] = [
    RegionStyle {
        region: Region::Forehead,
        name: "Região Frontal",
        subtitle: "Toxina Botulínica",
        accent: ROSE,
        metric_labels: &[
            ("wrinkle_reduction", "Linhas"),
            ("smoothness_improvement", "Suavização"),
        ],
        phrases: &[
            (Grade::A, "Linhas de expressão visivelmente mais suaves"),
            (Grade::B, "Boa redução nas linhas de expressão"),
            (Grade::C, "Melhoria moderada na região"),
            (Grade::D, "Região em estabilização"),
            (Grade::E, "Região em processo de adaptação"),
        ],
    },
    RegionStyle {
        region: Region::Nose,
        name: "Região Nasal",
        subtitle: "Refinamento",
        accent: GOLD,
        metric_labels: &[("texture_improvement", "Textura")],
        phrases: &[
            (Grade::A, "Textura visivelmente mais refinada"),
            (Grade::B, "Boa melhoria na textura da pele"),
            (Grade::C, "Melhoria moderada na textura"),
            (Grade::D, "Região em estabilização"),
            (Grade::E, "Região em processo de adaptação"),
        ],
    },
    RegionStyle {
        region: Region::UnderEye,
        name: "Área Infraorbital",
        subtitle: "Preenchimento",
        accent: TAUPE,
        metric_labels: &[
            ("brightness_improvement", "Clareamento"),
            ("uniformity_improvement", "Uniformidade"),
            ("texture_improvement", "Textura"),
        ],
        phrases: &[
            (Grade::A, "Área visivelmente mais iluminada e uniforme"),
            (Grade::B, "Boa melhoria na luminosidade e textura"),
            (Grade::C, "Melhoria moderada na região"),
            (Grade::D, "Região em estabilização"),
            (Grade::E, "Verifique a ordem das imagens"),
            (Grade::F, "Consulte seu profissional"),
        ],
    },
];

pub fn region_style(region: Region) -> &'static RegionStyle {
    match region {
        Region::Forehead => &REGION_STYLES[0],
        Region::Nose => &REGION_STYLES[1],
        Region::UnderEye => &REGION_STYLES[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_grade_has_a_style() {
        for grade in Grade::ALL {
            assert_eq!(grade_style(grade).grade, grade);
        }
        assert_eq!(grade_style(Grade::A).label, "Excelente");
        assert_eq!(grade_style(Grade::E).label, "Atenção");
    }

    #[test]
    fn region_styles_match_their_region() {
        for region in Region::ORDER {
            assert_eq!(region_style(region).region, region);
        }
    }

    #[test]
    fn phrase_tables_differ_per_region() {
        let forehead = region_style(Region::Forehead);
        let under_eye = region_style(Region::UnderEye);
        assert_eq!(forehead.phrase(Grade::F), None);
        assert_eq!(under_eye.phrase(Grade::F), Some("Consulte seu profissional"));
        assert_ne!(forehead.phrase(Grade::A), under_eye.phrase(Grade::A));
    }

    #[test]
    fn alpha_blend_over_background() {
        assert_eq!(ROSE_LIGHT.over(BG_MAIN, 1.0), ROSE_LIGHT);
        assert_eq!(ROSE_LIGHT.over(BG_MAIN, 0.0), BG_MAIN);
        let mid = WHITE.over(Rgb8(0, 0, 0), 0.5);
        assert_eq!(mid, Rgb8(128, 128, 128));
    }
}
