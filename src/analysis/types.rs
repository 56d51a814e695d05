use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder used when the model gives a region no description.
pub const DEFAULT_DESCRIPTION: &str = "Região analisada";

pub const DEFAULT_APPARENT_AGE: f64 = 35.0;
pub const DEFAULT_HARMONY: f64 = 85.0;

// ═══════════════════════════════════════════════════════════
// Grades and regions
// ═══════════════════════════════════════════════════════════

/// Single-letter quality rating for a region, A (best) to F (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    pub const ALL: [Grade; 6] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E, Grade::F];

    /// Accepts exactly one letter A-F in either case. Whitespace is not trimmed.
    pub fn parse(raw: &str) -> Option<Grade> {
        match raw.to_ascii_uppercase().as_str() {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "E" => Some(Grade::E),
            "F" => Some(Grade::F),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }

    /// Letter grade derived from a numeric overall score.
    ///
    /// Used only when a region arrives without a score or description.
    pub fn from_overall_score(value: f64) -> Grade {
        if value >= 30.0 {
            Grade::A
        } else if value >= 15.0 {
            Grade::B
        } else if value >= 5.0 {
            Grade::C
        } else if value >= 0.0 {
            Grade::D
        } else if value >= -10.0 {
            Grade::E
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three fixed anatomical analysis areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Forehead,
    Nose,
    UnderEye,
}

impl Region {
    /// Report order.
    pub const ORDER: [Region; 3] = [Region::Forehead, Region::Nose, Region::UnderEye];

    pub fn key(&self) -> &'static str {
        match self {
            Region::Forehead => "forehead",
            Region::Nose => "nose",
            Region::UnderEye => "under_eye",
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Per-region records
// ═══════════════════════════════════════════════════════════

/// Read-only view over one region's analysis, shared by the report renderer.
pub trait RegionAnalysis {
    fn region(&self) -> Region;
    /// Metrics the result actually carries, as `(key, value)` in display order.
    fn metrics(&self) -> Vec<(&'static str, f64)>;
    fn overall_score(&self) -> f64;
    fn grade(&self) -> Option<Grade>;
    fn description(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeheadAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrinkle_reduction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothness_improvement: Option<f64>,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "lenient_grade", skip_serializing_if = "Option::is_none")]
    pub score: Option<Grade>,
    #[serde(default, deserialize_with = "lenient_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ForeheadAnalysis {
    pub fn new(
        wrinkle_reduction: f64,
        smoothness_improvement: f64,
        score: Grade,
        description: String,
    ) -> Self {
        Self {
            wrinkle_reduction: Some(wrinkle_reduction),
            smoothness_improvement: Some(smoothness_improvement),
            overall_score: wrinkle_reduction.max(smoothness_improvement),
            score: Some(score),
            description: Some(description),
        }
    }
}

impl RegionAnalysis for ForeheadAnalysis {
    fn region(&self) -> Region {
        Region::Forehead
    }

    fn metrics(&self) -> Vec<(&'static str, f64)> {
        present_metrics(&[
            ("wrinkle_reduction", self.wrinkle_reduction),
            ("smoothness_improvement", self.smoothness_improvement),
        ])
    }

    fn overall_score(&self) -> f64 {
        self.overall_score
    }

    fn grade(&self) -> Option<Grade> {
        self.score
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoseAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_improvement: Option<f64>,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "lenient_grade", skip_serializing_if = "Option::is_none")]
    pub score: Option<Grade>,
    #[serde(default, deserialize_with = "lenient_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NoseAnalysis {
    pub fn new(texture_improvement: f64, score: Grade, description: String) -> Self {
        Self {
            texture_improvement: Some(texture_improvement),
            overall_score: texture_improvement,
            score: Some(score),
            description: Some(description),
        }
    }
}

impl RegionAnalysis for NoseAnalysis {
    fn region(&self) -> Region {
        Region::Nose
    }

    fn metrics(&self) -> Vec<(&'static str, f64)> {
        present_metrics(&[("texture_improvement", self.texture_improvement)])
    }

    fn overall_score(&self) -> f64 {
        self.overall_score
    }

    fn grade(&self) -> Option<Grade> {
        self.score
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderEyeAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness_improvement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniformity_improvement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_improvement: Option<f64>,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "lenient_grade", skip_serializing_if = "Option::is_none")]
    pub score: Option<Grade>,
    #[serde(default, deserialize_with = "lenient_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UnderEyeAnalysis {
    pub fn new(
        brightness_improvement: f64,
        uniformity_improvement: f64,
        texture_improvement: f64,
        score: Grade,
        description: String,
    ) -> Self {
        let overall_score =
            (brightness_improvement + uniformity_improvement + texture_improvement) / 3.0;
        Self {
            brightness_improvement: Some(brightness_improvement),
            uniformity_improvement: Some(uniformity_improvement),
            texture_improvement: Some(texture_improvement),
            overall_score,
            score: Some(score),
            description: Some(description),
        }
    }
}

impl RegionAnalysis for UnderEyeAnalysis {
    fn region(&self) -> Region {
        Region::UnderEye
    }

    fn metrics(&self) -> Vec<(&'static str, f64)> {
        present_metrics(&[
            ("brightness_improvement", self.brightness_improvement),
            ("uniformity_improvement", self.uniformity_improvement),
            ("texture_improvement", self.texture_improvement),
        ])
    }

    fn overall_score(&self) -> f64 {
        self.overall_score
    }

    fn grade(&self) -> Option<Grade> {
        self.score
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Regions present in the model's reply. Absent regions stay `None` and are
/// omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forehead: Option<ForeheadAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nose: Option<NoseAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub under_eye: Option<UnderEyeAnalysis>,
}

impl AreaResults {
    pub fn get(&self, region: Region) -> Option<&dyn RegionAnalysis> {
        match region {
            Region::Forehead => self.forehead.as_ref().map(|a| a as &dyn RegionAnalysis),
            Region::Nose => self.nose.as_ref().map(|a| a as &dyn RegionAnalysis),
            Region::UnderEye => self.under_eye.as_ref().map(|a| a as &dyn RegionAnalysis),
        }
    }

    /// Present regions in report order.
    pub fn present(&self) -> Vec<&dyn RegionAnalysis> {
        Region::ORDER.iter().filter_map(|r| self.get(*r)).collect()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.present().iter().map(|a| a.region().key()).collect()
    }
}

// ═══════════════════════════════════════════════════════════
// Global metrics
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApparentAge {
    pub after: f64,
    pub reduction: f64,
}

impl Default for ApparentAge {
    fn default() -> Self {
        Self {
            after: DEFAULT_APPARENT_AGE,
            reduction: 0.0,
        }
    }
}

/// Facial symmetry. `improvement` is a fixed placeholder and always 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Symmetry {
    pub after: f64,
    pub improvement: f64,
}

impl Symmetry {
    pub fn new(after: f64) -> Self {
        Self {
            after,
            improvement: 0.0,
        }
    }
}

impl Default for Symmetry {
    fn default() -> Self {
        Self::new(DEFAULT_HARMONY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    #[serde(default)]
    pub apparent_age: ApparentAge,
    #[serde(default)]
    pub symmetry: Symmetry,
}

/// Normalized analysis of one before/after pair. Built per request, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub areas: AreaResults,
    #[serde(default)]
    pub global: GlobalMetrics,
}

fn present_metrics(metrics: &[(&'static str, Option<f64>)]) -> Vec<(&'static str, f64)> {
    metrics
        .iter()
        .filter_map(|(key, value)| value.map(|v| (*key, v)))
        .collect()
}

/// Invalid or non-string grades deserialize to `None` instead of failing,
/// so the report fallback can take over.
fn lenient_grade<'de, D>(deserializer: D) -> Result<Option<Grade>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(Grade::parse))
}

/// Blank or non-string descriptions count as missing.
fn lenient_description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string))
}
