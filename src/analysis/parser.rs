use std::sync::OnceLock;

use serde_json::{Map, Value};

use super::types::{
    AnalysisResult, ApparentAge, AreaResults, ForeheadAnalysis, GlobalMetrics, Grade,
    NoseAnalysis, Symmetry, UnderEyeAnalysis, DEFAULT_APPARENT_AGE, DEFAULT_DESCRIPTION,
    DEFAULT_HARMONY,
};
use super::AnalysisError;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Normalize the assistant's reply into the fixed result schema.
///
/// The whole reply fails on empty or unparseable text. Inside a parsed reply
/// every missing or mistyped field falls back to its default instead.
pub fn normalize_response(raw_text: &str) -> Result<AnalysisResult, AnalysisError> {
    let text = raw_text.trim();
    if text.is_empty() {
        return Err(AnalysisError::Parse("Empty response".into()));
    }

    let json_str = extract_json_block(text);
    let data: Value = serde_json::from_str(json_str.trim())
        .map_err(|e| AnalysisError::Parse(format!("Invalid JSON: {e}")))?;

    let root = data
        .as_object()
        .ok_or_else(|| AnalysisError::Parse("Top-level JSON value is not an object".into()))?;

    let areas_data = object_field(root, "areas");
    let global_data = object_field(root, "global");

    let areas = AreaResults {
        forehead: areas_data.get("forehead").map(|v| {
            let (metrics, score, description) = region_fields(v);
            ForeheadAnalysis::new(
                number_or(metrics, "wrinkle_reduction", 0.0),
                number_or(metrics, "smoothness_improvement", 0.0),
                score,
                description,
            )
        }),
        nose: areas_data.get("nose").map(|v| {
            let (metrics, score, description) = region_fields(v);
            NoseAnalysis::new(number_or(metrics, "texture_improvement", 0.0), score, description)
        }),
        under_eye: areas_data.get("under_eye").map(|v| {
            let (metrics, score, description) = region_fields(v);
            UnderEyeAnalysis::new(
                number_or(metrics, "brightness_improvement", 0.0),
                number_or(metrics, "uniformity_improvement", 0.0),
                number_or(metrics, "texture_improvement", 0.0),
                score,
                description,
            )
        }),
    };

    let age = object_field(global_data, "apparent_age");

    let global = GlobalMetrics {
        apparent_age: ApparentAge {
            after: number_or(age, "after", DEFAULT_APPARENT_AGE),
            reduction: number_or(age, "reduction", 0.0),
        },
        symmetry: Symmetry::new(number_or(global_data, "harmony", DEFAULT_HARMONY)),
    };

    tracing::debug!(regions = ?areas.keys(), "Assistant response normalized");

    Ok(AnalysisResult { areas, global })
}

/// Strip a Markdown code fence if the reply has one.
///
/// A ```` ```json ```` fence wins over a plain one. An unclosed fence yields
/// everything after it.
fn extract_json_block(text: &str) -> &str {
    if let Some(start) = text.find(JSON_FENCE) {
        let inner = &text[start + JSON_FENCE.len()..];
        return match inner.find(FENCE) {
            Some(end) => &inner[..end],
            None => inner,
        };
    }
    if let Some(start) = text.find(FENCE) {
        let inner = &text[start + FENCE.len()..];
        return match inner.find(FENCE) {
            Some(end) => &inner[..end],
            None => inner,
        };
    }
    text
}

/// Metrics map, validated grade and description of one region value.
fn region_fields(value: &Value) -> (&Map<String, Value>, Grade, String) {
    let region = value.as_object().unwrap_or_else(|| empty_map());
    let metrics = object_field(region, "metrics");
    let score = validate_score(region.get("score"));
    let description = region
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    (metrics, score, description)
}

/// Any score that is not a single letter A-F becomes `D`.
pub fn validate_score(value: Option<&Value>) -> Grade {
    value
        .and_then(Value::as_str)
        .and_then(Grade::parse)
        .unwrap_or(Grade::D)
}

/// Nested object under `key`, or an empty map when missing or mistyped.
fn object_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a Map<String, Value> {
    map.get(key)
        .and_then(Value::as_object)
        .unwrap_or_else(|| empty_map())
}

fn empty_map() -> &'static Map<String, Value> {
    static EMPTY: OnceLock<Map<String, Value>> = OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

fn number_or(map: &Map<String, Value>, key: &str, default: f64) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(default)
}
