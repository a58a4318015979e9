use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::consts::{DEFAULT_OBSERVATIONS, UNKNOWN_SCENE_TYPE};

pub mod filter;
pub mod keywords;
pub mod narrative;
pub mod reconcile;
pub mod record;

pub use filter::{SceneFilter, filter_by_scene};
pub use keywords::SceneKeywords;
pub use reconcile::{reconcile, reconcile_value};
pub use record::SceneRecord;

/// Structured analysis of one scene image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneAnalysisResult {
    pub scene_type: String,
    pub scene_overview: String,
    /// Reconciled and filtered records; never empty.
    pub records: Vec<SceneRecord>,
    pub key_observations: Vec<String>,
}

impl SceneAnalysisResult {
    pub fn scene_type_label(&self) -> &'static str {
        scene_type_label(&self.scene_type)
    }
}

/// Display label for a scene tag.
pub fn scene_type_label(scene_type: &str) -> &'static str {
    match scene_type {
        "indoor_office" => "Indoor Office",
        "indoor_industrial" => "Industrial Space",
        "building_exterior" => "Building Exterior",
        "land_property" => "Land/Property",
        "construction_site" => "Construction Site",
        "infrastructure" => "Infrastructure",
        "agricultural" => "Agricultural",
        "natural_landscape" => "Natural Landscape",
        "parking_area" => "Parking Area",
        _ => "Other",
    }
}

/// The `scene_type` tag of a model response, `"unknown"` when absent.
pub fn parse_scene_type(response: &Value) -> String {
    response
        .get("scene_type")
        .and_then(Value::as_str)
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .unwrap_or_else(|| UNKNOWN_SCENE_TYPE.to_string())
}

/// Reads `key_observations`, either a list of strings or a JSON-encoded one.
///
/// Non-string entries are skipped. Anything unreadable, or a list with no
/// usable entry, yields the default observations.
pub fn parse_key_observations(raw: Option<&Value>) -> Vec<String> {
    let decoded;
    let list = match raw {
        Some(Value::Array(items)) => Some(items),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => {
                decoded = items;
                Some(&decoded)
            }
            _ => {
                debug!("key observations are not a JSON list");
                None
            }
        },
        _ => None,
    };

    let observations: Vec<String> = list
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|observation| !observation.is_empty())
        .map(str::to_string)
        .collect();

    if observations.is_empty() {
        return DEFAULT_OBSERVATIONS.iter().map(|s| s.to_string()).collect();
    }
    observations
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scene_type_label() {
        assert_eq!(scene_type_label("indoor_office"), "Indoor Office");
        assert_eq!(scene_type_label("indoor_industrial"), "Industrial Space");
        assert_eq!(scene_type_label("land_property"), "Land/Property");
        assert_eq!(scene_type_label("indoor_residential"), "Other");
        assert_eq!(scene_type_label(""), "Other");
    }

    #[test]
    fn test_parse_scene_type() {
        assert_eq!(parse_scene_type(&json!({"scene_type": " Indoor_Office "})), "indoor_office");
        assert_eq!(parse_scene_type(&json!({"scene_type": ""})), "unknown");
        assert_eq!(parse_scene_type(&json!({"scene_type": 3})), "unknown");
        assert_eq!(parse_scene_type(&json!({})), "unknown");
    }

    #[test]
    fn test_parse_key_observations() {
        let list = json!(["Good lighting", 4, "  ", "Clean floors"]);
        assert_eq!(
            parse_key_observations(Some(&list)),
            ["Good lighting", "Clean floors"]
        );

        let encoded = json!(r#"["Fire exit marked", "Cables exposed"]"#);
        assert_eq!(
            parse_key_observations(Some(&encoded)),
            ["Fire exit marked", "Cables exposed"]
        );
    }

    #[test]
    fn test_parse_key_observations_defaults() {
        let defaults: Vec<String> = DEFAULT_OBSERVATIONS.iter().map(|s| s.to_string()).collect();

        assert_eq!(parse_key_observations(None), defaults);
        assert_eq!(parse_key_observations(Some(&json!("- just prose"))), defaults);
        assert_eq!(parse_key_observations(Some(&json!([]))), defaults);
        assert_eq!(parse_key_observations(Some(&json!({"a": "b"}))), defaults);
    }
}
