use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    analysis::bbox::{BoundingBox, PixelBox},
    consts::{DEFAULT_BOX_EXTENT, DEFAULT_BOX_POSITION, DEFAULT_CONFIDENCE, DEFAULT_LABEL},
};

/// One object located by the vision model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    /// Model confidence, always within `[0, 1]`.
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    /// Pixel corners, filled in once the image dimensions are known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_box: Option<PixelBox>,
}

impl DetectedObject {
    pub fn new(label: impl Into<String>, confidence: f64, bounding_box: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence: clamp_confidence(confidence),
            bounding_box,
            pixel_box: None,
        }
    }
}

/// Result of running the detection half of the pipeline on one image.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DetectionReport {
    pub objects: Vec<DetectedObject>,
    pub warnings: Vec<String>,
    pub analysis: Option<String>,
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        DEFAULT_CONFIDENCE
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

fn number_or(value: Option<&Value>, default: f64) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(default)
}

/// Reads one raw detection, defaulting whatever is missing or mistyped.
pub fn parse_detection(raw: &Value) -> DetectedObject {
    let label = raw
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(DEFAULT_LABEL);

    let confidence = number_or(raw.get("confidence"), DEFAULT_CONFIDENCE);

    let bbox = raw.get("bounding_box");
    let coord = |key: &str, default: f64| number_or(bbox.and_then(|b| b.get(key)), default);

    let bounding_box = BoundingBox::new(
        coord("x", DEFAULT_BOX_POSITION),
        coord("y", DEFAULT_BOX_POSITION),
        coord("width", DEFAULT_BOX_EXTENT),
        coord("height", DEFAULT_BOX_EXTENT),
    );

    DetectedObject::new(label, confidence, bounding_box)
}

/// Reads the `objects` array of a vision response.
///
/// A missing or non-array `objects` key yields no detections.
pub fn parse_detections(response: &Value) -> Vec<DetectedObject> {
    let Some(objects) = response.get("objects").and_then(Value::as_array) else {
        debug!("vision response carries no `objects` array");
        return Vec::new();
    };

    objects.iter().map(parse_detection).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_full_detection() {
        let raw = json!({
            "label": "Office Chair 1",
            "confidence": 0.92,
            "bounding_box": {"x": 10.5, "y": 20.0, "width": 15.0, "height": 30.0}
        });

        let object = parse_detection(&raw);
        assert_eq!(object.label, "Office Chair 1");
        assert_eq!(object.confidence, 0.92);
        assert_eq!(object.bounding_box, BoundingBox::new(10.5, 20.0, 15.0, 30.0));
        assert_eq!(object.pixel_box, None);
    }

    #[test]
    fn test_parse_detection_defaults() {
        let object = parse_detection(&json!({}));
        assert_eq!(object.label, "Unknown");
        assert_eq!(object.confidence, 0.5);
        assert_eq!(object.bounding_box, BoundingBox::new(0.0, 0.0, 10.0, 10.0));

        let object = parse_detection(&json!({
            "label": 42,
            "confidence": "high",
            "bounding_box": {"x": "left", "width": 25}
        }));
        assert_eq!(object.label, "Unknown");
        assert_eq!(object.confidence, 0.5);
        assert_eq!(object.bounding_box, BoundingBox::new(0.0, 0.0, 25.0, 10.0));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let high = parse_detection(&json!({"confidence": 7.0}));
        assert_eq!(high.confidence, 1.0);

        let low = parse_detection(&json!({"confidence": -0.3}));
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn test_parse_detections() {
        let response = json!({
            "objects": [
                {"label": "Monitor 1", "confidence": 0.8},
                "not an object",
                {"label": "Monitor 2"}
            ],
            "analysis": "Detected 2 monitors"
        });

        let objects = parse_detections(&response);
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0].label, "Monitor 1");
        assert_eq!(objects[1].label, "Unknown");
        assert_eq!(objects[2].label, "Monitor 2");

        assert!(parse_detections(&json!({"objects": {"a": 1}})).is_empty());
        assert!(parse_detections(&json!(null)).is_empty());
    }
}
