use tracing::debug;

use crate::analysis::detection::DetectedObject;

/// Removes near-duplicate detections.
///
/// Detections are ordered by confidence (highest first, ties keep their
/// input order) and scanned greedily: a detection whose IoU with any
/// already kept detection exceeds `iou_threshold` is dropped. Because kept
/// detections always have at least the confidence of the current one, the
/// best detection of every duplicate cluster survives.
///
/// The result stays in confidence-descending order.
pub fn dedupe(mut objects: Vec<DetectedObject>, iou_threshold: f64) -> Vec<DetectedObject> {
    if objects.len() < 2 {
        return objects;
    }

    // `sort_by` is stable, so equal confidences keep their input order
    objects.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<DetectedObject> = Vec::with_capacity(objects.len());

    for candidate in objects {
        let duplicate_of = kept
            .iter()
            .find(|k| candidate.bounding_box.iou(&k.bounding_box) > iou_threshold);

        match duplicate_of {
            Some(winner) => debug!(
                dropped = %candidate.label,
                kept = %winner.label,
                "dropping duplicate detection"
            ),
            None => kept.push(candidate),
        }
    }

    kept
}
