use std::fmt;

use tracing::warn;

use crate::{
    analysis::{bbox::BoundingBox, detection::DetectedObject},
    consts::{EDGE_EPSILON, MAX_BOX_SIZE, MIN_BOX_SIZE},
};

/// The first geometric rule a bounding box breaks.
///
/// Variants are listed in checking order; [`validate`] reports the first
/// one that applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxViolation {
    XOutOfRange,
    YOutOfRange,
    WidthInvalid,
    HeightInvalid,
    BeyondRightEdge,
    BeyondBottomEdge,
    TooSmall,
}

impl BoxViolation {
    pub fn reason(&self) -> &'static str {
        match self {
            BoxViolation::XOutOfRange => "x out of range",
            BoxViolation::YOutOfRange => "y out of range",
            BoxViolation::WidthInvalid => "width invalid",
            BoxViolation::HeightInvalid => "height invalid",
            BoxViolation::BeyondRightEdge => "extends beyond right edge",
            BoxViolation::BeyondBottomEdge => "extends beyond bottom edge",
            BoxViolation::TooSmall => "box too small",
        }
    }
}

impl fmt::Display for BoxViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

fn in_position_range(value: f64) -> bool {
    (0.0..=MAX_BOX_SIZE).contains(&value)
}

fn in_extent_range(value: f64) -> bool {
    value > 0.0 && value <= MAX_BOX_SIZE
}

/// Checks a percentage box against the geometric invariants.
///
/// Rules are evaluated in a fixed order and the first failure wins:
/// position range, extent range, right/bottom containment, minimum size.
/// Non-finite coordinates fail the range checks.
pub fn validate(bbox: &BoundingBox) -> Result<(), BoxViolation> {
    if !in_position_range(bbox.x) {
        return Err(BoxViolation::XOutOfRange);
    }
    if !in_position_range(bbox.y) {
        return Err(BoxViolation::YOutOfRange);
    }
    if !in_extent_range(bbox.width) {
        return Err(BoxViolation::WidthInvalid);
    }
    if !in_extent_range(bbox.height) {
        return Err(BoxViolation::HeightInvalid);
    }
    if bbox.right() > MAX_BOX_SIZE + EDGE_EPSILON {
        return Err(BoxViolation::BeyondRightEdge);
    }
    if bbox.bottom() > MAX_BOX_SIZE + EDGE_EPSILON {
        return Err(BoxViolation::BeyondBottomEdge);
    }
    if bbox.width < MIN_BOX_SIZE || bbox.height < MIN_BOX_SIZE {
        return Err(BoxViolation::TooSmall);
    }

    Ok(())
}

pub fn is_valid(bbox: &BoundingBox) -> bool {
    validate(bbox).is_ok()
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Clamps a box back into percentage space.
///
/// The top-left corner is clamped so that at least `MIN_BOX_SIZE` remains
/// before the right/bottom edge, then the extent is clamped between
/// `MIN_BOX_SIZE` and the room left. The result always passes [`validate`]
/// and repairing it again returns it unchanged.
///
/// # Example
/// ```
/// use scenelens_core::analysis::{bbox::BoundingBox, validate::repair};
/// let fixed = repair(&BoundingBox::new(98.0, 98.0, 10.0, 10.0));
/// assert_eq!(fixed, BoundingBox::new(98.0, 98.0, 2.0, 2.0));
/// ```
pub fn repair(bbox: &BoundingBox) -> BoundingBox {
    let max_position = MAX_BOX_SIZE - MIN_BOX_SIZE;

    let x = finite_or(bbox.x, 0.0).clamp(0.0, max_position);
    let y = finite_or(bbox.y, 0.0).clamp(0.0, max_position);

    let width = finite_or(bbox.width, MIN_BOX_SIZE).clamp(MIN_BOX_SIZE, MAX_BOX_SIZE - x);
    let height = finite_or(bbox.height, MIN_BOX_SIZE).clamp(MIN_BOX_SIZE, MAX_BOX_SIZE - y);

    BoundingBox::new(x, y, width, height)
}

/// Validates every detection, replacing invalid boxes with their repair.
///
/// Returns the (possibly repaired) objects in input order together with
/// the warnings raised: one `"{label}: {reason}"` and one
/// `"{label}: Attempted to fix bounding box"` per invalid box.
pub fn validate_and_repair(objects: Vec<DetectedObject>) -> (Vec<DetectedObject>, Vec<String>) {
    let mut warnings = Vec::new();

    let objects = objects
        .into_iter()
        .map(|mut object| {
            if let Err(violation) = validate(&object.bounding_box) {
                warn!(
                    label = %object.label,
                    bbox = ?object.bounding_box,
                    "invalid bounding box: {violation}"
                );
                warnings.push(format!("{}: {}", object.label, violation));
                object.bounding_box = repair(&object.bounding_box);
                warnings.push(format!("{}: Attempted to fix bounding box", object.label));
            }
            object
        })
        .collect();

    (objects, warnings)
}
