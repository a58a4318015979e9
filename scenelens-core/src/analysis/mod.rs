pub mod bbox;
pub mod dedupe;
pub mod detection;
pub mod validate;

pub use bbox::{BoundingBox, PixelBox};
pub use dedupe::dedupe;
pub use detection::{DetectedObject, DetectionReport};
pub use validate::{BoxViolation, repair, validate, validate_and_repair};
