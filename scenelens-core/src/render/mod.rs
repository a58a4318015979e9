pub mod overlay;

pub use overlay::{CaptionFont, caption, draw_detections, label_color, save_overlay};
