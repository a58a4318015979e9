pub mod analysis;
pub mod consts;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod render;
pub mod scene;

// Re-export commonly used types
pub use analysis::{BoundingBox, DetectedObject, DetectionReport, PixelBox};
pub use error::ScenelensError;
pub use inference::{RecordedResponses, VisionBackend};
pub use pipeline::{Analyzer, ImageAnalysis, ImageInput, PipelineConfig};
pub use scene::{SceneAnalysisResult, SceneRecord};
