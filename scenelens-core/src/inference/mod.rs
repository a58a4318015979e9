pub mod usage;
pub mod vision;

pub use usage::{CostEstimate, TokenPricing, TokenUsage};
pub use vision::{RecordedResponses, VisionBackend};
