pub mod analyzer;
pub mod audit;
pub mod config;

pub use analyzer::{Analyzer, ImageAnalysis, ImageInput};
pub use audit::{AuditEvent, AuditSink, AuditStatus, MemoryAuditSink, TracingAuditSink};
pub use config::{PipelineConfig, PipelineConfigBuilder};
