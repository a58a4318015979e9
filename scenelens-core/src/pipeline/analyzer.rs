use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::*;
use uuid::Uuid;

use crate::{
    analysis::{
        dedupe::dedupe,
        detection::{DetectionReport, parse_detections},
        validate::validate_and_repair,
    },
    error::{ScenelensError, TimeoutSnafu},
    inference::{
        usage::{CostEstimate, TokenUsage},
        vision::VisionBackend,
    },
    pipeline::{
        audit::{AuditEvent, AuditSink, AuditStatus, TracingAuditSink},
        config::PipelineConfig,
    },
    scene::{
        SceneAnalysisResult, filter::SceneFilter, parse_key_observations, parse_scene_type,
        reconcile::reconcile,
    },
};

/// One image queued for analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInput {
    pub path: PathBuf,
    /// Pixel size, when known; used to attach pixel boxes to detections.
    pub dimensions: Option<(u32, u32)>,
}

impl ImageInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }
}

/// Everything derived from one vision response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub request_id: Uuid,
    pub image: PathBuf,
    pub detections: DetectionReport,
    /// Present when the response carried scene fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneAnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostEstimate>,
}

/// Runs vision responses through reconciliation, filtering, box repair and
/// duplicate removal.
pub struct Analyzer<B> {
    backend: B,
    config: PipelineConfig,
    filter: SceneFilter,
    audit: Arc<dyn AuditSink>,
}

impl<B: VisionBackend> Analyzer<B> {
    pub fn new(backend: B, config: PipelineConfig) -> Self {
        let filter = SceneFilter::new(config.keywords.clone());
        Self {
            backend,
            config,
            filter,
            audit: Arc::new(TracingAuditSink),
        }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parses, repairs and deduplicates the `objects` of a response.
    pub fn analyze_detections(
        &self,
        response: &Value,
        dimensions: Option<(u32, u32)>,
    ) -> DetectionReport {
        let parsed = parse_detections(response);
        let parsed_len = parsed.len();

        let (repaired, warnings) = validate_and_repair(parsed);
        let mut objects = dedupe(repaired, self.config.iou_threshold);

        match dimensions {
            Some((width, height)) if width > 0 && height > 0 => {
                for object in &mut objects {
                    object.pixel_box = Some(object.bounding_box.to_pixels(width, height));
                }
            }
            Some((width, height)) => {
                warn!(width, height, "image has a zero dimension, skipping pixel boxes");
            }
            None => {}
        }

        info!(
            parsed = parsed_len,
            kept = objects.len(),
            repaired = warnings.len() / 2,
            "detections analysed"
        );

        DetectionReport {
            objects,
            warnings,
            analysis: response
                .get("analysis")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Reconciles and filters the scene records of a response.
    ///
    /// Records are grounded against `image_description`, falling back to
    /// `scene_overview` when the response has no separate description.
    pub fn analyze_scene(&self, response: &Value) -> SceneAnalysisResult {
        let text = |key: &str| {
            response
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
        };

        let scene_type = parse_scene_type(response);
        let scene_overview = text("scene_overview").unwrap_or_default().to_string();
        let description = text("image_description").unwrap_or(scene_overview.as_str());

        // the reconciler's placeholder is never filtered
        let records = match response
            .get("simplified_data")
            .and_then(Value::as_array)
            .filter(|raw| !raw.is_empty())
        {
            Some(raw) => {
                let reconciled = reconcile(raw);
                let reconciled_len = reconciled.len();
                let records = self.filter.filter(reconciled, &scene_type, description);
                info!(
                    scene_type = %scene_type,
                    reconciled = reconciled_len,
                    kept = records.len(),
                    "scene analysed"
                );
                records
            }
            None => {
                info!(scene_type = %scene_type, "scene analysed without records");
                reconcile(&[])
            }
        };

        SceneAnalysisResult {
            scene_type,
            scene_overview,
            records,
            key_observations: parse_key_observations(response.get("key_observations")),
        }
    }

    /// Runs both halves of the analysis on an already fetched response.
    #[tracing::instrument(skip_all, fields(request_id = %request_id, image = %image.display()))]
    pub fn analyze_response(
        &self,
        request_id: Uuid,
        image: &Path,
        response: &Value,
        dimensions: Option<(u32, u32)>,
    ) -> ImageAnalysis {
        let detections = self.analyze_detections(response, dimensions);

        let has_scene = ["scene_type", "scene_overview", "simplified_data"]
            .iter()
            .any(|key| response.get(*key).is_some());
        let scene = has_scene.then(|| self.analyze_scene(response));

        let usage = TokenUsage::from_response(response);
        let cost = usage.map(|usage| usage.cost(&self.config.pricing()));

        ImageAnalysis {
            request_id,
            image: image.to_path_buf(),
            detections,
            scene,
            usage,
            cost,
        }
    }

    /// Fetches the vision response for one image and analyses it.
    ///
    /// The backend call is bounded by the configured request timeout. The
    /// outcome is handed to the audit sink either way.
    #[tracing::instrument(skip_all, fields(image = %input.path.display(), backend = B::BACKEND_NAME))]
    pub async fn analyze_image(&self, input: &ImageInput) -> Result<ImageAnalysis, ScenelensError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let timeout = self.config.request_timeout();

        let result = match tokio::time::timeout(timeout, self.backend.describe(&input.path)).await
        {
            Ok(response) => response.map(|response| {
                self.analyze_response(request_id, &input.path, &response, input.dimensions)
            }),
            Err(_) => TimeoutSnafu {
                path: input.path.display().to_string(),
                timeout,
            }
            .fail(),
        };

        let (status, payload) = match &result {
            Ok(analysis) => {
                let payload = serde_json::to_value(analysis).unwrap_or_else(|e| {
                    warn!(%request_id, "cannot serialize analysis for audit: {e}");
                    Value::Null
                });
                (AuditStatus::Completed, payload)
            }
            Err(e) => {
                error!(%request_id, "analysis failed: {e}");
                (AuditStatus::Failed, Value::String(e.to_string()))
            }
        };

        self.audit.record(AuditEvent {
            request_id,
            stage: "analyze-image".to_string(),
            status,
            duration_ms: started.elapsed().as_millis() as u64,
            payload,
        });

        result
    }

    /// Analyses many images, at most `max_concurrent_requests` at a time.
    ///
    /// Results come back in input order; a failed image does not affect
    /// the others.
    #[tracing::instrument(skip_all, fields(images = inputs.len()))]
    pub async fn analyze_batch(
        &self,
        inputs: &[ImageInput],
    ) -> Vec<Result<ImageAnalysis, ScenelensError>> {
        let limit = self.config.max_concurrent_requests.max(1);
        info!(limit, "start batch analysis");

        let mut results: Vec<(usize, Result<ImageAnalysis, ScenelensError>)> =
            stream::iter(inputs.iter().enumerate())
                .map(|(index, input)| async move {
                    (index, self.analyze_image(input).in_current_span().await)
                })
                .buffer_unordered(limit)
                .collect()
                .await;

        results.sort_by_key(|(index, _)| *index);

        let failed = results.iter().filter(|(_, result)| result.is_err()).count();
        info!(failed, "batch analysis completed");

        results.into_iter().map(|(_, result)| result).collect()
    }
}
