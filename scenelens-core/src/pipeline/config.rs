use std::{path::Path, time::Duration};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use tracing::*;

use crate::{
    consts::*,
    error::{ConfigSnafu, IoReadSnafu, JsonSnafu, ScenelensError},
    inference::usage::TokenPricing,
    scene::keywords::SceneKeywords,
};

/// Tunables for an [`Analyzer`](crate::pipeline::Analyzer).
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct PipelineConfig {
    /// IoU above which the lower-confidence detection is a duplicate.
    pub iou_threshold: f64,
    pub keywords: SceneKeywords,
    pub max_concurrent_requests: usize,
    pub request_timeout_secs: u64,
    /// USD per 1K input tokens.
    pub input_token_cost: f64,
    /// USD per 1K output tokens.
    pub output_token_cost: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            iou_threshold: IOU_DEDUPE_THRESHOLD,
            keywords: SceneKeywords::default(),
            max_concurrent_requests: MAX_CONCURRENT_REQUESTS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            input_token_cost: INPUT_TOKEN_COST,
            output_token_cost: OUTPUT_TOKEN_COST,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenelensError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).context(IoReadSnafu {
            path: path.display().to_string(),
        })?;

        let config: Self =
            serde_json::from_str(&contents).context(JsonSnafu { stage: "pipeline-config" })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `SCENELENS_CONFIG`, or the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ScenelensError> {
        match std::env::var(CONFIG_PATH_ENV_NAME) {
            Ok(path) => {
                info!(%path, "loading pipeline config");
                Self::from_path(path)
            }
            Err(_) => {
                debug!("{} not set, using default pipeline config", CONFIG_PATH_ENV_NAME);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ScenelensError> {
        ensure!(
            (0.0..=1.0).contains(&self.iou_threshold),
            ConfigSnafu {
                message: format!("iou_threshold must be within [0, 1], got {}", self.iou_threshold),
            }
        );
        ensure!(
            self.max_concurrent_requests > 0,
            ConfigSnafu {
                message: "max_concurrent_requests must be at least 1",
            }
        );
        ensure!(
            self.request_timeout_secs > 0,
            ConfigSnafu {
                message: "request_timeout_secs must be at least 1",
            }
        );
        ensure!(
            self.input_token_cost >= 0.0 && self.output_token_cost >= 0.0,
            ConfigSnafu {
                message: "token costs must not be negative",
            }
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pricing(&self) -> TokenPricing {
        TokenPricing {
            input_per_1k: self.input_token_cost,
            output_per_1k: self.output_token_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fills_defaults() {
        let config = PipelineConfig::builder()
            .iou_threshold(0.5)
            .max_concurrent_requests(2usize)
            .build()
            .unwrap();

        assert_eq!(config.iou_threshold, 0.5);
        assert_eq!(config.max_concurrent_requests, 2);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.keywords, SceneKeywords::default());
    }

    #[test]
    fn test_from_path_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenelens.json");
        std::fs::write(
            &path,
            r#"{"iou_threshold": 0.6, "keywords": {"outdoor_keywords": ["gravel"]}}"#,
        )
        .unwrap();

        let config = PipelineConfig::from_path(&path).unwrap();
        assert_eq!(config.iou_threshold, 0.6);
        assert_eq!(config.keywords.outdoor_keywords, ["gravel"]);
        assert_eq!(config.keywords.indoor_scenes.len(), 4);
        assert_eq!(config.max_concurrent_requests, 5);
    }

    #[test]
    fn test_from_path_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = PipelineConfig::from_path(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ScenelensError::IoRead { .. })));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            PipelineConfig::from_path(&path),
            Err(ScenelensError::Json { .. })
        ));

        std::fs::write(&path, r#"{"iou_threshold": 1.5}"#).unwrap();
        assert!(matches!(
            PipelineConfig::from_path(&path),
            Err(ScenelensError::Config { .. })
        ));
    }

    #[test]
    fn test_pricing() {
        let pricing = PipelineConfig::default().pricing();
        assert_eq!(pricing, TokenPricing::default());
    }
}
