use std::{
    future::Future,
    path::{Path, PathBuf},
};

use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::error::{
    InvalidImagePathSnafu, IoReadSnafu, JsonSnafu, MissingResponseSnafu, ScenelensError,
};

/// A vision service that turns an image into a raw JSON payload.
///
/// The payload is whatever the model produced; nothing about its shape is
/// guaranteed; the analysis layer takes care of that.
pub trait VisionBackend {
    const BACKEND_NAME: &'static str;

    fn describe(&self, image: &Path)
    -> impl Future<Output = Result<Value, ScenelensError>> + Send;
}

/// Replays responses saved on disk, one `<image stem>.json` per image.
#[derive(Clone, Debug)]
pub struct RecordedResponses {
    dir: PathBuf,
}

impl RecordedResponses {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn response_path(&self, image: &Path) -> Result<PathBuf, ScenelensError> {
        let stem = image.file_stem().context(InvalidImagePathSnafu {
            path: image.display().to_string(),
        })?;
        let mut file_name = stem.to_os_string();
        file_name.push(".json");
        Ok(self.dir.join(file_name))
    }
}

impl VisionBackend for RecordedResponses {
    const BACKEND_NAME: &'static str = "recorded";

    fn describe(
        &self,
        image: &Path,
    ) -> impl Future<Output = Result<Value, ScenelensError>> + Send {
        let path = self.response_path(image);
        async move {
            let path = path?;
            debug!(path = %path.display(), "reading recorded response");

            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return MissingResponseSnafu {
                        path: path.display().to_string(),
                    }
                    .fail();
                }
                Err(e) => {
                    return Err(e).context(IoReadSnafu {
                        path: path.display().to_string(),
                    });
                }
            };

            serde_json::from_str(&raw).context(JsonSnafu {
                stage: "recorded-response",
            })
        }
    }
}
