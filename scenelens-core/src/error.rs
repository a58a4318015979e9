use std::time::Duration;

use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ScenelensError {
    #[snafu(display("Image `{}x{}` has a zero dimension at stage `{}`", width, height, stage))]
    DegenerateImage {
        width: u32,
        height: u32,
        stage: String,
    },
    #[snafu(display("Decode json at stage `{}` error: {}", stage, source))]
    Json {
        source: serde_json::Error,
        stage: String,
    },
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Open image `{}` error: {}", path, source))]
    ImageOpen {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Write image `{}` error: {}", path, source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Load font `{}` error: {}", path, source))]
    Font {
        source: ab_glyph::InvalidFont,
        path: String,
    },
    #[snafu(display("No recorded response for image `{}`", path))]
    MissingResponse { path: String },
    #[snafu(display("Image path `{}` has no file name", path))]
    InvalidImagePath { path: String },
    #[snafu(display("Vision call for `{}` timed out after {:?}", path, timeout))]
    Timeout { path: String, timeout: Duration },
    #[snafu(display("Build config error: {}", message))]
    Config { message: String },
}
