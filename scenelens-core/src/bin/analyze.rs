use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::*;
use tracing_subscriber::EnvFilter;

use scenelens_core::{
    inference::RecordedResponses,
    pipeline::{Analyzer, ImageInput, PipelineConfig},
    render::{CaptionFont, save_overlay},
    scene::narrative::render_narrative,
};

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "Validate and reconcile recorded vision-model responses for scene images")]
struct Args {
    #[arg(help = "Directory holding one `<image stem>.json` response per image")]
    responses: PathBuf,

    #[arg(required = true, help = "Images to analyse")]
    images: Vec<PathBuf>,

    #[arg(short, long, help = "Pipeline config file (JSON); falls back to SCENELENS_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Write images with detection outlines into this directory")]
    overlay: Option<PathBuf>,

    #[arg(long, help = "TrueType font for overlay captions; outlines only when omitted")]
    font: Option<PathBuf>,

    #[arg(long, help = "Print the markdown survey report for scene results")]
    report: bool,

    #[arg(long, help = "Pretty-print JSON output")]
    pretty: bool,
}

fn image_input(path: &Path) -> ImageInput {
    let input = ImageInput::new(path);
    match image::image_dimensions(path) {
        Ok((width, height)) => input.with_dimensions(width, height),
        Err(e) => {
            warn!(path = %path.display(), "cannot read image size, pixel boxes skipped: {e}");
            input
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::from_env()?,
    };
    info!(images = args.images.len(), responses = %args.responses.display(), "starting analysis");

    if let Some(dir) = &args.overlay {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating overlay directory {}", dir.display()))?;
    }
    let font = args.font.as_deref().map(CaptionFont::load).transpose()?;

    let analyzer = Analyzer::new(RecordedResponses::new(&args.responses), config);
    let inputs: Vec<ImageInput> = args.images.iter().map(|path| image_input(path)).collect();

    let mut failed = 0;
    for (input, result) in inputs.iter().zip(analyzer.analyze_batch(&inputs).await) {
        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) => {
                error!(image = %input.path.display(), "{e}");
                failed += 1;
                continue;
            }
        };

        if let Some(dir) = &args.overlay {
            if !analysis.detections.objects.is_empty() {
                let file_name = input.path.file_name().unwrap_or_default();
                let target = dir.join(file_name).with_extension("png");
                if let Err(e) = save_overlay(
                    &input.path,
                    &analysis.detections.objects,
                    font.as_ref(),
                    &target,
                ) {
                    warn!("overlay skipped: {e}");
                }
            }
        }

        let json = if args.pretty {
            serde_json::to_string_pretty(&analysis)?
        } else {
            serde_json::to_string(&analysis)?
        };
        println!("{json}");

        if args.report {
            if let Some(scene) = &analysis.scene {
                println!("{}", render_narrative(scene));
            }
        }
    }

    info!(failed, "analysis finished");
    anyhow::ensure!(failed < inputs.len() || inputs.is_empty(), "every image failed");
    Ok(())
}
