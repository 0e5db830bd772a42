use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use tracing::{info, warn};

mod args;

use args::Args;
use rosto::config::AppConfig;
use rosto::logging::init_tracing;
use rosto::pipeline::{annotate_image, Pipeline};
use rosto::FaceMeshPipeline;

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = AppConfig::load_with_source(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    init_tracing(&config.logging.level);

    // Loading ran before the subscriber existed, so repeat the fallback here.
    let fallback = source.fallback_warning(&args.config);
    if let Some(message) = &fallback {
        eprintln!("{}", message.yellow());
    }

    if args.write_config && fallback.is_some() {
        warn!(
            path = %args.config.display(),
            "not overwriting an unparsable config; fix or remove it first"
        );
    } else if args.write_config {
        config
            .save(&args.config)
            .with_context(|| format!("Failed to write config {}", args.config.display()))?;
        info!(path = %args.config.display(), "configuration written");
    }

    let image = image::open(&args.image)
        .with_context(|| format!("Failed to open image {}", args.image.display()))?;
    info!(
        path = %args.image.display(),
        width = image.width(),
        height = image.height(),
        "image loaded"
    );

    let mut pipeline = FaceMeshPipeline::new(&config.models).context("Failed to load models")?;
    info!(pipeline = %pipeline.name(), "pipeline ready");

    let Some(face) = annotate_image(&mut pipeline, &image, &config)? else {
        eprintln!("{}", format!("No face found in {}", args.image.display()).yellow());
        bail!("no face detected");
    };

    let output_path = args.output_path();
    face.overlay
        .save(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&face.analysis)?);
    } else {
        println!("{}", face.analysis.distance_line().cyan());
        println!("{}", face.analysis.orientation_line().green());
        println!("Mesh written to {}", output_path.display());
    }

    Ok(())
}
