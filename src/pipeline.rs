use anyhow::Result;
use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::info;

use crate::analysis::{analyze, FaceAnalysis};
use crate::config::AppConfig;
use crate::render::draw_face_mesh;
use crate::types::PipelineOutput;

/// A landmark source for a single still frame.
pub trait Pipeline {
    fn name(&self) -> String;
    /// `Ok(None)` when no face was found.
    fn process(&mut self, frame: &RgbImage) -> Result<Option<PipelineOutput>>;
}

/// Result of running a pipeline over one image.
pub struct AnnotatedFace {
    pub output: PipelineOutput,
    pub analysis: FaceAnalysis,
    pub overlay: RgbaImage,
}

/// Detect, draw and describe the face in `image`. `Ok(None)` if the
/// pipeline found no face.
pub fn annotate_image(
    pipeline: &mut dyn Pipeline,
    image: &DynamicImage,
    config: &AppConfig,
) -> Result<Option<AnnotatedFace>> {
    let frame = image.to_rgb8();
    let Some(output) = pipeline.process(&frame)? else {
        info!(pipeline = %pipeline.name(), "no face found");
        return Ok(None);
    };

    let analysis = analyze(&output.landmarks, &config.thresholds)?;
    let overlay = draw_face_mesh(image.to_rgba8(), &output, &config.drawing)?;

    info!(
        yaw = analysis.orientation.yaw,
        pitch = analysis.orientation.pitch,
        roll = analysis.orientation.roll,
        mouth_ratio = analysis.mouth_ratio,
        "face analysed"
    );

    Ok(Some(AnnotatedFace {
        output,
        analysis,
        overlay,
    }))
}
