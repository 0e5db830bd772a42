use anyhow::Result;
use image::{imageops::FilterType, RgbImage};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::detector::FaceDetector;
use crate::error::Error;
use crate::mesh::NUM_MESH_POINTS;
use crate::pipeline::Pipeline;
use crate::types::{Landmarks, PipelineOutput, Point3D, Rect};

const MESH_INPUT_SIZE: u32 = 192;
/// Fraction of the detected box added around it before cropping.
const ROI_PADDING: f32 = 0.25;

pub(crate) fn open_session(model_path: &str, intra_threads: usize) -> Result<Session> {
    if !Path::new(model_path).exists() {
        return Err(Error::ModelNotFound(model_path.to_string()).into());
    }
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .with_execution_providers([CPUExecutionProvider::default().build()])?
        .commit_from_file(model_path)?;
    Ok(session)
}

pub struct FaceMeshPipeline {
    mesh_session: Session,
    detector: Option<FaceDetector>,
}

impl FaceMeshPipeline {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let detector = if Path::new(&config.face_detection_path).exists() {
            info!(path = %config.face_detection_path, "loading face detector");
            Some(FaceDetector::new(
                &config.face_detection_path,
                config.intra_threads,
                config.detection_score,
            )?)
        } else {
            warn!(
                path = %config.face_detection_path,
                "face detector not found, running the mesh on the full frame"
            );
            None
        };

        info!(path = %config.face_mesh_path, "loading face mesh");
        let mesh_session = open_session(&config.face_mesh_path, config.intra_threads)?;

        Ok(Self {
            mesh_session,
            detector,
        })
    }
}

impl Pipeline for FaceMeshPipeline {
    fn name(&self) -> String {
        format!("Face Mesh ({} pts)", NUM_MESH_POINTS)
    }

    fn process(&mut self, frame: &RgbImage) -> Result<Option<PipelineOutput>> {
        let started = Instant::now();

        let (roi, detected) = match &mut self.detector {
            Some(det) => match det.detect(frame)? {
                Some(rect) => (rect.padded_within(ROI_PADDING, frame.width(), frame.height()), true),
                None => return Ok(None),
            },
            None => (
                Rect::new(0.0, 0.0, frame.width() as f32, frame.height() as f32),
                false,
            ),
        };

        if roi.width < 1.0 || roi.height < 1.0 {
            return Ok(None);
        }

        let crop = image::imageops::crop_imm(
            frame,
            roi.x as u32,
            roi.y as u32,
            roi.width as u32,
            roi.height as u32,
        )
        .to_image();

        let input = mesh_input(&crop);
        let shape = vec![1, MESH_INPUT_SIZE as usize, MESH_INPUT_SIZE as usize, 3];
        let tensor = ort::value::Tensor::from_array((shape, input))?;
        let outputs = self.mesh_session.run(ort::inputs![tensor])?;
        let (_shape, raw) = outputs[0].try_extract_tensor::<f32>()?;

        let landmarks = mesh_to_landmarks(raw, &roi, frame.width(), frame.height())?;
        debug!(
            points = landmarks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "face mesh inference done"
        );

        Ok(Some(PipelineOutput {
            landmarks,
            roi,
            detected,
        }))
    }
}

/// Resize to the mesh input and lay out as NHWC floats in [-1, 1].
fn mesh_input(crop: &RgbImage) -> Vec<f32> {
    let resized = image::imageops::resize(crop, MESH_INPUT_SIZE, MESH_INPUT_SIZE, FilterType::Triangle);
    resized
        .pixels()
        .flat_map(|p| p.0.map(|c| c as f32 / 127.5 - 1.0))
        .collect()
}

/// Map raw mesh output (x, y, z per point in 192x192 crop space) to
/// landmarks normalised to the full frame.
fn mesh_to_landmarks(raw: &[f32], roi: &Rect, frame_w: u32, frame_h: u32) -> Result<Landmarks> {
    if raw.len() < NUM_MESH_POINTS * 3 {
        return Err(Error::UnexpectedOutput(format!(
            "face mesh returned {} values, expected at least {}",
            raw.len(),
            NUM_MESH_POINTS * 3
        ))
        .into());
    }

    let scale_x = roi.width / MESH_INPUT_SIZE as f32;
    let scale_y = roi.height / MESH_INPUT_SIZE as f32;
    let fw = frame_w as f32;
    let fh = frame_h as f32;

    let points = raw
        .chunks_exact(3)
        .take(NUM_MESH_POINTS)
        .map(|v| Point3D {
            x: (roi.x + v[0] * scale_x) / fw,
            y: (roi.y + v[1] * scale_y) / fh,
            // Depth shares the horizontal scale.
            z: v[2] * scale_x / fw,
        })
        .collect();

    Ok(Landmarks::new(points))
}
