use serde::Serialize;

use crate::error::Result;
use crate::orientation::{
    calculate_head_orientation, calculate_mouth_ratio, describe, estimate_nose_depth,
    HeadOrientation, MouthMeasure, OrientationThresholds,
};
use crate::types::Landmarks;

/// Everything derived from one face's landmarks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceAnalysis {
    pub orientation: HeadOrientation,
    pub mouth: MouthMeasure,
    pub mouth_ratio: f64,
    pub nose_depth: f64,
    pub description: String,
}

impl FaceAnalysis {
    pub fn orientation_line(&self) -> String {
        format!("Orientação do rosto: {}", self.description)
    }

    pub fn distance_line(&self) -> String {
        format!("Distância estimada do nariz: {:.2} in z", self.nose_depth)
    }
}

pub fn analyze(landmarks: &Landmarks, thresholds: &OrientationThresholds) -> Result<FaceAnalysis> {
    let orientation = calculate_head_orientation(landmarks)?;
    let mouth = calculate_mouth_ratio(landmarks)?;
    let nose_depth = estimate_nose_depth(landmarks)?;
    let description = describe(&orientation, &mouth, thresholds);

    Ok(FaceAnalysis {
        orientation,
        mouth_ratio: mouth.ratio(),
        mouth,
        nose_depth,
        description,
    })
}
