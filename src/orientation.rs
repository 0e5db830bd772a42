//! Head orientation heuristics over face mesh landmarks.
//!
//! Angles are plain arctangents over normalised 2D landmark positions, not a
//! solved 3D pose. They are coarse by construction and only meant to feed the
//! threshold labels in [`get_face_orientation`].
//!
//! Landmarks arrive as `f32`; everything downstream of them is `f64` so the
//! strict threshold comparisons see the same values a double-precision
//! implementation would.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Landmarks, Point3D};

pub const NOSE_TIP: usize = 1;
/// Subject's right eye, outer corner (left side of the image).
pub const RIGHT_EYE: usize = 33;
/// Subject's left eye, outer corner (right side of the image).
pub const LEFT_EYE: usize = 263;
pub const CHIN: usize = 152;
pub const MOUTH_LEFT_CORNER: usize = 61;
pub const MOUTH_RIGHT_CORNER: usize = 291;
pub const UPPER_LIP_CENTER: usize = 13;
pub const LOWER_LIP_CENTER: usize = 14;

/// Scale applied to the nose tip depth before display.
pub const NOSE_DEPTH_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadOrientation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouthMeasure {
    pub width: f64,
    pub height: f64,
}

impl MouthMeasure {
    /// Width over height. A closed mouth (height 0) gives infinity.
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Cut-offs for the textual labels. Comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationThresholds {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub mouth_wide_ratio: f64,
    pub mouth_narrow_ratio: f64,
}

impl Default for OrientationThresholds {
    fn default() -> Self {
        Self {
            yaw_deg: 15.0,
            pitch_deg: 10.0,
            roll_deg: 10.0,
            mouth_wide_ratio: 1.8,
            mouth_narrow_ratio: 1.2,
        }
    }
}

fn landmark(landmarks: &Landmarks, index: usize) -> Result<Point3D> {
    landmarks.get(index).copied().ok_or(Error::MissingLandmark {
        index,
        available: landmarks.len(),
    })
}

/// Euclidean distance in the image plane; `z` is ignored.
pub fn calculate_distance(point1: &Point3D, point2: &Point3D) -> f64 {
    let dx = f64::from(point1.x) - f64::from(point2.x);
    let dy = f64::from(point1.y) - f64::from(point2.y);
    (dx * dx + dy * dy).sqrt()
}

fn planar(p: Point3D) -> (f64, f64) {
    (f64::from(p.x), f64::from(p.y))
}

pub fn calculate_head_orientation(landmarks: &Landmarks) -> Result<HeadOrientation> {
    let (_, nose_y) = planar(landmark(landmarks, NOSE_TIP)?);
    let (right_x, right_y) = planar(landmark(landmarks, RIGHT_EYE)?);
    let (left_x, left_y) = planar(landmark(landmarks, LEFT_EYE)?);
    let (_, chin_y) = planar(landmark(landmarks, CHIN)?);

    let yaw = (right_y - left_y).atan2(right_x - left_x).to_degrees();

    let eye_center_y = (right_y + left_y) / 2.0;
    let pitch = (nose_y - eye_center_y)
        .atan2(chin_y - eye_center_y)
        .to_degrees();

    let roll = (left_y - right_y).atan2(left_x - right_x).to_degrees();

    Ok(HeadOrientation { yaw, pitch, roll })
}

pub fn calculate_mouth_ratio(landmarks: &Landmarks) -> Result<MouthMeasure> {
    let left_corner = landmark(landmarks, MOUTH_LEFT_CORNER)?;
    let right_corner = landmark(landmarks, MOUTH_RIGHT_CORNER)?;
    let upper_center = landmark(landmarks, UPPER_LIP_CENTER)?;
    let lower_center = landmark(landmarks, LOWER_LIP_CENTER)?;

    Ok(MouthMeasure {
        width: calculate_distance(&left_corner, &right_corner),
        height: calculate_distance(&upper_center, &lower_center),
    })
}

/// Rough camera distance proxy from the nose tip depth.
pub fn estimate_nose_depth(landmarks: &Landmarks) -> Result<f64> {
    let nose = landmark(landmarks, NOSE_TIP)?;
    Ok((f64::from(nose.z) * NOSE_DEPTH_SCALE).abs())
}

/// Describe the face in Portuguese using the default thresholds.
pub fn get_face_orientation(
    yaw: f64,
    pitch: f64,
    roll: f64,
    mouth_width: f64,
    mouth_height: f64,
) -> String {
    describe(
        &HeadOrientation { yaw, pitch, roll },
        &MouthMeasure {
            width: mouth_width,
            height: mouth_height,
        },
        &OrientationThresholds::default(),
    )
}

pub fn describe(
    head: &HeadOrientation,
    mouth: &MouthMeasure,
    thresholds: &OrientationThresholds,
) -> String {
    let mut orientation = String::new();

    if head.yaw > thresholds.yaw_deg {
        orientation.push_str("virado para a direita");
    } else if head.yaw < -thresholds.yaw_deg {
        orientation.push_str("virado para a esquerda");
    } else {
        orientation.push_str("de frente");
    }

    if head.pitch > thresholds.pitch_deg {
        orientation.push_str(" e inclinado para cima");
    } else if head.pitch < -thresholds.pitch_deg {
        orientation.push_str(" e inclinado para baixo");
    }

    if head.roll > thresholds.roll_deg {
        orientation.push_str(" com rotação para a direita");
    } else if head.roll < -thresholds.roll_deg {
        orientation.push_str(" com rotação para a esquerda");
    }

    // NaN (0/0) falls through both arms.
    let ratio = mouth.ratio();
    if ratio > thresholds.mouth_wide_ratio {
        orientation.push_str(" (boca alargada, provavelmente de frente)");
    } else if ratio < thresholds.mouth_narrow_ratio {
        orientation.push_str(" (boca estreita, provavelmente de lado)");
    }

    orientation
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-3;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn mesh_with(overrides: &[(usize, Point3D)]) -> Landmarks {
        let mut points = vec![Point3D::default(); 468];
        for &(i, p) in overrides {
            points[i] = p;
        }
        Landmarks::new(points)
    }

    #[test]
    fn distance_is_planar() {
        let a = Point3D::new(0.0, 0.0, 5.0);
        let b = Point3D::new(3.0, 4.0, -2.0);
        assert!(approx(calculate_distance(&a, &b), 5.0));
        assert!(approx(calculate_distance(&b, &a), 5.0));
        assert_eq!(calculate_distance(&a, &a), 0.0);
    }

    #[test]
    fn level_eyes_give_zero_roll_and_half_turn_yaw() {
        let lm = mesh_with(&[
            (RIGHT_EYE, Point3D::new(0.4, 0.4, 0.0)),
            (LEFT_EYE, Point3D::new(0.6, 0.4, 0.0)),
            (NOSE_TIP, Point3D::new(0.5, 0.5, 0.0)),
            (CHIN, Point3D::new(0.5, 0.7, 0.0)),
        ]);
        let head = calculate_head_orientation(&lm).unwrap();
        assert!(approx(head.roll, 0.0));
        // Subject's right eye sits left of the left eye in the image.
        assert!(approx(head.yaw.abs(), 180.0));
        // atan2(0.1, 0.3)
        assert!(approx(head.pitch, 18.434_948));
    }

    #[test]
    fn tilted_eyes_rotate_roll() {
        let lm = mesh_with(&[
            (RIGHT_EYE, Point3D::new(0.4, 0.4, 0.0)),
            (LEFT_EYE, Point3D::new(0.5, 0.5, 0.0)),
            (NOSE_TIP, Point3D::new(0.5, 0.6, 0.0)),
            (CHIN, Point3D::new(0.5, 0.8, 0.0)),
        ]);
        let head = calculate_head_orientation(&lm).unwrap();
        assert!(approx(head.roll, 45.0));
        assert!(approx(head.yaw, -135.0));
    }

    #[test]
    fn mouth_measure_uses_fixed_indices() {
        let lm = mesh_with(&[
            (MOUTH_LEFT_CORNER, Point3D::new(0.4, 0.7, 0.0)),
            (MOUTH_RIGHT_CORNER, Point3D::new(0.6, 0.7, 0.0)),
            (UPPER_LIP_CENTER, Point3D::new(0.5, 0.68, 0.0)),
            (LOWER_LIP_CENTER, Point3D::new(0.5, 0.73, 0.0)),
        ]);
        let mouth = calculate_mouth_ratio(&lm).unwrap();
        assert!(approx(mouth.width, 0.2));
        assert!(approx(mouth.height, 0.05));
        assert!(approx(mouth.ratio(), 4.0));
    }

    #[test]
    fn short_mesh_reports_missing_landmark() {
        let lm = Landmarks::new(vec![Point3D::default(); 100]);
        match calculate_head_orientation(&lm) {
            Err(Error::MissingLandmark { index, available }) => {
                assert_eq!(index, LEFT_EYE);
                assert_eq!(available, 100);
            }
            other => panic!("expected missing landmark, got {:?}", other),
        }
        assert!(calculate_mouth_ratio(&lm).is_err());
        assert!(estimate_nose_depth(&Landmarks::default()).is_err());
    }

    #[test]
    fn nose_depth_is_absolute_and_scaled() {
        let lm = mesh_with(&[(NOSE_TIP, Point3D::new(0.5, 0.5, -0.0345))]);
        assert!(approx(estimate_nose_depth(&lm).unwrap(), 3.45));
    }

    #[test]
    fn frontal_face_without_clauses() {
        assert_eq!(get_face_orientation(0.0, 0.0, 0.0, 1.5, 1.0), "de frente");
    }

    #[test]
    fn yaw_buckets() {
        assert_eq!(
            get_face_orientation(20.0, 0.0, 0.0, 1.5, 1.0),
            "virado para a direita"
        );
        assert_eq!(
            get_face_orientation(-20.0, 0.0, 0.0, 1.5, 1.0),
            "virado para a esquerda"
        );
        // Strict comparisons: the boundary is still frontal.
        assert_eq!(get_face_orientation(15.0, 0.0, 0.0, 1.5, 1.0), "de frente");
        assert_eq!(get_face_orientation(-15.0, 0.0, 0.0, 1.5, 1.0), "de frente");
    }

    #[test]
    fn clauses_are_appended_in_order() {
        assert_eq!(
            get_face_orientation(180.0, 25.0, 12.0, 2.0, 1.0),
            "virado para a direita e inclinado para cima com rotação para a direita \
             (boca alargada, provavelmente de frente)"
        );
        assert_eq!(
            get_face_orientation(0.0, -11.0, -10.5, 1.0, 1.0),
            "de frente e inclinado para baixo com rotação para a esquerda \
             (boca estreita, provavelmente de lado)"
        );
    }

    #[test]
    fn pitch_and_roll_boundaries_add_nothing() {
        assert_eq!(get_face_orientation(0.0, 10.0, -10.0, 1.8, 1.0), "de frente");
        assert_eq!(get_face_orientation(0.0, -10.0, 10.0, 1.2, 1.0), "de frente");
    }

    #[test]
    fn degenerate_mouth_heights() {
        assert_eq!(
            get_face_orientation(0.0, 0.0, 0.0, 0.3, 0.0),
            "de frente (boca alargada, provavelmente de frente)"
        );
        assert_eq!(get_face_orientation(0.0, 0.0, 0.0, 0.0, 0.0), "de frente");
    }

    #[test]
    fn custom_thresholds_shift_buckets() {
        let thresholds = OrientationThresholds {
            yaw_deg: 30.0,
            ..OrientationThresholds::default()
        };
        let head = HeadOrientation {
            yaw: 20.0,
            pitch: 0.0,
            roll: 0.0,
        };
        let mouth = MouthMeasure {
            width: 1.5,
            height: 1.0,
        };
        assert_eq!(describe(&head, &mouth, &thresholds), "de frente");
    }

    #[test]
    fn thresholds_compare_in_double_precision() {
        // Both values collapse to 1.8 / 15.0 in single precision.
        let mouth = MouthMeasure {
            width: 1.8 + 1e-12,
            height: 1.0,
        };
        let head = HeadOrientation {
            yaw: 15.0 + 1e-9,
            pitch: 0.0,
            roll: 0.0,
        };
        assert_eq!(
            describe(&head, &mouth, &OrientationThresholds::default()),
            "virado para a direita (boca alargada, provavelmente de frente)"
        );
    }

    #[test]
    fn distance_widens_single_precision_inputs() {
        let a = Point3D::new(0.1, 0.2, 0.0);
        let b = Point3D::new(0.4, 0.6, 0.0);
        let dx = f64::from(0.4f32) - f64::from(0.1f32);
        let dy = f64::from(0.6f32) - f64::from(0.2f32);
        assert_eq!(calculate_distance(&a, &b), (dx * dx + dy * dy).sqrt());
    }
}
