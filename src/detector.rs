use anyhow::Result;
use image::{imageops::FilterType, RgbImage};
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use crate::inference::open_session;
use crate::types::Rect;

const INPUT_WIDTH: u32 = 320;
const INPUT_HEIGHT: u32 = 240;
const CENTER_VARIANCE: f32 = 0.1;
const SIZE_VARIANCE: f32 = 0.2;

/// UltraFace (RFB-320) single face detector.
pub struct FaceDetector {
    session: Session,
    anchors: Vec<(f32, f32, f32, f32)>, // cx, cy, w, h
    score_threshold: f32,
}

impl FaceDetector {
    pub fn new(model_path: &str, intra_threads: usize, score_threshold: f32) -> Result<Self> {
        let session = open_session(model_path, intra_threads)?;
        let anchors = generate_anchors(INPUT_WIDTH, INPUT_HEIGHT);
        Ok(Self {
            session,
            anchors,
            score_threshold,
        })
    }

    /// Best face box above the score threshold, in `frame` pixels.
    pub fn detect(&mut self, frame: &RgbImage) -> Result<Option<Rect>> {
        let resized = image::imageops::resize(frame, INPUT_WIDTH, INPUT_HEIGHT, FilterType::Triangle);

        // NCHW, normalised (pixel - 127) / 128
        let plane = (INPUT_WIDTH * INPUT_HEIGHT) as usize;
        let mut input_data = vec![0.0f32; 3 * plane];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let idx = (y * INPUT_WIDTH + x) as usize;
            for c in 0..3 {
                input_data[c * plane + idx] = (pixel[c] as f32 - 127.0) / 128.0;
            }
        }

        let input_tensor = Tensor::from_array((
            vec![1, 3, INPUT_HEIGHT as usize, INPUT_WIDTH as usize],
            input_data,
        ))?;
        let outputs = self.session.run(ort::inputs![input_tensor])?;

        let (_scores_shape, scores_data) = outputs["scores"].try_extract_tensor::<f32>()?;
        let (_boxes_shape, boxes_data) = outputs["boxes"].try_extract_tensor::<f32>()?;

        let best = post_process(&self.anchors, scores_data, boxes_data, self.score_threshold);

        Ok(best.map(|(score, rect)| {
            let sx = frame.width() as f32 / INPUT_WIDTH as f32;
            let sy = frame.height() as f32 / INPUT_HEIGHT as f32;
            let scaled = Rect::new(rect.x * sx, rect.y * sy, rect.width * sx, rect.height * sy);
            debug!(score, ?scaled, "face detected");
            scaled
        }))
    }
}

/// Decode the highest scoring prior above `threshold` into input pixel space.
fn post_process(
    anchors: &[(f32, f32, f32, f32)],
    scores_raw: &[f32],
    boxes_raw: &[f32],
    threshold: f32,
) -> Option<(f32, Rect)> {
    let num_anchors = anchors
        .len()
        .min(scores_raw.len() / 2)
        .min(boxes_raw.len() / 4);

    let mut best: Option<(f32, Rect)> = None;

    for (i, &(ax, ay, aw, ah)) in anchors.iter().enumerate().take(num_anchors) {
        let score = scores_raw[i * 2 + 1];
        let best_score = best.map_or(0.0, |(s, _)| s);
        if score <= threshold || score <= best_score {
            continue;
        }

        let cx = boxes_raw[i * 4] * CENTER_VARIANCE * aw + ax;
        let cy = boxes_raw[i * 4 + 1] * CENTER_VARIANCE * ah + ay;
        let w = (boxes_raw[i * 4 + 2] * SIZE_VARIANCE).exp() * aw;
        let h = (boxes_raw[i * 4 + 3] * SIZE_VARIANCE).exp() * ah;

        let x = cx - w / 2.0;
        let y = cy - h / 2.0;

        best = Some((
            score,
            Rect::new(
                x * INPUT_WIDTH as f32,
                y * INPUT_HEIGHT as f32,
                w * INPUT_WIDTH as f32,
                h * INPUT_HEIGHT as f32,
            ),
        ));
    }

    best
}

/// Feature-map stride and the prior box sizes (pixels) placed on each cell.
const PRIOR_LEVELS: [(u32, &[f32]); 4] = [
    (8, &[10.0, 16.0, 24.0]),
    (16, &[32.0, 48.0]),
    (32, &[64.0, 96.0]),
    (64, &[128.0, 192.0, 256.0]),
];

/// Prior boxes as normalised `(cx, cy, w, h)`, row-major per level.
fn generate_anchors(width: u32, height: u32) -> Vec<(f32, f32, f32, f32)> {
    let (w, h) = (width as f32, height as f32);

    PRIOR_LEVELS
        .iter()
        .flat_map(|&(stride, sizes)| {
            let cols = width.div_ceil(stride);
            let rows = height.div_ceil(stride);
            let half = stride as f32 / 2.0;
            (0..rows * cols).flat_map(move |cell| {
                let cx = ((cell % cols * stride) as f32 + half) / w;
                let cy = ((cell / cols * stride) as f32 + half) / h;
                sizes.iter().map(move |&size| (cx, cy, size / w, size / h))
            })
        })
        .collect()
}
