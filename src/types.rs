use serde::{Deserialize, Serialize};

/// A single landmark. `x`/`y` are normalised to the image size, `z` is on
/// the same scale as `x` with negative values towards the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Scale a normalised point to pixel coordinates.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

/// Represents the result of a face mesh inference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    pub points: Vec<Point3D>,
}

impl Landmarks {
    pub fn new(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point3D> {
        self.points.get(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Grow the rectangle by `fraction` of its size (split evenly on both
    /// sides) and clip it to a `frame_w` x `frame_h` frame.
    pub fn padded_within(&self, fraction: f32, frame_w: u32, frame_h: u32) -> Rect {
        let pad_w = self.width * fraction;
        let pad_h = self.height * fraction;
        let mut x = self.x - pad_w / 2.0;
        let mut y = self.y - pad_h / 2.0;
        let mut w = self.width + pad_w;
        let mut h = self.height + pad_h;

        if x < 0.0 {
            w += x;
            x = 0.0;
        }
        if y < 0.0 {
            h += y;
            y = 0.0;
        }
        if x + w > frame_w as f32 {
            w = frame_w as f32 - x;
        }
        if y + h > frame_h as f32 {
            h = frame_h as f32 - y;
        }

        Rect::new(x, y, w.max(0.0), h.max(0.0))
    }
}

/// Landmarks for one face plus the region the mesh model was run on.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub landmarks: Landmarks,
    /// Pixel region of the frame fed to the mesh model.
    pub roi: Rect,
    /// Whether `roi` came from the face detector rather than the full frame.
    pub detected: bool,
}
