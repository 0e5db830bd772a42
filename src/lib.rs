//! # rosto
//!
//! Face mesh overlay and heuristic head orientation labels for still images.
//!
//! 1. An optional UltraFace detector picks the face region.
//! 2. A 468-point face mesh model produces landmarks, normalised to the image.
//! 3. The mesh contours are drawn over a copy of the image.
//! 4. Yaw, pitch and roll are estimated from a handful of landmarks and
//!    bucketed, together with the mouth width/height ratio, into a short
//!    Portuguese description.
//!
//! The geometry in [`orientation`] is independent of any model and can be fed
//! landmarks from any source with the same mesh topology.

pub mod analysis;
pub mod config;
pub mod detector;
mod error;
pub mod inference;
pub mod logging;
pub mod mesh;
pub mod orientation;
pub mod pipeline;
pub mod render;
pub mod types;

pub use analysis::{analyze, FaceAnalysis};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use inference::FaceMeshPipeline;
pub use pipeline::Pipeline;
pub use types::{Landmarks, PipelineOutput, Point3D, Rect};
