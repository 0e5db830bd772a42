use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, Blend, Canvas,
};

use crate::config::{ConnectorStyle, DrawingConfig};
use crate::error::{Error, Result};
use crate::mesh::{self, Connection};
use crate::types::{Landmarks, PipelineOutput};

/// Parse `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex(hex: &str) -> Result<Rgba<u8>> {
    let invalid = || Error::InvalidColor(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    // from_str_radix alone would accept a leading '+'.
    if !(digits.len() == 6 || digits.len() == 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Draw the face mesh overlay for `output` on top of `image`.
pub fn draw_face_mesh(image: RgbaImage, output: &PipelineOutput, style: &DrawingConfig) -> Result<RgbaImage> {
    let mut canvas = Blend(image);
    let landmarks = &output.landmarks;

    let (w, h) = canvas.dimensions();
    let pixels: Vec<(f32, f32)> = landmarks.points.iter().map(|p| p.to_pixels(w, h)).collect();

    // Triangulated in pixel space so the mesh follows the image aspect ratio.
    let tessellation = mesh::tessellation(&pixels);
    draw_connectors(&mut canvas, landmarks, &tessellation, &style.tessellation)?;

    if style.landmark_radius > 0 {
        let dot_color = parse_hex(&style.tessellation.color_hex)?;
        for &(x, y) in &pixels {
            draw_filled_circle_mut(&mut canvas, (x.round() as i32, y.round() as i32), style.landmark_radius, dot_color);
        }
    }

    let layers: [(&[Connection], &ConnectorStyle); 8] = [
        (mesh::RIGHT_EYE, &style.right_eye),
        (mesh::RIGHT_EYEBROW, &style.right_eyebrow),
        (mesh::LEFT_EYE, &style.left_eye),
        (mesh::LEFT_EYEBROW, &style.left_eyebrow),
        (mesh::FACE_OVAL, &style.face_oval),
        (mesh::LIPS, &style.lips),
        (mesh::RIGHT_IRIS, &style.right_iris),
        (mesh::LEFT_IRIS, &style.left_iris),
    ];
    for (connections, connector) in layers {
        draw_connectors(&mut canvas, landmarks, connections, connector)?;
    }

    if let Some(box_style) = &style.face_box {
        let color = parse_hex(&box_style.color_hex)?;
        let roi = output.roi;
        if roi.width >= 1.0 && roi.height >= 1.0 {
            let rect = imageproc::rect::Rect::at(roi.x as i32, roi.y as i32)
                .of_size(roi.width as u32, roi.height as u32);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }

    Ok(canvas.0)
}

/// Connections referring to points the mesh does not have are skipped, so
/// iris contours only show up on refined meshes.
pub fn draw_connectors<C>(
    canvas: &mut C,
    landmarks: &Landmarks,
    connections: &[Connection],
    style: &ConnectorStyle,
) -> Result<()>
where
    C: Canvas<Pixel = Rgba<u8>>,
{
    let color = parse_hex(&style.color_hex)?;
    let (w, h) = canvas.dimensions();

    for &(from, to) in connections {
        let (Some(a), Some(b)) = (landmarks.get(from), landmarks.get(to)) else {
            continue;
        };
        draw_thick_line(canvas, a.to_pixels(w, h), b.to_pixels(w, h), style.line_width, color);
    }
    Ok(())
}

fn draw_thick_line<C>(canvas: &mut C, start: (f32, f32), end: (f32, f32), width: u32, color: Rgba<u8>)
where
    C: Canvas<Pixel = Rgba<u8>>,
{
    if width <= 1 {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }

    // Stamp discs along the segment, one per pixel of length.
    let radius = (width / 2) as i32;
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = start.0 + dx * t;
        let y = start.1 + dy * t;
        draw_filled_circle_mut(canvas, (x.round() as i32, y.round() as i32), radius, color);
    }
}
