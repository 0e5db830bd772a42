//! Face mesh contour topology (468-point mesh, 478 with refined irises).
//!
//! Contours are fixed index lists. The dense tessellation is built per face
//! with a Delaunay triangulation of the landmark positions.

use std::collections::BTreeSet;

pub type Connection = (usize, usize);

/// Number of points produced by the base face mesh.
pub const NUM_MESH_POINTS: usize = 468;
/// Number of points when iris refinement is present.
pub const NUM_REFINED_POINTS: usize = 478;

pub const FACE_OVAL: &[Connection] = &[
    (10, 338), (338, 297), (297, 332), (332, 284), (284, 251), (251, 389),
    (389, 356), (356, 454), (454, 323), (323, 361), (361, 288), (288, 397),
    (397, 365), (365, 379), (379, 378), (378, 400), (400, 377), (377, 152),
    (152, 148), (148, 176), (176, 149), (149, 150), (150, 136), (136, 172),
    (172, 58), (58, 132), (132, 93), (93, 234), (234, 127), (127, 162),
    (162, 21), (21, 54), (54, 103), (103, 67), (67, 109), (109, 10),
];

pub const LIPS: &[Connection] = &[
    (61, 146), (146, 91), (91, 181), (181, 84), (84, 17), (17, 314),
    (314, 405), (405, 321), (321, 375), (375, 291), (61, 185), (185, 40),
    (40, 39), (39, 37), (37, 0), (0, 267), (267, 269), (269, 270),
    (270, 409), (409, 291), (78, 95), (95, 88), (88, 178), (178, 87),
    (87, 14), (14, 317), (317, 402), (402, 318), (318, 324), (324, 308),
    (78, 191), (191, 80), (80, 81), (81, 82), (82, 13), (13, 312),
    (312, 311), (311, 310), (310, 415), (415, 308),
];

pub const RIGHT_EYE: &[Connection] = &[
    (33, 7), (7, 163), (163, 144), (144, 145), (145, 153), (153, 154),
    (154, 155), (155, 133), (33, 246), (246, 161), (161, 160), (160, 159),
    (159, 158), (158, 157), (157, 173), (173, 133),
];

pub const RIGHT_EYEBROW: &[Connection] = &[
    (46, 53), (53, 52), (52, 65), (65, 55), (70, 63), (63, 105),
    (105, 66), (66, 107),
];

pub const LEFT_EYE: &[Connection] = &[
    (263, 249), (249, 390), (390, 373), (373, 374), (374, 380), (380, 381),
    (381, 382), (382, 362), (263, 466), (466, 388), (388, 387), (387, 386),
    (386, 385), (385, 384), (384, 398), (398, 362),
];

pub const LEFT_EYEBROW: &[Connection] = &[
    (276, 283), (283, 282), (282, 295), (295, 285), (300, 293), (293, 334),
    (334, 296), (296, 336),
];

pub const RIGHT_IRIS: &[Connection] = &[(469, 470), (470, 471), (471, 472), (472, 469)];

pub const LEFT_IRIS: &[Connection] = &[(474, 475), (475, 476), (476, 477), (477, 474)];

#[derive(Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    cx: f64,
    cy: f64,
    r2: f64,
}

impl Triangle {
    fn new(v: [usize; 3], pts: &[(f64, f64)]) -> Self {
        let (ax, ay) = pts[v[0]];
        let (bx, by) = pts[v[1]];
        let (cx, cy) = pts[v[2]];
        let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
        if d.abs() < f64::EPSILON {
            // Collinear: make it swallow every later point so it gets replaced.
            return Self {
                v,
                cx: (ax + bx + cx) / 3.0,
                cy: (ay + by + cy) / 3.0,
                r2: f64::INFINITY,
            };
        }
        let a2 = ax * ax + ay * ay;
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
        let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;
        Self {
            v,
            cx: ux,
            cy: uy,
            r2: (ax - ux).powi(2) + (ay - uy).powi(2),
        }
    }

    fn circumcircle_contains(&self, (x, y): (f64, f64)) -> bool {
        (x - self.cx).powi(2) + (y - self.cy).powi(2) < self.r2
    }

    fn edges(&self) -> [Connection; 3] {
        let [a, b, c] = self.v;
        [(a, b), (b, c), (c, a)]
    }
}

fn edge_key((a, b): Connection) -> Connection {
    (a.min(b), a.max(b))
}

/// Delaunay triangulation (Bowyer-Watson) of `points`, returned as the
/// unique undirected edges, each as `(low, high)` index pairs in order.
/// Coincident points are kept out of the triangulation.
pub fn tessellation(points: &[(f32, f32)]) -> Vec<Connection> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut pts: Vec<(f64, f64)> = points
        .iter()
        .map(|&(x, y)| (f64::from(x), f64::from(y)))
        .collect();

    let (min_x, max_x, min_y, max_y) = pts.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(lx, hx, ly, hy), &(x, y)| (lx.min(x), hx.max(x), ly.min(y), hy.max(y)),
    );
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    // Enclosing triangle, appended after the real points.
    pts.push((mid_x - 20.0 * span, mid_y - span));
    pts.push((mid_x, mid_y + 20.0 * span));
    pts.push((mid_x + 20.0 * span, mid_y - span));

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &pts)];

    for i in 0..n {
        let p = pts[i];
        if pts[..i].contains(&p) {
            continue;
        }
        let (bad, good): (Vec<Triangle>, Vec<Triangle>) =
            triangles.iter().partition(|t| t.circumcircle_contains(p));
        if bad.is_empty() {
            continue;
        }

        // Cavity boundary: edges used by exactly one bad triangle.
        let mut boundary: Vec<Connection> = Vec::new();
        for edge in bad.iter().flat_map(Triangle::edges) {
            let shared = bad
                .iter()
                .flat_map(Triangle::edges)
                .filter(|&e| edge_key(e) == edge_key(edge))
                .count()
                > 1;
            if !shared {
                boundary.push(edge);
            }
        }

        triangles = good;
        triangles.extend(boundary.into_iter().map(|(a, b)| Triangle::new([a, b, i], &pts)));
    }

    let edges: BTreeSet<Connection> = triangles
        .iter()
        .filter(|t| t.v.iter().all(|&v| v < n))
        .flat_map(Triangle::edges)
        .map(edge_key)
        .collect();
    edges.into_iter().collect()
}
