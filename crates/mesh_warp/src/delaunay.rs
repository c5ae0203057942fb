//! Incremental (Bowyer-Watson) Delaunay triangulation.

use std::collections::HashMap;

use crate::error::{Result, WarpError};

#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    x: f64,
    y: f64,
    r2: f64,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    v: [usize; 3],
    circle: Circumcircle,
}

fn circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Option<Circumcircle> {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];
    let x = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let y = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let r2 = (a[0] - x).powi(2) + (a[1] - y).powi(2);
    Some(Circumcircle { x, y, r2 })
}

/// Triangulate a point set.
///
/// Returns vertex-index triples into `points`. Duplicate points must be
/// removed beforehand; fewer than three points, or an all-collinear set,
/// produce no triangles.
pub fn triangulate(points: &[[f32; 2]]) -> Result<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Ok(Vec::new());
    }
    if points.iter().flatten().any(|v| !v.is_finite()) {
        return Err(WarpError::Triangulation("non-finite coordinate".into()));
    }

    let mut vertices: Vec<[f64; 2]> = points.iter().map(|p| [p[0] as f64, p[1] as f64]).collect();
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for v in &vertices {
        min_x = min_x.min(v[0]);
        min_y = min_y.min(v[1]);
        max_x = max_x.max(v[0]);
        max_y = max_y.max(v[1]);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(1.0) * 20.0;
    let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    vertices.push([mid_x - 2.0 * span, mid_y - span]);
    vertices.push([mid_x, mid_y + 2.0 * span]);
    vertices.push([mid_x + 2.0 * span, mid_y - span]);

    let make = |v: [usize; 3], vertices: &[[f64; 2]]| {
        circumcircle(vertices[v[0]], vertices[v[1]], vertices[v[2]]).map(|circle| Face { v, circle })
    };
    let mut faces = vec![make([n, n + 1, n + 2], &vertices)
        .ok_or_else(|| WarpError::Triangulation("degenerate super triangle".into()))?];

    for i in 0..n {
        let p = vertices[i];
        let (bad, good): (Vec<Face>, Vec<Face>) = faces.into_iter().partition(|f| {
            let dx = p[0] - f.circle.x;
            let dy = p[1] - f.circle.y;
            dx * dx + dy * dy < f.circle.r2 * (1.0 - 1e-12)
        });
        faces = good;

        // cavity boundary: edges used by exactly one bad face
        let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
        let mut order = Vec::new();
        for face in &bad {
            for k in 0..3 {
                let (a, b) = (face.v[k], face.v[(k + 1) % 3]);
                let key = (a.min(b), a.max(b));
                let count = edges.entry(key).or_insert(0);
                if *count == 0 {
                    order.push(key);
                }
                *count += 1;
            }
        }
        for key in order {
            if edges[&key] != 1 {
                continue;
            }
            if let Some(face) = make([key.0, key.1, i], &vertices) {
                faces.push(face);
            }
        }
    }

    Ok(faces
        .into_iter()
        .filter(|f| f.v.iter().all(|&v| v < n))
        .map(|f| f.v)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circumcircle_is_empty(points: &[[f32; 2]], tri: [usize; 3]) -> bool {
        let p = |i: usize| [points[i][0] as f64, points[i][1] as f64];
        let circle = circumcircle(p(tri[0]), p(tri[1]), p(tri[2])).unwrap();
        (0..points.len())
            .filter(|i| !tri.contains(i))
            .all(|i| {
                let q = p(i);
                (q[0] - circle.x).powi(2) + (q[1] - circle.y).powi(2) >= circle.r2 * (1.0 - 1e-9)
            })
    }

    #[test]
    fn test_square_gives_two_triangles() {
        let points = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        let tris = triangulate(&points).unwrap();
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn test_triangulation_is_delaunay() {
        let points: Vec<[f32; 2]> = (0..40)
            .map(|i| {
                let t = i as f32 * 2.399;
                let r = (i as f32).sqrt() * 7.0;
                [100.0 + r * t.cos(), 100.0 + r * t.sin()]
            })
            .collect();
        let tris = triangulate(&points).unwrap();
        assert!(tris.len() >= points.len());
        for tri in tris {
            assert!(circumcircle_is_empty(&points, tri), "{tri:?} is not Delaunay");
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(triangulate(&[[0.0, 0.0], [1.0, 1.0]]).unwrap().is_empty());
        assert!(triangulate(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).unwrap().is_empty());
        assert!(triangulate(&[[0.0, f32::NAN], [1.0, 1.0], [2.0, 0.0]]).is_err());
    }
}
