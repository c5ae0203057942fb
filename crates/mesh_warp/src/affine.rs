use imageproc::geometric_transformations::Projection;

/// Affine map taking one triangle onto another.
///
/// `None` when either triangle is degenerate (collinear vertices), since no
/// invertible map exists.
pub fn triangle_affine(src: [[f32; 2]; 3], dst: [[f32; 2]; 3]) -> Option<Projection> {
    let det = |t: [[f32; 2]; 3]| {
        ((t[1][0] - t[0][0]) as f64) * ((t[2][1] - t[0][1]) as f64)
            - ((t[2][0] - t[0][0]) as f64) * ((t[1][1] - t[0][1]) as f64)
    };
    let d = det(src);
    if d.abs() < 1e-9 || det(dst).abs() < 1e-9 {
        return None;
    }

    // Solve [x y 1] * coeffs = u for each output coordinate (Cramer's rule)
    let solve = |values: [f64; 3]| -> [f64; 3] {
        let [p0, p1, p2] = src.map(|p| [p[0] as f64, p[1] as f64]);
        let (dx1, dy1, dx2, dy2) = (p1[0] - p0[0], p1[1] - p0[1], p2[0] - p0[0], p2[1] - p0[1]);
        let (du1, du2) = (values[1] - values[0], values[2] - values[0]);
        let a = (du1 * dy2 - du2 * dy1) / d;
        let b = (dx1 * du2 - dx2 * du1) / d;
        let c = values[0] - a * p0[0] - b * p0[1];
        [a, b, c]
    };
    let [a, b, c] = solve(dst.map(|p| p[0] as f64));
    let [e, f, g] = solve(dst.map(|p| p[1] as f64));

    Projection::from_matrix([
        a as f32, b as f32, c as f32,
        e as f32, f as f32, g as f32,
        0.0, 0.0, 1.0,
    ])
}

/// Barycentric point-in-triangle test, inclusive of edges
pub fn contains(tri: [[f32; 2]; 3], x: f32, y: f32) -> bool {
    let [a, b, c] = tri;
    let area = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
    if area == 0.0 {
        return false;
    }
    let w0 = ((b[0] - x) * (c[1] - y) - (c[0] - x) * (b[1] - y)) / area;
    let w1 = ((c[0] - x) * (a[1] - y) - (a[0] - x) * (c[1] - y)) / area;
    let w2 = 1.0 - w0 - w1;
    const EPS: f32 = -1e-4;
    w0 >= EPS && w1 >= EPS && w2 >= EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn test_affine_maps_vertices() {
        let src = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        let dst = [[5.0, 5.0], [25.0, 5.0], [5.0, 15.0]];
        let map = triangle_affine(src, dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert!(close(map * (s[0], s[1]), (d[0], d[1])));
        }
        let back = map.invert();
        assert!(close(back * (25.0, 5.0), (10.0, 0.0)));
    }

    #[test]
    fn test_degenerate_triangle_has_no_map() {
        let flat = [[0.0, 0.0], [5.0, 5.0], [10.0, 10.0]];
        let ok = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        assert!(triangle_affine(flat, ok).is_none());
        assert!(triangle_affine(ok, flat).is_none());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let tri = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        assert!(contains(tri, 1.0, 1.0));
        assert!(contains(tri, 5.0, 0.0));
        assert!(contains(tri, 0.0, 0.0));
        assert!(!contains(tri, 6.0, 6.0));
    }
}
