//! Deterministic synthetic face for tests.
//!
//! Places every registered region on a plausible frontal face layout scaled to
//! the canvas. Unregistered mesh points are spread on a golden-angle spiral
//! inside the face so that no two landmarks coincide.

use crate::{landmark, LandmarkSet, Region, LANDMARK_COUNT};

struct Layout {
    cx: f32,
    cy: f32,
    a: f32,
    b: f32,
}

impl Layout {
    fn at(&self, dx: f32, dy: f32) -> [i32; 2] {
        [
            (self.cx + dx * self.a).round() as i32,
            (self.cy + dy * self.b).round() as i32,
        ]
    }

    fn ellipse(&self, center: (f32, f32), radii: (f32, f32), degrees: f32) -> [i32; 2] {
        let t = degrees.to_radians();
        self.at(center.0 + radii.0 * t.cos(), center.1 + radii.1 * t.sin())
    }
}

/// Frontal face centred slightly below the middle of a `width` x `height` canvas
pub fn face(width: u32, height: u32) -> LandmarkSet {
    let layout = Layout {
        cx: width as f32 / 2.0,
        cy: height as f32 * 0.55,
        a: width as f32 * 0.28,
        b: height as f32 * 0.34,
    };
    let mut points = vec![[0, 0]; LANDMARK_COUNT];

    for (i, point) in points.iter_mut().enumerate() {
        let r = ((i as f32 + 0.5) / LANDMARK_COUNT as f32).sqrt() * 0.55;
        let t = i as f32 * 2.399_963;
        *point = layout.at(r * t.cos(), r * t.sin());
    }

    let mut place = |indices: &[usize], f: &dyn Fn(usize) -> [i32; 2]| {
        for (k, &index) in indices.iter().enumerate() {
            points[index] = f(k);
        }
    };

    place(Region::FaceOval.indices(), &|k| {
        layout.ellipse((0.0, 0.0), (1.0, 1.0), -90.0 + k as f32 * 10.0)
    });

    for (region, side) in [(Region::LeftEye, 1.0), (Region::RightEye, -1.0)] {
        place(region.indices(), &|k| {
            let degrees = if k <= 8 { 180.0 - k as f32 * 22.5 } else { -(k as f32 - 8.0) * 22.5 };
            layout.ellipse((0.4 * side, -0.25), (0.17, 0.06), degrees)
        });
    }

    for (region, side) in [(Region::LeftBrow, 1.0), (Region::RightBrow, -1.0)] {
        place(region.indices(), &|k| {
            // lower edge outer to inner, then upper edge inner to outer
            let (t, dy) = if k < 5 { (k as f32 / 4.0, -0.38) } else { ((9 - k) as f32 / 4.0, -0.45) };
            let dx = 0.68 - t * 0.52;
            let arch = (t * std::f32::consts::PI).sin() * 0.03;
            layout.at(dx * side, dy - arch)
        });
    }

    place(Region::LipsUpper.indices(), &|k| {
        layout.ellipse((0.0, 0.48), (0.32, 0.08), 180.0 + k as f32 * 18.0)
    });
    place(&Region::LipsLower.indices()[..9], &|k| {
        layout.ellipse((0.0, 0.48), (0.32, 0.1), 162.0 - k as f32 * 18.0)
    });

    let singles: [(usize, f32, f32); 15] = [
        (landmark::NOSE_TIP, 0.0, 0.16),
        (4, 0.0, 0.11),
        (2, 0.0, 0.25),
        (98, -0.12, 0.22),
        (327, 0.12, 0.22),
        (102, -0.15, 0.2),
        (331, 0.15, 0.2),
        (48, -0.17, 0.15),
        (218, -0.09, 0.13),
        (49, -0.2, 0.12),
        (279, 0.2, 0.12),
        (164, 0.0, 0.33),
        (18, 0.0, 0.66),
        (landmark::LEFT_CHEEK_CENTER, 0.48, 0.12),
        (landmark::RIGHT_CHEEK_CENTER, -0.48, 0.12),
    ];
    for (region, side) in [(Region::LeftCheek, 1.0), (Region::RightCheek, -1.0)] {
        place(&region.indices()[1..], &|k| {
            layout.ellipse((0.48 * side, 0.12), (0.1, 0.08), k as f32 * 120.0)
        });
    }

    for (index, dx, dy) in singles {
        points[index] = layout.at(dx, dy);
    }

    LandmarkSet::new(points).expect("synthetic layout always has a full mesh")
}

/// Every landmark collapsed onto the canvas centre
pub fn collapsed(width: u32, height: u32) -> LandmarkSet {
    let center = [width as i32 / 2, height as i32 / 2];
    LandmarkSet::new(vec![center; LANDMARK_COUNT]).expect("full mesh")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registered_points_are_distinct_per_region() {
        let set = face(400, 400);
        for region in [Region::FaceOval, Region::LipsOuter, Region::LeftEye, Region::RightBrow] {
            let unique: HashSet<_> = set.region(region).into_iter().collect();
            assert_eq!(unique.len(), region.indices().len(), "{region} has duplicates");
        }
    }

    #[test]
    fn test_left_is_image_right() {
        let set = face(400, 400);
        assert!(set.point(landmark::LEFT_EAR)[0] > set.point(landmark::RIGHT_EAR)[0]);
        assert!(set.point(263)[0] > set.point(362)[0]);
    }

    #[test]
    fn test_layout_stays_on_canvas() {
        let set = face(300, 360);
        for &[x, y] in set.as_slice() {
            assert!((0..300).contains(&x) && (0..360).contains(&y));
        }
    }
}
