//! Masks built from landmark geometry.
//!
//! Every builder returns an empty mask for empty or degenerate input (fewer
//! than three distinct points, zero-area polygons, non-positive radii);
//! callers treat an empty mask as "leave the image alone".

use geo::{Area, ConvexHull};
use geo_types::{Coord, LineString, MultiPoint, Point as GeoPoint, Polygon};
use image::Luma;
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut, draw_polygon_mut},
    point::Point,
};
use tracing::debug;

use crate::types::RegionMask;

const INSIDE: Luma<f32> = Luma([1.0]);

/// Drop repeated consecutive vertices and the closing vertex of a ring
fn open_ring(points: &[[i32; 2]]) -> Vec<[i32; 2]> {
    let mut ring: Vec<[i32; 2]> = Vec::with_capacity(points.len());
    for &p in points {
        if ring.last() != Some(&p) {
            ring.push(p);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn ring_area(ring: &[[i32; 2]]) -> f64 {
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|&[x, y]| Coord { x: x as f64, y: y as f64 })
        .collect();
    Polygon::new(LineString::from(coords), vec![]).unsigned_area()
}

impl RegionMask {
    /// Exact fill of an ordered, possibly non-convex contour
    pub fn polygon_region(width: u32, height: u32, points: &[[i32; 2]]) -> RegionMask {
        let mut mask = RegionMask::empty(width, height);
        let ring = open_ring(points);
        if ring.len() < 3 || ring_area(&ring) <= 0.0 {
            debug!("Degenerate polygon with {} points", points.len());
            return mask;
        }
        let poly: Vec<Point<i32>> = ring.iter().map(|&[x, y]| Point::new(x, y)).collect();
        draw_polygon_mut(mask.buffer_mut(), &poly, INSIDE);
        mask
    }

    /// Fill of the convex hull of an unordered point cloud
    pub fn convex_region(width: u32, height: u32, points: &[[i32; 2]]) -> RegionMask {
        if points.len() < 3 {
            return RegionMask::empty(width, height);
        }
        let cloud: MultiPoint<f64> = points
            .iter()
            .map(|&[x, y]| GeoPoint::new(x as f64, y as f64))
            .collect::<Vec<_>>()
            .into();
        let hull = cloud.convex_hull();
        let ring: Vec<[i32; 2]> = hull
            .exterior()
            .coords()
            .map(|c| [c.x.round() as i32, c.y.round() as i32])
            .collect();
        Self::polygon_region(width, height, &ring)
    }

    /// Filled axis-aligned ellipse
    pub fn from_ellipse(width: u32, height: u32, center: [i32; 2], radii: [i32; 2]) -> RegionMask {
        let mut mask = RegionMask::empty(width, height);
        if radii[0] < 1 || radii[1] < 1 {
            return mask;
        }
        draw_filled_ellipse_mut(mask.buffer_mut(), (center[0], center[1]), radii[0], radii[1], INSIDE);
        mask
    }

    /// Filled disc
    pub fn from_circle(width: u32, height: u32, center: [i32; 2], radius: i32) -> RegionMask {
        let mut mask = RegionMask::empty(width, height);
        if radius < 1 {
            return mask;
        }
        draw_filled_circle_mut(mask.buffer_mut(), (center[0], center[1]), radius, INSIDE);
        mask
    }

    /// Polyline of constant thickness
    pub fn from_stroke(width: u32, height: u32, points: &[[f32; 2]], thickness: f32) -> RegionMask {
        let mut mask = RegionMask::empty(width, height);
        for pair in points.windows(2) {
            mask.draw_segment(pair[0], pair[1], thickness);
        }
        mask
    }

    /// Pixels of a `width` x `height` grid accepted by `keep`, e.g. a colour
    /// threshold over an image
    pub fn from_threshold<F>(width: u32, height: u32, keep: F) -> RegionMask
    where
        F: Fn(u32, u32) -> bool,
    {
        Self::from_predicate(width, height, keep)
    }

    /// Stamp a round-capped segment into the mask
    pub fn draw_segment(&mut self, from: [f32; 2], to: [f32; 2], thickness: f32) {
        let radius = ((thickness - 1.0) / 2.0).round().max(0.0) as i32;
        let dx = to[0] - from[0];
        let dy = to[1] - from[1];
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (from[0] + dx * t).round() as i32;
            let y = (from[1] + dy * t).round() as i32;
            if radius == 0 {
                if x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height() {
                    self.buffer_mut().put_pixel(x as u32, y as u32, INSIDE);
                }
            } else {
                draw_filled_circle_mut(self.buffer_mut(), (x, y), radius, INSIDE);
            }
        }
    }
}
