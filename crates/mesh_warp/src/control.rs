use tracing::debug;

/// Points closer than this are treated as the same vertex
const DEDUP_DISTANCE: f32 = 0.5;

/// A triangulation vertex and where it should end up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub source: [f32; 2],
    pub target: [f32; 2],
}

impl ControlPoint {
    /// A point that moves from `source` to `target`
    pub fn moving(source: [f32; 2], target: [f32; 2]) -> Self {
        Self { source, target }
    }

    /// A point pinned in place
    pub fn anchor(point: [f32; 2]) -> Self {
        Self { source: point, target: point }
    }

    pub fn is_anchor(&self) -> bool {
        self.source == self.target
    }

    pub fn displacement(&self) -> [f32; 2] {
        [self.target[0] - self.source[0], self.target[1] - self.source[1]]
    }
}

/// Control points of one warp over a `width` x `height` canvas.
///
/// Every set starts with the canvas anchors (four corners and four edge
/// midpoints) so that the border never moves. Points whose source lies off
/// the canvas, and points that repeat an earlier source, are dropped.
#[derive(Debug, Clone)]
pub struct ControlSet {
    width: u32,
    height: u32,
    points: Vec<ControlPoint>,
}

impl ControlSet {
    pub fn new(width: u32, height: u32) -> Self {
        let mut set = Self { width, height, points: Vec::new() };
        for anchor in canvas_anchors(width, height) {
            set.push(ControlPoint::anchor(anchor));
        }
        set
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Add a point; returns false when it was dropped
    pub fn push(&mut self, point: ControlPoint) -> bool {
        let [x, y] = point.source;
        let on_canvas = x.is_finite()
            && y.is_finite()
            && point.target.iter().all(|v| v.is_finite())
            && x >= 0.0
            && y >= 0.0
            && x <= self.width as f32 - 1.0
            && y <= self.height as f32 - 1.0;
        if !on_canvas {
            debug!("Dropping off-canvas control point {:?}", point.source);
            return false;
        }
        let duplicate = self.points.iter().any(|p| {
            (p.source[0] - x).abs() < DEDUP_DISTANCE && (p.source[1] - y).abs() < DEDUP_DISTANCE
        });
        if duplicate {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn push_moving(&mut self, source: [f32; 2], target: [f32; 2]) -> bool {
        self.push(ControlPoint::moving(source, target))
    }

    pub fn push_anchor(&mut self, point: [f32; 2]) -> bool {
        self.push(ControlPoint::anchor(point))
    }

    pub fn extend_anchors<I: IntoIterator<Item = [f32; 2]>>(&mut self, points: I) {
        for point in points {
            self.push_anchor(point);
        }
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn sources(&self) -> Vec<[f32; 2]> {
        self.points.iter().map(|p| p.source).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when some point actually moves
    pub fn has_motion(&self) -> bool {
        self.points.iter().any(|p| !p.is_anchor())
    }
}

/// Corners and edge midpoints of the canvas
pub fn canvas_anchors(width: u32, height: u32) -> [[f32; 2]; 8] {
    let w = width as f32;
    let h = height as f32;
    [
        [0.0, 0.0],
        [w / 2.0, 0.0],
        [w - 1.0, 0.0],
        [0.0, h / 2.0],
        [w - 1.0, h / 2.0],
        [0.0, h - 1.0],
        [w / 2.0, h - 1.0],
        [w - 1.0, h - 1.0],
    ]
}
