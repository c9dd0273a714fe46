//! Path Store: the strokes drawn on the canvas.
//!
//! Points are recorded in canvas pixels. A path's point order is its
//! playback order; the order of paths is only their drawing order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One stroke. Fewer than two points is stored but never sounds.
pub type Path = Vec<Point>;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        CanvasSize { width, height }
    }
}

/// All committed paths plus the furthest x reached.
///
/// `max_x` never decreases until [`DrawingState::clear`], and is always at
/// least the x of every stored point. Playback time is normalized by it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingState {
    max_x: f64,
    paths: Vec<Path>,
    #[serde(skip)]
    current: Option<Path>,
}

impl DrawingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// The stroke being drawn, if any.
    pub fn current_stroke(&self) -> Option<&[Point]> {
        self.current.as_deref()
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    /// Pointer down: start a new stroke at `point`, discarding any unfinished one.
    /// Non-finite points are never recorded.
    pub fn begin_stroke(&mut self, point: Point) {
        self.current = Some(point.is_finite().then_some(point).into_iter().collect());
    }

    /// Pointer move: extend the stroke. Ignored while not drawing.
    pub fn extend_stroke(&mut self, point: Point) {
        if !point.is_finite() {
            return;
        }
        if let Some(stroke) = self.current.as_mut() {
            stroke.push(point);
        }
    }

    /// Pointer up or leave: commit the stroke. Returns whether one was committed.
    pub fn end_stroke(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) if !stroke.is_empty() => {
                self.commit(stroke);
                true
            }
            _ => false,
        }
    }

    /// Store a finished path and fold its points into `max_x`. Non-finite
    /// points are dropped; a path left empty is not stored.
    pub fn commit(&mut self, mut path: Path) {
        path.retain(Point::is_finite);
        if path.is_empty() {
            return;
        }
        for point in &path {
            if point.x > self.max_x {
                self.max_x = point.x;
            }
        }
        log::debug!(
            "stored path {} with {} points, max_x now {}",
            self.paths.len(),
            path.len(),
            self.max_x
        );
        self.paths.push(path);
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.current = None;
        self.max_x = 0.0;
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
