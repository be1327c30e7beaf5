//! Core layout pipeline for storage floor plans.
//!
//! Takes a parsed floor plan (walls, forbidden zones, entrances, rooms) and
//! produces a validated spatial layout: placed storage units, a connecting
//! corridor network and a compliance report. All inputs and outputs are plain
//! in-memory records; parsing, rendering and persistence live elsewhere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod compliance;
pub mod config;
pub mod corridor_generator;
pub mod geometry;
pub mod ilot_placer;
pub mod occupancy_grid;
pub mod pipeline;
pub mod plan_analysis;
pub mod semantics;
pub mod unit_catalog;
pub mod unit_mix;
pub mod zone_detector;

pub use compliance::{ComplianceChecker, ComplianceReport, Severity, Solution, Violation};
pub use config::LayoutConfig;
pub use corridor_generator::{Corridor, CorridorGenerator, CorridorKind, CorridorStrategy};
pub use ilot_placer::{DeviationReport, Ilot, IlotPlacer, PlacementResult};
pub use pipeline::{LayoutEngine, LayoutSolution};
pub use plan_analysis::{analyze, FloorPlanMetrics};
pub use unit_catalog::{UnitCatalog, UnitTemplate};
pub use unit_mix::{SizeSpec, UnitMix};
pub use zone_detector::{detect_zones, Zone};

/// Errors for invalid call shapes. Business-level shortfalls (unmet targets,
/// exhausted zones, rule violations) are reported as data, never as errors.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid floor plan bounds: {0}")]
    InvalidBounds(String),
    #[error("unknown unit template '{0}'")]
    UnknownTemplate(String),
    #[error("invalid unit mix: {0}")]
    UnitMix(String),
    #[error("unit mix CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        const EPSILON: f64 = 1e-6;
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

/// Wall segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Line { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn midpoint(&self) -> Point {
        Point {
            x: (self.start.x + self.end.x) / 2.0,
            y: (self.start.y + self.end.y) / 2.0,
        }
    }
}

/// Axis-aligned bounding box in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Zero or negative extent in either axis.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    pub fn of_points(points: &[Point]) -> Option<Bounds> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }
}

/// Placed rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.x,
            min_y: self.y,
            max_x: self.x + self.width,
            max_y: self.y + self.height,
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

/// Zone where storage units must not be placed (stairwell, shaft, plant room).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForbiddenZone {
    #[serde(default)]
    pub polygon: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl ForbiddenZone {
    pub fn from_bounds(bounds: Bounds) -> Self {
        ForbiddenZone {
            polygon: vec![
                Point::new(bounds.min_x, bounds.min_y),
                Point::new(bounds.max_x, bounds.min_y),
                Point::new(bounds.max_x, bounds.max_y),
                Point::new(bounds.min_x, bounds.max_y),
            ],
            bounds: Some(bounds),
        }
    }

    /// Explicit bounds if present, otherwise computed from the polygon.
    pub fn effective_bounds(&self) -> Option<Bounds> {
        self.bounds.or_else(|| Bounds::of_points(&self.polygon))
    }
}

/// Entrance or emergency exit, stored as the door segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub start: Point,
    pub end: Point,
}

impl Entrance {
    pub fn center(&self) -> Point {
        Point {
            x: (self.start.x + self.end.x) / 2.0,
            y: (self.start.y + self.end.y) / 2.0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.start.x.min(self.end.x),
            min_y: self.start.y.min(self.end.y),
            max_x: self.start.x.max(self.end.x),
            max_y: self.start.y.max(self.end.y),
        }
    }
}

/// Room polygon carried through from the import stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub polygon: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl Room {
    pub fn effective_area(&self) -> f64 {
        match self.area {
            Some(a) if a > 0.0 => a,
            _ => geometry::polygon_area(&self.polygon),
        }
    }

    pub fn effective_bounds(&self) -> Option<Bounds> {
        self.bounds.or_else(|| Bounds::of_points(&self.polygon))
    }
}

/// Parsed architectural floor plan, read-only input to the pipeline.
/// Coordinates are in metres; `bounds` is always present and finite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorPlan {
    pub bounds: Bounds,
    #[serde(default)]
    pub walls: Vec<Line>,
    #[serde(default)]
    pub forbidden_zones: Vec<ForbiddenZone>,
    #[serde(default)]
    pub entrances: Vec<Entrance>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl FloorPlan {
    pub fn empty(bounds: Bounds) -> Self {
        FloorPlan {
            bounds,
            walls: Vec::new(),
            forbidden_zones: Vec::new(),
            entrances: Vec::new(),
            rooms: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_of_points() {
        let points = vec![
            Point::new(2.0, 8.0),
            Point::new(-1.0, 3.0),
            Point::new(5.0, 0.5),
        ];
        let bounds = Bounds::of_points(&points).unwrap();
        assert_eq!(bounds, Bounds::new(-1.0, 0.5, 5.0, 8.0));
        assert!(Bounds::of_points(&[]).is_none());
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(1.0, 1.0, 2.0, 2.0);
        let c = Rect::new(2.0, 0.0, 1.0, 1.0);
        assert!(a.overlaps(&b));
        // Shared edge only is not an overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_degenerate_bounds() {
        assert!(Bounds::new(0.0, 0.0, 0.0, 5.0).is_degenerate());
        assert!(Bounds::new(3.0, 0.0, 1.0, 5.0).is_degenerate());
        assert!(!Bounds::new(0.0, 0.0, 1.0, 5.0).is_degenerate());
    }

    #[test]
    fn test_entrance_center() {
        let entrance = Entrance {
            start: Point::new(0.0, 18.0),
            end: Point::new(2.0, 22.0),
        };
        assert_eq!(entrance.center(), Point::new(1.0, 20.0));
    }
}
