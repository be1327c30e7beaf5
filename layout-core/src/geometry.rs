//! Shared geometric primitives used by every pipeline stage.

use crate::{Line, Point, Rect};
use geo::{Area, Coord, LineString, Polygon as GeoPolygon};
use nalgebra::{Point2, Vector2};

/// Ray-casting point-in-polygon test. Points on an edge may report either
/// side; callers that care test centers, not boundaries.
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = &polygon[i];
        let pj = &polygon[j];
        let crosses = (pi.y > point.y) != (pj.y > point.y);
        if crosses {
            let x_at_y = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_at_y {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Unsigned polygon area via the shoelace formula.
pub fn polygon_area(polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let coords: Vec<Coord> = polygon.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    let polygon = GeoPolygon::new(LineString::from(coords), vec![]);
    polygon.unsigned_area()
}

/// Vertex-average centroid, matching how entrance and room centers are
/// resolved elsewhere in the pipeline.
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }
    let x_sum: f64 = polygon.iter().map(|p| p.x).sum();
    let y_sum: f64 = polygon.iter().map(|p| p.y).sum();
    let n = polygon.len() as f64;
    Some(Point::new(x_sum / n, y_sum / n))
}

fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: &Point, b: &Point, p: &Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Proper or touching intersection of two closed segments.
pub fn segments_intersect(a: &Line, b: &Line) -> bool {
    let d1 = orientation(&a.start, &a.end, &b.start);
    let d2 = orientation(&a.start, &a.end, &b.end);
    let d3 = orientation(&b.start, &b.end, &a.start);
    let d4 = orientation(&b.start, &b.end, &a.end);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear touches
    (d1 == 0.0 && on_segment(&a.start, &a.end, &b.start))
        || (d2 == 0.0 && on_segment(&a.start, &a.end, &b.end))
        || (d3 == 0.0 && on_segment(&b.start, &b.end, &a.start))
        || (d4 == 0.0 && on_segment(&b.start, &b.end, &a.end))
}

/// Shortest distance from a point to a closed segment.
pub fn point_to_segment_distance(point: &Point, start: &Point, end: &Point) -> f64 {
    let p = Point2::new(point.x, point.y);
    let a = Point2::new(start.x, start.y);
    let b = Point2::new(end.x, end.y);
    let ab: Vector2<f64> = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    (p - projection).norm()
}

/// Shortest distance from a point to a closed polyline given as consecutive
/// corner points (the polygon ring of a corridor rectangle).
pub fn point_to_polyline_distance(point: &Point, corners: &[Point]) -> f64 {
    if corners.is_empty() {
        return f64::INFINITY;
    }
    if corners.len() == 1 {
        return point.distance_to(&corners[0]);
    }
    let mut best = f64::INFINITY;
    for i in 0..corners.len() {
        let j = (i + 1) % corners.len();
        let d = point_to_segment_distance(point, &corners[i], &corners[j]);
        best = best.min(d);
    }
    best
}

/// True if the segment crosses or touches the rectangle.
pub fn segment_intersects_rect(segment: &Line, rect: &Rect) -> bool {
    let bounds = rect.bounds();
    if bounds.contains_point(&segment.start) || bounds.contains_point(&segment.end) {
        return true;
    }
    let corners = rect.corners();
    for i in 0..4 {
        let edge = Line::new(corners[i], corners[(i + 1) % 4]);
        if segments_intersect(segment, &edge) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn test_point_in_polygon_square() {
        let poly = square(10.0);
        assert!(point_in_polygon(&Point::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(&Point::new(15.0, 5.0), &poly));
        assert!(!point_in_polygon(&Point::new(-1.0, 5.0), &poly));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // L-shape: the notch at the top right is outside
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(&Point::new(2.0, 8.0), &poly));
        assert!(!point_in_polygon(&Point::new(8.0, 8.0), &poly));
    }

    #[test]
    fn test_polygon_area() {
        let area = polygon_area(&square(10.0));
        assert!((area - 100.0).abs() < 1e-9);
        assert_eq!(polygon_area(&[Point::new(0.0, 0.0)]), 0.0);
    }

    #[test]
    fn test_segments_intersect() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Line::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        let c = Line::new(Point::new(20.0, 20.0), Point::new(30.0, 20.0));
        assert!(segments_intersect(&a, &b));
        assert!(!segments_intersect(&a, &c));
    }

    #[test]
    fn test_collinear_touch() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        let b = Line::new(Point::new(5.0, 0.0), Point::new(10.0, 0.0));
        assert!(segments_intersect(&a, &b));
    }

    #[test]
    fn test_point_to_segment_distance() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);
        let d = point_to_segment_distance(&Point::new(5.0, 3.0), &start, &end);
        assert!((d - 3.0).abs() < 1e-9);
        // Beyond the endpoint the distance is to the endpoint itself
        let d = point_to_segment_distance(&Point::new(13.0, 4.0), &start, &end);
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_intersects_rect() {
        let rect = Rect::new(2.0, 2.0, 4.0, 4.0);
        let crossing = Line::new(Point::new(0.0, 4.0), Point::new(10.0, 4.0));
        let outside = Line::new(Point::new(0.0, 10.0), Point::new(10.0, 10.0));
        let inside = Line::new(Point::new(3.0, 3.0), Point::new(4.0, 4.0));
        assert!(segment_intersects_rect(&crossing, &rect));
        assert!(!segment_intersects_rect(&outside, &rect));
        assert!(segment_intersects_rect(&inside, &rect));
    }
}
