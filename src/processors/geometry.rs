//! Geometric primitives for segmentation post-processing.
//!
//! This module provides the point, contour, and bounding-box types used
//! throughout the pipeline, together with the algorithms that operate on
//! them: convex hulls, minimum-area rectangles, Douglas-Peucker
//! simplification, polygon moments, and polar/cartesian conversions.

use imageproc::point::Point as ImageProcPoint;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A 2D point with integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: i32,
    /// Y-coordinate of the point.
    pub y: i32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a point from an imageproc contour point.
    pub fn from_imageproc_point(p: ImageProcPoint<i32>) -> Self {
        Self { x: p.x, y: p.y }
    }

    /// Converts this point to an imageproc point for drawing.
    pub fn to_imageproc_point(self) -> ImageProcPoint<i32> {
        ImageProcPoint::new(self.x, self.y)
    }
}

/// An axis-aligned bounding box with top-left origin.
///
/// Extents are inclusive pixel counts: a contour spanning columns 10..=49
/// has `x = 10` and `width = 40`. Invariant: `width >= 0`, `height >= 0`.
/// Instances are derived from a contour and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X-coordinate of the top-left corner.
    pub x: i32,
    /// Y-coordinate of the top-left corner.
    pub y: i32,
    /// Width of the box in pixels.
    pub width: i32,
    /// Height of the box in pixels.
    pub height: i32,
}

impl BoundingBox {
    /// Creates a new bounding box.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the integer center of the box, flooring half-pixel positions.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Checks whether a point lies inside the box (inclusive bounds).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x as f32
            && x <= (self.x + self.width) as f32
            && y >= self.y as f32
            && y <= (self.y + self.height) as f32
    }
}

/// A rectangle of minimum area enclosing a contour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MinAreaRect {
    /// Center of the rectangle.
    pub center: (f32, f32),
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
    /// Orientation angle in degrees, normalized into (0, 90].
    ///
    /// This matches the convention of recent OpenCV releases: an
    /// axis-aligned rectangle reports 90, a slight counter-clockwise tilt
    /// of the long axis reports a small positive angle.
    pub angle: f32,
}

impl MinAreaRect {
    fn degenerate() -> Self {
        Self {
            center: (0.0, 0.0),
            width: 0.0,
            height: 0.0,
            angle: 0.0,
        }
    }

    /// Gets the length of the shorter side of the rectangle.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// An ordered sequence of integer points describing a closed polygon that
/// approximates one connected foreground region of a mask.
///
/// A contour is owned by the [`Line`](crate::processors::contours::Line)
/// derived from it and is never shared between lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    /// The polygon vertices, in traversal order. The closing edge from the
    /// last vertex back to the first is implicit.
    pub points: Vec<Point>,
}

impl Contour {
    /// Creates a contour from a vector of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the contour has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Calculates the enclosed area using the shoelace formula.
    ///
    /// Returns 0.0 for contours with fewer than 3 vertices.
    pub fn area(&self) -> f32 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let n = self.points.len();
        let mut doubled: i64 = 0;
        for i in 0..n {
            let j = (i + 1) % n;
            doubled += self.points[i].x as i64 * self.points[j].y as i64;
            doubled -= self.points[j].x as i64 * self.points[i].y as i64;
        }
        doubled.abs() as f32 / 2.0
    }

    /// Calculates the closed perimeter of the contour.
    pub fn perimeter(&self) -> f32 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        let mut perimeter = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            let dx = (self.points[j].x - self.points[i].x) as f32;
            let dy = (self.points[j].y - self.points[i].y) as f32;
            perimeter += dx.hypot(dy);
        }
        perimeter
    }

    /// Computes the axis-aligned bounding box of the contour.
    ///
    /// Returns a zero-sized box at the origin for an empty contour.
    pub fn bounding_rect(&self) -> BoundingBox {
        let Some((min_x, max_x)) = self.points.iter().map(|p| p.x).minmax().into_option() else {
            return BoundingBox::new(0, 0, 0, 0);
        };
        let Some((min_y, max_y)) = self.points.iter().map(|p| p.y).minmax().into_option() else {
            return BoundingBox::new(0, 0, 0, 0);
        };

        BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    /// Computes the centroid of the polygon via its area moments.
    ///
    /// Returns `None` for degenerate (zero-area) contours, which cannot
    /// feed a moment-based centroid.
    pub fn centroid(&self) -> Option<(f32, f32)> {
        if self.points.len() < 3 {
            return None;
        }

        let n = self.points.len();
        let mut m00: f64 = 0.0;
        let mut m10: f64 = 0.0;
        let mut m01: f64 = 0.0;

        for i in 0..n {
            let j = (i + 1) % n;
            let xi = self.points[i].x as f64;
            let yi = self.points[i].y as f64;
            let xj = self.points[j].x as f64;
            let yj = self.points[j].y as f64;

            let cross = xi * yj - xj * yi;
            m00 += cross;
            m10 += (xi + xj) * cross;
            m01 += (yi + yj) * cross;
        }

        m00 /= 2.0;
        if m00.abs() < f64::EPSILON {
            return None;
        }

        let cx = m10 / (6.0 * m00);
        let cy = m01 / (6.0 * m00);
        Some((cx as f32, cy as f32))
    }

    /// Computes the convex hull of the contour using Graham's scan.
    ///
    /// Contours with fewer than 3 vertices are returned unchanged.
    pub fn convex_hull(&self) -> Contour {
        if self.points.len() < 3 {
            return self.clone();
        }

        let mut points = self.points.clone();

        // Lowest y-coordinate, leftmost on ties, is the scan anchor.
        let mut start_idx = 0;
        for i in 1..points.len() {
            if points[i].y < points[start_idx].y
                || (points[i].y == points[start_idx].y && points[i].x < points[start_idx].x)
            {
                start_idx = i;
            }
        }
        points.swap(0, start_idx);
        let start = points[0];

        points[1..].sort_by(|a, b| {
            let cross = cross_product(start, *a, *b);
            if cross == 0 {
                let dist_a = squared_distance(start, *a);
                let dist_b = squared_distance(start, *b);
                dist_a.cmp(&dist_b)
            } else if cross > 0 {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Greater
            }
        });

        let mut hull: Vec<Point> = Vec::new();
        for point in points {
            while hull.len() > 1
                && cross_product(hull[hull.len() - 2], hull[hull.len() - 1], point) <= 0
            {
                hull.pop();
            }
            hull.push(point);
        }

        Contour::new(hull)
    }

    /// Simplifies the contour with the Douglas-Peucker algorithm, using a
    /// tolerance proportional to the contour's perimeter.
    ///
    /// # Arguments
    ///
    /// * `epsilon_ratio` - Fraction of the perimeter used as the maximum
    ///   allowed deviation between the original and simplified outline.
    ///
    /// # Returns
    ///
    /// A new contour with a reduced vertex count. Contours with 2 or fewer
    /// vertices are returned unchanged.
    pub fn simplify(&self, epsilon_ratio: f32) -> Contour {
        if self.points.len() <= 2 {
            return self.clone();
        }

        let epsilon = epsilon_ratio * self.perimeter();
        let mut simplified = Vec::new();
        douglas_peucker(&self.points, epsilon, &mut simplified);

        Contour::new(simplified)
    }

    /// Computes the minimum-area rectangle enclosing the contour using
    /// rotating calipers over the convex hull.
    ///
    /// Contours whose hull degenerates to fewer than 3 vertices fall back
    /// to the axis-aligned extent with angle 0. Fully empty contours yield
    /// a zero-sized rectangle.
    pub fn min_area_rect(&self) -> MinAreaRect {
        if self.points.is_empty() {
            return MinAreaRect::degenerate();
        }

        let hull = self.convex_hull();
        let hull_points = &hull.points;

        if hull_points.len() < 3 {
            let bbox = self.bounding_rect();
            return MinAreaRect {
                center: (
                    bbox.x as f32 + (bbox.width - 1) as f32 / 2.0,
                    bbox.y as f32 + (bbox.height - 1) as f32 / 2.0,
                ),
                width: (bbox.width - 1).max(0) as f32,
                height: (bbox.height - 1).max(0) as f32,
                angle: 0.0,
            };
        }

        let mut min_area = f32::MAX;
        let mut min_rect = MinAreaRect::degenerate();

        let n = hull_points.len();
        for i in 0..n {
            let j = (i + 1) % n;

            let edge_x = (hull_points[j].x - hull_points[i].x) as f32;
            let edge_y = (hull_points[j].y - hull_points[i].y) as f32;
            let edge_length = edge_x.hypot(edge_y);

            if edge_length < f32::EPSILON {
                continue;
            }

            let nx = edge_x / edge_length;
            let ny = edge_y / edge_length;
            let px = -ny;
            let py = nx;

            let mut min_n = f32::MAX;
            let mut max_n = f32::MIN;
            let mut min_p = f32::MAX;
            let mut max_p = f32::MIN;

            for point in hull_points {
                let dx = (point.x - hull_points[i].x) as f32;
                let dy = (point.y - hull_points[i].y) as f32;

                let proj_n = nx * dx + ny * dy;
                min_n = min_n.min(proj_n);
                max_n = max_n.max(proj_n);

                let proj_p = px * dx + py * dy;
                min_p = min_p.min(proj_p);
                max_p = max_p.max(proj_p);
            }

            let width = max_n - min_n;
            let height = max_p - min_p;
            let area = width * height;

            if area < min_area {
                min_area = area;

                let center_n = (min_n + max_n) / 2.0;
                let center_p = (min_p + max_p) / 2.0;

                let center_x = hull_points[i].x as f32 + center_n * nx + center_p * px;
                let center_y = hull_points[i].y as f32 + center_n * ny + center_p * py;

                min_rect = MinAreaRect {
                    center: (center_x, center_y),
                    width,
                    height,
                    angle: normalize_rect_angle(edge_y.atan2(edge_x).to_degrees()),
                };
            }
        }

        min_rect
    }

    /// Converts the contour vertices into imageproc points for drawing.
    pub fn to_imageproc_points(&self) -> Vec<ImageProcPoint<i32>> {
        self.points
            .iter()
            .map(|p| p.to_imageproc_point())
            .collect()
    }
}

/// Converts polar coordinates to cartesian.
pub fn pol2cart(theta: f32, rho: f32) -> (f32, f32) {
    (rho * theta.cos(), rho * theta.sin())
}

/// Converts cartesian coordinates to polar.
pub fn cart2pol(x: f32, y: f32) -> (f32, f32) {
    (y.atan2(x), x.hypot(y))
}

/// Folds an arbitrary edge angle in degrees into (0, 90].
///
/// Both edges of a rectangle map to the same value, so the result is
/// independent of which side the calipers selected.
fn normalize_rect_angle(degrees: f32) -> f32 {
    let mut angle = degrees % 90.0;
    if angle <= 0.0 {
        angle += 90.0;
    }
    angle
}

/// Cross product of the vectors `p1->p2` and `p1->p3`.
///
/// Positive for a counter-clockwise turn, negative for clockwise, zero for
/// collinear points.
fn cross_product(p1: Point, p2: Point, p3: Point) -> i64 {
    (p2.x - p1.x) as i64 * (p3.y - p1.y) as i64 - (p2.y - p1.y) as i64 * (p3.x - p1.x) as i64
}

fn squared_distance(a: Point, b: Point) -> i64 {
    let dx = (b.x - a.x) as i64;
    let dy = (b.y - a.y) as i64;
    dx * dx + dy * dy
}

/// Iterative Douglas-Peucker simplification over an open point sequence.
///
/// Endpoints are always kept; interior points survive only where the
/// outline deviates from the chord by more than `epsilon`.
fn douglas_peucker(points: &[Point], epsilon: f32, result: &mut Vec<Point>) {
    if points.len() <= 2 {
        result.extend_from_slice(points);
        return;
    }

    let mut stack = vec![(0, points.len() - 1)];
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = start;

        for i in (start + 1)..end {
            let dist = point_to_line_distance(points[i], points[start], points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;

            if max_index - start > 1 {
                stack.push((start, max_index));
            }
            if end - max_index > 1 {
                stack.push((max_index, end));
            }
        }
    }

    for (i, &should_keep) in keep.iter().enumerate() {
        if should_keep {
            result.push(points[i]);
        }
    }
}

/// Perpendicular distance from a point to the line through two others.
fn point_to_line_distance(point: Point, line_start: Point, line_end: Point) -> f32 {
    let a = (line_end.y - line_start.y) as f32;
    let b = (line_start.x - line_end.x) as f32;
    let c = (line_end.x as f32) * (line_start.y as f32) - (line_start.x as f32) * (line_end.y as f32);

    let denominator = a.hypot(b);
    if denominator == 0.0 {
        return 0.0;
    }

    (a * point.x as f32 + b * point.y as f32 + c).abs() / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_contour(x: i32, y: i32, w: i32, h: i32) -> Contour {
        Contour::new(vec![
            Point::new(x, y),
            Point::new(x + w - 1, y),
            Point::new(x + w - 1, y + h - 1),
            Point::new(x, y + h - 1),
        ])
    }

    #[test]
    fn test_area_of_square() {
        let contour = rect_contour(0, 0, 11, 11);
        assert_eq!(contour.area(), 100.0);
    }

    #[test]
    fn test_bounding_rect_is_inclusive() {
        let contour = rect_contour(10, 20, 40, 20);
        let bbox = contour.bounding_rect();
        assert_eq!(bbox, BoundingBox::new(10, 20, 40, 20));
        assert_eq!(bbox.center(), (30, 30));
    }

    #[test]
    fn test_empty_contour_degenerates() {
        let contour = Contour::new(Vec::new());
        assert_eq!(contour.area(), 0.0);
        assert_eq!(contour.bounding_rect(), BoundingBox::new(0, 0, 0, 0));
        assert!(contour.centroid().is_none());
        assert_eq!(contour.min_area_rect().min_side(), 0.0);
    }

    #[test]
    fn test_convex_hull_drops_interior_point() {
        let mut points = rect_contour(0, 0, 11, 11).points;
        points.push(Point::new(5, 5));
        let hull = Contour::new(points).convex_hull();
        assert_eq!(hull.len(), 4);
        assert!(!hull.points.contains(&Point::new(5, 5)));
    }

    #[test]
    fn test_min_area_rect_axis_aligned_reports_90() {
        let rect = rect_contour(10, 10, 41, 21).min_area_rect();
        assert_eq!(rect.angle, 90.0);
        let (short, long) = (rect.width.min(rect.height), rect.width.max(rect.height));
        assert!((short - 20.0).abs() < 1e-3);
        assert!((long - 40.0).abs() < 1e-3);
        assert!((rect.center.0 - 30.0).abs() < 1e-3);
        assert!((rect.center.1 - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_min_area_rect_recovers_tilt() {
        // Long thin rectangle tilted 5 degrees below horizontal.
        let theta = 5.0_f32.to_radians();
        let (dx, dy) = (theta.cos(), theta.sin());
        let (nx, ny) = (-dy, dx);
        let mut points = Vec::new();
        for t in 0..400 {
            let t = t as f32;
            points.push(Point::new(
                (100.0 + t * dx) as i32,
                (100.0 + t * dy) as i32,
            ));
        }
        for t in (0..400).rev() {
            let t = t as f32;
            points.push(Point::new(
                (100.0 + t * dx + 20.0 * nx) as i32,
                (100.0 + t * dy + 20.0 * ny) as i32,
            ));
        }
        let rect = Contour::new(points).min_area_rect();
        assert!((rect.angle - 5.0).abs() < 0.5, "angle was {}", rect.angle);
    }

    #[test]
    fn test_centroid_of_square() {
        let (cx, cy) = rect_contour(0, 0, 11, 11).centroid().unwrap();
        assert!((cx - 5.0).abs() < 1e-3);
        assert!((cy - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_simplify_removes_collinear_vertices() {
        // Rectangle outline with redundant mid-edge points.
        let points = vec![
            Point::new(0, 0),
            Point::new(25, 0),
            Point::new(50, 0),
            Point::new(50, 10),
            Point::new(50, 20),
            Point::new(25, 20),
            Point::new(0, 20),
            Point::new(0, 10),
        ];
        let simplified = Contour::new(points).simplify(0.001);
        assert!(simplified.len() <= 5);
    }

    #[test]
    fn test_polar_round_trip() {
        let (theta, rho) = cart2pol(3.0, 4.0);
        let (x, y) = pol2cart(theta, rho);
        assert!((x - 3.0).abs() < 1e-4);
        assert!((y - 4.0).abs() < 1e-4);
    }
}
