use geo::Simplify;
use geo_types::{Coord, LineString};
use sketch_kit_common::Point;

use crate::traits::ContourSimplifier;

/// Ramer-Douglas-Peucker simplifier using geo crate's implementation.
///
/// Recursively keeps the point of maximum perpendicular distance from the
/// chord between a segment's endpoints whenever that distance exceeds
/// epsilon; collinear runs collapse to their endpoints.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl ContourSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, points: &[Point], epsilon: f64) -> Vec<Point> {
        if points.len() < 3 {
            return points.to_vec();
        }
        // geo's rdp is a no-op for epsilon <= 0; clamp to the smallest
        // positive value so a zero epsilon still collapses collinear runs
        let epsilon = epsilon.max(f64::MIN_POSITIVE);
        let coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
        let simplified = LineString::new(coords).simplify(&epsilon);
        simplified
            .coords()
            .map(|c| Point::new(c.x, c.y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collinear_input_collapses_to_endpoints() {
        let points: Vec<Point> = (0..50).map(|i| Point::new(i as f64, 0.0)).collect();
        for epsilon in [-1.0, 0.0, 0.001, 1.0] {
            let simplified = DouglasPeuckerSimplifier.simplify(&points, epsilon);
            assert_eq!(simplified.len(), 2);
            assert_eq!(simplified[0], points[0]);
            assert_eq!(simplified[1], points[49]);
        }
    }

    #[test]
    fn test_never_returns_more_points_than_input() {
        let points: Vec<Point> = (0..100)
            .map(|i| {
                let x = i as f64;
                Point::new(x, (x * 0.37).sin() * 20.0)
            })
            .collect();
        for epsilon in [0.0, 0.5, 5.0, 50.0] {
            let simplified = DouglasPeuckerSimplifier.simplify(&points, epsilon);
            assert!(simplified.len() <= points.len());
            assert!(simplified.len() >= 2);
        }
    }

    #[test]
    fn test_sharp_corner_survives() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.1),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let simplified = DouglasPeuckerSimplifier.simplify(&points, 1.0);
        assert!(simplified.contains(&Point::new(10.0, 0.0)));
        assert!(!simplified.contains(&Point::new(5.0, 0.1)));
    }

    #[test]
    fn test_tiny_input_passes_through() {
        let points = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        assert_eq!(DouglasPeuckerSimplifier.simplify(&points, 0.5), points);
    }
}
