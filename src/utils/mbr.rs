use geo::Coord;
use itertools::Itertools;
use std::f64::consts::FRAC_PI_2;

/// Smallest-area oriented rectangle covering a point set, reported with its
/// rotation angle, extents, center and corner points.
///
/// The search tests only orientations aligned with hull edges (rotating
/// calipers), which is exact for convex polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct MinAreaRect {
    pub angle: f64,
    pub area: f64,
    pub width: f64,
    pub height: f64,
    pub center: Coord<f64>,
    pub corners: [Coord<f64>; 4],
}

struct Fit {
    angle: f64,
    area: f64,
    width: f64,
    height: f64,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

fn rotate(p: &Coord<f64>, c: f64, s: f64) -> (f64, f64) {
    (c * p.x + s * p.y, -s * p.x + c * p.y)
}

/// Finds the minimum-area enclosing rectangle of `hull`, whose points must be
/// in hull ring order. Equal-area ties keep the first candidate in sorted
/// angle order.
pub fn min_area_rect(hull: &[Coord<f64>]) -> MinAreaRect {
    if hull.is_empty() {
        return MinAreaRect {
            angle: 0.0,
            area: 0.0,
            width: 0.0,
            height: 0.0,
            center: Coord { x: 0.0, y: 0.0 },
            corners: [Coord { x: 0.0, y: 0.0 }; 4],
        };
    }

    // One candidate orientation per hull edge, folded into [0, 90) since a
    // rectangle aligned to an angle equals one aligned to the angle + 90.
    let angles = hull
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let b = &hull[(i + 1) % hull.len()];
            (b.y - a.y).atan2(b.x - a.x).rem_euclid(FRAC_PI_2)
        })
        .sorted_by(|a, b| a.partial_cmp(b).unwrap())
        .dedup();

    let mut best: Option<Fit> = None;
    for angle in angles {
        let (c, s) = (angle.cos(), angle.sin());

        let mut min_x = f64::MAX;
        let mut max_x = f64::MIN;
        let mut min_y = f64::MAX;
        let mut max_y = f64::MIN;
        for p in hull {
            let (x, y) = rotate(p, c, s);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        let width = max_x - min_x;
        let height = max_y - min_y;
        let area = width * height;

        if best.as_ref().map_or(true, |b| area < b.area) {
            best = Some(Fit {
                angle,
                area,
                width,
                height,
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }
    }

    // a non-empty hull always yields at least one candidate angle
    let b = best.unwrap();
    let (c, s) = (b.angle.cos(), b.angle.sin());
    let unrotate = |x: f64, y: f64| Coord {
        x: c * x - s * y,
        y: s * x + c * y,
    };

    MinAreaRect {
        angle: b.angle,
        area: b.area,
        width: b.width,
        height: b.height,
        center: unrotate((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0),
        corners: [
            unrotate(b.max_x, b.min_y),
            unrotate(b.min_x, b.min_y),
            unrotate(b.min_x, b.max_y),
            unrotate(b.max_x, b.max_y),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::min_area_rect;
    use crate::utils::hull::{hull_area, hull_vertices};
    use geo::Coord;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn axis_aligned_rectangle() {
        let hull = [c(0.0, 0.0), c(4.0, 0.0), c(4.0, 2.0), c(0.0, 2.0)];
        let rect = min_area_rect(&hull);
        assert!((rect.area - 8.0).abs() < 1e-9);
        assert!(rect.angle.abs() < 1e-9);
        assert!((rect.center.x - 2.0).abs() < 1e-9);
        assert!((rect.center.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rotated_square() {
        // square rotated by 45 degrees; the axis-aligned cover has area 4,
        // the edge-aligned one recovers area 2
        let hull = [c(1.0, 0.0), c(2.0, 1.0), c(1.0, 2.0), c(0.0, 1.0)];
        let rect = min_area_rect(&hull);
        assert!((rect.area - 2.0).abs() < 1e-9);
    }

    #[test]
    fn dominates_hull_area() {
        let points = [
            c(0.0, 0.0),
            c(3.0, 0.5),
            c(4.0, 2.0),
            c(2.5, 3.5),
            c(0.5, 2.5),
        ];
        let hull = hull_vertices(&points);
        let rect = min_area_rect(&hull);
        assert!(rect.area >= hull_area(&points) - 1e-9);
    }

    #[test]
    fn corners_span_the_extents() {
        let hull = [c(1.0, 0.0), c(2.0, 1.0), c(1.0, 2.0), c(0.0, 1.0)];
        let rect = min_area_rect(&hull);
        let d01 = ((rect.corners[0].x - rect.corners[1].x).powi(2)
            + (rect.corners[0].y - rect.corners[1].y).powi(2))
        .sqrt();
        let d12 = ((rect.corners[1].x - rect.corners[2].x).powi(2)
            + (rect.corners[1].y - rect.corners[2].y).powi(2))
        .sqrt();
        assert!((d01 * d12 - rect.area).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(min_area_rect(&[]).area, 0.0);
        let point = min_area_rect(&[c(3.0, 4.0)]);
        assert_eq!(point.area, 0.0);
        assert!((point.center.x - 3.0).abs() < 1e-9);
    }
}
