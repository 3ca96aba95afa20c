use geo::{Area, Coord, ConvexHull, MultiPoint, Point, Polygon};

fn hull_of(points: &[Coord<f64>]) -> Polygon<f64> {
    MultiPoint::new(points.iter().copied().map(Point::from).collect()).convex_hull()
}

/// Area of the convex hull of an arbitrary point set. Degenerate sets
/// (fewer than three distinct points, collinear points) have zero area.
pub fn hull_area(points: &[Coord<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    hull_of(points).unsigned_area()
}

/// Hull vertices in ring order with the closing point dropped, ready for the
/// enclosing-rectangle search.
pub fn hull_vertices(points: &[Coord<f64>]) -> Vec<Coord<f64>> {
    if points.is_empty() {
        return Vec::new();
    }
    let hull = hull_of(points);
    let mut vertices = hull.exterior().0.clone();
    vertices.pop();
    vertices
}
