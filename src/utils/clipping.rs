use geo::{Coord, CoordsIter, LineString, Polygon};

// Interior is the left side of the directed edge: rings are
// counter-clockwise. Boundary points count as inside so that clipping a
// polygon against itself returns it intact.
fn is_inside(q: &Coord<f64>, p1: &Coord<f64>, p2: &Coord<f64>) -> bool {
    let r = (p2.x - p1.x) * (q.y - p1.y) - (p2.y - p1.y) * (q.x - p1.x);
    r >= 0.0
}

fn compute_intersection(
    cp1: &Coord<f64>,
    cp2: &Coord<f64>,
    s: &Coord<f64>,
    e: &Coord<f64>,
) -> Coord<f64> {
    let dc = Coord {
        x: cp1.x - cp2.x,
        y: cp1.y - cp2.y,
    };
    let dp = Coord {
        x: s.x - e.x,
        y: s.y - e.y,
    };
    let n1 = cp1.x * cp2.y - cp1.y * cp2.x;
    let n2 = s.x * e.y - s.y * e.x;
    let n3 = 1.0 / (dc.x * dp.y - dc.y * dp.x);
    Coord {
        x: (n1 * dp.x - n2 * dc.x) * n3,
        y: (n1 * dp.y - n2 * dc.y) * n3,
    }
}

/// Intersects two convex polygons with Sutherland-Hodgman clipping. Both
/// rings must be counter-clockwise. Returns `None` as soon as any clipping
/// stage empties the candidate polygon (no intersection).
pub fn sutherland_hodgman_clip(
    subject_polygon: &Polygon<f64>,
    clipping_polygon: &Polygon<f64>,
) -> Option<Polygon<f64>> {
    let mut final_polygon = subject_polygon.coords_iter().collect::<Vec<_>>();
    final_polygon.pop();

    let mut clipping_polygon = clipping_polygon.coords_iter().collect::<Vec<_>>();
    clipping_polygon.pop();

    for i in 0..clipping_polygon.len() {
        let next_polygon = final_polygon;
        final_polygon = Vec::default();

        let i_i = if i == 0 {
            clipping_polygon.len() - 1
        } else {
            i - 1
        };

        let c_edge_start = clipping_polygon[i_i];
        let c_edge_end = clipping_polygon[i];

        for j in 0..next_polygon.len() {
            let j_i = if j == 0 {
                next_polygon.len() - 1
            } else {
                j - 1
            };

            let s_edge_start = next_polygon[j_i];
            let s_edge_end = next_polygon[j];
            if is_inside(&s_edge_end, &c_edge_start, &c_edge_end) {
                if !is_inside(&s_edge_start, &c_edge_start, &c_edge_end) {
                    let int = compute_intersection(
                        &s_edge_start,
                        &s_edge_end,
                        &c_edge_start,
                        &c_edge_end,
                    );
                    final_polygon.push(int);
                }
                final_polygon.push(s_edge_end);
            } else if is_inside(&s_edge_start, &c_edge_start, &c_edge_end) {
                let int =
                    compute_intersection(&s_edge_start, &s_edge_end, &c_edge_start, &c_edge_end);
                final_polygon.push(int);
            }
        }

        if final_polygon.is_empty() {
            return None;
        }
    }
    Some(Polygon::new(LineString::new(final_polygon), vec![]))
}

#[cfg(test)]
mod tests {
    use crate::utils::clipping::sutherland_hodgman_clip;
    use crate::utils::hull::hull_area;
    use geo::{polygon, CoordsIter, Polygon};

    fn clip_area(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
        sutherland_hodgman_clip(a, b)
            .map(|p| hull_area(&p.coords_iter().collect::<Vec<_>>()))
            .unwrap_or(0.0)
    }

    #[test]
    fn self_clip_is_identity() {
        let square: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        assert!((clip_area(&square, &square) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn partial_overlap() {
        let a: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        let b: Polygon<f64> = polygon![
            (x: 1.0, y: 1.0),
            (x: 3.0, y: 1.0),
            (x: 3.0, y: 3.0),
            (x: 1.0, y: 3.0),
        ];
        assert!((clip_area(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_is_empty() {
        let a: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        let b: Polygon<f64> = polygon![
            (x: 10.0, y: 10.0),
            (x: 12.0, y: 10.0),
            (x: 12.0, y: 12.0),
            (x: 10.0, y: 12.0),
        ];
        assert!(sutherland_hodgman_clip(&a, &b).is_none());
    }

    #[test]
    fn symmetric_by_area() {
        let a: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        let b: Polygon<f64> = polygon![
            (x: 1.0, y: -1.0),
            (x: 3.0, y: 1.0),
            (x: 1.0, y: 3.0),
            (x: -1.0, y: 1.0),
        ];
        let ab = clip_area(&a, &b);
        let ba = clip_area(&b, &a);
        assert!(ab > 0.0);
        assert!((ab - ba).abs() < 1e-9);
    }
}
