//! Polygon predicates used by the triangulator
//!
//! All predicates work in single precision on em-square coordinates. None of
//! them are robust against degenerate input; the triangulator only uses them
//! for classification, never for topology.

use super::point::{cross, sub, EmPoint};

/// Signed area of a closed polygon, doubled.
///
/// Accumulated in `f64`. Negative for clockwise polygons (y up). Polygons with
/// fewer than 3 points have zero area.
pub fn signed_area(points: &[EmPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for (i, p0) in points.iter().enumerate() {
        let p1 = points[(i + 1) % points.len()];
        area += p0[0] as f64 * p1[1] as f64 - p1[0] as f64 * p0[1] as f64;
    }
    area
}

/// Crossing-number containment test
pub fn point_in_polygon(polygon: &[EmPoint], p: EmPoint) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        // Edge straddles the horizontal line through p; also rules out a[1] == b[1]
        if (a[1] <= p[1] && b[1] > p[1]) || (a[1] > p[1] && b[1] <= p[1]) {
            let x = (p[1] - a[1]) * (b[0] - a[0]) / (b[1] - a[1]) + a[0];
            inside ^= x < p[0];
        }
    }
    inside
}

/// Cross product of `ac` and `ab`.
///
/// Positive when `a → b → c` turns clockwise.
#[inline]
pub fn ac_cross_ab(a: EmPoint, b: EmPoint, c: EmPoint) -> f32 {
    cross(sub(c, a), sub(b, a))
}

/// Does any point of `points` lie strictly inside triangle `abc`?
///
/// Points whose index is in `skip` are ignored (the triangle's own corners).
/// Triangles whose corners all share one y coordinate never contain anything.
pub fn any_point_in_triangle(
    points: &[EmPoint],
    skip: &[usize],
    a: EmPoint,
    b: EmPoint,
    c: EmPoint,
) -> bool {
    // Sort the corners so that a.y <= b.y <= c.y
    let (mut a, mut b, mut c) = (a, b, c);
    if a[1] > b[1] {
        std::mem::swap(&mut a, &mut b);
    }
    if a[1] > c[1] {
        std::mem::swap(&mut a, &mut c);
    }
    if b[1] > c[1] {
        std::mem::swap(&mut b, &mut c);
    }

    let ca = sub(a, c);
    if ca[1] == 0.0 {
        return false;
    }
    let ab = sub(b, a);
    let bc = sub(c, b);

    // Each edge as x = q * y + w. Edges with zero height produce NaN here,
    // but a horizontal edge is never consulted for y strictly inside (a.y, c.y).
    let edge = |d: EmPoint, o: EmPoint| (d[0] / d[1], o[0] - d[0] * o[1] / d[1]);
    let (q_ab, w_ab) = edge(ab, a);
    let (q_bc, w_bc) = edge(bc, b);
    let (q_ca, w_ca) = edge(ca, c);

    points.iter().enumerate().any(|(i, &p)| {
        if skip.contains(&i) || p[1] <= a[1] || p[1] >= c[1] {
            return false;
        }
        let mut hits = (p[1] * q_ca + w_ca > p[0]) as u32;
        hits += if p[1] < b[1] {
            (p[1] * q_ab + w_ab > p[0]) as u32
        } else {
            (p[1] * q_bc + w_bc > p[0]) as u32
        };
        hits == 1 && p != b
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_CCW: [EmPoint; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    #[test]
    fn test_signed_area_sign_gives_winding() {
        assert_eq!(signed_area(&SQUARE_CCW), 2.0);

        let mut clockwise = SQUARE_CCW;
        clockwise.reverse();
        assert_eq!(signed_area(&clockwise), -2.0);

        assert_eq!(signed_area(&SQUARE_CCW[..2]), 0.0);
    }

    #[test]
    fn test_point_in_polygon_basic() {
        assert!(point_in_polygon(&SQUARE_CCW, [0.5, 0.5]));
        assert!(!point_in_polygon(&SQUARE_CCW, [1.5, 0.5]));
        assert!(!point_in_polygon(&SQUARE_CCW, [0.5, -0.1]));
        assert!(!point_in_polygon(&SQUARE_CCW[..2], [0.5, 0.0]));
    }

    #[test]
    fn test_point_in_polygon_ignores_winding() {
        let mut clockwise = SQUARE_CCW;
        clockwise.reverse();
        assert!(point_in_polygon(&clockwise, [0.25, 0.75]));
    }

    #[test]
    fn test_ac_cross_ab_is_positive_for_clockwise_turn() {
        // (0,0) → (1,1) → (2,0) bends clockwise
        assert!(ac_cross_ab([0.0, 0.0], [1.0, 1.0], [2.0, 0.0]) > 0.0);
        assert!(ac_cross_ab([0.0, 0.0], [1.0, -1.0], [2.0, 0.0]) < 0.0);
    }

    #[test]
    fn test_triangle_contains_interior_point() {
        let (a, b, c) = ([0.0, 0.0], [2.0, 1.0], [0.0, 2.0]);
        assert!(any_point_in_triangle(&[[0.5, 1.0]], &[], a, b, c));
        assert!(!any_point_in_triangle(&[[1.9, 0.2]], &[], a, b, c));
        assert!(!any_point_in_triangle(&[[-0.5, 1.0]], &[], a, b, c));
    }

    #[test]
    fn test_triangle_skips_listed_points_and_corners() {
        let (a, b, c) = ([0.0, 0.0], [2.0, 1.0], [0.0, 2.0]);
        let points = [a, b, c, [0.5, 1.0]];
        assert!(any_point_in_triangle(&points, &[0, 1, 2], a, b, c));
        assert!(!any_point_in_triangle(&points, &[3], a, b, c));
        // Corners sit on the boundary, never strictly inside
        assert!(!any_point_in_triangle(&points[..3], &[], a, b, c));
    }

    #[test]
    fn test_flat_triangle_contains_nothing() {
        let (a, b, c) = ([0.0, 1.0], [1.0, 1.0], [2.0, 1.0]);
        assert!(!any_point_in_triangle(&[[1.0, 1.0]], &[], a, b, c));
    }
}
