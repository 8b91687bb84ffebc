// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry kernel: points, segments, cubic beziers and rectangles.
//!
//! Everything here is a pure function over `egui`'s math types. Rectangle
//! predicates compare exactly (no epsilon) because selection and hover
//! semantics depend on the exact edge rules documented on each function.

use egui::{Pos2, Rect, Vec2};

/// Maximum de Casteljau subdivision depth for bezier proximity queries
pub const BEZIER_MAX_SUBDIVISION: u32 = 10;

/// Default tessellation tolerance for bezier proximity queries
pub const DEFAULT_TESSELLATION_TOLERANCE: f32 = 1.25;

/// Squared distance between two points
pub fn distance_squared(a: Pos2, b: Pos2) -> f32 {
    (b - a).length_sq()
}

/// Closest point to `p` on the segment `a..b`
pub fn closest_point_on_segment(a: Pos2, b: Pos2, p: Pos2) -> Pos2 {
    let ap = p - a;
    let ab = b - a;
    let dot = ap.dot(ab);
    if dot <= 0.0 {
        return a;
    }
    let ab_len_sq = ab.length_sq();
    if dot >= ab_len_sq {
        return b;
    }
    a + ab * (dot / ab_len_sq)
}

/// Distance from `p` to the segment `a..b`
pub fn distance_to_segment(a: Pos2, b: Pos2, p: Pos2) -> f32 {
    closest_point_on_segment(a, b, p).distance(p)
}

/// Evaluate a cubic bezier at `t`
pub fn bezier_point(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Pos2::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

struct ClosestPointSearch {
    target: Pos2,
    closest: Pos2,
    closest_dist_sq: f32,
    last: Pos2,
    tolerance: f32,
}

impl ClosestPointSearch {
    fn step(&mut self, p1: Pos2, p2: Pos2, p3: Pos2, p4: Pos2, level: u32) {
        let d = p4 - p1;
        let d2 = ((p2.x - p4.x) * d.y - (p2.y - p4.y) * d.x).abs();
        let d3 = ((p3.x - p4.x) * d.y - (p3.y - p4.y) * d.x).abs();

        if (d2 + d3) * (d2 + d3) < self.tolerance * d.length_sq() {
            let on_line = closest_point_on_segment(self.last, p4, self.target);
            let dist_sq = distance_squared(on_line, self.target);
            if dist_sq < self.closest_dist_sq {
                self.closest = on_line;
                self.closest_dist_sq = dist_sq;
            }
            self.last = p4;
        } else if level < BEZIER_MAX_SUBDIVISION {
            let p12 = p1.lerp(p2, 0.5);
            let p23 = p2.lerp(p3, 0.5);
            let p34 = p3.lerp(p4, 0.5);
            let p123 = p12.lerp(p23, 0.5);
            let p234 = p23.lerp(p34, 0.5);
            let p1234 = p123.lerp(p234, 0.5);
            self.step(p1, p12, p123, p1234, level + 1);
            self.step(p1234, p234, p34, p4, level + 1);
        }
    }
}

/// Closest point to `p` on the cubic bezier `p0, p1, p2, p3`.
///
/// The curve is flattened by recursive de Casteljau subdivision until each
/// piece is flat within `tessellation_tolerance`, or the depth reaches
/// [`BEZIER_MAX_SUBDIVISION`].
pub fn closest_point_on_cubic_bezier(
    p0: Pos2,
    p1: Pos2,
    p2: Pos2,
    p3: Pos2,
    p: Pos2,
    tessellation_tolerance: f32,
) -> Pos2 {
    assert!(tessellation_tolerance > 0.0, "tessellation tolerance must be positive");
    let mut search = ClosestPointSearch {
        target: p,
        closest: p0,
        closest_dist_sq: f32::MAX,
        last: p0,
        tolerance: tessellation_tolerance,
    };
    search.step(p0, p1, p2, p3, 0);
    search.closest
}

/// Closest point to `p` lying on the border of `rect`.
///
/// Unlike clamping, the result never lies in the interior, even when `p` is
/// inside the rectangle.
pub fn rectangle_closest_border_point(rect: Rect, p: Pos2) -> Pos2 {
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];

    corners
        .iter()
        .zip(corners.iter().cycle().skip(1))
        .map(|(a, b)| closest_point_on_segment(*a, *b, p))
        .min_by(|a, b| distance_squared(*a, p).total_cmp(&distance_squared(*b, p)))
        .unwrap_or(corners[0])
}

/// Rectangle predicates and transforms with exact edge semantics.
pub mod rect {
    use super::{Pos2, Rect, Vec2};

    /// Half-open containment: the min edges are inside, the max edges are not
    pub fn contains_point(rect: Rect, p: Pos2) -> bool {
        p.x >= rect.min.x && p.y >= rect.min.y && p.x < rect.max.x && p.y < rect.max.y
    }

    /// Whether `inner` lies entirely within `outer` (shared edges allowed)
    pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
        inner.min.x >= outer.min.x
            && inner.min.y >= outer.min.y
            && inner.max.x <= outer.max.x
            && inner.max.y <= outer.max.y
    }

    /// Open-interval overlap: rectangles that only touch do not overlap
    pub fn overlaps(a: Rect, b: Rect) -> bool {
        b.min.y < a.max.y && b.max.y > a.min.y && b.min.x < a.max.x && b.max.x > a.min.x
    }

    /// Grow every edge outward by `amount`
    pub fn expanded(rect: Rect, amount: f32) -> Rect {
        Rect::from_min_max(
            rect.min - Vec2::splat(amount),
            rect.max + Vec2::splat(amount),
        )
    }

    /// Move the rectangle by `delta`
    pub fn translated(rect: Rect, delta: Vec2) -> Rect {
        Rect::from_min_max(rect.min + delta, rect.max + delta)
    }

    /// Clip `rect` against `clip`
    pub fn clipped(rect: Rect, clip: Rect) -> Rect {
        Rect::from_min_max(rect.min.max(clip.min), rect.max.min(clip.max))
    }

    /// Distance from `p` to the rectangle, zero inside
    pub fn distance_to_point(rect: Rect, p: Pos2) -> f32 {
        let dx = (rect.min.x - p.x).max(0.0).max(p.x - rect.max.x);
        let dy = (rect.min.y - p.y).max(0.0).max(p.y - rect.max.y);
        Vec2::new(dx, dy).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Pos2, b: Pos2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_closest_point_on_segment() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Pos2::new(5.0, 3.0)), Pos2::new(5.0, 0.0));
        assert_eq!(closest_point_on_segment(a, b, Pos2::new(-4.0, 1.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Pos2::new(14.0, 1.0)), b);
        // Degenerate segment
        assert_eq!(closest_point_on_segment(a, a, Pos2::new(3.0, 3.0)), a);
    }

    #[test]
    fn test_bezier_closest_point_on_straight_curve() {
        let p0 = Pos2::new(0.0, 0.0);
        let p3 = Pos2::new(100.0, 0.0);
        let p1 = Pos2::new(33.0, 0.0);
        let p2 = Pos2::new(66.0, 0.0);
        let closest = closest_point_on_cubic_bezier(p0, p1, p2, p3, Pos2::new(50.0, 20.0), 1.25);
        assert!(approx(closest, Pos2::new(50.0, 0.0)), "got {closest:?}");
    }

    #[test]
    fn test_bezier_closest_point_near_curve() {
        let p0 = Pos2::new(0.0, 0.0);
        let p1 = Pos2::new(50.0, 0.0);
        let p2 = Pos2::new(50.0, 100.0);
        let p3 = Pos2::new(100.0, 100.0);
        let on_curve = bezier_point(p0, p1, p2, p3, 0.5);
        let closest = closest_point_on_cubic_bezier(p0, p1, p2, p3, on_curve, 0.1);
        assert!(closest.distance(on_curve) < 1.0, "got {closest:?}");
    }

    #[test]
    fn test_rectangle_closest_border_point_from_inside() {
        let rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 50.0));
        let p = rectangle_closest_border_point(rect, Pos2::new(90.0, 25.0));
        assert_eq!(p, Pos2::new(100.0, 25.0));
    }

    #[test]
    fn test_rectangle_closest_border_point_from_outside() {
        let rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 50.0));
        let p = rectangle_closest_border_point(rect, Pos2::new(50.0, -30.0));
        assert_eq!(p, Pos2::new(50.0, 0.0));
    }

    #[test]
    fn test_rect_overlap_is_open() {
        let a = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0));
        let touching = Rect::from_min_max(Pos2::new(10.0, 0.0), Pos2::new(20.0, 10.0));
        let crossing = Rect::from_min_max(Pos2::new(9.0, 9.0), Pos2::new(20.0, 20.0));
        assert!(!rect::overlaps(a, touching));
        assert!(rect::overlaps(a, crossing));
    }

    #[test]
    fn test_rect_containment() {
        let outer = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0));
        let inner = Rect::from_min_max(Pos2::new(0.0, 2.0), Pos2::new(10.0, 5.0));
        assert!(rect::contains_rect(outer, inner));
        assert!(!rect::contains_rect(inner, outer));
        assert!(rect::contains_point(outer, Pos2::new(0.0, 0.0)));
        assert!(!rect::contains_point(outer, Pos2::new(10.0, 5.0)));
    }

    #[test]
    fn test_rect_transforms() {
        let r = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0));
        assert_eq!(
            rect::expanded(r, 2.0),
            Rect::from_min_max(Pos2::new(-2.0, -2.0), Pos2::new(12.0, 12.0))
        );
        assert_eq!(
            rect::translated(r, Vec2::new(5.0, -5.0)),
            Rect::from_min_max(Pos2::new(5.0, -5.0), Pos2::new(15.0, 5.0))
        );
        let clip = Rect::from_min_max(Pos2::new(5.0, 5.0), Pos2::new(20.0, 20.0));
        assert_eq!(
            rect::clipped(r, clip),
            Rect::from_min_max(Pos2::new(5.0, 5.0), Pos2::new(10.0, 10.0))
        );
        assert_eq!(rect::distance_to_point(r, Pos2::new(13.0, 14.0)), 5.0);
        assert_eq!(rect::distance_to_point(r, Pos2::new(3.0, 3.0)), 0.0);
    }
}
